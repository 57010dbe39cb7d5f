use std::fmt;
use std::ops::RangeInclusive;

use fixed_map::{Key, Map};

use crate::error::MembershipError;
use crate::linspace::Linspace;
use crate::membership::MfKind;

/// A parsed FIS document.
///
/// Built only by [`parse`](crate::parse) and immutable afterwards. It always holds
/// at least one input, one output and one rule.
#[derive(Clone, Debug, PartialEq)]
pub struct FisDocument {
    pub(crate) system: SystemBlock,
    pub(crate) inputs: Vec<Variable>,
    pub(crate) outputs: Vec<Variable>,
    pub(crate) rules: Vec<Rule>,
}

impl FisDocument {
    pub fn system(&self) -> &SystemBlock {
        &self.system
    }

    pub fn inputs(&self) -> &[Variable] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Variable] {
        &self.outputs
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Looks up an input by its 1-based position, as rules refer to it.
    pub fn input(&self, index: usize) -> Option<&Variable> {
        index.checked_sub(1).and_then(|i| self.inputs.get(i))
    }

    /// Looks up an output by its 1-based position, as rules refer to it.
    pub fn output(&self, index: usize) -> Option<&Variable> {
        index.checked_sub(1).and_then(|i| self.outputs.get(i))
    }

    pub fn variables(&self, direction: Direction) -> &[Variable] {
        match direction {
            Direction::Input => &self.inputs,
            Direction::Output => &self.outputs,
        }
    }
}

/// The keys understood inside `[System]`. Anything else is skipped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Key)]
pub enum SystemKey {
    Name,
    Type,
    Version,
    NumInputs,
    NumOutputs,
    NumRules,
    AndMethod,
    OrMethod,
    ImpMethod,
    AggMethod,
    DefuzzMethod,
}

impl SystemKey {
    /// In matching order: a line is claimed by the first key it starts with.
    pub const ALL: [SystemKey; 11] = [
        Self::Name,
        Self::Type,
        Self::Version,
        Self::NumInputs,
        Self::NumOutputs,
        Self::NumRules,
        Self::AndMethod,
        Self::OrMethod,
        Self::ImpMethod,
        Self::AggMethod,
        Self::DefuzzMethod,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Type => "Type",
            Self::Version => "Version",
            Self::NumInputs => "NumInputs",
            Self::NumOutputs => "NumOutputs",
            Self::NumRules => "NumRules",
            Self::AndMethod => "AndMethod",
            Self::OrMethod => "OrMethod",
            Self::ImpMethod => "ImpMethod",
            Self::AggMethod => "AggMethod",
            Self::DefuzzMethod => "DefuzzMethod",
        }
    }

    pub fn is_count(self) -> bool {
        matches!(self, Self::NumInputs | Self::NumOutputs | Self::NumRules)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SystemValue {
    Text(String),
    Count(i64),
}

/// Global metadata from the `[System]` block. Every key is optional.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SystemBlock(pub(crate) Map<SystemKey, SystemValue>);

impl SystemBlock {
    pub fn get(&self, key: SystemKey) -> Option<&SystemValue> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (SystemKey, &SystemValue)> + '_ {
        self.0.iter()
    }

    fn text(&self, key: SystemKey) -> Option<&str> {
        match self.0.get(key) {
            Some(SystemValue::Text(text)) => Some(text.as_str()),
            _ => None,
        }
    }

    fn count(&self, key: SystemKey) -> Option<i64> {
        match self.0.get(key) {
            Some(SystemValue::Count(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.text(SystemKey::Name)
    }

    pub fn fis_type(&self) -> Option<&str> {
        self.text(SystemKey::Type)
    }

    pub fn version(&self) -> Option<&str> {
        self.text(SystemKey::Version)
    }

    /// Declared count; never checked against the decoded inputs.
    pub fn num_inputs(&self) -> Option<i64> {
        self.count(SystemKey::NumInputs)
    }

    pub fn num_outputs(&self) -> Option<i64> {
        self.count(SystemKey::NumOutputs)
    }

    pub fn num_rules(&self) -> Option<i64> {
        self.count(SystemKey::NumRules)
    }

    pub fn and_method(&self) -> Option<&str> {
        self.text(SystemKey::AndMethod)
    }

    pub fn or_method(&self) -> Option<&str> {
        self.text(SystemKey::OrMethod)
    }

    pub fn imp_method(&self) -> Option<&str> {
        self.text(SystemKey::ImpMethod)
    }

    pub fn agg_method(&self) -> Option<&str> {
        self.text(SystemKey::AggMethod)
    }

    pub fn defuzz_method(&self) -> Option<&str> {
        self.text(SystemKey::DefuzzMethod)
    }
}

/// Whether a variable block is an `[Input..]` or an `[Output..]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Input,
    Output,
}

impl Direction {
    pub(crate) fn header_prefix(self) -> &'static str {
        match self {
            Self::Input => "[Input",
            Self::Output => "[Output",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input => f.write_str("Input"),
            Self::Output => f.write_str("Output"),
        }
    }
}

/// A linguistic input or output variable.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Variable {
    pub(crate) name: Option<String>,
    pub(crate) range: Option<RangeInclusive<f64>>,
    pub(crate) num_mfs: Option<i64>,
    pub(crate) membership_functions: Vec<MembershipFunction>,
}

impl Variable {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// `low..=high` as written; `low <= high` is not enforced.
    pub fn range(&self) -> Option<&RangeInclusive<f64>> {
        self.range.as_ref()
    }

    /// Declared count; may disagree with [`Variable::membership_functions`].
    pub fn num_mfs(&self) -> Option<i64> {
        self.num_mfs
    }

    pub fn membership_functions(&self) -> &[MembershipFunction] {
        &self.membership_functions
    }

    /// Looks up a membership function by its 1-based parse-order index.
    pub fn membership_function(&self, index: usize) -> Option<&MembershipFunction> {
        index.checked_sub(1).and_then(|i| self.membership_functions.get(i))
    }

    /// Evenly spaced points covering the variable's range.
    ///
    /// If the step value is not provided, it defaults to 0.1. Returns `None` when the
    /// block had no `Range`, the step is not a positive finite number, or the range
    /// is not finite or too wide to count its points in a `usize`.
    pub fn universe(&self, step: Option<f64>) -> Option<Linspace> {
        let range = self.range.as_ref()?;
        let step = step.unwrap_or(0.1);
        if !(step.is_finite() && step > 0.) {
            return None;
        }
        let min_u = *range.start();
        let max_u = *range.end();
        let steps = ((max_u - min_u) / step).floor();
        if !steps.is_finite() || steps >= usize::MAX as f64 {
            return None;
        }
        // An inverted range collapses to the single point min_u.
        let num = (steps.max(0.) as usize).checked_add(1)?;

        Some(Linspace::new(min_u, max_u, num))
    }

    pub(crate) fn push_membership_function(&mut self, name: String, method: String, args: Vec<f64>) {
        let index = self.membership_functions.len() + 1;

        self.membership_functions.push(MembershipFunction {
            index,
            name,
            method,
            args,
        });
    }
}

/// One `MFn=` entry of a variable.
#[derive(Clone, Debug, PartialEq)]
pub struct MembershipFunction {
    pub(crate) index: usize,
    pub(crate) name: String,
    pub(crate) method: String,
    pub(crate) args: Vec<f64>,
}

impl MembershipFunction {
    /// 1-based position in parse order, independent of the `MFn` label.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The method name exactly as written; not checked against [`MfKind`].
    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn args(&self) -> &[f64] {
        &self.args
    }

    pub fn kind(&self) -> Result<MfKind, MembershipError> {
        self.method.parse()
    }

    pub fn evaluate(&self, x: f64) -> Result<f64, MembershipError> {
        self.kind()?.call(x, &self.args)
    }

    /// Samples the function over `points`, pairing each point with its degree.
    pub fn curve(&self, points: impl IntoIterator<Item = f64>) -> Result<Vec<(f64, f64)>, MembershipError> {
        let kind = self.kind()?;

        points
            .into_iter()
            .map(|x| kind.call(x, &self.args).map(|y| (x, y)))
            .collect()
    }
}

/// The connective joining a rule's antecedents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RuleType {
    And,
    Or,
}

impl RuleType {
    /// `1` is And, every other flag is Or.
    pub fn from_flag(flag: i64) -> Self {
        if flag == 1 {
            Self::And
        } else {
            Self::Or
        }
    }
}

/// One line of the `[Rules]` block.
///
/// References are 1-based positions into the document's inputs/outputs. By
/// convention `0` means "don't care" and a negative value negates the referenced
/// membership function; neither is interpreted here.
#[derive(Clone, Debug, PartialEq)]
pub struct Rule {
    pub(crate) index: usize,
    pub(crate) inputs: Vec<i64>,
    pub(crate) outputs: Vec<i64>,
    pub(crate) weight: f64,
    pub(crate) rule_type: RuleType,
}

impl Rule {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn inputs(&self) -> &[i64] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[i64] {
        &self.outputs
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn rule_type(&self) -> RuleType {
        self.rule_type
    }
}
