//! Parser for the block-structured FIS text format.
//!
//! ```text
//! [System]
//! Name='tipper'
//! NumInputs=1
//!
//! [Input1]
//! Name='service'
//! Range=[0 10]
//! MF1='poor':'gaussmf',[1.5 0]
//!
//! [Output1]
//! ...
//!
//! [Rules]
//! 1, 1 (1) : 1
//! ```
//!
//! A block runs from the line after its `[Header]` up to the first blank line or the
//! next line starting with `[`. Each section is found by its own scan over the
//! lines, so blocks may appear in any order after `[System]`.

use std::str::FromStr;

use tracing::{debug, trace};

use crate::document::{Direction, FisDocument, Rule, RuleType, SystemBlock, SystemKey, SystemValue, Variable};
use crate::error::{FieldError, FisFormatError};

const SYSTEM_HEADER: &str = "[System]";
const RULES_HEADER: &str = "[Rules]";

/// Parses the full text of a FIS document.
///
/// Fails if the text does not start with `[System]`, or has no input block, no
/// output block or no rules. A line inside a block that does not fit its grammar
/// fails with [`FisFormatError::MalformedField`], naming the block and line.
/// Declared counts (`NumInputs`, `NumMFs`, ...) are kept as metadata and never
/// checked against what was decoded.
pub fn parse(text: &str) -> Result<FisDocument, FisFormatError> {
    let lines: Vec<&str> = text.lines().collect();

    let system = parse_system(&lines)?;
    let inputs = parse_variables(&lines, Direction::Input)?;
    let outputs = parse_variables(&lines, Direction::Output)?;
    let rules = parse_rules(&lines)?;

    debug!(
        name = system.name(),
        inputs = inputs.len(),
        outputs = outputs.len(),
        rules = rules.len(),
        "parsed FIS document"
    );

    Ok(FisDocument {
        system,
        inputs,
        outputs,
        rules,
    })
}

impl FromStr for FisDocument {
    type Err = FisFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

fn is_block_end(line: &str) -> bool {
    line.trim().is_empty() || line.starts_with('[')
}

/// The lines of the block whose header sits at `header_idx`, with 1-based line numbers.
fn block_body<'a>(lines: &'a [&'a str], header_idx: usize) -> impl Iterator<Item = (usize, &'a str)> + 'a {
    lines
        .iter()
        .enumerate()
        .skip(header_idx + 1)
        .map(|(i, line)| (i + 1, *line))
        .take_while(|(_, line)| !is_block_end(line))
}

fn block_name(header: &str) -> &str {
    let header = header.trim();
    let header = header.strip_prefix('[').unwrap_or(header);
    header.strip_suffix(']').unwrap_or(header)
}

fn malformed(block: &str, line: usize) -> impl FnOnce(FieldError) -> FisFormatError + '_ {
    move |source| FisFormatError::MalformedField {
        block: block.to_owned(),
        line,
        source,
    }
}

fn parse_system(lines: &[&str]) -> Result<SystemBlock, FisFormatError> {
    if lines.first() != Some(&SYSTEM_HEADER) {
        return Err(FisFormatError::MissingSystemHeader);
    }

    let mut system = SystemBlock::default();

    for (line_no, line) in block_body(lines, 0) {
        let Some(key) = SystemKey::ALL.into_iter().find(|key| line.starts_with(key.label())) else {
            continue;
        };
        let value = system_value(key, line).map_err(malformed(block_name(SYSTEM_HEADER), line_no))?;

        system.0.insert(key, value);
    }

    Ok(system)
}

fn system_value(key: SystemKey, line: &str) -> Result<SystemValue, FieldError> {
    let value = unquote(value_of(line)?);

    if key.is_count() {
        parse_int(value).map(SystemValue::Count)
    } else {
        Ok(SystemValue::Text(value.to_owned()))
    }
}

fn parse_variables(lines: &[&str], direction: Direction) -> Result<Vec<Variable>, FisFormatError> {
    let prefix = direction.header_prefix();
    let mut variables = Vec::new();

    for (header_idx, header) in lines.iter().enumerate().filter(|(_, line)| line.starts_with(prefix)) {
        let block = block_name(header);
        trace!(block, line = header_idx + 1, "found variable block");

        let mut variable = Variable::default();

        for (line_no, line) in block_body(lines, header_idx) {
            variable_field(&mut variable, line).map_err(malformed(block, line_no))?;
        }

        variables.push(variable);
    }

    if variables.is_empty() {
        return Err(FisFormatError::EmptyVariableSet(direction));
    }

    Ok(variables)
}

fn variable_field(variable: &mut Variable, line: &str) -> Result<(), FieldError> {
    if line.starts_with("Name") {
        variable.name = Some(unquote(value_of(line)?).to_owned());
    } else if line.starts_with("Range") {
        let bounds = number_list(unbracket(value_of(line)?), parse_float)?;
        let &[low, high] = bounds.as_slice() else {
            return Err(FieldError::InvalidRange { found: bounds.len() });
        };
        variable.range = Some(low..=high);
    } else if line.starts_with("NumMFs") {
        variable.num_mfs = Some(parse_int(unquote(value_of(line)?))?);
    } else if line.starts_with("MF") {
        // MF<n>='<name>':'<method>',[<args>]
        let (name, rest) = value_of(line)?
            .split_once(':')
            .ok_or(FieldError::MissingSeparator(':'))?;
        let (method, args) = rest.split_once(',').ok_or(FieldError::MissingSeparator(','))?;
        let args = number_list(unbracket(args.trim()), parse_float)?;

        variable.push_membership_function(
            unquote(name.trim()).to_owned(),
            unquote(method.trim()).to_owned(),
            args,
        );
    }

    Ok(())
}

fn parse_rules(lines: &[&str]) -> Result<Vec<Rule>, FisFormatError> {
    let mut rules = Vec::new();

    if let Some(header_idx) = lines.iter().position(|line| *line == RULES_HEADER) {
        trace!(line = header_idx + 1, "found rules block");

        for (line_no, line) in block_body(lines, header_idx) {
            let rule =
                decode_rule(rules.len() + 1, line).map_err(malformed(block_name(RULES_HEADER), line_no))?;
            rules.push(rule);
        }
    }

    if rules.is_empty() {
        return Err(FisFormatError::EmptyRuleSet);
    }

    Ok(rules)
}

/// `<inputs>, <outputs> (<weight>) : <flag>`
fn decode_rule(index: usize, line: &str) -> Result<Rule, FieldError> {
    let (inputs, rest) = line.split_once(',').ok_or(FieldError::MissingSeparator(','))?;
    let (outputs, rest) = rest.split_once('(').ok_or(FieldError::MissingSeparator('('))?;
    let (weight, flag) = rest.split_once(':').ok_or(FieldError::MissingSeparator(':'))?;

    let weight = weight.trim();
    let weight = weight.strip_suffix(')').unwrap_or(weight).trim();

    Ok(Rule {
        index,
        inputs: number_list(inputs.trim(), parse_int)?,
        outputs: number_list(outputs.trim(), parse_int)?,
        weight: parse_float(weight)?,
        rule_type: RuleType::from_flag(parse_int(flag.trim())?),
    })
}

/// The text after the first `=`, trimmed.
fn value_of(line: &str) -> Result<&str, FieldError> {
    line.split_once('=')
        .map(|(_, value)| value.trim())
        .ok_or(FieldError::MissingSeparator('='))
}

/// Strips at most one quote character from each end.
fn unquote(value: &str) -> &str {
    const QUOTES: [char; 2] = ['"', '\''];

    let value = value.strip_prefix(QUOTES).unwrap_or(value);
    value.strip_suffix(QUOTES).unwrap_or(value)
}

fn unbracket(value: &str) -> &str {
    let value = value.strip_prefix('[').unwrap_or(value);
    value.strip_suffix(']').unwrap_or(value)
}

/// Numbers separated by single spaces. An empty token (e.g. from a double space) is an error.
fn number_list<T>(list: &str, parse: impl Fn(&str) -> Result<T, FieldError>) -> Result<Vec<T>, FieldError> {
    list.split(' ').map(parse).collect()
}

fn parse_int(token: &str) -> Result<i64, FieldError> {
    token.parse().map_err(|source| FieldError::InvalidInteger {
        token: token.to_owned(),
        source,
    })
}

fn parse_float(token: &str) -> Result<f64, FieldError> {
    token.parse().map_err(|source| FieldError::InvalidFloat {
        token: token.to_owned(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::error::MembershipError;

    const TIPPER: &str = "[System]
Name='tipper'
Type='mamdani'
Version=2.0
NumInputs=2
NumOutputs=1
NumRules=3
AndMethod='min'
OrMethod='max'
ImpMethod='min'
AggMethod='max'
DefuzzMethod='centroid'

[Input1]
Name='service'
Range=[0 10]
NumMFs=3
MF1='poor':'gaussmf',[1.5 0]
MF2='good':'gaussmf',[1.5 5]
MF3='excellent':'gaussmf',[1.5 10]

[Input2]
Name='food'
Range=[0 10]
NumMFs=2
MF1='rancid':'trapmf',[-2 0 1 3]
MF2='delicious':'trapmf',[7 9 10 12]

[Output1]
Name='tip'
Range=[0 30]
NumMFs=3
MF1='cheap':'trimf',[0 5 10]
MF2='average':'trimf',[10 15 20]
MF3='generous':'trimf',[20 25 30]

[Rules]
1 1, 1 (1) : 2
2 0, 2 (1) : 1
3 2, 3 (1) : 2
";

    // Line 2 holds NumInputs, line 8 the input Range, line 19 the only rule.
    const MINIMAL: &str = "[System]
NumInputs=1
NumOutputs=1
NumRules=1

[Input1]
Name='x'
Range=[0 10]
NumMFs=1
MF1='mid':'trimf',[0 5 10]

[Output1]
Name='y'
Range=[0 10]
NumMFs=1
MF1='mid':'trimf',[0 5 10]

[Rules]
1, 1 (1):1
";

    fn malformed_at(err: FisFormatError) -> (String, usize, FieldError) {
        match err {
            FisFormatError::MalformedField { block, line, source } => (block, line, source),
            other => panic!("expected MalformedField, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_tipper() {
        let doc = parse(TIPPER).unwrap();
        let system = doc.system();

        assert_eq!(system.name(), Some("tipper"));
        assert_eq!(system.fis_type(), Some("mamdani"));
        assert_eq!(system.version(), Some("2.0"));
        assert_eq!(system.num_inputs(), Some(2));
        assert_eq!(system.num_outputs(), Some(1));
        assert_eq!(system.num_rules(), Some(3));
        assert_eq!(system.and_method(), Some("min"));
        assert_eq!(system.or_method(), Some("max"));
        assert_eq!(system.imp_method(), Some("min"));
        assert_eq!(system.agg_method(), Some("max"));
        assert_eq!(system.defuzz_method(), Some("centroid"));

        assert_eq!(doc.inputs().len(), 2);
        assert_eq!(doc.outputs().len(), 1);
        assert_eq!(doc.rules().len(), 3);

        let food = doc.input(2).unwrap();
        assert_eq!(food.name(), Some("food"));
        assert_eq!(food.range(), Some(&(0. ..=10.)));
        assert_eq!(food.num_mfs(), Some(2));

        let delicious = food.membership_function(2).unwrap();
        assert_eq!(delicious.index(), 2);
        assert_eq!(delicious.name(), "delicious");
        assert_eq!(delicious.method(), "trapmf");
        assert_eq!(delicious.args(), [7., 9., 10., 12.]);

        let tip = doc.output(1).unwrap();
        assert_eq!(tip.range(), Some(&(0. ..=30.)));
        assert_eq!(tip.membership_function(3).unwrap().evaluate(25.), Ok(1.));

        let rule = &doc.rules()[1];
        assert_eq!(rule.index(), 2);
        assert_eq!(rule.inputs(), [2, 0]);
        assert_eq!(rule.outputs(), [2]);
        assert_eq!(rule.weight(), 1.);
        assert_eq!(rule.rule_type(), RuleType::And);
        assert_eq!(doc.rules()[0].rule_type(), RuleType::Or);
    }

    #[test]
    fn test_from_str() {
        let doc: FisDocument = MINIMAL.parse().unwrap();
        assert_eq!(doc, parse(MINIMAL).unwrap());
    }

    #[test]
    fn test_missing_system_header() {
        for text in [
            "",
            "\n[System]\nName='x'",
            " [System]",
            "[system]",
            "[Input1]\nName='x'\n",
        ] {
            assert!(matches!(parse(text), Err(FisFormatError::MissingSystemHeader)), "{text:?}");
        }

        let shifted = format!("[Input0]\n{MINIMAL}");
        assert!(matches!(parse(&shifted), Err(FisFormatError::MissingSystemHeader)));
    }

    #[test]
    fn test_empty_variable_sets() {
        let no_inputs = MINIMAL.replace("[Input1]", "[Inlet1]");
        assert!(matches!(
            parse(&no_inputs),
            Err(FisFormatError::EmptyVariableSet(Direction::Input))
        ));

        let no_outputs = MINIMAL.replace("[Output1]", "[Result1]");
        assert!(matches!(
            parse(&no_outputs),
            Err(FisFormatError::EmptyVariableSet(Direction::Output))
        ));
    }

    #[test]
    fn test_empty_rule_set() {
        let no_header = MINIMAL.replace("[Rules]\n", "");
        assert!(matches!(parse(&no_header), Err(FisFormatError::EmptyRuleSet)));

        let empty_block = MINIMAL.replace("[Rules]\n", "[Rules]\n\n");
        assert!(matches!(parse(&empty_block), Err(FisFormatError::EmptyRuleSet)));

        // Prefix matches are not enough for the rules header.
        let renamed = MINIMAL.replace("[Rules]", "[Rules1]");
        assert!(matches!(parse(&renamed), Err(FisFormatError::EmptyRuleSet)));
    }

    #[test]
    fn test_declared_counts_not_checked() {
        let text = MINIMAL
            .replace("NumInputs=1", "NumInputs=4")
            .replace("NumRules=1", "NumRules=0")
            .replacen("NumMFs=1", "NumMFs=7", 1);
        let doc = parse(&text).unwrap();

        assert_eq!(doc.system().num_inputs(), Some(4));
        assert_eq!(doc.system().num_rules(), Some(0));
        assert_eq!(doc.inputs().len(), 1);
        assert_eq!(doc.rules().len(), 1);
        assert_eq!(doc.input(1).unwrap().num_mfs(), Some(7));
        assert_eq!(doc.input(1).unwrap().membership_functions().len(), 1);
    }

    #[test]
    fn test_mf_index_follows_parse_order() {
        let text = MINIMAL.replace(
            "MF1='mid':'trimf',[0 5 10]\n\n[Output1]",
            "MF2='high':'smf',[5 10]\nMF1='low':'zmf',[0 5]\n\n[Output1]",
        );
        let doc = parse(&text).unwrap();
        let mfs = doc.input(1).unwrap().membership_functions();

        assert_eq!(mfs.len(), 2);
        assert_eq!(mfs[0].index(), 1);
        assert_eq!(mfs[0].name(), "high");
        assert_eq!(mfs[1].index(), 2);
        assert_eq!(mfs[1].name(), "low");
    }

    #[test]
    fn test_system_block_lenient_keys() {
        let text = MINIMAL.replace(
            "NumInputs=1\n",
            "NumInputs=1\nDescription='not a known key'\n% comment without separator\nName=\"quoted\"\n",
        );
        let doc = parse(&text).unwrap();

        assert_eq!(doc.system().name(), Some("quoted"));
        assert_eq!(doc.system().get(SystemKey::Name), Some(&SystemValue::Text("quoted".into())));
        assert_eq!(doc.system().iter().count(), 4);
        assert_eq!(doc.system().fis_type(), None);
    }

    #[test]
    fn test_system_block_stops_at_header() {
        let text = MINIMAL.replace("NumRules=1\n\n[Input1]", "NumRules=1\n[Input1]");
        let doc = parse(&text).unwrap();

        // `Name='x'` belongs to the input block, not to [System].
        assert_eq!(doc.system().name(), None);
        assert_eq!(doc.input(1).unwrap().name(), Some("x"));
    }

    #[test]
    fn test_single_layer_unquote() {
        assert_eq!(unquote("'x'"), "x");
        assert_eq!(unquote("\"x\""), "x");
        assert_eq!(unquote("''x''"), "'x'");
        assert_eq!(unquote("x"), "x");
        assert_eq!(unquote("'"), "");
        assert_eq!(unbracket("[[1 2]]"), "[1 2]");
    }

    #[test]
    fn test_rule_conventions() {
        let text = MINIMAL.replace("1, 1 (1):1", "-1 0, 1 -2 (0.5) : 1\n0 2, 0 1 (0.25):0");
        let doc = parse(&text).unwrap();
        let rules = doc.rules();

        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].inputs(), [-1, 0]);
        assert_eq!(rules[0].outputs(), [1, -2]);
        assert_eq!(rules[0].weight(), 0.5);
        assert_eq!(rules[0].rule_type(), RuleType::And);
        assert_eq!(rules[1].index(), 2);
        assert_eq!(rules[1].weight(), 0.25);
        assert_eq!(rules[1].rule_type(), RuleType::Or);
    }

    #[test]
    fn test_range_order_and_method_not_validated() {
        let text = MINIMAL
            .replacen("Range=[0 10]", "Range=[10 0]", 1)
            .replacen("MF1='mid':'trimf',[0 5 10]", "MF1='x':'linsmf',[1 2]", 1);
        let doc = parse(&text).unwrap();
        let input = doc.input(1).unwrap();

        assert_eq!(input.range(), Some(&(10.0..=0.0)));

        let mf = input.membership_function(1).unwrap();
        assert_eq!(mf.name(), "x");
        assert_eq!(mf.method(), "linsmf");
        assert_eq!(mf.args(), [1., 2.]);
        assert_eq!(mf.kind(), Err(MembershipError::UnknownMethod("linsmf".into())));
        assert_eq!(mf.evaluate(1.5), Err(MembershipError::UnknownMethod("linsmf".into())));
    }

    #[test]
    fn test_only_first_rules_block() {
        let text = format!("{MINIMAL}\n[Rules]\n1, 1 (1):2\n");
        let doc = parse(&text).unwrap();

        assert_eq!(doc.rules().len(), 1);
        assert_eq!(doc.rules()[0].rule_type(), RuleType::And);
    }

    #[test]
    fn test_crlf_line_endings() {
        let text = MINIMAL.replace('\n', "\r\n");
        assert_eq!(parse(&text).unwrap(), parse(MINIMAL).unwrap());
    }

    #[test]
    fn test_malformed_rule() {
        let text = MINIMAL.replace("1, 1 (1):1", "1, 1");
        let (block, line, source) = malformed_at(parse(&text).unwrap_err());

        assert_eq!(block, "Rules");
        assert_eq!(line, 19);
        assert_eq!(source, FieldError::MissingSeparator('('));

        let text = MINIMAL.replace("1, 1 (1):1", "1 1 1 (1):1");
        let (_, _, source) = malformed_at(parse(&text).unwrap_err());
        assert_eq!(source, FieldError::MissingSeparator(','));

        let text = MINIMAL.replace("1, 1 (1):1", "1, 1 (1)");
        let (_, _, source) = malformed_at(parse(&text).unwrap_err());
        assert_eq!(source, FieldError::MissingSeparator(':'));

        let text = MINIMAL.replace("1, 1 (1):1", "1  2, 1 (1):1");
        let (_, _, source) = malformed_at(parse(&text).unwrap_err());
        assert!(matches!(source, FieldError::InvalidInteger { token, .. } if token.is_empty()));

        let text = MINIMAL.replace("1, 1 (1):1", "1, 1 (heavy):1");
        let (_, _, source) = malformed_at(parse(&text).unwrap_err());
        assert!(matches!(source, FieldError::InvalidFloat { token, .. } if token == "heavy"));
    }

    #[test]
    fn test_malformed_variable_fields() {
        let text = MINIMAL.replacen("Range=[0 10]", "Range=[0 ten]", 1);
        let (block, line, source) = malformed_at(parse(&text).unwrap_err());
        assert_eq!(block, "Input1");
        assert_eq!(line, 8);
        assert!(matches!(source, FieldError::InvalidFloat { token, .. } if token == "ten"));

        let text = MINIMAL.replacen("Range=[0 10]", "Range=[0 5 10]", 1);
        let (_, _, source) = malformed_at(parse(&text).unwrap_err());
        assert_eq!(source, FieldError::InvalidRange { found: 3 });

        let text = MINIMAL.replacen(
            "MF1='mid':'trimf',[0 5 10]\n\n[Output1]",
            "MF1='mid':'trimf' [0 5 10]\n\n[Output1]",
            1,
        );
        let (block, line, source) = malformed_at(parse(&text).unwrap_err());
        assert_eq!(block, "Input1");
        assert_eq!(line, 10);
        assert_eq!(source, FieldError::MissingSeparator(','));
    }

    #[test]
    fn test_malformed_system_count() {
        let text = MINIMAL.replace("NumInputs=1", "NumInputs=one");
        let err = parse(&text).unwrap_err();
        assert_eq!(
            err.to_string(),
            "malformed field in [System] at line 2: invalid integer \"one\""
        );
        let (block, line, _) = malformed_at(err);
        assert_eq!(block, "System");
        assert_eq!(line, 2);
    }

    #[test]
    fn test_inputs_checked_before_rules() {
        let text = MINIMAL
            .replacen("Range=[0 10]", "Range=[0 ten]", 1)
            .replace("[Rules]\n", "");
        assert!(matches!(
            parse(&text),
            Err(FisFormatError::MalformedField { .. })
        ));
    }

    #[test]
    fn test_structural_messages() {
        assert_eq!(
            FisFormatError::MissingSystemHeader.to_string(),
            "FIS file must start with a system block"
        );
        assert_eq!(
            FisFormatError::EmptyVariableSet(Direction::Output).to_string(),
            "FIS file must have at least one Input and one Output block (no Output block found)"
        );
        assert_eq!(
            FisFormatError::EmptyRuleSet.to_string(),
            "FIS file must have one or more rule(s)"
        );
    }
}
