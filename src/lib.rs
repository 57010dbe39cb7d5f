//! Reader for MATLAB-style Fuzzy Inference System (`.fis`) documents.
//!
//! [`parse`] turns the text of a FIS document into a [`FisDocument`]: the
//! `[System]` metadata, the `[Input..]` and `[Output..]` variables with their
//! membership functions, and the `[Rules]`. The [`membership`] module holds the
//! standard membership functions those documents refer to by name.
//!
//! ```
//! use fis_format::{parse, RuleType};
//!
//! let doc = parse(
//!     "[System]
//! Name='heater'
//!
//! [Input1]
//! Name='temperature'
//! Range=[0 40]
//! MF1='cold':'zmf',[5 15]
//!
//! [Output1]
//! Name='power'
//! Range=[0 100]
//! MF1='high':'trimf',[50 100 100]
//!
//! [Rules]
//! 1, 1 (1) : 1
//! ",
//! )?;
//!
//! let cold = doc.input(1).and_then(|var| var.membership_function(1)).unwrap();
//! assert_eq!(cold.evaluate(0.)?, 1.);
//! assert_eq!(doc.rules()[0].rule_type(), RuleType::And);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Reading files and running inference are left to the caller.

mod document;
mod error;
mod linspace;
pub mod membership;
mod parser;

pub use document::{
    Direction, FisDocument, MembershipFunction, Rule, RuleType, SystemBlock, SystemKey, SystemValue, Variable,
};
pub use error::{FieldError, FisFormatError, MembershipError};
pub use linspace::Linspace;
pub use membership::MfKind;
pub use parser::parse;

#[test]
fn test_minimal_document() {
    let text = "[System]
Name=\"test\"
NumInputs=1
NumOutputs=1
NumRules=1

[Input1]
Name='in'
Range=[0 10]
NumMFs=1
MF1='mid':'trimf',[0 5 10]

[Output1]
Name='out'
Range=[0 10]
NumMFs=1
MF1='mid':'trimf',[0 5 10]

[Rules]
1, 1 (1):1
";

    let doc = parse(text).unwrap();

    assert_eq!(doc.system().name(), Some("test"));
    assert_eq!(doc.inputs().len(), 1);
    assert_eq!(doc.outputs().len(), 1);
    assert_eq!(doc.rules().len(), 1);

    let rule = &doc.rules()[0];
    assert_eq!(rule.index(), 1);
    assert_eq!(rule.rule_type(), RuleType::And);
    assert_eq!(rule.weight(), 1.0);
    assert_eq!(rule.inputs(), [1]);
    assert_eq!(rule.outputs(), [1]);

    let input = doc.input(1).unwrap();
    assert_eq!(input.name(), Some("in"));
    assert_eq!(input.range(), Some(&(0.0..=10.0)));

    let mf = &input.membership_functions()[0];
    assert_eq!(mf.index(), 1);
    assert_eq!(mf.method(), "trimf");
    assert_eq!(mf.kind(), Ok(MfKind::Trimf));
    assert_eq!(mf.args(), [0., 5., 10.]);

    // Sample the output curve over its universe the way an inference engine would.
    let output = doc.output(1).unwrap();
    let universe = output.universe(Some(2.5)).unwrap();
    let curve = output.membership_functions()[0].curve(universe).unwrap();
    assert_eq!(curve, [(0., 0.), (2.5, 0.5), (5., 1.), (7.5, 0.5), (10., 0.)]);
}

#[test]
fn test_document_lookups() {
    let doc: FisDocument = "[System]
[Input1]
Range=[-1 1]
[Input2]
Name='b'
[Output1]
Name='z'
[Rules]
1 -2, 0 (0.5) : 0
"
    .parse()
    .unwrap();

    assert_eq!(doc.system().iter().count(), 0);
    assert_eq!(doc.variables(Direction::Input).len(), 2);
    assert_eq!(doc.input(1).and_then(Variable::name), None);
    assert_eq!(doc.input(2).and_then(Variable::name), Some("b"));
    assert!(doc.input(0).is_none());
    assert!(doc.input(3).is_none());
    assert_eq!(doc.output(1).and_then(Variable::name), Some("z"));
    assert_eq!(doc.rules()[0].rule_type(), RuleType::Or);
    assert_eq!(doc.rules()[0].outputs(), [0]);
}
