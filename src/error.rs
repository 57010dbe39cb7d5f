use std::num::{ParseFloatError, ParseIntError};

use thiserror::Error;

use crate::document::Direction;

/// Failure to turn FIS text into a [`FisDocument`](crate::FisDocument).
///
/// The first three variants are structural: a required block is missing or empty.
/// [`FisFormatError::MalformedField`] covers a single line inside a recognized
/// block that does not match its grammar.
#[derive(Error, Debug)]
pub enum FisFormatError {
    #[error("FIS file must start with a system block")]
    MissingSystemHeader,

    #[error("FIS file must have at least one Input and one Output block (no {0} block found)")]
    EmptyVariableSet(Direction),

    #[error("FIS file must have one or more rule(s)")]
    EmptyRuleSet,

    /// `block` is the header text without brackets, `line` is 1-based.
    #[error("malformed field in [{block}] at line {line}: {source}")]
    MalformedField {
        block: String,
        line: usize,
        #[source]
        source: FieldError,
    },
}

/// Why a single field failed to decode.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FieldError {
    #[error("missing '{0}' separator")]
    MissingSeparator(char),

    #[error("invalid integer {token:?}")]
    InvalidInteger {
        token: String,
        #[source]
        source: ParseIntError,
    },

    #[error("invalid number {token:?}")]
    InvalidFloat {
        token: String,
        #[source]
        source: ParseFloatError,
    },

    #[error("range must have two bounds, found {found}")]
    InvalidRange { found: usize },
}

/// Failure to resolve or apply a membership function by name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MembershipError {
    #[error("unknown membership function {0:?}")]
    UnknownMethod(String),

    #[error("{method} takes {expected} parameters, got {found}")]
    ArityMismatch {
        method: &'static str,
        expected: usize,
        found: usize,
    },
}
