use std::fmt;

use serde::{Deserialize, Serialize};

/// Value classification of a query parameter.
///
/// The first five variants are the scalar kinds the filter builder parses.
/// `Sequence` and `Record` describe non-scalar sequence elements; they can be
/// registered but never filtered on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterKind {
    Bool,
    Int,
    Uint,
    Float,
    String,
    Sequence,
    Record,
}

impl ParameterKind {
    #[must_use]
    pub const fn is_scalar(self) -> bool {
        !matches!(self, ParameterKind::Sequence | ParameterKind::Record)
    }
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterKind::Bool => write!(f, "bool"),
            ParameterKind::Int => write!(f, "int"),
            ParameterKind::Uint => write!(f, "uint"),
            ParameterKind::Float => write!(f, "float"),
            ParameterKind::String => write!(f, "string"),
            ParameterKind::Sequence => write!(f, "sequence"),
            ParameterKind::Record => write!(f, "record"),
        }
    }
}
