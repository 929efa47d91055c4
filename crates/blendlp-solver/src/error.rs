use thiserror::Error;

/// Which kind of model entity an identifier belongs to
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    Variable,
    Constraint,
}

impl std::fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdentifierKind::Variable => write!(f, "variable"),
            IdentifierKind::Constraint => write!(f, "constraint"),
        }
    }
}

/// Errors raised while building a problem
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Duplicate {kind} name: {name}")]
    DuplicateIdentifier { kind: IdentifierKind, name: String },
    #[error("Constraint {constraint} references unknown variable {reference}")]
    UnknownVariableReference { constraint: String, reference: String },
    #[error("Invalid bounds for variable {variable}: [{lower}, {upper}]")]
    InvalidBounds { variable: String, lower: f64, upper: f64 },
    #[error("Non-finite value in {context}: {value}")]
    NonFiniteValue { context: String, value: f64 },
}
