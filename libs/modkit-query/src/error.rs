use crate::kind::ParameterKind;
use crate::store::StoreError;

/// Unified error type for query construction and execution.
///
/// Every variant is request-scoped: construction is all-or-nothing, so an
/// error always means no query was produced.
///
/// ## HTTP Mapping
///
/// - `UnsupportedParameter`, `UnsupportedField`, `InvalidValue`, `InvalidPage` → 400
/// - `Store(StoreError::InvalidQuery)` → 400
/// - `UnsupportedKind`, any other `Store` → 500
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("parameter '{name}' is not supported")]
    UnsupportedParameter { name: String },

    #[error("unsupported field '{value}' in parameter '{name}'")]
    UnsupportedField { name: String, value: String },

    #[error("invalid value '{value}' for parameter '{name}': {reason}")]
    InvalidValue {
        name: String,
        value: String,
        reason: String,
    },

    #[error("page cannot be 0")]
    InvalidPage,

    #[error("parameter '{name}' has kind '{kind}' which cannot be filtered on")]
    UnsupportedKind { name: String, kind: ParameterKind },

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl Error {
    pub(crate) fn invalid_value(
        name: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Error::InvalidValue {
            name: name.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error was caused by the request rather than the server.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::UnsupportedParameter { .. }
                | Error::UnsupportedField { .. }
                | Error::InvalidValue { .. }
                | Error::InvalidPage
                | Error::Store(StoreError::InvalidQuery(_))
        )
    }

    /// Name of the offending query parameter, when there is one.
    #[must_use]
    pub fn parameter(&self) -> Option<&str> {
        match self {
            Error::UnsupportedParameter { name }
            | Error::UnsupportedField { name, .. }
            | Error::InvalidValue { name, .. }
            | Error::UnsupportedKind { name, .. } => Some(name),
            Error::InvalidPage | Error::Store(_) => None,
        }
    }
}

pub type QueryResult<T> = Result<T, Error>;
