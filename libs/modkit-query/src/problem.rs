//! RFC 9457 Problem Details for query failures.

use http::StatusCode;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::catalog;
use crate::error::Error;
use crate::store::StoreError;

/// Content type for Problem Details as per RFC 9457.
pub const APPLICATION_PROBLEM_JSON: &str = "application/problem+json";

#[allow(clippy::trivially_copy_pass_by_ref)] // serde requires &T signature
fn serialize_status_code<S>(status: &StatusCode, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u16(status.as_u16())
}

fn deserialize_status_code<'de, D>(deserializer: D) -> Result<StatusCode, D::Error>
where
    D: Deserializer<'de>,
{
    let code = u16::deserialize(deserializer)?;
    StatusCode::from_u16(code).map_err(serde::de::Error::custom)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[must_use]
pub struct Problem {
    #[serde(rename = "type")]
    pub type_url: String,
    pub title: String,
    /// Serializes as u16.
    #[serde(
        serialize_with = "serialize_status_code",
        deserialize_with = "deserialize_status_code"
    )]
    pub status: StatusCode,
    pub detail: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub instance: String,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ValidationViolation>>,
}

/// Offending query parameter of a 4xx problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationViolation {
    pub field: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl Problem {
    pub fn new(status: StatusCode, title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            type_url: "about:blank".to_owned(),
            title: title.into(),
            status,
            detail: detail.into(),
            instance: String::new(),
            code: String::new(),
            errors: None,
        }
    }

    pub fn with_type(mut self, type_url: impl Into<String>) -> Self {
        self.type_url = type_url.into();
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    pub fn with_errors(mut self, errors: Vec<ValidationViolation>) -> Self {
        self.errors = Some(errors);
        self
    }
}

impl From<&Error> for Problem {
    fn from(err: &Error) -> Self {
        let def = match err {
            Error::UnsupportedParameter { .. } => catalog::UNSUPPORTED_PARAMETER,
            Error::UnsupportedField { .. } => catalog::UNSUPPORTED_FIELD,
            Error::InvalidValue { .. } => catalog::INVALID_VALUE,
            Error::InvalidPage => catalog::INVALID_PAGE,
            Error::UnsupportedKind { .. } => catalog::UNSUPPORTED_KIND,
            Error::Store(StoreError::InvalidQuery(_)) => catalog::INVALID_QUERY,
            Error::Store(_) => catalog::STORE_FAILURE,
        };

        if !err.is_client_error() {
            tracing::error!(error = %err, code = def.code, "query failed on the server side");
            // Store and schema details stay in the logs.
            return def.as_problem("An internal error occurred while processing the query");
        }

        let problem = def.as_problem(err.to_string());
        let Some(name) = err.parameter() else {
            return problem;
        };
        problem.with_errors(vec![ValidationViolation {
            field: name.to_owned(),
            message: err.to_string(),
            code: Some(def.code.to_owned()),
        }])
    }
}

impl From<Error> for Problem {
    fn from(err: Error) -> Self {
        Problem::from(&err)
    }
}

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for Problem {
    fn into_response(self) -> axum::response::Response {
        use axum::http::HeaderValue;

        let status = self.status;
        let mut resp = axum::Json(self).into_response();
        *resp.status_mut() = status;
        resp.headers_mut().insert(
            axum::http::header::CONTENT_TYPE,
            HeaderValue::from_static(APPLICATION_PROBLEM_JSON),
        );
        resp
    }
}

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        Problem::from(&self).into_response()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[test]
    fn client_errors_map_to_400_with_violation() {
        let err = Error::InvalidValue {
            name: "age".to_owned(),
            value: "x".to_owned(),
            reason: "invalid digit found in string".to_owned(),
        };
        let problem = Problem::from(&err);
        assert_eq!(problem.status, StatusCode::BAD_REQUEST);
        assert_eq!(problem.code, "query.invalid_value");
        assert!(problem.detail.contains("'x'"));

        let errors = problem.errors.unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "age");
    }

    #[test]
    fn errors_without_parameter_have_no_violation() {
        let problem = Problem::from(Error::InvalidPage);
        assert_eq!(problem.status, StatusCode::BAD_REQUEST);
        assert!(problem.errors.is_none());

        let problem = Problem::from(Error::Store(StoreError::InvalidQuery("bad".to_owned())));
        assert!(problem.errors.is_none());
    }

    #[test]
    fn unsupported_field_names_the_meta_parameter() {
        let problem = Problem::from(Error::UnsupportedField {
            name: "sort".to_owned(),
            value: "-nope".to_owned(),
        });
        assert_eq!(problem.title, "Unsupported Field");
        assert!(problem.detail.contains("-nope"));
        let errors = problem.errors.unwrap();
        assert_eq!(errors[0].field, "sort");
        assert_eq!(errors[0].code.as_deref(), Some("query.unsupported_field"));
    }

    #[test]
    #[traced_test]
    fn store_rejected_query_is_a_client_problem() {
        let problem = Problem::from(Error::Store(StoreError::InvalidQuery(
            "invalid pattern '(' for 'name'".to_owned(),
        )));
        assert_eq!(problem.status, StatusCode::BAD_REQUEST);
        assert_eq!(problem.code, "query.invalid_query");
        assert!(problem.detail.contains("invalid pattern"));
        assert!(!logs_contain("query failed on the server side"));
    }

    #[test]
    #[traced_test]
    fn server_errors_hide_details() {
        let problem = Problem::from(Error::Store(StoreError::Backend("secret dsn".to_owned())));
        assert_eq!(problem.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!problem.detail.contains("secret"));
        assert!(problem.errors.is_none());
        assert!(logs_contain("query failed on the server side"));
    }

    #[test]
    fn problem_serializes_status_as_u16() {
        let json = serde_json::to_value(Problem::from(Error::InvalidPage)).unwrap();
        assert_eq!(json["status"], 400);
        assert_eq!(json["type"], "urn:modkit:query:invalid_page");
        assert!(json.get("instance").is_none());
    }

    #[test]
    fn problem_deserializes_status_from_u16() {
        let json = r#"{"type":"about:blank","title":"Invalid Page","status":400,"detail":"page cannot be 0","code":"query.invalid_page"}"#;
        let p: Problem = serde_json::from_str(json).unwrap();
        assert_eq!(p.status, StatusCode::BAD_REQUEST);
    }
}
