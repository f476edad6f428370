//! Static catalog of query error definitions.

use http::StatusCode;

use crate::problem::Problem;

/// Static error definition from catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrDef {
    pub status: u16,
    pub title: &'static str,
    pub code: &'static str,
    pub type_url: &'static str,
}

impl ErrDef {
    /// Convert this error definition into a Problem with the given detail
    #[inline]
    pub fn as_problem(&self, detail: impl Into<String>) -> Problem {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Problem::new(status, self.title, detail.into())
            .with_code(self.code)
            .with_type(self.type_url)
    }
}

pub const UNSUPPORTED_PARAMETER: ErrDef = ErrDef {
    status: 400,
    title: "Unsupported Parameter",
    code: "query.unsupported_parameter",
    type_url: "urn:modkit:query:unsupported_parameter",
};

pub const UNSUPPORTED_FIELD: ErrDef = ErrDef {
    status: 400,
    title: "Unsupported Field",
    code: "query.unsupported_field",
    type_url: "urn:modkit:query:unsupported_field",
};

pub const INVALID_VALUE: ErrDef = ErrDef {
    status: 400,
    title: "Invalid Value",
    code: "query.invalid_value",
    type_url: "urn:modkit:query:invalid_value",
};

pub const INVALID_PAGE: ErrDef = ErrDef {
    status: 400,
    title: "Invalid Page",
    code: "query.invalid_page",
    type_url: "urn:modkit:query:invalid_page",
};

pub const INVALID_QUERY: ErrDef = ErrDef {
    status: 400,
    title: "Invalid Query",
    code: "query.invalid_query",
    type_url: "urn:modkit:query:invalid_query",
};

pub const UNSUPPORTED_KIND: ErrDef = ErrDef {
    status: 500,
    title: "Internal Server Error",
    code: "query.unsupported_kind",
    type_url: "urn:modkit:query:unsupported_kind",
};

pub const STORE_FAILURE: ErrDef = ErrDef {
    status: 500,
    title: "Internal Server Error",
    code: "query.store_failure",
    type_url: "urn:modkit:query:store_failure",
};
