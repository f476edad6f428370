//! Pagination from the `limit` and `page` meta-parameters.

use serde::{Deserialize, Serialize};

use crate::error::{Error, QueryResult};
use crate::params::QueryParams;
use crate::schema::MetaParameter;

/// Page size used when neither the request nor the configuration set one.
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// Pagination state of one request.
///
/// `size` and `current` are resolved from the request; `items` and `last`
/// are filled in by [`Page::finalize`] once the total is known.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub size: u64,
    pub items: u64,
    pub last: u64,
    pub current: u64,
}

impl Page {
    /// Resolve size and current page of a request.
    ///
    /// Only the first value of `limit` and `page` is read.
    ///
    /// # Errors
    /// - `Error::InvalidValue` if `limit` or `page` is not an unsigned integer,
    ///   if `limit` is 0 or above `max_size`
    /// - `Error::InvalidPage` if `page` is 0
    pub fn resolve(params: &QueryParams, default_size: u64, max_size: Option<u64>) -> QueryResult<Self> {
        let limit = MetaParameter::Limit.name();
        let size = params
            .first(limit)
            .map_or(Ok(default_size), |raw| parse_unsigned(limit, raw))?;
        if size == 0 {
            return Err(Error::invalid_value(limit, "0", "page size must be positive"));
        }
        if let Some(max) = max_size
            && size > max
        {
            return Err(Error::invalid_value(
                limit,
                size.to_string(),
                format!("page size exceeds maximum of {max}"),
            ));
        }

        let page = MetaParameter::Page.name();
        let current = params
            .first(page)
            .map_or(Ok(1), |raw| parse_unsigned(page, raw))?;
        if current == 0 {
            return Err(Error::InvalidPage);
        }

        // Reject pages whose offset cannot be represented.
        if (current - 1).checked_mul(size).is_none() {
            return Err(Error::invalid_value(
                page,
                current.to_string(),
                "page offset overflows",
            ));
        }

        Ok(Self {
            size,
            items: 0,
            last: 0,
            current,
        })
    }

    /// Number of documents to skip: `(current - 1) * size`.
    #[must_use]
    pub fn skip(&self) -> u64 {
        self.current.saturating_sub(1).saturating_mul(self.size)
    }

    /// Record the total number of matching documents.
    pub fn finalize(&mut self, total: u64) {
        self.items = total;
        self.last = if self.size == 0 {
            0
        } else {
            total.div_ceil(self.size)
        };
    }
}

fn parse_unsigned(name: &str, raw: &str) -> QueryResult<u64> {
    raw.parse::<u64>()
        .map_err(|e| Error::invalid_value(name, raw, e.to_string()))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_apply_when_absent() {
        let page = Page::resolve(&QueryParams::new(), DEFAULT_PAGE_SIZE, None).unwrap();
        assert_eq!(page.size, 20);
        assert_eq!(page.current, 1);
        assert_eq!(page.skip(), 0);
    }

    #[test]
    fn skip_is_offset_of_current_page() {
        let page = Page::resolve(&QueryParams::parse("limit=10&page=3"), DEFAULT_PAGE_SIZE, None).unwrap();
        assert_eq!(page.skip(), 20);
    }

    #[test]
    fn page_zero_is_rejected() {
        let err = Page::resolve(&QueryParams::parse("page=0"), DEFAULT_PAGE_SIZE, None).unwrap_err();
        assert_eq!(err, Error::InvalidPage);
    }

    #[test]
    fn limit_zero_is_rejected() {
        let err = Page::resolve(&QueryParams::parse("limit=0"), DEFAULT_PAGE_SIZE, None).unwrap_err();
        assert!(matches!(err, Error::InvalidValue { ref name, .. } if name == "limit"));
    }

    #[test]
    fn non_numeric_values_are_rejected() {
        for query in ["limit=ten", "page=-1", "page=1.5"] {
            let err = Page::resolve(&QueryParams::parse(query), DEFAULT_PAGE_SIZE, None).unwrap_err();
            assert!(matches!(err, Error::InvalidValue { .. }), "{query} produced {err}");
        }
    }

    #[test]
    fn maximum_size_is_enforced() {
        assert!(Page::resolve(&QueryParams::parse("limit=100"), DEFAULT_PAGE_SIZE, Some(100)).is_ok());
        let err = Page::resolve(&QueryParams::parse("limit=101"), DEFAULT_PAGE_SIZE, Some(100)).unwrap_err();
        assert!(matches!(err, Error::InvalidValue { .. }));
    }

    #[test]
    fn overflowing_offset_is_rejected() {
        let query = format!("limit={}&page={}", u64::MAX, 3);
        let err = Page::resolve(&QueryParams::parse(&query), DEFAULT_PAGE_SIZE, None).unwrap_err();
        assert!(matches!(err, Error::InvalidValue { ref name, .. } if name == "page"));
    }

    #[test]
    fn finalize_rounds_last_page_up() {
        let mut page = Page::resolve(&QueryParams::parse("limit=10"), DEFAULT_PAGE_SIZE, None).unwrap();
        page.finalize(25);
        assert_eq!(page.items, 25);
        assert_eq!(page.last, 3);

        page.finalize(30);
        assert_eq!(page.last, 3);

        page.finalize(0);
        assert_eq!(page.last, 0);
    }

    #[test]
    fn serializes_all_counters() {
        let mut page = Page::resolve(&QueryParams::parse("limit=5&page=2"), DEFAULT_PAGE_SIZE, None).unwrap();
        page.finalize(11);
        assert_eq!(
            serde_json::to_value(page).unwrap(),
            json!({"size": 5, "items": 11, "last": 3, "current": 2})
        );
    }
}
