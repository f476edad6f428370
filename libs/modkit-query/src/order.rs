//! `sort` and `field` meta-parameters.

use std::collections::BTreeSet;
use std::fmt;

use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use crate::error::{Error, QueryResult};
use crate::schema::{MetaParameter, ParameterMap};

/// Leading marker of a descending sort token.
pub const DESCENDING_MARKER: char = '-';

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDir {
    #[serde(rename = "asc")]
    Asc,
    #[serde(rename = "desc")]
    Desc,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortKey {
    /// Raw token as received, marker included.
    pub token: String,
    pub field: String,
    pub dir: SortDir,
}

impl SortKey {
    #[must_use]
    pub fn parse(token: &str) -> Self {
        let (field, dir) = token
            .strip_prefix(DESCENDING_MARKER)
            .map_or((token, SortDir::Asc), |rest| (rest, SortDir::Desc));
        Self {
            token: token.to_owned(),
            field: field.to_owned(),
            dir,
        }
    }
}

/// Ordered sort keys. Serializes as the list of raw tokens.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[must_use]
pub struct SortSpec(pub Vec<SortKey>);

impl SortSpec {
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn keys(&self) -> &[SortKey] {
        &self.0
    }

    #[must_use]
    pub fn tokens(&self) -> Vec<&str> {
        self.0.iter().map(|k| k.token.as_str()).collect()
    }
}

impl Serialize for SortSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter().map(|k| &k.token))
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "(none)");
        }
        write!(f, "{}", self.tokens().join(", "))
    }
}

/// Fields to return. Empty means every field. Serializes as `{"name": 1, ...}`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[must_use]
pub struct Projection(BTreeSet<String>);

impl Projection {
    pub fn all() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl Serialize for Projection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for field in &self.0 {
            map.serialize_entry(field, &1)?;
        }
        map.end()
    }
}

/// Build the projection from the `field` values.
///
/// # Errors
/// Returns `Error::UnsupportedField` if a value is not a registered name.
pub fn build_projection(values: &[String], registry: &ParameterMap) -> QueryResult<Projection> {
    let mut fields = BTreeSet::new();
    for value in values {
        if !registry.contains_key(value) {
            tracing::debug!(value = %value, "rejecting unsupported projection field");
            return Err(Error::UnsupportedField {
                name: MetaParameter::Field.name().to_owned(),
                value: value.clone(),
            });
        }
        fields.insert(value.clone());
    }
    Ok(Projection(fields))
}

/// Build the sort specification from the `sort` values.
///
/// # Errors
/// Returns `Error::UnsupportedField` if a value, marker stripped, is not a registered name.
pub fn build_sort(values: &[String], registry: &ParameterMap) -> QueryResult<SortSpec> {
    values
        .iter()
        .map(|value| {
            let key = SortKey::parse(value);
            if registry.contains_key(&key.field) {
                Ok(key)
            } else {
                tracing::debug!(value = %value, "rejecting unsupported sort field");
                Err(Error::UnsupportedField {
                    name: MetaParameter::Sort.name().to_owned(),
                    value: value.clone(),
                })
            }
        })
        .collect::<QueryResult<Vec<_>>>()
        .map(SortSpec)
}
