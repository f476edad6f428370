//! Query-string parameters → typed filter expression.
//!
//! Every non-meta parameter must be registered. Its raw values are parsed under
//! the registered kind; one value becomes an equality term, several values a
//! membership (`$in`) term. A single free-text string value becomes a pattern
//! term instead, and 24-character hex strings are read as identifier literals.

use std::collections::BTreeMap;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::error::{Error, QueryResult};
use crate::kind::ParameterKind;
use crate::object_id::ObjectId;
use crate::params::QueryParams;
use crate::schema::{MetaParameter, ParameterMap};

#[derive(Clone, Debug, PartialEq)]
pub enum FilterValue {
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    String(String),
    ObjectId(ObjectId),
    /// Unanchored, case-sensitive pattern match.
    Pattern(String),
}

impl Serialize for FilterValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FilterValue::Bool(b) => serializer.serialize_bool(*b),
            FilterValue::Int(i) => serializer.serialize_i64(*i),
            FilterValue::Uint(u) => serializer.serialize_u64(*u),
            FilterValue::Float(f) => serializer.serialize_f64(*f),
            FilterValue::String(s) => serializer.serialize_str(s),
            FilterValue::ObjectId(id) => id.serialize(serializer),
            FilterValue::Pattern(p) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("$regex", p)?;
                map.end()
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum FilterTerm {
    Value(FilterValue),
    /// Matches any of the values; order and duplicates are kept.
    In(Vec<FilterValue>),
}

impl FilterTerm {
    #[must_use]
    pub fn values(&self) -> &[FilterValue] {
        match self {
            FilterTerm::Value(v) => std::slice::from_ref(v),
            FilterTerm::In(vs) => vs,
        }
    }
}

impl Serialize for FilterTerm {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FilterTerm::Value(v) => v.serialize(serializer),
            FilterTerm::In(vs) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("$in", vs)?;
                map.end()
            }
        }
    }
}

/// Parameter name → filter term. Serializes as a store filter document.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
#[must_use]
pub struct FilterExpression(BTreeMap<String, FilterTerm>);

impl FilterExpression {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FilterTerm> {
        self.0.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterTerm)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub(crate) fn insert(&mut self, name: String, term: FilterTerm) {
        self.0.insert(name, term);
    }
}

/// Build the filter expression of a request.
///
/// # Errors
/// - `Error::UnsupportedParameter` if a parameter is not registered
/// - `Error::InvalidValue` if a value does not parse under its kind
/// - `Error::UnsupportedKind` if a parameter is registered with a non-scalar kind
pub fn build_filter(params: &QueryParams, registry: &ParameterMap) -> QueryResult<FilterExpression> {
    let mut filter = FilterExpression::new();

    for (name, values) in params.iter() {
        let Some(&kind) = registry.get(name) else {
            tracing::debug!(parameter = %name, "rejecting unsupported parameter");
            return Err(Error::UnsupportedParameter {
                name: name.to_owned(),
            });
        };
        if MetaParameter::is_meta(name) {
            continue;
        }

        let mut parsed = parse_values(name, kind, values)?;
        let term = if parsed.len() == 1 {
            FilterTerm::Value(parsed.remove(0))
        } else {
            FilterTerm::In(parsed)
        };
        filter.insert(name.to_owned(), term);
    }

    Ok(filter)
}

fn parse_values(name: &str, kind: ParameterKind, values: &[String]) -> QueryResult<Vec<FilterValue>> {
    match kind {
        ParameterKind::Bool => values
            .iter()
            .map(|v| {
                parse_bool(v)
                    .map(FilterValue::Bool)
                    .ok_or_else(|| Error::invalid_value(name, v, "expected a boolean"))
            })
            .collect(),
        ParameterKind::Int => values
            .iter()
            .map(|v| {
                v.parse::<i64>()
                    .map(FilterValue::Int)
                    .map_err(|e| Error::invalid_value(name, v, e.to_string()))
            })
            .collect(),
        ParameterKind::Uint => values
            .iter()
            .map(|v| {
                v.parse::<u64>()
                    .map(FilterValue::Uint)
                    .map_err(|e| Error::invalid_value(name, v, e.to_string()))
            })
            .collect(),
        ParameterKind::Float => values
            .iter()
            .map(|v| {
                let f = v
                    .parse::<f64>()
                    .map_err(|e| Error::invalid_value(name, v, e.to_string()))?;
                if !f.is_finite() {
                    return Err(Error::invalid_value(name, v, "expected a finite number"));
                }
                Ok(FilterValue::Float(f))
            })
            .collect(),
        ParameterKind::String => Ok(parse_strings(values)),
        ParameterKind::Sequence | ParameterKind::Record => Err(Error::UnsupportedKind {
            name: name.to_owned(),
            kind,
        }),
    }
}

fn parse_strings(values: &[String]) -> Vec<FilterValue> {
    let single = values.len() == 1;
    values
        .iter()
        .map(|v| match ObjectId::parse_hex(v) {
            Some(id) => FilterValue::ObjectId(id),
            None if single => FilterValue::Pattern(v.clone()),
            None => FilterValue::String(v.clone()),
        })
        .collect()
}

/// Boolean literals: `1 t T TRUE true True` and `0 f F FALSE false False`.
fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}
