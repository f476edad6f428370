//! In-process [`CollectionStore`] over JSON documents.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use regex::Regex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Number, Value};

use super::{CollectionStore, StoreError};
use crate::filter::{FilterExpression, FilterValue};
use crate::object_id::ObjectId;
use crate::order::{Projection, SortDir, SortSpec};
use crate::query::QueryDescriptor;

/// Key always kept by projections.
pub const ID_FIELD: &str = "_id";

/// Collections of JSON documents held in memory.
///
/// Missing collections answer [`StoreError::NotFound`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Value>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one document. Creates the collection when needed.
    pub fn insert(&self, collection: impl Into<String>, document: Value) {
        self.collections
            .write()
            .entry(collection.into())
            .or_default()
            .push(document);
    }

    pub fn extend<I>(&self, collection: impl Into<String>, documents: I)
    where
        I: IntoIterator<Item = Value>,
    {
        self.collections
            .write()
            .entry(collection.into())
            .or_default()
            .extend(documents);
    }

    /// Serialize records and append them.
    ///
    /// # Errors
    /// Returns `StoreError::Decode` if a record does not serialize to JSON.
    pub fn insert_records<'a, T, I>(&self, collection: impl Into<String>, records: I) -> Result<(), StoreError>
    where
        T: Serialize + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        let documents = records
            .into_iter()
            .map(|r| serde_json::to_value(r).map_err(|e| StoreError::Decode(e.to_string())))
            .collect::<Result<Vec<_>, _>>()?;
        self.extend(collection, documents);
        Ok(())
    }

    #[must_use]
    pub fn len(&self, collection: &str) -> usize {
        self.collections.read().get(collection).map_or(0, Vec::len)
    }

    #[must_use]
    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }

    fn matching(&self, collection: &str, filter: &FilterExpression) -> Result<Vec<Value>, StoreError> {
        let compiled = CompiledFilter::compile(filter)?;
        let collections = self.collections.read();
        let documents = collections.get(collection).ok_or(StoreError::NotFound)?;
        Ok(documents
            .iter()
            .filter(|doc| compiled.matches(doc))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl<T> CollectionStore<T> for MemoryStore
where
    T: DeserializeOwned + Send + 'static,
{
    async fn count(&self, collection: &str, filter: &FilterExpression) -> Result<u64, StoreError> {
        let matched = self.matching(collection, filter)?;
        tracing::trace!(collection, matched = matched.len(), "memory store count");
        u64::try_from(matched.len()).map_err(|e| StoreError::Backend(e.to_string()))
    }

    async fn fetch(&self, query: &QueryDescriptor) -> Result<Vec<T>, StoreError> {
        let mut documents = self.matching(&query.collection, &query.filter)?;
        sort_documents(&mut documents, &query.sort);

        let skip = usize::try_from(query.skip()).unwrap_or(usize::MAX);
        let limit = usize::try_from(query.limit()).unwrap_or(usize::MAX);
        tracing::trace!(
            collection = %query.collection,
            matched = documents.len(),
            skip,
            limit,
            "memory store fetch"
        );

        documents
            .into_iter()
            .skip(skip)
            .take(limit)
            .map(|doc| {
                let doc = project(doc, &query.projection);
                serde_json::from_value(doc).map_err(|e| StoreError::Decode(e.to_string()))
            })
            .collect()
    }
}

enum Matcher<'a> {
    Value(&'a FilterValue),
    Pattern(Regex),
}

/// Filter with its patterns compiled, built once per store call.
struct CompiledFilter<'a> {
    terms: Vec<(&'a str, Vec<Matcher<'a>>)>,
}

impl<'a> CompiledFilter<'a> {
    fn compile(filter: &'a FilterExpression) -> Result<Self, StoreError> {
        let terms = filter
            .iter()
            .map(|(name, term)| {
                let matchers = term
                    .values()
                    .iter()
                    .map(|value| match value {
                        FilterValue::Pattern(p) => Regex::new(p).map(Matcher::Pattern).map_err(|e| {
                            tracing::debug!(parameter = %name, pattern = %p, "rejecting invalid pattern");
                            StoreError::InvalidQuery(format!("invalid pattern '{p}' for '{name}': {e}"))
                        }),
                        other => Ok(Matcher::Value(other)),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok((name, matchers))
            })
            .collect::<Result<Vec<_>, StoreError>>()?;
        Ok(Self { terms })
    }

    fn matches(&self, document: &Value) -> bool {
        self.terms.iter().all(|(name, matchers)| {
            let Some(field) = document.get(*name) else {
                return false;
            };
            matchers.iter().any(|m| field_matches(m, field))
        })
    }
}

fn field_matches(matcher: &Matcher<'_>, field: &Value) -> bool {
    match field {
        Value::Array(items) => items.iter().any(|item| scalar_matches(matcher, item)),
        other => scalar_matches(matcher, other),
    }
}

fn scalar_matches(matcher: &Matcher<'_>, field: &Value) -> bool {
    let value = match matcher {
        Matcher::Pattern(re) => return field.as_str().is_some_and(|s| re.is_match(s)),
        Matcher::Value(value) => value,
    };
    match value {
        FilterValue::Bool(b) => field.as_bool() == Some(*b),
        FilterValue::Int(i) => number_equals(field, &Number::from(*i)),
        FilterValue::Uint(u) => number_equals(field, &Number::from(*u)),
        FilterValue::Float(f) => Number::from_f64(*f).is_some_and(|n| number_equals(field, &n)),
        FilterValue::String(s) => field.as_str() == Some(s.as_str()),
        FilterValue::ObjectId(id) => object_id_matches(field, id),
        FilterValue::Pattern(_) => false,
    }
}

fn number_equals(field: &Value, expected: &Number) -> bool {
    match field {
        Value::Number(n) => compare_numbers(n, expected) == Some(Ordering::Equal),
        _ => false,
    }
}

fn object_id_matches(field: &Value, id: &ObjectId) -> bool {
    let hex = match field {
        Value::String(s) => Some(s.as_str()),
        Value::Object(map) => map.get("$oid").and_then(Value::as_str),
        _ => None,
    };
    hex.is_some_and(|h| h.eq_ignore_ascii_case(&id.to_hex()))
}

/// Numeric ordering across signed, unsigned and floating representations.
fn compare_numbers(a: &Number, b: &Number) -> Option<Ordering> {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return Some(x.cmp(&y));
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return Some(x.cmp(&y));
    }
    if !a.is_f64() && !b.is_f64() {
        // One side is negative, the other above i64::MAX.
        return Some(if a.as_i64().is_some() {
            Ordering::Less
        } else {
            Ordering::Greater
        });
    }
    a.as_f64()?.partial_cmp(&b.as_f64()?)
}

fn type_rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Number(_)) => 1,
        Some(Value::String(_)) => 2,
        Some(Value::Object(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::Bool(_)) => 5,
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            compare_numbers(x, y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn sort_documents(documents: &mut [Value], sort: &SortSpec) {
    if sort.is_empty() {
        return;
    }
    documents.sort_by(|a, b| {
        for key in sort.keys() {
            let ord = compare_values(a.get(&key.field), b.get(&key.field));
            let ord = match key.dir {
                SortDir::Asc => ord,
                SortDir::Desc => ord.reverse(),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });
}

fn project(document: Value, projection: &Projection) -> Value {
    if projection.is_empty() {
        return document;
    }
    match document {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(key, _)| key == ID_FIELD || projection.contains(key))
                .collect::<Map<_, _>>(),
        ),
        other => other,
    }
}
