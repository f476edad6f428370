//! Query assembly for one queryable collection.

use std::fmt;
use std::marker::PhantomData;

use serde::Serialize;
use serde::ser::{SerializeStruct, Serializer};

use crate::config::{ConfigError, QueryConfig};
use crate::error::QueryResult;
use crate::filter::{FilterExpression, build_filter};
use crate::kind::ParameterKind;
use crate::order::{Projection, SortSpec, build_projection, build_sort};
use crate::page::Page;
use crate::params::QueryParams;
use crate::registry::ParameterRegistry;
use crate::response::{ResponseEnvelope, execute};
use crate::schema::{MetaParameter, ParameterMap, QuerySchema};
use crate::store::CollectionStore;

/// A built query, ready to be handed to a store. Nothing has been executed yet.
#[derive(Clone, Debug, PartialEq)]
pub struct QueryDescriptor {
    pub collection: String,
    pub filter: FilterExpression,
    pub projection: Projection,
    pub sort: SortSpec,
    pub page: Page,
}

impl QueryDescriptor {
    #[must_use]
    pub fn limit(&self) -> u64 {
        self.page.size
    }

    #[must_use]
    pub fn skip(&self) -> u64 {
        self.page.skip()
    }
}

/// Serializes in the store dialect:
/// `{"collection", "filter", "projection", "sort", "limit", "skip"}`.
impl Serialize for QueryDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("QueryDescriptor", 6)?;
        s.serialize_field("collection", &self.collection)?;
        s.serialize_field("filter", &self.filter)?;
        s.serialize_field("projection", &self.projection)?;
        s.serialize_field("sort", &self.sort)?;
        s.serialize_field("limit", &self.limit())?;
        s.serialize_field("skip", &self.skip())?;
        s.end()
    }
}

/// Turns request parameters into [`QueryDescriptor`]s for the collection of `S`.
///
/// Configure once (`disable_parameters`, `add_or_overwrite_valid_parameter`),
/// then share. Building is read-only, so a configured builder can serve
/// concurrent requests; mutating it while requests run needs external
/// synchronisation.
///
/// # Example
///
/// ```rust,ignore
/// let mut builder = QueryBuilder::<Person>::new();
/// builder.disable_parameters(["email"]);
/// let query = builder.build_query_str("name=peter&sort=-age&limit=10")?;
/// assert_eq!(query.collection, "person");
/// ```
pub struct QueryBuilder<S> {
    registry: ParameterRegistry,
    config: QueryConfig,
    _schema: PhantomData<fn() -> S>,
}

impl<S> Clone for QueryBuilder<S> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
            config: self.config.clone(),
            _schema: PhantomData,
        }
    }
}

impl<S> fmt::Debug for QueryBuilder<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryBuilder")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<S: QuerySchema> Default for QueryBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: QuerySchema> QueryBuilder<S> {
    #[must_use]
    pub fn new() -> Self {
        Self::from_valid_config(QueryConfig::default())
    }

    /// Build with a config; its disabled and extra parameters are applied in that order.
    ///
    /// # Errors
    /// Returns `ConfigError` if the page sizes of `config` are inconsistent.
    pub fn with_config(config: QueryConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: QueryConfig) -> Self {
        let mut registry = ParameterRegistry::new(S::FIELDS);
        if !config.disabled_parameters.is_empty() {
            registry.disable(config.disabled_parameters.iter().cloned());
        }
        for (name, kind) in &config.extra_parameters {
            registry.add_or_overwrite(name.clone(), *kind);
        }
        Self {
            registry,
            config,
            _schema: PhantomData,
        }
    }

    /// Stop accepting the given parameters.
    pub fn disable_parameters<I, N>(&mut self, names: I) -> &mut Self
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        self.registry.disable(names);
        self
    }

    /// Accept `name` with the given kind, replacing any kind it had.
    pub fn add_or_overwrite_valid_parameter(
        &mut self,
        name: impl Into<String>,
        kind: ParameterKind,
    ) -> &mut Self {
        self.registry.add_or_overwrite(name, kind);
        self
    }

    /// Currently accepted parameters.
    #[must_use]
    pub fn parameters(&self) -> &ParameterMap {
        self.registry.parameters()
    }

    #[must_use]
    pub fn registry(&self) -> &ParameterRegistry {
        &self.registry
    }

    #[must_use]
    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Build the query of a request.
    ///
    /// # Errors
    /// Returns the first failure among filter, projection, sort and page
    /// resolution, checked in that order.
    pub fn build_query(&self, params: &QueryParams) -> QueryResult<QueryDescriptor> {
        let registry = self.registry.parameters();

        let filter = build_filter(params, registry)?;
        let projection = build_projection(meta_values(params, MetaParameter::Field), registry)?;
        let sort = build_sort(meta_values(params, MetaParameter::Sort), registry)?;
        let page = Page::resolve(params, self.config.default_page_size, self.config.max_page_size)?;

        let query = QueryDescriptor {
            collection: S::collection_name(),
            filter,
            projection,
            sort,
            page,
        };
        tracing::debug!(
            collection = %query.collection,
            filters = query.filter.len(),
            sort = %query.sort,
            limit = query.limit(),
            skip = query.skip(),
            "query built"
        );
        Ok(query)
    }

    /// Parse a raw query string and build its query.
    ///
    /// # Errors
    /// Same as [`QueryBuilder::build_query`].
    pub fn build_query_str(&self, raw: &str) -> QueryResult<QueryDescriptor> {
        self.build_query(&QueryParams::parse(raw))
    }

    /// Build the query of a request and run it against `store`.
    ///
    /// # Errors
    /// Returns a construction error, or `Error::Store` if the store fails.
    pub async fn run<St>(&self, store: &St, params: &QueryParams) -> QueryResult<ResponseEnvelope<S>>
    where
        St: CollectionStore<S> + ?Sized,
        S: Send + 'static,
    {
        let query = self.build_query(params)?;
        execute(store, &query).await
    }
}

fn meta_values(params: &QueryParams, meta: MetaParameter) -> &[String] {
    params.get(meta.name()).unwrap_or_default()
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::schema::{FieldDescriptor, QueryField};
    use serde_json::json;

    struct Person;

    impl QuerySchema for Person {
        const NAME: &'static str = "Person";
        const FIELDS: &'static [FieldDescriptor] = &[
            FieldDescriptor::new("name", <String as QueryField>::SHAPE),
            FieldDescriptor::new("age", <u32 as QueryField>::SHAPE),
            FieldDescriptor::new("email", <Option<String> as QueryField>::SHAPE),
        ];
    }

    #[test]
    fn builds_full_descriptor() {
        let builder = QueryBuilder::<Person>::new();
        let query = builder
            .build_query_str("name=peter&age=30&age=31&field=name&sort=-age&limit=5&page=3")
            .unwrap();

        assert_eq!(query.limit(), 5);
        assert_eq!(query.skip(), 10);
        assert_eq!(
            serde_json::to_value(&query).unwrap(),
            json!({
                "collection": "person",
                "filter": {"name": {"$regex": "peter"}, "age": {"$in": [30, 31]}},
                "projection": {"name": 1},
                "sort": ["-age"],
                "limit": 5,
                "skip": 10
            })
        );
    }

    #[test]
    fn empty_request_uses_defaults() {
        let query = QueryBuilder::<Person>::new().build_query(&QueryParams::new()).unwrap();
        assert!(query.filter.is_empty());
        assert!(query.projection.is_empty());
        assert!(query.sort.is_empty());
        assert_eq!(query.limit(), 20);
        assert_eq!(query.page.current, 1);
    }

    #[test]
    fn filter_errors_win_over_later_stages() {
        let builder = QueryBuilder::<Person>::new();
        let err = builder.build_query_str("nope=1&sort=bogus&page=0").unwrap_err();
        assert!(matches!(err, Error::UnsupportedParameter { .. }));

        let err = builder.build_query_str("field=bogus&page=0").unwrap_err();
        assert!(matches!(err, Error::UnsupportedField { .. }));

        let err = builder.build_query_str("sort=name&page=0").unwrap_err();
        assert_eq!(err, Error::InvalidPage);
    }

    #[test]
    fn config_is_applied_on_construction() {
        let config = QueryConfig {
            default_page_size: 7,
            disabled_parameters: vec!["email".to_owned()],
            extra_parameters: [("nickname".to_owned(), ParameterKind::String)].into(),
            ..QueryConfig::default()
        };
        let builder = QueryBuilder::<Person>::with_config(config).unwrap();
        assert!(!builder.parameters().contains_key("email"));
        assert!(builder.parameters().contains_key("nickname"));

        let query = builder.build_query_str("nickname=pete").unwrap();
        assert_eq!(query.limit(), 7);
        assert!(builder.build_query_str("email=x").is_err());
    }

    #[test]
    fn inconsistent_config_is_rejected_on_construction() {
        let err = QueryBuilder::<Person>::with_config(QueryConfig {
            default_page_size: 0,
            ..QueryConfig::default()
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::ZeroPageSize));

        let err = QueryBuilder::<Person>::with_config(QueryConfig {
            default_page_size: 50,
            max_page_size: Some(10),
            ..QueryConfig::default()
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::DefaultExceedsMax { default: 50, max: 10 }));
    }

    #[test]
    fn setup_calls_chain() {
        let mut builder = QueryBuilder::<Person>::new();
        builder
            .disable_parameters(["sort"])
            .add_or_overwrite_valid_parameter("age", ParameterKind::Float);
        assert_eq!(builder.parameters().get("age"), Some(&ParameterKind::Float));
        assert!(builder.build_query_str("sort=age").is_err());

        let query = builder.build_query_str("age=1.5").unwrap();
        assert_eq!(serde_json::to_value(&query.filter).unwrap(), json!({"age": 1.5}));
    }
}
