#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Query-string driven queries over document collections.
//!
//! A [`QueryBuilder`] turns request parameters such as
//! `?name=peter&age=30&age=31&field=name&sort=-age&limit=10&page=2` into a
//! [`QueryDescriptor`] (filter, projection, sort, limit, skip) for the
//! collection of a [`QuerySchema`] type, and runs it against a
//! [`CollectionStore`] into a paginated [`ResponseEnvelope`].
//!
//! Schemas are usually declared with `#[derive(QuerySchema)]` from
//! `modkit-query-macros`.
pub mod catalog;
pub mod config;
pub mod error;
pub mod filter;
pub mod kind;
pub mod object_id;
pub mod order;
pub mod page;
pub mod params;
pub mod problem;
pub mod query;
pub mod registry;
pub mod response;
pub mod schema;
pub mod store;
pub mod tag;

pub use catalog::ErrDef;
pub use config::{ConfigError, QueryConfig};
pub use error::{Error, QueryResult};
pub use filter::{FilterExpression, FilterTerm, FilterValue};
pub use kind::ParameterKind;
pub use object_id::ObjectId;
pub use order::{Projection, SortDir, SortKey, SortSpec};
pub use page::{DEFAULT_PAGE_SIZE, Page};
pub use params::QueryParams;
pub use problem::{APPLICATION_PROBLEM_JSON, Problem, ValidationViolation};
pub use query::{QueryBuilder, QueryDescriptor};
pub use registry::ParameterRegistry;
pub use response::ResponseEnvelope;
pub use schema::{FieldDescriptor, FieldShape, MetaParameter, ParameterMap, QueryField, QuerySchema};
pub use store::{CollectionStore, MemoryStore, StoreError};
pub use tag::Annotation;
