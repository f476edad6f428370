//! Document-store seam.

use async_trait::async_trait;

use crate::filter::FilterExpression;
use crate::query::QueryDescriptor;

pub mod memory;

pub use memory::MemoryStore;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Nothing matched. Callers treat this as an empty result.
    #[error("no matching documents")]
    NotFound,

    /// The store cannot evaluate a query built from client input.
    #[error("query rejected by the store: {0}")]
    InvalidQuery(String),

    #[error("store backend failure: {0}")]
    Backend(String),

    #[error("failed to decode document: {0}")]
    Decode(String),
}

/// A collection-oriented document store able to run a [`QueryDescriptor`].
#[async_trait]
pub trait CollectionStore<T>: Send + Sync
where
    T: Send + 'static,
{
    /// Count documents matching `filter`, ignoring pagination.
    async fn count(&self, collection: &str, filter: &FilterExpression) -> Result<u64, StoreError>;

    /// Fetch one page of documents honoring projection, sort, limit and skip.
    async fn fetch(&self, query: &QueryDescriptor) -> Result<Vec<T>, StoreError>;
}
