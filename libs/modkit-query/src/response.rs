use serde::{Deserialize, Serialize};

use crate::error::QueryResult;
use crate::page::Page;
use crate::query::QueryDescriptor;
use crate::store::{CollectionStore, StoreError};

/// One page of results. `content` is omitted from the output when empty.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope<T> {
    #[serde(default = "Vec::new", skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<T>,
    pub page: Page,
}

impl<T> ResponseEnvelope<T> {
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> ResponseEnvelope<U> {
        ResponseEnvelope {
            content: self.content.into_iter().map(f).collect(),
            page: self.page,
        }
    }
}

/// Count then fetch, and finalize the page with the total.
///
/// `StoreError::NotFound` from either call is an empty result.
///
/// # Errors
/// Returns `Error::Store` for any other store failure.
#[tracing::instrument(skip_all, fields(collection = %query.collection))]
pub async fn execute<T, St>(store: &St, query: &QueryDescriptor) -> QueryResult<ResponseEnvelope<T>>
where
    St: CollectionStore<T> + ?Sized,
    T: Send + 'static,
{
    let total = match store.count(&query.collection, &query.filter).await {
        Ok(total) => total,
        Err(StoreError::NotFound) => 0,
        Err(e) => return Err(e.into()),
    };

    let content = match store.fetch(query).await {
        Ok(content) => content,
        Err(StoreError::NotFound) => Vec::new(),
        Err(e) => return Err(e.into()),
    };

    let mut page = query.page;
    page.finalize(total);
    tracing::debug!(total, returned = content.len(), "query executed");

    Ok(ResponseEnvelope { content, page })
}
