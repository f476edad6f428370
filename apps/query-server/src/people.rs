//! The `people` collection and its HTTP routes.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use modkit_query::{
    ConfigError, MemoryStore, ParameterMap, QueryBuilder, QueryConfig, QueryParams, QueryResult,
    QuerySchema, ResponseEnvelope,
};
use modkit_query_macros::QuerySchema;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, QuerySchema)]
pub struct Address {
    #[serde(default)]
    pub city: String,
    #[query(bson = "country,omitempty")]
    #[serde(default)]
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, QuerySchema)]
#[query(collection = "people")]
pub struct Person {
    #[query(bson = "_id")]
    #[serde(rename = "_id")]
    pub id: String,
    #[query(bson = "firstName")]
    #[serde(rename = "firstName", default, skip_serializing_if = "String::is_empty")]
    pub first_name: String,
    #[query(bson = "lastName")]
    #[serde(rename = "lastName", default, skip_serializing_if = "String::is_empty")]
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(flatten)]
    pub address: Address,
}

pub struct AppState {
    pub builder: QueryBuilder<Person>,
    pub store: MemoryStore,
}

impl AppState {
    pub fn new(config: QueryConfig, store: MemoryStore) -> Result<Self, ConfigError> {
        Ok(Self {
            builder: QueryBuilder::with_config(config)?,
            store,
        })
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/people", get(list_people))
        .route("/people/parameters", get(list_parameters))
        .with_state(state)
}

async fn list_people(
    State(state): State<Arc<AppState>>,
    params: QueryParams,
) -> QueryResult<Json<ResponseEnvelope<Person>>> {
    state.builder.run(&state.store, &params).await.map(Json)
}

async fn list_parameters(State(state): State<Arc<AppState>>) -> Json<ParameterMap> {
    Json(state.builder.parameters().clone())
}

/// Fill the store from a JSON array file, or with the built-in samples.
pub fn seed_store(store: &MemoryStore, path: Option<&Path>) -> anyhow::Result<usize> {
    let documents = if let Some(path) = path {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read seed file {}", path.display()))?;
        serde_json::from_str::<Vec<Value>>(&raw)
            .with_context(|| format!("seed file {} is not a JSON array", path.display()))?
    } else {
        samples()
    };
    let count = documents.len();
    store.extend(Person::collection_name(), documents);
    Ok(count)
}

fn samples() -> Vec<Value> {
    vec![
        json!({"_id": "54e1b216a8f830ee6dead911", "firstName": "Peter", "lastName": "Pan", "age": 31, "active": true, "tags": ["admin"], "city": "London", "country": "UK"}),
        json!({"_id": "54e1b216a8f830ee6dead912", "firstName": "Paul", "lastName": "Smith", "age": 25, "active": false, "city": "Paris", "country": "FR"}),
        json!({"_id": "54e1b216a8f830ee6dead913", "firstName": "Mary", "lastName": "Poppins", "age": 31, "active": true, "tags": ["dev", "admin"], "city": "London", "country": "UK"}),
        json!({"_id": "54e1b216a8f830ee6dead914", "firstName": "Petra", "lastName": "Novak", "age": 40, "active": true, "tags": ["dev"], "city": "Prague", "country": "CZ"}),
        json!({"_id": "54e1b216a8f830ee6dead915", "firstName": "Anne", "lastName": "Frank", "age": 19, "city": "Amsterdam", "country": "NL"}),
    ]
}
