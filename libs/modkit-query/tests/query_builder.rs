#![allow(clippy::unwrap_used, clippy::expect_used)]

use modkit_query::{
    Error, MemoryStore, ParameterKind, QueryBuilder, QueryConfig, QueryParams, StoreError,
};
use modkit_query_macros::QuerySchema;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing_test::traced_test;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, QuerySchema)]
struct Address {
    city: String,
    #[query(bson = "zip,omitempty")]
    #[serde(rename = "zip", default)]
    postal_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, QuerySchema)]
struct Person {
    #[query(bson = "_id")]
    #[serde(rename = "_id")]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    age: u32,
    #[serde(default)]
    score: f64,
    #[serde(default)]
    active: bool,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(flatten)]
    address: Address,
}

fn seed(store: &MemoryStore) {
    store.extend(
        "person",
        [
            json!({"_id": "54e1b216a8f830ee6dead901", "name": "peter", "age": 31, "score": 4.5, "active": true, "tags": ["admin"], "city": "Berlin", "zip": "10115"}),
            json!({"_id": "54e1b216a8f830ee6dead902", "name": "paul", "age": 25, "score": 3.0, "active": false, "tags": [], "city": "Paris"}),
            json!({"_id": "54e1b216a8f830ee6dead903", "name": "mary", "age": 31, "score": 5.0, "active": true, "tags": ["dev", "admin"], "city": "Berlin"}),
            json!({"_id": "54e1b216a8f830ee6dead904", "name": "petra", "age": 40, "score": 2.5, "active": true, "tags": ["dev"], "city": "Rome"}),
            json!({"_id": "54e1b216a8f830ee6dead905", "name": "anne", "age": 19, "score": 4.0, "active": false, "tags": [], "city": "Paris"}),
        ],
    );
}

fn names(people: &[Person]) -> Vec<&str> {
    people.iter().map(|p| p.name.as_str()).collect()
}

#[test]
fn parameters_include_nested_record_fields() {
    let builder = QueryBuilder::<Person>::new();
    let params = builder.parameters();
    for (name, kind) in [
        ("_id", ParameterKind::String),
        ("name", ParameterKind::String),
        ("age", ParameterKind::Uint),
        ("score", ParameterKind::Float),
        ("active", ParameterKind::Bool),
        ("tags", ParameterKind::String),
        ("city", ParameterKind::String),
        ("zip", ParameterKind::String),
        ("limit", ParameterKind::Uint),
    ] {
        assert_eq!(params.get(name), Some(&kind), "{name}");
    }
    assert!(!params.contains_key("address"));
}

#[tokio::test]
async fn equality_sort_and_pagination() {
    let store = MemoryStore::new();
    seed(&store);
    let builder = QueryBuilder::<Person>::new();

    let params = QueryParams::parse("active=true&sort=-age&sort=name&limit=2");
    let first = builder.run(&store, &params).await.unwrap();
    assert_eq!(names(&first.content), vec!["petra", "mary"]);
    assert_eq!(first.page.items, 3);
    assert_eq!(first.page.last, 2);
    assert_eq!(first.page.current, 1);

    let params = QueryParams::parse("active=true&sort=-age&sort=name&limit=2&page=2");
    let second = builder.run(&store, &params).await.unwrap();
    assert_eq!(names(&second.content), vec!["peter"]);
    assert_eq!(second.page.current, 2);
}

#[tokio::test]
async fn single_string_matches_as_pattern() {
    let store = MemoryStore::new();
    seed(&store);
    let builder = QueryBuilder::<Person>::new();

    let envelope = builder
        .run(&store, &QueryParams::parse("name=pet&sort=name"))
        .await
        .unwrap();
    assert_eq!(names(&envelope.content), vec!["peter", "petra"]);
}

#[tokio::test]
async fn multiple_strings_match_literally() {
    let store = MemoryStore::new();
    seed(&store);
    let builder = QueryBuilder::<Person>::new();

    let envelope = builder
        .run(&store, &QueryParams::parse("city=Paris&city=Rome&sort=age"))
        .await
        .unwrap();
    assert_eq!(names(&envelope.content), vec!["anne", "paul", "petra"]);

    // Literal values do not match substrings.
    let envelope = builder
        .run(&store, &QueryParams::parse("city=Par&city=Rom"))
        .await
        .unwrap();
    assert!(envelope.content.is_empty());
    assert_eq!(envelope.page.items, 0);
}

#[tokio::test]
async fn identifier_and_membership_filters() {
    let store = MemoryStore::new();
    seed(&store);
    let builder = QueryBuilder::<Person>::new();

    let envelope = builder
        .run(&store, &QueryParams::parse("_id=54E1B216A8F830EE6DEAD903"))
        .await
        .unwrap();
    assert_eq!(names(&envelope.content), vec!["mary"]);

    let envelope = builder
        .run(&store, &QueryParams::parse("age=19&age=40&sort=-age"))
        .await
        .unwrap();
    assert_eq!(names(&envelope.content), vec!["petra", "anne"]);

    let envelope = builder
        .run(&store, &QueryParams::parse("tags=admin&sort=name"))
        .await
        .unwrap();
    assert_eq!(names(&envelope.content), vec!["mary", "peter"]);
}

#[tokio::test]
async fn projection_limits_returned_fields() {
    let store = MemoryStore::new();
    seed(&store);
    let builder = QueryBuilder::<Person>::new();

    let envelope = builder
        .run(&store, &QueryParams::parse("field=name&field=city&sort=name&limit=1"))
        .await
        .unwrap();
    let person = &envelope.content[0];
    assert_eq!(person.name, "anne");
    assert_eq!(person.id, "54e1b216a8f830ee6dead905");
    assert_eq!(person.age, 0);
    assert_eq!(person.address.city, "Paris");
}

#[tokio::test]
async fn empty_result_serializes_without_content() {
    let store = MemoryStore::new();
    let builder = QueryBuilder::<Person>::new();

    let envelope = builder.run(&store, &QueryParams::new()).await.unwrap();
    assert_eq!(
        serde_json::to_value(&envelope).unwrap(),
        json!({"page": {"size": 20, "items": 0, "last": 0, "current": 1}})
    );
}

#[tokio::test]
async fn construction_errors_stop_before_the_store() {
    let store = MemoryStore::new();
    seed(&store);
    let builder = QueryBuilder::<Person>::new();

    let cases = [
        ("nickname=x", "parameter 'nickname' is not supported"),
        ("field=nope", "unsupported field 'nope' in parameter 'field'"),
        ("sort=-nope", "unsupported field '-nope' in parameter 'sort'"),
        ("score=inf", "invalid value 'inf' for parameter 'score': expected a finite number"),
        ("page=0", "page cannot be 0"),
    ];
    for (query, message) in cases {
        let err = builder.run(&store, &QueryParams::parse(query)).await.unwrap_err();
        assert!(err.is_client_error());
        assert_eq!(err.to_string(), message);
    }

    let err = builder
        .run(&store, &QueryParams::parse("age=old"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidValue { ref name, .. } if name == "age"));
}

#[tokio::test]
async fn invalid_pattern_is_rejected_by_the_store() {
    let store = MemoryStore::new();
    seed(&store);
    let builder = QueryBuilder::<Person>::new();

    let err = builder
        .run(&store, &QueryParams::parse("name=%28unclosed"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Store(StoreError::InvalidQuery(_))));
    assert!(err.is_client_error());
}

#[tokio::test]
async fn decode_failure_is_a_store_error() {
    let store = MemoryStore::new();
    store.insert("person", json!({"_id": 7, "city": "Oslo"}));
    let builder = QueryBuilder::<Person>::new();

    let err = builder.run(&store, &QueryParams::new()).await.unwrap_err();
    assert!(matches!(err, Error::Store(StoreError::Decode(_))));
}

#[tokio::test]
async fn configured_builder_applies_limits_and_parameters() {
    let store = MemoryStore::new();
    seed(&store);
    let config = QueryConfig {
        default_page_size: 2,
        max_page_size: Some(3),
        disabled_parameters: vec!["score".to_owned()],
        ..QueryConfig::default()
    };
    let builder = QueryBuilder::<Person>::with_config(config).unwrap();

    let envelope = builder.run(&store, &QueryParams::new()).await.unwrap();
    assert_eq!(envelope.content.len(), 2);
    assert_eq!(envelope.page.last, 3);

    assert!(builder.run(&store, &QueryParams::parse("limit=4")).await.is_err());
    assert!(builder.run(&store, &QueryParams::parse("score=4.5")).await.is_err());
}

#[test]
#[traced_test]
fn rejected_parameters_are_logged() {
    let builder = QueryBuilder::<Person>::new();
    assert!(builder.build_query_str("nickname=x").is_err());
    assert!(logs_contain("rejecting unsupported parameter"));

    assert!(builder.build_query_str("name=x").is_ok());
    assert!(logs_contain("query built"));
}
