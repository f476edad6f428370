use modkit_query::schema::QuerySchema;
use modkit_query_macros::QuerySchema;

#[derive(QuerySchema)]
#[allow(dead_code)]
struct Address {
    city: String,
    #[query(bson = "zip")]
    postal_code: Option<String>,
}

#[derive(QuerySchema)]
#[query(collection = "customers")]
#[allow(dead_code)]
struct Customer {
    name: String,
    addresses: Vec<String>,
    home: Address,
    scores: [u8; 3],
}

fn main() {
    assert_eq!(Customer::collection_name(), "customers");
    assert_eq!(Customer::FIELDS.len(), 4);
    let params = modkit_query::QueryBuilder::<Customer>::new();
    assert!(params.parameters().contains_key("zip"));
    assert!(params.parameters().contains_key("city"));
}
