//! # modkit-query-macros
//!
//! Derive macro generating the static field table of a `modkit-query` schema.
//!
//! The generated code references `modkit-query` types and is independent of
//! any store or HTTP framework.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

use proc_macro::TokenStream;
use proc_macro_error2::proc_macro_error;
use syn::{DeriveInput, parse_macro_input};

mod query_schema;

/// Derive `QuerySchema` and `QueryField` for a struct with named fields.
///
/// Each field is registered under its lower-cased name unless an annotation
/// overrides it. Field types must implement `modkit_query::schema::QueryField`;
/// fields whose type is itself a derived schema are flattened into the parent.
///
/// Field attributes:
/// - `#[query(bson = "name,omitempty")]`: keyed annotation; the `bson` key names the parameter
/// - `#[query("name")]`: bare annotation, used when no keyed annotation is present
/// - `#[query(skip)]`: leave the field out
///
/// Struct attribute:
/// - `#[query(collection = "people")]`: collection name instead of the lower-cased type name
///
/// # Example
///
/// ```ignore
/// use modkit_query_macros::QuerySchema;
///
/// #[derive(QuerySchema)]
/// pub struct Person {
///     #[query(bson = "_id")]
///     pub id: modkit_query::ObjectId,
///     pub name: String,
///     #[query(bson = "tags,omitempty")]
///     pub labels: Vec<String>,
/// }
/// ```
#[proc_macro_derive(QuerySchema, attributes(query))]
#[proc_macro_error]
pub fn derive_query_schema(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    query_schema::expand_derive_query_schema(&input).into()
}
