use proc_macro2::TokenStream;
use proc_macro_error2::{abort, emit_error};
use quote::quote;
use syn::ext::IdentExt;
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::{Attribute, Data, DeriveInput, Fields, Ident, LitStr, Token};

/// One item of a `#[query(...)]` list.
enum QueryArg {
    Skip,
    Keyed(Ident, LitStr),
    Bare(LitStr),
}

impl Parse for QueryArg {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        if input.peek(LitStr) {
            return Ok(QueryArg::Bare(input.parse()?));
        }
        let key = Ident::parse_any(input)?;
        if input.peek(Token![=]) {
            input.parse::<Token![=]>()?;
            return Ok(QueryArg::Keyed(key, input.parse()?));
        }
        if key == "skip" {
            return Ok(QueryArg::Skip);
        }
        Err(syn::Error::new(
            key.span(),
            "expected `skip`, `key = \"value\"` or a string literal",
        ))
    }
}

fn query_args(attrs: &[Attribute]) -> Vec<QueryArg> {
    let mut args = Vec::new();
    for attr in attrs.iter().filter(|a| a.path().is_ident("query")) {
        match attr.parse_args_with(Punctuated::<QueryArg, Token![,]>::parse_terminated) {
            Ok(parsed) => args.extend(parsed),
            Err(err) => emit_error!(err.span(), "{}", err),
        }
    }
    args
}

fn collection_override(attrs: &[Attribute]) -> Option<LitStr> {
    let mut collection = None;
    for arg in query_args(attrs) {
        match arg {
            QueryArg::Keyed(key, value) if key == "collection" => collection = Some(value),
            QueryArg::Keyed(key, _) => {
                emit_error!(key, "unknown struct attribute; expected `collection = \"...\"`");
            }
            QueryArg::Skip | QueryArg::Bare(_) => {}
        }
    }
    collection
}

pub fn expand_derive_query_schema(input: &DeriveInput) -> TokenStream {
    let struct_name = &input.ident;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => abort!(input, "QuerySchema only supports structs with named fields"),
        },
        _ => abort!(input, "QuerySchema can only be derived for structs"),
    };

    let mut descriptors = Vec::new();
    let mut field_types = Vec::new();

    for field in fields {
        let Some(field_ident) = field.ident.as_ref() else {
            abort!(field, "QuerySchema requires named fields");
        };

        let mut skip = false;
        let mut annotations = Vec::new();
        for arg in query_args(&field.attrs) {
            match arg {
                QueryArg::Skip => skip = true,
                QueryArg::Keyed(key, value) => {
                    let key = key.unraw().to_string();
                    annotations.push(quote! {
                        ::modkit_query::tag::Annotation { key: ::core::option::Option::Some(#key), value: #value }
                    });
                }
                QueryArg::Bare(value) => annotations.push(quote! {
                    ::modkit_query::tag::Annotation { key: ::core::option::Option::None, value: #value }
                }),
            }
        }
        if skip {
            continue;
        }

        let ident = field_ident.unraw().to_string();
        let ty = &field.ty;
        descriptors.push(quote! {
            ::modkit_query::schema::FieldDescriptor {
                ident: #ident,
                shape: <#ty as ::modkit_query::schema::QueryField>::SHAPE,
                annotations: &[#(#annotations),*],
            }
        });
        field_types.push(ty);
    }

    let name = struct_name.unraw().to_string();
    let collection_fn = collection_override(&input.attrs).map(|collection| {
        quote! {
            fn collection_name() -> ::std::string::String {
                ::std::string::String::from(#collection)
            }
        }
    });

    let mut generics = input.generics.clone();
    if generics.type_params().next().is_some() {
        let where_clause = generics.make_where_clause();
        for ty in &field_types {
            where_clause
                .predicates
                .push(syn::parse_quote!(#ty: ::modkit_query::schema::QueryField));
        }
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    quote! {
        impl #impl_generics ::modkit_query::schema::QuerySchema for #struct_name #ty_generics #where_clause {
            const NAME: &'static str = #name;
            const FIELDS: &'static [::modkit_query::schema::FieldDescriptor] = &[
                #(#descriptors),*
            ];
            #collection_fn
        }

        impl #impl_generics ::modkit_query::schema::QueryField for #struct_name #ty_generics #where_clause {
            const SHAPE: ::modkit_query::schema::FieldShape = ::modkit_query::schema::FieldShape::Record(
                <Self as ::modkit_query::schema::QuerySchema>::FIELDS,
            );
        }
    }
}
