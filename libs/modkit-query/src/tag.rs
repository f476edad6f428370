//! Field-name overrides carried by field annotations.
//!
//! An annotation is either keyed (`bson = "intMember,omitempty"`) or bare
//! (`"mybool"`). Only the naming namespace and the bare form may rename a
//! field; any other keyed annotation means the field keeps its own name.

/// Annotation key that carries the store-side field name.
pub const NAMING_NAMESPACE: &str = "bson";

/// Serializer modifiers that can appear in a naming annotation but are never names.
pub const DIRECTIVES: &[&str] = &["omitempty", "minsize", "inline"];

/// A single field annotation as declared on a schema field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Annotation {
    pub key: Option<&'static str>,
    pub value: &'static str,
}

impl Annotation {
    #[must_use]
    pub const fn keyed(key: &'static str, value: &'static str) -> Self {
        Self {
            key: Some(key),
            value,
        }
    }

    #[must_use]
    pub const fn bare(value: &'static str) -> Self {
        Self { key: None, value }
    }
}

/// First token of a comma-separated annotation value that is not a directive.
#[must_use]
pub fn first_name_token(value: &str) -> Option<&str> {
    value
        .split(',')
        .map(str::trim)
        .find(|token| !token.is_empty() && !DIRECTIVES.contains(token))
}

/// Resolve the override name declared by a field's annotations, if any.
#[must_use]
pub fn override_name(annotations: &[Annotation]) -> Option<&'static str> {
    if let Some(name) = annotations
        .iter()
        .filter(|a| a.key == Some(NAMING_NAMESPACE))
        .find_map(|a| first_name_token(a.value))
    {
        return Some(name);
    }

    if annotations.iter().any(|a| a.key.is_some()) {
        return None;
    }

    annotations
        .iter()
        .find(|a| a.key.is_none())
        .and_then(|a| first_name_token(a.value))
}
