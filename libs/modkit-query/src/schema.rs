//! Statically declared schema descriptions and their introspection.
//!
//! This module defines how a document type describes itself to the query layer:
//! - `QueryField`: the shape of a single field type (scalar, sequence or nested record)
//! - `FieldDescriptor`: one entry of a schema's field table
//! - `QuerySchema`: the field table and collection name of a document type
//! - `build_parameter_map`: flattens a field table into name → kind
//!
//! Field tables are normally generated by `#[derive(QuerySchema)]`, but can be
//! written by hand as `const` slices.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::kind::ParameterKind;
use crate::object_id::ObjectId;
use crate::tag::{Annotation, override_name};

/// Mapping from externally visible parameter name to its kind.
pub type ParameterMap = BTreeMap<String, ParameterKind>;

/// Shape of a field type.
#[derive(Clone, Copy, Debug)]
pub enum FieldShape {
    Scalar(ParameterKind),
    /// Sequence whose elements have the given kind.
    Sequence(ParameterKind),
    /// Nested record whose fields are flattened into the parent.
    Record(&'static [FieldDescriptor]),
}

impl FieldShape {
    /// Kind of a value of this shape when used as a sequence element.
    #[must_use]
    pub const fn element_kind(self) -> ParameterKind {
        match self {
            FieldShape::Scalar(kind) => kind,
            FieldShape::Sequence(_) => ParameterKind::Sequence,
            FieldShape::Record(_) => ParameterKind::Record,
        }
    }
}

/// One field of a schema's field table.
#[derive(Clone, Copy, Debug)]
pub struct FieldDescriptor {
    /// Declared field name.
    pub ident: &'static str,
    pub shape: FieldShape,
    pub annotations: &'static [Annotation],
}

impl FieldDescriptor {
    #[must_use]
    pub const fn new(ident: &'static str, shape: FieldShape) -> Self {
        Self {
            ident,
            shape,
            annotations: &[],
        }
    }

    #[must_use]
    pub const fn with_annotations(mut self, annotations: &'static [Annotation]) -> Self {
        self.annotations = annotations;
        self
    }

    /// Externally visible name: the annotation override, else the lower-cased ident.
    #[must_use]
    pub fn parameter_name(&self) -> String {
        override_name(self.annotations).map_or_else(|| self.ident.to_lowercase(), str::to_owned)
    }
}

/// Types usable as schema fields.
pub trait QueryField {
    const SHAPE: FieldShape;
}

macro_rules! scalar_fields {
    ($kind:ident => $($ty:ty),+ $(,)?) => {
        $(
            impl QueryField for $ty {
                const SHAPE: FieldShape = FieldShape::Scalar(ParameterKind::$kind);
            }
        )+
    };
}

scalar_fields!(Bool => bool);
scalar_fields!(Int => i8, i16, i32, i64, isize);
scalar_fields!(Uint => u8, u16, u32, u64, usize);
scalar_fields!(Float => f32, f64);
scalar_fields!(String => String, &'static str, char, ObjectId);

impl<T: QueryField> QueryField for Option<T> {
    const SHAPE: FieldShape = T::SHAPE;
}

impl<T: QueryField> QueryField for Box<T> {
    const SHAPE: FieldShape = T::SHAPE;
}

impl<T: QueryField> QueryField for Vec<T> {
    const SHAPE: FieldShape = FieldShape::Sequence(T::SHAPE.element_kind());
}

impl<T: QueryField> QueryField for VecDeque<T> {
    const SHAPE: FieldShape = FieldShape::Sequence(T::SHAPE.element_kind());
}

impl<T: QueryField> QueryField for BTreeSet<T> {
    const SHAPE: FieldShape = FieldShape::Sequence(T::SHAPE.element_kind());
}

impl<T: QueryField, const N: usize> QueryField for [T; N] {
    const SHAPE: FieldShape = FieldShape::Sequence(T::SHAPE.element_kind());
}

/// A document type exposed as a queryable collection.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(QuerySchema)]
/// struct Person {
///     name: String,
///     #[query(bson = "years")]
///     age: i64,
/// }
///
/// assert_eq!(Person::collection_name(), "person");
/// ```
pub trait QuerySchema {
    /// Type name; the collection is named after it.
    const NAME: &'static str;

    const FIELDS: &'static [FieldDescriptor];

    #[must_use]
    fn collection_name() -> String {
        Self::NAME.to_lowercase()
    }
}

/// Reserved query parameters controlling pagination, projection and ordering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MetaParameter {
    Page,
    Limit,
    Field,
    Sort,
}

impl MetaParameter {
    pub const ALL: [MetaParameter; 4] = [
        MetaParameter::Page,
        MetaParameter::Limit,
        MetaParameter::Field,
        MetaParameter::Sort,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            MetaParameter::Page => "page",
            MetaParameter::Limit => "limit",
            MetaParameter::Field => "field",
            MetaParameter::Sort => "sort",
        }
    }

    #[must_use]
    pub const fn kind(self) -> ParameterKind {
        match self {
            MetaParameter::Page | MetaParameter::Limit => ParameterKind::Uint,
            MetaParameter::Field | MetaParameter::Sort => ParameterKind::String,
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.name() == name)
    }

    #[must_use]
    pub fn is_meta(name: &str) -> bool {
        Self::from_name(name).is_some()
    }
}

/// Build the parameter map of a field table.
///
/// Nested records are flattened into the same namespace, sequences register
/// their element kind, and the meta-parameters are added last. Any name in
/// `disabled` is left out, wherever it comes from.
#[must_use]
pub fn build_parameter_map(fields: &[FieldDescriptor], disabled: &BTreeSet<String>) -> ParameterMap {
    let mut map = ParameterMap::new();
    collect_fields(fields, disabled, &mut map);

    for meta in MetaParameter::ALL {
        if !disabled.contains(meta.name()) {
            map.insert(meta.name().to_owned(), meta.kind());
        }
    }
    map
}

fn collect_fields(fields: &[FieldDescriptor], disabled: &BTreeSet<String>, map: &mut ParameterMap) {
    for field in fields {
        let kind = match field.shape {
            FieldShape::Record(nested) => {
                collect_fields(nested, disabled, map);
                continue;
            }
            FieldShape::Sequence(element) => element,
            FieldShape::Scalar(kind) => kind,
        };

        let name = field.parameter_name();
        if !disabled.contains(&name) {
            map.insert(name, kind);
        }
    }
}
