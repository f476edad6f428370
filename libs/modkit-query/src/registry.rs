//! The live set of accepted query parameters.
//!
//! The active map is always recomputed from three layers merged in a fixed order:
//! introspected fields minus disabled names, then meta-parameters minus disabled
//! names, then caller overrides. Overrides survive every later `disable` call.

use std::collections::{BTreeMap, BTreeSet};

use crate::kind::ParameterKind;
use crate::schema::{FieldDescriptor, ParameterMap, build_parameter_map};

#[derive(Clone, Debug)]
pub struct ParameterRegistry {
    fields: &'static [FieldDescriptor],
    disabled: BTreeSet<String>,
    overrides: BTreeMap<String, ParameterKind>,
    active: ParameterMap,
}

impl ParameterRegistry {
    #[must_use]
    pub fn new(fields: &'static [FieldDescriptor]) -> Self {
        Self {
            fields,
            disabled: BTreeSet::new(),
            overrides: BTreeMap::new(),
            active: build_parameter_map(fields, &BTreeSet::new()),
        }
    }

    /// Disable parameters. Requests using them are rejected afterwards,
    /// unless the name was also added as an override.
    pub fn disable<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.disabled.extend(names.into_iter().map(Into::into));
        self.rebuild();
    }

    /// Add a parameter or change the kind of an existing one.
    pub fn add_or_overwrite(&mut self, name: impl Into<String>, kind: ParameterKind) {
        self.overrides.insert(name.into(), kind);
        self.rebuild();
    }

    #[must_use]
    pub fn kind_of(&self, name: &str) -> Option<ParameterKind> {
        self.active.get(name).copied()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.active.contains_key(name)
    }

    #[must_use]
    pub fn parameters(&self) -> &ParameterMap {
        &self.active
    }

    #[must_use]
    pub fn disabled(&self) -> &BTreeSet<String> {
        &self.disabled
    }

    fn rebuild(&mut self) {
        let mut active = build_parameter_map(self.fields, &self.disabled);
        active.extend(self.overrides.iter().map(|(k, v)| (k.clone(), *v)));
        self.active = active;
        tracing::debug!(
            parameters = self.active.len(),
            disabled = ?self.disabled,
            overrides = self.overrides.len(),
            "parameter registry rebuilt"
        );
    }
}
