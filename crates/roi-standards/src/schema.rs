//! Immutable module-code → schema lookup.

use std::collections::BTreeMap;

use roi_model::{ModuleCode, ModuleSchema};

use crate::csv::fields::FieldMeta;
use crate::csv::modules::ModuleMeta;

/// Module schemas of one standards release.
///
/// Built once and shared by reference; holds no interior mutability so it
/// can be handed to concurrent runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaRegistry {
    release: String,
    modules: BTreeMap<ModuleCode, ModuleSchema>,
}

impl SchemaRegistry {
    pub fn from_modules(
        release: impl Into<String>,
        modules: impl IntoIterator<Item = ModuleSchema>,
    ) -> Self {
        Self {
            release: release.into(),
            modules: modules
                .into_iter()
                .map(|schema| (schema.code.clone(), schema))
                .collect(),
        }
    }

    /// Join module and field rows; fields are ordered by `Order` within a module.
    pub(crate) fn assemble(
        release: &str,
        modules: Vec<ModuleMeta>,
        fields: Vec<FieldMeta>,
    ) -> Result<Self, ModuleCode> {
        let mut by_module: BTreeMap<ModuleCode, Vec<FieldMeta>> = BTreeMap::new();
        for field in fields {
            by_module.entry(field.module.clone()).or_default().push(field);
        }

        let mut schemas = Vec::with_capacity(modules.len());
        for meta in modules {
            let mut fields = by_module.remove(&meta.code).unwrap_or_default();
            fields.sort_by_key(|field| field.order);
            schemas.push(ModuleSchema::new(
                meta.code,
                meta.description,
                fields.into_iter().map(|field| field.spec).collect(),
            ));
        }

        if let Some(orphan) = by_module.into_keys().next() {
            return Err(orphan);
        }
        Ok(Self::from_modules(release, schemas))
    }

    pub fn release(&self) -> &str {
        &self.release
    }

    pub fn get(&self, code: &ModuleCode) -> Option<&ModuleSchema> {
        self.modules.get(code)
    }

    pub fn contains(&self, code: &ModuleCode) -> bool {
        self.modules.contains_key(code)
    }

    /// Schemas in module-code order.
    pub fn modules(&self) -> impl Iterator<Item = &ModuleSchema> {
        self.modules.values()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
