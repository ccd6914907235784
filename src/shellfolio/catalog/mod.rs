//! # Command catalog
//!
//! The catalog maps command names to [`CommandSpec`]s. Rows come from a
//! [`CatalogSource`]:
//!
//! - [`memory::MemoryCatalog`]: rows held in memory, for tests and embedding
//! - [`json::JsonCatalog`]: a JSON array of rows on disk
//!
//! [`Catalog::embedded`] loads the catalog compiled into the binary.
//!
//! Names are stored lowercase and looked up case-insensitively. Inactive rows
//! are kept (so `list` callers can see the full table if they need it) but
//! never resolve.

use crate::error::Result;
use crate::model::{CatalogRow, CommandSpec};
use std::collections::BTreeMap;
use tracing::debug;

pub mod json;
pub mod memory;

const EMBEDDED_CATALOG: &str = include_str!("default_catalog.json");

/// Read-only source of catalog rows.
pub trait CatalogSource {
    fn load_rows(&self) -> Result<Vec<CatalogRow>>;
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: BTreeMap<String, CommandSpec>,
}

impl Catalog {
    pub fn from_rows(rows: impl IntoIterator<Item = CatalogRow>) -> Self {
        let mut entries = BTreeMap::new();
        for row in rows {
            let spec = CommandSpec::from(row);
            if spec.name.is_empty() {
                continue;
            }
            if entries.contains_key(&spec.name) {
                debug!(command = %spec.name, "duplicate catalog row replaces earlier one");
            }
            entries.insert(spec.name.clone(), spec);
        }
        Self { entries }
    }

    pub fn load(source: &dyn CatalogSource) -> Result<Self> {
        Ok(Self::from_rows(source.load_rows()?))
    }

    pub fn embedded() -> Result<Self> {
        let rows: Vec<CatalogRow> = serde_json::from_str(EMBEDDED_CATALOG)?;
        Ok(Self::from_rows(rows))
    }

    /// The active entry named `name`, in any letter case.
    pub fn lookup(&self, name: &str) -> Option<&CommandSpec> {
        self.entries
            .get(&name.to_lowercase())
            .filter(|spec| spec.active)
    }

    /// Active entries ordered by category, then name.
    pub fn list(&self, category: Option<&str>) -> Vec<&CommandSpec> {
        let mut specs: Vec<&CommandSpec> = self
            .entries
            .values()
            .filter(|spec| spec.active)
            .filter(|spec| category.map_or(true, |c| spec.category.eq_ignore_ascii_case(c)))
            .collect();
        specs.sort_by(|a, b| a.category.cmp(&b.category).then_with(|| a.name.cmp(&b.name)));
        specs
    }

    /// Number of entries, active or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
