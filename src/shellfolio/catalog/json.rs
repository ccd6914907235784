use super::CatalogSource;
use crate::error::Result;
use crate::model::CatalogRow;
use std::fs;
use std::path::{Path, PathBuf};

/// Catalog rows read from a JSON array on every load.
#[derive(Debug, Clone)]
pub struct JsonCatalog {
    path: PathBuf,
}

impl JsonCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CatalogSource for JsonCatalog {
    fn load_rows(&self) -> Result<Vec<CatalogRow>> {
        let content = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }
}
