use super::CatalogSource;
use crate::error::Result;
use crate::model::{BuiltinHandler, CatalogRow};

#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    rows: Vec<CatalogRow>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_row(mut self, row: CatalogRow) -> Self {
        self.rows.push(row);
        self
    }

    pub fn with_template(self, command: &str, category: &str, template: &str) -> Self {
        self.with_row(CatalogRow {
            command: command.to_string(),
            description: format!("{} command", command),
            category: category.to_string(),
            response_template: template.to_string(),
            is_active: true,
        })
    }

    pub fn with_builtin(self, handler: BuiltinHandler, category: &str) -> Self {
        self.with_row(CatalogRow {
            command: handler.name().to_string(),
            description: format!("{} command", handler),
            category: category.to_string(),
            response_template: String::new(),
            is_active: true,
        })
    }
}

impl CatalogSource for MemoryCatalog {
    fn load_rows(&self) -> Result<Vec<CatalogRow>> {
        Ok(self.rows.clone())
    }
}
