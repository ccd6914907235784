use super::ProjectStore;
use crate::error::{Result, ShellError};
use crate::model::ProjectRecord;
use std::fs;
use std::path::PathBuf;

/// Project rows read from a JSON array on every call.
#[derive(Debug, Clone)]
pub struct JsonProjectStore {
    path: PathBuf,
}

impl JsonProjectStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ProjectStore for JsonProjectStore {
    fn list_projects(&self) -> Result<Vec<ProjectRecord>> {
        let content = fs::read_to_string(&self.path)
            .map_err(|e| ShellError::Store(format!("{}: {}", self.path.display(), e)))?;
        serde_json::from_str(&content)
            .map_err(|e| ShellError::Store(format!("{}: {}", self.path.display(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn reads_projects() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("projects.json");
        fs::write(
            &path,
            r#"[{"name": "Terminal Portfolio",
                 "description": "A vintage CRT-inspired portfolio",
                 "tech_stack": ["React", "TypeScript", "Tailwind"],
                 "github_url": "https://github.com/example/portfolio",
                 "created_at": "2024-02-10T12:00:00Z"}]"#,
        )
        .unwrap();

        let projects = JsonProjectStore::new(&path).list_projects().unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].tech_stack[2], "Tailwind");
        assert_eq!(projects[0].status, "active");
    }

    #[test]
    fn unreadable_files_are_store_failures() {
        let dir = TempDir::new().unwrap();
        let missing = JsonProjectStore::new(dir.path().join("missing.json"));
        assert!(missing.list_projects().unwrap_err().is_store_failure());

        let path = dir.path().join("broken.json");
        fs::write(&path, "[{").unwrap();
        assert!(JsonProjectStore::new(&path).list_projects().unwrap_err().is_store_failure());
    }
}
