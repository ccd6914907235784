use super::ProjectStore;
use crate::error::Result;
use crate::model::ProjectRecord;

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    projects: Vec<ProjectRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_projects(projects: Vec<ProjectRecord>) -> Self {
        Self { projects }
    }
}

impl ProjectStore for MemoryStore {
    fn list_projects(&self) -> Result<Vec<ProjectRecord>> {
        Ok(self.projects.clone())
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;
    use crate::error::ShellError;
    use crate::store::ProjectStore;
    use chrono::{Duration as ChronoDuration, TimeZone, Utc};
    use std::sync::Arc;
    use std::time::Duration;

    pub struct StoreFixture {
        projects: Vec<ProjectRecord>,
    }

    impl Default for StoreFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    impl StoreFixture {
        pub fn new() -> Self {
            Self {
                projects: Vec::new(),
            }
        }

        /// `age_days` before 2024-06-01.
        pub fn with_project(mut self, name: &str, age_days: i64) -> Self {
            let base = Utc
                .with_ymd_and_hms(2024, 6, 1, 0, 0, 0)
                .single()
                .unwrap_or_else(Utc::now);
            let project = ProjectRecord::new(name, base - ChronoDuration::days(age_days))
                .with_description(format!("Description of {}", name))
                .with_stack(&["Rust"]);
            self.projects.push(project);
            self
        }

        /// `count` projects named "Project 1".."Project N", newest first.
        pub fn with_projects(mut self, count: usize) -> Self {
            for i in 1..=count {
                self = self.with_project(&format!("Project {}", i), i as i64);
            }
            self
        }

        pub fn with_record(mut self, project: ProjectRecord) -> Self {
            self.projects.push(project);
            self
        }

        pub fn into_store(self) -> Arc<dyn ProjectStore> {
            Arc::new(MemoryStore::with_projects(self.projects))
        }
    }

    /// Sleeps before answering with no projects.
    pub struct SlowStore {
        delay: Duration,
    }

    impl SlowStore {
        pub fn new(delay: Duration) -> Self {
            Self { delay }
        }
    }

    impl ProjectStore for SlowStore {
        fn list_projects(&self) -> Result<Vec<ProjectRecord>> {
            std::thread::sleep(self.delay);
            Ok(Vec::new())
        }
    }

    pub struct FailingStore;

    impl ProjectStore for FailingStore {
        fn list_projects(&self) -> Result<Vec<ProjectRecord>> {
            Err(ShellError::Store("connection refused".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::StoreFixture;
    use super::*;

    #[test]
    fn test_fixtures_coverage() {
        let store = StoreFixture::default()
            .with_projects(3)
            .with_project("Extra", 100)
            .with_record(ProjectRecord::new("Raw", chrono::Utc::now()))
            .into_store();
        let projects = store.list_projects().unwrap();
        assert_eq!(projects.len(), 5);
        assert_eq!(projects[0].name, "Project 1");
        assert_eq!(projects[0].tech_stack, vec!["Rust"]);
    }

    #[test]
    fn test_empty_memory_store() {
        assert!(MemoryStore::new().list_projects().unwrap().is_empty());
    }
}
