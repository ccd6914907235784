use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Commands whose output needs logic beyond template substitution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuiltinHandler {
    Help,
    Projects,
    Clear,
}

impl BuiltinHandler {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "help" => Some(BuiltinHandler::Help),
            "projects" => Some(BuiltinHandler::Projects),
            "clear" => Some(BuiltinHandler::Clear),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BuiltinHandler::Help => "help",
            BuiltinHandler::Projects => "projects",
            BuiltinHandler::Clear => "clear",
        }
    }
}

impl fmt::Display for BuiltinHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandBody {
    Template(String),
    Builtin(BuiltinHandler),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Lowercased, unique within a catalog.
    pub name: String,
    pub description: String,
    pub category: String,
    pub active: bool,
    pub body: CommandBody,
}

/// A catalog row as stored by the external catalog table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRow {
    pub command: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub response_template: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_category() -> String {
    "general".to_string()
}

fn default_active() -> bool {
    true
}

impl From<CatalogRow> for CommandSpec {
    fn from(row: CatalogRow) -> Self {
        let name = row.command.trim().to_lowercase();
        let body = match BuiltinHandler::from_name(&name) {
            Some(handler) => CommandBody::Builtin(handler),
            None => CommandBody::Template(row.response_template),
        };
        Self {
            name,
            description: row.description,
            category: row.category,
            active: row.is_active,
            body,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tech_stack: Vec<String>,
    #[serde(default)]
    pub github_url: Option<String>,
    #[serde(default)]
    pub live_url: Option<String>,
    #[serde(default = "default_status")]
    pub status: String,
    pub created_at: DateTime<Utc>,
}

fn default_status() -> String {
    "active".to_string()
}

impl ProjectRecord {
    pub fn new(name: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            tech_stack: Vec::new(),
            github_url: None,
            live_url: None,
            status: default_status(),
            created_at,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_stack(mut self, stack: &[&str]) -> Self {
        self.tech_stack = stack.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    pub fn with_links(mut self, github_url: Option<&str>, live_url: Option<&str>) -> Self {
        self.github_url = github_url.map(str::to_string);
        self.live_url = live_url.map(str::to_string);
        self
    }
}

/// Output sentinel telling the front-end to clear its screen.
pub const CLEAR_SENTINEL: &str = "__CLEAR__";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResponse {
    pub output: String,
    pub error: bool,
}

impl CommandResponse {
    pub fn ok(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            error: false,
        }
    }

    pub fn error(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            error: true,
        }
    }

    pub fn is_clear(&self) -> bool {
        !self.error && self.output == CLEAR_SENTINEL
    }
}

/// Owner profile served to templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Profile {
    pub name: &'static str,
    pub title: &'static str,
    pub location: &'static str,
    pub status: &'static str,
}

pub const PROFILE: Profile = Profile {
    name: "Tulio Cunha",
    title: "Full-stack Developer",
    location: "Remote",
    status: "Available for projects",
};

impl Profile {
    pub fn field(&self, name: &str) -> Option<&'static str> {
        match name.to_lowercase().as_str() {
            "name" => Some(self.name),
            "title" => Some(self.title),
            "location" => Some(self.location),
            "status" => Some(self.status),
            _ => None,
        }
    }

    pub const FIELDS: [&'static str; 4] = ["name", "title", "location", "status"];
}
