//! Built-in template handlers: pure lookups over static tables.

use crate::model::PROFILE;

/// A handler gets `args[N]` when present, `None` otherwise.
pub type Handler = fn(Option<&str>) -> String;

struct ProjectEntry {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    stack: &'static [&'static str],
}

const PROJECTS: &[ProjectEntry] = &[ProjectEntry {
    id: "1",
    name: "Terminal Portfolio",
    description: "A vintage CRT-inspired portfolio website with interactive terminal interface.",
    stack: &["React", "TypeScript", "Tailwind"],
}];

const PAGES: &[&str] = &["home", "about", "projects", "contact"];

const THEMES: &[&str] = &["green", "amber", "blue", "white"];

pub fn builtin_handlers() -> Vec<(&'static str, Handler)> {
    vec![
        ("project", project as Handler),
        ("navigate", navigate),
        ("theme", theme),
        ("profile", profile),
    ]
}

pub fn project(id: Option<&str>) -> String {
    let Some(id) = id else {
        let ids: Vec<String> = PROJECTS.iter().map(|p| format!("{} ({})", p.id, p.name)).collect();
        return format!("Usage: project <id>. Available: {}", ids.join(", "));
    };
    match PROJECTS
        .iter()
        .find(|p| p.id == id || p.name.eq_ignore_ascii_case(id))
    {
        Some(p) => format!("{}: {} [{}]", p.name, p.description, p.stack.join(", ")),
        None => format!("Project not found: {}", id),
    }
}

pub fn navigate(target: Option<&str>) -> String {
    match target.map(str::to_lowercase) {
        Some(page) if PAGES.contains(&page.as_str()) => format!("Navigating to /{}...", page),
        Some(page) => format!("Unknown page: {}. Available pages: {}", page, PAGES.join(", ")),
        None => format!("Usage: navigate <page>. Available pages: {}", PAGES.join(", ")),
    }
}

pub fn theme(name: Option<&str>) -> String {
    match name.map(str::to_lowercase) {
        Some(theme) if THEMES.contains(&theme.as_str()) => format!("Theme set to {}.", theme),
        Some(theme) => format!("Unknown theme: {}. Available themes: {}", theme, THEMES.join(", ")),
        None => format!("Available themes: {}", THEMES.join(", ")),
    }
}

pub fn profile(field: Option<&str>) -> String {
    match field {
        Some(field) => match PROFILE.field(field) {
            Some(value) => value.to_string(),
            None => format!("Unknown profile field: {}", field),
        },
        None => format!(
            "{}, {} ({}). {}.",
            PROFILE.name, PROFILE.title, PROFILE.location, PROFILE.status
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_lookup() {
        assert!(project(Some("1")).starts_with("Terminal Portfolio: A vintage"));
        assert!(project(Some("terminal portfolio")).ends_with("[React, TypeScript, Tailwind]"));
        assert_eq!(project(Some("42")), "Project not found: 42");
        assert!(project(None).starts_with("Usage: project <id>"));
    }

    #[test]
    fn navigate_validates_pages() {
        assert_eq!(navigate(Some("About")), "Navigating to /about...");
        assert!(navigate(Some("admin")).starts_with("Unknown page: admin"));
        assert!(navigate(None).starts_with("Usage"));
    }

    #[test]
    fn theme_validates_names() {
        assert_eq!(theme(Some("amber")), "Theme set to amber.");
        assert!(theme(Some("pink")).starts_with("Unknown theme: pink"));
    }

    #[test]
    fn profile_fields() {
        assert_eq!(profile(Some("name")), "Tulio Cunha");
        assert_eq!(profile(Some("STATUS")), "Available for projects");
        assert_eq!(profile(Some("age")), "Unknown profile field: age");
        assert_eq!(
            profile(None),
            "Tulio Cunha, Full-stack Developer (Remote). Available for projects."
        );
    }
}
