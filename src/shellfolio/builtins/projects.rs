use super::render::{names, BuiltinRenderer};
use super::Invocation;
use crate::error::Result;
use crate::listing::{ListingPage, ListingQuery};
use crate::model::{CommandResponse, ProjectRecord};
use crate::sanitize::validate_url;
use crate::store::{fetch_projects, ProjectStore};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

pub const STORE_FAILURE_MESSAGE: &str = "Failed to load projects. Please try again later.";

#[derive(Serialize)]
struct LinkData {
    label: &'static str,
    url: String,
}

#[derive(Serialize)]
struct ProjectData {
    name: String,
    status: String,
    status_style: &'static str,
    description: String,
    stack: String,
    links: Vec<LinkData>,
    time_ago: String,
}

#[derive(Serialize)]
struct HintData {
    label: &'static str,
    command: String,
}

#[derive(Serialize)]
struct ProjectsData {
    header: String,
    projects: Vec<ProjectData>,
    hints: Vec<HintData>,
}

pub fn run(
    store: &Arc<dyn ProjectStore>,
    invocation: &Invocation,
    renderer: &BuiltinRenderer,
) -> Result<CommandResponse> {
    let projects = match fetch_projects(store, invocation.timeout) {
        Ok(projects) => projects,
        Err(e) => {
            warn!(error = %e, "failed to load projects");
            return Ok(CommandResponse::error(STORE_FAILURE_MESSAGE));
        }
    };

    let query = ListingQuery::parse(invocation.args);
    let page = ListingPage::build(invocation.command, &projects, query, invocation.default_page_size);
    let Some(window) = page.window else {
        return Ok(CommandResponse::ok(page.empty_message()));
    };

    let mut hints = Vec::new();
    if let Some(command) = page.prev_hint.clone() {
        hints.push(HintData { label: "Prev", command });
    }
    if let Some(command) = page.next_hint.clone() {
        hints.push(HintData { label: "Next", command });
    }

    let data = ProjectsData {
        header: window.header(),
        projects: page
            .items
            .iter()
            .map(|p| project_data(p, invocation.now))
            .collect(),
        hints,
    };
    renderer
        .render(names::PROJECTS, &data)
        .map(CommandResponse::ok)
}

fn project_data(project: &ProjectRecord, now: DateTime<Utc>) -> ProjectData {
    let mut links = Vec::new();
    for (label, url) in [("repo", &project.github_url), ("live", &project.live_url)] {
        if let Some(url) = url.as_deref().filter(|u| validate_url(u)) {
            links.push(LinkData {
                label,
                url: url.to_string(),
            });
        }
    }

    ProjectData {
        name: project.name.clone(),
        status: project.status.clone(),
        status_style: if project.status.eq_ignore_ascii_case("active") {
            "status_active"
        } else {
            "status_other"
        },
        description: project.description.clone(),
        stack: project.tech_stack.join(", "),
        links,
        time_ago: format_time_ago(project.created_at, now),
    }
}

fn format_time_ago(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let duration = now.signed_duration_since(timestamp);
    let formatter = timeago::Formatter::new();
    formatter.convert(duration.to_std().unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::fixtures::{FailingStore, SlowStore, StoreFixture};
    use chrono::TimeZone;
    use std::time::Duration;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    fn list(store: &Arc<dyn ProjectStore>, args: &[&str]) -> CommandResponse {
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        let invocation = Invocation {
            command: "projects",
            args: &args,
            default_page_size: 5,
            timeout: Duration::from_secs(2),
            now: now(),
        };
        run(store, &invocation, &BuiltinRenderer::new(false).unwrap()).unwrap()
    }

    #[test]
    fn renders_page_with_hints() {
        let store = StoreFixture::new().with_projects(12).into_store();
        let out = list(&store, &["--page", "2"]);
        assert!(!out.error);
        assert!(out.output.starts_with("Page 2/3 • Showing 6-10 of 12\n"));
        assert!(out.output.contains("Project 6 [active]"));
        assert!(out.output.contains("Project 10 [active]"));
        assert!(!out.output.contains("Project 11 "));
        assert!(out.output.contains("Prev: projects --per 5 --page 1"));
        assert!(out.output.ends_with("Next: projects --per 5 --page 3"));
    }

    #[test]
    fn renders_details_and_valid_links_only() {
        let project = ProjectRecord::new("Terminal Portfolio", now() - chrono::Duration::days(3))
            .with_description("A vintage CRT-inspired portfolio")
            .with_stack(&["React", "TypeScript"])
            .with_status("wip")
            .with_links(Some("https://github.com/example/tp"), Some("javascript:alert(1)"));
        let store = StoreFixture::new().with_record(project).into_store();

        let out = list(&store, &[]);
        assert!(out.output.contains("Terminal Portfolio [wip]"));
        assert!(out.output.contains("  A vintage CRT-inspired portfolio"));
        assert!(out.output.contains("  stack  React, TypeScript"));
        assert!(out.output.contains("  repo   https://github.com/example/tp"));
        assert!(!out.output.contains("javascript"));
        assert!(out.output.contains("3 days ago"));
        assert!(!out.output.contains("Prev:"));
    }

    #[test]
    fn empty_listing_messages() {
        let store = StoreFixture::new().with_projects(2).into_store();
        let out = list(&store, &["cobol"]);
        assert_eq!(out, CommandResponse::ok("No projects found matching \"cobol\"."));

        let empty = StoreFixture::new().into_store();
        assert_eq!(list(&empty, &[]), CommandResponse::ok("No projects found."));
    }

    #[test]
    fn store_failures_are_distinct_from_empty() {
        let failing: Arc<dyn ProjectStore> = Arc::new(FailingStore);
        assert_eq!(list(&failing, &[]), CommandResponse::error(STORE_FAILURE_MESSAGE));
    }

    #[test]
    fn store_timeout_reports_failure() {
        let slow: Arc<dyn ProjectStore> = Arc::new(SlowStore::new(Duration::from_millis(400)));
        let args: Vec<String> = Vec::new();
        let invocation = Invocation {
            command: "projects",
            args: &args,
            default_page_size: 5,
            timeout: Duration::from_millis(20),
            now: now(),
        };
        let out = run(&slow, &invocation, &BuiltinRenderer::new(false).unwrap()).unwrap();
        assert_eq!(out, CommandResponse::error(STORE_FAILURE_MESSAGE));
    }
}
