//! # Listing arguments and pagination
//!
//! The `projects` command takes free-form arguments:
//!
//! ```text
//! projects react cli --status active --stack=rust --per 3 --page 2
//! ```
//!
//! [`ListingQuery::parse`] splits them into flags and a free-text filter.
//! [`ListingPage::build`] applies the filters in order (free text, status,
//! stack), slices out one page and produces `Prev`/`Next` hints. A hint is the
//! full command line for the adjacent page: parsing it again yields the same
//! query with only the page changed.

use crate::config::DEFAULT_PAGE_SIZE;
use crate::model::ProjectRecord;

pub const MAX_PAGE_SIZE: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flag {
    Per,
    Page,
    Status,
    Stack,
}

impl Flag {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "per" | "limit" => Some(Flag::Per),
            "page" => Some(Flag::Page),
            "status" => Some(Flag::Status),
            "stack" => Some(Flag::Stack),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingQuery {
    /// Case-folded free text; empty when none was given.
    pub filter: String,
    pub status: Option<String>,
    pub stack: Option<String>,
    pub per: Option<usize>,
    pub page: Option<usize>,
}

impl ListingQuery {
    pub fn parse<S: AsRef<str>>(args: &[S]) -> Self {
        let tokens: Vec<&str> = args
            .iter()
            .flat_map(|a| a.as_ref().split_whitespace())
            .collect();

        let mut query = ListingQuery::default();
        let mut free_text: Vec<&str> = Vec::new();
        let mut i = 0;
        while i < tokens.len() {
            let token = tokens[i];
            i += 1;

            let Some(body) = token.strip_prefix("--") else {
                free_text.push(token);
                continue;
            };
            let (name, inline) = match body.split_once('=') {
                Some((name, value)) => (name, Some(value)),
                None => (body, None),
            };
            let Some(flag) = Flag::from_name(name) else {
                free_text.push(token);
                continue;
            };

            let value = match inline {
                Some(v) => Some(v),
                None => match tokens.get(i) {
                    Some(next) if !next.starts_with("--") => {
                        i += 1;
                        Some(*next)
                    }
                    _ => None,
                },
            };
            if let Some(v) = value.filter(|v| !v.is_empty()) {
                query.apply(flag, v);
            }
        }

        query.filter = free_text.join(" ").to_lowercase();
        query
    }

    fn apply(&mut self, flag: Flag, value: &str) {
        match flag {
            Flag::Per => {
                if let Ok(n) = value.parse() {
                    self.per = Some(n);
                }
            }
            Flag::Page => {
                if let Ok(n) = value.parse() {
                    self.page = Some(n);
                }
            }
            Flag::Status => self.status = Some(value.to_string()),
            Flag::Stack => self.stack = Some(value.to_string()),
        }
    }

    pub fn matches(&self, project: &ProjectRecord) -> bool {
        self.matches_text(project) && self.matches_status(project) && self.matches_stack(project)
    }

    fn matches_text(&self, project: &ProjectRecord) -> bool {
        if self.filter.is_empty() {
            return true;
        }
        project.name.to_lowercase().contains(&self.filter)
            || project.description.to_lowercase().contains(&self.filter)
            || project
                .tech_stack
                .iter()
                .any(|t| t.to_lowercase().contains(&self.filter))
    }

    fn matches_status(&self, project: &ProjectRecord) -> bool {
        match &self.status {
            Some(status) => project.status.eq_ignore_ascii_case(status),
            None => true,
        }
    }

    fn matches_stack(&self, project: &ProjectRecord) -> bool {
        match &self.stack {
            Some(stack) => {
                let needle = stack.to_lowercase();
                project
                    .tech_stack
                    .iter()
                    .any(|t| t.to_lowercase().contains(&needle))
            }
            None => true,
        }
    }

    /// The command line that lists `page` of this query at `per` items.
    pub fn hint(&self, command: &str, per: usize, page: usize) -> String {
        let mut parts = vec![command.to_string()];
        if !self.filter.is_empty() {
            parts.push(self.filter.clone());
        }
        if let Some(status) = &self.status {
            parts.push(format!("--status={}", status));
        }
        if let Some(stack) = &self.stack {
            parts.push(format!("--stack={}", stack));
        }
        parts.push(format!("--per {}", per));
        parts.push(format!("--page {}", page));
        parts.join(" ")
    }
}

/// Position of one page within a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: usize,
    pub total_pages: usize,
    pub page_size: usize,
    pub start: usize,
    pub end: usize,
    pub total: usize,
}

impl PageWindow {
    pub fn compute(total: usize, per: Option<usize>, page: Option<usize>, default_size: usize) -> Self {
        let page_size = per.unwrap_or(default_size).clamp(1, MAX_PAGE_SIZE);
        let total_pages = total.div_ceil(page_size).max(1);
        let page = page.unwrap_or(1).clamp(1, total_pages);
        let start = (page - 1) * page_size;
        let end = total.min(start + page_size);
        Self {
            page,
            total_pages,
            page_size,
            start,
            end,
            total,
        }
    }

    pub fn header(&self) -> String {
        format!(
            "Page {}/{} • Showing {}-{} of {}",
            self.page,
            self.total_pages,
            self.start + 1,
            self.end,
            self.total
        )
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// One rendered-ready page of a filtered listing.
#[derive(Debug, Clone)]
pub struct ListingPage<'a> {
    pub query: ListingQuery,
    pub items: Vec<&'a ProjectRecord>,
    /// `None` when nothing matched.
    pub window: Option<PageWindow>,
    pub prev_hint: Option<String>,
    pub next_hint: Option<String>,
}

impl<'a> ListingPage<'a> {
    pub fn build(
        command: &str,
        projects: &'a [ProjectRecord],
        query: ListingQuery,
        default_size: usize,
    ) -> Self {
        let matched: Vec<&ProjectRecord> = projects.iter().filter(|p| query.matches(p)).collect();
        if matched.is_empty() {
            return Self {
                query,
                items: Vec::new(),
                window: None,
                prev_hint: None,
                next_hint: None,
            };
        }

        let window = PageWindow::compute(matched.len(), query.per, query.page, default_size);
        let prev_hint = window
            .has_prev()
            .then(|| query.hint(command, window.page_size, window.page - 1));
        let next_hint = window
            .has_next()
            .then(|| query.hint(command, window.page_size, window.page + 1));
        let items = matched[window.start..window.end].to_vec();

        Self {
            query,
            items,
            window: Some(window),
            prev_hint,
            next_hint,
        }
    }

    /// Same as [`ListingPage::build`] with the stock default page size.
    pub fn with_default_size(command: &str, projects: &'a [ProjectRecord], query: ListingQuery) -> Self {
        Self::build(command, projects, query, DEFAULT_PAGE_SIZE)
    }

    pub fn empty_message(&self) -> String {
        if self.query.filter.is_empty() {
            "No projects found.".to_string()
        } else {
            format!("No projects found matching \"{}\".", self.query.filter)
        }
    }
}
