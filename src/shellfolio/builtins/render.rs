//! Styled output for built-in commands.
//!
//! Layout that needs Unicode width math (column padding) happens in the
//! `pad` filter; templates pick styles by name from [`BUILTIN_THEME`].

use crate::error::Result;
use console::Style;
use once_cell::sync::Lazy;
use serde::Serialize;
use termstyle::{rgb_to_ansi256, Renderer, Theme};

pub const HELP_TEMPLATE: &str = include_str!("templates/help.tmp");
pub const HELP_TOPIC_TEMPLATE: &str = include_str!("templates/help_topic.tmp");
pub const PROJECTS_TEMPLATE: &str = include_str!("templates/projects.tmp");

pub mod names {
    pub const HELP: &str = "help";
    pub const HELP_TOPIC: &str = "help_topic";
    pub const PROJECTS: &str = "projects";
}

/// Phosphor green of the CRT look.
const PHOSPHOR: (u8, u8, u8) = (51, 255, 102);

pub static BUILTIN_THEME: Lazy<Theme> = Lazy::new(|| {
    Theme::new()
        .add("title", Style::new().bold())
        .add("heading", Style::new().yellow().bold())
        .add("command", Style::new().color256(rgb_to_ansi256(PHOSPHOR)))
        .add("muted", Style::new().dim())
        .add("header", Style::new().cyan())
        .add("name", Style::new().bold())
        .add("status_active", Style::new().green())
        .add("status_other", Style::new().yellow())
        .add("label", Style::new().dim())
        .add("stack", Style::new().cyan())
        .add("link", Style::new().blue().underlined())
        .add(
            "time",
            Style::new()
                .color256(rgb_to_ansi256((154, 154, 154)))
                .italic(),
        )
        .add("hint", Style::new().color256(rgb_to_ansi256(PHOSPHOR)))
});

/// Pre-compiled templates for every built-in.
pub struct BuiltinRenderer {
    renderer: Renderer,
}

impl BuiltinRenderer {
    pub fn new(use_color: bool) -> Result<Self> {
        let mut renderer = Renderer::with_color(BUILTIN_THEME.clone(), use_color);
        renderer.add_template(names::HELP, HELP_TEMPLATE)?;
        renderer.add_template(names::HELP_TOPIC, HELP_TOPIC_TEMPLATE)?;
        renderer.add_template(names::PROJECTS, PROJECTS_TEMPLATE)?;
        Ok(Self { renderer })
    }

    pub fn render<T: Serialize>(&self, name: &str, data: &T) -> Result<String> {
        Ok(self.renderer.render(name, data)?)
    }
}
