//! # termstyle - named ANSI styles for server-rendered terminals
//!
//! Output produced by a server-driven terminal is consumed by a remote console,
//! not by the process's own stdout. Terminal capability detection therefore
//! makes no sense here: the caller decides whether color is wanted, and when it
//! is, escape sequences are always emitted.
//!
//! The crate offers two things:
//!
//! - [`Styles`]: a registry of named `console::Style` values with an
//!   explicit lookup ([`Styles::try_apply`]) so callers can tell a missing
//!   style apart from a styled result.
//! - [`render_with_color`] / [`Renderer`]: minijinja rendering with a
//!   `style` filter bound to a [`Theme`], and a `pad` filter that pads to a
//!   display width (Unicode aware) before styling, so aligned columns stay
//!   aligned once escape codes are added.
//!
//! ```rust
//! use termstyle::{render_with_color, Theme};
//! use console::Style;
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Row { name: String }
//!
//! let theme = Theme::new().add("name", Style::new().bold());
//! let out = render_with_color(
//!     r#"{{ name | pad(6) | style("name") }}|"#,
//!     &Row { name: "ls".into() },
//!     &theme,
//!     false,
//! ).unwrap();
//! assert_eq!(out, "ls    |");
//! ```

use console::Style;
use minijinja::{Environment, Error, Value};
use serde::Serialize;
use std::collections::HashMap;
use unicode_width::UnicodeWidthStr;

/// Prefix shown when a template asks for a style that is not registered.
pub const DEFAULT_MISSING_STYLE_INDICATOR: &str = "(!?)";

/// A collection of named styles.
///
/// Every style is stored with forced styling, so applying it always yields
/// escape sequences regardless of what the local process is attached to.
#[derive(Clone)]
pub struct Styles {
    styles: HashMap<String, Style>,
    missing_indicator: String,
}

impl Default for Styles {
    fn default() -> Self {
        Self {
            styles: HashMap::new(),
            missing_indicator: DEFAULT_MISSING_STYLE_INDICATOR.to_string(),
        }
    }
}

impl Styles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the indicator prepended by [`Styles::apply`] for unknown names.
    /// An empty indicator makes unknown names pass text through untouched.
    pub fn missing_indicator(mut self, indicator: &str) -> Self {
        self.missing_indicator = indicator.to_string();
        self
    }

    /// Adds (or replaces) a named style.
    pub fn add(mut self, name: &str, style: Style) -> Self {
        self.styles
            .insert(name.to_string(), style.force_styling(true));
        self
    }

    /// Styles `text` if `name` is registered, `None` otherwise.
    pub fn try_apply(&self, name: &str, text: &str) -> Option<String> {
        self.styles
            .get(name)
            .map(|style| style.apply_to(text).to_string())
    }

    /// Styles `text`, falling back to the missing indicator for unknown names.
    pub fn apply(&self, name: &str, text: &str) -> String {
        match self.try_apply(name, text) {
            Some(styled) => styled,
            None => self.with_indicator(text),
        }
    }

    /// Like [`Styles::apply`] but never emits escape sequences.
    pub fn apply_plain(&self, name: &str, text: &str) -> String {
        if self.has(name) {
            text.to_string()
        } else {
            self.with_indicator(text)
        }
    }

    fn with_indicator(&self, text: &str) -> String {
        if self.missing_indicator.is_empty() {
            text.to_string()
        } else {
            format!("{} {}", self.missing_indicator, text)
        }
    }

    pub fn has(&self, name: &str) -> bool {
        self.styles.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// Registered style names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.styles.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// The set of styles a renderer applies through the `style` filter.
#[derive(Clone, Default)]
pub struct Theme {
    styles: Styles,
}

impl Theme {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_styles(styles: Styles) -> Self {
        Self { styles }
    }

    pub fn add(mut self, name: &str, style: Style) -> Self {
        self.styles = self.styles.add(name, style);
        self
    }

    pub fn styles(&self) -> &Styles {
        &self.styles
    }
}

/// Renders a one-off template.
///
/// `use_color = false` produces plain text; unknown style names still get the
/// missing indicator so template typos show up either way.
pub fn render_with_color<T: Serialize>(
    template: &str,
    data: &T,
    theme: &Theme,
    use_color: bool,
) -> Result<String, Error> {
    let mut env = Environment::new();
    register_filters(&mut env, theme.clone(), use_color);
    env.add_template_owned("_inline".to_string(), template.to_string())?;
    env.get_template("_inline")?.render(data)
}

/// A renderer holding pre-compiled named templates.
pub struct Renderer {
    env: Environment<'static>,
}

impl Renderer {
    pub fn with_color(theme: Theme, use_color: bool) -> Self {
        let mut env = Environment::new();
        register_filters(&mut env, theme, use_color);
        Self { env }
    }

    /// Compiles and registers a template under `name`.
    pub fn add_template(&mut self, name: &str, source: &str) -> Result<(), Error> {
        self.env
            .add_template_owned(name.to_string(), source.to_string())
    }

    /// # Errors
    ///
    /// Fails when `name` was never registered or rendering fails.
    pub fn render<T: Serialize>(&self, name: &str, data: &T) -> Result<String, Error> {
        self.env.get_template(name)?.render(data)
    }
}

fn register_filters(env: &mut Environment<'static>, theme: Theme, use_color: bool) {
    let styles = theme.styles.clone();
    env.add_filter("style", move |value: Value, name: String| -> String {
        let text = value.to_string();
        if use_color {
            styles.apply(&name, &text)
        } else {
            styles.apply_plain(&name, &text)
        }
    });
    env.add_filter("pad", |value: Value, width: usize| -> String {
        pad_to_width(&value.to_string(), width)
    });
}

/// Right-pads `text` with spaces up to `width` display columns.
pub fn pad_to_width(text: &str, width: usize) -> String {
    let current = text.width();
    if current >= width {
        return text.to_string();
    }
    format!("{}{}", text, " ".repeat(width - current))
}

/// Converts an RGB triplet to the nearest ANSI 256-color palette index.
pub fn rgb_to_ansi256((r, g, b): (u8, u8, u8)) -> u8 {
    if r == g && g == b {
        if r < 8 {
            16
        } else if r > 248 {
            231
        } else {
            232 + ((r as u16 - 8) * 24 / 247) as u8
        }
    } else {
        let red = (r as u16 * 5 / 255) as u8;
        let green = (g as u16 * 5 / 255) as u8;
        let blue = (b as u16 * 5 / 255) as u8;
        16 + 36 * red + 6 * green + blue
    }
}
