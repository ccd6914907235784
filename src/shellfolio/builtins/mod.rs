//! # Built-in commands
//!
//! Catalog rows named `help`, `projects` or `clear` are bound to code here
//! instead of a response template:
//!
//! - `help`: the active catalog, grouped by category
//! - `projects`: the filtered, paginated project listing
//! - `clear`: the clear-screen sentinel, interpreted by the front-end
//!
//! Output is rendered through minijinja templates in `templates/`, compiled
//! once into a [`BuiltinRenderer`].

use crate::catalog::Catalog;
use crate::error::Result;
use crate::model::{BuiltinHandler, CommandResponse, CLEAR_SENTINEL};
use crate::store::ProjectStore;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

pub mod help;
pub mod projects;
pub mod render;

pub use projects::STORE_FAILURE_MESSAGE;
pub use render::BuiltinRenderer;

/// One call of a built-in.
pub struct Invocation<'a> {
    /// Name the command was invoked as; listing hints start with it.
    pub command: &'a str,
    pub args: &'a [String],
    pub default_page_size: usize,
    /// Upper bound on project store reads.
    pub timeout: Duration,
    pub now: DateTime<Utc>,
}

/// Everything a built-in may read.
pub struct BuiltinEnv<'a> {
    pub catalog: &'a Catalog,
    pub store: &'a Arc<dyn ProjectStore>,
    pub renderer: &'a BuiltinRenderer,
}

pub fn run(handler: BuiltinHandler, env: &BuiltinEnv, invocation: &Invocation) -> Result<CommandResponse> {
    match handler {
        BuiltinHandler::Help => help::run(env.catalog, invocation.args, env.renderer),
        BuiltinHandler::Projects => projects::run(env.store, invocation, env.renderer),
        BuiltinHandler::Clear => Ok(CommandResponse::ok(CLEAR_SENTINEL)),
    }
}
