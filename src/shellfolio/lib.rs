//! # Shellfolio Architecture
//!
//! Shellfolio is a **server-driven terminal command engine**. A remote console
//! sends raw command text; the engine decides what the text means and returns
//! the text to print. It is a library first: the bundled binary is a thin host
//! for local use, and the same [`Shell`] could sit behind an HTTP route.
//!
//! ## Request Pipeline
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Admission (rate_limit.rs, state.rs)                        │
//! │  - Fixed-window limiter per caller identity                 │
//! │  - Rejections short-circuit with rate-limit metadata        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Sanitizing & Screening (sanitize.rs, security.rs)          │
//! │  - Strips markup, metacharacters and control characters     │
//! │  - Records suspicious input; never blocks it                │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Dispatch (dispatch.rs, catalog/)                           │
//! │  - Case-insensitive catalog lookup                          │
//! │  - Built-in handler or response template                    │
//! └─────────────────────────────────────────────────────────────┘
//!                  │                              │
//!                  ▼                              ▼
//! ┌──────────────────────────────┐ ┌────────────────────────────┐
//! │  Built-ins (builtins/)       │ │  Templates (template/)     │
//! │  help, projects, clear       │ │  {{var}} {{ns.fn("x")}}    │
//! │  listing.rs + store/         │ │  {{handler(args[N])}}      │
//! └──────────────────────────────┘ └────────────────────────────┘
//! ```
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! Everything reachable from [`Shell`] takes Rust values and returns Rust
//! values. Nothing writes to stdout or exits the process; output that should
//! clear the screen is the [`model::CLEAR_SENTINEL`] string and the front-end
//! decides what to do with it. Styling is emitted as ANSI escapes only when
//! the config asks for color, because the console consuming the output is not
//! the process's own terminal.
//!
//! ## Shared State
//!
//! Both limiters and the security event buffer live in one [`ShellState`],
//! built once and shared behind an `Arc`. Each limiter runs check-and-update
//! under a single lock; a background sweeper drops expired windows.
//!
//! ## Module Overview
//!
//! - [`sanitize`]: input cleaning and validation predicates
//! - [`rate_limit`]: limiter, identities, decision headers and the sweeper
//! - [`security`]: security event ring buffer and dangerous-pattern scan
//! - [`listing`]: argument parsing, filtering and pagination for listings
//! - [`template`]: the response template language
//! - [`catalog`], [`store`]: read-only data sources behind traits
//! - [`builtins`]: `help`, `projects`, `clear`
//! - [`dispatch`]: [`Shell`], the entry point
//! - [`config`], [`logging`], [`error`]: ambient plumbing

pub mod builtins;
pub mod catalog;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod listing;
pub mod logging;
pub mod model;
pub mod rate_limit;
pub mod sanitize;
pub mod security;
pub mod state;
pub mod store;
pub mod template;

pub use config::ShellConfig;
pub use dispatch::{CommandRequest, Outcome, Shell};
pub use error::{Result, ShellError};
pub use model::CommandResponse;
pub use rate_limit::ClientIdentity;
pub use state::ShellState;
