//! # Project store
//!
//! Projects live in an external table the engine only reads. The
//! [`ProjectStore`] trait is the seam:
//!
//! - [`memory::MemoryStore`]: a fixed list, also the base of the test fixtures
//! - [`json::JsonProjectStore`]: a JSON array of project rows on disk
//!
//! Reads go through [`fetch_projects`], which runs the store on a worker
//! thread and gives up after a timeout. A slow store therefore surfaces as
//! [`ShellError::StoreTimeout`] rather than hanging the command, and callers
//! can tell it apart from a store that simply has no projects.

use crate::error::{Result, ShellError};
use crate::model::ProjectRecord;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

pub mod json;
pub mod memory;

pub trait ProjectStore: Send + Sync {
    /// All projects, in no particular order.
    fn list_projects(&self) -> Result<Vec<ProjectRecord>>;
}

/// Reads every project, newest first, waiting at most `timeout`.
///
/// On timeout the worker thread is left to finish on its own; its result is
/// discarded.
pub fn fetch_projects(store: &Arc<dyn ProjectStore>, timeout: Duration) -> Result<Vec<ProjectRecord>> {
    let (tx, rx) = mpsc::channel();
    let worker_store = Arc::clone(store);
    std::thread::Builder::new()
        .name("project-store-read".to_string())
        .spawn(move || {
            let _ = tx.send(worker_store.list_projects());
        })?;

    let mut projects = match rx.recv_timeout(timeout) {
        Ok(result) => result?,
        Err(RecvTimeoutError::Timeout) => {
            warn!(timeout_ms = timeout.as_millis() as u64, "project store read timed out");
            return Err(ShellError::StoreTimeout(timeout));
        }
        Err(RecvTimeoutError::Disconnected) => {
            return Err(ShellError::Store("project store worker stopped".to_string()));
        }
    };
    projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(projects)
}
