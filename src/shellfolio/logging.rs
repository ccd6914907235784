//! Logging initialization.
//!
//! Every log line goes to stderr so command output on stdout stays clean.

use std::io;
use std::sync::Once;
use tracing_subscriber::{util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "shellfolio=info";
const VERBOSE_FILTER: &str = "shellfolio=debug";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Human-readable output
    Development,
    /// JSON structured output
    Production,
    /// Registry without any layer; events are discarded
    Test,
}

static INIT_ONCE: Once = Once::new();

fn filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER })
    })
}

/// Installs the global subscriber for `profile`. Only the first call has any
/// effect. `RUST_LOG` overrides the level in every profile.
pub fn init(profile: Profile, verbose: bool) {
    INIT_ONCE.call_once(|| {
        let installed = match profile {
            Profile::Development => tracing_subscriber::fmt()
                .with_writer(io::stderr)
                .with_target(false)
                .with_env_filter(filter(verbose))
                .finish()
                .try_init(),
            Profile::Production => tracing_subscriber::fmt()
                .json()
                .with_writer(io::stderr)
                .with_env_filter(filter(verbose))
                .finish()
                .try_init(),
            Profile::Test => tracing_subscriber::registry().try_init(),
        };
        // Another subscriber (e.g. a test harness) already owns the global slot.
        let _ = installed;
    });
}
