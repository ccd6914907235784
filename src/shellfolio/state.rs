use crate::config::ShellConfig;
use crate::error::Result;
use crate::rate_limit::{RateLimiter, Sweeper};
use crate::security::SecurityLog;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

/// Admission state shared by every request: both limiters and the security
/// event buffer. Built once and handed around behind an `Arc`.
pub struct ShellState {
    api: Arc<RateLimiter>,
    terminal: Arc<RateLimiter>,
    security: SecurityLog,
    started_at: Instant,
    sweeper: Option<Sweeper>,
}

impl ShellState {
    /// State without a background sweeper; expired entries are only replaced
    /// lazily or by [`ShellState::sweep_expired_at`].
    pub fn new(config: &ShellConfig) -> Self {
        Self {
            api: Arc::new(RateLimiter::new("api", config.api_rate_limit)),
            terminal: Arc::new(RateLimiter::new("terminal", config.terminal_rate_limit)),
            security: SecurityLog::with_capacity(config.security_log_capacity),
            started_at: Instant::now(),
            sweeper: None,
        }
    }

    /// State with a sweeper thread that stops when the state is dropped.
    pub fn with_sweeper(config: &ShellConfig) -> Result<Self> {
        let mut state = Self::new(config);
        let api = Arc::clone(&state.api);
        let terminal = Arc::clone(&state.terminal);
        let interval = config.sweep_interval();
        state.sweeper = Some(Sweeper::spawn(interval, move || {
            let now = Utc::now();
            api.sweep_expired_at(now) + terminal.sweep_expired_at(now)
        })?);
        info!(interval_secs = interval.as_secs(), "rate-limit sweeper started");
        Ok(state)
    }

    pub fn api_limiter(&self) -> &RateLimiter {
        &self.api
    }

    pub fn terminal_limiter(&self) -> &RateLimiter {
        &self.terminal
    }

    pub fn security(&self) -> &SecurityLog {
        &self.security
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    pub fn has_sweeper(&self) -> bool {
        self.sweeper.is_some()
    }

    /// Runs one sweep of both limiters.
    pub fn sweep_expired_at(&self, now: DateTime<Utc>) -> usize {
        self.api.sweep_expired_at(now) + self.terminal.sweep_expired_at(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate_limit::{ClientIdentity, RateLimitProfile};
    use chrono::Duration as ChronoDuration;

    #[test]
    fn limiters_have_separate_key_spaces() {
        let config = ShellConfig {
            api_rate_limit: RateLimitProfile::new(60_000, 1),
            terminal_rate_limit: RateLimitProfile::new(60_000, 1),
            ..ShellConfig::default()
        };
        let state = ShellState::new(&config);
        let who = ClientIdentity::new("10.0.0.1", "abc");
        let now = Utc::now();

        assert!(state.api_limiter().admit_at(&who, now).allowed);
        assert!(state.terminal_limiter().admit_at(&who, now).allowed);
        assert!(!state.api_limiter().admit_at(&who, now).allowed);
        assert!(!state.terminal_limiter().admit_at(&who, now).allowed);
    }

    #[test]
    fn sweep_covers_both_limiters() {
        let state = ShellState::new(&ShellConfig::default());
        let who = ClientIdentity::new("10.0.0.2", "abc");
        let now = Utc::now();
        state.api_limiter().admit_at(&who, now);
        state.terminal_limiter().admit_at(&who, now);

        assert_eq!(state.sweep_expired_at(now + ChronoDuration::minutes(16)), 2);
        assert!(state.api_limiter().is_empty());
        assert!(state.terminal_limiter().is_empty());
    }

    #[test]
    fn sweeper_thread_starts_and_stops() {
        let state = ShellState::with_sweeper(&ShellConfig::default()).unwrap();
        assert!(state.has_sweeper());
        assert_eq!(state.security().capacity(), 1000);
        drop(state);
    }
}
