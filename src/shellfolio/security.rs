//! Security event recording.
//!
//! Events are observational: they are logged through `tracing` and kept in a
//! bounded ring buffer, but nothing in command dispatch reads them back.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::warn;

pub const DEFAULT_CAPACITY: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityEventKind {
    SuspiciousCommand,
    RateLimitExceeded,
    InvalidInput,
}

impl fmt::Display for SecurityEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SecurityEventKind::SuspiciousCommand => "suspicious_command",
            SecurityEventKind::RateLimitExceeded => "rate_limit_exceeded",
            SecurityEventKind::InvalidInput => "invalid_input",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecurityEvent {
    pub kind: SecurityEventKind,
    pub client_id: String,
    pub timestamp: DateTime<Utc>,
    pub details: String,
}

impl SecurityEvent {
    pub fn new(kind: SecurityEventKind, client_id: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            kind,
            client_id: client_id.into(),
            timestamp: Utc::now(),
            details: details.into(),
        }
    }
}

/// Bounded, thread-safe event buffer. The oldest event is evicted first.
pub struct SecurityLog {
    events: Mutex<VecDeque<SecurityEvent>>,
    capacity: usize,
}

impl Default for SecurityLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl SecurityLog {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<SecurityEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends an event, trimming the buffer in the same critical section.
    pub fn record(&self, event: SecurityEvent) {
        warn!(
            kind = %event.kind,
            client = %event.client_id,
            details = %event.details,
            "security event"
        );
        let mut events = self.lock();
        events.push_back(event);
        while events.len() > self.capacity {
            events.pop_front();
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Copy of the buffered events, oldest first.
    pub fn snapshot(&self) -> Vec<SecurityEvent> {
        self.lock().iter().cloned().collect()
    }
}

struct DangerousPattern {
    label: &'static str,
    pattern: Regex,
}

static DANGEROUS_PATTERNS: Lazy<Vec<DangerousPattern>> = Lazy::new(|| {
    [
        ("pipe to shell", r"\|\s*(?:ba|z|k|da)?sh\b"),
        ("pipe to interpreter", r"\|\s*(?:python[0-9.]*|perl|ruby|node|php)\b"),
        ("eval call", r"(?i)\beval\s*\("),
        ("exec call", r"(?i)\bexec\s*\("),
        ("system call", r"(?i)\bsystem\s*\("),
        ("command substitution", r"\$\("),
        ("recursive delete", r"\brm\s+-[a-zA-Z]*r[a-zA-Z]*f|\brm\s+-[a-zA-Z]*f[a-zA-Z]*r"),
        ("script injection", r"(?i)<\s*script|javascript:"),
    ]
    .into_iter()
    .filter_map(|(label, source)| {
        Regex::new(source)
            .ok()
            .map(|pattern| DangerousPattern { label, pattern })
    })
    .collect()
});

/// Labels of every dangerous pattern found in `raw`.
pub fn scan_dangerous(raw: &str) -> Vec<&'static str> {
    DANGEROUS_PATTERNS
        .iter()
        .filter(|p| p.pattern.is_match(raw))
        .map(|p| p.label)
        .collect()
}
