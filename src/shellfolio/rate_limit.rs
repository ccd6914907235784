//! # Admission control
//!
//! Fixed-window rate limiting keyed by [`ClientIdentity`].
//!
//! Each [`RateLimiter`] owns one profile (window length + request cap) and one
//! key space. The whole read-check-increment sequence of [`RateLimiter::admit_at`]
//! runs under a single lock acquisition, so concurrent requests from the same
//! identity can never both observe `count < max` for the last free slot.
//!
//! Expired entries are logically absent: the next request from that identity
//! opens a new window. They are physically removed by [`RateLimiter::sweep_expired_at`],
//! which a [`Sweeper`] thread runs periodically under the same lock.

use crate::error::{Result, ShellError};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, warn};

pub const HEADER_LIMIT: &str = "X-RateLimit-Limit";
pub const HEADER_REMAINING: &str = "X-RateLimit-Remaining";
pub const HEADER_RESET: &str = "X-RateLimit-Reset";
pub const HEADER_RETRY_AFTER: &str = "Retry-After";

const UNKNOWN_ADDRESS: &str = "unknown";
const AGENT_HASH_LEN: usize = 16;

/// Window length and request cap for one limiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitProfile {
    pub window_ms: u64,
    pub max_requests: u32,
}

impl RateLimitProfile {
    pub fn new(window_ms: u64, max_requests: u32) -> Self {
        Self {
            window_ms,
            max_requests,
        }
    }

    /// General API traffic: 100 requests per 15 minutes.
    pub fn api() -> Self {
        Self::new(15 * 60 * 1000, 100)
    }

    /// Terminal command execution: 30 requests per minute.
    pub fn terminal() -> Self {
        Self::new(60 * 1000, 30)
    }

    fn window(&self) -> ChronoDuration {
        ChronoDuration::milliseconds(i64::try_from(self.window_ms).unwrap_or(i64::MAX))
    }
}

/// The caller key used for rate-limit and audit accounting.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientIdentity {
    address: String,
    agent_hash: String,
}

impl ClientIdentity {
    pub fn new(address: impl Into<String>, agent_hash: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            agent_hash: agent_hash.into(),
        }
    }

    /// Derives an identity from the forwarded-for and user-agent headers.
    ///
    /// Only the first (client-most) forwarded address is used.
    pub fn from_headers(forwarded_for: Option<&str>, user_agent: Option<&str>) -> Self {
        let address = forwarded_for
            .and_then(|h| h.split(',').next())
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .unwrap_or(UNKNOWN_ADDRESS);
        Self::new(address, hash_user_agent(user_agent.unwrap_or_default()))
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn agent_hash(&self) -> &str {
        &self.agent_hash
    }

    pub fn key(&self) -> String {
        format!("{}:{}", self.address, self.agent_hash)
    }
}

impl fmt::Display for ClientIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.address, self.agent_hash)
    }
}

fn hash_user_agent(user_agent: &str) -> String {
    let digest = Sha256::digest(user_agent.as_bytes());
    let mut hex = hex::encode(digest);
    hex.truncate(AGENT_HASH_LEN);
    hex
}

#[derive(Debug, Clone)]
struct RateLimitEntry {
    count: u32,
    window_start: DateTime<Utc>,
    reset_at: DateTime<Utc>,
}

impl RateLimitEntry {
    fn open(now: DateTime<Utc>, window: ChronoDuration) -> Self {
        Self {
            count: 1,
            window_start: now,
            reset_at: now + window,
        }
    }

    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.reset_at <= now
    }
}

/// Result of one admission check, including the response metadata callers
/// must forward to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub limit: u32,
    pub remaining: u32,
    pub reset_at: DateTime<Utc>,
    /// Seconds until the window resets; only set on rejection.
    pub retry_after: Option<u64>,
}

impl RateLimitDecision {
    /// Response headers describing this decision.
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        let mut headers = vec![
            (HEADER_LIMIT, self.limit.to_string()),
            (HEADER_REMAINING, self.remaining.to_string()),
            (HEADER_RESET, self.reset_at.to_rfc3339()),
        ];
        if let Some(secs) = self.retry_after {
            headers.push((HEADER_RETRY_AFTER, secs.to_string()));
        }
        headers
    }

    /// The rejection as an error value, `None` when admitted.
    pub fn rejection(&self) -> Option<ShellError> {
        self.retry_after
            .filter(|_| !self.allowed)
            .map(|retry_after| ShellError::RateLimited { retry_after })
    }
}

/// Fixed-window limiter for one profile.
pub struct RateLimiter {
    name: &'static str,
    profile: RateLimitProfile,
    entries: Mutex<HashMap<String, RateLimitEntry>>,
}

impl RateLimiter {
    pub fn new(name: &'static str, profile: RateLimitProfile) -> Self {
        Self {
            name,
            profile,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn profile(&self) -> RateLimitProfile {
        self.profile
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, RateLimitEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn admit(&self, identity: &ClientIdentity) -> RateLimitDecision {
        self.admit_at(identity, Utc::now())
    }

    pub fn admit_at(&self, identity: &ClientIdentity, now: DateTime<Utc>) -> RateLimitDecision {
        let limit = self.profile.max_requests;
        let key = identity.key();
        let mut entries = self.lock();
        let outcome = match entries.get_mut(&key) {
            Some(entry) if !entry.is_expired(now) => {
                if entry.count >= limit {
                    Err(entry.reset_at)
                } else {
                    entry.count += 1;
                    Ok((entry.count, entry.reset_at))
                }
            }
            _ => {
                let entry = RateLimitEntry::open(now, self.profile.window());
                debug!(
                    limiter = self.name,
                    client = %identity,
                    window_start = %entry.window_start,
                    "opened rate-limit window"
                );
                let admitted = (entry.count, entry.reset_at);
                entries.insert(key, entry);
                Ok(admitted)
            }
        };
        drop(entries);

        match outcome {
            Ok((count, reset_at)) => RateLimitDecision {
                allowed: true,
                limit,
                remaining: limit.saturating_sub(count),
                reset_at,
                retry_after: None,
            },
            Err(reset_at) => {
                let retry_after = retry_after_secs(reset_at, now);
                warn!(
                    limiter = self.name,
                    client = %identity,
                    retry_after_secs = retry_after,
                    "rate limit exceeded"
                );
                RateLimitDecision {
                    allowed: false,
                    limit,
                    remaining: 0,
                    reset_at,
                    retry_after: Some(retry_after),
                }
            }
        }
    }

    /// Removes every entry whose window has ended. Returns how many were removed.
    pub fn sweep_expired_at(&self, now: DateTime<Utc>) -> usize {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, e| !e.is_expired(now));
        let removed = before - entries.len();
        if removed > 0 {
            debug!(limiter = self.name, removed, "swept expired rate-limit entries");
        }
        removed
    }

    /// Number of tracked entries, expired or not.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Requests counted in the identity's live window, if any.
    pub fn count_for(&self, identity: &ClientIdentity, now: DateTime<Utc>) -> Option<u32> {
        self.lock()
            .get(&identity.key())
            .filter(|e| !e.is_expired(now))
            .map(|e| e.count)
    }
}

fn retry_after_secs(reset_at: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    let millis = (reset_at - now).num_milliseconds().max(0) as u64;
    millis.div_ceil(1000).max(1)
}

/// Background thread running a sweep closure every `interval`.
///
/// The thread exits when the sweeper is dropped.
pub struct Sweeper {
    stop: Option<mpsc::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Sweeper {
    pub fn spawn<F>(interval: Duration, sweep: F) -> Result<Self>
    where
        F: Fn() -> usize + Send + 'static,
    {
        let (stop, stopped) = mpsc::channel::<()>();
        let handle = std::thread::Builder::new()
            .name("rate-limit-sweeper".to_string())
            .spawn(move || loop {
                match stopped.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        sweep();
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            })?;
        Ok(Self {
            stop: Some(stop),
            handle: Some(handle),
        })
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        drop(self.stop.take());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn identity(addr: &str) -> ClientIdentity {
        ClientIdentity::from_headers(Some(addr), Some("Mozilla/5.0"))
    }

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn burst_admits_exactly_max_requests() {
        let limiter = RateLimiter::new("terminal", RateLimitProfile::new(60_000, 3));
        let id = identity("10.0.0.1");
        let now = t0();

        let decisions: Vec<_> = (0..6).map(|_| limiter.admit_at(&id, now)).collect();
        let admitted = decisions.iter().filter(|d| d.allowed).count();
        assert_eq!(admitted, 3);
        assert!(decisions[..3].iter().all(|d| d.allowed));
        for rejected in &decisions[3..] {
            assert!(!rejected.allowed);
            assert_eq!(rejected.remaining, 0);
            assert_eq!(rejected.retry_after, Some(60));
        }
        assert_eq!(limiter.count_for(&id, now), Some(3));
    }

    #[test]
    fn remaining_counts_down() {
        let limiter = RateLimiter::new("api", RateLimitProfile::new(1_000, 3));
        let id = identity("10.0.0.1");
        let remaining: Vec<_> = (0..3)
            .map(|_| limiter.admit_at(&id, t0()).remaining)
            .collect();
        assert_eq!(remaining, vec![2, 1, 0]);
    }

    #[test]
    fn retry_after_rounds_up_and_is_positive() {
        let limiter = RateLimiter::new("api", RateLimitProfile::new(10_000, 1));
        let id = identity("10.0.0.1");
        limiter.admit_at(&id, t0());

        let later = t0() + ChronoDuration::milliseconds(8_500);
        assert_eq!(limiter.admit_at(&id, later).retry_after, Some(2));

        let almost = t0() + ChronoDuration::milliseconds(9_999);
        assert_eq!(limiter.admit_at(&id, almost).retry_after, Some(1));
    }

    #[test]
    fn new_window_resets_count() {
        let limiter = RateLimiter::new("terminal", RateLimitProfile::new(1_000, 2));
        let id = identity("10.0.0.1");
        limiter.admit_at(&id, t0());
        limiter.admit_at(&id, t0());
        assert!(!limiter.admit_at(&id, t0()).allowed);

        let after = t0() + ChronoDuration::milliseconds(1_000);
        let decision = limiter.admit_at(&id, after);
        assert!(decision.allowed);
        assert_eq!(limiter.count_for(&id, after), Some(1));
        assert_eq!(decision.reset_at, after + ChronoDuration::milliseconds(1_000));
    }

    #[test]
    fn identities_are_independent() {
        let limiter = RateLimiter::new("terminal", RateLimitProfile::new(1_000, 1));
        assert!(limiter.admit_at(&identity("10.0.0.1"), t0()).allowed);
        assert!(limiter.admit_at(&identity("10.0.0.2"), t0()).allowed);
        assert!(!limiter.admit_at(&identity("10.0.0.1"), t0()).allowed);
    }

    #[test]
    fn user_agent_is_part_of_identity() {
        let a = ClientIdentity::from_headers(Some("1.2.3.4"), Some("curl/8"));
        let b = ClientIdentity::from_headers(Some("1.2.3.4"), Some("Firefox"));
        assert_ne!(a.key(), b.key());
        assert_eq!(a.agent_hash().len(), AGENT_HASH_LEN);
    }

    #[test]
    fn forwarded_for_uses_first_hop() {
        let id = ClientIdentity::from_headers(Some(" 203.0.113.9 , 10.0.0.1"), None);
        assert_eq!(id.address(), "203.0.113.9");
        let missing = ClientIdentity::from_headers(None, None);
        assert_eq!(missing.address(), "unknown");
    }

    #[test]
    fn sweep_removes_only_expired_entries() {
        let limiter = RateLimiter::new("api", RateLimitProfile::new(1_000, 5));
        limiter.admit_at(&identity("10.0.0.1"), t0());
        limiter.admit_at(&identity("10.0.0.2"), t0() + ChronoDuration::milliseconds(900));
        assert_eq!(limiter.len(), 2);

        let removed = limiter.sweep_expired_at(t0() + ChronoDuration::milliseconds(1_000));
        assert_eq!(removed, 1);
        assert_eq!(limiter.len(), 1);
    }

    #[test]
    fn headers_include_retry_after_only_on_rejection() {
        let limiter = RateLimiter::new("api", RateLimitProfile::new(5_000, 1));
        let id = identity("10.0.0.1");

        let ok = limiter.admit_at(&id, t0());
        let names: Vec<_> = ok.headers().iter().map(|(k, _)| *k).collect();
        assert_eq!(names, vec![HEADER_LIMIT, HEADER_REMAINING, HEADER_RESET]);
        assert!(ok.rejection().is_none());

        let rejected = limiter.admit_at(&id, t0());
        let headers = rejected.headers();
        assert!(headers.contains(&(HEADER_RETRY_AFTER, "5".to_string())));
        assert!(headers.contains(&(HEADER_REMAINING, "0".to_string())));
        assert!(matches!(
            rejected.rejection(),
            Some(ShellError::RateLimited { retry_after: 5 })
        ));
    }

    #[test]
    fn concurrent_burst_never_over_admits() {
        let limiter = Arc::new(RateLimiter::new("terminal", RateLimitProfile::new(60_000, 50)));
        let admitted = Arc::new(AtomicUsize::new(0));
        let now = t0();

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                let admitted = Arc::clone(&admitted);
                std::thread::spawn(move || {
                    let id = identity("10.0.0.1");
                    for _ in 0..10 {
                        if limiter.admit_at(&id, now).allowed {
                            admitted.fetch_add(1, Ordering::SeqCst);
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(admitted.load(Ordering::SeqCst), 50);
        assert_eq!(limiter.count_for(&identity("10.0.0.1"), now), Some(50));
    }

    #[test]
    fn sweeper_runs_in_background_and_stops_on_drop() {
        let limiter = Arc::new(RateLimiter::new("api", RateLimitProfile::new(1, 5)));
        let past = Utc::now() - ChronoDuration::seconds(10);
        limiter.admit_at(&identity("10.0.0.1"), past);
        limiter.admit_at(&identity("10.0.0.2"), past);

        let sweeps = Arc::new(AtomicUsize::new(0));
        let sweeper = {
            let limiter = Arc::clone(&limiter);
            let sweeps = Arc::clone(&sweeps);
            Sweeper::spawn(Duration::from_millis(10), move || {
                sweeps.fetch_add(1, Ordering::SeqCst);
                limiter.sweep_expired_at(Utc::now())
            })
            .unwrap()
        };

        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while !limiter.is_empty() && std::time::Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
        assert!(limiter.is_empty());

        drop(sweeper);
        let after_drop = sweeps.load(Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(sweeps.load(Ordering::SeqCst), after_drop);
    }
}
