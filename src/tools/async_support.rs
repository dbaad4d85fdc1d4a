// src/tools/async_support.rs
//! Async helpers: an injectable clock and the bounded poll-until loop.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt::Display;
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, warn};

/// Source of time and sleeps.
///
/// Runners and pollers only suspend through this trait so tests can run
/// through settle delays and poll intervals without waiting.
#[async_trait]
pub trait Clock: Send + Sync {
    /// Suspend the current task for `duration`.
    async fn sleep(&self, duration: Duration);

    /// Wall-clock time used for salts and timeout timestamps.
    fn now(&self) -> DateTime<Utc>;
}

/// Clock backed by tokio timers and the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that never blocks. Each sleep is recorded and advances `now`.
#[derive(Debug)]
pub struct ManualClock {
    state: Mutex<ManualState>,
}

#[derive(Debug)]
struct ManualState {
    now: DateTime<Utc>,
    sleeps: Vec<Duration>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self { state: Mutex::new(ManualState { now: start, sleeps: Vec::new() }) }
    }

    /// Durations passed to `sleep`, in call order.
    pub fn sleeps(&self) -> Vec<Duration> {
        self.state.lock().map(|s| s.sleeps.clone()).unwrap_or_default()
    }

    pub fn advance(&self, duration: Duration) {
        if let Ok(mut state) = self.state.lock() {
            state.now += chrono::Duration::from_std(duration).unwrap_or_else(|_| chrono::Duration::zero());
        }
    }
}

#[async_trait]
impl Clock for ManualClock {
    async fn sleep(&self, duration: Duration) {
        if let Ok(mut state) = self.state.lock() {
            state.sleeps.push(duration);
            state.now += chrono::Duration::from_std(duration).unwrap_or_else(|_| chrono::Duration::zero());
        }
    }

    fn now(&self) -> DateTime<Utc> {
        self.state.lock().map(|s| s.now).unwrap_or_else(|_| Utc::now())
    }
}

/// Attempt budget and spacing for [`poll_until`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl PollPolicy {
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 50;
    pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(5000);

    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self { max_attempts, interval }
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_ATTEMPTS, Self::DEFAULT_INTERVAL)
    }
}

/// Terminal state of a poll loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<T> {
    /// The probe produced a value on attempt `attempt` (1-based).
    Found { value: T, attempt: u32 },
    /// Every attempt came back empty or failed.
    Exhausted { attempts: u32 },
}

impl<T> PollOutcome<T> {
    pub fn found(self) -> Option<T> {
        match self {
            PollOutcome::Found { value, .. } => Some(value),
            PollOutcome::Exhausted { .. } => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, PollOutcome::Found { .. })
    }
}

/// Run `probe` until it yields `Some`, at most `policy.max_attempts` times.
///
/// Probe errors are logged and count as an empty attempt. The loop sleeps
/// `policy.interval` between attempts but not after the last one.
pub async fn poll_until<C, F, Fut, T, E>(
    clock: &C,
    policy: &PollPolicy,
    label: &str,
    mut probe: F,
) -> PollOutcome<T>
where
    C: Clock + ?Sized,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Option<T>, E>>,
    E: Display,
{
    for attempt in 1..=policy.max_attempts {
        match probe(attempt).await {
            Ok(Some(value)) => return PollOutcome::Found { value, attempt },
            Ok(None) => {
                debug!(operation = label, attempt, max = policy.max_attempts, "Nothing yet");
            }
            Err(e) => {
                warn!(operation = label, attempt, max = policy.max_attempts, "Poll attempt failed: {}", e);
            }
        }
        if attempt < policy.max_attempts {
            clock.sleep(policy.interval).await;
        }
    }

    PollOutcome::Exhausted { attempts: policy.max_attempts }
}
