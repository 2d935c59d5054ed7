//! Circuit breaker for the remote market-data provider.
//!
//! Trips on an explicit ban (HTTP 403) or after a run of consecutive
//! failures, then refuses requests until the cooldown has elapsed.
//!
//! The state can be saved to and restored from a small JSON file so a
//! cooldown outlives the process that tripped it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// State of the circuit breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    /// Requests are allowed.
    Closed,
    /// Requests are refused until the cooldown expires.
    Open { tripped_at: Instant },
}

/// Wall-clock form of the breaker state, as written to disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakerRecord {
    /// Requests are refused until this instant; `None` when closed.
    pub open_until: Option<DateTime<Utc>>,
    pub consecutive_failures: u32,
}

#[derive(Debug)]
struct Inner {
    state: BreakerState,
    consecutive_failures: u32,
}

#[derive(Debug)]
pub struct CircuitBreaker {
    inner: Mutex<Inner>,
    cooldown: Duration,
    failure_threshold: u32,
}

impl CircuitBreaker {
    pub fn new(cooldown: Duration, failure_threshold: u32) -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: BreakerState::Closed,
                consecutive_failures: 0,
            }),
            cooldown,
            failure_threshold: failure_threshold.max(1),
        }
    }

    /// 30-minute cooldown, trips after 3 consecutive failures.
    pub fn default_provider() -> Self {
        Self::new(Duration::from_secs(30 * 60), 3)
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // State stays consistent even if a holder panicked.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether a request may go out now. Resets an expired open breaker.
    pub fn is_allowed(&self) -> bool {
        let mut inner = self.lock();
        let state = inner.state;
        match state {
            BreakerState::Closed => true,
            BreakerState::Open { tripped_at } if tripped_at.elapsed() >= self.cooldown => {
                inner.state = BreakerState::Closed;
                inner.consecutive_failures = 0;
                true
            }
            BreakerState::Open { .. } => false,
        }
    }

    pub fn record_success(&self) {
        self.lock().consecutive_failures = 0;
    }

    pub fn record_failure(&self) {
        let mut inner = self.lock();
        inner.consecutive_failures += 1;
        if inner.consecutive_failures >= self.failure_threshold {
            inner.state = BreakerState::Open {
                tripped_at: Instant::now(),
            };
        }
    }

    /// Open immediately, regardless of the failure count.
    pub fn trip(&self) {
        self.lock().state = BreakerState::Open {
            tripped_at: Instant::now(),
        };
    }

    pub fn state(&self) -> BreakerState {
        self.lock().state
    }

    pub fn to_record(&self) -> BreakerRecord {
        let inner = self.lock();
        let open_until = match inner.state {
            BreakerState::Closed => None,
            BreakerState::Open { tripped_at } => {
                let remaining = self.cooldown.saturating_sub(tripped_at.elapsed());
                chrono::Duration::from_std(remaining)
                    .ok()
                    .map(|d| Utc::now() + d)
            }
        };
        BreakerRecord {
            open_until,
            consecutive_failures: inner.consecutive_failures,
        }
    }

    /// Rebuild a breaker from `record`. An expired `open_until` restores closed.
    pub fn from_record(record: &BreakerRecord, cooldown: Duration, failure_threshold: u32) -> Self {
        let breaker = Self::new(cooldown, failure_threshold);
        {
            let mut inner = breaker.lock();
            inner.consecutive_failures = record.consecutive_failures;
            if let Some(open_until) = record.open_until {
                if let Ok(remaining) = (open_until - Utc::now()).to_std() {
                    let elapsed = cooldown.saturating_sub(remaining);
                    // Fall back to "just tripped" when the clock cannot go back that far.
                    let tripped_at = Instant::now().checked_sub(elapsed).unwrap_or_else(Instant::now);
                    inner.state = BreakerState::Open { tripped_at };
                }
            }
        }
        breaker
    }

    /// Load the default-provider breaker from `path`.
    ///
    /// A missing file gives a closed breaker; an unreadable one is logged and
    /// also gives a closed breaker.
    pub fn load_or_default(path: &Path) -> Self {
        let defaults = Self::default_provider();
        let record = match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str::<BreakerRecord>(&content) {
                Ok(record) => record,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "ignoring corrupt breaker state");
                    return defaults;
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => return defaults,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot read breaker state");
                return defaults;
            }
        };
        debug!(path = %path.display(), ?record, "restored breaker state");
        Self::from_record(&record, defaults.cooldown, defaults.failure_threshold)
    }

    /// Write the current state to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.to_record()).map_err(io::Error::other)?;
        std::fs::write(path, json)
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::default_provider()
    }
}
