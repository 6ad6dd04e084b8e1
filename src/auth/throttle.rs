//! Login attempt throttling.
//!
//! Per-source failure counters with a fixed block window: five failures
//! lock the source out for fifteen minutes. Counters reset on success or
//! once the block expires. Time comes from the injected clock.

use std::collections::HashMap;

use chrono::{DateTime, TimeDelta, Utc};

use super::store::Clock;

/// Failures allowed before a source is blocked.
pub const MAX_LOGIN_ATTEMPTS: u32 = 5;

/// Block window after the limit is reached.
pub const BLOCK_DURATION_MINUTES: i64 = 15;

struct AttemptRecord {
    count: u32,
    last_attempt: DateTime<Utc>,
}

/// Per-source login attempt tracking.
pub struct LoginThrottle {
    attempts: HashMap<String, AttemptRecord>,
}

impl LoginThrottle {
    pub fn new() -> Self {
        Self {
            attempts: HashMap::new(),
        }
    }

    /// Whether `source` may attempt a login now. `Err(minutes)` carries
    /// the minutes remaining on an active block; an expired block resets
    /// the counter and admits the attempt.
    pub fn check(&mut self, source: &str, clock: &dyn Clock) -> Result<(), i64> {
        let Some(record) = self.attempts.get(source) else {
            return Ok(());
        };
        if record.count < MAX_LOGIN_ATTEMPTS {
            return Ok(());
        }

        let elapsed = clock.now() - record.last_attempt;
        let block = TimeDelta::minutes(BLOCK_DURATION_MINUTES);
        if elapsed < block {
            let remaining = block - elapsed;
            // Ceil to whole minutes for the user-facing message.
            return Err((remaining.num_seconds() + 59) / 60);
        }

        self.attempts.remove(source);
        Ok(())
    }

    /// Record a failed attempt; returns attempts remaining before block.
    pub fn record_failure(&mut self, source: &str, clock: &dyn Clock) -> u32 {
        let now = clock.now();
        let record = self.attempts.entry(source.to_string()).or_insert(AttemptRecord {
            count: 0,
            last_attempt: now,
        });
        record.count += 1;
        record.last_attempt = now;
        MAX_LOGIN_ATTEMPTS.saturating_sub(record.count)
    }

    /// Reset a source after a successful login.
    pub fn clear(&mut self, source: &str) {
        self.attempts.remove(source);
    }
}

impl Default for LoginThrottle {
    fn default() -> Self {
        Self::new()
    }
}
