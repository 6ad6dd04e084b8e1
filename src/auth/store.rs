//! Injected clock and token storage.
//!
//! The login gate never reads wall-clock time or ambient storage
//! directly; it goes through these seams so tests can advance time by
//! hand and inspect stored state.

use std::sync::Mutex;

use chrono::{DateTime, TimeDelta, Utc};

// ═══════════════════════════════════════════
// Clock
// ═══════════════════════════════════════════

/// Time source for expiry and lockout decisions.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually advanced clock for deterministic tests.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Start at an arbitrary fixed instant.
    pub fn fixed() -> Self {
        Self::new(DateTime::from_timestamp(1_750_000_000, 0).expect("valid timestamp"))
    }

    pub fn advance(&self, delta: TimeDelta) {
        let mut now = self.now.lock().expect("clock lock");
        *now += delta;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock lock")
    }
}

// ═══════════════════════════════════════════
// Token storage
// ═══════════════════════════════════════════

/// Storage slot for the encrypted session token.
pub trait TokenStore: Send + Sync {
    fn save(&self, encrypted: &str);
    fn load(&self) -> Option<String>;
    fn clear(&self);
}

/// In-memory slot. The session does not survive a restart, which matches
/// the ephemeral nature of the gate.
pub struct MemoryTokenStore {
    slot: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }
}

impl Default for MemoryTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenStore for MemoryTokenStore {
    fn save(&self, encrypted: &str) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = Some(encrypted.to_string());
        }
    }

    fn load(&self) -> Option<String> {
        self.slot.lock().ok()?.clone()
    }

    fn clear(&self) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = None;
        }
    }
}
