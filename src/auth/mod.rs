//! Authentication side-channel: a local login gate, not an identity system.
//!
//! One configured credential pair, a signed time-boxed session token kept
//! encrypted at rest, and attempt throttling. Clock and storage are
//! injected so every expiry and lockout path is testable without real
//! timers or real storage.

pub mod service;
pub mod store;
pub mod throttle;
pub mod token;

pub use service::AuthService;
pub use store::{Clock, ManualClock, MemoryTokenStore, SystemClock, TokenStore};
pub use throttle::{LoginThrottle, BLOCK_DURATION_MINUTES, MAX_LOGIN_ATTEMPTS};
pub use token::{TokenClaims, TokenSigner, TOKEN_TTL_HOURS};

/// Errors from the login gate.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials. {remaining} attempts remaining.")]
    InvalidCredentials { remaining: u32 },
    #[error("Too many attempts. Try again in {minutes} minutes.")]
    Blocked { minutes: i64 },
    #[error("Session token is invalid")]
    TokenInvalid,
    #[error("Session token has expired")]
    TokenExpired,
    #[error("Token encryption failed")]
    Crypto,
    #[error("Internal lock error")]
    LockPoisoned,
}
