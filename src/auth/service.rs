//! The login gate.
//!
//! `login` checks the throttle, compares the configured credential pair in
//! constant time, then issues a signed token: the plaintext goes back to
//! the client as its bearer credential, the sealed copy goes to the token
//! store as the server-side session. `logout` destroys the stored session;
//! a bearer token is accepted only while its session exists, its signature
//! matches, and its expiry has not elapsed.

use std::sync::{Arc, Mutex};

use subtle::ConstantTimeEq;

use super::store::{Clock, TokenStore};
use super::throttle::LoginThrottle;
use super::token::{TokenClaims, TokenSigner};
use super::AuthError;

pub struct AuthService {
    signer: TokenSigner,
    username: String,
    password: String,
    clock: Arc<dyn Clock>,
    store: Arc<dyn TokenStore>,
    throttle: Mutex<LoginThrottle>,
}

impl AuthService {
    pub fn new(
        secret: &str,
        username: &str,
        password: &str,
        clock: Arc<dyn Clock>,
        store: Arc<dyn TokenStore>,
    ) -> Self {
        Self {
            signer: TokenSigner::new(secret),
            username: username.to_string(),
            password: password.to_string(),
            clock,
            store,
            throttle: Mutex::new(LoginThrottle::new()),
        }
    }

    /// Attempt a login from `source`. On success returns the bearer token
    /// and stores the sealed session copy.
    pub fn login(&self, source: &str, username: &str, password: &str) -> Result<String, AuthError> {
        {
            let mut throttle = self.throttle.lock().map_err(|_| AuthError::LockPoisoned)?;
            if let Err(minutes) = throttle.check(source, self.clock.as_ref()) {
                return Err(AuthError::Blocked { minutes });
            }
        }

        if !self.credentials_match(username, password) {
            let remaining = self
                .throttle
                .lock()
                .map_err(|_| AuthError::LockPoisoned)?
                .record_failure(source, self.clock.as_ref());
            tracing::warn!(source, remaining, "Failed login attempt");
            return Err(AuthError::InvalidCredentials { remaining });
        }

        self.throttle
            .lock()
            .map_err(|_| AuthError::LockPoisoned)?
            .clear(source);

        let token = self.signer.issue(username, self.clock.as_ref());
        let sealed = self.signer.encrypt(&token)?;
        self.store.save(&sealed);
        tracing::info!(source, "Login succeeded");
        Ok(token)
    }

    /// Destroy the stored session. Outstanding bearer tokens stop being
    /// accepted immediately.
    pub fn logout(&self) {
        self.store.clear();
        tracing::info!("Session cleared");
    }

    /// Whether a decryptable, signature-valid, unexpired session is
    /// currently stored.
    pub fn is_authenticated(&self) -> bool {
        let Some(sealed) = self.store.load() else {
            return false;
        };
        let Ok(token) = self.signer.decrypt(&sealed) else {
            return false;
        };
        self.signer.verify(&token, self.clock.as_ref()).is_ok()
    }

    /// Validate a bearer token presented by a client: signature, expiry,
    /// and match against the stored session.
    pub fn verify_bearer(&self, token: &str) -> Result<TokenClaims, AuthError> {
        let claims = self.signer.verify(token, self.clock.as_ref())?;

        let sealed = self.store.load().ok_or(AuthError::TokenInvalid)?;
        let stored = self.signer.decrypt(&sealed)?;
        if !bool::from(stored.as_bytes().ct_eq(token.as_bytes())) {
            return Err(AuthError::TokenInvalid);
        }

        Ok(claims)
    }

    fn credentials_match(&self, username: &str, password: &str) -> bool {
        // Both comparisons always run; no early exit on the first miss.
        let user_ok = username.as_bytes().ct_eq(self.username.as_bytes());
        let pass_ok = password.as_bytes().ct_eq(self.password.as_bytes());
        bool::from(user_ok & pass_ok)
    }
}
