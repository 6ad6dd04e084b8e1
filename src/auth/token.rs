//! Session token: issue, verify, and at-rest encryption.
//!
//! The token is three base64url segments, `header.payload.signature`,
//! with an HMAC-SHA256 signature over the first two. A token is valid
//! only if the signature matches and the expiry has not elapsed. Before
//! storage the whole token is sealed with AES-256-GCM under a key derived
//! from the configured secret; the stored form is
//! `base64(nonce ‖ ciphertext)`.

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use super::store::Clock;
use super::AuthError;

type HmacSha256 = Hmac<Sha256>;

/// Token lifetime: 8 hours.
pub const TOKEN_TTL_HOURS: i64 = 8;

const NONCE_LENGTH: usize = 12;

#[derive(Debug, Serialize, Deserialize)]
struct TokenHeader {
    alg: String,
    typ: String,
}

impl TokenHeader {
    fn hs256() -> Self {
        Self {
            alg: "HS256".to_string(),
            typ: "JWT".to_string(),
        }
    }
}

/// Signed claims: subject, issued-at, expiry (unix seconds).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Signs, verifies, and seals session tokens. Key material is zeroed on
/// drop.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct TokenSigner {
    secret: Vec<u8>,
    cipher_key: [u8; 32],
}

impl TokenSigner {
    pub fn new(secret: &str) -> Self {
        let cipher_key: [u8; 32] = Sha256::digest(secret.as_bytes()).into();
        Self {
            secret: secret.as_bytes().to_vec(),
            cipher_key,
        }
    }

    /// Issue a signed token for `subject`, expiring `TOKEN_TTL_HOURS`
    /// from the clock's now.
    pub fn issue(&self, subject: &str, clock: &dyn Clock) -> String {
        let now = clock.now().timestamp();
        let claims = TokenClaims {
            sub: subject.to_string(),
            iat: now,
            exp: now + TOKEN_TTL_HOURS * 3600,
        };

        let header_b64 = URL_SAFE_NO_PAD
            .encode(serde_json::to_vec(&TokenHeader::hs256()).expect("token header serializes"));
        let claims_b64 =
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).expect("token claims serialize"));
        let signing_input = format!("{header_b64}.{claims_b64}");
        let signature = URL_SAFE_NO_PAD.encode(self.sign(signing_input.as_bytes()));

        format!("{signing_input}.{signature}")
    }

    /// Verify signature then expiry. Returns the claims on success.
    pub fn verify(&self, token: &str, clock: &dyn Clock) -> Result<TokenClaims, AuthError> {
        let mut segments = token.split('.');
        let (Some(header), Some(payload), Some(signature), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(AuthError::TokenInvalid);
        };

        let provided = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| AuthError::TokenInvalid)?;
        let expected = self.sign(format!("{header}.{payload}").as_bytes());
        if !bool::from(expected.as_slice().ct_eq(&provided)) {
            return Err(AuthError::TokenInvalid);
        }

        let claims_bytes = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| AuthError::TokenInvalid)?;
        let claims: TokenClaims =
            serde_json::from_slice(&claims_bytes).map_err(|_| AuthError::TokenInvalid)?;

        if claims.exp <= clock.now().timestamp() {
            return Err(AuthError::TokenExpired);
        }

        Ok(claims)
    }

    /// Seal a token for storage: `base64(nonce ‖ ciphertext)` with a
    /// fresh random nonce per call.
    pub fn encrypt(&self, token: &str) -> Result<String, AuthError> {
        let key = Key::<Aes256Gcm>::from_slice(&self.cipher_key);
        let cipher = Aes256Gcm::new(key);

        let mut nonce_bytes = [0u8; NONCE_LENGTH];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, token.as_bytes())
            .map_err(|_| AuthError::Crypto)?;

        let mut sealed = Vec::with_capacity(NONCE_LENGTH + ciphertext.len());
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend_from_slice(&ciphertext);
        Ok(STANDARD.encode(sealed))
    }

    /// Open a stored token.
    pub fn decrypt(&self, stored: &str) -> Result<String, AuthError> {
        let sealed = STANDARD.decode(stored).map_err(|_| AuthError::Crypto)?;
        // AES-GCM auth tag is 16 bytes minimum.
        if sealed.len() < NONCE_LENGTH + 16 {
            return Err(AuthError::Crypto);
        }

        let key = Key::<Aes256Gcm>::from_slice(&self.cipher_key);
        let cipher = Aes256Gcm::new(key);
        let nonce = Nonce::from_slice(&sealed[..NONCE_LENGTH]);

        let plaintext = cipher
            .decrypt(nonce, &sealed[NONCE_LENGTH..])
            .map_err(|_| AuthError::Crypto)?;

        String::from_utf8(plaintext).map_err(|_| AuthError::Crypto)
    }

    fn sign(&self, data: &[u8]) -> Vec<u8> {
        let mut mac =
            <HmacSha256 as Mac>::new_from_slice(&self.secret).expect("HMAC accepts any key length");
        mac.update(data);
        mac.finalize().into_bytes().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;

    use super::super::store::ManualClock;
    use super::*;

    fn signer() -> TokenSigner {
        TokenSigner::new("test-secret")
    }

    #[test]
    fn issue_verify_round_trip() {
        let clock = ManualClock::fixed();
        let signer = signer();

        let token = signer.issue("user@example.com", &clock);
        let claims = signer.verify(&token, &clock).unwrap();

        assert_eq!(claims.sub, "user@example.com");
        assert_eq!(claims.exp - claims.iat, TOKEN_TTL_HOURS * 3600);
    }

    #[test]
    fn token_has_three_segments() {
        let clock = ManualClock::fixed();
        let token = signer().issue("user", &clock);
        assert_eq!(token.split('.').count(), 3);
    }

    #[test]
    fn expired_token_is_rejected() {
        let clock = ManualClock::fixed();
        let signer = signer();
        let token = signer.issue("user", &clock);

        clock.advance(TimeDelta::hours(TOKEN_TTL_HOURS) + TimeDelta::seconds(1));

        assert!(matches!(
            signer.verify(&token, &clock),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn token_valid_just_before_expiry() {
        let clock = ManualClock::fixed();
        let signer = signer();
        let token = signer.issue("user", &clock);

        clock.advance(TimeDelta::hours(TOKEN_TTL_HOURS) - TimeDelta::seconds(1));

        assert!(signer.verify(&token, &clock).is_ok());
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let clock = ManualClock::fixed();
        let signer = signer();
        let token = signer.issue("user", &clock);

        let mut segments: Vec<&str> = token.split('.').collect();
        let forged = URL_SAFE_NO_PAD.encode(r#"{"sub":"admin","iat":0,"exp":9999999999}"#);
        segments[1] = &forged;
        let tampered = segments.join(".");

        assert!(matches!(
            signer.verify(&tampered, &clock),
            Err(AuthError::TokenInvalid)
        ));
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let clock = ManualClock::fixed();
        let other = TokenSigner::new("other-secret");
        let token = other.issue("user", &clock);

        assert!(matches!(
            signer().verify(&token, &clock),
            Err(AuthError::TokenInvalid)
        ));
    }

    #[test]
    fn malformed_tokens_are_rejected() {
        let clock = ManualClock::fixed();
        let signer = signer();
        for garbage in ["", "a", "a.b", "a.b.c.d", "not base64 . at all . here"] {
            assert!(
                matches!(signer.verify(garbage, &clock), Err(AuthError::TokenInvalid)),
                "Accepted malformed token: {garbage:?}"
            );
        }
    }

    #[test]
    fn encrypt_decrypt_round_trip() {
        let clock = ManualClock::fixed();
        let signer = signer();
        let token = signer.issue("user", &clock);

        let sealed = signer.encrypt(&token).unwrap();
        assert_ne!(sealed, token);
        assert_eq!(signer.decrypt(&sealed).unwrap(), token);
    }

    #[test]
    fn fresh_nonce_per_encryption() {
        let signer = signer();
        let first = signer.encrypt("same token").unwrap();
        let second = signer.encrypt("same token").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn decrypt_under_wrong_secret_fails() {
        let signer = signer();
        let sealed = signer.encrypt("token").unwrap();

        let other = TokenSigner::new("other-secret");
        assert!(matches!(other.decrypt(&sealed), Err(AuthError::Crypto)));
    }

    #[test]
    fn decrypt_rejects_garbage() {
        let signer = signer();
        assert!(matches!(signer.decrypt("!!!"), Err(AuthError::Crypto)));
        assert!(matches!(
            signer.decrypt(&STANDARD.encode(b"short")),
            Err(AuthError::Crypto)
        ));
    }
}
