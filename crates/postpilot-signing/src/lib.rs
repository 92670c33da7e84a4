//! Tamper-evident, time-boxed state tokens for the OAuth callback handoff.
//!
//! A state token binds an external authorization callback to an internal
//! account so a stolen or replayed callback cannot attach a token to the
//! wrong account. Tokens are signed with HMAC-SHA256 under a process-wide
//! secret and expire [`MAX_AGE_SECS`] seconds after issue. Nothing is stored;
//! the age window is the only replay protection.

use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// Maximum accepted age of a state token, in seconds.
pub const MAX_AGE_SECS: i64 = 300;

/// State-token verification failures. Both are recoverable: the caller
/// restarts the authorization handshake.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateError {
    /// The token is malformed or its signature does not match.
    #[error("state token signature is invalid")]
    InvalidSignature,

    /// The signature is valid but the token is older than [`MAX_AGE_SECS`].
    #[error("state token expired {age_secs}s after issue")]
    Expired { age_secs: i64 },
}

/// Issues and verifies signed state tokens.
///
/// Token format: `"{account_id}.{unix_seconds}.{hex_signature}"` — safe to
/// embed in a URL query parameter without further encoding.
pub struct StateSigner {
    key: Vec<u8>,
}

impl StateSigner {
    #[must_use]
    pub fn new(secret: &str) -> Self {
        Self {
            key: secret.as_bytes().to_vec(),
        }
    }

    /// Issues a state token for `account_id` stamped with the current time.
    #[must_use]
    pub fn issue(&self, account_id: Uuid) -> String {
        self.issue_at(account_id, Utc::now().timestamp())
    }

    /// Verifies a state token against the current time and returns the
    /// embedded account id.
    ///
    /// # Errors
    ///
    /// - [`StateError::InvalidSignature`] if the token is malformed or the
    ///   signature does not match this signer's key.
    /// - [`StateError::Expired`] if more than [`MAX_AGE_SECS`] seconds have
    ///   passed since the token was issued.
    pub fn verify(&self, token: &str) -> Result<Uuid, StateError> {
        self.verify_at(token, Utc::now().timestamp())
    }

    fn issue_at(&self, account_id: Uuid, timestamp: i64) -> String {
        let payload = format!("{account_id}.{timestamp}");
        let signature = self.sign(&payload);
        format!("{payload}.{signature}")
    }

    fn verify_at(&self, token: &str, now: i64) -> Result<Uuid, StateError> {
        let mut parts = token.splitn(3, '.');
        let (Some(id), Some(timestamp), Some(signature)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Err(StateError::InvalidSignature);
        };

        let signature = decode_hex(signature).ok_or(StateError::InvalidSignature)?;
        let mut mac = self.mac();
        mac.update(format!("{id}.{timestamp}").as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| StateError::InvalidSignature)?;

        // The signature covers the timestamp, so a valid signature implies a
        // well-formed payload; parse failures past this point still count as
        // a bad signature rather than a distinct error.
        let timestamp: i64 = timestamp
            .parse()
            .map_err(|_| StateError::InvalidSignature)?;
        let age_secs = now - timestamp;
        if age_secs > MAX_AGE_SECS {
            return Err(StateError::Expired { age_secs });
        }

        Uuid::parse_str(id).map_err(|_| StateError::InvalidSignature)
    }

    fn sign(&self, payload: &str) -> String {
        let mut mac = self.mac();
        mac.update(payload.as_bytes());
        format!("{:x}", mac.finalize().into_bytes())
    }

    fn mac(&self) -> HmacSha256 {
        // HMAC accepts keys of any length, so this cannot fail.
        HmacSha256::new_from_slice(&self.key).expect("HMAC accepts any key length")
    }
}

fn decode_hex(raw: &str) -> Option<Vec<u8>> {
    if raw.is_empty() || raw.len() % 2 != 0 {
        return None;
    }
    (0..raw.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(raw.get(i..i + 2)?, 16).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> StateSigner {
        StateSigner::new("test-signing-secret")
    }

    #[test]
    fn verify_returns_account_id_for_fresh_token() {
        let account_id = Uuid::new_v4();
        let signer = signer();
        let token = signer.issue_at(account_id, 1_000_000);
        assert_eq!(signer.verify_at(&token, 1_000_000), Ok(account_id));
    }

    #[test]
    fn verify_accepts_token_at_max_age() {
        let account_id = Uuid::new_v4();
        let signer = signer();
        let token = signer.issue_at(account_id, 1_000_000);
        assert_eq!(
            signer.verify_at(&token, 1_000_000 + MAX_AGE_SECS),
            Ok(account_id)
        );
    }

    #[test]
    fn verify_rejects_token_past_max_age() {
        let signer = signer();
        let token = signer.issue_at(Uuid::new_v4(), 1_000_000);
        assert_eq!(
            signer.verify_at(&token, 1_000_000 + MAX_AGE_SECS + 1),
            Err(StateError::Expired { age_secs: 301 })
        );
    }

    #[test]
    fn verify_rejects_tampered_account_id() {
        let signer = signer();
        let token = signer.issue_at(Uuid::new_v4(), 1_000_000);
        // Flip one character of the embedded account id.
        let mut bytes = token.into_bytes();
        bytes[0] = if bytes[0] == b'a' { b'b' } else { b'a' };
        let tampered = String::from_utf8(bytes).unwrap();
        assert_eq!(
            signer.verify_at(&tampered, 1_000_000),
            Err(StateError::InvalidSignature)
        );
    }

    #[test]
    fn verify_rejects_tampered_timestamp() {
        let account_id = Uuid::new_v4();
        let signer = signer();
        let token = signer.issue_at(account_id, 1_000_000);
        let tampered = token.replace(".1000000.", ".2000000.");
        assert_ne!(tampered, token, "timestamp should have been rewritten");
        assert_eq!(
            signer.verify_at(&tampered, 2_000_000),
            Err(StateError::InvalidSignature)
        );
    }

    #[test]
    fn verify_rejects_tampered_signature() {
        let signer = signer();
        let token = signer.issue_at(Uuid::new_v4(), 1_000_000);
        let mut bytes = token.into_bytes();
        let last = bytes.len() - 1;
        bytes[last] = if bytes[last] == b'0' { b'1' } else { b'0' };
        let tampered = String::from_utf8(bytes).unwrap();
        assert_eq!(
            signer.verify_at(&tampered, 1_000_000),
            Err(StateError::InvalidSignature)
        );
    }

    #[test]
    fn verify_rejects_token_signed_with_other_key() {
        let token = StateSigner::new("other-secret").issue_at(Uuid::new_v4(), 1_000_000);
        assert_eq!(
            signer().verify_at(&token, 1_000_000),
            Err(StateError::InvalidSignature)
        );
    }

    #[test]
    fn verify_rejects_garbage() {
        for garbage in ["", "no-dots-here", "a.b", "a.b.c.d", "..", "a.b.zz"] {
            assert_eq!(
                signer().verify_at(garbage, 1_000_000),
                Err(StateError::InvalidSignature),
                "garbage input accepted: {garbage:?}"
            );
        }
    }

    #[test]
    fn issued_tokens_are_url_query_safe() {
        let token = signer().issue_at(Uuid::new_v4(), 1_000_000);
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-'));
    }
}
