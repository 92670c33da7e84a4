//! Account credential model.
//!
//! An [`AccountCredential`] binds a long-lived Instagram access token to an
//! internal account. Tokens are valid for a fixed 60-day window from issue;
//! a refresh produces a whole new value rather than mutating fields in place.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validity window for a long-lived access token, in days.
pub const TOKEN_VALIDITY_DAYS: i64 = 60;

/// A long-lived access token bound to an internal account.
#[derive(Clone, Serialize, Deserialize)]
pub struct AccountCredential {
    pub account_id: Uuid,
    pub access_token: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl AccountCredential {
    /// Binds a freshly exchanged token to an account.
    ///
    /// `expires_at` is always `issued_at` plus [`TOKEN_VALIDITY_DAYS`].
    #[must_use]
    pub fn issue(account_id: Uuid, access_token: String, issued_at: DateTime<Utc>) -> Self {
        Self {
            account_id,
            access_token,
            issued_at,
            expires_at: issued_at + Duration::days(TOKEN_VALIDITY_DAYS),
        }
    }

    /// Returns a replacement credential carrying the new token and a fresh
    /// validity window. The old value is left untouched so the swap stays
    /// atomic from the caller's perspective.
    #[must_use]
    pub fn refreshed(&self, access_token: String, refreshed_at: DateTime<Utc>) -> Self {
        Self::issue(self.account_id, access_token, refreshed_at)
    }

    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

impl std::fmt::Debug for AccountCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountCredential")
            .field("account_id", &self.account_id)
            .field("access_token", &"[redacted]")
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issued_at() -> DateTime<Utc> {
        "2025-06-01T12:00:00Z".parse().unwrap()
    }

    #[test]
    fn expiry_is_sixty_days_after_issue() {
        let cred = AccountCredential::issue(Uuid::new_v4(), "LT".to_owned(), issued_at());
        assert_eq!(cred.expires_at - cred.issued_at, Duration::days(60));
    }

    #[test]
    fn not_expired_within_window() {
        let cred = AccountCredential::issue(Uuid::new_v4(), "LT".to_owned(), issued_at());
        assert!(!cred.is_expired(issued_at() + Duration::days(59)));
    }

    #[test]
    fn expired_at_window_end() {
        let cred = AccountCredential::issue(Uuid::new_v4(), "LT".to_owned(), issued_at());
        assert!(cred.is_expired(issued_at() + Duration::days(60)));
    }

    #[test]
    fn refresh_replaces_token_and_window() {
        let cred = AccountCredential::issue(Uuid::new_v4(), "OLD".to_owned(), issued_at());
        let refreshed_at = issued_at() + Duration::days(50);
        let next = cred.refreshed("NEW".to_owned(), refreshed_at);
        assert_eq!(next.account_id, cred.account_id);
        assert_eq!(next.access_token, "NEW");
        assert_eq!(next.expires_at, refreshed_at + Duration::days(60));
        // original untouched
        assert_eq!(cred.access_token, "OLD");
    }

    #[test]
    fn debug_output_redacts_token() {
        let cred = AccountCredential::issue(Uuid::new_v4(), "secret-token".to_owned(), issued_at());
        let debug = format!("{cred:?}");
        assert!(!debug.contains("secret-token"), "token leaked: {debug}");
    }
}
