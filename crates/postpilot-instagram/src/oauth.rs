//! OAuth code-for-token exchange.
//!
//! Converts a short-lived authorization code into a long-lived access token
//! in two steps: the authorization-code grant against the OAuth host, then
//! the `ig_exchange` grant against the Graph host. Neither step is retried —
//! a failed exchange means the user re-authorizes.

use chrono::{DateTime, Duration, Utc};
use postpilot_core::TOKEN_VALIDITY_DAYS;
use serde::Serialize;

use crate::client::{parse, InstagramClient};
use crate::error::{Endpoint, InstagramError};
use crate::types::{LongLivedTokenResponse, ShortLivedTokenResponse};

/// A long-lived access token with its locally computed validity window.
///
/// `expires_at` is always `issued_at` plus the fixed 60-day policy window;
/// the `expires_in` reported by the exchange response is ignored.
#[derive(Clone, Serialize)]
pub struct LongLivedToken {
    pub access_token: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl std::fmt::Debug for LongLivedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LongLivedToken")
            .field("access_token", &"[redacted]")
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl InstagramClient {
    /// Exchanges an authorization code for a long-lived access token.
    ///
    /// Step 1: `POST {oauth}/oauth/access_token` with the code, app
    /// credentials, and redirect URI. Step 2: `POST {graph}/access_token`
    /// with `grant_type=ig_exchange` and the short-lived token from step 1.
    ///
    /// # Errors
    ///
    /// - [`InstagramError::Upstream`] with
    ///   [`Endpoint::ShortLivedTokenExchange`] or
    ///   [`Endpoint::LongLivedTokenExchange`] identifying the step that the
    ///   API rejected.
    /// - [`InstagramError::Http`] on network failure.
    /// - [`InstagramError::Deserialize`] if a response shape is unexpected.
    pub async fn exchange_code(&self, code: &str) -> Result<LongLivedToken, InstagramError> {
        let url = self.oauth_url("oauth/access_token", &[])?;
        let body = self
            .post_form(
                Endpoint::ShortLivedTokenExchange,
                url,
                &[
                    ("client_id", self.client_id.as_str()),
                    ("client_secret", self.client_secret.as_str()),
                    ("grant_type", "authorization_code"),
                    ("redirect_uri", self.redirect_uri.as_str()),
                    ("code", code),
                ],
            )
            .await?;
        let short: ShortLivedTokenResponse = parse(Endpoint::ShortLivedTokenExchange, body)?;

        let url = self.graph_url("access_token", &[])?;
        let body = self
            .post_form(
                Endpoint::LongLivedTokenExchange,
                url,
                &[
                    ("grant_type", "ig_exchange"),
                    ("client_secret", self.client_secret.as_str()),
                    ("access_token", short.access_token.as_str()),
                ],
            )
            .await?;
        let long: LongLivedTokenResponse = parse(Endpoint::LongLivedTokenExchange, body)?;

        let issued_at = Utc::now();
        tracing::info!("authorization code exchanged for long-lived token");
        Ok(LongLivedToken {
            access_token: long.access_token,
            issued_at,
            expires_at: issued_at + Duration::days(TOKEN_VALIDITY_DAYS),
        })
    }
}
