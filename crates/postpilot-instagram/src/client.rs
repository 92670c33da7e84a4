//! HTTP client for the Instagram Graph API.
//!
//! Wraps `reqwest` with Graph-API-specific error handling: every helper maps
//! a non-2xx response to [`InstagramError::Upstream`] carrying the endpoint,
//! status, and verbatim body. A per-client semaphore caps concurrent outbound
//! requests since the upstream enforces its own rate limits.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use tokio::sync::Semaphore;

use crate::error::{Endpoint, InstagramError};
use crate::types::{BusinessAccount, Comment, DataEnvelope, MediaDetail, MediaItem, ProfileInfo};

/// Versioned path segment used for media, messaging, and insight endpoints.
/// `me` and the long-lived token exchange are unversioned.
pub(crate) const API_VERSION: &str = "v23.0";

const DEFAULT_GRAPH_BASE: &str = "https://graph.instagram.com";
const DEFAULT_OAUTH_BASE: &str = "https://api.instagram.com";
const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 4;
const DEFAULT_PUBLISH_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Client for the Instagram Graph API.
///
/// Holds the HTTP client, app credentials, and base URLs. Use
/// [`InstagramClient::new`] for production or
/// [`InstagramClient::with_base_urls`] to point at a mock server in tests.
pub struct InstagramClient {
    pub(crate) client: Client,
    pub(crate) client_id: String,
    pub(crate) client_secret: String,
    pub(crate) redirect_uri: String,
    pub(crate) graph_base: Url,
    pub(crate) oauth_base: Url,
    pub(crate) publish_retry_delay: Duration,
    limiter: Arc<Semaphore>,
}

impl InstagramClient {
    /// Creates a new client pointed at the production Graph API hosts.
    ///
    /// # Errors
    ///
    /// Returns [`InstagramError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        client_id: &str,
        client_secret: &str,
        redirect_uri: &str,
        timeout_secs: u64,
    ) -> Result<Self, InstagramError> {
        Self::with_base_urls(
            client_id,
            client_secret,
            redirect_uri,
            timeout_secs,
            DEFAULT_GRAPH_BASE,
            DEFAULT_OAUTH_BASE,
        )
    }

    /// Creates a new client with custom Graph and OAuth base URLs (for
    /// testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`InstagramError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`InstagramError::InvalidUrl`] if either
    /// base URL does not parse.
    pub fn with_base_urls(
        client_id: &str,
        client_secret: &str,
        redirect_uri: &str,
        timeout_secs: u64,
        graph_base: &str,
        oauth_base: &str,
    ) -> Result<Self, InstagramError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("postpilot/0.1 (instagram-publishing)")
            .build()?;

        Ok(Self {
            client,
            client_id: client_id.to_owned(),
            client_secret: client_secret.to_owned(),
            redirect_uri: redirect_uri.to_owned(),
            graph_base: parse_base_url(graph_base)?,
            oauth_base: parse_base_url(oauth_base)?,
            publish_retry_delay: DEFAULT_PUBLISH_RETRY_DELAY,
            limiter: Arc::new(Semaphore::new(DEFAULT_MAX_CONCURRENT_REQUESTS)),
        })
    }

    /// Overrides the fixed delay before the single publish-step retry.
    #[must_use]
    pub fn with_publish_retry_delay(mut self, delay: Duration) -> Self {
        self.publish_retry_delay = delay;
        self
    }

    /// Overrides the cap on concurrent outbound requests.
    #[must_use]
    pub fn with_max_concurrent_requests(mut self, max: usize) -> Self {
        self.limiter = Arc::new(Semaphore::new(max));
        self
    }

    /// Resolves the business account profile for an access token.
    ///
    /// # Errors
    ///
    /// - [`InstagramError::Upstream`] if the API rejects the token.
    /// - [`InstagramError::Http`] on network failure.
    /// - [`InstagramError::Deserialize`] if the response shape is unexpected.
    pub async fn fetch_business_account(
        &self,
        access_token: &str,
    ) -> Result<BusinessAccount, InstagramError> {
        let url = self.graph_url(
            "me",
            &[
                (
                    "fields",
                    "id,name,biography,website,follows_count,followers_count,media_count,username,account_type",
                ),
                ("access_token", access_token),
            ],
        )?;
        let body = self.get_json(Endpoint::BusinessAccount, url).await?;
        parse(Endpoint::BusinessAccount, body)
    }

    /// Fetches the slim profile for a business account id.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`InstagramClient::fetch_business_account`].
    pub async fn fetch_profile_info(
        &self,
        account_id: &str,
        access_token: &str,
    ) -> Result<ProfileInfo, InstagramError> {
        let url = self.graph_url(
            &format!("{API_VERSION}/{account_id}"),
            &[
                ("fields", "id,username,account_type,media_count"),
                ("access_token", access_token),
            ],
        )?;
        let body = self.get_json(Endpoint::ProfileInfo, url).await?;
        parse(Endpoint::ProfileInfo, body)
    }

    /// Lists the account's published media.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`InstagramClient::fetch_business_account`].
    pub async fn fetch_all_posts(
        &self,
        account_id: &str,
        access_token: &str,
    ) -> Result<Vec<MediaItem>, InstagramError> {
        let url = self.graph_url(
            &format!("{API_VERSION}/{account_id}/media"),
            &[
                (
                    "fields",
                    "id,caption,media_type,media_url,permalink,thumbnail_url,timestamp",
                ),
                ("access_token", access_token),
            ],
        )?;
        let body = self.get_json(Endpoint::MediaList, url).await?;
        let envelope: DataEnvelope<MediaItem> = parse(Endpoint::MediaList, body)?;
        Ok(envelope.data)
    }

    /// Fetches full detail for a single media object.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`InstagramClient::fetch_business_account`].
    pub async fn fetch_post_details(
        &self,
        media_id: &str,
        access_token: &str,
    ) -> Result<MediaDetail, InstagramError> {
        let url = self.graph_url(
            &format!("{API_VERSION}/{media_id}"),
            &[
                (
                    "fields",
                    "id,caption,media_type,media_url,permalink,thumbnail_url,timestamp,\
                     comments_count,like_count,media_product_type,owner,shortcode,\
                     is_shared_to_feed,username",
                ),
                ("access_token", access_token),
            ],
        )?;
        let body = self.get_json(Endpoint::MediaDetail, url).await?;
        parse(Endpoint::MediaDetail, body)
    }

    /// Lists comments on a media object.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`InstagramClient::fetch_business_account`].
    pub async fn fetch_comments(
        &self,
        media_id: &str,
        access_token: &str,
    ) -> Result<Vec<Comment>, InstagramError> {
        let url = self.graph_url(
            &format!("{API_VERSION}/{media_id}/comments"),
            &[
                ("fields", "id,text,username,timestamp"),
                ("access_token", access_token),
            ],
        )?;
        let body = self.get_json(Endpoint::Comments, url).await?;
        let envelope: DataEnvelope<Comment> = parse(Endpoint::Comments, body)?;
        Ok(envelope.data)
    }

    /// Sends a direct-message reply from the business account.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`InstagramClient::fetch_business_account`].
    pub async fn send_message(
        &self,
        account_id: &str,
        recipient_id: &str,
        text: &str,
        access_token: &str,
    ) -> Result<(), InstagramError> {
        let url = self.graph_url(&format!("{API_VERSION}/{account_id}/messages"), &[])?;
        let payload = serde_json::json!({
            "recipient": { "id": recipient_id },
            "message": { "text": text },
            "access_token": access_token,
        });
        self.post_json(Endpoint::SendMessage, url, &payload).await?;
        tracing::info!(recipient_id, "direct message sent");
        Ok(())
    }

    /// Builds a Graph API URL from a path relative to the graph base plus
    /// percent-encoded query parameters.
    ///
    /// # Errors
    ///
    /// Returns [`InstagramError::InvalidUrl`] if the path does not join onto
    /// the base URL.
    pub(crate) fn graph_url(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<Url, InstagramError> {
        join_url(&self.graph_base, path, params)
    }

    /// Builds an OAuth host URL (short-lived token exchange only).
    ///
    /// # Errors
    ///
    /// Returns [`InstagramError::InvalidUrl`] if the path does not join onto
    /// the base URL.
    pub(crate) fn oauth_url(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<Url, InstagramError> {
        join_url(&self.oauth_base, path, params)
    }

    /// Sends a GET request and returns the parsed JSON body.
    pub(crate) async fn get_json(
        &self,
        endpoint: Endpoint,
        url: Url,
    ) -> Result<serde_json::Value, InstagramError> {
        self.send_checked(endpoint, self.client.get(url)).await
    }

    /// Sends a form-encoded POST request and returns the parsed JSON body.
    pub(crate) async fn post_form(
        &self,
        endpoint: Endpoint,
        url: Url,
        form: &[(&str, &str)],
    ) -> Result<serde_json::Value, InstagramError> {
        self.send_checked(endpoint, self.client.post(url).form(form))
            .await
    }

    /// Sends a JSON POST request and returns the parsed JSON body.
    pub(crate) async fn post_json(
        &self,
        endpoint: Endpoint,
        url: Url,
        payload: &serde_json::Value,
    ) -> Result<serde_json::Value, InstagramError> {
        self.send_checked(endpoint, self.client.post(url).json(payload))
            .await
    }

    /// Sends a request under the concurrency cap, asserts a 2xx status, and
    /// parses the response body as JSON.
    ///
    /// Non-2xx responses become [`InstagramError::Upstream`] with the body
    /// text preserved verbatim for logging and user-facing messaging.
    async fn send_checked(
        &self,
        endpoint: Endpoint,
        request: reqwest::RequestBuilder,
    ) -> Result<serde_json::Value, InstagramError> {
        // The semaphore lives as long as the client and is never closed.
        let _permit = self
            .limiter
            .acquire()
            .await
            .expect("request limiter is never closed");

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(InstagramError::Upstream {
                endpoint,
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| InstagramError::Deserialize {
            context: endpoint.to_string(),
            source: e,
        })
    }
}

/// Parses a JSON body into a typed response, tagging failures with the
/// endpoint they came from.
pub(crate) fn parse<T: DeserializeOwned>(
    endpoint: Endpoint,
    body: serde_json::Value,
) -> Result<T, InstagramError> {
    serde_json::from_value(body).map_err(|e| InstagramError::Deserialize {
        context: endpoint.to_string(),
        source: e,
    })
}

/// Normalises a base URL to end with exactly one slash so relative joins
/// append to the path rather than replacing the last segment.
fn parse_base_url(base: &str) -> Result<Url, InstagramError> {
    let normalised = format!("{}/", base.trim_end_matches('/'));
    Url::parse(&normalised).map_err(|e| InstagramError::InvalidUrl {
        url: base.to_owned(),
        reason: e.to_string(),
    })
}

fn join_url(base: &Url, path: &str, params: &[(&str, &str)]) -> Result<Url, InstagramError> {
    let mut url = base.join(path).map_err(|e| InstagramError::InvalidUrl {
        url: path.to_owned(),
        reason: e.to_string(),
    })?;
    if !params.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (k, v) in params {
            pairs.append_pair(k, v);
        }
        drop(pairs);
    }
    Ok(url)
}
