//! Graph API response types.
//!
//! All types model the JSON structures returned by the Instagram Graph API.
//! List endpoints wrap their payload in a `{"data": [...]}` envelope;
//! [`DataEnvelope`] captures that pattern generically. Fields the API only
//! sometimes returns are `Option` with `#[serde(default)]` so a sparse
//! response never fails deserialization.

use serde::{Deserialize, Serialize};

/// Generic `{"data": [...]}` list envelope used by media, comment, and
/// insight endpoints.
#[derive(Debug, Deserialize)]
pub struct DataEnvelope<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

// ---------------------------------------------------------------------------
// OAuth token exchange
// ---------------------------------------------------------------------------

/// Response from `POST /oauth/access_token` (authorization-code grant).
#[derive(Debug, Deserialize)]
pub struct ShortLivedTokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub user_id: Option<i64>,
}

/// Response from `POST /access_token` (`grant_type=ig_exchange`).
///
/// `expires_in` is reported by the API but deliberately ignored: the token
/// validity policy is a fixed 60-day window computed locally.
#[derive(Debug, Deserialize)]
pub struct LongLivedTokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

// ---------------------------------------------------------------------------
// Publish pipeline
// ---------------------------------------------------------------------------

/// Response from `POST /{account_id}/media`: the staged container id.
#[derive(Debug, Deserialize)]
pub struct CreationResponse {
    pub id: String,
}

/// Response from `POST /{account_id}/media_publish`: the permanent media id.
#[derive(Debug, Deserialize)]
pub struct PublishResponse {
    pub id: String,
}

/// Response from `GET /{media_id}?fields=permalink`.
#[derive(Debug, Deserialize)]
pub struct PermalinkResponse {
    pub permalink: String,
}

// ---------------------------------------------------------------------------
// Profile and media reads
// ---------------------------------------------------------------------------

/// Business account profile returned by `GET /me`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessAccount {
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub biography: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub followers_count: Option<i64>,
    #[serde(default)]
    pub follows_count: Option<i64>,
    #[serde(default)]
    pub media_count: Option<i64>,
    #[serde(default)]
    pub account_type: Option<String>,
}

/// Slim profile returned by `GET /{account_id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileInfo {
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub account_type: Option<String>,
    #[serde(default)]
    pub media_count: Option<i64>,
}

/// A published media object from `GET /{account_id}/media`.
///
/// Timestamps stay `String`: the API reports ISO-8601 with a `+0000` offset
/// and consumers that need real datetimes parse at their own boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaItem {
    pub id: String,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub media_url: Option<String>,
    #[serde(default)]
    pub permalink: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Full detail for a single media object from `GET /{media_id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaDetail {
    pub id: String,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub media_product_type: Option<String>,
    #[serde(default)]
    pub media_url: Option<String>,
    #[serde(default)]
    pub permalink: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub comments_count: Option<i64>,
    #[serde(default)]
    pub like_count: Option<i64>,
    #[serde(default)]
    pub shortcode: Option<String>,
    #[serde(default)]
    pub is_shared_to_feed: Option<bool>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub owner: Option<MediaOwner>,
}

/// Owner reference embedded in a [`MediaDetail`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaOwner {
    pub id: String,
}

/// A comment on a media object from `GET /{media_id}/comments`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

// ---------------------------------------------------------------------------
// Insights
// ---------------------------------------------------------------------------

/// One metric entry from a `GET /{id}/insights` response.
///
/// Time-series metrics carry `values`; scalar metrics carry `value`. Some
/// breakdown metrics carry neither — normalization decides per entry, see
/// [`crate::insights`].
#[derive(Debug, Deserialize)]
pub struct InsightEntry {
    pub name: String,
    #[serde(default)]
    pub period: Option<String>,
    #[serde(default)]
    pub values: Option<Vec<SeriesSample>>,
    #[serde(default)]
    pub value: Option<serde_json::Value>,
}

/// A single time-series sample inside a metric's `values` array.
///
/// `value` stays a raw JSON value: most metrics report numbers but some
/// (e.g. `online_followers`) report per-hour objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSample {
    #[serde(default)]
    pub end_time: Option<String>,
    pub value: serde_json::Value,
}
