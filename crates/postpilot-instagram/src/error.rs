use thiserror::Error;

/// The upstream Graph API operation an error originated from.
///
/// Carried inside [`InstagramError::Upstream`] so callers can tell a failed
/// container creation apart from a failed publish or permalink lookup without
/// string-matching on messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    ShortLivedTokenExchange,
    LongLivedTokenExchange,
    MediaContainer,
    MediaPublish,
    PermalinkLookup,
    BusinessAccount,
    ProfileInfo,
    MediaList,
    MediaDetail,
    Comments,
    SendMessage,
    AccountInsights,
    DemographicInsights,
    UserInsights,
    PostInsights,
}

impl Endpoint {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Endpoint::ShortLivedTokenExchange => "short-lived token exchange",
            Endpoint::LongLivedTokenExchange => "long-lived token exchange",
            Endpoint::MediaContainer => "media container creation",
            Endpoint::MediaPublish => "media publish",
            Endpoint::PermalinkLookup => "permalink lookup",
            Endpoint::BusinessAccount => "business account lookup",
            Endpoint::ProfileInfo => "profile info lookup",
            Endpoint::MediaList => "media list",
            Endpoint::MediaDetail => "media detail",
            Endpoint::Comments => "comment list",
            Endpoint::SendMessage => "send message",
            Endpoint::AccountInsights => "account insights",
            Endpoint::DemographicInsights => "demographic insights",
            Endpoint::UserInsights => "user insights",
            Endpoint::PostInsights => "post insights",
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by the Instagram Graph API client.
///
/// [`InstagramError::Http`] covers network-level failures (timeouts,
/// connection resets); [`InstagramError::Upstream`] covers requests the API
/// received and rejected. The two are deliberately distinct variants so
/// callers never lose that difference.
#[derive(Debug, Error)]
pub enum InstagramError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The Graph API answered with a non-2xx status.
    #[error("{endpoint} failed with status {status}: {body}")]
    Upstream {
        endpoint: Endpoint,
        status: u16,
        body: String,
    },

    /// The response body could not be deserialized into the expected type.
    #[error("json deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// A request URL could not be constructed.
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}
