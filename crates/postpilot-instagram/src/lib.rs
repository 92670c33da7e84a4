//! Instagram Graph API client for postpilot.
//!
//! Wraps `reqwest` with Graph-API-specific error handling and typed response
//! deserialization across four concerns: the OAuth code-for-token exchange,
//! the media publish pipeline (container → publish → permalink), the insight
//! aggregation endpoints, and profile/media/comment reads. All operations are
//! plain request/response calls — no background work, no shared mutable state.

pub mod client;
pub mod error;
pub mod insights;
pub mod oauth;
pub mod publish;
pub mod types;

mod retry;

pub use client::InstagramClient;
pub use error::{Endpoint, InstagramError};
pub use insights::{AccountInsights, InsightMap, MetricValue};
pub use oauth::LongLivedToken;
pub use publish::{PublishRequest, PublishedPost};
pub use types::SeriesSample;
