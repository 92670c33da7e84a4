//! Insight aggregation.
//!
//! The Graph API reports metrics in heterogeneous shapes: time-series
//! metrics carry a `values` array, scalar metrics a bare `value`. Everything
//! is normalized at parse time into [`MetricValue`], keyed by the
//! server-reported metric name, so downstream consumers never see an untyped
//! payload.

use std::collections::HashMap;

use chrono::{Duration, NaiveDate, Utc};
use serde::Serialize;

use crate::client::{parse, InstagramClient, API_VERSION};
use crate::error::{Endpoint, InstagramError};
use crate::types::{DataEnvelope, InsightEntry, SeriesSample};

/// Account-level metrics requested for the account slot and for user-level
/// insight windows.
pub const ACCOUNT_METRICS: &[&str] = &[
    "reach",
    "follower_count",
    "website_clicks",
    "profile_views",
    "online_followers",
    "accounts_engaged",
    "total_interactions",
    "likes",
    "comments",
    "shares",
    "saves",
    "replies",
    "engaged_audience_demographics",
    "reached_audience_demographics",
    "follower_demographics",
    "follows_and_unfollows",
    "profile_links_taps",
    "views",
    "threads_likes",
    "threads_replies",
    "reposts",
    "quotes",
    "threads_followers",
    "threads_follower_demographics",
    "content_views",
    "threads_views",
    "threads_clicks",
    "threads_reposts",
];

/// Audience-breakdown metrics requested with `metric_type=total_value`.
pub const DEMOGRAPHIC_METRICS: &[&str] = &[
    "follower_demographics",
    "reached_audience_demographics",
    "engaged_audience_demographics",
];

/// Per-post metrics.
pub const POST_METRICS: &[&str] = &[
    "comments",
    "follows",
    "likes",
    "profile_activity",
    "profile_visits",
    "reach",
    "saved",
    "shares",
    "total_interactions",
    "views",
];

/// Default reporting window when the caller supplies no start date, in days.
pub const DEFAULT_WINDOW_DAYS: i64 = 7;

/// Maximum span the upstream accepts between `since` and `until`, in days.
pub const MAX_WINDOW_DAYS: i64 = 730;

/// Normalized metrics keyed by server-reported name.
pub type InsightMap = HashMap<String, MetricValue>;

/// A metric's value, decided at parse time.
///
/// Scalar metrics (`follower_count: 42`) keep their JSON number; time-series
/// metrics keep the ordered sample list. `values` wins when both fields are
/// present.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    Scalar(serde_json::Number),
    Series(Vec<SeriesSample>),
}

/// Result of [`InstagramClient::fetch_account_insights`].
///
/// The two slots come from independent requests and are kept separate —
/// never merged. A `None` slot means that slot's request failed while the
/// other succeeded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountInsights {
    pub account_metrics: Option<InsightMap>,
    pub demographics: Option<InsightMap>,
}

impl InstagramClient {
    /// Fetches account-level metrics and audience demographics for a
    /// business account.
    ///
    /// The two requests run concurrently and are evaluated independently: a
    /// failed slot is logged and reported as `None` without suppressing the
    /// other slot's data.
    ///
    /// # Errors
    ///
    /// Only when both slots fail — the account-metrics error is surfaced and
    /// the demographics error is logged.
    pub async fn fetch_account_insights(
        &self,
        account_id: &str,
        access_token: &str,
        period: &str,
    ) -> Result<AccountInsights, InstagramError> {
        let account_metric_names = ACCOUNT_METRICS.join(",");
        let demographic_metric_names = DEMOGRAPHIC_METRICS.join(",");

        let account_params = [
            ("metric", account_metric_names.as_str()),
            ("period", period),
            ("access_token", access_token),
        ];
        let demographic_params = [
            ("metric", demographic_metric_names.as_str()),
            ("metric_type", "total_value"),
            ("period", period),
            ("access_token", access_token),
        ];
        let account = self.insights_request(
            Endpoint::AccountInsights,
            account_id,
            &account_params,
        );
        let demographics = self.insights_request(
            Endpoint::DemographicInsights,
            account_id,
            &demographic_params,
        );
        let (account, demographics) = tokio::join!(account, demographics);

        match (account, demographics) {
            (Err(account_err), Err(demographics_err)) => {
                tracing::error!(
                    error = %account_err,
                    demographics_error = %demographics_err,
                    "both insight requests failed"
                );
                Err(account_err)
            }
            (account, demographics) => Ok(AccountInsights {
                account_metrics: slot_or_none(account),
                demographics: slot_or_none(demographics),
            }),
        }
    }

    /// Fetches the fixed per-post metric set for a single media object.
    ///
    /// # Errors
    ///
    /// - [`InstagramError::Upstream`] with [`Endpoint::PostInsights`] on a
    ///   non-2xx response.
    /// - [`InstagramError::Http`] on network failure.
    /// - [`InstagramError::Deserialize`] if the response shape is unexpected.
    pub async fn fetch_post_insights(
        &self,
        media_id: &str,
        access_token: &str,
    ) -> Result<InsightMap, InstagramError> {
        let metric_names = POST_METRICS.join(",");
        self.insights_request(
            Endpoint::PostInsights,
            media_id,
            &[
                ("metric", metric_names.as_str()),
                ("access_token", access_token),
            ],
        )
        .await
    }

    /// Fetches user-level insights over a date window.
    ///
    /// Defaults: `until` is today, `since` is seven days earlier. A window of
    /// [`MAX_WINDOW_DAYS`] or more is clamped to the default width with a
    /// warning rather than rejected — deliberately lossy, never a hard error.
    ///
    /// # Errors
    ///
    /// - [`InstagramError::Upstream`] with [`Endpoint::UserInsights`] on a
    ///   non-2xx response.
    /// - [`InstagramError::Http`] on network failure.
    /// - [`InstagramError::Deserialize`] if the response shape is unexpected.
    pub async fn fetch_user_insights(
        &self,
        user_id: &str,
        access_token: &str,
        period: &str,
        since: Option<NaiveDate>,
        until: Option<NaiveDate>,
    ) -> Result<InsightMap, InstagramError> {
        let (since, until) = effective_window(since, until, Utc::now().date_naive());
        let metric_names = ACCOUNT_METRICS.join(",");
        let since = since.to_string();
        let until = until.to_string();
        self.insights_request(
            Endpoint::UserInsights,
            user_id,
            &[
                ("metric", metric_names.as_str()),
                ("period", period),
                ("since", since.as_str()),
                ("until", until.as_str()),
                ("access_token", access_token),
            ],
        )
        .await
    }

    async fn insights_request(
        &self,
        endpoint: Endpoint,
        target_id: &str,
        params: &[(&str, &str)],
    ) -> Result<InsightMap, InstagramError> {
        let url = self.graph_url(&format!("{API_VERSION}/{target_id}/insights"), params)?;
        let body = self.get_json(endpoint, url).await?;
        let envelope: DataEnvelope<InsightEntry> = parse(endpoint, body)?;
        Ok(normalize_entries(envelope.data))
    }
}

fn slot_or_none(result: Result<InsightMap, InstagramError>) -> Option<InsightMap> {
    match result {
        Ok(map) => Some(map),
        Err(err) => {
            tracing::warn!(error = %err, "insight slot request failed, returning partial result");
            None
        }
    }
}

/// Normalizes raw insight entries into [`MetricValue`]s keyed by name.
///
/// `values` is preferred over `value` when both are present. Entries with
/// neither field, or with a non-numeric scalar, are skipped — they are
/// breakdown shapes this aggregation does not model.
fn normalize_entries(entries: Vec<InsightEntry>) -> InsightMap {
    let mut map = InsightMap::new();
    for entry in entries {
        if let Some(values) = entry.values {
            map.insert(entry.name, MetricValue::Series(values));
        } else if let Some(serde_json::Value::Number(n)) = entry.value {
            map.insert(entry.name, MetricValue::Scalar(n));
        } else {
            tracing::debug!(metric = %entry.name, "skipping metric entry with no usable value");
        }
    }
    map
}

/// Resolves the effective `(since, until)` window.
///
/// Fills defaults, then clamps: a span of [`MAX_WINDOW_DAYS`] or more pulls
/// `since` up to [`DEFAULT_WINDOW_DAYS`] before `until`.
fn effective_window(
    since: Option<NaiveDate>,
    until: Option<NaiveDate>,
    today: NaiveDate,
) -> (NaiveDate, NaiveDate) {
    let until = until.unwrap_or(today);
    let since = since.unwrap_or_else(|| until - Duration::days(DEFAULT_WINDOW_DAYS));
    if until - since >= Duration::days(MAX_WINDOW_DAYS) {
        let clamped = until - Duration::days(DEFAULT_WINDOW_DAYS);
        tracing::warn!(
            %since,
            %until,
            %clamped,
            "insight window exceeds the maximum span, clamping start date"
        );
        (clamped, until)
    } else {
        (since, until)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn entry(json: serde_json::Value) -> InsightEntry {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn normalize_keeps_series_under_values() {
        let map = normalize_entries(vec![entry(serde_json::json!({
            "name": "reach",
            "period": "day",
            "values": [{ "value": 10, "end_time": "2025-06-01T07:00:00+0000" }]
        }))]);
        let MetricValue::Series(samples) = &map["reach"] else {
            panic!("reach should normalize to a series");
        };
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].value, serde_json::json!(10));
    }

    #[test]
    fn normalize_keeps_scalar_under_value() {
        let map = normalize_entries(vec![entry(serde_json::json!({
            "name": "follower_count",
            "value": 42
        }))]);
        assert_eq!(
            map["follower_count"],
            MetricValue::Scalar(serde_json::Number::from(42))
        );
    }

    #[test]
    fn normalize_prefers_values_over_value() {
        let map = normalize_entries(vec![entry(serde_json::json!({
            "name": "reach",
            "values": [{ "value": 7 }],
            "value": 99
        }))]);
        assert!(
            matches!(&map["reach"], MetricValue::Series(samples) if samples.len() == 1),
            "values must win over value"
        );
    }

    #[test]
    fn normalize_skips_entries_with_no_usable_value() {
        let map = normalize_entries(vec![
            entry(serde_json::json!({ "name": "follower_demographics" })),
            entry(serde_json::json!({ "name": "odd_metric", "value": { "nested": true } })),
        ]);
        assert!(map.is_empty());
    }

    #[test]
    fn effective_window_defaults_to_seven_days_ending_today() {
        let today = date("2025-06-08");
        assert_eq!(
            effective_window(None, None, today),
            (date("2025-06-01"), today)
        );
    }

    #[test]
    fn effective_window_keeps_valid_range() {
        let since = date("2025-01-01");
        let until = date("2025-06-01");
        assert_eq!(
            effective_window(Some(since), Some(until), date("2025-06-08")),
            (since, until)
        );
    }

    #[test]
    fn effective_window_clamps_oversized_range() {
        // 882 days apart — the start date collapses to until - 7 days.
        let since = date("2023-01-01");
        let until = date("2025-06-01");
        assert_eq!(
            effective_window(Some(since), Some(until), date("2025-06-08")),
            (date("2025-05-25"), until)
        );
    }

    #[test]
    fn effective_window_clamps_at_exactly_max_span() {
        let until = date("2025-06-01");
        let since = until - Duration::days(MAX_WINDOW_DAYS);
        assert_eq!(
            effective_window(Some(since), Some(until), date("2025-06-08")),
            (date("2025-05-25"), until)
        );
    }
}
