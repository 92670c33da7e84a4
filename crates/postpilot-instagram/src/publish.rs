//! Media publish pipeline: container → publish → permalink.
//!
//! Each publish attempt walks three upstream calls in order and short-circuits
//! on the first failure. Only the publish step is retried (once, after a fixed
//! delay): a just-created container can take a moment to become publishable.
//! Container creation and permalink lookup are not retried — that asymmetry
//! mirrors observed upstream behaviour and is kept deliberately.
//!
//! There is no idempotency here: publishing the same request twice creates two
//! remote posts. At-most-once invocation is the persistence layer's job.

use crate::client::{parse, InstagramClient, API_VERSION};
use crate::error::{Endpoint, InstagramError};
use crate::retry::retry_after_delay;
use crate::types::{CreationResponse, PermalinkResponse, PublishResponse};

/// Extra attempts granted to the publish step on a transient failure.
pub(crate) const PUBLISH_RETRY_EXTRA_ATTEMPTS: u32 = 1;

/// Immutable input for one publish attempt.
#[derive(Debug, Clone)]
pub struct PublishRequest {
    pub image_url: String,
    pub caption: String,
    pub account_id: String,
    pub access_token: String,
}

/// Terminal result of a successful publish: the permanent media id and its
/// public permalink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedPost {
    pub media_id: String,
    pub permalink: String,
}

impl InstagramClient {
    /// Creates a staged media container for an image and caption.
    ///
    /// Returns the creation id used by
    /// [`InstagramClient::publish_container`]. Not retried.
    ///
    /// # Errors
    ///
    /// - [`InstagramError::Upstream`] with [`Endpoint::MediaContainer`] on a
    ///   non-2xx response.
    /// - [`InstagramError::Http`] on network failure.
    /// - [`InstagramError::Deserialize`] if the response shape is unexpected.
    pub async fn create_media_container(
        &self,
        image_url: &str,
        caption: &str,
        access_token: &str,
        account_id: &str,
    ) -> Result<String, InstagramError> {
        let url = self.graph_url(&format!("{API_VERSION}/{account_id}/media"), &[])?;
        let body = self
            .post_form(
                Endpoint::MediaContainer,
                url,
                &[
                    ("image_url", image_url),
                    ("caption", caption),
                    ("access_token", access_token),
                ],
            )
            .await?;
        let creation: CreationResponse = parse(Endpoint::MediaContainer, body)?;
        tracing::debug!(creation_id = %creation.id, "media container created");
        Ok(creation.id)
    }

    /// Publishes a staged container and returns the permanent media id.
    ///
    /// On a transient failure this step waits the client's fixed publish
    /// retry delay (2 s by default) and tries exactly once more; the second
    /// failure is surfaced as-is.
    ///
    /// # Errors
    ///
    /// - [`InstagramError::Upstream`] with [`Endpoint::MediaPublish`] when
    ///   both attempts are rejected.
    /// - [`InstagramError::Http`] on network failure of the final attempt.
    /// - [`InstagramError::Deserialize`] if the response shape is unexpected.
    pub async fn publish_container(
        &self,
        creation_id: &str,
        access_token: &str,
        account_id: &str,
    ) -> Result<String, InstagramError> {
        let url = self.graph_url(&format!("{API_VERSION}/{account_id}/media_publish"), &[])?;
        let media_id = retry_after_delay(
            PUBLISH_RETRY_EXTRA_ATTEMPTS,
            self.publish_retry_delay,
            || {
                let url = url.clone();
                async move {
                    let body = self
                        .post_form(
                            Endpoint::MediaPublish,
                            url,
                            &[("creation_id", creation_id), ("access_token", access_token)],
                        )
                        .await?;
                    let published: PublishResponse = parse(Endpoint::MediaPublish, body)?;
                    Ok(published.id)
                }
            },
        )
        .await?;
        tracing::info!(%media_id, "media published");
        Ok(media_id)
    }

    /// Resolves the public permalink of a published media object.
    ///
    /// Not retried. A failure here does not undo the publish: the post
    /// exists upstream without a locally known link and the caller must
    /// reconcile separately.
    ///
    /// # Errors
    ///
    /// - [`InstagramError::Upstream`] with [`Endpoint::PermalinkLookup`] on a
    ///   non-2xx response.
    /// - [`InstagramError::Http`] on network failure.
    /// - [`InstagramError::Deserialize`] if the response shape is unexpected.
    pub async fn resolve_permalink(
        &self,
        media_id: &str,
        access_token: &str,
    ) -> Result<String, InstagramError> {
        let url = self.graph_url(
            &format!("{API_VERSION}/{media_id}"),
            &[("fields", "permalink"), ("access_token", access_token)],
        )?;
        let body = self.get_json(Endpoint::PermalinkLookup, url).await?;
        let resolved: PermalinkResponse = parse(Endpoint::PermalinkLookup, body)?;
        Ok(resolved.permalink)
    }

    /// Runs the full pipeline: create a container, publish it, resolve the
    /// permalink. Short-circuits on the first failing step, so a container
    /// failure never triggers a publish call.
    ///
    /// # Errors
    ///
    /// The first error from
    /// [`InstagramClient::create_media_container`],
    /// [`InstagramClient::publish_container`], or
    /// [`InstagramClient::resolve_permalink`], unchanged.
    pub async fn publish(&self, request: &PublishRequest) -> Result<PublishedPost, InstagramError> {
        let creation_id = self
            .create_media_container(
                &request.image_url,
                &request.caption,
                &request.access_token,
                &request.account_id,
            )
            .await?;
        let media_id = self
            .publish_container(&creation_id, &request.access_token, &request.account_id)
            .await?;
        let permalink = self
            .resolve_permalink(&media_id, &request.access_token)
            .await?;
        tracing::info!(%media_id, %permalink, "post published");
        Ok(PublishedPost {
            media_id,
            permalink,
        })
    }
}
