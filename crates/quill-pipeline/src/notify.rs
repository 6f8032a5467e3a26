//! Fire-and-forget webhook sent after a successful publish.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use tokio::task::JoinHandle;

const NOTIFY_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedNotice {
    pub title: String,
    pub slug: String,
    pub commit_url: String,
}

/// Posts [`PublishedNotice`] to a webhook. A notifier without a URL does
/// nothing.
#[derive(Clone)]
pub struct Notifier {
    client: Client,
    url: Option<String>,
}

impl Notifier {
    /// # Errors
    ///
    /// Returns [`reqwest::Error`] if the HTTP client cannot be constructed.
    pub fn new(url: Option<String>) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(NOTIFY_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            url: url.filter(|u| !u.trim().is_empty()),
        })
    }

    #[must_use]
    pub fn disabled() -> Self {
        Self {
            client: Client::new(),
            url: None,
        }
    }

    /// Send `notice` in the background.
    ///
    /// Failures are logged and never reach the caller. The handle is only
    /// useful to tests that want to wait for delivery.
    pub fn notify_published(&self, notice: PublishedNotice) -> Option<JoinHandle<()>> {
        let url = self.url.clone()?;
        let client = self.client.clone();

        Some(tokio::spawn(async move {
            let result = client
                .post(&url)
                .json(&notice)
                .send()
                .await
                .and_then(reqwest::Response::error_for_status);
            match result {
                Ok(_) => tracing::debug!(slug = %notice.slug, "pipeline: publish notification sent"),
                Err(e) => tracing::warn!(
                    slug = %notice.slug,
                    error = %e.without_url(),
                    "pipeline: publish notification failed"
                ),
            }
        }))
    }
}
