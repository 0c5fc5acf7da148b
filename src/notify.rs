//! Webhook notification of run statistics.
//!
//! The report produced by [`RunStats::report`] is posted as
//! `{"content": "<report>"}`, the message shape Discord webhooks accept.
//! Delivery problems are reported to the caller, who logs them; by the time
//! the notifier runs every filesystem change has already been made.

use std::borrow::Cow;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::Serialize;
use thiserror::Error;

use crate::stats::RunStats;

/// Longest message the webhook accepts, in characters.
pub const MAX_MESSAGE_LEN: usize = 2000;

/// Appended to a message that had to be cut.
pub const TRUNCATION_MARKER: &str = "...";

/// Built-in webhook URL; delivery is skipped while it is still configured.
pub const PLACEHOLDER_WEBHOOK: &str = "https://your_webhook_address";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from webhook delivery.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The request could not be sent.
    #[error("failed to reach webhook {url}: {source}")]
    Request {
        /// Webhook URL
        url: String,
        /// The underlying transport error
        #[source]
        source: reqwest::Error,
    },

    /// The webhook answered with a non-success status.
    #[error("webhook returned {status} - {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, for diagnostics
        body: String,
    },
}

#[derive(Debug, Serialize)]
struct Payload<'a> {
    content: &'a str,
}

/// Cut `message` to at most `max_len` characters, ending in
/// [`TRUNCATION_MARKER`] when anything was removed.
///
/// ```
/// use comiclink::notify::truncate_message;
///
/// assert_eq!(truncate_message("short", 10), "short");
/// assert_eq!(truncate_message("0123456789abc", 10), "0123456...");
/// ```
#[must_use]
pub fn truncate_message(message: &str, max_len: usize) -> Cow<'_, str> {
    if message.chars().count() <= max_len {
        return Cow::Borrowed(message);
    }

    let keep = max_len.saturating_sub(TRUNCATION_MARKER.chars().count());
    let mut truncated: String = message.chars().take(keep).collect();
    truncated.push_str(TRUNCATION_MARKER);
    Cow::Owned(truncated)
}

/// Whether `url` is a real webhook rather than the shipped placeholder.
#[must_use]
pub fn is_configured(url: &str) -> bool {
    let url = url.trim();
    !url.is_empty() && url != PLACEHOLDER_WEBHOOK
}

/// Posts reports to a webhook.
#[derive(Debug, Clone)]
pub struct Notifier {
    client: Client,
    url: String,
}

impl Notifier {
    /// Create a notifier for `url`.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Client`] if the HTTP client cannot be built.
    pub fn new(url: impl Into<String>) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(NotifyError::Client)?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// Post `message`, truncated to [`MAX_MESSAGE_LEN`].
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError`] when the request fails or the response
    /// status is not 2xx.
    pub fn send(&self, message: &str) -> Result<(), NotifyError> {
        let content = truncate_message(message, MAX_MESSAGE_LEN);
        let payload = Payload { content: &content };

        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .map_err(|source| NotifyError::Request {
                url: self.url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(NotifyError::Status {
                status: status.as_u16(),
                body,
            });
        }

        log::debug!("Notification delivered ({})", status);
        Ok(())
    }

    /// Post the statistics report.
    ///
    /// # Errors
    ///
    /// See [`Notifier::send`].
    pub fn send_report(&self, stats: &RunStats) -> Result<(), NotifyError> {
        self.send(&stats.report())
    }
}
