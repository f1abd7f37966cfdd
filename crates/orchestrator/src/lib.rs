//! eventsink orchestrator adapter.
//!
//! Implements the [`subscription::EventSubscriptions`] trait against
//! Marathon's event-subscription resource:
//!
//! | Operation | Request |
//! |-----------|---------|
//! | list | `GET {endpoint}/v2/eventSubscriptions` → `{"callbackUrls": [...]}` |
//! | register | `POST {endpoint}/v2/eventSubscriptions?callbackUrl=<url>` |
//! | unregister | `DELETE {endpoint}/v2/eventSubscriptions?callbackUrl=<url>` |
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** This crate must not contain domain rules. HTTP transport,
//! timeouts, and status interpretation live here; the rest of the workspace
//! sees only [`subscription::EventSubscriptions`] and [`subscription::AgentError`].
//!
//! Any `2xx` response is success. Marathon answers a duplicate registration
//! with `200`, which keeps registration idempotent for callers. Every other
//! outcome (connection failure, timeout, non-success status, undecodable list
//! body) maps to [`subscription::AgentError::RemoteUnreachable`]. No retries are
//! attempted.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, Response, Url};
use subscription::{AgentError, CallbackUrl, EventSubscriptions, RemoteOperation, Subscriptions};
use tracing::{debug, info, instrument};

/// Path of the subscription resource, relative to the endpoint.
const SUBSCRIPTIONS_PATH: &str = "v2/eventSubscriptions";

/// Longest slice of an error response body echoed into an error message.
const MAX_ERROR_BODY: usize = 256;

/// Marathon REST client for event subscriptions.
#[derive(Debug, Clone)]
pub struct MarathonClient {
    http: Client,
    subscriptions_url: Url,
}

impl MarathonClient {
    /// Per-request timeout applied by [`MarathonClient::new`].
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a client for the Marathon API rooted at `endpoint`.
    ///
    /// # Errors
    ///
    /// [`AgentError::InvalidConfiguration`] if `endpoint` is not an absolute
    /// `http`/`https` URL or the HTTP client cannot be constructed.
    pub fn new(endpoint: &str) -> Result<Self, AgentError> {
        Self::with_timeout(endpoint, Self::DEFAULT_TIMEOUT)
    }

    /// Creates a client with an explicit per-request timeout.
    pub fn with_timeout(endpoint: &str, timeout: Duration) -> Result<Self, AgentError> {
        let base = parse_endpoint(endpoint)?;
        let subscriptions_url =
            base.join(SUBSCRIPTIONS_PATH)
                .map_err(|e| AgentError::InvalidConfiguration {
                    message: format!("cannot derive subscriptions URL from '{endpoint}': {e}"),
                })?;

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("eventsink/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AgentError::InvalidConfiguration {
                message: format!("cannot build HTTP client: {e}"),
            })?;

        Ok(Self {
            http,
            subscriptions_url,
        })
    }

    /// The fully-qualified subscription resource URL.
    pub fn subscriptions_url(&self) -> &Url {
        &self.subscriptions_url
    }
}

#[async_trait]
impl EventSubscriptions for MarathonClient {
    #[instrument(skip(self), fields(url = %self.subscriptions_url))]
    async fn list_subscriptions(&self) -> Result<Subscriptions, AgentError> {
        let op = RemoteOperation::ListSubscriptions;
        let response = self
            .http
            .get(self.subscriptions_url.clone())
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| transport_error(op, e))?;

        let body = success_body(op, response).await?;
        let subscriptions: Subscriptions = serde_json::from_str(&body)
            .map_err(|e| AgentError::remote(op, format!("undecodable response: {e}")))?;

        debug!(count = subscriptions.len(), "listed event subscriptions");
        Ok(subscriptions)
    }

    #[instrument(skip(self, url), fields(callback = %url))]
    async fn register_callback(&self, url: &CallbackUrl) -> Result<(), AgentError> {
        let op = RemoteOperation::RegisterCallback;
        let response = self
            .http
            .post(self.subscriptions_url.clone())
            .query(&[("callbackUrl", url.as_str())])
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| transport_error(op, e))?;

        success_body(op, response).await?;
        info!("registered event callback");
        Ok(())
    }

    #[instrument(skip(self, url), fields(callback = %url))]
    async fn unregister_callback(&self, url: &CallbackUrl) -> Result<(), AgentError> {
        let op = RemoteOperation::UnregisterCallback;
        let response = self
            .http
            .delete(self.subscriptions_url.clone())
            .query(&[("callbackUrl", url.as_str())])
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| transport_error(op, e))?;

        success_body(op, response).await?;
        info!("unregistered event callback");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_endpoint(endpoint: &str) -> Result<Url, AgentError> {
    let mut url = Url::parse(endpoint.trim()).map_err(|e| AgentError::InvalidConfiguration {
        message: format!("orchestrator endpoint '{endpoint}' is not a valid URL: {e}"),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(AgentError::InvalidConfiguration {
            message: format!(
                "orchestrator endpoint '{endpoint}' must use http or https, not '{}'",
                url.scheme()
            ),
        });
    }

    // Url::join replaces the last path segment unless the base ends in '/'.
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

fn transport_error(op: RemoteOperation, err: reqwest::Error) -> AgentError {
    let detail = if err.is_timeout() {
        format!("request timed out: {err}")
    } else if err.is_connect() {
        format!("connection failed: {err}")
    } else {
        err.to_string()
    };
    AgentError::remote(op, detail)
}

/// Returns the body of a `2xx` response, or a [`AgentError::RemoteUnreachable`]
/// naming the status and the start of the body.
async fn success_body(op: RemoteOperation, response: Response) -> Result<String, AgentError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| transport_error(op, e))?;

    if status.is_success() {
        return Ok(body);
    }

    let snippet: String = body.chars().take(MAX_ERROR_BODY).collect();
    Err(AgentError::remote(op, format!("status {status}: {snippet}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscriptions_url_from_bare_host() {
        let client = MarathonClient::new("http://localhost:8080").unwrap();
        assert_eq!(
            client.subscriptions_url().as_str(),
            "http://localhost:8080/v2/eventSubscriptions"
        );
    }

    #[test]
    fn test_subscriptions_url_keeps_base_path() {
        let client = MarathonClient::new("https://mesos.example.com/marathon?x=1").unwrap();
        assert_eq!(
            client.subscriptions_url().as_str(),
            "https://mesos.example.com/marathon/v2/eventSubscriptions"
        );
    }

    #[test]
    fn test_rejects_relative_endpoint() {
        let err = MarathonClient::new("localhost:8080/v2").unwrap_err();
        assert!(matches!(err, AgentError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        let err = MarathonClient::new("ftp://localhost/").unwrap_err();
        assert!(matches!(err, AgentError::InvalidConfiguration { .. }));
    }
}
