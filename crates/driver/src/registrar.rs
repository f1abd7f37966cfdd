use std::sync::Arc;

use subscription::{
    AgentError, CallbackUrl, EventSubscriptions, ListenPort, NetworkAddress, Subscriptions,
};
use tracing::{error, info, warn};

/// Builds the callback URL and manages its subscription with the orchestrator.
#[derive(Clone)]
pub struct SubscriptionRegistrar {
    remote: Arc<dyn EventSubscriptions>,
}

impl SubscriptionRegistrar {
    /// Creates a registrar issuing requests through `remote`.
    pub fn new(remote: Arc<dyn EventSubscriptions>) -> Self {
        Self { remote }
    }

    /// Derives the callback URL advertised for `address` and `port`.
    pub fn callback_url(address: &NetworkAddress, port: ListenPort) -> CallbackUrl {
        CallbackUrl::build(address, port)
    }

    /// Lists the current subscriptions. Used as a reachability check.
    pub async fn list_subscriptions(&self) -> Result<Subscriptions, AgentError> {
        let subscriptions = self.remote.list_subscriptions().await?;
        info!(
            count = subscriptions.len(),
            callbacks = ?subscriptions.callback_urls,
            "current event subscriptions"
        );
        Ok(subscriptions)
    }

    /// Registers `url` and returns a handle that unregisters it on release.
    ///
    /// A URL that is already registered is accepted; de-duplication belongs to
    /// the orchestrator.
    pub async fn register(&self, url: CallbackUrl) -> Result<Registration, AgentError> {
        info!(callback = %url, "registering event callback");
        self.remote.register_callback(&url).await?;
        Ok(Registration {
            registrar: self.clone(),
            url,
            released: false,
        })
    }

    /// Unregisters `url`. Failures are logged and returned; callers treat them
    /// as non-fatal.
    pub async fn unregister(&self, url: &CallbackUrl) -> Result<(), AgentError> {
        info!(callback = %url, "unregistering event callback");
        self.remote.unregister_callback(url).await.inspect_err(|err| {
            error!(callback = %url, label = err.as_label(), error = %err, "failed to unregister event callback");
        })
    }
}

/// A callback registered with the orchestrator.
///
/// Call [`Registration::release`] on every exit path. Dropping the handle
/// without releasing it leaves the subscription in place and logs a warning.
pub struct Registration {
    registrar: SubscriptionRegistrar,
    url: CallbackUrl,
    released: bool,
}

impl Registration {
    /// The registered callback URL.
    pub fn url(&self) -> &CallbackUrl {
        &self.url
    }

    /// Unregisters the callback, best effort.
    pub async fn release(mut self) {
        self.released = true;
        // Logged by the registrar; nothing else to do with a failure here.
        let _ = self.registrar.unregister(&self.url).await;
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        if !self.released {
            warn!(callback = %self.url, "registration dropped without release; callback stays subscribed");
        }
    }
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("url", &self.url)
            .field("released", &self.released)
            .finish()
    }
}
