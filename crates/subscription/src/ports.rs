//! Port traits implemented by infrastructure crates.
//!
//! | Trait | Implemented by |
//! |-------|----------------|
//! | [`InterfaceSource`] | `netif::SystemInterfaces` |
//! | [`EventSubscriptions`] | `orchestrator::MarathonClient` |
//! | [`EventSink`] | `listener::LogSink`, `listener::ChannelSink`, `listener::BoundedChannelSink` |

use async_trait::async_trait;

use crate::{AgentError, CallbackUrl, Delivery, Subscriptions};

/// One host interface and the addresses bound to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceRecord {
    /// Interface name as reported by the OS.
    pub name: String,
    /// Bound addresses in OS-reported order, optionally in `addr/prefix` form.
    pub addresses: Vec<String>,
}

impl InterfaceRecord {
    /// Creates a record from a name and its reported addresses.
    pub fn new<I, S>(name: impl Into<String>, addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            addresses: addresses.into_iter().map(Into::into).collect(),
        }
    }
}

/// Read-only view of the host's network interfaces.
pub trait InterfaceSource: Send + Sync {
    /// Enumerates every interface on the host.
    ///
    /// # Errors
    ///
    /// [`AgentError::InterfaceQuery`] when the OS query fails.
    fn interfaces(&self) -> Result<Vec<InterfaceRecord>, AgentError>;
}

/// The orchestrator's event-subscription API.
///
/// Implementations issue create/destroy requests only; the remote side owns
/// the subscription records and their de-duplication.
#[async_trait]
pub trait EventSubscriptions: Send + Sync {
    /// Lists the callback URLs currently registered.
    async fn list_subscriptions(&self) -> Result<Subscriptions, AgentError>;

    /// Registers `url` as an event callback. Registering an already-registered
    /// URL must succeed when the remote accepts it.
    async fn register_callback(&self, url: &CallbackUrl) -> Result<(), AgentError>;

    /// Removes `url` from the event callbacks.
    async fn unregister_callback(&self, url: &CallbackUrl) -> Result<(), AgentError>;
}

/// Destination for decoded event deliveries.
///
/// Called concurrently from request handlers; implementations must not assume
/// any ordering between deliveries.
pub trait EventSink: Send + Sync + 'static {
    /// Accepts one decoded delivery.
    fn accept(&self, delivery: Delivery);
}
