use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use futures::FutureExt;
use listener::WebhookListener;
use netif::AddressResolver;
use subscription::{AgentConfig, AgentError, EventSink, EventSubscriptions, InterfaceSource};
use tokio::sync::watch;
use tracing::{error, info};

use crate::{StartupState, SubscriptionRegistrar};

/// Runs the startup sequence and then the listener until shutdown.
pub struct Driver<S> {
    config: AgentConfig,
    resolver: AddressResolver<S>,
    registrar: SubscriptionRegistrar,
    sink: Arc<dyn EventSink>,
    state: watch::Sender<StartupState>,
}

impl<S: InterfaceSource> Driver<S> {
    /// Wires the collaborators. The resolver uses the configured address policy.
    pub fn new(
        config: AgentConfig,
        interfaces: S,
        remote: Arc<dyn EventSubscriptions>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        let resolver = AddressResolver::new(interfaces).with_policy(config.address_policy());
        let (state, _) = watch::channel(StartupState::Init);
        Self {
            config,
            resolver,
            registrar: SubscriptionRegistrar::new(remote),
            sink,
            state,
        }
    }

    /// Observes startup progress.
    pub fn subscribe_state(&self) -> watch::Receiver<StartupState> {
        self.state.subscribe()
    }

    /// The state most recently reached.
    pub fn state(&self) -> StartupState {
        *self.state.borrow()
    }

    /// Resolves, verifies, registers, then serves until `shutdown` completes.
    ///
    /// `shutdown` is observed from the start: if it completes while the
    /// subscription is being listed, `run` returns without registering. If it
    /// completes while the callback is being registered, the registration is
    /// released instead of serving. Once registered, the callback is released
    /// before returning on every path.
    ///
    /// # Errors
    ///
    /// The first [`AgentError`] hit during startup, or
    /// [`AgentError::ListenerFailed`] if serving stops with an I/O error.
    pub async fn run<F>(&self, shutdown: F) -> Result<(), AgentError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let shutdown = shutdown.shared();

        let interface = self.config.interface();
        let address = self.resolver.resolve(interface)?;
        self.enter(StartupState::AddressResolved);

        let subscriptions = tokio::select! {
            biased;
            () = shutdown.clone() => {
                info!("shutdown requested before registration");
                return Ok(());
            }
            listed = self.registrar.list_subscriptions() => listed?,
        };
        self.enter(StartupState::SubscriptionVerified);

        let callback = SubscriptionRegistrar::callback_url(&address, self.config.port());
        if subscriptions.contains(&callback) {
            info!(%callback, "callback already subscribed; registering again");
        }
        // Not raced against shutdown; a callback the remote may already hold
        // has to be released.
        let registration = self.registrar.register(callback).await?;
        self.enter(StartupState::CallbackRegistered);

        if shutdown.clone().now_or_never().is_some() {
            info!(callback = %registration.url(), "shutdown requested during registration; releasing subscription");
            registration.release().await;
            return Ok(());
        }

        let bind_addr = SocketAddr::new(address.ip(), self.config.port().as_u16());
        let bound = match WebhookListener::new(Arc::clone(&self.sink))
            .with_max_body_bytes(self.config.max_body_bytes())
            .bind(bind_addr)
            .await
        {
            Ok(bound) => bound,
            Err(err) => {
                error!(label = err.as_label(), error = %err, "cannot start listener; releasing subscription");
                registration.release().await;
                return Err(err);
            }
        };
        self.enter(StartupState::Listening);

        let served = bound.serve(shutdown).await;
        if let Err(err) = &served {
            error!(label = err.as_label(), error = %err, "event listener failed");
        }

        info!(callback = %registration.url(), "releasing subscription");
        registration.release().await;
        served
    }

    fn enter(&self, next: StartupState) {
        info!(state = %next, "startup state reached");
        self.state.send_replace(next);
    }
}
