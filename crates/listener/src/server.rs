use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::header::CONTENT_LENGTH;
use axum::http::{HeaderMap, Method, StatusCode};
use axum::routing::any;
use axum::Router;
use subscription::{
    AgentError, CallbackUrl, Delivery, EventPayload, EventSink, DEFAULT_MAX_BODY_BYTES,
};
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::body::{read_body, BodyError};

#[derive(Clone)]
struct ListenerState {
    sink: Arc<dyn EventSink>,
    max_body_bytes: usize,
}

/// Builder for the webhook HTTP server.
///
/// Every delivery that fits under the body cap is acknowledged with `200 OK`,
/// including ones that cannot be decoded. The orchestrator treats non-success
/// answers as a failing subscriber.
pub struct WebhookListener {
    sink: Arc<dyn EventSink>,
    max_body_bytes: usize,
}

impl WebhookListener {
    /// Creates a listener forwarding every decoded delivery to `sink`.
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self {
            sink,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    /// Caps the size of a single event body. Zero keeps the current cap.
    #[must_use]
    pub fn with_max_body_bytes(mut self, max: usize) -> Self {
        if max > 0 {
            self.max_body_bytes = max;
        }
        self
    }

    /// Builds the router: one path, any method.
    pub fn router(&self) -> Router {
        Router::new()
            .route(CallbackUrl::PATH, any(receive_event))
            .with_state(ListenerState {
                sink: Arc::clone(&self.sink),
                max_body_bytes: self.max_body_bytes,
            })
    }

    /// Binds the server socket without accepting connections yet.
    ///
    /// # Errors
    ///
    /// [`AgentError::ListenerBind`] if the socket cannot be bound.
    pub async fn bind(self, addr: SocketAddr) -> Result<BoundListener, AgentError> {
        let bind_error = |e: std::io::Error| AgentError::ListenerBind {
            address: addr.to_string(),
            message: e.to_string(),
        };

        let listener = TcpListener::bind(addr).await.map_err(bind_error)?;
        let local_addr = listener.local_addr().map_err(bind_error)?;
        info!(%local_addr, path = CallbackUrl::PATH, "event listener bound");

        Ok(BoundListener {
            listener,
            local_addr,
            router: self.router(),
        })
    }
}

/// A bound webhook server, ready to serve.
pub struct BoundListener {
    listener: TcpListener,
    local_addr: SocketAddr,
    router: Router,
}

impl BoundListener {
    /// The address actually bound (resolves port `0`).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Serves deliveries until `shutdown` completes, then drains in-flight
    /// requests and returns.
    ///
    /// # Errors
    ///
    /// [`AgentError::ListenerFailed`] if the server stops with an I/O error.
    pub async fn serve<F>(self, shutdown: F) -> Result<(), AgentError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        info!(local_addr = %self.local_addr, "listening for events");
        axum::serve(
            self.listener,
            self.router
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| AgentError::ListenerFailed {
            message: e.to_string(),
        })?;
        info!(local_addr = %self.local_addr, "event listener stopped");
        Ok(())
    }
}

async fn receive_event(
    State(state): State<ListenerState>,
    peer: Option<ConnectInfo<SocketAddr>>,
    method: Method,
    headers: HeaderMap,
    body: Body,
) -> StatusCode {
    let peer = peer.map(|ConnectInfo(addr)| addr);
    let declared = headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());

    let bytes = match read_body(body, declared, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(err @ BodyError::TooLarge { .. }) => {
            warn!(?peer, ?declared, error = %err, "rejecting oversized event body");
            return StatusCode::PAYLOAD_TOO_LARGE;
        }
        Err(err) => {
            warn!(?peer, error = %err, "failed to read event body");
            return StatusCode::OK;
        }
    };

    match EventPayload::decode(&bytes) {
        Ok(payload) => {
            let delivery = Delivery::received(payload, peer);
            debug!(
                delivery_id = %delivery.id,
                %method,
                ?peer,
                bytes = bytes.len(),
                "decoded event delivery"
            );
            state.sink.accept(delivery);
            StatusCode::OK
        }
        Err(e) => {
            let err = AgentError::PayloadDecodeFailure {
                message: e.to_string(),
            };
            error!(
                label = err.as_label(),
                error = %err,
                %method,
                ?peer,
                bytes = bytes.len(),
                "failed to decode event payload"
            );
            StatusCode::OK
        }
    }
}
