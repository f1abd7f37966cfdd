//! Shared value types for the subscription lifecycle.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! values with invariants (a listen port is never zero, a payload is always a
//! JSON object) and flow between the resolver, registrar, and listener.

use std::net::SocketAddr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{CallbackUrl, DeliveryId};

// ---------------------------------------------------------------------------
// Listen port
// ---------------------------------------------------------------------------

/// TCP port the event listener binds and advertises in the callback URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ListenPort(u16);

impl ListenPort {
    /// Creates a [`ListenPort`], returning `None` for port `0`.
    ///
    /// An ephemeral port cannot be advertised to the orchestrator before the
    /// listener has bound it, so zero is rejected.
    #[must_use]
    pub fn new(port: u16) -> Option<Self> {
        if port == 0 {
            None
        } else {
            Some(Self(port))
        }
    }

    /// Returns the port number.
    pub fn as_u16(self) -> u16 {
        self.0
    }
}

impl std::fmt::Display for ListenPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Event payload
// ---------------------------------------------------------------------------

/// A decoded event body: an open mapping from string keys to arbitrary JSON.
///
/// No schema is enforced. The only invariant is that the body was a JSON
/// object; scalars and arrays at the top level are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventPayload(Map<String, Value>);

impl EventPayload {
    /// Decodes a raw request body.
    pub fn decode(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice::<Map<String, Value>>(body).map(Self)
    }

    /// Returns the value stored under `key`, if any.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns the Marathon `eventType` field when it is a string.
    pub fn event_type(&self) -> Option<&str> {
        self.get("eventType").and_then(Value::as_str)
    }

    /// Returns the Marathon `appId` field when it is a string.
    pub fn app_id(&self) -> Option<&str> {
        self.get("appId").and_then(Value::as_str)
    }

    /// Returns the number of top-level keys.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the payload has no top-level keys.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for EventPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match serde_json::to_string(&self.0) {
            Ok(text) => f.write_str(&text),
            Err(_) => Err(std::fmt::Error),
        }
    }
}

// ---------------------------------------------------------------------------
// Delivery
// ---------------------------------------------------------------------------

/// One accepted inbound event, as handed to an [`crate::EventSink`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delivery {
    /// Correlation id for this delivery.
    pub id: DeliveryId,
    /// When the listener finished reading the body.
    pub received_at: Timestamp,
    /// Peer that posted the event, when the transport reports it.
    pub peer: Option<SocketAddr>,
    /// The decoded body.
    pub payload: EventPayload,
}

impl Delivery {
    /// Stamps a freshly decoded payload with a new id and the current time.
    pub fn received(payload: EventPayload, peer: Option<SocketAddr>) -> Self {
        Self {
            id: DeliveryId::new_random(),
            received_at: Timestamp::now(),
            peer,
            payload,
        }
    }
}

// ---------------------------------------------------------------------------
// Subscriptions
// ---------------------------------------------------------------------------

/// The set of callback URLs currently registered with the orchestrator.
///
/// Mirrors the body of Marathon's `GET /v2/eventSubscriptions`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscriptions {
    /// Registered callback URLs in the order the orchestrator returned them.
    #[serde(rename = "callbackUrls", default)]
    pub callback_urls: Vec<String>,
}

impl Subscriptions {
    /// Returns `true` if `url` is already registered.
    pub fn contains(&self, url: &CallbackUrl) -> bool {
        self.callback_urls.iter().any(|u| url == u.as_str())
    }

    /// Number of registered callbacks.
    pub fn len(&self) -> usize {
        self.callback_urls.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.callback_urls.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}
