//! Core domain for eventsink.
//!
//! This crate contains every domain concept, newtype identifier, shared value
//! type, and error type used by the event-subscription lifecycle. Infrastructure
//! crates implement the port traits defined here; they never add domain rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; infrastructure crates define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`InterfaceName`, `NetworkAddress`, `CallbackUrl`, `DeliveryId`) |
//! | [`types`] | Value types (`ListenPort`, `EventPayload`, `Delivery`, `Subscriptions`, `Timestamp`) |
//! | [`config`] | The immutable [`AgentConfig`] built once at startup |
//! | [`errors`] | The [`AgentError`] taxonomy |
//! | [`ports`] | Traits implemented by infrastructure crates |

pub mod config;
pub mod errors;
pub mod identifiers;
pub mod ports;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use config::{AddressPolicy, AgentConfig, DEFAULT_MAX_BODY_BYTES};
pub use errors::{AgentError, RemoteOperation};
pub use identifiers::{CallbackUrl, DeliveryId, InterfaceName, NetworkAddress};
pub use ports::{EventSink, EventSubscriptions, InterfaceRecord, InterfaceSource};
pub use types::{Delivery, EventPayload, ListenPort, Subscriptions, Timestamp};
