//! eventsink orchestration layer.
//!
//! Sequences the address resolver, the orchestrator's subscription API, and
//! the webhook listener:
//!
//! ```text
//! Init ──► AddressResolved ──► SubscriptionVerified ──► CallbackRegistered ──► Listening
//!  │             │                     │                        │
//!  └─ resolve    └─ list subscriptions └─ register callback     └─ bind + serve
//! ```
//!
//! Every step depends on the output of the previous one, so startup is strictly
//! sequential. Any failure before `Listening` is returned to the caller without
//! retry. Once a callback is registered it is held as a [`Registration`] and
//! released on every exit path: shutdown, bind failure, or listener failure.
//!
//! ## Architectural Layer
//!
//! **Orchestration layer.** The driver sequences calls between the domain types
//! in [`subscription`] and the infrastructure crates. It contains no transport
//! code of its own.

mod agent;
mod lifecycle;
mod registrar;

pub use agent::Driver;
pub use lifecycle::StartupState;
pub use registrar::{Registration, SubscriptionRegistrar};
