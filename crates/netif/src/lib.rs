//! eventsink address resolver.
//!
//! Finds the address this agent advertises to the orchestrator by looking up a
//! named host interface and taking one of the addresses bound to it.
//!
//! - [`SystemInterfaces`] implements [`subscription::InterfaceSource`] over the
//!   OS interface table (`getifaddrs` on Unix) via `network-interface`.
//! - [`AddressResolver`] applies the selection rules on top of any source.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** OS queries live here. The resolver itself is a pure
//! function of the interface table it is given, so it is tested against
//! [`StaticInterfaces`] rather than the host.

mod resolver;
mod system;

pub use resolver::{AddressResolver, StaticInterfaces};
pub use system::SystemInterfaces;
