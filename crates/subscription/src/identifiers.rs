//! Newtype identifiers.
//!
//! Every concept that has an identity is represented as a distinct newtype
//! wrapping a primitive. This prevents accidentally interchanging an
//! [`InterfaceName`] with a [`NetworkAddress`] even though both are strings
//! under the hood.

use std::net::IpAddr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ListenPort;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

string_id! {
    /// Name of a host network interface as reported by the OS (e.g. `"eth0"`).
    InterfaceName
}

// ---------------------------------------------------------------------------
// Network address
// ---------------------------------------------------------------------------

/// A bare IPv4 or IPv6 address literal resolved from a network interface.
///
/// Never carries a network-prefix suffix. Recomputed on every startup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NetworkAddress(IpAddr);

impl NetworkAddress {
    /// Parses an address as reported by the OS, dropping any `/prefix` suffix.
    ///
    /// `"10.0.0.5/24"` and `"10.0.0.5"` both yield `10.0.0.5`. Returns `None`
    /// when the remaining text is not an IP literal.
    pub fn from_reported(reported: &str) -> Option<Self> {
        let bare = match reported.split_once('/') {
            Some((address, _prefix)) => address,
            None => reported,
        };
        bare.trim().parse::<IpAddr>().ok().map(Self)
    }

    /// Returns the underlying [`IpAddr`].
    pub fn ip(&self) -> IpAddr {
        self.0
    }

    /// Returns the address in the form used as a URL host: IPv6 is bracketed.
    pub fn url_host(&self) -> String {
        match self.0 {
            IpAddr::V4(v4) => v4.to_string(),
            IpAddr::V6(v6) => format!("[{v6}]"),
        }
    }
}

impl std::fmt::Display for NetworkAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Callback URL
// ---------------------------------------------------------------------------

/// The webhook URL registered with the orchestrator.
///
/// Can only be built from a resolved [`NetworkAddress`], so a URL never exists
/// before address resolution succeeded. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallbackUrl(String);

impl CallbackUrl {
    /// Scheme used for every callback URL this agent registers.
    pub const SCHEME: &'static str = "http";

    /// Path the event listener serves and the orchestrator posts to.
    pub const PATH: &'static str = "/callback";

    /// Builds `scheme://address:port/path` from a resolved address.
    pub fn build(address: &NetworkAddress, port: ListenPort) -> Self {
        Self(format!(
            "{}://{}:{}{}",
            Self::SCHEME,
            address.url_host(),
            port,
            Self::PATH
        ))
    }

    /// Returns the URL as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CallbackUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl PartialEq<str> for CallbackUrl {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

// ---------------------------------------------------------------------------
// Delivery identifier
// ---------------------------------------------------------------------------

/// Identifies one inbound event delivery.
///
/// Generated fresh for every accepted request; propagated through log fields
/// so everything emitted for a single delivery can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeliveryId(Uuid);

impl DeliveryId {
    /// Generates a new random delivery identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for DeliveryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reported_address_drops_prefix() {
        let address = NetworkAddress::from_reported("10.0.0.5/24").expect("valid address");
        assert_eq!(address.to_string(), "10.0.0.5");
    }

    #[test]
    fn test_reported_address_without_prefix() {
        let address = NetworkAddress::from_reported("192.168.1.7").expect("valid address");
        assert_eq!(address.to_string(), "192.168.1.7");
    }

    #[test]
    fn test_reported_ipv6_address_drops_prefix() {
        let address = NetworkAddress::from_reported("fe80::1/64").expect("valid address");
        assert_eq!(address.to_string(), "fe80::1");
        assert_eq!(address.url_host(), "[fe80::1]");
    }

    #[test]
    fn test_reported_address_rejects_garbage() {
        assert!(NetworkAddress::from_reported("").is_none());
        assert!(NetworkAddress::from_reported("/24").is_none());
        assert!(NetworkAddress::from_reported("not-an-ip").is_none());
    }

    #[test]
    fn test_callback_url_from_ipv4() {
        let address = NetworkAddress::from_reported("10.0.0.5/24").unwrap();
        let url = CallbackUrl::build(&address, ListenPort::new(8080).unwrap());
        assert_eq!(url.as_str(), "http://10.0.0.5:8080/callback");
    }

    #[test]
    fn test_callback_url_brackets_ipv6() {
        let address = NetworkAddress::from_reported("fd00::5").unwrap();
        let url = CallbackUrl::build(&address, ListenPort::new(9000).unwrap());
        assert_eq!(url.as_str(), "http://[fd00::5]:9000/callback");
    }

    #[test]
    fn test_interface_name_rejects_empty() {
        assert!(InterfaceName::new("").is_none());
        assert_eq!(InterfaceName::new("eth0").unwrap().as_str(), "eth0");
    }
}
