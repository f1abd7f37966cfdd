use std::net::IpAddr;

use subscription::{
    AddressPolicy, AgentError, InterfaceName, InterfaceRecord, InterfaceSource, NetworkAddress,
};
use tracing::{debug, info, warn};

/// Picks the address advertised to the orchestrator.
#[derive(Debug, Clone)]
pub struct AddressResolver<S> {
    source: S,
    policy: AddressPolicy,
}

impl<S: InterfaceSource> AddressResolver<S> {
    /// Creates a resolver that takes the first reported address.
    pub fn new(source: S) -> Self {
        Self {
            source,
            policy: AddressPolicy::FirstReported,
        }
    }

    /// Replaces the selection policy.
    #[must_use]
    pub fn with_policy(mut self, policy: AddressPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Resolves the address bound to `interface`.
    ///
    /// With [`AddressPolicy::FirstReported`] the first address in OS order is
    /// returned, prefix notation stripped (`10.0.0.5/24` becomes `10.0.0.5`).
    ///
    /// # Errors
    ///
    /// - [`AgentError::InterfaceQuery`] if the interface table cannot be read.
    /// - [`AgentError::InterfaceNotFound`] if no interface has exactly this name.
    /// - [`AgentError::NoAddressBound`] if the interface has no parseable address.
    pub fn resolve(&self, interface: &InterfaceName) -> Result<NetworkAddress, AgentError> {
        info!(interface = %interface, "resolving interface address");

        let record = self
            .source
            .interfaces()?
            .into_iter()
            .find(|r| r.name == interface.as_str())
            .ok_or_else(|| AgentError::InterfaceNotFound {
                interface: interface.clone(),
            })?;

        debug!(interface = %interface, addresses = ?record.addresses, "found interface");

        let address = select(&record, self.policy).ok_or_else(|| {
            warn!(interface = %interface, "interface has no address bound");
            AgentError::NoAddressBound {
                interface: interface.clone(),
            }
        })?;

        info!(interface = %interface, %address, policy = ?self.policy, "resolved address");
        Ok(address)
    }
}

fn select(record: &InterfaceRecord, policy: AddressPolicy) -> Option<NetworkAddress> {
    let mut parsed = record.addresses.iter().filter_map(|raw| {
        let address = NetworkAddress::from_reported(raw);
        if address.is_none() {
            debug!(interface = %record.name, raw = %raw, "skipping unparseable address");
        }
        address
    });

    match policy {
        AddressPolicy::FirstReported => parsed.next(),
        AddressPolicy::PreferRoutableIpv4 => {
            let all: Vec<NetworkAddress> = parsed.collect();
            all.iter()
                .find(|a| is_routable_ipv4(a.ip()))
                .or_else(|| all.first())
                .cloned()
        }
    }
}

fn is_routable_ipv4(ip: IpAddr) -> bool {
    matches!(ip, IpAddr::V4(v4) if !v4.is_link_local() && !v4.is_unspecified())
}

// ---------------------------------------------------------------------------
// Fixed interface table
// ---------------------------------------------------------------------------

/// An interface table supplied up front instead of queried from the OS.
///
/// Used to exercise selection rules deterministically.
#[derive(Debug, Clone, Default)]
pub struct StaticInterfaces {
    records: Vec<InterfaceRecord>,
}

impl StaticInterfaces {
    /// Adds one interface with the given reported addresses.
    #[must_use]
    pub fn with<I, A>(mut self, name: &str, addresses: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        self.records.push(InterfaceRecord::new(name, addresses));
        self
    }
}

impl InterfaceSource for StaticInterfaces {
    fn interfaces(&self) -> Result<Vec<InterfaceRecord>, AgentError> {
        Ok(self.records.clone())
    }
}
