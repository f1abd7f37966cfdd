//! Process-wide configuration, built once at startup and immutable afterwards.
//!
//! Components receive an [`AgentConfig`] (or the fields they need) explicitly;
//! nothing reads ambient global state.

use crate::{AgentError, InterfaceName, ListenPort};

/// Default cap on a single inbound event body (1 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// How the address resolver picks among several addresses bound to one interface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AddressPolicy {
    /// Take the first address exactly as the OS reports it.
    #[default]
    FirstReported,
    /// Take the first IPv4 address that is not link-local, falling back to the
    /// first reported address when none qualifies.
    PreferRoutableIpv4,
}

/// Validated agent configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentConfig {
    orchestrator_endpoint: String,
    interface: InterfaceName,
    port: ListenPort,
    address_policy: AddressPolicy,
    max_body_bytes: usize,
}

impl AgentConfig {
    /// Validates the three required settings.
    ///
    /// # Errors
    ///
    /// - [`AgentError::ConfigurationMissing`] when the endpoint or interface is
    ///   absent or blank.
    /// - [`AgentError::InvalidConfiguration`] when the port is zero.
    pub fn new(
        orchestrator_endpoint: Option<&str>,
        interface: Option<&str>,
        port: u16,
    ) -> Result<Self, AgentError> {
        let orchestrator_endpoint = orchestrator_endpoint
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(AgentError::ConfigurationMissing {
                field: "orchestrator endpoint",
            })?
            .to_string();

        let interface = interface
            .map(str::trim)
            .and_then(InterfaceName::new)
            .ok_or(AgentError::ConfigurationMissing { field: "interface" })?;

        let port = ListenPort::new(port).ok_or_else(|| AgentError::InvalidConfiguration {
            message: "listen port must be non-zero".to_string(),
        })?;

        Ok(Self {
            orchestrator_endpoint,
            interface,
            port,
            address_policy: AddressPolicy::default(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        })
    }

    /// Replaces the address selection policy.
    #[must_use]
    pub fn with_address_policy(mut self, policy: AddressPolicy) -> Self {
        self.address_policy = policy;
        self
    }

    /// Replaces the inbound body size cap. Zero is ignored.
    #[must_use]
    pub fn with_max_body_bytes(mut self, max: usize) -> Self {
        if max > 0 {
            self.max_body_bytes = max;
        }
        self
    }

    /// Base URL of the orchestrator API.
    pub fn orchestrator_endpoint(&self) -> &str {
        &self.orchestrator_endpoint
    }

    /// Interface whose address is advertised and bound.
    pub fn interface(&self) -> &InterfaceName {
        &self.interface
    }

    /// Port the listener binds and advertises.
    pub fn port(&self) -> ListenPort {
        self.port
    }

    /// Address selection policy.
    pub fn address_policy(&self) -> AddressPolicy {
        self.address_policy
    }

    /// Largest inbound body accepted, in bytes.
    pub fn max_body_bytes(&self) -> usize {
        self.max_body_bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_endpoint_is_reported() {
        let err = AgentConfig::new(None, Some("eth0"), 8080).unwrap_err();
        assert!(matches!(err, AgentError::ConfigurationMissing { .. }));

        let err = AgentConfig::new(Some("   "), Some("eth0"), 8080).unwrap_err();
        assert!(matches!(err, AgentError::ConfigurationMissing { .. }));
    }

    #[test]
    fn test_zero_port_is_invalid() {
        let err = AgentConfig::new(Some("http://localhost:8080"), Some("eth0"), 0).unwrap_err();
        assert!(matches!(err, AgentError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_defaults_and_overrides() {
        let config = AgentConfig::new(Some("http://localhost:8080"), Some("eth0"), 8080)
            .unwrap()
            .with_max_body_bytes(0);
        assert_eq!(config.address_policy(), AddressPolicy::FirstReported);
        assert_eq!(config.max_body_bytes(), DEFAULT_MAX_BODY_BYTES);
        assert_eq!(config.interface().as_str(), "eth0");

        let config = config
            .with_address_policy(AddressPolicy::PreferRoutableIpv4)
            .with_max_body_bytes(4096);
        assert_eq!(config.address_policy(), AddressPolicy::PreferRoutableIpv4);
        assert_eq!(config.max_body_bytes(), 4096);
    }
}
