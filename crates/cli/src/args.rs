//! Command-line flags and their conversion into an [`AgentConfig`].

use clap::{Parser, ValueEnum};
use subscription::{AddressPolicy, AgentConfig, AgentError, DEFAULT_MAX_BODY_BYTES};

/// Subscribes to Marathon's event bus and logs every event it pushes.
#[derive(Debug, Parser)]
#[command(name = "eventsink", version)]
pub struct Args {
    /// The endpoint URL for Marathon.
    #[arg(long = "marathon", default_value = "http://localhost:8080")]
    pub marathon: String,

    /// The interface whose address is registered as the callback and bound.
    #[arg(long, default_value = "eth0")]
    pub interface: String,

    /// The port to listen on for events.
    #[arg(long, default_value_t = 8080)]
    pub port: u16,

    /// Which of the interface's addresses to use.
    #[arg(long, value_enum, default_value_t = AddressPolicyArg::First)]
    pub address_policy: AddressPolicyArg,

    /// Largest event body accepted, in bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_BODY_BYTES)]
    pub max_body_bytes: usize,

    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// Export spans to this OTLP/gRPC collector (e.g. `http://localhost:4317`).
    #[arg(long)]
    pub otlp_endpoint: Option<String>,
}

/// Address selection, as spelled on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AddressPolicyArg {
    /// First address as reported by the OS.
    First,
    /// First non-link-local IPv4 address, else the first address.
    PreferIpv4,
}

impl From<AddressPolicyArg> for AddressPolicy {
    fn from(arg: AddressPolicyArg) -> Self {
        match arg {
            AddressPolicyArg::First => AddressPolicy::FirstReported,
            AddressPolicyArg::PreferIpv4 => AddressPolicy::PreferRoutableIpv4,
        }
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    Pretty,
    /// One JSON object per line.
    Json,
}

impl Args {
    /// Validates the flags into the immutable runtime configuration.
    pub fn agent_config(&self) -> Result<AgentConfig, AgentError> {
        Ok(
            AgentConfig::new(Some(&self.marathon), Some(&self.interface), self.port)?
                .with_address_policy(self.address_policy.into())
                .with_max_body_bytes(self.max_body_bytes),
        )
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_command_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["eventsink"]).unwrap();
        let config = args.agent_config().unwrap();

        assert_eq!(config.orchestrator_endpoint(), "http://localhost:8080");
        assert_eq!(config.interface().as_str(), "eth0");
        assert_eq!(config.port().as_u16(), 8080);
        assert_eq!(config.address_policy(), AddressPolicy::FirstReported);
        assert_eq!(args.log_format, LogFormat::Pretty);
        assert!(args.otlp_endpoint.is_none());
    }

    #[test]
    fn test_overrides() {
        let args = Args::try_parse_from([
            "eventsink",
            "--marathon",
            "http://marathon.mesos:8080",
            "--interface",
            "ens3",
            "--port",
            "9090",
            "--address-policy",
            "prefer-ipv4",
            "--log-format",
            "json",
        ])
        .unwrap();
        let config = args.agent_config().unwrap();

        assert_eq!(config.orchestrator_endpoint(), "http://marathon.mesos:8080");
        assert_eq!(config.interface().as_str(), "ens3");
        assert_eq!(config.port().as_u16(), 9090);
        assert_eq!(config.address_policy(), AddressPolicy::PreferRoutableIpv4);
        assert_eq!(args.log_format, LogFormat::Json);
    }

    #[test]
    fn test_empty_marathon_endpoint_is_missing_configuration() {
        let args = Args::try_parse_from(["eventsink", "--marathon", ""]).unwrap();
        let err = args.agent_config().unwrap_err();
        assert_eq!(err.as_label(), "configuration_missing");
    }

    #[test]
    fn test_port_must_be_a_number() {
        assert!(Args::try_parse_from(["eventsink", "--port", "http"]).is_err());
    }
}
