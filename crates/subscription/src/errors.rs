//! Error taxonomy for the subscription lifecycle.
//!
//! Every variant except [`AgentError::PayloadDecodeFailure`] is fatal during
//! startup: the process cannot do anything useful without a resolved address
//! and a registered callback. Decode failures are contained within the single
//! request that produced them.

use thiserror::Error;

use crate::InterfaceName;

// ---------------------------------------------------------------------------
// Remote operations
// ---------------------------------------------------------------------------

/// The three calls issued against the orchestrator's subscription API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteOperation {
    /// `listSubscriptions()`
    ListSubscriptions,
    /// `registerCallback(url)`
    RegisterCallback,
    /// `unregisterCallback(url)`
    UnregisterCallback,
}

impl std::fmt::Display for RemoteOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            RemoteOperation::ListSubscriptions => "list subscriptions",
            RemoteOperation::RegisterCallback => "register callback",
            RemoteOperation::UnregisterCallback => "unregister callback",
        })
    }
}

// ---------------------------------------------------------------------------
// Agent errors
// ---------------------------------------------------------------------------

/// Errors produced anywhere in the subscription lifecycle.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum AgentError {
    /// A required configuration value was not supplied.
    #[error("Configuration missing: {field} must be set")]
    ConfigurationMissing {
        /// Name of the missing setting.
        field: &'static str,
    },

    /// A configuration value was supplied but cannot be used.
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration {
        /// Description of the problem.
        message: String,
    },

    /// No host interface carries the requested name.
    #[error("Network interface '{interface}' not found")]
    InterfaceNotFound {
        /// The name that was looked up.
        interface: InterfaceName,
    },

    /// The interface exists but has no usable address bound to it.
    #[error("Network interface '{interface}' has no address bound")]
    NoAddressBound {
        /// The interface that was inspected.
        interface: InterfaceName,
    },

    /// The OS refused to enumerate network interfaces.
    #[error("Failed to enumerate network interfaces: {message}")]
    InterfaceQuery {
        /// Underlying OS error text.
        message: String,
    },

    /// A call to the orchestrator failed: connection error, timeout, non-success
    /// status, or an undecodable response.
    #[error("Orchestrator unreachable during {operation}: {message}")]
    RemoteUnreachable {
        /// Which call failed.
        operation: RemoteOperation,
        /// Detail of the failure.
        message: String,
    },

    /// An inbound event body was not a JSON object.
    #[error("Failed to decode event payload: {message}")]
    PayloadDecodeFailure {
        /// Decoder error text.
        message: String,
    },

    /// The event listener could not bind its socket.
    #[error("Failed to bind event listener on {address}: {message}")]
    ListenerBind {
        /// The socket address that was requested.
        address: String,
        /// Underlying I/O error text.
        message: String,
    },

    /// The event listener stopped with an I/O error while serving.
    #[error("Event listener failed: {message}")]
    ListenerFailed {
        /// Underlying I/O error text.
        message: String,
    },
}

impl AgentError {
    /// Convenience constructor for [`AgentError::RemoteUnreachable`].
    pub fn remote(operation: RemoteOperation, message: impl Into<String>) -> Self {
        AgentError::RemoteUnreachable {
            operation,
            message: message.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in log fields.
    pub fn as_label(&self) -> &'static str {
        match self {
            AgentError::ConfigurationMissing { .. } => "configuration_missing",
            AgentError::InvalidConfiguration { .. } => "invalid_configuration",
            AgentError::InterfaceNotFound { .. } => "interface_not_found",
            AgentError::NoAddressBound { .. } => "no_address_bound",
            AgentError::InterfaceQuery { .. } => "interface_query",
            AgentError::RemoteUnreachable { .. } => "remote_unreachable",
            AgentError::PayloadDecodeFailure { .. } => "payload_decode_failure",
            AgentError::ListenerBind { .. } => "listener_bind",
            AgentError::ListenerFailed { .. } => "listener_failed",
        }
    }

    /// Indicates whether the error must terminate the process.
    ///
    /// Only [`AgentError::PayloadDecodeFailure`] is recoverable; it is handled
    /// inside the request that produced it.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, AgentError::PayloadDecodeFailure { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_decode_failure_is_recoverable() {
        let decode = AgentError::PayloadDecodeFailure {
            message: "expected value".into(),
        };
        assert!(!decode.is_fatal());

        let missing = AgentError::InterfaceNotFound {
            interface: InterfaceName::new("nonexistent0").unwrap(),
        };
        assert!(missing.is_fatal());
        assert_eq!(missing.as_label(), "interface_not_found");
    }

    #[test]
    fn test_remote_error_names_operation() {
        let err = AgentError::remote(RemoteOperation::ListSubscriptions, "connection refused");
        assert_eq!(
            err.to_string(),
            "Orchestrator unreachable during list subscriptions: connection refused"
        );
    }
}
