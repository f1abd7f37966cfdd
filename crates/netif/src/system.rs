use std::net::IpAddr;

use network_interface::{Addr, NetworkInterface, NetworkInterfaceConfig};
use subscription::{AgentError, InterfaceRecord, InterfaceSource};
use tracing::trace;

/// The host's live interface table.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemInterfaces;

impl SystemInterfaces {
    /// Creates a source backed by the OS.
    pub fn new() -> Self {
        Self
    }
}

impl InterfaceSource for SystemInterfaces {
    fn interfaces(&self) -> Result<Vec<InterfaceRecord>, AgentError> {
        let interfaces = NetworkInterface::show().map_err(|e| AgentError::InterfaceQuery {
            message: e.to_string(),
        })?;

        Ok(interfaces
            .into_iter()
            .map(|iface| {
                let addresses: Vec<String> = iface.addr.iter().map(reported_form).collect();
                trace!(interface = %iface.name, ?addresses, "enumerated interface");
                InterfaceRecord::new(iface.name, addresses)
            })
            .collect())
    }
}

/// Renders an OS address as `addr/prefix`, or bare when no netmask is known.
fn reported_form(addr: &Addr) -> String {
    match addr.netmask() {
        Some(mask) => format!("{}/{}", addr.ip(), prefix_len(mask)),
        None => addr.ip().to_string(),
    }
}

fn prefix_len(mask: IpAddr) -> u32 {
    match mask {
        IpAddr::V4(m) => u32::from(m).count_ones(),
        IpAddr::V6(m) => u128::from(m).count_ones(),
    }
}
