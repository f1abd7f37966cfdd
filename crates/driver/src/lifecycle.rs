/// Startup progress of the agent.
///
/// States only move forward. The terminal success state is
/// [`StartupState::Listening`]; a failure leaves the driver in the last state
/// it reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StartupState {
    /// Nothing done yet.
    Init,
    /// The interface address is known.
    AddressResolved,
    /// The orchestrator answered the subscription listing.
    SubscriptionVerified,
    /// The callback URL is registered with the orchestrator.
    CallbackRegistered,
    /// The listener is bound and serving deliveries.
    Listening,
}

impl StartupState {
    /// Stable snake_case name for log fields.
    pub fn as_str(self) -> &'static str {
        match self {
            StartupState::Init => "init",
            StartupState::AddressResolved => "address_resolved",
            StartupState::SubscriptionVerified => "subscription_verified",
            StartupState::CallbackRegistered => "callback_registered",
            StartupState::Listening => "listening",
        }
    }
}

impl std::fmt::Display for StartupState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_states_are_ordered() {
        assert!(StartupState::Init < StartupState::AddressResolved);
        assert!(StartupState::CallbackRegistered < StartupState::Listening);
        assert_eq!(StartupState::SubscriptionVerified.to_string(), "subscription_verified");
    }
}
