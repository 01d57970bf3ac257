//! Checkout lifecycle state.

use serde::{Deserialize, Serialize};

/// Checkout state machine.
///
/// `Idle -> Submitting -> (Succeeded | Failed) -> Idle`. The terminal states
/// are reported to subscribers and then the machine returns to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutState {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

impl CheckoutState {
    /// Whether a submission is in flight.
    #[must_use]
    pub const fn is_submitting(self) -> bool {
        matches!(self, Self::Submitting)
    }
}

impl std::fmt::Display for CheckoutState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Submitting => write!(f, "submitting"),
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed => write!(f, "failed"),
        }
    }
}
