//! Account kinds and their gating rules.

use serde::{Deserialize, Serialize};

/// The kind of account, fixed at creation.
///
/// The kind decides how an account enters the system:
/// - `Customer` accounts self-register and must verify their email with a
///   one-time code before they can log in.
/// - `Admin` accounts require the process-wide admin secret at creation and
///   are verified immediately.
/// - `Staff` accounts are operator-provisioned; they skip the OTP flow and
///   are verified immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    /// Privileged account; creation is gated by the admin secret.
    Admin,
    /// Self-service shopper account.
    #[default]
    Customer,
    /// Operator-provisioned back-office account.
    Staff,
}

impl UserType {
    /// Returns true for the privileged account kind.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Returns true if accounts of this kind start verified and never go
    /// through the OTP flow.
    #[must_use]
    pub const fn is_verified_at_creation(self) -> bool {
        !matches!(self, Self::Customer)
    }
}

impl std::fmt::Display for UserType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Customer => write!(f, "customer"),
            Self::Staff => write!(f, "staff"),
        }
    }
}

impl std::str::FromStr for UserType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "customer" => Ok(Self::Customer),
            "staff" => Ok(Self::Staff),
            _ => Err(format!("invalid user type: {s}")),
        }
    }
}
