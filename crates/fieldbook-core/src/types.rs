//! Domain enums and value types without database dependencies.
//!
//! ## Summary
//! Each status enum owns its transition table so that every state change in
//! the service layer goes through an exhaustive `match`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Role of the authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Customer,
    Technician,
    Admin,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Technician => "technician",
            Self::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "customer" | "user" => Ok(Self::Customer),
            "technician" | "provider" => Ok(Self::Technician),
            "admin" => Ok(Self::Admin),
            other => Err(CoreError::InvalidInput(format!("unknown role '{other}'"))),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bookable state of a single slot within a schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    Available,
    Booked,
}

impl SlotStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Booked => "booked",
        }
    }

    /// ## Summary
    /// Validates a slot transition. A slot is reserved by promotion and may be
    /// released again only when cancellations are configured to free slots.
    ///
    /// ## Errors
    /// Returns `InvalidTransition` for a no-op transition.
    pub fn transition(self, to: Self) -> CoreResult<Self> {
        match (self, to) {
            (Self::Available, Self::Booked) | (Self::Booked, Self::Available) => Ok(to),
            (Self::Available, Self::Available) | (Self::Booked, Self::Booked) => {
                Err(CoreError::InvalidTransition {
                    from: self.as_str(),
                    to: to.as_str(),
                })
            }
        }
    }
}

impl fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of a customer's booking request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Booked,
    Cancelled,
}

impl RequestStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Booked => "booked",
            Self::Cancelled => "cancelled",
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        match self {
            Self::Pending => false,
            Self::Booked | Self::Cancelled => true,
        }
    }

    /// ## Errors
    /// Returns `InvalidTransition` unless moving out of `Pending`.
    pub fn transition(self, to: Self) -> CoreResult<Self> {
        match (self, to) {
            (Self::Pending, Self::Booked | Self::Cancelled) => Ok(to),
            (Self::Pending, Self::Pending) | (Self::Booked | Self::Cancelled, _) => {
                Err(CoreError::InvalidTransition {
                    from: self.as_str(),
                    to: to.as_str(),
                })
            }
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of a confirmed appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Confirmed,
    Completed,
    Cancelled,
}

impl BookingStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// ## Errors
    /// Returns `InvalidTransition` unless moving out of `Confirmed`.
    pub fn transition(self, to: Self) -> CoreResult<Self> {
        match (self, to) {
            (Self::Confirmed, Self::Completed | Self::Cancelled) => Ok(to),
            (Self::Confirmed, Self::Confirmed) | (Self::Completed | Self::Cancelled, _) => {
                Err(CoreError::InvalidTransition {
                    from: self.as_str(),
                    to: to.as_str(),
                })
            }
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the customer pays the technician.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMode {
    Cash,
    Online,
}

impl PaymentMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Online => "online",
        }
    }

    /// Status a freshly created payment starts in.
    #[must_use]
    pub const fn initial_status(self) -> PaymentStatus {
        match self {
            Self::Cash => PaymentStatus::Completed,
            Self::Online => PaymentStatus::Pending,
        }
    }
}

impl fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Completed,
}

impl PaymentStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Street address snapshot. Stored by value on schedules, requests and bookings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub line1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line2: Option<String>,
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub postal_code: String,
}

impl Address {
    /// ## Errors
    /// Returns a validation error when a required field is blank.
    pub fn validate(&self) -> CoreResult<()> {
        if self.line1.trim().is_empty() {
            return Err(CoreError::ValidationError(
                "address line1 is required".to_string(),
            ));
        }
        if self.city.trim().is_empty() {
            return Err(CoreError::ValidationError(
                "address city is required".to_string(),
            ));
        }
        Ok(())
    }
}
