//! Booking Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Booking status
///
/// `Pending` is the initial state. A provider moves a pending booking to
/// `Confirmed` or `Rejected`; `Cancelled` and `Completed` are set by other
/// flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    Rejected,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Rejected => "rejected",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, BookingStatus::Pending)
    }

    /// Statuses a provider may request for a pending booking
    pub fn is_provider_decision(&self) -> bool {
        matches!(self, BookingStatus::Confirmed | BookingStatus::Rejected)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown booking status: {0}")]
pub struct ParseStatusError(pub String);

impl FromStr for BookingStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" | "confirm" => Ok(BookingStatus::Confirmed),
            "rejected" | "reject" => Ok(BookingStatus::Rejected),
            "cancelled" | "canceled" => Ok(BookingStatus::Cancelled),
            "completed" => Ok(BookingStatus::Completed),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}

/// Restaurant booking entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub restaurant_id: String,
    /// Denormalized display name of the restaurant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restaurant_name: Option<String>,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub customer_email: String,
    /// The booked instant
    pub booking_date: DateTime<Utc>,
    #[serde(default)]
    pub guests: u32,
    #[serde(default)]
    pub table_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_request: Option<String>,
    #[serde(default)]
    pub status: BookingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Booking {
    pub fn is_pending(&self) -> bool {
        self.status.is_pending()
    }

    /// Display ordering: pending bookings first, then ascending booking instant.
    pub fn display_order(&self, other: &Self) -> Ordering {
        other
            .is_pending()
            .cmp(&self.is_pending())
            .then_with(|| self.booking_date.cmp(&other.booking_date))
    }
}

/// Create booking payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingCreate {
    pub restaurant_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restaurant_name: Option<String>,
    pub customer_name: String,
    pub customer_email: String,
    pub booking_date: DateTime<Utc>,
    pub guests: u32,
    pub table_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_request: Option<String>,
}

/// Update booking status payload
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BookingStatusUpdate {
    pub status: BookingStatus,
}
