//! Shared types for the Travelwish booking client
//!
//! Wire types exchanged with the Travelwish backend (bookings, event-stream
//! envelopes, the HTTP response envelope) and the multi-step form engine
//! used by the provider registration flows.

pub mod form;
pub mod message;
pub mod models;
pub mod response;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use message::{BookingCommand, BookingEvent, DecodeError, StatusChange};
pub use models::{Booking, BookingCreate, BookingStatus, ProviderId};
pub use response::ApiResponse;
