//! Booking event-stream protocol
//!
//! JSON text frames exchanged over the booking WebSocket, discriminated by
//! a `type` field.
//!
//! Client → Server: `get_bookings`, `update_booking_status`
//! Server → Client: `bookings_list`, `booking_received`, `booking_status_update`

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::models::{Booking, BookingStatus};

pub const BOOKINGS_LIST: &str = "bookings_list";
pub const BOOKING_RECEIVED: &str = "booking_received";
pub const BOOKING_STATUS_UPDATE: &str = "booking_status_update";

/// Client → Server command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BookingCommand {
    /// Ask for a full snapshot of the provider's bookings
    GetBookings,
    /// Ask the server to change a booking's status
    UpdateBookingStatus { data: StatusChange },
}

impl BookingCommand {
    pub fn update_status(booking_id: impl Into<String>, status: BookingStatus) -> Self {
        BookingCommand::UpdateBookingStatus {
            data: StatusChange {
                booking_id: booking_id.into(),
                status,
            },
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
    pub booking_id: String,
    pub status: BookingStatus,
}

/// Server → Client event
#[derive(Debug, Clone, PartialEq)]
pub enum BookingEvent {
    /// Full replacement snapshot
    BookingsList(Vec<Booking>),
    /// A booking was created
    BookingReceived(Booking),
    /// An existing booking changed status
    BookingStatusUpdate(Booking),
    /// A message type this client does not know about
    Unknown(String),
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("message has no string `type` field")]
    MissingType,

    #[error("malformed {kind} payload: {reason}")]
    Malformed { kind: &'static str, reason: String },
}

impl BookingEvent {
    /// Decode one text frame.
    ///
    /// The frame is parsed as a JSON value first so that a bad payload for a
    /// known type and an unknown type can be told apart.
    pub fn decode(text: &str) -> Result<Self, DecodeError> {
        let value: Value = serde_json::from_str(text)?;
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or(DecodeError::MissingType)?;

        match kind {
            BOOKINGS_LIST => {
                let bookings = value
                    .get("bookings")
                    .filter(|b| b.is_array())
                    .ok_or_else(|| DecodeError::Malformed {
                        kind: BOOKINGS_LIST,
                        reason: "`bookings` is missing or not an array".to_string(),
                    })?;
                let bookings =
                    Vec::<Booking>::deserialize(bookings).map_err(|e| DecodeError::Malformed {
                        kind: BOOKINGS_LIST,
                        reason: e.to_string(),
                    })?;
                Ok(BookingEvent::BookingsList(bookings))
            }
            BOOKING_RECEIVED => Ok(BookingEvent::BookingReceived(single_booking(
                &value,
                BOOKING_RECEIVED,
            )?)),
            BOOKING_STATUS_UPDATE => Ok(BookingEvent::BookingStatusUpdate(single_booking(
                &value,
                BOOKING_STATUS_UPDATE,
            )?)),
            other => Ok(BookingEvent::Unknown(other.to_string())),
        }
    }

    /// Wire name of the event
    pub fn kind(&self) -> &str {
        match self {
            BookingEvent::BookingsList(_) => BOOKINGS_LIST,
            BookingEvent::BookingReceived(_) => BOOKING_RECEIVED,
            BookingEvent::BookingStatusUpdate(_) => BOOKING_STATUS_UPDATE,
            BookingEvent::Unknown(kind) => kind.as_str(),
        }
    }
}

/// Single-booking events carry the record in `booking`; older servers use `data`.
fn single_booking(value: &Value, kind: &'static str) -> Result<Booking, DecodeError> {
    let payload = value
        .get("booking")
        .or_else(|| value.get("data"))
        .ok_or_else(|| DecodeError::Malformed {
            kind,
            reason: "no `booking` field".to_string(),
        })?;
    Booking::deserialize(payload).map_err(|e| DecodeError::Malformed {
        kind,
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn booking_json(id: &str, status: &str) -> Value {
        json!({
            "_id": id,
            "restaurantId": "r1",
            "customerName": "Ana",
            "customerEmail": "ana@example.com",
            "bookingDate": "2025-06-01T19:30:00Z",
            "guests": 2,
            "tableType": "indoor",
            "status": status
        })
    }

    #[test]
    fn test_get_bookings_shape() {
        let json = BookingCommand::GetBookings.to_json().unwrap();
        assert_eq!(json, r#"{"type":"get_bookings"}"#);
    }

    #[test]
    fn test_update_status_shape() {
        let cmd = BookingCommand::update_status("b1", BookingStatus::Rejected);
        let value: Value = serde_json::from_str(&cmd.to_json().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "update_booking_status",
                "data": { "bookingId": "b1", "status": "rejected" }
            })
        );
    }

    #[test]
    fn test_decode_bookings_list() {
        let text = json!({
            "type": "bookings_list",
            "bookings": [booking_json("a", "pending"), booking_json("b", "confirmed")]
        })
        .to_string();
        match BookingEvent::decode(&text).unwrap() {
            BookingEvent::BookingsList(bookings) => {
                assert_eq!(bookings.len(), 2);
                assert_eq!(bookings[1].status, BookingStatus::Confirmed);
            }
            other => panic!("Expected BookingsList, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_bookings_list_rejects_non_array() {
        let text = r#"{"type":"bookings_list","bookings":{"a":1}}"#;
        let err = BookingEvent::decode(text).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::Malformed {
                kind: BOOKINGS_LIST,
                ..
            }
        ));

        let text = r#"{"type":"bookings_list"}"#;
        assert!(BookingEvent::decode(text).is_err());
    }

    #[test]
    fn test_decode_single_booking_accepts_data_alias() {
        let text = json!({ "type": "booking_status_update", "data": booking_json("a", "confirmed") })
            .to_string();
        match BookingEvent::decode(&text).unwrap() {
            BookingEvent::BookingStatusUpdate(b) => assert_eq!(b.id, "a"),
            other => panic!("Expected BookingStatusUpdate, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_unknown_type() {
        let event = BookingEvent::decode(r#"{"type":"typing","who":"x"}"#).unwrap();
        assert_eq!(event, BookingEvent::Unknown("typing".to_string()));
        assert_eq!(event.kind(), "typing");
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            BookingEvent::decode("not json"),
            Err(DecodeError::Json(_))
        ));
        assert!(matches!(
            BookingEvent::decode(r#"{"kind":"bookings_list"}"#),
            Err(DecodeError::MissingType)
        ));
    }
}
