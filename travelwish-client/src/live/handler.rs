//! Inbound event handling
//!
//! Decodes one stream frame and merges it into the view model. Malformed
//! frames are logged and dropped; they never touch the view.

use shared::BookingEvent;

use crate::view::BookingViewModel;

/// What a frame did to the view model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Replaced { count: usize },
    Inserted,
    Updated,
    /// Status update for a booking this page does not hold
    DroppedUnknownId,
    Ignored,
    Malformed,
}

pub fn apply_text(view: &mut BookingViewModel, text: &str) -> Applied {
    match BookingEvent::decode(text) {
        Ok(event) => apply_event(view, event),
        Err(e) => {
            tracing::warn!(error = %e, "Dropping malformed booking stream message");
            Applied::Malformed
        }
    }
}

pub fn apply_event(view: &mut BookingViewModel, event: BookingEvent) -> Applied {
    match event {
        BookingEvent::BookingsList(bookings) => {
            let count = bookings.len();
            view.replace_all(bookings);
            tracing::info!(count, "Booking snapshot received");
            Applied::Replaced { count }
        }
        BookingEvent::BookingReceived(booking) => {
            let booking_id = booking.id.clone();
            if view.upsert(booking) {
                tracing::info!(booking_id = %booking_id, "New booking received");
                Applied::Inserted
            } else {
                tracing::debug!(booking_id = %booking_id, "Booking re-sent, replaced");
                Applied::Updated
            }
        }
        BookingEvent::BookingStatusUpdate(booking) => {
            let booking_id = booking.id.clone();
            let status = booking.status;
            if view.replace_existing(booking) {
                tracing::info!(booking_id = %booking_id, status = %status, "Booking status updated");
                Applied::Updated
            } else {
                // Known limitation: updates for bookings missing from the last snapshot are lost
                tracing::debug!(booking_id = %booking_id, "Status update for unknown booking dropped");
                Applied::DroppedUnknownId
            }
        }
        BookingEvent::Unknown(kind) => {
            tracing::debug!(kind = %kind, "Ignoring unknown booking stream message");
            Applied::Ignored
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::tests::booking;
    use serde_json::json;
    use shared::BookingStatus;

    fn seeded() -> BookingViewModel {
        let mut view = BookingViewModel::new();
        view.replace_all(vec![
            booking("a", BookingStatus::Pending, 9),
            booking("b", BookingStatus::Pending, 10),
        ]);
        view
    }

    fn frame(kind: &str, field: &str, booking: &shared::Booking) -> String {
        json!({ "type": kind, field: booking }).to_string()
    }

    #[test]
    fn test_snapshot_replaces_view() {
        let mut view = seeded();
        let text = json!({
            "type": "bookings_list",
            "bookings": [booking("c", BookingStatus::Confirmed, 8), booking("d", BookingStatus::Pending, 20)]
        })
        .to_string();

        assert_eq!(apply_text(&mut view, &text), Applied::Replaced { count: 2 });
        let ids: Vec<_> = view.bookings().iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["d", "c"]);
    }

    #[test]
    fn test_non_array_snapshot_leaves_view_unchanged() {
        let mut view = seeded();
        let before = view.bookings().to_vec();

        for text in [
            r#"{"type":"bookings_list","bookings":"nope"}"#,
            r#"{"type":"bookings_list","bookings":null}"#,
            r#"{"type":"bookings_list"}"#,
        ] {
            assert_eq!(apply_text(&mut view, text), Applied::Malformed);
        }
        assert_eq!(view.bookings(), before.as_slice());
    }

    #[test]
    fn test_status_update_changes_only_that_record() {
        let mut view = seeded();
        let before_b = view.get("b").cloned();

        let confirmed = booking("a", BookingStatus::Confirmed, 9);
        let text = frame("booking_status_update", "booking", &confirmed);
        assert_eq!(apply_text(&mut view, &text), Applied::Updated);

        assert_eq!(view.len(), 2);
        assert_eq!(view.get("a").unwrap().status, BookingStatus::Confirmed);
        assert_eq!(view.get("b").cloned(), before_b);
    }

    #[test]
    fn test_status_update_for_unknown_id_is_dropped() {
        let mut view = seeded();
        let before = view.bookings().to_vec();

        let ghost = booking("ghost", BookingStatus::Rejected, 9);
        let text = frame("booking_status_update", "booking", &ghost);
        assert_eq!(apply_text(&mut view, &text), Applied::DroppedUnknownId);
        assert_eq!(view.bookings(), before.as_slice());
    }

    #[test]
    fn test_booking_received_appends_then_replaces() {
        let mut view = seeded();
        let fresh = booking("c", BookingStatus::Pending, 11);
        let text = frame("booking_received", "booking", &fresh);

        assert_eq!(apply_text(&mut view, &text), Applied::Inserted);
        assert_eq!(apply_text(&mut view, &text), Applied::Updated);
        assert_eq!(view.len(), 3);
    }

    #[test]
    fn test_unknown_type_and_garbage_are_ignored() {
        let mut view = seeded();
        let before = view.bookings().to_vec();

        assert_eq!(apply_text(&mut view, r#"{"type":"presence","online":3}"#), Applied::Ignored);
        assert_eq!(apply_text(&mut view, "{{{"), Applied::Malformed);
        assert_eq!(
            apply_text(&mut view, r#"{"type":"booking_received","booking":{"id":1}}"#),
            Applied::Malformed
        );
        assert_eq!(view.bookings(), before.as_slice());
    }
}
