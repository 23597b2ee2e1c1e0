//! Booking view model
//!
//! In-memory bookings of one page session, kept in display order:
//! pending first, then ascending booking instant. Ids are unique.

use chrono::Utc;
use shared::{Booking, BookingStatus};

#[derive(Debug, Clone, Default)]
pub struct BookingViewModel {
    bookings: Vec<Booking>,
}

impl BookingViewModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace everything with a snapshot. Duplicate ids in the snapshot
    /// collapse to the last occurrence.
    pub fn replace_all(&mut self, bookings: Vec<Booking>) {
        let mut deduped: Vec<Booking> = Vec::with_capacity(bookings.len());
        for booking in bookings {
            match deduped.iter_mut().find(|b| b.id == booking.id) {
                Some(existing) => *existing = booking,
                None => deduped.push(booking),
            }
        }
        self.bookings = deduped;
        self.sort();
    }

    /// Insert or replace by id. Returns `true` when the booking was new.
    pub fn upsert(&mut self, booking: Booking) -> bool {
        let inserted = match self.position(&booking.id) {
            Some(idx) => {
                self.bookings[idx] = booking;
                false
            }
            None => {
                self.bookings.push(booking);
                true
            }
        };
        self.sort();
        inserted
    }

    /// Replace a booking only if its id is already held.
    pub fn replace_existing(&mut self, booking: Booking) -> bool {
        match self.position(&booking.id) {
            Some(idx) => {
                self.bookings[idx] = booking;
                self.sort();
                true
            }
            None => false,
        }
    }

    /// Change only the status (and `updated_at`) of a held booking.
    /// Unknown ids are ignored.
    pub fn apply_status(&mut self, id: &str, status: BookingStatus) -> bool {
        let Some(idx) = self.position(id) else {
            return false;
        };
        let booking = &mut self.bookings[idx];
        booking.status = status;
        booking.updated_at = Some(Utc::now());
        self.sort();
        true
    }

    pub fn remove(&mut self, id: &str) -> Option<Booking> {
        self.position(id).map(|idx| self.bookings.remove(idx))
    }

    /// Drop everything that is no longer pending
    pub fn retain_pending(&mut self) {
        self.bookings.retain(Booking::is_pending);
    }

    pub fn get(&self, id: &str) -> Option<&Booking> {
        self.bookings.iter().find(|b| b.id == id)
    }

    /// All bookings in display order
    pub fn bookings(&self) -> &[Booking] {
        &self.bookings
    }

    pub fn pending(&self) -> impl Iterator<Item = &Booking> {
        self.bookings.iter().filter(|b| b.is_pending())
    }

    pub fn len(&self) -> usize {
        self.bookings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookings.is_empty()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.bookings.iter().position(|b| b.id == id)
    }

    fn sort(&mut self) {
        self.bookings.sort_by(Booking::display_order);
    }
}
