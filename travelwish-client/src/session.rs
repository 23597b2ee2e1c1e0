//! Page scope
//!
//! A page owns its booking view model from mount to unmount. Async work
//! started by the page (stream callbacks, fetch results) may finish after
//! the page is gone; every such continuation goes through [`PageScope::update`],
//! which turns into a no-op once the scope has been unmounted.

use std::sync::Arc;

use parking_lot::Mutex;
use shared::Booking;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

use crate::view::BookingViewModel;

#[derive(Debug, Clone)]
pub struct PageScope {
    bookings: Arc<Mutex<BookingViewModel>>,
    token: CancellationToken,
}

impl PageScope {
    /// Mount a page with an empty view model
    pub fn mount() -> Self {
        Self {
            bookings: Arc::new(Mutex::new(BookingViewModel::new())),
            token: CancellationToken::new(),
        }
    }

    pub fn is_mounted(&self) -> bool {
        !self.token.is_cancelled()
    }

    /// Unmount the page. Open streams tied to it close; pending results are discarded.
    pub fn unmount(&self) {
        if self.is_mounted() {
            tracing::debug!("Page unmounted");
        }
        self.token.cancel();
    }

    /// Resolves once the page is unmounted
    pub fn unmounted(&self) -> WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }

    /// Token for tasks that must end with the page
    pub fn child_token(&self) -> CancellationToken {
        self.token.child_token()
    }

    /// Mutate the view model, unless the page has unmounted.
    pub fn update<R>(&self, f: impl FnOnce(&mut BookingViewModel) -> R) -> Option<R> {
        if !self.is_mounted() {
            tracing::debug!("Page unmounted, dropping view model update");
            return None;
        }
        let mut view = self.bookings.lock();
        Some(f(&mut *view))
    }

    /// Read the view model
    pub fn read<R>(&self, f: impl FnOnce(&BookingViewModel) -> R) -> R {
        f(&*self.bookings.lock())
    }

    /// Bookings in display order
    pub fn snapshot(&self) -> Vec<Booking> {
        self.read(|view| view.bookings().to_vec())
    }
}
