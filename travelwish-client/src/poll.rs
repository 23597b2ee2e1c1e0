//! Poll-based refresher
//!
//! The non-stream dashboard loads the provider's bookings once on mount and
//! again whenever the user hits retry. Only pending bookings are kept. There
//! is no periodic refresh; the list may go stale between polls.

use std::sync::Arc;

use parking_lot::Mutex;
use shared::{Booking, ProviderId};

use crate::session::PageScope;
use crate::{ClientResult, HttpClient};

/// Page error shown when the backend gives no message of its own
pub const DEFAULT_FETCH_ERROR: &str = "Failed to fetch bookings";

#[derive(Debug, Clone)]
pub struct PollRefresher {
    http: HttpClient,
    provider_id: ProviderId,
    scope: PageScope,
    error: Arc<Mutex<Option<String>>>,
}

impl PollRefresher {
    pub fn new(http: HttpClient, provider_id: ProviderId, scope: PageScope) -> Self {
        Self {
            http,
            provider_id,
            scope,
            error: Arc::new(Mutex::new(None)),
        }
    }

    /// Fetch the provider's bookings and keep the pending ones.
    ///
    /// Returns the number of pending bookings now shown. On failure the page
    /// error is set and the view model is left as it was.
    pub async fn refresh(&self) -> ClientResult<usize> {
        let result = self.http.list_provider_bookings(&self.provider_id).await;

        if !self.scope.is_mounted() {
            tracing::debug!(provider_id = %self.provider_id, "Page unmounted, discarding poll result");
            return result.map(|_| 0);
        }

        match result {
            Ok(bookings) => {
                let pending: Vec<Booking> = bookings.into_iter().filter(Booking::is_pending).collect();
                let count = pending.len();
                self.scope.update(|view| view.replace_all(pending));
                *self.error.lock() = None;
                tracing::info!(provider_id = %self.provider_id, pending = count, "Bookings refreshed");
                Ok(count)
            }
            Err(e) => {
                let message = e.api_message().unwrap_or(DEFAULT_FETCH_ERROR).to_string();
                tracing::warn!(provider_id = %self.provider_id, "Booking refresh failed: {e}");
                *self.error.lock() = Some(message);
                Err(e)
            }
        }
    }

    /// Re-run the fetch after a failure
    pub async fn retry(&self) -> ClientResult<usize> {
        self.refresh().await
    }

    /// Current page error, if the last fetch failed
    pub fn error(&self) -> Option<String> {
        self.error.lock().clone()
    }

    pub fn scope(&self) -> &PageScope {
        &self.scope
    }
}
