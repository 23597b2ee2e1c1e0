//! Status update dispatchers
//!
//! A provider confirms or rejects a pending booking. Two transports exist,
//! one per dashboard flavour:
//!
//! - [`StreamDispatcher`] sends the command over the page's open event
//!   stream and leaves the view model alone until the server echoes a
//!   `booking_status_update`.
//! - [`RequestDispatcher`] calls the REST endpoint and, once it succeeds,
//!   drops the booking from the page's pending list.
//!
//! Both refuse ids the page does not hold with
//! [`ClientError::UnknownBooking`] before anything is sent. Neither retries.
//! A second click before the first answer sends the command twice.

use async_trait::async_trait;
use shared::{BookingCommand, BookingStatus};

use crate::live::LiveHandle;
use crate::session::PageScope;
use crate::{ClientError, ClientResult, HttpClient};

#[async_trait]
pub trait StatusUpdateDispatcher: Send + Sync {
    /// Request `status` (confirmed or rejected) for `booking_id`.
    async fn update_status(&self, booking_id: &str, status: BookingStatus) -> ClientResult<()>;
}

fn ensure_tracked(scope: &PageScope, booking_id: &str) -> ClientResult<()> {
    if scope.read(|view| view.get(booking_id).is_some()) {
        Ok(())
    } else {
        tracing::warn!(booking_id = %booking_id, "Status update for a booking not on this page");
        Err(ClientError::UnknownBooking(booking_id.to_string()))
    }
}

fn ensure_provider_decision(status: BookingStatus) -> ClientResult<()> {
    if status.is_provider_decision() {
        Ok(())
    } else {
        Err(ClientError::Validation(format!(
            "a provider can only confirm or reject a booking, not set it to {status}"
        )))
    }
}

/// Command-over-stream dispatcher
#[derive(Debug, Clone)]
pub struct StreamDispatcher {
    live: LiveHandle,
    scope: PageScope,
}

impl StreamDispatcher {
    pub fn new(live: LiveHandle, scope: PageScope) -> Self {
        Self { live, scope }
    }

    /// Synchronous form of [`update_status`](StatusUpdateDispatcher::update_status).
    pub fn send_status(&self, booking_id: &str, status: BookingStatus) -> ClientResult<()> {
        ensure_provider_decision(status)?;
        ensure_tracked(&self.scope, booking_id)?;
        self.live
            .send(BookingCommand::update_status(booking_id, status))
            .inspect_err(|e| {
                tracing::warn!(booking_id = %booking_id, status = %status, "Status update not sent: {e}");
            })?;
        tracing::info!(booking_id = %booking_id, status = %status, "Status update sent over stream");
        Ok(())
    }
}

#[async_trait]
impl StatusUpdateDispatcher for StreamDispatcher {
    async fn update_status(&self, booking_id: &str, status: BookingStatus) -> ClientResult<()> {
        self.send_status(booking_id, status)
    }
}

/// Command-over-request dispatcher
#[derive(Debug, Clone)]
pub struct RequestDispatcher {
    http: HttpClient,
    scope: PageScope,
}

impl RequestDispatcher {
    pub fn new(http: HttpClient, scope: PageScope) -> Self {
        Self { http, scope }
    }
}

#[async_trait]
impl StatusUpdateDispatcher for RequestDispatcher {
    async fn update_status(&self, booking_id: &str, status: BookingStatus) -> ClientResult<()> {
        ensure_provider_decision(status)?;
        ensure_tracked(&self.scope, booking_id)?;

        if let Err(e) = self.http.update_booking_status(booking_id, status).await {
            tracing::warn!(booking_id = %booking_id, status = %status, "Status update failed: {e}");
            return Err(e);
        }

        tracing::info!(booking_id = %booking_id, status = %status, "Booking status updated");
        self.scope.update(|view| view.remove(booking_id));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::live::ConnectionState;
    use crate::live::tests::detached_handle;
    use crate::view::tests::booking;

    /// Page holding one pending booking, `a`
    fn page_with_a() -> PageScope {
        let scope = PageScope::mount();
        scope.update(|view| view.upsert(booking("a", BookingStatus::Pending, 9)));
        scope
    }

    #[tokio::test]
    async fn test_stream_dispatch_when_closed_sends_nothing() {
        let (handle, mut sent) = detached_handle(ConnectionState::Closed);
        let dispatcher = StreamDispatcher::new(handle, page_with_a());

        let err = dispatcher
            .update_status("a", BookingStatus::Confirmed)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::NotConnected));
        assert!(sent.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_stream_dispatch_when_open_queues_command() {
        let (handle, mut sent) = detached_handle(ConnectionState::Open);
        let dispatcher = StreamDispatcher::new(handle, page_with_a());

        dispatcher
            .update_status("a", BookingStatus::Rejected)
            .await
            .unwrap();
        assert_eq!(
            sent.try_recv().unwrap(),
            BookingCommand::update_status("a", BookingStatus::Rejected)
        );
    }

    #[test]
    fn test_stream_dispatch_untracked_id_sends_nothing() {
        let (handle, mut sent) = detached_handle(ConnectionState::Open);
        let dispatcher = StreamDispatcher::new(handle, page_with_a());

        let err = dispatcher
            .send_status("ghost", BookingStatus::Confirmed)
            .unwrap_err();
        assert!(matches!(err, ClientError::UnknownBooking(ref id) if id == "ghost"));
        assert!(sent.try_recv().is_err());
    }

    #[test]
    fn test_stream_dispatch_after_booking_removed() {
        let (handle, mut sent) = detached_handle(ConnectionState::Open);
        let scope = page_with_a();
        let dispatcher = StreamDispatcher::new(handle, scope.clone());

        scope.update(|view| view.remove("a"));
        let err = dispatcher
            .send_status("a", BookingStatus::Rejected)
            .unwrap_err();
        assert!(matches!(err, ClientError::UnknownBooking(_)));
        assert!(sent.try_recv().is_err());
    }

    #[test]
    fn test_only_confirm_or_reject_is_dispatched() {
        let (handle, mut sent) = detached_handle(ConnectionState::Open);
        let dispatcher = StreamDispatcher::new(handle, page_with_a());

        for status in [
            BookingStatus::Pending,
            BookingStatus::Cancelled,
            BookingStatus::Completed,
        ] {
            let err = dispatcher.send_status("a", status).unwrap_err();
            assert!(matches!(err, ClientError::Validation(_)));
        }
        assert!(sent.try_recv().is_err());
    }
}
