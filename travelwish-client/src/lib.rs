//! Travelwish client - booking synchronization for provider dashboards
//!
//! Keeps a provider's bookings fresh either through the backend's event
//! stream ([`LiveUpdateListener`]) or by explicit polling ([`PollRefresher`]),
//! and lets the provider confirm or reject pending bookings through one of
//! the [`StatusUpdateDispatcher`] transports.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod live;
pub mod logging;
pub mod poll;
pub mod session;
pub mod view;

pub use config::ClientConfig;
pub use dispatch::{RequestDispatcher, StatusUpdateDispatcher, StreamDispatcher};
pub use error::{ClientError, ClientResult};
pub use http::HttpClient;
pub use live::{ConnectionState, LiveHandle, LiveUpdateListener};
pub use poll::PollRefresher;
pub use session::PageScope;
pub use view::BookingViewModel;

// Re-export shared types for convenience
pub use shared::{ApiResponse, Booking, BookingCommand, BookingEvent, BookingStatus, ProviderId};
