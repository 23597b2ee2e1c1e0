//! Data models
//!
//! Shared with the Travelwish backend (via API and event stream).
//! All IDs are opaque server-assigned strings.

pub mod booking;
pub mod provider;
pub mod user;

// Re-exports
pub use booking::*;
pub use provider::*;
pub use user::*;
