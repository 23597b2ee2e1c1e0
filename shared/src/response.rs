//! API Response types
//!
//! Response envelope used by every Travelwish backend endpoint

use serde::{Deserialize, Serialize};

/// Unified API response structure
///
/// ```json
/// {
///     "success": true,
///     "data": { ... },
///     "message": "Booking updated"
/// }
/// ```
///
/// Failures set `success` to `false` and usually carry `error` or `message`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    // No `default`: it would bound `T: Default`. A missing field still reads as `None`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Most specific failure text the envelope carries (`error`, then `message`)
    pub fn error_message(&self) -> Option<&str> {
        self.error
            .as_deref()
            .or(self.message.as_deref())
            .filter(|m| !m.trim().is_empty())
    }
}
