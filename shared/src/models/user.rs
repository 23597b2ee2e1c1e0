//! Session user DTOs
//!
//! The backend owns sessions (cookie based). These types only describe what
//! the session check and login endpoints return.

use serde::{Deserialize, Serialize};

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Authenticated user as reported by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub email: String,
    /// Marketplace role (customer, restaurant, accommodation, guide ...)
    #[serde(default)]
    pub role: String,
}
