//! HTTP client for the Travelwish REST API

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::models::{BookingStatusUpdate, LoginRequest, SessionUser};
use shared::{ApiResponse, Booking, BookingCreate, BookingStatus, ProviderId};

use crate::{ClientConfig, ClientError, ClientResult};

/// HTTP client for making requests to the Travelwish backend
///
/// Sessions are cookie based, so the underlying client keeps a cookie store
/// and every clone shares it.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
}

impl HttpClient {
    /// Create a new HTTP client from configuration
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let mut builder = Client::builder().cookie_store(true);
        if let Some(secs) = config.timeout {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<ApiResponse<T>> {
        let response = self.client.get(self.url(path)).send().await?;
        Self::handle_response(response).await
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<ApiResponse<T>> {
        let response = self.client.post(self.url(path)).json(body).send().await?;
        Self::handle_response(response).await
    }

    /// Make a POST request without body
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> ClientResult<ApiResponse<T>> {
        let response = self.client.post(self.url(path)).send().await?;
        Self::handle_response(response).await
    }

    /// Make a PATCH request with JSON body
    pub async fn patch<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<ApiResponse<T>> {
        let response = self.client.patch(self.url(path)).json(body).send().await?;
        Self::handle_response(response).await
    }

    /// Handle the HTTP response
    ///
    /// Non-2xx and `success: false` both become [`ClientError::Api`], carrying
    /// whatever message the backend supplied.
    async fn handle_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> ClientResult<ApiResponse<T>> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiResponse<serde_json::Value>>(&text)
                .ok()
                .and_then(|body| body.error_message().map(str::to_string));
            tracing::debug!(status = status.as_u16(), ?message, "Request rejected");
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: ApiResponse<T> = serde_json::from_str(&text)
            .map_err(|e| ClientError::InvalidResponse(format!("{e}: {text}")))?;
        if !body.success {
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: body.error_message().map(str::to_string),
            });
        }
        Ok(body)
    }

    // ========== Bookings API ==========

    /// List every booking of a provider
    pub async fn list_provider_bookings(&self, provider_id: &ProviderId) -> ClientResult<Vec<Booking>> {
        let bookings = self
            .get::<Vec<Booking>>(&format!("api/bookings/provider/{provider_id}"))
            .await?
            .data
            .unwrap_or_default();
        tracing::debug!(provider_id = %provider_id, count = bookings.len(), "Fetched provider bookings");
        Ok(bookings)
    }

    /// Create a booking
    pub async fn create_booking(&self, booking: &BookingCreate) -> ClientResult<Booking> {
        self.post::<Booking, _>("api/bookings", booking)
            .await?
            .data
            .ok_or_else(|| ClientError::InvalidResponse("Missing booking data".to_string()))
    }

    /// Change a booking's status. Returns the updated record when the backend echoes it.
    pub async fn update_booking_status(
        &self,
        booking_id: &str,
        status: BookingStatus,
    ) -> ClientResult<Option<Booking>> {
        let body = BookingStatusUpdate { status };
        Ok(self
            .patch::<Booking, _>(&format!("api/bookings/{booking_id}/status"), &body)
            .await?
            .data)
    }

    // ========== Auth API ==========

    /// Check the current session. `None` when not logged in.
    pub async fn check_session(&self) -> ClientResult<Option<SessionUser>> {
        match self.get::<SessionUser>("api/auth/check").await {
            Ok(resp) => Ok(resp.data),
            Err(ClientError::Api { status, .. }) if status == StatusCode::UNAUTHORIZED.as_u16() => {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Login with email and password; the session cookie is kept by the client
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<SessionUser> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };

        self.post::<SessionUser, _>("api/auth/login", &request)
            .await?
            .data
            .ok_or_else(|| ClientError::InvalidResponse("Missing login data".to_string()))
    }

    /// Logout
    pub async fn logout(&self) -> ClientResult<()> {
        self.post_empty::<serde_json::Value>("api/auth/logout").await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Deliberately has no `Default` impl
    #[derive(Debug, Deserialize)]
    struct Quote {
        amount: u32,
    }

    fn client(server: &MockServer) -> HttpClient {
        HttpClient::new(&ClientConfig::new(server.uri())).unwrap()
    }

    #[tokio::test]
    async fn test_get_payload_without_default() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/quote"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "success": true, "data": { "amount": 42 } })),
            )
            .mount(&server)
            .await;

        let resp = client(&server).get::<Quote>("/api/quote").await.unwrap();
        assert_eq!(resp.data.unwrap().amount, 42);
    }

    #[tokio::test]
    async fn test_non_2xx_carries_backend_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/quote"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(json!({ "success": false, "message": "No quote" })),
            )
            .mount(&server)
            .await;

        let err = client(&server).get::<Quote>("api/quote").await.unwrap_err();
        assert!(matches!(err, ClientError::Api { status: 404, .. }));
        assert_eq!(err.api_message(), Some("No quote"));
    }

    #[tokio::test]
    async fn test_undecodable_body_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/quote"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = client(&server).get::<Quote>("api/quote").await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidResponse(_)));
    }
}
