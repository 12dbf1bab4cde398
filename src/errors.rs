// Copyright (c) 2022 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Custom application errors with conversions from common Rust and 3rd-party errors.

use actix::MailboxError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use derive_more::Display;
use log::error;

use crate::server::ApiResponse;

/// Application error used for configuration, internal messaging and the REST interface.
#[derive(Debug, Display, PartialEq)]
pub enum ServiceError {
    #[display("Internal server error: {_0}")]
    InternalServerError(String),

    #[display("Internal serialization error: {_0}")]
    SerializationError(String),

    #[display("BadRequest: {_0}")]
    BadRequest(String),

    #[display("Not found: {_0}")]
    NotFound(String),

    /// Requested action is not possible in the current timer state.
    #[display("Not available: {_0}")]
    NotAvailable(String),

    #[display("Service unavailable: {_0}")]
    ServiceUnavailable(String),

    /// Hakuna API request failed.
    #[display("{_0}")]
    Api(ApiError),

    /// Refresh cycle failed.
    #[display("{_0}")]
    Refresh(RefreshError),
}

impl std::error::Error for ServiceError {}

/// Hakuna API error classification.
///
/// Every response of the Hakuna API is either a success or mapped to exactly one of these kinds.
#[derive(Clone, Debug, Display, PartialEq)]
pub enum ApiError {
    /// HTTP 401: invalid or expired API token.
    #[display("Invalid API token")]
    Auth,

    /// HTTP 429: server-side throttling.
    #[display("Rate limit exceeded. Retry after {} seconds", retry_after.as_deref().unwrap_or("unknown"))]
    RateLimit { retry_after: Option<String> },

    /// Any other HTTP status >= 400.
    #[display("API error {status}: {body}")]
    Status { status: u16, body: String },

    /// Transport-level failure: connection refused, timeout, DNS etc.
    #[display("Connection error: {_0}")]
    Connection(String),

    /// Request couldn't be built, e.g. invalid query parameters.
    #[display("Invalid request: {_0}")]
    InvalidRequest(String),

    /// Successful response with a body which couldn't be decoded.
    #[display("Invalid response: {_0}")]
    InvalidResponse(String),
}

impl std::error::Error for ApiError {}

impl ApiError {
    pub fn is_auth(&self) -> bool {
        matches!(self, ApiError::Auth)
    }
}

/// Failure of a critical fetch during a refresh cycle.
#[derive(Clone, Debug, Display, PartialEq)]
pub enum RefreshError {
    /// The API token was rejected. The host should ask for a new token.
    #[display("Authentication failed: {_0}")]
    Auth(ApiError),

    #[display("Error fetching data: {_0}")]
    Fetch(ApiError),
}

impl std::error::Error for RefreshError {}

impl From<ApiError> for RefreshError {
    fn from(e: ApiError) -> Self {
        if e.is_auth() {
            RefreshError::Auth(e)
        } else {
            RefreshError::Fetch(e)
        }
    }
}

impl From<ApiError> for ServiceError {
    fn from(e: ApiError) -> Self {
        ServiceError::Api(e)
    }
}

impl From<RefreshError> for ServiceError {
    fn from(e: RefreshError) -> Self {
        ServiceError::Refresh(e)
    }
}

impl From<std::io::Error> for ServiceError {
    fn from(e: std::io::Error) -> Self {
        ServiceError::InternalServerError(format!("{e:?}"))
    }
}

impl From<MailboxError> for ServiceError {
    fn from(e: MailboxError) -> Self {
        ServiceError::InternalServerError(format!("Internal message error: {e:?}"))
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(e: serde_json::Error) -> Self {
        error!("{e:?}");
        ServiceError::SerializationError(e.to_string())
    }
}

impl From<strum::ParseError> for ServiceError {
    fn from(e: strum::ParseError) -> Self {
        ServiceError::BadRequest(e.to_string())
    }
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::InternalServerError(_) | ServiceError::SerializationError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ServiceError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::NotAvailable(_) => StatusCode::CONFLICT,
            ServiceError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ServiceError::Api(ApiError::Auth)
            | ServiceError::Refresh(RefreshError::Auth(_)) => StatusCode::UNAUTHORIZED,
            ServiceError::Api(ApiError::RateLimit { .. })
            | ServiceError::Refresh(RefreshError::Fetch(ApiError::RateLimit { .. })) => {
                StatusCode::TOO_MANY_REQUESTS
            }
            ServiceError::Api(_) | ServiceError::Refresh(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let code = match self {
            ServiceError::InternalServerError(_) | ServiceError::SerializationError(_) => {
                "INTERNAL_ERROR"
            }
            ServiceError::BadRequest(_) => "BAD_REQUEST",
            ServiceError::NotFound(_) => "NOT_FOUND",
            ServiceError::NotAvailable(_) => "NOT_AVAILABLE",
            ServiceError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            ServiceError::Api(ApiError::Auth) | ServiceError::Refresh(RefreshError::Auth(_)) => {
                "INVALID_AUTH"
            }
            ServiceError::Api(_) | ServiceError::Refresh(_) => "API_ERROR",
        };
        let message = self.to_string();
        HttpResponse::build(self.status_code()).json(ApiResponse::new(code, &message))
    }
}
