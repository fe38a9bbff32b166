//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! API error handling
//!
//! This module maps clinic errors onto status codes and response bodies.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use tracing::error;

use super::responses::{DetailResponse, MessageResponse};
use crate::error::ClinicError;
use crate::validation::FieldErrors;

pub const NOT_FOUND_DETAIL: &str = "Not found.";
pub const CREDENTIALS_NOT_PROVIDED: &str = "Authentication credentials were not provided.";
pub const UNSUPPORTED_OPERATION: &str = "Unsupported operation";
pub const SERVER_ERROR_DETAIL: &str = "A server error occurred.";

/// API error
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Field-keyed validation failure
    #[error("Validation error: {0}")]
    Validation(FieldErrors),

    /// Per-item validation failure of a list payload
    #[error("Validation error in list payload")]
    BatchValidation(Vec<FieldErrors>),

    /// Body that could not be parsed as JSON
    #[error("Malformed request: {message}")]
    Malformed { message: String },

    /// Request refused before it reached a handler
    #[error("Request rejected: {message}")]
    Rejected { status: StatusCode, message: String },

    /// Missing or invalid credential
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// Unknown record
    #[error("Not found")]
    NotFound,

    /// Operation refused for this resource
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Internal server error
    #[error("Internal server error: {message}")]
    Internal { message: String },
}

impl ApiError {
    /// Create a malformed body error
    pub fn malformed(message: &str) -> Self {
        Self::Malformed {
            message: message.to_string(),
        }
    }

    /// Create a rejection with an explicit status
    pub fn rejected(status: StatusCode, message: &str) -> Self {
        Self::Rejected {
            status,
            message: message.to_string(),
        }
    }

    /// Create an unauthorized error
    pub fn unauthorized(message: &str) -> Self {
        Self::Unauthorized {
            message: message.to_string(),
        }
    }

    /// Create an internal error
    pub fn internal(message: &str) -> Self {
        Self::Internal {
            message: message.to_string(),
        }
    }

    /// Convert from clinic error
    pub fn from_clinic_error(error: ClinicError) -> Self {
        match error {
            ClinicError::Validation(errors) => Self::Validation(errors),
            ClinicError::BatchValidation(errors) => Self::BatchValidation(errors),
            ClinicError::NotFound { .. } => Self::NotFound,
            ClinicError::MethodNotAllowed { .. } => Self::MethodNotAllowed,
            ClinicError::Authentication { message } => Self::Unauthorized { message },
            ClinicError::Config { message }
            | ClinicError::Storage { message }
            | ClinicError::Serialization { message }
            | ClinicError::Internal { message } => Self::Internal { message },
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BatchValidation(_) | ApiError::Malformed { .. } => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Rejected { status, .. } => *status,
            ApiError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ClinicError> for ApiError {
    fn from(error: ClinicError) -> Self {
        Self::from_clinic_error(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            ApiError::Validation(errors) => (status, Json(errors)).into_response(),
            ApiError::BatchValidation(errors) => (status, Json(errors)).into_response(),
            ApiError::Malformed { message } => (
                status,
                Json(DetailResponse::new(format!("JSON parse error - {}", message))),
            )
                .into_response(),
            ApiError::Rejected { message, .. } => {
                (status, Json(DetailResponse::new(message))).into_response()
            }
            ApiError::Unauthorized { message } => {
                let mut response = (status, Json(DetailResponse::new(message))).into_response();
                response.headers_mut().insert(
                    header::WWW_AUTHENTICATE,
                    HeaderValue::from_static("Bearer realm=\"api\""),
                );
                response
            }
            ApiError::NotFound => {
                (status, Json(DetailResponse::new(NOT_FOUND_DETAIL))).into_response()
            }
            ApiError::MethodNotAllowed => (
                status,
                Json(MessageResponse {
                    message: UNSUPPORTED_OPERATION.to_string(),
                }),
            )
                .into_response(),
            ApiError::Internal { message } => {
                error!(error = %message, "Request failed");
                (status, Json(DetailResponse::new(SERVER_ERROR_DETAIL))).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EntityKind;

    #[test]
    fn test_status_mapping() {
        let err = ApiError::from(ClinicError::not_found(EntityKind::Owner, 3));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        let err = ApiError::from(ClinicError::MethodNotAllowed {
            kind: EntityKind::PetType,
        });
        assert_eq!(err.status_code(), StatusCode::METHOD_NOT_ALLOWED);

        let err = ApiError::from(ClinicError::storage("database is locked"));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let err = ApiError::from(ClinicError::BatchValidation(vec![FieldErrors::new()]));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_unauthorized_challenge() {
        let response = ApiError::unauthorized(CREDENTIALS_NOT_PROVIDED).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));
    }
}
