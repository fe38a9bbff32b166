//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Error handling for the clinic service
//!
//! This module provides error types and result aliases shared by the
//! storage, validation and resource layers.

use thiserror::Error;

use crate::model::EntityKind;
use crate::validation::FieldErrors;

/// Result type for clinic operations
pub type ClinicResult<T> = Result<T, ClinicError>;

/// Clinic error types
#[derive(Error, Debug)]
pub enum ClinicError {
    /// Configuration error
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Storage error
    #[error("Storage error: {message}")]
    Storage { message: String },

    /// Field-keyed validation failure
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    /// Validation failure of a list payload, one entry per item
    #[error("Validation failed for {} item(s)", .0.iter().filter(|e| !e.is_empty()).count())]
    BatchValidation(Vec<FieldErrors>),

    /// No record with this id
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },

    /// Operation refused for this entity kind
    #[error("Unsupported operation on {kind}")]
    MethodNotAllowed { kind: EntityKind },

    /// Missing or invalid credential
    #[error("Authentication error: {message}")]
    Authentication { message: String },

    /// Serialization error
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl ClinicError {
    /// Create a configuration error
    pub fn config(message: &str) -> Self {
        Self::Config {
            message: message.to_string(),
        }
    }

    /// Create a storage error
    pub fn storage(message: &str) -> Self {
        Self::Storage {
            message: message.to_string(),
        }
    }

    /// Create a not found error
    pub fn not_found(kind: EntityKind, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// Create an authentication error
    pub fn authentication(message: &str) -> Self {
        Self::Authentication {
            message: message.to_string(),
        }
    }

    /// Create an internal error
    pub fn internal(message: &str) -> Self {
        Self::Internal {
            message: message.to_string(),
        }
    }
}

impl From<serde_json::Error> for ClinicError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<config::ConfigError> for ClinicError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config {
            message: err.to_string(),
        }
    }
}

impl From<FieldErrors> for ClinicError {
    fn from(errors: FieldErrors) -> Self {
        Self::Validation(errors)
    }
}
