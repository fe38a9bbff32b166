//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Storage error types

use crate::error::ClinicError;
use crate::model::{EntityId, EntityKind};
use crate::validation::{messages, FieldErrors, NON_FIELD_ERRORS};

/// Storage error types
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Unique field already held by another record
    #[error("Unique constraint violated on {kind}")]
    UniqueViolation { kind: EntityKind },

    /// Reference to a record that does not exist
    #[error("Missing {field} reference: {id}")]
    MissingReference { field: String, id: EntityId },

    /// Integrity constraint reported without a field
    #[error("Constraint violation: {message}")]
    ConstraintViolation { message: String },

    /// Storage connection error
    #[error("Storage connection error: {message}")]
    ConnectionError { message: String },

    /// Storage query error
    #[error("Storage query error: {message}")]
    QueryError { message: String },

    /// Storage transaction error
    #[error("Storage transaction error: {message}")]
    TransactionError { message: String },

    /// Storage configuration error
    #[error("Storage configuration error: {message}")]
    ConfigurationError { message: String },
}

impl StorageError {
    /// Classify a sqlx failure raised while writing a `kind` record
    pub fn from_sqlx(kind: EntityKind, err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() {
                return StorageError::UniqueViolation { kind };
            }
            if db.is_foreign_key_violation() {
                return StorageError::ConstraintViolation {
                    message: db.message().to_string(),
                };
            }
        }
        StorageError::QueryError {
            message: err.to_string(),
        }
    }
}

impl From<StorageError> for ClinicError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::UniqueViolation { kind } => {
                let field = kind.unique_field().unwrap_or(NON_FIELD_ERRORS);
                ClinicError::Validation(FieldErrors::single(field, messages::unique(kind, field)))
            }
            StorageError::MissingReference { field, id } => ClinicError::Validation(
                FieldErrors::single(&field, messages::does_not_exist(&id.to_string())),
            ),
            StorageError::ConstraintViolation { message } => {
                ClinicError::Validation(FieldErrors::single(NON_FIELD_ERRORS, message))
            }
            StorageError::ConnectionError { message } => ClinicError::Storage { message },
            StorageError::QueryError { message } => ClinicError::Storage { message },
            StorageError::TransactionError { message } => ClinicError::Storage { message },
            StorageError::ConfigurationError { message } => ClinicError::Config { message },
        }
    }
}
