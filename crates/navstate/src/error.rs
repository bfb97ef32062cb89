// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::schema::ValidationIssue;

pub type Result<T> = std::result::Result<T, StateError>;

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("Invalid {table} row {id}: {}", format_issues(.issues))]
    Validation {
        table: String,
        id: String,
        issues: Vec<ValidationIssue>,
    },

    #[error("{table} not found: {id}")]
    NotFound { table: String, id: String },

    #[error("Row {id} in {table} has no valid cells")]
    RejectedRow { table: String, id: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Filesystem error: {0}")]
    Fs(#[from] navfs::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl StateError {
    pub fn validation<T: Into<String>, I: Into<String>>(
        table: T,
        id: I,
        issues: Vec<ValidationIssue>,
    ) -> Self {
        StateError::Validation {
            table: table.into(),
            id: id.into(),
            issues,
        }
    }

    pub fn not_found<T: Into<String>, I: Into<String>>(table: T, id: I) -> Self {
        StateError::NotFound {
            table: table.into(),
            id: id.into(),
        }
    }

    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        StateError::InvalidInput(message.into())
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            StateError::NotFound { .. } => true,
            StateError::Fs(e) => e.is_not_found(),
            _ => false,
        }
    }
}

/// `field: message; field: message`, the form used in warnings and errors.
#[must_use]
pub fn format_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
