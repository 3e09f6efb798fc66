// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use crate::catalog::{CatalogError, Column};

pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by namespace resolution and listing
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Path not found: {0}")]
    NotFound(String),

    /// The catalog answered with conflicting rows for one path
    #[error("Ambiguous path {path}: {reason}")]
    AmbiguousPath { path: String, reason: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not a collection: {0}")]
    NotACollection(String),

    #[error("Malformed catalog row in {column}: {reason}")]
    MalformedRow { column: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    /// The engine built a query the catalog model cannot express
    #[error("Invalid catalog query: {0}")]
    InvalidQuery(String),

    /// Collaborator failure, passed through untouched
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl Error {
    pub fn not_found<S: AsRef<str>>(path: S) -> Self {
        Error::NotFound(path.as_ref().to_string())
    }

    pub fn ambiguous_path<S: AsRef<str>, R: Into<String>>(path: S, reason: R) -> Self {
        Error::AmbiguousPath {
            path: path.as_ref().to_string(),
            reason: reason.into(),
        }
    }

    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Error::InvalidArgument(message.into())
    }

    pub fn not_a_collection<S: AsRef<str>>(path: S) -> Self {
        Error::NotACollection(path.as_ref().to_string())
    }

    pub fn malformed_row<R: Into<String>>(column: Column, reason: R) -> Self {
        Error::MalformedRow {
            column: column.as_str().to_string(),
            reason: reason.into(),
        }
    }

    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config(message.into())
    }

    pub fn invalid_query<S: Into<String>>(message: S) -> Self {
        Error::InvalidQuery(message.into())
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}
