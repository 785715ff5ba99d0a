//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Every variant is a deterministic, client-fault condition. Each carries the
/// complete human-readable message the API returns verbatim; infrastructure
/// failures belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A CPF/CNPJ failed structural (check-digit) validation.
    #[error("{0}")]
    InvalidDocument(String),

    /// A CPF/CNPJ is already registered on a non-deleted record.
    #[error("{0}")]
    DuplicateDocument(String),

    /// Arable + vegetation areas exceed the total farm area.
    #[error("{0}")]
    AreaExceeded(String),

    /// A requested record was not found (or is soft-deleted).
    #[error("{0}")]
    NotFound(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn invalid_document(msg: impl Into<String>) -> Self {
        Self::InvalidDocument(msg.into())
    }

    pub fn duplicate_document(msg: impl Into<String>) -> Self {
        Self::DuplicateDocument(msg.into())
    }

    pub fn area_exceeded(msg: impl Into<String>) -> Self {
        Self::AreaExceeded(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}
