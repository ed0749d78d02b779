//! # Error Types
//!
//! Domain-specific error types for tally-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tally-core errors (this file)                                         │
//! │  ├── CoreError        - Domain failures (stock, configuration, ...)    │
//! │  └── ValidationError  - Request shape failures                         │
//! │                                                                         │
//! │  tally-db errors (separate crate)                                      │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  tally-ledger errors                                                   │
//! │  └── LedgerError      - What callers see (code + message)              │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → LedgerError ← DbError             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! None of these are retried by the ledger. Only a storage `Conflict` is.

use thiserror::Error;

use crate::types::UnitKind;

// =============================================================================
// Core Error
// =============================================================================

/// Domain errors raised by unit conversion, stock allocation and the
/// processors built on top of them.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Item cannot be found.
    #[error("Item not found: {0}")]
    ItemNotFound(String),

    /// Any other referenced record (account, customer, invoice) is missing.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Requested quantity exceeds the stock convertible into the requested unit.
    ///
    /// ## User Workflow
    /// ```text
    /// Sell 9 units of "Tissue"
    ///      │
    ///      ▼
    /// total = units + rolls × unitsPerRoll + cartons × unitsPerCarton = 5
    ///      │
    ///      ▼
    /// InsufficientStock { item: "Tissue", unit: Unit, available: 5, requested: 9 }
    /// ```
    #[error("Insufficient stock for {item}: {available} {unit} available, {requested} requested")]
    InsufficientStock {
        item: String,
        unit: UnitKind,
        available: i64,
        requested: i64,
    },

    /// A conversion ratio the operation needs is zero or undefined.
    #[error("Item {item} is not configured for this operation: {reason}")]
    Configuration { item: String, reason: String },

    /// Invoice request with no lines.
    #[error("Cannot create an invoice with no items")]
    EmptyCart,

    /// Operation does not accept this unit (restocking loose units).
    #[error("{unit} is not supported for {operation}")]
    UnsupportedUnit { unit: UnitKind, operation: String },

    /// Amount is zero, negative, or otherwise unusable.
    #[error("Invalid amount for {field}: {reason}")]
    InvalidAmount { field: String, reason: String },

    /// The item has no price for the requested unit.
    #[error("{item} is not sold by the {unit}")]
    UnitNotSold { item: String, unit: UnitKind },

    /// Item still referenced by sales or purchases.
    #[error("Item {item} has {references} recorded sales or purchases and cannot be deleted")]
    ItemInUse { item: String, references: i64 },

    /// Internal invariant violated. Indicates a bug, never a user error.
    #[error("Logic error: {0}")]
    Logic(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a Configuration error for an item.
    pub fn configuration(item: impl Into<String>, reason: impl Into<String>) -> Self {
        CoreError::Configuration {
            item: item.into(),
            reason: reason.into(),
        }
    }

    /// Creates an InvalidAmount error.
    pub fn invalid_amount(field: impl Into<String>, reason: impl Into<String>) -> Self {
        CoreError::InvalidAmount {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any transaction is opened.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Invalid format (e.g., invalid UUID, inconsistent ratios).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., a phone number already on file).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },

    /// Record still referenced by ledger history.
    #[error("{entity} {id} is referenced by recorded transactions")]
    StillReferenced { entity: String, id: String },
}

impl ValidationError {
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
