//! # Ledger Error Type
//!
//! The one error type callers of the engine see.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Error Flow in the Ledger                            │
//! │                                                                         │
//! │  Ledger::create_invoice(request)                                        │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  request.validate() ─── CoreError::EmptyCart ──────────────┐            │
//! │         │                                                   │            │
//! │         ▼                                                   │            │
//! │  plan_debit() ───────── CoreError::InsufficientStock ──────┤            │
//! │         │                                                   │            │
//! │         ▼                                                   ▼            │
//! │  tx.items().apply_stock() ─ DbError::Conflict ──► retry ─► LedgerError  │
//! │         │                                                   │            │
//! │         ▼                                                   │            │
//! │  tx.commit() ──────────────────────────────────────────────►│            │
//! │                                                                         │
//! │  { "code": "INSUFFICIENT_STOCK",                                        │
//! │    "message": "Insufficient stock for Tissue: 5 unit available, ..." }  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use tally_core::{CoreError, ValidationError};
use tally_db::DbError;

use crate::config::ConfigError;

/// Error returned from every ledger operation.
///
/// ## Serialization
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Item not found: 550e8400-..."
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes, one per failure class callers react to differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Item, account, customer or invoice does not exist
    NotFound,

    /// Request shape is invalid
    ValidationError,

    /// Not enough stock across all tiers
    InsufficientStock,

    /// A conversion ratio the operation needs is zero or undefined
    ConfigurationError,

    /// Invoice request with no lines
    EmptyCart,

    /// Unit not accepted by the operation (restocking loose units)
    UnsupportedUnit,

    /// Zero or negative amount
    InvalidAmount,

    /// Item has no price for the requested unit
    UnitNotSold,

    /// Item still referenced by sales or purchases
    ItemInUse,

    /// Concurrent writers kept colliding after every retry
    Conflict,

    /// Internal invariant violated
    LogicError,

    /// Storage failure
    DatabaseError,

    /// Bad configuration
    ConfigError,

    /// Anything else
    Internal,
}

impl LedgerError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        LedgerError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        LedgerError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        LedgerError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        LedgerError::new(ErrorCode::Internal, message)
    }

    /// True when the operation may succeed if run again unchanged.
    pub fn is_conflict(&self) -> bool {
        self.code == ErrorCode::Conflict
    }
}

/// Converts storage errors.
///
/// Storage details are logged and replaced with a generic message.
impl From<DbError> for LedgerError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => LedgerError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => LedgerError::validation(format!(
                "{} '{}' already exists",
                field, value
            )),
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                LedgerError::validation("Invalid reference")
            }
            DbError::ConstraintViolation(message) => {
                // CHECK constraints guard stock >= 0; tripping one means a plan was wrong.
                tracing::error!("Constraint violation: {}", message);
                LedgerError::new(ErrorCode::LogicError, "Stored invariant violated")
            }
            DbError::Conflict(message) => LedgerError::new(ErrorCode::Conflict, message),
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                LedgerError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Database migration failed: {}", e);
                LedgerError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                tracing::error!("Database query failed: {}", e);
                LedgerError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                LedgerError::new(ErrorCode::DatabaseError, "Database transaction failed")
            }
            DbError::PoolExhausted => {
                LedgerError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                LedgerError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts domain errors. Messages are already user-facing.
impl From<CoreError> for LedgerError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::ItemNotFound(_) | CoreError::NotFound { .. } => ErrorCode::NotFound,
            CoreError::InsufficientStock { .. } => ErrorCode::InsufficientStock,
            CoreError::Configuration { .. } => ErrorCode::ConfigurationError,
            CoreError::EmptyCart => ErrorCode::EmptyCart,
            CoreError::UnsupportedUnit { .. } => ErrorCode::UnsupportedUnit,
            CoreError::InvalidAmount { .. } => ErrorCode::InvalidAmount,
            CoreError::UnitNotSold { .. } => ErrorCode::UnitNotSold,
            CoreError::ItemInUse { .. } => ErrorCode::ItemInUse,
            CoreError::Logic(reason) => {
                tracing::error!(reason = %reason, "Ledger invariant violated");
                ErrorCode::LogicError
            }
            CoreError::Validation(e) => return LedgerError::validation(e.to_string()),
        };
        LedgerError::new(code, err.to_string())
    }
}

impl From<ValidationError> for LedgerError {
    fn from(err: ValidationError) -> Self {
        LedgerError::validation(err.to_string())
    }
}

impl From<ConfigError> for LedgerError {
    fn from(err: ConfigError) -> Self {
        LedgerError::new(ErrorCode::ConfigError, err.to_string())
    }
}

impl std::fmt::Display for LedgerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for LedgerError {}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;
