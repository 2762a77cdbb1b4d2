//! # Error Types
//!
//! Domain-specific error types for bookstore-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  bookstore-core errors (this file)                                      │
//! │  ├── CoreError            - Business rule and state failures            │
//! │  ├── RegulationViolation  - Import rule breaches (min / ceiling)        │
//! │  └── ValidationError      - Input validation failures                   │
//! │                                                                         │
//! │  bookstore-db errors (separate crate)                                   │
//! │  ├── DbError              - Persistence failures                        │
//! │  └── StoreError           - Core | Db at the operations boundary        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (book name, counts, thresholds)
//! 3. Errors are enum variants, never String
//! 4. Business failures carry the numbers the caller needs to act on

use std::fmt;

use thiserror::Error;

use crate::auth::Operation;
use crate::types::UserRole;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// Every variant is raised before or instead of a mutation: an operation
/// that returns one of these has not changed any stored state.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Input validation failed (wraps ValidationError).
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// An import broke an active regulation (wraps RegulationViolation).
    #[error("{0}")]
    Regulation(#[from] RegulationViolation),

    /// The referenced book does not exist (or is no longer sold).
    #[error("book not found: {book}")]
    BookNotFound { book: String },

    /// A checkout line asks for more copies than are on hand.
    #[error("insufficient stock for \"{book}\": available {available}, requested {requested}")]
    InsufficientStock {
        book: String,
        available: i64,
        requested: i64,
    },

    /// A cart mutation would exceed the book's current stock.
    #[error("cannot add more \"{book}\" to the cart: {in_cart} already in cart, only {available} in stock")]
    StockExceeded {
        book: String,
        in_cart: i64,
        available: i64,
    },

    /// Checkout was attempted over a cart with no lines.
    #[error("the cart is empty")]
    EmptyCart,

    /// The operation requires a signed-in actor.
    #[error("sign in to continue")]
    Unauthenticated,

    /// The actor's role is not in the operation's capability set.
    #[error("{role:?} is not allowed to {operation}")]
    Unauthorized { role: UserRole, operation: Operation },
}

// =============================================================================
// Regulation Violation
// =============================================================================

/// A business-regulation breach detected while recording an import.
///
/// Both variants carry the numbers an admin needs to correct the
/// submission; neither leaves any mutation behind.
#[derive(Debug, Clone, PartialEq)]
pub enum RegulationViolation {
    /// The submitted quantity is below the active minimum import
    /// quantity.
    BelowMinimum { minimum: i64, requested: i64 },

    /// The import would push the book's stock above the active ceiling.
    ///
    /// `allowed_remainder` is `ceiling - current stock`; at or above the
    /// ceiling it is ≤ 0 and no further import is possible.
    CeilingExceeded {
        book: String,
        ceiling: i64,
        current: i64,
        allowed_remainder: i64,
    },
}

impl fmt::Display for RegulationViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegulationViolation::BelowMinimum { minimum, requested } => write!(
                f,
                "import quantity {} is below the required minimum of {}",
                requested, minimum
            ),
            RegulationViolation::CeilingExceeded {
                book,
                ceiling,
                current,
                allowed_remainder,
            } => {
                if *allowed_remainder > 0 {
                    write!(
                        f,
                        "stock of \"{}\" is {} and the ceiling is {}: at most {} more can be imported",
                        book, current, ceiling, allowed_remainder
                    )
                } else {
                    write!(
                        f,
                        "stock of \"{}\" is already at or above the ceiling of {}: no further import is possible",
                        book, ceiling
                    )
                }
            }
        }
    }
}

impl std::error::Error for RegulationViolation {}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when caller input doesn't meet requirements, and are
/// raised before business logic runs.
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

    /// Invalid format or state (e.g. a non-finite regulation value, an
    /// inactive book added to the cart).
    #[error("{field} has invalid value: {reason}")]
    Invalid { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_stock_message() {
        let err = CoreError::InsufficientStock {
            book: "Atlas".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "insufficient stock for \"Atlas\": available 3, requested 5"
        );
    }

    #[test]
    fn test_below_minimum_message() {
        let err = RegulationViolation::BelowMinimum {
            minimum: 2,
            requested: 1,
        };
        assert_eq!(
            err.to_string(),
            "import quantity 1 is below the required minimum of 2"
        );
    }

    #[test]
    fn test_ceiling_message_with_remainder() {
        let err = RegulationViolation::CeilingExceeded {
            book: "Atlas".to_string(),
            ceiling: 10,
            current: 8,
            allowed_remainder: 2,
        };
        assert_eq!(
            err.to_string(),
            "stock of \"Atlas\" is 8 and the ceiling is 10: at most 2 more can be imported"
        );
    }

    #[test]
    fn test_ceiling_message_without_remainder() {
        let err = RegulationViolation::CeilingExceeded {
            book: "Atlas".to_string(),
            ceiling: 10,
            current: 10,
            allowed_remainder: 0,
        };
        assert!(err.to_string().contains("no further import is possible"));
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "book name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
