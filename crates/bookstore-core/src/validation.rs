//! # Validation Module
//!
//! Input validation rules for the bookstore.
//!
//! ## Validation Strategy
//! Every write operation validates its inputs with these functions
//! before touching the store, so a validation failure never leaves a
//! partial mutation behind. The database schema (NOT NULL, CHECK,
//! UNIQUE) is the second line of defense.

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a book name.
///
/// ## Rules
/// - Must not be empty (after trimming)
/// - Must be at most 255 characters
pub fn validate_book_name(name: &str) -> ValidationResult<()> {
    validate_name("book name", name, 255)
}

/// Validates a category name.
pub fn validate_category_name(name: &str) -> ValidationResult<()> {
    validate_name("category name", name, 255)
}

/// Validates a regulation name (the semantic rule key).
pub fn validate_regulation_name(name: &str) -> ValidationResult<()> {
    validate_name("regulation name", name, 100)
}

/// Validates a contact phone number.
///
/// The core only requires presence and a sane length; format rules
/// belong to the presentation layer.
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    validate_name("phone", phone, 30)
}

fn validate_name(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.len() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity value (import or checkout line).
///
/// ## Rules
/// - Must be positive (> 0)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates a price in cents.
///
/// ## Rules
/// - Must be non-negative (zero is allowed for promotional items)
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a regulation value.
///
/// ## Rules
/// - Must be finite (regulation values are generic numerics)
/// - Must be non-negative (all current rules are quantities)
pub fn validate_regulation_value(value: f64) -> ValidationResult<()> {
    if !value.is_finite() {
        return Err(ValidationError::Invalid {
            field: "regulation value".to_string(),
            reason: "must be a finite number".to_string(),
        });
    }

    if value < 0.0 {
        return Err(ValidationError::OutOfRange {
            field: "regulation value".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a report month.
pub fn validate_month(month: u32) -> ValidationResult<()> {
    if !(1..=12).contains(&month) {
        return Err(ValidationError::OutOfRange {
            field: "month".to_string(),
            min: 1,
            max: 12,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
