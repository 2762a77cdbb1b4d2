//! # Domain Types
//!
//! Core domain types used throughout the bookstore.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Book       │   │     Receipt     │   │  ImportEntry    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (i64)       │   │  id (i64)       │   │  id (i64)       │       │
//! │  │  name           │   │  user_id        │   │  book_id        │       │
//! │  │  price_cents    │   │  delivery/pay   │   │  quantity       │       │
//! │  │  stock          │   │  created_at     │   │  import_date    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   Regulation    │   │ DeliveryMethod  │   │ PaymentMethod   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  name + value   │   │  Home           │   │  Cod            │       │
//! │  │  is_active      │   │  Store          │   │  Online         │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every persisted entity is keyed by an integer autoincrement id; the
//! audit entities (ImportEntry, RegulationSnapshot, Receipt, ReceiptLine)
//! are immutable once committed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Book & Category
// =============================================================================

/// A book in the catalog.
///
/// The `stock` counter is owned exclusively by the import ledger
/// (increments) and the checkout engine (decrements); nothing else may
/// mutate it. It is never negative after a committed operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Book {
    pub id: i64,

    /// Display name, unique across the catalog - imports resolve books
    /// by name.
    pub name: String,

    pub author: Option<String>,

    pub description: Option<String>,

    /// Unit price in cents (smallest currency unit).
    pub price_cents: i64,

    /// Copies currently on hand.
    pub stock: i64,

    pub category_id: i64,

    /// Whether the book is visible for sale (soft delete).
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
}

impl Book {
    /// Returns the unit price as a Money value.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

/// A book category. Created on demand when an import references an
/// unknown category name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct BookCategory {
    pub id: i64,
    pub name: String,
}

// =============================================================================
// Regulation
// =============================================================================

/// A named numeric business rule, e.g. the minimum import quantity or
/// the maximum stock ceiling.
///
/// Rows with the same name across history form the rule's version
/// trail; at most one row per name is active, and only active rows
/// govern new operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Regulation {
    pub id: i64,
    pub name: String,
    pub value: f64,
    pub is_active: bool,
}

impl Regulation {
    /// The rule value as a whole quantity.
    ///
    /// Regulation values are stored as generic numerics; quantity-valued
    /// rules (minimum import, stock ceiling) are read through this.
    #[inline]
    pub fn quantity_value(&self) -> i64 {
        self.value as i64
    }
}

// =============================================================================
// Import Ledger
// =============================================================================

/// A recorded stock-in event. Immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ImportEntry {
    pub id: i64,

    /// The imported book, resolved (or created) before the entry commits.
    pub book_id: i64,

    /// Book name at submission time, denormalized for the audit view.
    pub book_name: String,

    /// Copies brought in. Always positive.
    pub quantity: i64,

    /// Purchase price per copy, in cents.
    pub unit_price_cents: i64,

    pub import_date: DateTime<Utc>,
}

/// The value a regulation had at the moment an import entry was
/// recorded.
///
/// Created atomically with its ImportEntry and never updated: later
/// edits to the regulation do not rewrite history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct RegulationSnapshot {
    pub import_entry_id: i64,
    pub regulation_id: i64,
    pub name: String,
    pub value: f64,
}

// =============================================================================
// Receipt
// =============================================================================

/// How a checkout is delivered to the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMethod {
    /// Shipped to a delivery address (address required).
    Home,
    /// Picked up in store.
    Store,
}

/// How a checkout is paid. The method is recorded, not processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash on delivery.
    Cod,
    /// Online payment.
    Online,
}

/// A recorded checkout. Created exactly once per successful checkout,
/// immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Receipt {
    pub id: i64,

    /// The purchasing user, attributed from the authenticated actor.
    pub user_id: i64,

    pub delivery_method: DeliveryMethod,

    pub payment_method: PaymentMethod,

    /// Present exactly when `delivery_method` is Home.
    pub delivery_address: Option<String>,

    pub phone: String,

    pub email: Option<String>,

    pub created_at: DateTime<Utc>,
}

/// A line item of a receipt.
///
/// `unit_price_cents` is the add-to-cart price snapshot, which is not
/// necessarily the catalog price at checkout time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ReceiptLine {
    pub receipt_id: i64,
    pub book_id: i64,
    pub quantity: i64,
    pub unit_price_cents: i64,
}

impl ReceiptLine {
    /// Line total (unit price × quantity).
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.unit_price_cents).multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Actor
// =============================================================================

/// The roles a signed-in actor can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    User,
    WarehouseManager,
    Staff,
}

/// The authenticated identity supplied by the surrounding session layer.
///
/// The user store itself (credentials, profiles) belongs to an external
/// collaborator; the core only needs the id for receipt attribution and
/// the role for capability checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: i64,
    pub role: UserRole,
}

impl Actor {
    /// Creates an actor from its parts.
    pub const fn new(id: i64, role: UserRole) -> Self {
        Actor { id, role }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_book_price_as_money() {
        let book = Book {
            id: 1,
            name: "Atlas".to_string(),
            author: None,
            description: None,
            price_cents: 1250,
            stock: 5,
            category_id: 1,
            is_active: true,
            created_at: Utc::now(),
        };
        assert_eq!(book.price().cents(), 1250);
    }

    #[test]
    fn test_regulation_quantity_value_truncates() {
        let reg = Regulation {
            id: 1,
            name: "min_import_quantity".to_string(),
            value: 2.9,
            is_active: true,
        };
        assert_eq!(reg.quantity_value(), 2);
    }

    #[test]
    fn test_receipt_line_total() {
        let line = ReceiptLine {
            receipt_id: 1,
            book_id: 2,
            quantity: 3,
            unit_price_cents: 499,
        };
        assert_eq!(line.line_total().cents(), 1497);
    }
}
