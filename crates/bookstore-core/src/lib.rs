//! # bookstore-core: Pure Business Logic for the Bookstore
//!
//! This crate is the heart of the bookstore. It contains all business
//! logic as pure functions and types with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Bookstore Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │     HTTP / admin UI / session store (external collaborators)    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ bookstore-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐   │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │   auth    │   │   │
//! │  │   │   Book    │  │   Money   │  │   Cart    │  │   roles   │   │   │
//! │  │   │  Receipt  │  │  (cents)  │  │  CartLine │  │   caps    │   │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘   │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 bookstore-db (Database Layer)                   │   │
//! │  │      SQLite queries, migrations, import/checkout engines        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Book, Receipt, Regulation, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`cart`] - The transient per-session cart and its totals
//! - [`auth`] - Roles and the operation capability table
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation rules
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64)
//! 4. **Explicit Errors**: All errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod auth;
pub mod cart;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use auth::{authorize, Operation};
pub use cart::{Cart, CartLine, CartTotals};
pub use error::{CoreError, CoreResult, RegulationViolation, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Semantic name of the minimum-import-quantity regulation.
///
/// A single import submission must bring in at least this many copies of
/// one title. Looked up by the import ledger on every submission.
pub const REG_MIN_IMPORT_QUANTITY: &str = "min_import_quantity";

/// Semantic name of the maximum-stock-ceiling regulation.
///
/// A book's stock may never be pushed above this value by an import.
pub const REG_MAX_STOCK_CEILING: &str = "max_stock_ceiling";

/// Minimum import quantity applied when no regulation row is active.
pub const DEFAULT_MIN_IMPORT_QUANTITY: i64 = 0;

/// Stock ceiling applied when no regulation row is active.
pub const DEFAULT_MAX_STOCK_CEILING: i64 = 300;
