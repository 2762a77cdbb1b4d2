//! # bookstore-db: Database Layer for the Bookstore
//!
//! This crate provides storage and the transactional operations for the
//! bookstore core. It uses SQLite with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Bookstore Data Flow                              │
//! │                                                                         │
//! │  Request handler (HTTP/admin UI - external)                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   bookstore-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────────┐   ┌────────────────┐   ┌─────────────────┐  │   │
//! │  │   │   Database   │   │  Repositories  │   │      Ops        │  │   │
//! │  │   │  (pool.rs)   │   │ catalog, reg., │   │ import,checkout │  │   │
//! │  │   │              │   │ ledger,receipt │   │ cart, reports   │  │   │
//! │  │   │  SqlitePool  │◄──│  reads/CRUD    │◄──│  transactions   │  │   │
//! │  │   └──────────────┘   └────────────────┘   └─────────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database (WAL mode, embedded migrations)                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - DbError and the StoreError operations boundary
//! - [`repository`] - Read/CRUD repositories (catalog, regulations,
//!   ledger, receipts)
//! - [`ops`] - The transactional operations: imports, checkout, cart,
//!   regulation edits, reports
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bookstore_db::{Database, DbConfig};
//! use bookstore_db::ops::import::{record_import, ImportRequest};
//!
//! let db = Database::new(DbConfig::new("bookstore.db")).await?;
//!
//! let outcome = record_import(&db, &actor, ImportRequest {
//!     book_name: "Atlas".into(),
//!     category_name: "Travel".into(),
//!     quantity: 20,
//!     unit_price_cents: 1250,
//!     import_date: None,
//! }).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod ops;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult, StoreError, StoreResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::catalog::{BookRepository, CategoryRepository, NewBook};
pub use repository::ledger::ImportLedgerRepository;
pub use repository::receipt::ReceiptRepository;
pub use repository::regulation::RegulationRepository;
