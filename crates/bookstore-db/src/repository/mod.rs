//! # Repository Module
//!
//! Database repository implementations for the bookstore.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  Operation / request handler                                            │
//! │       │                                                                 │
//! │       │  db.books().get_by_name("Atlas")                                │
//! │       ▼                                                                 │
//! │  BookRepository                                                         │
//! │  ├── get_by_id / get_by_name                                            │
//! │  ├── search(keyword, category, page)                                    │
//! │  └── insert / update / soft_delete                                      │
//! │       │                                                                 │
//! │       │  SQL                                                            │
//! │       ▼                                                                 │
//! │  SQLite                                                                 │
//! │                                                                         │
//! │  Repositories are read/CRUD surfaces over the pool. Multi-statement     │
//! │  write flows (imports, checkouts, regulation edits) own their           │
//! │  transactions in the ops module instead, so a repository call is        │
//! │  never half of somebody else's transaction.                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`catalog::BookRepository`] - Book CRUD and search
//! - [`catalog::CategoryRepository`] - Categories and per-category counts
//! - [`regulation::RegulationRepository`] - Active-rule lookups
//! - [`ledger::ImportLedgerRepository`] - Import audit trail
//! - [`receipt::ReceiptRepository`] - Receipt history

pub mod catalog;
pub mod ledger;
pub mod receipt;
pub mod regulation;
