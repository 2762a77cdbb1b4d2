//! # Operations Module
//!
//! The entry points the surrounding application calls: each function is
//! one capability-gated, all-or-nothing operation against the store.
//!
//! ## Transaction Boundaries
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    One Operation = One Transaction                      │
//! │                                                                         │
//! │  record_import ──► resolve category ─► rule checks ─► stock + entry     │
//! │                    └────────────── all in one tx ───────────────┘       │
//! │                                                                         │
//! │  checkout ───────► validate lines ─► receipt ─► lines + decrements      │
//! │                    └────────────── all in one tx ───────────────┘       │
//! │                                                                         │
//! │  regulation edit ► deactivate predecessor ─► write row                  │
//! │                    └──────────── one tx ────────────┘                   │
//! │                                                                         │
//! │  Any failure inside a box rolls the whole box back. No operation        │
//! │  ever observes another one half-committed, and no failure path          │
//! │  leaves a partial mutation behind.                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Cart operations are the exception: the cart is session state, so they
//! only read the store (for stock checks) and mutate the caller's cart.
//!
//! ## Available Operations
//!
//! - [`import::record_import`] - the stock-in workflow
//! - [`checkout::checkout`] - cart → receipt, with atomic stock decrements
//! - [`cart`] - session-cart mutations with stock checks
//! - [`regulation`] - regulation upsert / edit / delete
//! - [`report`] - monthly revenue and units-sold aggregations

pub mod cart;
pub mod checkout;
pub mod import;
pub mod regulation;
pub mod report;
