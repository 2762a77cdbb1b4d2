//! # Cart
//!
//! The transient, per-session shopping cart.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Lifecycle                                       │
//! │                                                                         │
//! │  ┌──────────┐      ┌──────────┐      ┌──────────┐      ┌──────────┐    │
//! │  │  Empty   │─────►│  Lines   │─────►│ Checkout │─────►│ Receipt  │    │
//! │  │  Cart    │      │  added   │      │          │      │ persisted│    │
//! │  └──────────┘      └──────────┘      └──────────┘      └──────────┘    │
//! │                         │                                   │           │
//! │                    add / update /                      checked-out      │
//! │                    remove                              lines cleared    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The cart is never persisted to durable storage; it lives in whatever
//! session store the surrounding application uses and is passed into the
//! operations by value or mutable reference. Totals are recomputed from
//! the lines on every query, so they can never drift out of sync with
//! the line contents.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::Book;

// =============================================================================
// Cart Line
// =============================================================================

/// One candidate purchase line.
///
/// `unit_price_cents` is frozen at add-to-cart time: if the catalog
/// price changes afterwards, the cart (and the eventual receipt line)
/// keeps the price the customer saw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub book_id: i64,

    /// Book name at add time, for display.
    pub name: String,

    /// Price snapshot at add time, in cents.
    pub unit_price_cents: i64,

    pub quantity: i64,
}

impl CartLine {
    /// Creates a line from a catalog book with quantity 1.
    pub fn from_book(book: &Book) -> Self {
        CartLine {
            book_id: book.id,
            name: book.name.clone(),
            unit_price_cents: book.price_cents,
            quantity: 1,
        }
    }

    /// Line total (unit price × quantity).
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.unit_price_cents).multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Cart Totals
// =============================================================================

/// Aggregate totals over all cart lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartTotals {
    /// Sum of line quantities.
    pub total_quantity: i64,

    /// Sum of line totals, in cents.
    pub total_amount_cents: i64,
}

impl CartTotals {
    /// The total as a Money value.
    #[inline]
    pub fn total_amount(&self) -> Money {
        Money::from_cents(self.total_amount_cents)
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The shopping cart: an ordered sequence of lines, keyed by book id.
///
/// ## Invariants
/// - Lines are unique by `book_id` (adding the same book increments its
///   quantity)
/// - Every line's quantity is > 0 (an update that reaches 0 removes the
///   line)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { lines: Vec::new() }
    }

    /// Checks if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Quantity of a book currently in the cart (0 if absent).
    pub fn quantity_of(&self, book_id: i64) -> i64 {
        self.lines
            .iter()
            .find(|l| l.book_id == book_id)
            .map(|l| l.quantity)
            .unwrap_or(0)
    }

    /// Adds one copy of a book, inserting a new line or incrementing an
    /// existing one.
    ///
    /// Fails with `StockExceeded` when the cart already holds every copy
    /// the catalog has on hand.
    pub fn add(&mut self, book: &Book) -> CoreResult<CartTotals> {
        let in_cart = self.quantity_of(book.id);

        if in_cart + 1 > book.stock {
            return Err(CoreError::StockExceeded {
                book: book.name.clone(),
                in_cart,
                available: book.stock,
            });
        }

        match self.lines.iter_mut().find(|l| l.book_id == book.id) {
            Some(line) => line.quantity += 1,
            None => self.lines.push(CartLine::from_book(book)),
        }

        Ok(self.totals())
    }

    /// Adjusts a line's quantity by a signed delta.
    ///
    /// ## Behavior
    /// - Resulting quantity above the book's stock: `StockExceeded`
    /// - Resulting quantity ≤ 0: the line is removed
    /// - Book not in the cart: no-op (totals returned unchanged)
    pub fn update_quantity(&mut self, book: &Book, delta: i64) -> CoreResult<CartTotals> {
        let Some(pos) = self.lines.iter().position(|l| l.book_id == book.id) else {
            return Ok(self.totals());
        };

        let current = self.lines[pos].quantity;
        let new_quantity = current + delta;

        if new_quantity > book.stock {
            return Err(CoreError::StockExceeded {
                book: book.name.clone(),
                in_cart: current,
                available: book.stock,
            });
        }

        if new_quantity <= 0 {
            self.lines.remove(pos);
        } else {
            self.lines[pos].quantity = new_quantity;
        }

        Ok(self.totals())
    }

    /// Removes a line by book id. No-op when the book isn't in the cart.
    pub fn remove(&mut self, book_id: i64) -> CartTotals {
        self.lines.retain(|l| l.book_id != book_id);
        self.totals()
    }

    /// Removes the lines for the given book ids, keeping the rest.
    ///
    /// Used after a successful checkout: only the paid-for lines leave
    /// the session cart.
    pub fn clear_lines(&mut self, book_ids: &[i64]) {
        self.lines.retain(|l| !book_ids.contains(&l.book_id));
    }

    /// Clears all lines.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Recomputes the aggregate totals from the current lines.
    pub fn totals(&self) -> CartTotals {
        let total_quantity = self.lines.iter().map(|l| l.quantity).sum();
        let total_amount_cents = self.lines.iter().map(|l| l.line_total().cents()).sum();

        CartTotals {
            total_quantity,
            total_amount_cents,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn test_book(id: i64, price_cents: i64, stock: i64) -> Book {
        Book {
            id,
            name: format!("Book {}", id),
            author: None,
            description: None,
            price_cents,
            stock,
            category_id: 1,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_add_inserts_then_increments() {
        let mut cart = Cart::new();
        let book = test_book(1, 999, 10);

        let totals = cart.add(&book).unwrap();
        assert_eq!(totals.total_quantity, 1);
        assert_eq!(totals.total_amount_cents, 999);

        let totals = cart.add(&book).unwrap();
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(totals.total_quantity, 2);
        assert_eq!(totals.total_amount_cents, 1998);
    }

    #[test]
    fn test_add_respects_stock() {
        let mut cart = Cart::new();
        let book = test_book(1, 999, 2);

        cart.add(&book).unwrap();
        cart.add(&book).unwrap();

        let err = cart.add(&book).unwrap_err();
        assert!(matches!(
            err,
            CoreError::StockExceeded {
                in_cart: 2,
                available: 2,
                ..
            }
        ));
        assert_eq!(cart.totals().total_quantity, 2);
    }

    #[test]
    fn test_update_quantity_to_zero_removes_line() {
        let mut cart = Cart::new();
        let book = test_book(1, 500, 5);

        cart.add(&book).unwrap();
        let totals = cart.update_quantity(&book, -1).unwrap();

        assert!(cart.is_empty());
        assert_eq!(totals.total_quantity, 0);
        assert_eq!(totals.total_amount_cents, 0);
    }

    #[test]
    fn test_update_quantity_respects_stock() {
        let mut cart = Cart::new();
        let book = test_book(1, 500, 3);

        cart.add(&book).unwrap();
        let err = cart.update_quantity(&book, 3).unwrap_err();
        assert!(matches!(err, CoreError::StockExceeded { .. }));

        // Cart is unchanged after the failed update
        assert_eq!(cart.quantity_of(1), 1);
    }

    #[test]
    fn test_update_quantity_missing_line_is_noop() {
        let mut cart = Cart::new();
        let book = test_book(1, 500, 5);

        let totals = cart.update_quantity(&book, 2).unwrap();
        assert_eq!(totals.total_quantity, 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_then_remove_round_trips_totals() {
        let mut cart = Cart::new();
        let kept = test_book(1, 999, 10);
        let churned = test_book(2, 450, 10);

        cart.add(&kept).unwrap();
        let before = cart.totals();

        cart.add(&churned).unwrap();
        let after = cart.remove(2);

        assert_eq!(after, before);
    }

    #[test]
    fn test_clear_lines_keeps_other_lines() {
        let mut cart = Cart::new();
        let a = test_book(1, 100, 10);
        let b = test_book(2, 200, 10);
        let c = test_book(3, 300, 10);

        cart.add(&a).unwrap();
        cart.add(&b).unwrap();
        cart.add(&c).unwrap();

        cart.clear_lines(&[1, 3]);

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].book_id, 2);
    }

    #[test]
    fn test_price_is_frozen_at_add_time() {
        let mut cart = Cart::new();
        let mut book = test_book(1, 999, 10);

        cart.add(&book).unwrap();

        // Catalog price changes after the line was added
        book.price_cents = 1299;
        cart.add(&book).unwrap();

        // Both copies keep the original snapshot price
        assert_eq!(cart.totals().total_amount_cents, 1998);
    }
}
