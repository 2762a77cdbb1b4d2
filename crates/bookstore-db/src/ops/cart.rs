//! # Cart Operations
//!
//! Session-cart mutations backed by catalog lookups.
//!
//! The cart itself is pure session state ([`bookstore_core::Cart`]);
//! these functions are the thin layer that resolves the book, applies
//! the stock-bound checks, and returns the recomputed totals the UI
//! shows next to the cart icon. They never write to the store.

use tracing::debug;

use crate::error::StoreResult;
use crate::pool::Database;
use bookstore_core::{
    authorize, Actor, Book, Cart, CartTotals, CoreError, Operation, ValidationError,
};

/// Adds one copy of a book to the cart.
///
/// ## Errors
/// - `Unauthenticated` - no signed-in actor
/// - `BookNotFound` - the id doesn't resolve
/// - `ValidationError` - the book is no longer sold (soft-deleted)
/// - `StockExceeded` - the cart already holds every copy on hand
pub async fn cart_add(
    db: &Database,
    actor: Option<&Actor>,
    cart: &mut Cart,
    book_id: i64,
) -> StoreResult<CartTotals> {
    authorize(actor, Operation::MutateCart)?;

    let book = fetch_book(db, book_id).await?;

    if !book.is_active {
        return Err(ValidationError::Invalid {
            field: "book".to_string(),
            reason: format!("\"{}\" is not available for sale", book.name),
        }
        .into());
    }

    debug!(book_id, "Adding book to cart");
    Ok(cart.add(&book)?)
}

/// Adjusts a cart line's quantity by a signed delta.
///
/// A resulting quantity of zero or less removes the line; a book absent
/// from the cart is a no-op.
///
/// ## Errors
/// - `BookNotFound` - the id doesn't resolve in the catalog
/// - `StockExceeded` - the new quantity exceeds the book's stock
pub async fn cart_update_quantity(
    db: &Database,
    cart: &mut Cart,
    book_id: i64,
    delta: i64,
) -> StoreResult<CartTotals> {
    let book = fetch_book(db, book_id).await?;

    debug!(book_id, delta, "Updating cart quantity");
    Ok(cart.update_quantity(&book, delta)?)
}

/// Removes a line from the cart. No-op when the book isn't in it.
///
/// Purely in-memory: no catalog lookup is needed to take a line out.
pub fn cart_remove(cart: &mut Cart, book_id: i64) -> CartTotals {
    debug!(book_id, "Removing book from cart");
    cart.remove(book_id)
}

async fn fetch_book(db: &Database, book_id: i64) -> StoreResult<Book> {
    db.books()
        .get_by_id(book_id)
        .await?
        .ok_or_else(|| {
            CoreError::BookNotFound {
                book: format!("#{}", book_id),
            }
            .into()
        })
}

// =============================================================================
// Unit Tests
// =============================================================================
