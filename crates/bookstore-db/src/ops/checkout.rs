//! # Checkout Operation
//!
//! Turns a session cart into a persisted receipt, decrementing stock
//! atomically.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  checkout(cart, Home, Cod, address, phone)                              │
//! │                                                                         │
//! │  authorize + validate (empty cart? address present for Home?)           │
//! │       │                                       (no mutation yet)         │
//! │       ▼  BEGIN                                                          │
//! │  1. pre-validate EVERY line: book exists, stock >= quantity             │
//! │  2. insert receipt                                                      │
//! │  3. per line: insert receipt_line, then                                 │
//! │                                                                         │
//! │     UPDATE books SET stock = stock - ?qty                               │
//! │     WHERE id = ?id AND stock >= ?qty                                    │
//! │                                                                         │
//! │     0 rows affected → a concurrent checkout won the race → ROLLBACK     │
//! │       ▼  COMMIT                                                         │
//! │  4. clear the paid-for lines from the session cart                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The conditional UPDATE is what makes step 3 safe: the sufficiency
//! check in step 1 and the decrement are not one atomic step, so the
//! decrement re-checks. Stock can never be driven below zero, even by
//! two checkouts racing over the last copies.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::StoreResult;
use crate::pool::Database;
use bookstore_core::{
    authorize, validation, Actor, Cart, CoreError, DeliveryMethod, Money, Operation,
    PaymentMethod, Receipt, ReceiptLine, ValidationError,
};

// =============================================================================
// Request / Outcome
// =============================================================================

/// Delivery and payment details for one checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub delivery_method: DeliveryMethod,
    pub payment_method: PaymentMethod,

    /// Required when `delivery_method` is Home; ignored for Store.
    pub delivery_address: Option<String>,

    pub phone: String,

    pub email: Option<String>,
}

/// A committed checkout: the receipt, its lines, and the charged total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutOutcome {
    pub receipt: Receipt,
    pub lines: Vec<ReceiptLine>,
    pub total: Money,
}

// =============================================================================
// Operation
// =============================================================================

/// Checks out a cart into a receipt.
///
/// Validates every line against live stock before touching anything,
/// then persists the receipt, its lines and the stock decrements as one
/// atomic unit. On success the paid-for lines are removed from the
/// session cart (other lines, if any, survive).
///
/// ## Errors
/// - `Unauthenticated` / `Unauthorized` - actor gating
/// - `EmptyCart` - the cart has no lines
/// - `ValidationError` - missing delivery address for Home, missing phone
/// - `BookNotFound` - a cart line's book vanished from the catalog
/// - `InsufficientStock` - a line asks for more than is on hand; no
///   book's stock changes
/// - `DbError` - unexpected persistence failure; fully rolled back
pub async fn checkout(
    db: &Database,
    actor: &Actor,
    cart: &mut Cart,
    request: CheckoutRequest,
) -> StoreResult<CheckoutOutcome> {
    authorize(Some(actor), Operation::Checkout)?;

    if cart.is_empty() {
        return Err(CoreError::EmptyCart.into());
    }

    validation::validate_phone(&request.phone)?;

    // Address is required exactly when the order ships home.
    let delivery_address = match request.delivery_method {
        DeliveryMethod::Home => {
            let address = request
                .delivery_address
                .as_deref()
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .ok_or_else(|| ValidationError::Required {
                    field: "delivery address".to_string(),
                })?;
            Some(address.to_string())
        }
        DeliveryMethod::Store => None,
    };

    debug!(lines = cart.lines().len(), user_id = actor.id, "Checking out cart");

    let mut tx = db.pool().begin().await?;

    // 1. Pre-validate every line before any write: a cart with one bad
    //    line must not touch any book's stock.
    for line in cart.lines() {
        let stock: Option<i64> = sqlx::query_scalar("SELECT stock FROM books WHERE id = ?1")
            .bind(line.book_id)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(stock) = stock else {
            return Err(CoreError::BookNotFound {
                book: line.name.clone(),
            }
            .into());
        };

        if stock < line.quantity {
            return Err(CoreError::InsufficientStock {
                book: line.name.clone(),
                available: stock,
                requested: line.quantity,
            }
            .into());
        }
    }

    // 2. The receipt row.
    let created_at = Utc::now();
    let result = sqlx::query(
        r#"
        INSERT INTO receipts (user_id, delivery_method, payment_method,
                              delivery_address, phone, email, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(actor.id)
    .bind(request.delivery_method)
    .bind(request.payment_method)
    .bind(&delivery_address)
    .bind(request.phone.trim())
    .bind(&request.email)
    .bind(created_at)
    .execute(&mut *tx)
    .await?;

    let receipt_id = result.last_insert_rowid();

    // 3. Lines + conditional decrements.
    let mut lines = Vec::with_capacity(cart.lines().len());

    for line in cart.lines() {
        sqlx::query(
            r#"
            INSERT INTO receipt_lines (receipt_id, book_id, quantity, unit_price_cents)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(receipt_id)
        .bind(line.book_id)
        .bind(line.quantity)
        .bind(line.unit_price_cents)
        .execute(&mut *tx)
        .await?;

        let updated = sqlx::query(
            "UPDATE books SET stock = stock - ?2 WHERE id = ?1 AND stock >= ?2",
        )
        .bind(line.book_id)
        .bind(line.quantity)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            // A concurrent checkout drained the stock between the
            // pre-validation pass and this decrement.
            let available: Option<i64> =
                sqlx::query_scalar("SELECT stock FROM books WHERE id = ?1")
                    .bind(line.book_id)
                    .fetch_optional(&mut *tx)
                    .await?;

            return Err(CoreError::InsufficientStock {
                book: line.name.clone(),
                available: available.unwrap_or(0),
                requested: line.quantity,
            }
            .into());
        }

        lines.push(ReceiptLine {
            receipt_id,
            book_id: line.book_id,
            quantity: line.quantity,
            unit_price_cents: line.unit_price_cents,
        });
    }

    let total = cart.totals().total_amount();

    tx.commit().await?;

    // 4. Only now, with the receipt durable, drop the paid-for lines.
    let charged: Vec<i64> = lines.iter().map(|l| l.book_id).collect();
    cart.clear_lines(&charged);

    info!(
        receipt_id,
        user_id = actor.id,
        lines = lines.len(),
        total = %total,
        "Checkout committed"
    );

    Ok(CheckoutOutcome {
        receipt: Receipt {
            id: receipt_id,
            user_id: actor.id,
            delivery_method: request.delivery_method,
            payment_method: request.payment_method,
            delivery_address,
            phone: request.phone.trim().to_string(),
            email: request.email,
            created_at,
        },
        lines,
        total,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::ops::import::{record_import, ImportRequest};
    use crate::ops::regulation::upsert_regulation;
    use crate::pool::DbConfig;
    use bookstore_core::{
        Book, RegulationViolation, UserRole, REG_MAX_STOCK_CEILING, REG_MIN_IMPORT_QUANTITY,
    };

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn admin() -> Actor {
        Actor::new(1, UserRole::Admin)
    }

    fn customer() -> Actor {
        Actor::new(42, UserRole::User)
    }

    fn store_pickup(phone: &str) -> CheckoutRequest {
        CheckoutRequest {
            delivery_method: DeliveryMethod::Store,
            payment_method: PaymentMethod::Cod,
            delivery_address: None,
            phone: phone.to_string(),
            email: None,
        }
    }

    async fn import_book(db: &Database, name: &str, qty: i64, price_cents: i64) -> Book {
        record_import(
            db,
            &admin(),
            ImportRequest {
                book_name: name.to_string(),
                category_name: "Fiction".to_string(),
                quantity: qty,
                unit_price_cents: price_cents,
                import_date: None,
            },
        )
        .await
        .unwrap();
        db.books().get_by_name(name).await.unwrap().unwrap()
    }

    /// A cart line for more copies than the catalog will sell has to be
    /// forged (Cart::add enforces the stock bound), which is exactly the
    /// stale-cart situation checkout must handle.
    fn add_forged(cart: &mut Cart, book: &Book, quantity: i64) {
        let mut inflated = book.clone();
        inflated.stock = i64::MAX;
        for _ in 0..quantity {
            cart.add(&inflated).unwrap();
        }
    }

    #[tokio::test]
    async fn test_empty_cart_is_rejected() {
        let db = test_db().await;
        let mut cart = Cart::new();

        let err = checkout(&db, &customer(), &mut cart, store_pickup("555-0199"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Core(CoreError::EmptyCart)));
    }

    #[tokio::test]
    async fn test_home_delivery_requires_address() {
        let db = test_db().await;
        let book = import_book(&db, "Atlas", 5, 1250).await;

        let mut cart = Cart::new();
        cart.add(&book).unwrap();

        let request = CheckoutRequest {
            delivery_method: DeliveryMethod::Home,
            payment_method: PaymentMethod::Online,
            delivery_address: None,
            phone: "555-0199".to_string(),
            email: None,
        };

        let err = checkout(&db, &customer(), &mut cart, request).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Core(CoreError::Validation(ValidationError::Required { .. }))
        ));

        // Nothing was persisted, the cart still holds its line.
        assert_eq!(db.receipts().count().await.unwrap(), 0);
        assert!(!cart.is_empty());
    }

    #[tokio::test]
    async fn test_vanished_book_fails_checkout() {
        let db = test_db().await;
        let mut cart = Cart::new();

        // A line whose book was never persisted (stale session data).
        let ghost = Book {
            id: 999,
            name: "Ghost".to_string(),
            author: None,
            description: None,
            price_cents: 100,
            stock: 5,
            category_id: 1,
            is_active: true,
            created_at: Utc::now(),
        };
        cart.add(&ghost).unwrap();

        let err = checkout(&db, &customer(), &mut cart, store_pickup("555-0199"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Core(CoreError::BookNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_insufficient_stock_is_all_or_nothing() {
        let db = test_db().await;
        let plenty = import_book(&db, "Atlas", 10, 1250).await;
        let scarce = import_book(&db, "Rare Maps", 1, 9900).await;

        let mut cart = Cart::new();
        cart.add(&plenty).unwrap();
        add_forged(&mut cart, &scarce, 3);

        let err = checkout(&db, &customer(), &mut cart, store_pickup("555-0199"))
            .await
            .unwrap_err();
        match err {
            StoreError::Core(CoreError::InsufficientStock {
                available,
                requested,
                ..
            }) => {
                assert_eq!(available, 1);
                assert_eq!(requested, 3);
            }
            other => panic!("expected InsufficientStock, got {:?}", other),
        }

        // Neither book's stock moved, no receipt exists.
        assert_eq!(db.books().get_by_id(plenty.id).await.unwrap().unwrap().stock, 10);
        assert_eq!(db.books().get_by_id(scarce.id).await.unwrap().unwrap().stock, 1);
        assert_eq!(db.receipts().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_successful_checkout() {
        let db = test_db().await;
        let atlas = import_book(&db, "Atlas", 10, 1250).await;
        let primer = import_book(&db, "Primer", 4, 800).await;

        let buyer = customer();
        let mut cart = Cart::new();
        cart.add(&atlas).unwrap();
        cart.add(&atlas).unwrap();
        cart.add(&primer).unwrap();

        let outcome = checkout(
            &db,
            &buyer,
            &mut cart,
            CheckoutRequest {
                delivery_method: DeliveryMethod::Home,
                payment_method: PaymentMethod::Online,
                delivery_address: Some("12 Shelf Lane".to_string()),
                phone: "555-0199".to_string(),
                email: Some("reader@example.com".to_string()),
            },
        )
        .await
        .unwrap();

        // Exactly one receipt, one line per cart line, attributed to the
        // buyer.
        assert_eq!(outcome.lines.len(), 2);
        assert_eq!(outcome.receipt.user_id, buyer.id);
        assert_eq!(outcome.total.cents(), 2 * 1250 + 800);

        let persisted = db.receipts().get_by_id(outcome.receipt.id).await.unwrap().unwrap();
        assert_eq!(persisted.delivery_method, DeliveryMethod::Home);
        assert_eq!(persisted.delivery_address.as_deref(), Some("12 Shelf Lane"));

        let lines = db.receipts().lines(outcome.receipt.id).await.unwrap();
        assert_eq!(lines.len(), 2);

        // Stock decremented by exactly the cart quantities.
        assert_eq!(db.books().get_by_id(atlas.id).await.unwrap().unwrap().stock, 8);
        assert_eq!(db.books().get_by_id(primer.id).await.unwrap().unwrap().stock, 3);

        // The paid-for lines left the cart.
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_unpaid_lines_survive_in_cart() {
        let db = test_db().await;
        let atlas = import_book(&db, "Atlas", 10, 1250).await;
        let primer = import_book(&db, "Primer", 4, 800).await;

        // The session cart holds two lines, but only the Atlas line is
        // part of the checked-out cart.
        let mut session_cart = Cart::new();
        session_cart.add(&atlas).unwrap();
        session_cart.add(&primer).unwrap();

        let mut checkout_cart = Cart::new();
        checkout_cart.add(&atlas).unwrap();

        let outcome = checkout(&db, &customer(), &mut checkout_cart, store_pickup("555-0199"))
            .await
            .unwrap();

        let charged: Vec<i64> = outcome.lines.iter().map(|l| l.book_id).collect();
        session_cart.clear_lines(&charged);

        assert_eq!(session_cart.lines().len(), 1);
        assert_eq!(session_cart.lines()[0].book_id, primer.id);
    }

    #[tokio::test]
    async fn test_receipt_keeps_cart_price_snapshot() {
        let db = test_db().await;
        let atlas = import_book(&db, "Atlas", 10, 1250).await;

        let mut cart = Cart::new();
        cart.add(&atlas).unwrap();

        // The catalog price changes after the book entered the cart.
        let mut repriced = db.books().get_by_id(atlas.id).await.unwrap().unwrap();
        repriced.price_cents = 1999;
        db.books().update(&repriced).await.unwrap();

        let outcome = checkout(&db, &customer(), &mut cart, store_pickup("555-0199"))
            .await
            .unwrap();

        assert_eq!(outcome.lines[0].unit_price_cents, 1250);
    }

    /// The full replenish-then-sell scenario: ceiling 10, minimum 2,
    /// Atlas starts at 5.
    #[tokio::test]
    async fn test_import_checkout_scenario() {
        let db = test_db().await;
        let admin = admin();

        upsert_regulation(&db, &admin, REG_MAX_STOCK_CEILING, 10.0, true)
            .await
            .unwrap();
        upsert_regulation(&db, &admin, REG_MIN_IMPORT_QUANTITY, 2.0, true)
            .await
            .unwrap();

        let atlas = import_book(&db, "Atlas", 5, 1250).await;
        assert_eq!(atlas.stock, 5);

        // +3 passes the minimum and stays under the ceiling: stock 8.
        record_import(
            &db,
            &admin,
            ImportRequest {
                book_name: "Atlas".to_string(),
                category_name: "Fiction".to_string(),
                quantity: 3,
                unit_price_cents: 1250,
                import_date: None,
            },
        )
        .await
        .unwrap();
        let atlas = db.books().get_by_id(atlas.id).await.unwrap().unwrap();
        assert_eq!(atlas.stock, 8);

        // +5 would reach 13 > 10: rejected, room for 2 more.
        let err = record_import(
            &db,
            &admin,
            ImportRequest {
                book_name: "Atlas".to_string(),
                category_name: "Fiction".to_string(),
                quantity: 5,
                unit_price_cents: 1250,
                import_date: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Core(CoreError::Regulation(
                RegulationViolation::CeilingExceeded {
                    allowed_remainder: 2,
                    ..
                }
            ))
        ));

        // A cart asking for 9 of the 8 on hand fails...
        let mut cart = Cart::new();
        add_forged(&mut cart, &atlas, 9);
        let err = checkout(&db, &customer(), &mut cart, store_pickup("555-0199"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Core(CoreError::InsufficientStock { available: 8, .. })
        ));

        // ...and 8 of 8 succeeds, draining the stock to zero.
        let mut cart = Cart::new();
        for _ in 0..8 {
            cart.add(&atlas).unwrap();
        }
        checkout(&db, &customer(), &mut cart, store_pickup("555-0199"))
            .await
            .unwrap();

        assert_eq!(db.books().get_by_id(atlas.id).await.unwrap().unwrap().stock, 0);
    }
}
