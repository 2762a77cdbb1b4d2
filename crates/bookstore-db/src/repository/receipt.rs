//! # Receipt Repository
//!
//! Read access to the checkout audit trail.
//!
//! Receipts and their lines are written only by `ops::checkout` (in one
//! transaction with the stock decrements) and never change afterwards.

use sqlx::SqlitePool;

use crate::error::DbResult;
use bookstore_core::{Receipt, ReceiptLine};

/// Repository for receipt history.
#[derive(Debug, Clone)]
pub struct ReceiptRepository {
    pool: SqlitePool,
}

impl ReceiptRepository {
    /// Creates a new ReceiptRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReceiptRepository { pool }
    }

    /// Gets a receipt by id.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Receipt>> {
        let receipt = sqlx::query_as::<_, Receipt>(
            r#"
            SELECT id, user_id, delivery_method, payment_method,
                   delivery_address, phone, email, created_at
            FROM receipts
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(receipt)
    }

    /// Gets all lines of a receipt.
    pub async fn lines(&self, receipt_id: i64) -> DbResult<Vec<ReceiptLine>> {
        let lines = sqlx::query_as::<_, ReceiptLine>(
            r#"
            SELECT receipt_id, book_id, quantity, unit_price_cents
            FROM receipt_lines
            WHERE receipt_id = ?1
            ORDER BY book_id
            "#,
        )
        .bind(receipt_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    /// Lists a user's receipts, newest-first (the order-history view).
    pub async fn list_for_user(&self, user_id: i64) -> DbResult<Vec<Receipt>> {
        let receipts = sqlx::query_as::<_, Receipt>(
            r#"
            SELECT id, user_id, delivery_method, payment_method,
                   delivery_address, phone, email, created_at
            FROM receipts
            WHERE user_id = ?1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(receipts)
    }

    /// Counts all receipts (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM receipts")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::cart::cart_add;
    use crate::ops::checkout::{checkout, CheckoutRequest};
    use crate::ops::import::{record_import, ImportRequest};
    use crate::pool::{Database, DbConfig};
    use bookstore_core::{Actor, Cart, DeliveryMethod, PaymentMethod, UserRole};

    async fn buy_once(db: &Database, buyer: &Actor, book_id: i64) -> i64 {
        let mut cart = Cart::new();
        cart_add(db, Some(buyer), &mut cart, book_id).await.unwrap();
        checkout(
            db,
            buyer,
            &mut cart,
            CheckoutRequest {
                delivery_method: DeliveryMethod::Store,
                payment_method: PaymentMethod::Cod,
                delivery_address: None,
                phone: "555-0199".to_string(),
                email: None,
            },
        )
        .await
        .unwrap()
        .receipt
        .id
    }

    #[tokio::test]
    async fn test_order_history() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let book_id = record_import(
            &db,
            &Actor::new(1, UserRole::Admin),
            ImportRequest {
                book_name: "Atlas".to_string(),
                category_name: "Travel".to_string(),
                quantity: 10,
                unit_price_cents: 1250,
                import_date: None,
            },
        )
        .await
        .unwrap()
        .book_id;

        let reader = Actor::new(42, UserRole::User);
        let other = Actor::new(43, UserRole::User);

        let first = buy_once(&db, &reader, book_id).await;
        let second = buy_once(&db, &reader, book_id).await;
        buy_once(&db, &other, book_id).await;

        // Only the reader's receipts, newest-first
        let history = db.receipts().list_for_user(reader.id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert!(history.iter().all(|r| r.user_id == reader.id));
        assert_eq!(history[0].id, second);
        assert_eq!(history[1].id, first);

        let lines = db.receipts().lines(first).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].book_id, book_id);
        assert_eq!(lines[0].line_total().cents(), 1250);

        assert_eq!(db.receipts().count().await.unwrap(), 3);
        assert!(db.receipts().get_by_id(999).await.unwrap().is_none());
    }
}
