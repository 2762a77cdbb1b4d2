//! # Import Operation
//!
//! The stock-in workflow: one warehouse import submission becomes a
//! stock increment (or a new book), an immutable import entry, and one
//! regulation snapshot per rule in force.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  record_import("Atlas", "Travel", qty 3, $12.50)                        │
//! │                                                                         │
//! │  authorize + validate inputs            (no mutation yet)               │
//! │       │                                                                 │
//! │       ▼  BEGIN                                                          │
//! │  1. resolve or create category "Travel"                                 │
//! │  2. resolve book "Atlas"                                                │
//! │       ├── qty < min_import_quantity?        → BelowMinimum, ROLLBACK    │
//! │       ├── stock + qty > max_stock_ceiling?  → CeilingExceeded, ROLLBACK │
//! │       ├── existing book → stock += qty                                  │
//! │       └── new book      → insert with stock = qty                       │
//! │  3. insert import entry                                                 │
//! │  4. snapshot every active regulation                                    │
//! │       ▼  COMMIT                                                         │
//! │                                                                         │
//! │  A rollback undoes the category creation too - a rejected import        │
//! │  never leaves an orphan category behind.                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqliteConnection;
use tracing::{debug, info};

use crate::error::StoreResult;
use crate::pool::Database;
use bookstore_core::{
    authorize, validation, Actor, Operation, RegulationViolation, DEFAULT_MAX_STOCK_CEILING,
    DEFAULT_MIN_IMPORT_QUANTITY, REG_MAX_STOCK_CEILING, REG_MIN_IMPORT_QUANTITY,
};

// =============================================================================
// Request / Outcome
// =============================================================================

/// One import submission, as received from the warehouse form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRequest {
    /// The imported title. Resolves an existing book by exact name, or
    /// creates a new one.
    pub book_name: String,

    /// The book's category; created on demand if unknown.
    pub category_name: String,

    /// Copies brought in. Must be positive.
    pub quantity: i64,

    /// Purchase price per copy, in cents. Becomes the sale price when
    /// the import creates a new book.
    pub unit_price_cents: i64,

    /// When the goods arrived; defaults to now.
    pub import_date: Option<DateTime<Utc>>,
}

/// The result of a committed import.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportOutcome {
    /// Id of the ledger entry that was written.
    pub entry_id: i64,

    /// Id of the (possibly newly created) book.
    pub book_id: i64,

    /// True when the import created the book, false when it restocked
    /// an existing one.
    pub created_book: bool,

    /// Human-readable outcome for the admin screen.
    pub message: String,
}

// =============================================================================
// Operation
// =============================================================================

/// Records a warehouse import.
///
/// Resolves the category and book, enforces the active import
/// regulations, moves stock, and writes the audit trail - all as one
/// atomic unit. See the module docs for the exact flow.
///
/// ## Errors
/// - `Unauthenticated` / `Unauthorized` - actor gating
/// - `ValidationError` - missing name/category, non-positive quantity,
///   negative price (checked before any mutation)
/// - `RegulationViolation` - below the minimum, or over the ceiling
///   (with the importable remainder)
/// - `DbError` - unexpected persistence failure; fully rolled back
pub async fn record_import(
    db: &Database,
    actor: &Actor,
    request: ImportRequest,
) -> StoreResult<ImportOutcome> {
    authorize(Some(actor), Operation::RecordImport)?;

    // Fail fast on bad input, before the transaction opens.
    validation::validate_book_name(&request.book_name)?;
    validation::validate_category_name(&request.category_name)?;
    validation::validate_quantity(request.quantity)?;
    validation::validate_price_cents(request.unit_price_cents)?;

    let book_name = request.book_name.trim();
    let category_name = request.category_name.trim();
    let import_date = request.import_date.unwrap_or_else(Utc::now);

    debug!(book = %book_name, category = %category_name, quantity = request.quantity, "Recording import");

    let mut tx = db.pool().begin().await?;

    // 1. Resolve or create the category. Runs inside the transaction so
    //    a later rejection takes the new category down with it.
    let category_id: Option<i64> =
        sqlx::query_scalar("SELECT id FROM book_categories WHERE name = ?1")
            .bind(category_name)
            .fetch_optional(&mut *tx)
            .await?;

    let category_id = match category_id {
        Some(id) => id,
        None => {
            let result = sqlx::query("INSERT INTO book_categories (name) VALUES (?1)")
                .bind(category_name)
                .execute(&mut *tx)
                .await?;
            result.last_insert_rowid()
        }
    };

    // 2. Resolve the book and enforce the regulations in force.
    let min_quantity =
        active_quantity(&mut tx, REG_MIN_IMPORT_QUANTITY, DEFAULT_MIN_IMPORT_QUANTITY).await?;
    let ceiling = active_quantity(&mut tx, REG_MAX_STOCK_CEILING, DEFAULT_MAX_STOCK_CEILING).await?;

    let existing: Option<(i64, i64)> =
        sqlx::query_as("SELECT id, stock FROM books WHERE name = ?1")
            .bind(book_name)
            .fetch_optional(&mut *tx)
            .await?;

    let current_stock = existing.map(|(_, stock)| stock).unwrap_or(0);

    if request.quantity < min_quantity {
        return Err(RegulationViolation::BelowMinimum {
            minimum: min_quantity,
            requested: request.quantity,
        }
        .into());
    }

    if current_stock + request.quantity > ceiling {
        return Err(RegulationViolation::CeilingExceeded {
            book: book_name.to_string(),
            ceiling,
            current: current_stock,
            allowed_remainder: ceiling - current_stock,
        }
        .into());
    }

    let (book_id, created_book) = match existing {
        Some((id, _)) => {
            sqlx::query("UPDATE books SET stock = stock + ?2 WHERE id = ?1")
                .bind(id)
                .bind(request.quantity)
                .execute(&mut *tx)
                .await?;
            (id, false)
        }
        None => {
            let result = sqlx::query(
                r#"
                INSERT INTO books (name, author, description, price_cents,
                                   stock, category_id, is_active, created_at)
                VALUES (?1, NULL, NULL, ?2, ?3, ?4, 1, ?5)
                "#,
            )
            .bind(book_name)
            .bind(request.unit_price_cents)
            .bind(request.quantity)
            .bind(category_id)
            .bind(import_date)
            .execute(&mut *tx)
            .await?;
            (result.last_insert_rowid(), true)
        }
    };

    // 3. Write the ledger entry.
    let result = sqlx::query(
        r#"
        INSERT INTO import_entries (book_id, book_name, quantity, unit_price_cents, import_date)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(book_id)
    .bind(book_name)
    .bind(request.quantity)
    .bind(request.unit_price_cents)
    .bind(import_date)
    .execute(&mut *tx)
    .await?;

    let entry_id = result.last_insert_rowid();

    // 4. Freeze the regulations in force for the audit trail.
    sqlx::query(
        r#"
        INSERT INTO regulation_snapshots (import_entry_id, regulation_id, name, value)
        SELECT ?1, id, name, value FROM regulations WHERE is_active = 1
        "#,
    )
    .bind(entry_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    let message = if created_book {
        format!(
            "created \"{}\" with {} copies in stock",
            book_name, request.quantity
        )
    } else {
        format!(
            "updated \"{}\": stock {} -> {}",
            book_name,
            current_stock,
            current_stock + request.quantity
        )
    };

    info!(
        entry_id,
        book_id,
        created_book,
        quantity = request.quantity,
        "Import recorded"
    );

    Ok(ImportOutcome {
        entry_id,
        book_id,
        created_book,
        message,
    })
}

/// Reads an active quantity-valued regulation inside the transaction,
/// falling back to its documented default when unset.
async fn active_quantity(
    conn: &mut SqliteConnection,
    name: &str,
    default: i64,
) -> StoreResult<i64> {
    let value: Option<f64> =
        sqlx::query_scalar("SELECT value FROM regulations WHERE name = ?1 AND is_active = 1")
            .bind(name)
            .fetch_optional(&mut *conn)
            .await?;

    Ok(value.map(|v| v as i64).unwrap_or(default))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::ops::regulation::upsert_regulation;
    use crate::pool::DbConfig;
    use bookstore_core::{CoreError, UserRole};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn admin() -> Actor {
        Actor::new(1, UserRole::Admin)
    }

    fn request(book: &str, qty: i64) -> ImportRequest {
        ImportRequest {
            book_name: book.to_string(),
            category_name: "Travel".to_string(),
            quantity: qty,
            unit_price_cents: 1250,
            import_date: None,
        }
    }

    #[tokio::test]
    async fn test_import_creates_book_category_entry_and_snapshot() {
        let db = test_db().await;
        let admin = admin();

        upsert_regulation(&db, &admin, REG_MIN_IMPORT_QUANTITY, 2.0, true)
            .await
            .unwrap();

        let outcome = record_import(&db, &admin, request("Atlas", 5)).await.unwrap();
        assert!(outcome.created_book);
        assert!(outcome.message.contains("created"));

        let book = db.books().get_by_name("Atlas").await.unwrap().unwrap();
        assert_eq!(book.stock, 5);
        assert_eq!(book.price_cents, 1250);

        let category = db.categories().get_by_name("Travel").await.unwrap();
        assert!(category.is_some());

        let entry = db.ledger().get(outcome.entry_id).await.unwrap().unwrap();
        assert_eq!(entry.book_id, book.id);
        assert_eq!(entry.quantity, 5);

        let snapshots = db.ledger().snapshots_for_entry(outcome.entry_id).await.unwrap();
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].name, REG_MIN_IMPORT_QUANTITY);
        assert_eq!(snapshots[0].value, 2.0);
    }

    #[tokio::test]
    async fn test_import_existing_book_adds_stock() {
        let db = test_db().await;
        let admin = admin();

        record_import(&db, &admin, request("Atlas", 5)).await.unwrap();
        let outcome = record_import(&db, &admin, request("Atlas", 3)).await.unwrap();

        assert!(!outcome.created_book);
        assert!(outcome.message.contains("5 -> 8"));

        let book = db.books().get_by_name("Atlas").await.unwrap().unwrap();
        assert_eq!(book.stock, 8);

        assert_eq!(db.ledger().count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_below_minimum_is_rejected_without_mutation() {
        let db = test_db().await;
        let admin = admin();

        record_import(&db, &admin, request("Atlas", 5)).await.unwrap();
        upsert_regulation(&db, &admin, REG_MIN_IMPORT_QUANTITY, 2.0, true)
            .await
            .unwrap();

        let err = record_import(&db, &admin, request("Atlas", 1)).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Core(CoreError::Regulation(RegulationViolation::BelowMinimum {
                minimum: 2,
                requested: 1,
            }))
        ));

        let book = db.books().get_by_name("Atlas").await.unwrap().unwrap();
        assert_eq!(book.stock, 5);
        assert_eq!(db.ledger().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_ceiling_is_enforced_with_remainder() {
        let db = test_db().await;
        let admin = admin();

        upsert_regulation(&db, &admin, REG_MAX_STOCK_CEILING, 10.0, true)
            .await
            .unwrap();
        record_import(&db, &admin, request("Atlas", 8)).await.unwrap();

        let err = record_import(&db, &admin, request("Atlas", 5)).await.unwrap_err();
        match err {
            StoreError::Core(CoreError::Regulation(RegulationViolation::CeilingExceeded {
                ceiling,
                current,
                allowed_remainder,
                ..
            })) => {
                assert_eq!(ceiling, 10);
                assert_eq!(current, 8);
                assert_eq!(allowed_remainder, 2);
            }
            other => panic!("expected CeilingExceeded, got {:?}", other),
        }

        let book = db.books().get_by_name("Atlas").await.unwrap().unwrap();
        assert_eq!(book.stock, 8);
    }

    #[tokio::test]
    async fn test_at_ceiling_no_further_import_possible() {
        let db = test_db().await;
        let admin = admin();

        upsert_regulation(&db, &admin, REG_MAX_STOCK_CEILING, 10.0, true)
            .await
            .unwrap();
        record_import(&db, &admin, request("Atlas", 10)).await.unwrap();

        let err = record_import(&db, &admin, request("Atlas", 1)).await.unwrap_err();
        assert!(err
            .public_message()
            .contains("no further import is possible"));
    }

    #[tokio::test]
    async fn test_ceiling_applies_to_new_books_too() {
        let db = test_db().await;
        let admin = admin();

        upsert_regulation(&db, &admin, REG_MAX_STOCK_CEILING, 10.0, true)
            .await
            .unwrap();

        let err = record_import(&db, &admin, request("Atlas", 11)).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Core(CoreError::Regulation(
                RegulationViolation::CeilingExceeded {
                    current: 0,
                    allowed_remainder: 10,
                    ..
                }
            ))
        ));

        assert!(db.books().get_by_name("Atlas").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rejected_import_leaves_no_orphan_category() {
        let db = test_db().await;
        let admin = admin();

        upsert_regulation(&db, &admin, REG_MIN_IMPORT_QUANTITY, 5.0, true)
            .await
            .unwrap();

        let mut req = request("Atlas", 1);
        req.category_name = "Cartography".to_string();
        let err = record_import(&db, &admin, req).await.unwrap_err();
        assert!(err.is_business());

        // The category created in step 1 was rolled back with the rest.
        assert!(db
            .categories()
            .get_by_name("Cartography")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_validation_fails_fast() {
        let db = test_db().await;
        let admin = admin();

        let mut req = request("", 5);
        assert!(record_import(&db, &admin, req.clone()).await.is_err());

        req = request("Atlas", 0);
        assert!(record_import(&db, &admin, req.clone()).await.is_err());

        req = request("Atlas", 5);
        req.unit_price_cents = -1;
        assert!(record_import(&db, &admin, req).await.is_err());

        // Nothing was written by any of the rejected submissions.
        assert_eq!(db.books().count().await.unwrap(), 0);
        assert_eq!(db.ledger().count().await.unwrap(), 0);
        assert!(db.categories().get_by_name("Travel").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_customer_role_cannot_import() {
        let db = test_db().await;
        let customer = Actor::new(9, UserRole::User);

        let err = record_import(&db, &customer, request("Atlas", 5))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Core(CoreError::Unauthorized { .. })
        ));
    }

    #[tokio::test]
    async fn test_snapshot_survives_regulation_change() {
        let db = test_db().await;
        let admin = admin();

        upsert_regulation(&db, &admin, REG_MIN_IMPORT_QUANTITY, 2.0, true)
            .await
            .unwrap();
        let outcome = record_import(&db, &admin, request("Atlas", 5)).await.unwrap();

        // The rule changes after the import was recorded
        upsert_regulation(&db, &admin, REG_MIN_IMPORT_QUANTITY, 4.0, true)
            .await
            .unwrap();

        let snapshots = db.ledger().snapshots_for_entry(outcome.entry_id).await.unwrap();
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].value, 2.0);
    }
}
