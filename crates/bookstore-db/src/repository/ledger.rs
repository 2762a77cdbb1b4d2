//! # Import Ledger Repository
//!
//! Read access to the stock-in audit trail: import entries and the
//! regulation snapshots captured with them.
//!
//! Entries and snapshots are written only by `ops::import::record_import`
//! (in one transaction) and are immutable afterwards, so this repository
//! is read-only by design.

use sqlx::SqlitePool;

use crate::error::DbResult;
use bookstore_core::{ImportEntry, RegulationSnapshot};

/// Repository for the import audit trail.
#[derive(Debug, Clone)]
pub struct ImportLedgerRepository {
    pool: SqlitePool,
}

impl ImportLedgerRepository {
    /// Creates a new ImportLedgerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ImportLedgerRepository { pool }
    }

    /// Gets an entry by id.
    pub async fn get(&self, id: i64) -> DbResult<Option<ImportEntry>> {
        let entry = sqlx::query_as::<_, ImportEntry>(
            r#"
            SELECT id, book_id, book_name, quantity, unit_price_cents, import_date
            FROM import_entries
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entry)
    }

    /// Lists entries newest-first (the admin audit view).
    pub async fn list(&self, limit: i64) -> DbResult<Vec<ImportEntry>> {
        let entries = sqlx::query_as::<_, ImportEntry>(
            r#"
            SELECT id, book_id, book_name, quantity, unit_price_cents, import_date
            FROM import_entries
            ORDER BY id DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Lists every entry ever recorded for one book, oldest-first.
    pub async fn list_for_book(&self, book_id: i64) -> DbResult<Vec<ImportEntry>> {
        let entries = sqlx::query_as::<_, ImportEntry>(
            r#"
            SELECT id, book_id, book_name, quantity, unit_price_cents, import_date
            FROM import_entries
            WHERE book_id = ?1
            ORDER BY id
            "#,
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// The regulation values that were in force when an entry was
    /// recorded.
    pub async fn snapshots_for_entry(&self, entry_id: i64) -> DbResult<Vec<RegulationSnapshot>> {
        let snapshots = sqlx::query_as::<_, RegulationSnapshot>(
            r#"
            SELECT import_entry_id, regulation_id, name, value
            FROM regulation_snapshots
            WHERE import_entry_id = ?1
            ORDER BY regulation_id
            "#,
        )
        .bind(entry_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(snapshots)
    }

    /// Counts all entries (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM import_entries")
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
    use crate::ops::import::{record_import, ImportRequest};
    use crate::pool::{Database, DbConfig};
    use bookstore_core::{Actor, UserRole};

    async fn import(db: &Database, book: &str, qty: i64) -> i64 {
        record_import(
            db,
            &Actor::new(1, UserRole::Admin),
            ImportRequest {
                book_name: book.to_string(),
                category_name: "Fiction".to_string(),
                quantity: qty,
                unit_price_cents: 1000,
                import_date: None,
            },
        )
        .await
        .unwrap()
        .entry_id
    }

    #[tokio::test]
    async fn test_audit_views() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let first = import(&db, "Atlas", 5).await;
        let second = import(&db, "Atlas", 3).await;
        import(&db, "Primer", 7).await;

        // Newest-first admin listing
        let entries = db.ledger().list(10).await.unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].book_name, "Primer");

        // Oldest-first per-book trail
        let book_id = db.books().get_by_name("Atlas").await.unwrap().unwrap().id;
        let trail = db.ledger().list_for_book(book_id).await.unwrap();
        assert_eq!(trail.len(), 2);
        assert_eq!(trail[0].id, first);
        assert_eq!(trail[1].id, second);
        assert_eq!(trail[0].quantity, 5);

        assert!(db.ledger().get(first).await.unwrap().is_some());
        assert!(db.ledger().get(999).await.unwrap().is_none());

        // No regulations were active, so no snapshots were frozen
        assert!(db.ledger().snapshots_for_entry(first).await.unwrap().is_empty());
    }
}
