//! # Regulation Repository
//!
//! Read access to the named business rules.
//!
//! ## Which Row Governs?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  regulations                                                            │
//! │                                                                         │
//! │  id │ name                 │ value │ is_active                          │
//! │  ───┼──────────────────────┼───────┼──────────                          │
//! │   1 │ min_import_quantity  │   5.0 │ 0          ← history               │
//! │   2 │ min_import_quantity  │   2.0 │ 1          ← governs imports       │
//! │   3 │ max_stock_ceiling    │ 300.0 │ 1          ← governs imports       │
//! │                                                                         │
//! │  A partial unique index guarantees at most one active row per name,     │
//! │  so `get_active_value` is never ambiguous.                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Writes (upsert, edit, delete) live in `ops::regulation`, because
//! activating a rule must deactivate its predecessor in one transaction.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use bookstore_core::{
    Regulation, DEFAULT_MAX_STOCK_CEILING, DEFAULT_MIN_IMPORT_QUANTITY, REG_MAX_STOCK_CEILING,
    REG_MIN_IMPORT_QUANTITY,
};

/// Repository for regulation lookups.
#[derive(Debug, Clone)]
pub struct RegulationRepository {
    pool: SqlitePool,
}

impl RegulationRepository {
    /// Creates a new RegulationRepository.
    pub fn new(pool: SqlitePool) -> Self {
        RegulationRepository { pool }
    }

    /// Lists all regulations (history included), ordered by id.
    pub async fn list(&self) -> DbResult<Vec<Regulation>> {
        let regulations = sqlx::query_as::<_, Regulation>(
            "SELECT id, name, value, is_active FROM regulations ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(regulations)
    }

    /// Lists the currently active regulations, ordered by id.
    pub async fn list_active(&self) -> DbResult<Vec<Regulation>> {
        let regulations = sqlx::query_as::<_, Regulation>(
            "SELECT id, name, value, is_active FROM regulations WHERE is_active = 1 ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(regulations)
    }

    /// Gets a regulation by id.
    pub async fn get(&self, id: i64) -> DbResult<Option<Regulation>> {
        let regulation = sqlx::query_as::<_, Regulation>(
            "SELECT id, name, value, is_active FROM regulations WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(regulation)
    }

    /// Returns the value of the active regulation with the given
    /// semantic name, or None when no row is active.
    pub async fn get_active_value(&self, name: &str) -> DbResult<Option<f64>> {
        let value: Option<f64> =
            sqlx::query_scalar("SELECT value FROM regulations WHERE name = ?1 AND is_active = 1")
                .bind(name)
                .fetch_optional(&self.pool)
                .await?;

        debug!(name = %name, value = ?value, "Active regulation lookup");
        Ok(value)
    }

    /// The minimum quantity a single import must bring in.
    ///
    /// Defaults to 0 (no minimum) when the rule is unset.
    pub async fn min_import_quantity(&self) -> DbResult<i64> {
        Ok(self
            .get_active_value(REG_MIN_IMPORT_QUANTITY)
            .await?
            .map(|v| v as i64)
            .unwrap_or(DEFAULT_MIN_IMPORT_QUANTITY))
    }

    /// The stock level an import may never push a book above.
    ///
    /// Defaults to 300 when the rule is unset.
    pub async fn max_stock_ceiling(&self) -> DbResult<i64> {
        Ok(self
            .get_active_value(REG_MAX_STOCK_CEILING)
            .await?
            .map(|v| v as i64)
            .unwrap_or(DEFAULT_MAX_STOCK_CEILING))
    }
}
