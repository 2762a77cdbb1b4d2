//! # Regulation Operations
//!
//! Admin-gated writes to the regulation store.
//!
//! ## Versioning
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  upsert("min_import_quantity", 4.0, active)                             │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    UPDATE regulations SET is_active = 0                                 │
//! │     WHERE name = 'min_import_quantity' AND is_active = 1                │
//! │    INSERT INTO regulations (name, value, is_active)                     │
//! │         VALUES ('min_import_quantity', 4.0, 1)                          │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  The predecessor row stays as history; import entries that              │
//! │  snapshotted it are untouched. At most one row per name is ever         │
//! │  active (the schema's partial unique index backs this up).              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::info;

use crate::error::{DbError, StoreResult};
use crate::pool::Database;
use bookstore_core::{authorize, validation, Actor, Operation, Regulation};

/// Creates a new version of a named regulation.
///
/// When `is_active` is true, the previously active row with the same
/// name (if any) is deactivated in the same transaction, so evaluation
/// is never ambiguous. Inactive rows are recorded as history only.
///
/// ## Errors
/// - `Unauthenticated` / `Unauthorized` - admins only
/// - `ValidationError` - empty name, non-finite or negative value
pub async fn upsert_regulation(
    db: &Database,
    actor: &Actor,
    name: &str,
    value: f64,
    is_active: bool,
) -> StoreResult<Regulation> {
    authorize(Some(actor), Operation::EditRegulations)?;
    validation::validate_regulation_name(name)?;
    validation::validate_regulation_value(value)?;

    let name = name.trim();

    let mut tx = db.pool().begin().await?;

    if is_active {
        sqlx::query("UPDATE regulations SET is_active = 0 WHERE name = ?1 AND is_active = 1")
            .bind(name)
            .execute(&mut *tx)
            .await?;
    }

    let result = sqlx::query("INSERT INTO regulations (name, value, is_active) VALUES (?1, ?2, ?3)")
        .bind(name)
        .bind(value)
        .bind(is_active)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    let regulation = Regulation {
        id: result.last_insert_rowid(),
        name: name.to_string(),
        value,
        is_active,
    };

    info!(id = regulation.id, name = %regulation.name, value, is_active, "Regulation upserted");
    Ok(regulation)
}

/// Edits an existing regulation row in place.
///
/// Activating a row deactivates any other active row that carries the
/// same name, preserving the one-active-per-name invariant.
///
/// ## Errors
/// - `Unauthenticated` / `Unauthorized` - admins only
/// - `ValidationError` - empty name, non-finite or negative value
/// - `DbError::NotFound` - no regulation with that id
pub async fn update_regulation(
    db: &Database,
    actor: &Actor,
    id: i64,
    name: &str,
    value: f64,
    is_active: bool,
) -> StoreResult<Regulation> {
    authorize(Some(actor), Operation::EditRegulations)?;
    validation::validate_regulation_name(name)?;
    validation::validate_regulation_value(value)?;

    let name = name.trim();

    let mut tx = db.pool().begin().await?;

    if is_active {
        sqlx::query(
            "UPDATE regulations SET is_active = 0 WHERE name = ?1 AND is_active = 1 AND id != ?2",
        )
        .bind(name)
        .bind(id)
        .execute(&mut *tx)
        .await?;
    }

    let result = sqlx::query(
        "UPDATE regulations SET name = ?2, value = ?3, is_active = ?4 WHERE id = ?1",
    )
    .bind(id)
    .bind(name)
    .bind(value)
    .bind(is_active)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("regulation", id.to_string()).into());
    }

    tx.commit().await?;

    info!(id, name = %name, value, is_active, "Regulation updated");
    Ok(Regulation {
        id,
        name: name.to_string(),
        value,
        is_active,
    })
}

/// Hard-deletes a regulation row.
///
/// Snapshots taken while the row was active keep their copied values;
/// deleting the rule never rewrites import history.
///
/// ## Errors
/// - `Unauthenticated` / `Unauthorized` - admins only
/// - `DbError::NotFound` - no regulation with that id
pub async fn delete_regulation(db: &Database, actor: &Actor, id: i64) -> StoreResult<()> {
    authorize(Some(actor), Operation::EditRegulations)?;

    let result = sqlx::query("DELETE FROM regulations WHERE id = ?1")
        .bind(id)
        .execute(db.pool())
        .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("regulation", id.to_string()).into());
    }

    info!(id, "Regulation deleted");
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
