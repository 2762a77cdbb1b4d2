//! # Reporting Operations
//!
//! Monthly sales aggregations over the receipt history.
//!
//! ## Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  revenue_by_category(8, 2026)                                           │
//! │                                                                         │
//! │  category   │ revenue  │ units │ % of revenue                           │
//! │  ───────────┼──────────┼───────┼─────────────                           │
//! │  Fiction    │ $1420.00 │   96  │ 71.00                                  │
//! │  Travel     │  $580.00 │   31  │ 29.00                                  │
//! │                                                                         │
//! │  Percentages are normalized over the period total and rounded to        │
//! │  two decimals; an empty period yields an empty list (and a zero         │
//! │  total never divides - 0% instead of NaN).                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Both reports are pure reads: they aggregate committed receipt lines
//! and never touch stock or the ledger.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreResult;
use crate::pool::Database;
use bookstore_core::{authorize, validation, Actor, Operation, ValidationError};

// =============================================================================
// Report Rows
// =============================================================================

/// One category's share of a month's revenue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRevenueRow {
    pub category_name: String,

    /// Σ(quantity × unit price) over the period, in cents.
    pub revenue_cents: i64,

    /// Σ(quantity) over the period.
    pub units_sold: i64,

    /// 100 × revenue / period revenue, rounded to 2 decimals.
    pub percent_of_revenue: f64,
}

/// One book's share of a month's units sold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookSalesRow {
    pub book_name: String,
    pub category_name: String,
    pub units_sold: i64,

    /// 100 × units / period units, rounded to 2 decimals.
    pub percent_of_units: f64,
}

#[derive(Debug, sqlx::FromRow)]
struct RawCategoryRow {
    category_name: String,
    revenue_cents: i64,
    units_sold: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct RawBookRow {
    book_name: String,
    category_name: String,
    units_sold: i64,
}

// =============================================================================
// Operations
// =============================================================================

/// Revenue grouped by category for one month.
///
/// Rows come back largest-revenue-first. An empty period is an empty
/// Vec, not an error.
pub async fn revenue_by_category(
    db: &Database,
    actor: &Actor,
    month: u32,
    year: i32,
) -> StoreResult<Vec<CategoryRevenueRow>> {
    authorize(Some(actor), Operation::ViewReports)?;
    let (start, end) = month_bounds(month, year)?;

    let raw: Vec<RawCategoryRow> = sqlx::query_as(
        r#"
        SELECT c.name AS category_name,
               SUM(rl.quantity * rl.unit_price_cents) AS revenue_cents,
               SUM(rl.quantity) AS units_sold
        FROM receipt_lines rl
        JOIN receipts r ON r.id = rl.receipt_id
        JOIN books b ON b.id = rl.book_id
        JOIN book_categories c ON c.id = b.category_id
        WHERE r.created_at >= ?1 AND r.created_at < ?2
        GROUP BY c.id, c.name
        ORDER BY revenue_cents DESC, c.name
        "#,
    )
    .bind(start)
    .bind(end)
    .fetch_all(db.pool())
    .await?;

    let period_revenue: i64 = raw.iter().map(|r| r.revenue_cents).sum();

    Ok(raw
        .into_iter()
        .map(|r| CategoryRevenueRow {
            percent_of_revenue: percent_share(r.revenue_cents, period_revenue),
            category_name: r.category_name,
            revenue_cents: r.revenue_cents,
            units_sold: r.units_sold,
        })
        .collect())
}

/// Units sold grouped by (book, category) for one month.
///
/// Rows come back most-sold-first. An empty period is an empty Vec.
pub async fn units_sold_by_book(
    db: &Database,
    actor: &Actor,
    month: u32,
    year: i32,
) -> StoreResult<Vec<BookSalesRow>> {
    authorize(Some(actor), Operation::ViewReports)?;
    let (start, end) = month_bounds(month, year)?;

    let raw: Vec<RawBookRow> = sqlx::query_as(
        r#"
        SELECT b.name AS book_name,
               c.name AS category_name,
               SUM(rl.quantity) AS units_sold
        FROM receipt_lines rl
        JOIN receipts r ON r.id = rl.receipt_id
        JOIN books b ON b.id = rl.book_id
        JOIN book_categories c ON c.id = b.category_id
        WHERE r.created_at >= ?1 AND r.created_at < ?2
        GROUP BY b.id, b.name, c.name
        ORDER BY units_sold DESC, b.name
        "#,
    )
    .bind(start)
    .bind(end)
    .fetch_all(db.pool())
    .await?;

    let period_units: i64 = raw.iter().map(|r| r.units_sold).sum();

    Ok(raw
        .into_iter()
        .map(|r| BookSalesRow {
            percent_of_units: percent_share(r.units_sold, period_units),
            book_name: r.book_name,
            category_name: r.category_name,
            units_sold: r.units_sold,
        })
        .collect())
}

// =============================================================================
// Helpers
// =============================================================================

/// [start, end) of a calendar month in UTC.
fn month_bounds(month: u32, year: i32) -> StoreResult<(DateTime<Utc>, DateTime<Utc>)> {
    validation::validate_month(month)?;

    let out_of_range = || ValidationError::Invalid {
        field: "year".to_string(),
        reason: "out of range".to_string(),
    };

    let start = Utc
        .with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .ok_or_else(out_of_range)?;

    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };

    let end = Utc
        .with_ymd_and_hms(next_year, next_month, 1, 0, 0, 0)
        .single()
        .ok_or_else(out_of_range)?;

    Ok((start, end))
}

/// Percentage share rounded to two decimals; 0% when the total is zero.
fn percent_share(part: i64, total: i64) -> f64 {
    if total == 0 {
        return 0.0;
    }

    let raw = 100.0 * part as f64 / total as f64;
    (raw * 100.0).round() / 100.0
}

// =============================================================================
// Unit Tests
// =============================================================================
