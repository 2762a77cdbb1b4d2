//! # Catalog Repositories
//!
//! Database operations for books and categories.
//!
//! ## Key Operations
//! - Keyword/category search with pagination (the storefront listing)
//! - Book CRUD for the admin surface
//! - Category listing with per-category book counts
//!
//! Stock is deliberately NOT mutable through this repository: increments
//! belong to the import engine and decrements to the checkout engine,
//! both of which run their own transactions (see the `ops` module).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use bookstore_core::{Book, BookCategory};

// =============================================================================
// Book Repository
// =============================================================================

/// Fields of a book to be inserted (the id is assigned by the store).
#[derive(Debug, Clone)]
pub struct NewBook {
    pub name: String,
    pub author: Option<String>,
    pub description: Option<String>,
    pub price_cents: i64,
    pub stock: i64,
    pub category_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Repository for book database operations.
#[derive(Debug, Clone)]
pub struct BookRepository {
    pool: SqlitePool,
}

impl BookRepository {
    /// Creates a new BookRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BookRepository { pool }
    }

    /// Gets a book by its id.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>(
            r#"
            SELECT id, name, author, description, price_cents, stock,
                   category_id, is_active, created_at
            FROM books
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(book)
    }

    /// Gets a book by its (unique) name.
    pub async fn get_by_name(&self, name: &str) -> DbResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>(
            r#"
            SELECT id, name, author, description, price_cents, stock,
                   category_id, is_active, created_at
            FROM books
            WHERE name = ?1
            "#,
        )
        .bind(name.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(book)
    }

    /// Searches active books by keyword and/or category, paginated.
    ///
    /// ## Arguments
    /// * `keyword` - Case-insensitive substring match on the name
    /// * `category_id` - Restrict to one category
    /// * `limit` / `offset` - Page window
    pub async fn search(
        &self,
        keyword: Option<&str>,
        category_id: Option<i64>,
        limit: i64,
        offset: i64,
    ) -> DbResult<Vec<Book>> {
        let keyword = keyword.map(str::trim).filter(|k| !k.is_empty());

        debug!(keyword = ?keyword, category_id = ?category_id, "Searching books");

        let books = sqlx::query_as::<_, Book>(
            r#"
            SELECT id, name, author, description, price_cents, stock,
                   category_id, is_active, created_at
            FROM books
            WHERE is_active = 1
              AND (?1 IS NULL OR name LIKE '%' || ?1 || '%')
              AND (?2 IS NULL OR category_id = ?2)
            ORDER BY name
            LIMIT ?3 OFFSET ?4
            "#,
        )
        .bind(keyword)
        .bind(category_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        debug!(count = books.len(), "Search returned books");
        Ok(books)
    }

    /// Lists active books sorted by name.
    pub async fn list_active(&self, limit: i64) -> DbResult<Vec<Book>> {
        self.search(None, None, limit, 0).await
    }

    /// Inserts a new book and returns it with its assigned id.
    pub async fn insert(&self, new: NewBook) -> DbResult<Book> {
        debug!(name = %new.name, "Inserting book");

        let result = sqlx::query(
            r#"
            INSERT INTO books (name, author, description, price_cents,
                               stock, category_id, is_active, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, ?7)
            "#,
        )
        .bind(new.name.trim())
        .bind(&new.author)
        .bind(&new.description)
        .bind(new.price_cents)
        .bind(new.stock)
        .bind(new.category_id)
        .bind(new.created_at)
        .execute(&self.pool)
        .await?;

        Ok(Book {
            id: result.last_insert_rowid(),
            name: new.name.trim().to_string(),
            author: new.author,
            description: new.description,
            price_cents: new.price_cents,
            stock: new.stock,
            category_id: new.category_id,
            is_active: true,
            created_at: new.created_at,
        })
    }

    /// Updates a book's catalog fields (NOT its stock counter).
    pub async fn update(&self, book: &Book) -> DbResult<()> {
        debug!(id = %book.id, "Updating book");

        let result = sqlx::query(
            r#"
            UPDATE books SET
                name = ?2,
                author = ?3,
                description = ?4,
                price_cents = ?5,
                category_id = ?6,
                is_active = ?7
            WHERE id = ?1
            "#,
        )
        .bind(book.id)
        .bind(&book.name)
        .bind(&book.author)
        .bind(&book.description)
        .bind(book.price_cents)
        .bind(book.category_id)
        .bind(book.is_active)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("book", book.id.to_string()));
        }

        Ok(())
    }

    /// Soft-deletes a book by setting is_active = false.
    ///
    /// ## Why Soft Delete?
    /// - Historical receipt lines and import entries still reference it
    /// - Can be restored if deleted by mistake
    pub async fn soft_delete(&self, id: i64) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting book");

        let result = sqlx::query("UPDATE books SET is_active = 0 WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("book", id.to_string()));
        }

        Ok(())
    }

    /// Counts active books (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Category Repository
// =============================================================================

/// A category together with how many books it holds, for the storefront
/// sidebar.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CategoryBookCount {
    pub id: i64,
    pub name: String,
    pub book_count: i64,
}

/// Repository for category database operations.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    /// Creates a new CategoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// Lists all categories ordered by id.
    pub async fn list(&self) -> DbResult<Vec<BookCategory>> {
        let categories =
            sqlx::query_as::<_, BookCategory>("SELECT id, name FROM book_categories ORDER BY id")
                .fetch_all(&self.pool)
                .await?;

        Ok(categories)
    }

    /// Lists all categories with their active-book counts.
    pub async fn list_with_counts(&self) -> DbResult<Vec<CategoryBookCount>> {
        let rows = sqlx::query_as::<_, CategoryBookCount>(
            r#"
            SELECT c.id, c.name,
                   COUNT(b.id) AS book_count
            FROM book_categories c
            LEFT JOIN books b ON b.category_id = c.id AND b.is_active = 1
            GROUP BY c.id, c.name
            ORDER BY c.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Gets a category by its (unique) name.
    pub async fn get_by_name(&self, name: &str) -> DbResult<Option<BookCategory>> {
        let category = sqlx::query_as::<_, BookCategory>(
            "SELECT id, name FROM book_categories WHERE name = ?1",
        )
        .bind(name.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    /// Creates a category and returns it with its assigned id.
    pub async fn create(&self, name: &str) -> DbResult<BookCategory> {
        debug!(name = %name, "Creating category");

        let result = sqlx::query("INSERT INTO book_categories (name) VALUES (?1)")
            .bind(name.trim())
            .execute(&self.pool)
            .await?;

        Ok(BookCategory {
            id: result.last_insert_rowid(),
            name: name.trim().to_string(),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
