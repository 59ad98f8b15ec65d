//! Books repository for database operations

use sqlx::{postgres::PgRow, PgConnection, Pool, Postgres, Row};

use crate::{
    error::{AppError, AppResult},
    models::{
        author::AuthorShort,
        book::{Book, BookDetails, BookRow, CreateBook, UpdateBook},
    },
};

const BOOK_WITH_AUTHOR_SELECT: &str = r#"
    SELECT b.id, b.title, b.isbn, b.published_date, b.total_copies, b.copies_available,
           b.author_id, a.name AS author_name
    FROM books b
    JOIN authors a ON a.id = b.author_id
"#;

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, BookRow>(
            r#"
            SELECT id, title, isbn, published_date, total_copies, copies_available, author_id
            FROM books WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .map(Book::from)
        .ok_or_else(|| AppError::NotFound(format!("Book with ID {} not found", id)))
    }

    /// Get book by ID together with its author
    pub async fn get_with_author(&self, id: i32) -> AppResult<BookDetails> {
        let row = sqlx::query(&format!("{} WHERE b.id = $1", BOOK_WITH_AUTHOR_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with ID {} not found", id)))?;

        Ok(details_from_row(&row))
    }

    /// List all books with their author
    pub async fn list_with_author(&self) -> AppResult<Vec<BookDetails>> {
        let rows = sqlx::query(&format!("{} ORDER BY b.title, b.id", BOOK_WITH_AUTHOR_SELECT))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(details_from_row).collect())
    }

    /// Create a new book
    pub async fn create(&self, book: &CreateBook) -> AppResult<Book> {
        let row = sqlx::query_as::<_, BookRow>(
            r#"
            INSERT INTO books (title, isbn, published_date, total_copies, copies_available, author_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, title, isbn, published_date, total_copies, copies_available, author_id
            "#,
        )
        .bind(&book.title)
        .bind(&book.isbn)
        .bind(book.published_date)
        .bind(book.total_copies)
        .bind(book.copies_available)
        .bind(book.author_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    /// Update a book.
    ///
    /// Copies currently lent out stay accounted for: `copies_available` may
    /// not exceed `total_copies` minus the number of active borrows.
    pub async fn update(&self, id: i32, book: &UpdateBook) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        lock_book(&mut tx, id).await?;

        let active = count_active_borrows(&mut tx, id).await?;
        if i64::from(book.copies_available) > i64::from(book.total_copies) - active {
            return Err(AppError::Validation(format!(
                "copies_available cannot exceed total_copies minus the {} copies currently borrowed",
                active
            )));
        }

        let row = sqlx::query_as::<_, BookRow>(
            r#"
            UPDATE books
            SET title = $2, isbn = $3, published_date = $4,
                total_copies = $5, copies_available = $6, author_id = $7
            WHERE id = $1
            RETURNING id, title, isbn, published_date, total_copies, copies_available, author_id
            "#,
        )
        .bind(id)
        .bind(&book.title)
        .bind(&book.isbn)
        .bind(book.published_date)
        .bind(book.total_copies)
        .bind(book.copies_available)
        .bind(book.author_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row.into())
    }

    /// Delete a book and its borrow history. Books with copies still out
    /// cannot be deleted.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        lock_book(&mut tx, id).await?;

        let active = count_active_borrows(&mut tx, id).await?;
        if active > 0 {
            return Err(AppError::Conflict(format!(
                "Book with ID {} has {} active borrow(s)",
                id, active
            )));
        }

        sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Sum of `total_copies` over books whose title matches case-insensitively
    pub async fn total_copies_by_title(&self, title: &str) -> AppResult<i64> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(total_copies), 0)::BIGINT FROM books WHERE LOWER(title) = LOWER($1)",
        )
        .bind(title)
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }
}

/// Lock a book row for the rest of the transaction
pub(crate) async fn lock_book(conn: &mut PgConnection, id: i32) -> AppResult<Book> {
    sqlx::query_as::<_, BookRow>(
        r#"
        SELECT id, title, isbn, published_date, total_copies, copies_available, author_id
        FROM books WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(id)
    .fetch_optional(conn)
    .await?
    .map(Book::from)
    .ok_or_else(|| AppError::NotFound(format!("Book with ID {} not found", id)))
}

async fn count_active_borrows(conn: &mut PgConnection, book_id: i32) -> AppResult<i64> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM borrow_records WHERE book_id = $1 AND returned_at IS NULL",
    )
    .bind(book_id)
    .fetch_one(conn)
    .await?;
    Ok(count)
}

fn details_from_row(row: &PgRow) -> BookDetails {
    let copies_available: i32 = row.get("copies_available");
    BookDetails {
        book: Book {
            id: row.get("id"),
            title: row.get("title"),
            isbn: row.get("isbn"),
            published_date: row.get("published_date"),
            total_copies: row.get("total_copies"),
            copies_available,
            is_available: copies_available > 0,
            author_id: row.get("author_id"),
        },
        author: AuthorShort {
            id: row.get("author_id"),
            name: row.get("author_name"),
        },
    }
}
