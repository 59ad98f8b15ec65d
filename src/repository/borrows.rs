//! Borrow records repository: lending and returning copies

use chrono::Utc;
use sqlx::{PgConnection, Pool, Postgres};

use super::books::lock_book;
use crate::{
    error::{AppError, AppResult},
    models::{
        book::Book,
        borrow::{BorrowDetails, BorrowDetailsRow, BorrowRecord},
    },
};

const BORROW_DETAILS_SELECT: &str = r#"
    SELECT br.id, br.book_id, br.user_id, br.borrowed_at, br.returned_at,
           b.title AS book_title, b.isbn AS book_isbn, u.username
    FROM borrow_records br
    JOIN books b ON b.id = br.book_id
    JOIN users u ON u.id = br.user_id
"#;

#[derive(Clone)]
pub struct BorrowsRepository {
    pool: Pool<Postgres>,
}

impl BorrowsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Lend one copy of a book to a user.
    ///
    /// The book row stays locked until commit, so concurrent borrows of the
    /// same book run one after the other and the last copy goes to exactly
    /// one of them.
    pub async fn borrow(&self, book_id: i32, user_id: i32) -> AppResult<(BorrowRecord, Book)> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let mut book = lock_book(&mut tx, book_id).await?;

        let user_exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;
        if !user_exists {
            return Err(AppError::NotFound(format!("User with ID {} not found", user_id)));
        }

        let previous = book.copies_available;
        book.checkout()?;
        store_copies_available(&mut tx, &book, previous).await?;

        let record = sqlx::query_as::<_, BorrowRecord>(
            r#"
            INSERT INTO borrow_records (book_id, user_id, borrowed_at, returned_at)
            VALUES ($1, $2, $3, NULL)
            RETURNING id, book_id, user_id, borrowed_at, returned_at
            "#,
        )
        .bind(book_id)
        .bind(user_id)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok((record, book))
    }

    /// Return the copy a user borrowed.
    ///
    /// When several active records exist for the pair, the oldest one
    /// (by `borrowed_at`, then lowest id) is closed.
    pub async fn return_book(&self, book_id: i32, user_id: i32) -> AppResult<(BorrowRecord, Book)> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let mut book = lock_book(&mut tx, book_id).await?;

        let active = sqlx::query_as::<_, BorrowRecord>(
            r#"
            SELECT id, book_id, user_id, borrowed_at, returned_at
            FROM borrow_records
            WHERE book_id = $1 AND user_id = $2 AND returned_at IS NULL
            ORDER BY borrowed_at, id
            LIMIT 1
            FOR UPDATE
            "#,
        )
        .bind(book_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            AppError::NotFound("No active borrowed record found for this book and user".to_string())
        })?;

        let previous = book.copies_available;
        book.checkin()?;
        store_copies_available(&mut tx, &book, previous).await?;

        let record = sqlx::query_as::<_, BorrowRecord>(
            r#"
            UPDATE borrow_records SET returned_at = $2
            WHERE id = $1
            RETURNING id, book_id, user_id, borrowed_at, returned_at
            "#,
        )
        .bind(active.id)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok((record, book))
    }

    /// All borrow records (active and returned), newest first
    pub async fn list_all(&self) -> AppResult<Vec<BorrowDetails>> {
        let rows = sqlx::query_as::<_, BorrowDetailsRow>(&format!(
            "{} ORDER BY br.borrowed_at DESC, br.id DESC",
            BORROW_DETAILS_SELECT
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(BorrowDetails::from).collect())
    }

    /// Borrow records of one user, newest first
    pub async fn list_by_user(&self, user_id: i32) -> AppResult<Vec<BorrowDetails>> {
        let rows = sqlx::query_as::<_, BorrowDetailsRow>(&format!(
            "{} WHERE br.user_id = $1 ORDER BY br.borrowed_at DESC, br.id DESC",
            BORROW_DETAILS_SELECT
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(BorrowDetails::from).collect())
    }
}

/// Write the new copy count, guarded on the value read under the lock.
async fn store_copies_available(conn: &mut PgConnection, book: &Book, previous: i32) -> AppResult<()> {
    let result = sqlx::query(
        "UPDATE books SET copies_available = $2 WHERE id = $1 AND copies_available = $3",
    )
    .bind(book.id)
    .bind(book.copies_available)
    .bind(previous)
    .execute(conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::Conflict(format!(
            "Copies of book {} changed concurrently, retry the request",
            book.id
        )));
    }
    Ok(())
}
