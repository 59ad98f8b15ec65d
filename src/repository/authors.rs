//! Authors repository for database operations

use std::collections::HashMap;

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        author::{Author, AuthorWithBooks, CreateAuthor, UpdateAuthor},
        book::{Book, BookRow},
    },
};

#[derive(Clone)]
pub struct AuthorsRepository {
    pool: Pool<Postgres>,
}

impl AuthorsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get author by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Author> {
        sqlx::query_as::<_, Author>("SELECT id, name, bio FROM authors WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Author with ID {} not found", id)))
    }

    /// Check whether an author exists
    pub async fn exists(&self, id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM authors WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// Get author by ID with their books
    pub async fn get_with_books(&self, id: i32) -> AppResult<AuthorWithBooks> {
        let author = self.get_by_id(id).await?;

        let books = sqlx::query_as::<_, BookRow>(
            r#"
            SELECT id, title, isbn, published_date, total_copies, copies_available, author_id
            FROM books
            WHERE author_id = $1
            ORDER BY title, id
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(Book::from)
        .collect();

        Ok(AuthorWithBooks::new(author, books))
    }

    /// List all authors with their books
    pub async fn list_with_books(&self) -> AppResult<Vec<AuthorWithBooks>> {
        let authors = sqlx::query_as::<_, Author>("SELECT id, name, bio FROM authors ORDER BY name, id")
            .fetch_all(&self.pool)
            .await?;

        let rows = sqlx::query_as::<_, BookRow>(
            r#"
            SELECT id, title, isbn, published_date, total_copies, copies_available, author_id
            FROM books
            ORDER BY title, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut books_by_author: HashMap<i32, Vec<Book>> = HashMap::new();
        for row in rows {
            books_by_author.entry(row.author_id).or_default().push(row.into());
        }

        Ok(authors
            .into_iter()
            .map(|author| {
                let books = books_by_author.remove(&author.id).unwrap_or_default();
                AuthorWithBooks::new(author, books)
            })
            .collect())
    }

    /// Create a new author
    pub async fn create(&self, author: &CreateAuthor) -> AppResult<Author> {
        let created = sqlx::query_as::<_, Author>(
            "INSERT INTO authors (name, bio) VALUES ($1, $2) RETURNING id, name, bio",
        )
        .bind(&author.name)
        .bind(author.bio.as_deref().unwrap_or(""))
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Update an author; absent fields keep their current value
    pub async fn update(&self, id: i32, author: &UpdateAuthor) -> AppResult<Author> {
        sqlx::query_as::<_, Author>(
            r#"
            UPDATE authors
            SET name = COALESCE($2, name),
                bio = COALESCE($3, bio)
            WHERE id = $1
            RETURNING id, name, bio
            "#,
        )
        .bind(id)
        .bind(author.name.as_deref())
        .bind(author.bio.as_deref())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Author with ID {} not found", id)))
    }

    /// Delete an author. Authors who still have books cannot be deleted.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query_scalar::<_, i32>("SELECT id FROM authors WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Author with ID {} not found", id)))?;

        let nb_books: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE author_id = $1")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        if nb_books > 0 {
            return Err(AppError::Conflict(format!(
                "Author with ID {} still has {} book(s); delete or reassign them first",
                id, nb_books
            )));
        }

        sqlx::query("DELETE FROM authors WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
