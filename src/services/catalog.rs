//! Catalog (books) management service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookDetails, CreateBook, UpdateBook},
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List all books with their author
    pub async fn list_books(&self) -> AppResult<Vec<BookDetails>> {
        self.repository.books.list_with_author().await
    }

    /// Get book by ID with its author
    pub async fn get_book(&self, id: i32) -> AppResult<BookDetails> {
        self.repository.books.get_with_author(id).await
    }

    /// Create a new book for an existing author
    pub async fn create_book(&self, book: CreateBook) -> AppResult<Book> {
        let book = book.normalized();
        book.validate()?;
        self.ensure_author(book.author_id).await?;

        let created = self.repository.books.create(&book).await?;
        tracing::info!(
            book_id = created.id,
            total_copies = created.total_copies,
            "Created book '{}'",
            created.title
        );
        Ok(created)
    }

    pub async fn update_book(&self, id: i32, book: UpdateBook) -> AppResult<Book> {
        let book = book.normalized();
        book.validate()?;
        self.ensure_author(book.author_id).await?;
        self.repository.books.update(id, &book).await
    }

    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        self.repository.books.delete(id).await?;
        tracing::info!(book_id = id, "Deleted book");
        Ok(())
    }

    /// Total copies held under a title, case-insensitive; 0 when unknown
    pub async fn total_copies_by_title(&self, title: &str) -> AppResult<i64> {
        self.repository.books.total_copies_by_title(title.trim()).await
    }

    async fn ensure_author(&self, author_id: i32) -> AppResult<()> {
        if !self.repository.authors.exists(author_id).await? {
            return Err(AppError::NotFound(format!("Author with ID {} not found", author_id)));
        }
        Ok(())
    }
}
