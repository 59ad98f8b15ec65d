//! Author management service

use validator::Validate;

use crate::{
    error::AppResult,
    models::author::{Author, AuthorWithBooks, CreateAuthor, UpdateAuthor},
    repository::Repository,
};

#[derive(Clone)]
pub struct AuthorsService {
    repository: Repository,
}

impl AuthorsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List authors with their books
    pub async fn list_authors(&self) -> AppResult<Vec<AuthorWithBooks>> {
        self.repository.authors.list_with_books().await
    }

    /// Get an author with their books
    pub async fn get_author(&self, id: i32) -> AppResult<AuthorWithBooks> {
        self.repository.authors.get_with_books(id).await
    }

    pub async fn create_author(&self, author: CreateAuthor) -> AppResult<Author> {
        let author = author.normalized();
        author.validate()?;
        let created = self.repository.authors.create(&author).await?;
        tracing::info!(author_id = created.id, "Created author {}", created.name);
        Ok(created)
    }

    pub async fn update_author(&self, id: i32, author: UpdateAuthor) -> AppResult<Author> {
        let author = author.normalized();
        author.validate()?;
        self.repository.authors.update(id, &author).await
    }

    /// Delete an author who has no books left
    pub async fn delete_author(&self, id: i32) -> AppResult<()> {
        self.repository.authors.delete(id).await?;
        tracing::info!(author_id = id, "Deleted author");
        Ok(())
    }
}
