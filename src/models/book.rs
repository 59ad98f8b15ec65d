//! Book model, copy accounting and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use super::author::AuthorShort;
use crate::error::{AppError, AppResult};

/// Internal row structure for book queries
#[derive(Debug, Clone, FromRow)]
pub struct BookRow {
    pub id: i32,
    pub title: String,
    pub isbn: String,
    pub published_date: Option<NaiveDate>,
    pub total_copies: i32,
    pub copies_available: i32,
    pub author_id: i32,
}

impl From<BookRow> for Book {
    fn from(row: BookRow) -> Self {
        Book {
            id: row.id,
            title: row.title,
            isbn: row.isbn,
            published_date: row.published_date,
            total_copies: row.total_copies,
            copies_available: row.copies_available,
            is_available: row.copies_available > 0,
            author_id: row.author_id,
        }
    }
}

/// Book as exposed by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub isbn: String,
    pub published_date: Option<NaiveDate>,
    pub total_copies: i32,
    pub copies_available: i32,
    /// `copies_available > 0`
    pub is_available: bool,
    pub author_id: i32,
}

impl Book {
    /// Take one copy off the shelf.
    ///
    /// Fails with `Unavailable` when no copy is left.
    pub fn checkout(&mut self) -> AppResult<()> {
        if self.copies_available <= 0 {
            return Err(AppError::Unavailable(format!(
                "Book '{}' is not available for borrowing",
                self.title
            )));
        }
        self.copies_available -= 1;
        self.is_available = self.copies_available > 0;
        Ok(())
    }

    /// Put one copy back on the shelf.
    ///
    /// Fails with `Conflict` if every copy is already accounted for; the
    /// count is never pushed past `total_copies`.
    pub fn checkin(&mut self) -> AppResult<()> {
        if self.copies_available >= self.total_copies {
            return Err(AppError::Conflict(format!(
                "Book '{}' already has all {} copies available",
                self.title, self.total_copies
            )));
        }
        self.copies_available += 1;
        self.is_available = true;
        Ok(())
    }
}

/// Book with its author
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookDetails {
    #[serde(flatten)]
    pub book: Book,
    pub author: AuthorShort,
}

/// Short book representation embedded in borrow listings
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookShort {
    pub id: i32,
    pub title: String,
    pub isbn: String,
}

fn validate_create_copies(book: &CreateBook) -> Result<(), ValidationError> {
    check_copies(book.total_copies, book.copies_available)
}

fn validate_update_copies(book: &UpdateBook) -> Result<(), ValidationError> {
    check_copies(book.total_copies, book.copies_available)
}

fn check_copies(total: i32, available: i32) -> Result<(), ValidationError> {
    if total < 0 || available < 0 || available > total {
        let mut err = ValidationError::new("copies");
        err.message = Some("copies_available must be between 0 and total_copies".into());
        return Err(err);
    }
    Ok(())
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_create_copies"))]
pub struct CreateBook {
    #[validate(length(min = 1, max = 512, message = "Title is required"))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 32, message = "ISBN is too long"))]
    pub isbn: String,
    pub published_date: Option<NaiveDate>,
    pub total_copies: i32,
    pub copies_available: i32,
    pub author_id: i32,
}

/// Update book request (full replacement of the editable fields)
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_update_copies"))]
pub struct UpdateBook {
    #[validate(length(min = 1, max = 512, message = "Title is required"))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 32, message = "ISBN is too long"))]
    pub isbn: String,
    pub published_date: Option<NaiveDate>,
    pub total_copies: i32,
    pub copies_available: i32,
    pub author_id: i32,
}

impl CreateBook {
    /// Trim title and ISBN before validation
    pub fn normalized(self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            isbn: self.isbn.trim().to_string(),
            ..self
        }
    }
}

impl UpdateBook {
    pub fn normalized(self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            isbn: self.isbn.trim().to_string(),
            ..self
        }
    }
}
