//! Borrowing service

use crate::{
    error::{AppError, AppResult},
    models::{
        book::Book,
        borrow::{BorrowDetails, BorrowRecord},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
}

impl LoansService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Lend one copy of a book to a user
    pub async fn borrow_book(&self, book_id: i32, user_id: i32) -> AppResult<(BorrowRecord, Book)> {
        let (record, book) = self.repository.borrows.borrow(book_id, user_id).await?;
        tracing::info!(
            book_id,
            user_id,
            borrow_id = record.id,
            copies_available = book.copies_available,
            "Book borrowed"
        );
        Ok((record, book))
    }

    /// Close the user's oldest active borrow of a book
    pub async fn return_book(&self, book_id: i32, user_id: i32) -> AppResult<(BorrowRecord, Book)> {
        let (record, book) = self.repository.borrows.return_book(book_id, user_id).await?;
        tracing::info!(
            book_id,
            user_id,
            borrow_id = record.id,
            copies_available = book.copies_available,
            "Book returned"
        );
        Ok((record, book))
    }

    /// Every borrow record with its book and borrower
    pub async fn list_borrowed(&self) -> AppResult<Vec<BorrowDetails>> {
        self.repository.borrows.list_all().await
    }

    /// Borrow records of one user
    pub async fn list_borrowed_by_user(&self, user_id: i32) -> AppResult<Vec<BorrowDetails>> {
        if !self.repository.users.exists(user_id).await? {
            return Err(AppError::NotFound(format!("User with ID {} not found", user_id)));
        }

        let records = self.repository.borrows.list_by_user(user_id).await?;
        if records.is_empty() {
            return Err(AppError::NotFound(format!(
                "No borrowed books found for User with ID {}",
                user_id
            )));
        }
        Ok(records)
    }
}
