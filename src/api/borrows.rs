//! Borrowing endpoints

use axum::{
    extract::State,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{
        book::Book,
        borrow::{BorrowDetails, BorrowRecord},
    },
};

use super::{CatalogAccess, PathParam};

/// Borrow or return outcome
#[derive(Serialize, ToSchema)]
pub struct BorrowResponse {
    /// Status message
    pub message: String,
    pub record: BorrowRecord,
    /// Book state after the operation
    pub book: Book,
}

/// Borrow a copy of a book
#[utoipa::path(
    post,
    path = "/books/{id}/borrow/{user_id}",
    tag = "borrows",
    security((), ("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID"),
        ("user_id" = i32, Path, description = "Borrower ID")
    ),
    responses(
        (status = 200, description = "Book borrowed", body = BorrowResponse),
        (status = 400, description = "No copy available"),
        (status = 403, description = "Cannot borrow for another user (catalog protection on)"),
        (status = 404, description = "Book or user not found"),
        (status = 409, description = "Concurrent modification of the copy count")
    )
)]
pub async fn borrow_book(
    State(state): State<crate::AppState>,
    access: CatalogAccess,
    PathParam((book_id, user_id)): PathParam<(i32, i32)>,
) -> AppResult<Json<BorrowResponse>> {
    access.require_self_or_admin(user_id)?;

    let (record, book) = state.services.loans.borrow_book(book_id, user_id).await?;

    Ok(Json(BorrowResponse {
        message: format!("Book '{}' borrowed successfully", book.title),
        record,
        book,
    }))
}

/// Return a borrowed copy
#[utoipa::path(
    post,
    path = "/books/{id}/return/{user_id}",
    tag = "borrows",
    security((), ("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID"),
        ("user_id" = i32, Path, description = "Borrower ID")
    ),
    responses(
        (status = 200, description = "Book returned", body = BorrowResponse),
        (status = 403, description = "Cannot return for another user (catalog protection on)"),
        (status = 404, description = "Book not found or no active borrow"),
        (status = 409, description = "All copies already on the shelf")
    )
)]
pub async fn return_book(
    State(state): State<crate::AppState>,
    access: CatalogAccess,
    PathParam((book_id, user_id)): PathParam<(i32, i32)>,
) -> AppResult<Json<BorrowResponse>> {
    access.require_self_or_admin(user_id)?;

    let (record, book) = state.services.loans.return_book(book_id, user_id).await?;

    Ok(Json(BorrowResponse {
        message: format!("Book '{}' has been returned successfully", book.title),
        record,
        book,
    }))
}

/// List every borrow record with its book and borrower
#[utoipa::path(
    get,
    path = "/borrows",
    tag = "borrows",
    security((), ("bearer_auth" = [])),
    responses(
        (status = 200, description = "All borrow records", body = Vec<BorrowDetails>),
        (status = 403, description = "Admin privileges required (catalog protection on)")
    )
)]
pub async fn list_borrows(
    State(state): State<crate::AppState>,
    access: CatalogAccess,
) -> AppResult<Json<Vec<BorrowDetails>>> {
    access.require_admin()?;

    let records = state.services.loans.list_borrowed().await?;
    Ok(Json(records))
}

/// List a user's borrow records
#[utoipa::path(
    get,
    path = "/users/{id}/borrows",
    tag = "borrows",
    security((), ("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User's borrow records", body = Vec<BorrowDetails>),
        (status = 403, description = "Cannot read another user's records (catalog protection on)"),
        (status = 404, description = "User not found or nothing borrowed")
    )
)]
pub async fn list_user_borrows(
    State(state): State<crate::AppState>,
    access: CatalogAccess,
    PathParam(user_id): PathParam<i32>,
) -> AppResult<Json<Vec<BorrowDetails>>> {
    access.require_self_or_admin(user_id)?;

    let records = state.services.loans.list_borrowed_by_user(user_id).await?;
    Ok(Json(records))
}
