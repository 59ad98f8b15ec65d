//! Book (catalog) endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::book::{Book, BookDetails, CreateBook, UpdateBook},
};

use super::{CatalogAccess, JsonBody, PathParam};

/// Copies held under a title
#[derive(Serialize, ToSchema)]
pub struct TitleCountResponse {
    pub title: String,
    pub total_copies: i64,
}

/// List all books with their author
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    responses(
        (status = 200, description = "List of books", body = Vec<BookDetails>)
    )
)]
pub async fn list_books(State(state): State<crate::AppState>) -> AppResult<Json<Vec<BookDetails>>> {
    let books = state.services.catalog.list_books().await?;
    Ok(Json(books))
}

/// Get book details by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book with author", body = BookDetails),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    PathParam(id): PathParam<i32>,
) -> AppResult<Json<BookDetails>> {
    let book = state.services.catalog.get_book(id).await?;
    Ok(Json(book))
}

/// Create a new book
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    security((), ("bearer_auth" = [])),
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Admin privileges required (catalog protection on)"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    access: CatalogAccess,
    JsonBody(book): JsonBody<CreateBook>,
) -> AppResult<(StatusCode, Json<Book>)> {
    access.require_admin()?;

    let created = state.services.catalog.create_book(book).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update an existing book
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    security((), ("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 400, description = "Invalid copy counts"),
        (status = 403, description = "Admin privileges required (catalog protection on)"),
        (status = 404, description = "Book or author not found")
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    access: CatalogAccess,
    PathParam(id): PathParam<i32>,
    JsonBody(book): JsonBody<UpdateBook>,
) -> AppResult<Json<Book>> {
    access.require_admin()?;

    let updated = state.services.catalog.update_book(id, book).await?;
    Ok(Json(updated))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    security((), ("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 403, description = "Admin privileges required (catalog protection on)"),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Copies are still borrowed")
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    access: CatalogAccess,
    PathParam(id): PathParam<i32>,
) -> AppResult<StatusCode> {
    access.require_admin()?;

    state.services.catalog.delete_book(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Total copies of every book with this title (case-insensitive)
#[utoipa::path(
    get,
    path = "/books/count/{title}",
    tag = "books",
    params(
        ("title" = String, Path, description = "Exact title, any case")
    ),
    responses(
        (status = 200, description = "Sum of total copies, 0 if unknown", body = TitleCountResponse)
    )
)]
pub async fn count_copies_by_title(
    State(state): State<crate::AppState>,
    PathParam(title): PathParam<String>,
) -> AppResult<Json<TitleCountResponse>> {
    let total_copies = state.services.catalog.total_copies_by_title(&title).await?;
    Ok(Json(TitleCountResponse { title, total_copies }))
}
