//! Author endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::author::{Author, AuthorWithBooks, CreateAuthor, UpdateAuthor},
};

use super::{CatalogAccess, JsonBody, PathParam};

/// List authors with their books
#[utoipa::path(
    get,
    path = "/authors",
    tag = "authors",
    responses(
        (status = 200, description = "List of authors", body = Vec<AuthorWithBooks>)
    )
)]
pub async fn list_authors(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<AuthorWithBooks>>> {
    let authors = state.services.authors.list_authors().await?;
    Ok(Json(authors))
}

/// Get author details by ID
#[utoipa::path(
    get,
    path = "/authors/{id}",
    tag = "authors",
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    responses(
        (status = 200, description = "Author with books", body = AuthorWithBooks),
        (status = 404, description = "Author not found")
    )
)]
pub async fn get_author(
    State(state): State<crate::AppState>,
    PathParam(id): PathParam<i32>,
) -> AppResult<Json<AuthorWithBooks>> {
    let author = state.services.authors.get_author(id).await?;
    Ok(Json(author))
}

/// Create a new author
#[utoipa::path(
    post,
    path = "/authors",
    tag = "authors",
    security((), ("bearer_auth" = [])),
    request_body = CreateAuthor,
    responses(
        (status = 201, description = "Author created", body = Author),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Admin privileges required (catalog protection on)")
    )
)]
pub async fn create_author(
    State(state): State<crate::AppState>,
    access: CatalogAccess,
    JsonBody(author): JsonBody<CreateAuthor>,
) -> AppResult<(StatusCode, Json<Author>)> {
    access.require_admin()?;

    let created = state.services.authors.create_author(author).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update an existing author
#[utoipa::path(
    put,
    path = "/authors/{id}",
    tag = "authors",
    security((), ("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    request_body = UpdateAuthor,
    responses(
        (status = 200, description = "Author updated", body = Author),
        (status = 403, description = "Admin privileges required (catalog protection on)"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn update_author(
    State(state): State<crate::AppState>,
    access: CatalogAccess,
    PathParam(id): PathParam<i32>,
    JsonBody(author): JsonBody<UpdateAuthor>,
) -> AppResult<Json<Author>> {
    access.require_admin()?;

    let updated = state.services.authors.update_author(id, author).await?;
    Ok(Json(updated))
}

/// Delete an author
#[utoipa::path(
    delete,
    path = "/authors/{id}",
    tag = "authors",
    security((), ("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    responses(
        (status = 204, description = "Author deleted"),
        (status = 403, description = "Admin privileges required (catalog protection on)"),
        (status = 404, description = "Author not found"),
        (status = 409, description = "Author still has books")
    )
)]
pub async fn delete_author(
    State(state): State<crate::AppState>,
    access: CatalogAccess,
    PathParam(id): PathParam<i32>,
) -> AppResult<StatusCode> {
    access.require_admin()?;

    state.services.authors.delete_author(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
