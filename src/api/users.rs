//! User management endpoints (administrators only)

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::AppResult,
    models::user::{RegisterRequest, User},
};

use super::{AuthenticatedUser, JsonBody};

/// List all users
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "List of users", body = Vec<User>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Admin privileges required")
    )
)]
pub async fn list_users(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<User>>> {
    claims.require_admin()?;

    let users = state.services.users.list_users().await?;
    Ok(Json(users))
}

/// Create an administrator account
#[utoipa::path(
    post,
    path = "/users/admins",
    tag = "users",
    security(("bearer_auth" = [])),
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Administrator created", body = User),
        (status = 400, description = "Invalid input, or username/email already taken"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Admin privileges required")
    )
)]
pub async fn create_admin(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    JsonBody(request): JsonBody<RegisterRequest>,
) -> AppResult<(StatusCode, Json<User>)> {
    claims.require_admin()?;

    let user = state.services.users.create_admin(request).await?;
    tracing::info!(created_by = %claims.sub, "Administrator {} created", user.username);
    Ok((StatusCode::CREATED, Json(user)))
}
