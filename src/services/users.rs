//! Registration, authentication and user listing

use chrono::Duration;
use validator::Validate;

use super::password::{hash_password, verify_password, DUMMY_HASH};
use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{LoginRequest, RegisterRequest, Role, User, UserClaims},
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    config: AuthConfig,
}

impl UsersService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Token lifetime
    pub fn token_ttl(&self) -> Duration {
        Duration::hours(self.config.jwt_expiration_hours as i64)
    }

    /// Register a regular user
    pub async fn register(&self, request: RegisterRequest) -> AppResult<User> {
        self.create_account(request, Role::User).await
    }

    /// Register an administrator. Callers must check the requester's role.
    pub async fn create_admin(&self, request: RegisterRequest) -> AppResult<User> {
        self.create_account(request, Role::Admin).await
    }

    async fn create_account(&self, request: RegisterRequest, role: Role) -> AppResult<User> {
        let request = request.normalized();
        request.validate()?;

        if self
            .repository
            .users
            .username_or_email_exists(&request.username, &request.email)
            .await?
        {
            return Err(AppError::Duplicate(
                "User with the same username or email already exists".to_string(),
            ));
        }

        let RegisterRequest { username, email, password } = request;
        let password = run_blocking(move || hash_password(&password)).await?;
        let user = self
            .repository
            .users
            .create(&username, &email, &password, role)
            .await?;

        tracing::info!(user_id = user.id, role = %user.role, "Registered user {}", user.username);
        Ok(user)
    }

    /// Authenticate by username and password, returning a signed token
    pub async fn authenticate(&self, request: LoginRequest) -> AppResult<(String, User)> {
        let request = request.normalized();
        request.validate()?;

        let user = self.repository.users.get_by_username(&request.username).await?;

        // Unknown users still cost one key derivation
        let stored = user
            .as_ref()
            .map(|user| user.password.clone())
            .unwrap_or_else(|| DUMMY_HASH.to_string());
        let password = request.password;
        let valid = run_blocking(move || verify_password(&password, &stored)).await?;

        let user = match user {
            Some(user) if valid => user,
            Some(_) => {
                tracing::warn!("Failed login for {}", request.username);
                return Err(invalid_credentials());
            }
            None => {
                tracing::warn!("Failed login for unknown user {}", request.username);
                return Err(invalid_credentials());
            }
        };

        let token = self.issue_token(&user)?;
        Ok((token, user))
    }

    /// Create a JWT token for a user
    pub fn issue_token(&self, user: &User) -> AppResult<String> {
        UserClaims::new(&user.username, user.id, user.role, self.token_ttl())
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    /// Verify a bearer token
    pub fn validate_token(&self, token: &str) -> AppResult<UserClaims> {
        UserClaims::from_token(token, &self.config.jwt_secret)
            .map_err(|e| AppError::Authentication(format!("Invalid token: {}", e)))
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    /// List all users
    pub async fn list_users(&self) -> AppResult<Vec<User>> {
        self.repository.users.list().await
    }
}

/// Key derivation is CPU-bound; keep it off the async workers
async fn run_blocking<T, F>(f: F) -> AppResult<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::Internal(format!("Password task failed: {}", e)))
}

fn invalid_credentials() -> AppError {
    AppError::Authentication("Invalid username or password".to_string())
}
