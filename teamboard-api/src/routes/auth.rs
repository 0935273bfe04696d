/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /auth/register` - Register a new user, returns a session token
/// - `POST /auth/login` - Authenticate, returns a session token
///
/// Both responses carry the public user projection; the password hash never
/// leaves this module's call into the shared crate.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use teamboard_shared::{
    auth::{jwt, password},
    models::user::{CreateUser, User, UserRole},
};
use uuid::Uuid;
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// Given name
    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: String,

    /// Family name
    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    pub password: String,
}

/// Public user projection
#[derive(Debug, Serialize)]
pub struct UserDto {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
}

impl From<&User> for UserDto {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            role: user.role,
        }
    }
}

/// Token + user payload returned by both register and login
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// Signed session token (7-day expiry)
    pub token: String,

    /// Public user projection
    pub user: UserDto,
}

/// Registers a new user
///
/// # Errors
///
/// - `400` when any account, active or deactivated, already holds the email
/// - `422` when the request fails field validation
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Json<AuthResponse>> {
    req.validate()?;

    let email = req.email.to_lowercase();

    if User::email_taken(&state.db, &email).await? {
        return Err(ApiError::Conflict("User already exists".to_string()));
    }

    let password_hash = password::hash_password(&req.password)?;

    // A concurrent registration of the same email loses here on the unique
    // constraint and surfaces as the same conflict.
    let user = User::create(
        &state.db,
        CreateUser {
            email,
            password_hash,
            first_name: req.first_name,
            last_name: req.last_name,
        },
    )
    .await?;

    let token = issue_token(&state, &user)?;

    Ok(Json(AuthResponse {
        token,
        user: UserDto::from(&user),
    }))
}

/// Authenticates a user
///
/// # Errors
///
/// - `401` when no active account matches the email or the password does
///   not verify; the two cases are indistinguishable by design
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    req.validate()?;

    let user = User::find_active_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    if !password::verify_password(&req.password, &user.password_hash)? {
        return Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    User::update_last_login(&state.db, user.id).await?;

    let token = issue_token(&state, &user)?;

    Ok(Json(AuthResponse {
        token,
        user: UserDto::from(&user),
    }))
}

/// Signs a session token for the user
fn issue_token(state: &AppState, user: &User) -> Result<String, ApiError> {
    let claims = jwt::Claims::new(user.id, &user.email, &user.display_name(), user.role);
    Ok(jwt::create_token(&claims, state.jwt_secret())?)
}
