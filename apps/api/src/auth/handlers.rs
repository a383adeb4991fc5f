use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::{token, AuthError, AuthUser};
use crate::errors::AppError;
use crate::models::user::{Role, User, UserRow, USER_COLUMNS};
use crate::state::AppState;

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: User,
}

fn validate_registration(req: &RegisterRequest) -> Result<(), AppError> {
    if req.email.trim().is_empty() || req.name.trim().is_empty() || req.password.is_empty() {
        return Err(AppError::Validation("All fields are required".to_string()));
    }
    if !req.email.contains('@') {
        return Err(AppError::Validation("email is not valid".to_string()));
    }
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    match req.role {
        Role::Student | Role::Graduate | Role::Mentor => Ok(()),
        Role::Admin => Err(AppError::Forbidden),
    }
}

/// POST /api/v1/auth/register
pub async fn handle_register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    validate_registration(&req)?;
    tokio::time::sleep(state.config.auth_delay).await;

    let email = req.email.trim().to_lowercase();
    let password_hash = hash_password(req.password).await?;

    let user: User = sqlx::query_as(&format!(
        "INSERT INTO users (email, password_hash, name, role) VALUES ($1, $2, $3, $4) RETURNING {USER_COLUMNS}"
    ))
    .bind(&email)
    .bind(password_hash)
    .bind(req.name.trim())
    .bind(req.role)
    .fetch_one(&state.db)
    .await
    .map_err(AppError::conflict_on_unique("User already exists"))?;

    let token = token::issue(&user, &state.config.jwt_secret, state.config.jwt_expires_in)?;
    info!("Registered {:?} account {}", user.role, user.id);

    Ok((StatusCode::CREATED, Json(AuthResponse { user, token })))
}

/// POST /api/v1/auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(AppError::Validation(
            "Email and password are required".to_string(),
        ));
    }
    tokio::time::sleep(state.config.auth_delay).await;

    let row: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
        .bind(req.email.trim().to_lowercase())
        .fetch_optional(&state.db)
        .await?;

    let row = row.ok_or(AuthError::InvalidCredentials)?;
    if !verify_password(req.password, row.password_hash.clone()).await {
        return Err(AuthError::InvalidCredentials.into());
    }

    let user = User::from(row);
    let token = token::issue(&user, &state.config.jwt_secret, state.config.jwt_expires_in)?;
    info!("User {} signed in", user.id);

    Ok(Json(AuthResponse { user, token }))
}

/// GET /api/v1/auth/me
pub async fn handle_me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<MeResponse>, AppError> {
    let user: Option<User> =
        sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(auth.id)
            .fetch_optional(&state.db)
            .await?;
    let user = user.ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(Json(MeResponse { user }))
}
