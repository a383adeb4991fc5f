use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::user::{User, USER_COLUMNS};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UsersResponse {
    pub users: Vec<User>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: User,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl UpdateUserRequest {
    /// Blank strings count as absent. Fails when nothing is left to update.
    fn normalized(self) -> Result<(Option<String>, Option<String>), AppError> {
        let name = self.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
        let email = self
            .email
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty());
        if name.is_none() && email.is_none() {
            return Err(AppError::Validation("Name or email is required".to_string()));
        }
        if matches!(&email, Some(e) if !e.contains('@')) {
            return Err(AppError::Validation("email is not valid".to_string()));
        }
        Ok((name, email))
    }
}

/// GET /api/v1/users
pub async fn handle_list_users(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<UsersResponse>, AppError> {
    auth.require_admin()?;
    let users = sqlx::query_as(&format!(
        "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC"
    ))
    .fetch_all(&state.db)
    .await?;
    Ok(Json(UsersResponse { users }))
}

/// GET /api/v1/users/:id
pub async fn handle_get_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<UserResponse>, AppError> {
    auth.require_self_or_admin(id)?;
    let user: Option<User> =
        sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&state.db)
            .await?;
    let user = user.ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(Json(UserResponse { user }))
}

/// PUT /api/v1/users/:id
pub async fn handle_update_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    auth.require_self_or_admin(id)?;
    let (name, email) = req.normalized()?;

    let user: Option<User> = sqlx::query_as(&format!(
        r#"
        UPDATE users
        SET name = COALESCE($1, name), email = COALESCE($2, email), updated_at = now()
        WHERE id = $3
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(name)
    .bind(email)
    .bind(id)
    .fetch_optional(&state.db)
    .await
    .map_err(AppError::conflict_on_unique("Email already exists"))?;

    let user = user.ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(Json(UserResponse { user }))
}

/// DELETE /api/v1/users/:id
pub async fn handle_delete_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    auth.require_admin()?;
    let deleted = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?
        .rows_affected();
    if deleted == 0 {
        return Err(AppError::NotFound("User not found".to_string()));
    }
    state.quiz_sessions.clear(id);
    info!("Admin {} deleted user {id}", auth.id);
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_requires_a_field() {
        let req = UpdateUserRequest {
            name: Some("  ".into()),
            email: None,
        };
        assert!(matches!(req.normalized(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_update_normalizes_email() {
        let req = UpdateUserRequest {
            name: None,
            email: Some(" Ada@Example.COM ".into()),
        };
        let (name, email) = req.normalized().unwrap();
        assert_eq!(name, None);
        assert_eq!(email.as_deref(), Some("ada@example.com"));
    }

    #[test]
    fn test_update_rejects_bad_email() {
        let req = UpdateUserRequest {
            name: Some("Ada".into()),
            email: Some("not-an-email".into()),
        };
        assert!(req.normalized().is_err());
    }
}
