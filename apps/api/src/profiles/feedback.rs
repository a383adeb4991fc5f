use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::profile::MentorFeedbackRow;
use crate::models::user::Role;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateFeedbackRequest {
    pub graduate_id: Uuid,
    pub feedback: String,
    pub score: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct FeedbackResponse {
    pub feedback: Vec<MentorFeedbackRow>,
}

fn validate_feedback(req: &CreateFeedbackRequest) -> Result<(), AppError> {
    if req.feedback.trim().is_empty() {
        return Err(AppError::Validation("feedback is required".to_string()));
    }
    if let Some(score) = req.score {
        if !(0..=100).contains(&score) {
            return Err(AppError::Validation(
                "score must be between 0 and 100".to_string(),
            ));
        }
    }
    Ok(())
}

/// Who may read feedback addressed to `graduate_id`.
fn can_read_feedback(auth: &AuthUser, graduate_id: Uuid) -> bool {
    match auth.role {
        Role::Mentor | Role::Admin => true,
        Role::Graduate | Role::Student => auth.id == graduate_id,
    }
}

pub async fn feedback_for_graduate(
    pool: &PgPool,
    graduate_id: Uuid,
) -> Result<Vec<MentorFeedbackRow>, AppError> {
    Ok(sqlx::query_as(
        "SELECT * FROM mentor_feedback WHERE graduate_id = $1 ORDER BY created_at DESC",
    )
    .bind(graduate_id)
    .fetch_all(pool)
    .await?)
}

pub async fn feedback_by_mentor(
    pool: &PgPool,
    mentor_id: Uuid,
) -> Result<Vec<MentorFeedbackRow>, AppError> {
    Ok(sqlx::query_as(
        "SELECT * FROM mentor_feedback WHERE mentor_id = $1 ORDER BY created_at DESC",
    )
    .bind(mentor_id)
    .fetch_all(pool)
    .await?)
}

/// POST /api/v1/feedback
pub async fn handle_create_feedback(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateFeedbackRequest>,
) -> Result<(StatusCode, Json<MentorFeedbackRow>), AppError> {
    match auth.role {
        Role::Mentor | Role::Admin => {}
        Role::Student | Role::Graduate => return Err(AppError::Forbidden),
    }
    validate_feedback(&req)?;

    let graduate_role: Option<Role> = sqlx::query_scalar("SELECT role FROM users WHERE id = $1")
        .bind(req.graduate_id)
        .fetch_optional(&state.db)
        .await?;
    match graduate_role {
        Some(Role::Graduate) => {}
        Some(_) => {
            return Err(AppError::Validation(
                "feedback can only be given to graduates".to_string(),
            ))
        }
        None => return Err(AppError::NotFound("Graduate not found".to_string())),
    }

    let row: MentorFeedbackRow = sqlx::query_as(
        r#"
        INSERT INTO mentor_feedback (graduate_id, mentor_id, feedback, score)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(req.graduate_id)
    .bind(auth.id)
    .bind(req.feedback.trim())
    .bind(req.score)
    .fetch_one(&state.db)
    .await?;

    info!("Mentor {} left feedback for {}", auth.id, req.graduate_id);
    Ok((StatusCode::CREATED, Json(row)))
}

/// GET /api/v1/feedback/:graduate_id
pub async fn handle_list_feedback(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(graduate_id): Path<Uuid>,
) -> Result<Json<FeedbackResponse>, AppError> {
    if !can_read_feedback(&auth, graduate_id) {
        return Err(AppError::Forbidden);
    }
    let feedback = feedback_for_graduate(&state.db, graduate_id).await?;
    Ok(Json(FeedbackResponse { feedback }))
}
