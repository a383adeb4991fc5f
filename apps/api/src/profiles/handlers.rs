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
use crate::catalog::matching::{match_jobs, normalize_skill_list, JobMatch};
use crate::errors::AppError;
use crate::models::catalog::{CertificationRow, JobRow};
use crate::models::profile::{GraduateProfileRow, GraduateProfileSummary};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub profile: GraduateProfileRow,
}

#[derive(Debug, Serialize)]
pub struct ProfilesResponse {
    pub profiles: Vec<GraduateProfileSummary>,
}

#[derive(Debug, Deserialize)]
pub struct UpsertProfileRequest {
    pub resume_text: Option<String>,
    pub extracted_skills: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSkillsRequest {
    pub extracted_skills: Vec<String>,
}

/// Recomputes job matches for a skill list against the current catalog.
pub async fn compute_job_matches(pool: &PgPool, skills: &[String]) -> Result<Vec<JobMatch>, AppError> {
    if skills.is_empty() {
        return Ok(Vec::new());
    }
    let jobs: Vec<JobRow> = sqlx::query_as("SELECT * FROM jobs ORDER BY title")
        .fetch_all(pool)
        .await?;
    let certifications: Vec<CertificationRow> =
        sqlx::query_as("SELECT * FROM certifications ORDER BY title")
            .fetch_all(pool)
            .await?;
    Ok(match_jobs(skills, &jobs, &certifications))
}

fn encode_matches(matches: &[JobMatch]) -> Result<serde_json::Value, AppError> {
    serde_json::to_value(matches)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to encode job matches: {e}")))
}

pub async fn find_profile(pool: &PgPool, user_id: Uuid) -> Result<Option<GraduateProfileRow>, AppError> {
    Ok(
        sqlx::query_as("SELECT * FROM graduate_profiles WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await?,
    )
}

pub async fn list_profile_summaries(pool: &PgPool) -> Result<Vec<GraduateProfileSummary>, AppError> {
    Ok(sqlx::query_as(
        r#"
        SELECT gp.id, gp.user_id, u.name, u.email, gp.extracted_skills, gp.job_matches, gp.updated_at
        FROM graduate_profiles gp
        JOIN users u ON gp.user_id = u.id
        ORDER BY gp.updated_at DESC
        "#,
    )
    .fetch_all(pool)
    .await?)
}

/// GET /api/v1/profiles
pub async fn handle_list_profiles(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ProfilesResponse>, AppError> {
    auth.require_admin()?;
    let profiles = list_profile_summaries(&state.db).await?;
    Ok(Json(ProfilesResponse { profiles }))
}

/// GET /api/v1/profiles/:user_id
pub async fn handle_get_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ProfileResponse>, AppError> {
    auth.require_self_or_admin(user_id)?;
    let profile = find_profile(&state.db, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;
    Ok(Json(ProfileResponse { profile }))
}

/// POST /api/v1/profiles/:user_id
///
/// Creates the profile (201) or updates it (200). Job matches are
/// recomputed when skills are supplied.
pub async fn handle_upsert_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<Uuid>,
    Json(req): Json<UpsertProfileRequest>,
) -> Result<(StatusCode, Json<ProfileResponse>), AppError> {
    auth.require_self_or_admin(user_id)?;

    let skills = req.extracted_skills.as_deref().map(normalize_skill_list);
    let matches = match &skills {
        Some(skills) => Some(encode_matches(&compute_job_matches(&state.db, skills).await?)?),
        None => None,
    };

    let existing = find_profile(&state.db, user_id).await?;
    let (status, profile): (StatusCode, GraduateProfileRow) = match existing {
        Some(_) => {
            let profile = sqlx::query_as(
                r#"
                UPDATE graduate_profiles
                SET resume_text = COALESCE($1, resume_text),
                    extracted_skills = COALESCE($2, extracted_skills),
                    job_matches = COALESCE($3, job_matches),
                    updated_at = now()
                WHERE user_id = $4
                RETURNING *
                "#,
            )
            .bind(&req.resume_text)
            .bind(&skills)
            .bind(&matches)
            .bind(user_id)
            .fetch_one(&state.db)
            .await?;
            (StatusCode::OK, profile)
        }
        None => {
            let profile = sqlx::query_as(
                r#"
                INSERT INTO graduate_profiles (user_id, resume_text, extracted_skills, job_matches)
                VALUES ($1, $2, COALESCE($3, '{}'::TEXT[]), COALESCE($4, '[]'::JSONB))
                RETURNING *
                "#,
            )
            .bind(user_id)
            .bind(&req.resume_text)
            .bind(&skills)
            .bind(&matches)
            .fetch_one(&state.db)
            .await?;
            (StatusCode::CREATED, profile)
        }
    };

    info!(
        "Saved graduate profile for {user_id} ({} skills)",
        profile.extracted_skills.len()
    );
    Ok((status, Json(ProfileResponse { profile })))
}

/// PATCH /api/v1/profiles/:user_id/skills
pub async fn handle_update_skills(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<Uuid>,
    Json(req): Json<UpdateSkillsRequest>,
) -> Result<Json<ProfileResponse>, AppError> {
    auth.require_self_or_admin(user_id)?;

    let skills = normalize_skill_list(&req.extracted_skills);
    let matches = encode_matches(&compute_job_matches(&state.db, &skills).await?)?;

    let profile: Option<GraduateProfileRow> = sqlx::query_as(
        r#"
        UPDATE graduate_profiles
        SET extracted_skills = $1, job_matches = $2, updated_at = now()
        WHERE user_id = $3
        RETURNING *
        "#,
    )
    .bind(&skills)
    .bind(matches)
    .bind(user_id)
    .fetch_optional(&state.db)
    .await?;

    let profile = profile.ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;
    Ok(Json(ProfileResponse { profile }))
}
