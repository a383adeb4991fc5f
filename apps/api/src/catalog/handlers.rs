use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::catalog::matching::normalize_skill_list;
use crate::errors::AppError;
use crate::models::catalog::{CertificationRow, InternshipRow, JobRow, SkillRow};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct SkillsResponse {
    pub skills: Vec<SkillRow>,
}

#[derive(Debug, Deserialize)]
pub struct CreateSkillRequest {
    pub name: String,
    pub domain: String,
}

#[derive(Debug, Serialize)]
pub struct JobsResponse {
    pub jobs: Vec<JobRow>,
}

#[derive(Debug, Deserialize)]
pub struct JobRequest {
    pub title: String,
    pub required_skills: Vec<String>,
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CertificationsResponse {
    pub certifications: Vec<CertificationRow>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCertificationRequest {
    pub title: String,
    pub platform: String,
    pub url: Option<String>,
    pub skill_tags: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct InternshipsResponse {
    pub internships: Vec<InternshipRow>,
}

#[derive(Debug, Deserialize)]
pub struct CreateInternshipRequest {
    pub title: String,
    pub platform: String,
    pub url: Option<String>,
    pub job_role: String,
    pub required_skills: Vec<String>,
}

fn require_text(value: &str, field: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} is required")));
    }
    Ok(())
}

fn require_skills(skills: &[String], field: &str) -> Result<Vec<String>, AppError> {
    let skills = normalize_skill_list(skills);
    if skills.is_empty() {
        return Err(AppError::Validation(format!("{field} cannot be empty")));
    }
    Ok(skills)
}

// ────────────────────────────────────────────────────────────────────────────
// Skills
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/skills
pub async fn handle_list_skills(
    State(state): State<AppState>,
) -> Result<Json<SkillsResponse>, AppError> {
    let skills = sqlx::query_as("SELECT * FROM skills ORDER BY domain, name")
        .fetch_all(&state.db)
        .await?;
    Ok(Json(SkillsResponse { skills }))
}

/// GET /api/v1/skills/domain/:domain
pub async fn handle_skills_by_domain(
    State(state): State<AppState>,
    Path(domain): Path<String>,
) -> Result<Json<SkillsResponse>, AppError> {
    let skills = sqlx::query_as("SELECT * FROM skills WHERE domain = $1 ORDER BY name")
        .bind(domain)
        .fetch_all(&state.db)
        .await?;
    Ok(Json(SkillsResponse { skills }))
}

/// POST /api/v1/skills
pub async fn handle_create_skill(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateSkillRequest>,
) -> Result<(StatusCode, Json<SkillRow>), AppError> {
    auth.require_admin()?;
    require_text(&req.name, "name")?;
    require_text(&req.domain, "domain")?;

    let skill: SkillRow =
        sqlx::query_as("INSERT INTO skills (name, domain) VALUES ($1, $2) RETURNING *")
            .bind(req.name.trim())
            .bind(req.domain.trim())
            .fetch_one(&state.db)
            .await
            .map_err(AppError::conflict_on_unique("Skill already exists"))?;

    info!("Added skill '{}' ({})", skill.name, skill.domain);
    Ok((StatusCode::CREATED, Json(skill)))
}

// ────────────────────────────────────────────────────────────────────────────
// Jobs
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/jobs
pub async fn handle_list_jobs(State(state): State<AppState>) -> Result<Json<JobsResponse>, AppError> {
    let jobs = sqlx::query_as("SELECT * FROM jobs ORDER BY title")
        .fetch_all(&state.db)
        .await?;
    Ok(Json(JobsResponse { jobs }))
}

/// GET /api/v1/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobRow>, AppError> {
    let job: Option<JobRow> = sqlx::query_as("SELECT * FROM jobs WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?;
    job.map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))
}

/// POST /api/v1/jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<JobRequest>,
) -> Result<(StatusCode, Json<JobRow>), AppError> {
    auth.require_admin()?;
    require_text(&req.title, "title")?;
    let skills = require_skills(&req.required_skills, "required_skills")?;

    let job: JobRow = sqlx::query_as(
        "INSERT INTO jobs (title, required_skills, description) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(req.title.trim())
    .bind(&skills)
    .bind(&req.description)
    .fetch_one(&state.db)
    .await
    .map_err(AppError::conflict_on_unique("Job already exists"))?;

    info!("Created job {} ({})", job.id, job.title);
    Ok((StatusCode::CREATED, Json(job)))
}

/// PUT /api/v1/jobs/:id
pub async fn handle_update_job(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<JobRequest>,
) -> Result<Json<JobRow>, AppError> {
    auth.require_admin()?;
    require_text(&req.title, "title")?;
    let skills = require_skills(&req.required_skills, "required_skills")?;

    let job: Option<JobRow> = sqlx::query_as(
        "UPDATE jobs SET title = $1, required_skills = $2, description = $3 WHERE id = $4 RETURNING *",
    )
    .bind(req.title.trim())
    .bind(&skills)
    .bind(&req.description)
    .bind(id)
    .fetch_optional(&state.db)
    .await
    .map_err(AppError::conflict_on_unique("Job already exists"))?;

    job.map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))
}

/// DELETE /api/v1/jobs/:id
pub async fn handle_delete_job(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    auth.require_admin()?;
    let deleted = sqlx::query("DELETE FROM jobs WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?
        .rows_affected();
    if deleted == 0 {
        return Err(AppError::NotFound(format!("Job {id} not found")));
    }
    info!("Deleted job {id}");
    Ok(StatusCode::NO_CONTENT)
}

// ────────────────────────────────────────────────────────────────────────────
// Certifications
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/certifications
pub async fn handle_list_certifications(
    State(state): State<AppState>,
) -> Result<Json<CertificationsResponse>, AppError> {
    let certifications = sqlx::query_as("SELECT * FROM certifications ORDER BY platform, title")
        .fetch_all(&state.db)
        .await?;
    Ok(Json(CertificationsResponse { certifications }))
}

/// GET /api/v1/certifications/platform/:platform
pub async fn handle_certifications_by_platform(
    State(state): State<AppState>,
    Path(platform): Path<String>,
) -> Result<Json<CertificationsResponse>, AppError> {
    let certifications =
        sqlx::query_as("SELECT * FROM certifications WHERE platform = $1 ORDER BY title")
            .bind(platform)
            .fetch_all(&state.db)
            .await?;
    Ok(Json(CertificationsResponse { certifications }))
}

/// GET /api/v1/certifications/skill/:skill
pub async fn handle_certifications_by_skill(
    State(state): State<AppState>,
    Path(skill): Path<String>,
) -> Result<Json<CertificationsResponse>, AppError> {
    let certifications =
        sqlx::query_as("SELECT * FROM certifications WHERE $1 = ANY(skill_tags) ORDER BY title")
            .bind(skill)
            .fetch_all(&state.db)
            .await?;
    Ok(Json(CertificationsResponse { certifications }))
}

/// POST /api/v1/certifications
pub async fn handle_create_certification(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateCertificationRequest>,
) -> Result<(StatusCode, Json<CertificationRow>), AppError> {
    auth.require_admin()?;
    require_text(&req.title, "title")?;
    require_text(&req.platform, "platform")?;
    let tags = require_skills(&req.skill_tags, "skill_tags")?;

    let certification: CertificationRow = sqlx::query_as(
        "INSERT INTO certifications (title, platform, url, skill_tags) VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(req.title.trim())
    .bind(req.platform.trim())
    .bind(&req.url)
    .bind(&tags)
    .fetch_one(&state.db)
    .await
    .map_err(AppError::conflict_on_unique(
        "Certification already exists on this platform",
    ))?;

    Ok((StatusCode::CREATED, Json(certification)))
}

// ────────────────────────────────────────────────────────────────────────────
// Internships
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/internships
pub async fn handle_list_internships(
    State(state): State<AppState>,
) -> Result<Json<InternshipsResponse>, AppError> {
    let internships = sqlx::query_as("SELECT * FROM internships ORDER BY platform, title")
        .fetch_all(&state.db)
        .await?;
    Ok(Json(InternshipsResponse { internships }))
}

/// GET /api/v1/internships/platform/:platform
pub async fn handle_internships_by_platform(
    State(state): State<AppState>,
    Path(platform): Path<String>,
) -> Result<Json<InternshipsResponse>, AppError> {
    let internships =
        sqlx::query_as("SELECT * FROM internships WHERE platform = $1 ORDER BY title")
            .bind(platform)
            .fetch_all(&state.db)
            .await?;
    Ok(Json(InternshipsResponse { internships }))
}

/// GET /api/v1/internships/role/:role
pub async fn handle_internships_by_role(
    State(state): State<AppState>,
    Path(role): Path<String>,
) -> Result<Json<InternshipsResponse>, AppError> {
    let internships =
        sqlx::query_as("SELECT * FROM internships WHERE job_role = $1 ORDER BY title")
            .bind(role)
            .fetch_all(&state.db)
            .await?;
    Ok(Json(InternshipsResponse { internships }))
}

/// POST /api/v1/internships
pub async fn handle_create_internship(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateInternshipRequest>,
) -> Result<(StatusCode, Json<InternshipRow>), AppError> {
    auth.require_admin()?;
    require_text(&req.title, "title")?;
    require_text(&req.platform, "platform")?;
    require_text(&req.job_role, "job_role")?;
    let skills = require_skills(&req.required_skills, "required_skills")?;

    let internship: InternshipRow = sqlx::query_as(
        r#"
        INSERT INTO internships (title, platform, url, job_role, required_skills)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(req.title.trim())
    .bind(req.platform.trim())
    .bind(&req.url)
    .bind(req.job_role.trim())
    .bind(&skills)
    .fetch_one(&state.db)
    .await
    .map_err(AppError::conflict_on_unique(
        "Internship already exists on this platform",
    ))?;

    Ok((StatusCode::CREATED, Json(internship)))
}
