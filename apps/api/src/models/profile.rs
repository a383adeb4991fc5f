use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GraduateProfileRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub resume_text: Option<String>,
    pub extracted_skills: Vec<String>,
    /// Serialized `Vec<JobMatch>`, recomputed whenever skills change.
    pub job_matches: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Profile joined with the owning account, for admin and mentor listings.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GraduateProfileSummary {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub extracted_skills: Vec<String>,
    pub job_matches: Value,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MentorFeedbackRow {
    pub id: Uuid,
    pub graduate_id: Uuid,
    pub mentor_id: Uuid,
    pub feedback: String,
    pub score: Option<i32>,
    pub created_at: DateTime<Utc>,
}
