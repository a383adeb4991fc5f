//! Role-specific landing data for `GET /api/v1/dashboard`.

use axum::{extract::State, Json};
use serde::Serialize;
use sqlx::FromRow;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::profile::{GraduateProfileRow, GraduateProfileSummary, MentorFeedbackRow};
use crate::models::user::Role;
use crate::profiles::feedback::{feedback_by_mentor, feedback_for_graduate};
use crate::profiles::handlers::{find_profile, list_profile_summaries};
use crate::quiz::aggregate::{overall_stats, subject_scores, OverallStats, SubjectScore};
use crate::quiz::handlers::{recommendations_for, RecommendationsResponse};
use crate::state::AppState;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PlatformCounts {
    pub users: i64,
    pub students: i64,
    pub graduates: i64,
    pub mentors: i64,
    pub admins: i64,
    pub quiz_results: i64,
    pub skills: i64,
    pub jobs: i64,
    pub certifications: i64,
    pub internships: i64,
}

#[derive(Debug, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Dashboard {
    Student {
        overall: OverallStats,
        subjects: Vec<SubjectScore>,
        #[serde(flatten)]
        recommendations: RecommendationsResponse,
    },
    Graduate {
        profile: Option<GraduateProfileRow>,
        feedback: Vec<MentorFeedbackRow>,
    },
    Mentor {
        graduates: Vec<GraduateProfileSummary>,
        feedback_given: Vec<MentorFeedbackRow>,
    },
    Admin {
        counts: PlatformCounts,
    },
}

async fn platform_counts(state: &AppState) -> Result<PlatformCounts, AppError> {
    Ok(sqlx::query_as(
        r#"
        SELECT
            (SELECT COUNT(*) FROM users) AS users,
            (SELECT COUNT(*) FROM users WHERE role = 'student') AS students,
            (SELECT COUNT(*) FROM users WHERE role = 'graduate') AS graduates,
            (SELECT COUNT(*) FROM users WHERE role = 'mentor') AS mentors,
            (SELECT COUNT(*) FROM users WHERE role = 'admin') AS admins,
            (SELECT COUNT(*) FROM quiz_results) AS quiz_results,
            (SELECT COUNT(*) FROM skills) AS skills,
            (SELECT COUNT(*) FROM jobs) AS jobs,
            (SELECT COUNT(*) FROM certifications) AS certifications,
            (SELECT COUNT(*) FROM internships) AS internships
        "#,
    )
    .fetch_one(&state.db)
    .await?)
}

/// GET /api/v1/dashboard
pub async fn handle_dashboard(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Dashboard>, AppError> {
    let dashboard = match auth.role {
        Role::Student => {
            let history = state.results.history(auth.id).await?;
            Dashboard::Student {
                overall: overall_stats(&history),
                subjects: subject_scores(&history, &state.question_bank.subjects()),
                recommendations: recommendations_for(&state, &history),
            }
        }
        Role::Graduate => Dashboard::Graduate {
            profile: find_profile(&state.db, auth.id).await?,
            feedback: feedback_for_graduate(&state.db, auth.id).await?,
        },
        Role::Mentor => Dashboard::Mentor {
            graduates: list_profile_summaries(&state.db).await?,
            feedback_given: feedback_by_mentor(&state.db, auth.id).await?,
        },
        Role::Admin => Dashboard::Admin {
            counts: platform_counts(&state).await?,
        },
    };
    Ok(Json(dashboard))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_student_dashboard_is_tagged_and_flattened() {
        let dashboard = Dashboard::Student {
            overall: OverallStats {
                quizzes_taken: 0,
                average_percentage: 0.0,
            },
            subjects: Vec::new(),
            recommendations: RecommendationsResponse {
                recommendations: Vec::new(),
                message: Some("Take a quiz".into()),
            },
        };
        let json = serde_json::to_value(&dashboard).unwrap();
        assert_eq!(json["role"], "student");
        assert_eq!(json["message"], "Take a quiz");
        assert!(json["recommendations"].as_array().unwrap().is_empty());
    }
}
