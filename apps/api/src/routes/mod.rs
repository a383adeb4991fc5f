pub mod health;

use axum::{
    http::{header, HeaderValue, Method, Uri},
    middleware,
    routing::{get, patch, post},
    Router,
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::auth::handlers as auth;
use crate::catalog::handlers as catalog;
use crate::dashboard;
use crate::errors::AppError;
use crate::profiles::{feedback, handlers as profiles};
use crate::quiz::handlers as quiz;
use crate::rate_limit::api_rate_limit;
use crate::state::AppState;
use crate::users::handlers as users;

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("The requested route {} does not exist", uri.path()))
}

/// Restricts browsers to `frontend_url` when set; otherwise any origin.
pub fn cors_layer(frontend_url: Option<&HeaderValue>) -> CorsLayer {
    match frontend_url {
        Some(origin) => CorsLayer::new()
            .allow_origin(origin.clone())
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            .allow_credentials(true),
        None => CorsLayer::permissive(),
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(state.config.frontend_url.as_ref());

    Router::new()
        .route("/health", get(health::health_handler))
        // Accounts
        .route("/api/v1/auth/register", post(auth::handle_register))
        .route("/api/v1/auth/login", post(auth::handle_login))
        .route("/api/v1/auth/me", get(auth::handle_me))
        .route("/api/v1/users", get(users::handle_list_users))
        .route(
            "/api/v1/users/:id",
            get(users::handle_get_user)
                .put(users::handle_update_user)
                .delete(users::handle_delete_user),
        )
        // Catalog
        .route(
            "/api/v1/skills",
            get(catalog::handle_list_skills).post(catalog::handle_create_skill),
        )
        .route(
            "/api/v1/skills/domain/:domain",
            get(catalog::handle_skills_by_domain),
        )
        .route(
            "/api/v1/jobs",
            get(catalog::handle_list_jobs).post(catalog::handle_create_job),
        )
        .route(
            "/api/v1/jobs/:id",
            get(catalog::handle_get_job)
                .put(catalog::handle_update_job)
                .delete(catalog::handle_delete_job),
        )
        .route(
            "/api/v1/certifications",
            get(catalog::handle_list_certifications).post(catalog::handle_create_certification),
        )
        .route(
            "/api/v1/certifications/platform/:platform",
            get(catalog::handle_certifications_by_platform),
        )
        .route(
            "/api/v1/certifications/skill/:skill",
            get(catalog::handle_certifications_by_skill),
        )
        .route(
            "/api/v1/internships",
            get(catalog::handle_list_internships).post(catalog::handle_create_internship),
        )
        .route(
            "/api/v1/internships/platform/:platform",
            get(catalog::handle_internships_by_platform),
        )
        .route(
            "/api/v1/internships/role/:role",
            get(catalog::handle_internships_by_role),
        )
        // Quiz
        .route("/api/v1/quiz/subjects", get(quiz::handle_list_subjects))
        .route(
            "/api/v1/quiz/subjects/:subject",
            get(quiz::handle_get_questions),
        )
        .route(
            "/api/v1/quiz/session",
            get(quiz::handle_get_quiz).post(quiz::handle_start_quiz),
        )
        .route("/api/v1/quiz/session/answer", post(quiz::handle_answer))
        .route(
            "/api/v1/quiz/results",
            get(quiz::handle_list_results).post(quiz::handle_submit_result),
        )
        .route("/api/v1/quiz/stats", get(quiz::handle_stats))
        .route(
            "/api/v1/quiz/recommendations",
            get(quiz::handle_recommendations),
        )
        // Graduates and mentors
        .route("/api/v1/profiles", get(profiles::handle_list_profiles))
        .route(
            "/api/v1/profiles/:user_id",
            get(profiles::handle_get_profile).post(profiles::handle_upsert_profile),
        )
        .route(
            "/api/v1/profiles/:user_id/skills",
            patch(profiles::handle_update_skills),
        )
        .route("/api/v1/feedback", post(feedback::handle_create_feedback))
        .route(
            "/api/v1/feedback/:graduate_id",
            get(feedback::handle_list_feedback),
        )
        .route("/api/v1/dashboard", get(dashboard::handle_dashboard))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(state.clone(), api_rate_limit))
        .with_state(state)
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
