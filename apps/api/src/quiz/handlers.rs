//! Axum route handlers for the Quiz API.

use std::collections::BTreeMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::quiz::aggregate::{overall_stats, subject_scores, OverallStats, SubjectScore};
use crate::quiz::bank::QuestionView;
use crate::quiz::recommend::{recommend, Recommendation};
use crate::quiz::scoring::QuizResult;
use crate::quiz::session::{AnswerOutcome, QuizError, QuizView};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct SubjectsResponse {
    pub subjects: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct QuestionsResponse {
    pub subject: String,
    pub questions: Vec<QuestionView>,
}

#[derive(Debug, Deserialize)]
pub struct StartQuizRequest {
    pub subject: String,
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub choice: String,
}

#[derive(Debug, Deserialize)]
pub struct SubmitResultRequest {
    pub subject: String,
    pub score: u32,
    pub total_questions: u32,
    #[serde(default)]
    pub answers: BTreeMap<u32, String>,
}

#[derive(Debug, Serialize)]
pub struct ResultsResponse {
    pub results: Vec<QuizResult>,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub overall: OverallStats,
    pub subjects: Vec<SubjectScore>,
}

#[derive(Debug, Serialize)]
pub struct RecommendationsResponse {
    pub recommendations: Vec<Recommendation>,
    /// Set when there is nothing to recommend yet.
    pub message: Option<String>,
}

/// Largest count the result store can hold.
const MAX_TOTAL_QUESTIONS: u32 = i32::MAX as u32;

const TAKE_A_QUIZ: &str = "Take some quizzes to get personalized recommendations!";

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/quiz/subjects
pub async fn handle_list_subjects(State(state): State<AppState>) -> Json<SubjectsResponse> {
    Json(SubjectsResponse {
        subjects: state
            .question_bank
            .subjects()
            .into_iter()
            .map(String::from)
            .collect(),
    })
}

/// GET /api/v1/quiz/subjects/:subject
pub async fn handle_get_questions(
    State(state): State<AppState>,
    Path(subject): Path<String>,
) -> Result<Json<QuestionsResponse>, AppError> {
    let questions = state
        .question_bank
        .questions(&subject)
        .ok_or_else(|| QuizError::InvalidSubject(subject.clone()))?;
    Ok(Json(QuestionsResponse {
        questions: questions.iter().map(QuestionView::from).collect(),
        subject,
    }))
}

/// POST /api/v1/quiz/session
///
/// Starts (or restarts) the caller's quiz for a subject.
pub async fn handle_start_quiz(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<StartQuizRequest>,
) -> Result<Json<QuizView>, AppError> {
    let bank = &state.question_bank;
    let view = state
        .quiz_sessions
        .with_state(auth.id, |quiz| quiz.start(bank, &req.subject))?;
    info!("User {} started a {} quiz", auth.id, req.subject);
    Ok(Json(view))
}

/// GET /api/v1/quiz/session
pub async fn handle_get_quiz(State(state): State<AppState>, auth: AuthUser) -> Json<QuizView> {
    Json(state.quiz_sessions.with_state(auth.id, |quiz| quiz.view()))
}

/// POST /api/v1/quiz/session/answer
///
/// Records the answer; the final answer completes the quiz and appends the
/// result to the caller's history. If the append fails the final answer is
/// withdrawn so it can be submitted again.
pub async fn handle_answer(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<AnswerRequest>,
) -> Result<Json<QuizView>, AppError> {
    let (outcome, view) = state.quiz_sessions.with_state(auth.id, |quiz| {
        let outcome = quiz.answer(req.choice)?;
        Ok::<_, QuizError>((outcome, quiz.view()))
    })?;

    if let AnswerOutcome::Completed(result) = outcome {
        if let Err(e) = state.results.append_result(auth.id, &result).await {
            let reopened = state
                .quiz_sessions
                .with_state(auth.id, |quiz| quiz.reopen(&result));
            warn!(
                "Could not record {} result for user {} (reopened: {reopened})",
                result.subject, auth.id
            );
            return Err(e);
        }
        info!(
            "User {} completed {} with {:.1}%",
            auth.id, result.subject, result.percentage
        );
    }
    Ok(Json(view))
}

/// GET /api/v1/quiz/results
pub async fn handle_list_results(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ResultsResponse>, AppError> {
    let results = state.results.history(auth.id).await?;
    Ok(Json(ResultsResponse { results }))
}

/// POST /api/v1/quiz/results
///
/// Records an attempt scored elsewhere (e.g. an offline client).
pub async fn handle_submit_result(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<SubmitResultRequest>,
) -> Result<(StatusCode, Json<QuizResult>), AppError> {
    if !state.question_bank.contains(&req.subject) {
        return Err(QuizError::InvalidSubject(req.subject).into());
    }
    if req.total_questions == 0 {
        return Err(AppError::Validation(
            "total_questions must be positive".to_string(),
        ));
    }
    if req.total_questions > MAX_TOTAL_QUESTIONS {
        return Err(AppError::Validation(format!(
            "total_questions cannot exceed {MAX_TOTAL_QUESTIONS}"
        )));
    }
    if req.score > req.total_questions {
        return Err(AppError::Validation(
            "score cannot exceed total_questions".to_string(),
        ));
    }

    let result = QuizResult::new(
        req.subject,
        req.score,
        req.total_questions,
        req.answers,
        Utc::now(),
    );
    state.results.append_result(auth.id, &result).await?;
    Ok((StatusCode::CREATED, Json(result)))
}

/// GET /api/v1/quiz/stats
pub async fn handle_stats(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<StatsResponse>, AppError> {
    let history = state.results.history(auth.id).await?;
    Ok(Json(StatsResponse {
        overall: overall_stats(&history),
        subjects: subject_scores(&history, &state.question_bank.subjects()),
    }))
}

/// GET /api/v1/quiz/recommendations
pub async fn handle_recommendations(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<RecommendationsResponse>, AppError> {
    let history = state.results.history(auth.id).await?;
    Ok(Json(recommendations_for(&state, &history)))
}

pub(crate) fn recommendations_for(state: &AppState, history: &[QuizResult]) -> RecommendationsResponse {
    let scores = subject_scores(history, &state.question_bank.subjects());
    let recommendations = recommend(&scores, &state.degree_catalog);
    let message = recommendations
        .is_empty()
        .then(|| TAKE_A_QUIZ.to_string());
    RecommendationsResponse {
        recommendations,
        message,
    }
}
