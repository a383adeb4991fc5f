use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::quiz::scoring::QuizResult;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuizResultRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub subject: String,
    pub score: i32,
    pub total_questions: i32,
    pub answers: Value,
    pub created_at: DateTime<Utc>,
}

impl From<QuizResultRow> for QuizResult {
    fn from(row: QuizResultRow) -> Self {
        let answers: BTreeMap<u32, String> =
            serde_json::from_value(row.answers).unwrap_or_default();
        QuizResult::new(
            row.subject,
            row.score.max(0) as u32,
            row.total_questions.max(0) as u32,
            answers,
            row.created_at,
        )
    }
}
