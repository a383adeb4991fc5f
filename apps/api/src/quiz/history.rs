//! Result history boundary. The quiz core only needs `append_result` and
//! `history`; where the log lives is decided at startup.
//!
//! `AppState` holds an `Arc<dyn ResultLog>`, swapped via `HISTORY_BACKEND`.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::quiz::QuizResultRow;
use crate::quiz::scoring::QuizResult;

/// Append-only per-user log of completed quiz results.
#[async_trait]
pub trait ResultLog: Send + Sync {
    async fn append_result(&self, user_id: Uuid, result: &QuizResult) -> Result<(), AppError>;

    /// All results for the user, oldest first.
    async fn history(&self, user_id: Uuid) -> Result<Vec<QuizResult>, AppError>;
}

// ────────────────────────────────────────────────────────────────────────────
// PostgreSQL-backed log (default)
// ────────────────────────────────────────────────────────────────────────────

fn column_count(value: u32, field: &str) -> Result<i32, AppError> {
    i32::try_from(value).map_err(|_| AppError::Validation(format!("{field} is too large")))
}

pub struct PgResultLog {
    pool: PgPool,
}

impl PgResultLog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResultLog for PgResultLog {
    async fn append_result(&self, user_id: Uuid, result: &QuizResult) -> Result<(), AppError> {
        let answers = serde_json::to_value(&result.answers)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to encode answers: {e}")))?;
        let score = column_count(result.correct_count, "score")?;
        let total_questions = column_count(result.total_count, "total_questions")?;

        sqlx::query(
            r#"
            INSERT INTO quiz_results (user_id, subject, score, total_questions, answers, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(user_id)
        .bind(&result.subject)
        .bind(score)
        .bind(total_questions)
        .bind(answers)
        .bind(result.timestamp)
        .execute(&self.pool)
        .await?;

        info!(
            "Recorded {} quiz result {}/{} for user {user_id}",
            result.subject, result.correct_count, result.total_count
        );
        Ok(())
    }

    async fn history(&self, user_id: Uuid) -> Result<Vec<QuizResult>, AppError> {
        let rows = sqlx::query_as::<_, QuizResultRow>(
            "SELECT * FROM quiz_results WHERE user_id = $1 ORDER BY created_at ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(QuizResult::from).collect())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// In-memory log (process lifetime only)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryResultLog {
    results: RwLock<HashMap<Uuid, Vec<QuizResult>>>,
}

impl InMemoryResultLog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResultLog for InMemoryResultLog {
    async fn append_result(&self, user_id: Uuid, result: &QuizResult) -> Result<(), AppError> {
        self.results
            .write()
            .entry(user_id)
            .or_default()
            .push(result.clone());
        Ok(())
    }

    async fn history(&self, user_id: Uuid) -> Result<Vec<QuizResult>, AppError> {
        Ok(self
            .results
            .read()
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::Utc;

    use super::*;

    #[tokio::test]
    async fn test_in_memory_log_is_per_user_and_ordered() {
        let log = InMemoryResultLog::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        log.append_result(alice, &QuizResult::new("Physics", 5, 5, BTreeMap::new(), Utc::now()))
            .await
            .unwrap();
        log.append_result(alice, &QuizResult::new("Biology", 2, 5, BTreeMap::new(), Utc::now()))
            .await
            .unwrap();

        let history = log.history(alice).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].subject, "Physics");
        assert_eq!(history[1].subject, "Biology");
        assert!(log.history(bob).await.unwrap().is_empty());
    }

    #[test]
    fn test_column_count_rejects_values_beyond_integer_column() {
        assert_eq!(column_count(5, "score").unwrap(), 5);
        assert!(matches!(
            column_count(u32::MAX, "total_questions"),
            Err(AppError::Validation(_))
        ));
    }
}
