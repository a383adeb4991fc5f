use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::quiz::session::QuizSession;

/// Outcome of one completed quiz attempt. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizResult {
    pub subject: String,
    pub correct_count: u32,
    pub total_count: u32,
    /// 100 * correct_count / total_count
    pub percentage: f64,
    pub timestamp: DateTime<Utc>,
    /// Question id → chosen option, as submitted.
    #[serde(default)]
    pub answers: BTreeMap<u32, String>,
}

impl QuizResult {
    /// `correct_count` is capped at `total_count`.
    pub fn new(
        subject: impl Into<String>,
        correct_count: u32,
        total_count: u32,
        answers: BTreeMap<u32, String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let correct_count = correct_count.min(total_count);
        Self {
            subject: subject.into(),
            correct_count,
            total_count,
            percentage: percentage(correct_count, total_count),
            timestamp,
            answers,
        }
    }
}

pub fn percentage(correct: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    100.0 * f64::from(correct) / f64::from(total)
}

/// Scores a session against its questions, stamped with the current time.
pub fn score(session: &QuizSession) -> QuizResult {
    score_at(session, Utc::now())
}

/// Unanswered questions count as incorrect.
pub fn score_at(session: &QuizSession, now: DateTime<Utc>) -> QuizResult {
    let answers = session.answers();
    let correct = session
        .questions()
        .iter()
        .filter(|q| answers.get(&q.id) == Some(&q.correct_answer))
        .count();
    let total = session.questions().len();

    QuizResult::new(
        session.subject(),
        correct as u32,
        total as u32,
        answers.iter().map(|(id, a)| (*id, a.clone())).collect(),
        now,
    )
}
