//! Quiz session state machine: `Idle → InProgress → Completed`.
//!
//! A session is append-only. Each answer is recorded against the current
//! question and the cursor moves forward; there is no way back. Answering the
//! last question scores the session from the answer map that already includes
//! that final answer.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::quiz::bank::{Question, QuestionBank, QuestionView};
use crate::quiz::scoring::{score_at, QuizResult};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QuizError {
    #[error("Unknown subject: {0}")]
    InvalidSubject(String),
    #[error("No quiz is in progress")]
    OutOfSequenceAnswer,
}

/// One attempt at a single subject's questions.
#[derive(Debug, Clone)]
pub struct QuizSession {
    subject: String,
    questions: Arc<[Question]>,
    current_index: usize,
    answers: HashMap<u32, String>,
}

impl QuizSession {
    fn new(subject: &str, questions: Arc<[Question]>) -> Self {
        Self {
            subject: subject.to_string(),
            questions,
            current_index: 0,
            answers: HashMap::new(),
        }
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn answers(&self) -> &HashMap<u32, String> {
        &self.answers
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_index)
    }

    /// Position of the current question as a percentage of the quiz, counting it as reached.
    pub fn progress_percent(&self) -> f64 {
        if self.questions.is_empty() {
            return 0.0;
        }
        100.0 * (self.current_index + 1) as f64 / self.questions.len() as f64
    }
}

/// What an accepted answer did to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum AnswerOutcome {
    Advanced { next_index: usize },
    Completed(QuizResult),
}

#[derive(Debug, Clone, Default)]
pub enum QuizState {
    #[default]
    Idle,
    InProgress(QuizSession),
    Completed {
        session: QuizSession,
        result: QuizResult,
    },
}

impl QuizState {
    /// Starts a fresh session for `subject`, discarding whatever was there before.
    /// An unknown subject leaves the state untouched.
    pub fn start(&mut self, bank: &QuestionBank, subject: &str) -> Result<QuizView, QuizError> {
        let questions = bank
            .questions(subject)
            .ok_or_else(|| QuizError::InvalidSubject(subject.to_string()))?;
        *self = QuizState::InProgress(QuizSession::new(subject, Arc::clone(questions)));
        Ok(self.view())
    }

    pub fn answer(&mut self, choice: impl Into<String>) -> Result<AnswerOutcome, QuizError> {
        self.answer_at(choice, Utc::now())
    }

    /// Records `choice` for the current question. Outside `InProgress` the
    /// call is rejected and the state is left as it was.
    pub fn answer_at(
        &mut self,
        choice: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<AnswerOutcome, QuizError> {
        let mut session = match std::mem::take(self) {
            QuizState::InProgress(session) => session,
            other => {
                *self = other;
                return Err(QuizError::OutOfSequenceAnswer);
            }
        };

        let Some(question_id) = session.current_question().map(|q| q.id) else {
            *self = QuizState::InProgress(session);
            return Err(QuizError::OutOfSequenceAnswer);
        };
        session.answers.insert(question_id, choice.into());

        if session.current_index + 1 >= session.questions.len() {
            let result = score_at(&session, now);
            *self = QuizState::Completed {
                session,
                result: result.clone(),
            };
            Ok(AnswerOutcome::Completed(result))
        } else {
            session.current_index += 1;
            let next_index = session.current_index;
            *self = QuizState::InProgress(session);
            Ok(AnswerOutcome::Advanced { next_index })
        }
    }

    /// Withdraws the final answer of a completed session whose `result` could
    /// not be recorded, putting the session back on its last question.
    /// Does nothing unless the slot still holds exactly that result.
    pub fn reopen(&mut self, result: &QuizResult) -> bool {
        match std::mem::take(self) {
            QuizState::Completed {
                mut session,
                result: completed,
            } if completed == *result => {
                if let Some(id) = session.current_question().map(|q| q.id) {
                    session.answers.remove(&id);
                }
                *self = QuizState::InProgress(session);
                true
            }
            other => {
                *self = other;
                false
            }
        }
    }

    pub fn session(&self) -> Option<&QuizSession> {
        match self {
            QuizState::Idle => None,
            QuizState::InProgress(session) => Some(session),
            QuizState::Completed { session, .. } => Some(session),
        }
    }

    pub fn view(&self) -> QuizView {
        match self {
            QuizState::Idle => QuizView::Idle,
            QuizState::InProgress(session) => match session.current_question() {
                Some(question) => QuizView::InProgress {
                    subject: session.subject.clone(),
                    question: question.into(),
                    question_number: session.current_index + 1,
                    total_questions: session.questions.len(),
                    progress_percent: session.progress_percent(),
                },
                None => QuizView::Idle,
            },
            QuizState::Completed { result, .. } => QuizView::Completed {
                result: result.clone(),
            },
        }
    }
}

/// Presentation snapshot of a user's quiz.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QuizView {
    Idle,
    InProgress {
        subject: String,
        question: QuestionView,
        question_number: usize,
        total_questions: usize,
        progress_percent: f64,
    },
    Completed {
        result: QuizResult,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::bank::question;

    fn bank() -> QuestionBank {
        QuestionBank::embedded().unwrap()
    }

    fn correct_answers(bank: &QuestionBank, subject: &str) -> Vec<String> {
        bank.questions(subject)
            .unwrap()
            .iter()
            .map(|q| q.correct_answer.clone())
            .collect()
    }

    #[test]
    fn test_start_unknown_subject_leaves_state() {
        let bank = bank();
        let mut state = QuizState::Idle;
        let err = state.start(&bank, "Alchemy").unwrap_err();
        assert_eq!(err, QuizError::InvalidSubject("Alchemy".into()));
        assert!(matches!(state, QuizState::Idle));

        state.start(&bank, "Physics").unwrap();
        state.start(&bank, "Alchemy").unwrap_err();
        assert_eq!(state.session().unwrap().subject(), "Physics");
    }

    #[test]
    fn test_answer_when_idle_is_rejected() {
        let mut state = QuizState::Idle;
        assert_eq!(state.answer("Newton"), Err(QuizError::OutOfSequenceAnswer));
        assert!(matches!(state, QuizState::Idle));
    }

    #[test]
    fn test_mathematics_all_correct() {
        let bank = bank();
        let mut state = QuizState::Idle;
        state.start(&bank, "Mathematics").unwrap();

        let answers = correct_answers(&bank, "Mathematics");
        let mut outcome = None;
        for (i, a) in answers.iter().enumerate() {
            let o = state.answer(a.clone()).unwrap();
            if i < answers.len() - 1 {
                assert_eq!(o, AnswerOutcome::Advanced { next_index: i + 1 });
            }
            outcome = Some(o);
        }

        let Some(AnswerOutcome::Completed(result)) = outcome else {
            panic!("last answer should complete the quiz");
        };
        assert_eq!(result.subject, "Mathematics");
        assert_eq!(result.correct_count, 5);
        assert_eq!(result.total_count, 5);
        assert_eq!(result.percentage, 100.0);
    }

    #[test]
    fn test_physics_only_first_correct() {
        let bank = bank();
        let mut state = QuizState::Idle;
        state.start(&bank, "Physics").unwrap();

        state.answer("Newton").unwrap();
        for _ in 0..3 {
            state.answer("Pascal").unwrap();
        }
        let AnswerOutcome::Completed(result) = state.answer("Thermal Energy").unwrap() else {
            panic!("expected completion");
        };
        assert_eq!(result.correct_count, 1);
        assert_eq!(result.percentage, 20.0);
    }

    #[test]
    fn test_final_answer_counts_toward_score() {
        let bank = QuestionBank::new(vec![(
            "Solo".into(),
            vec![question(1, "Only question", &["yes", "no"], "yes")],
        )])
        .unwrap();
        let mut state = QuizState::Idle;
        state.start(&bank, "Solo").unwrap();
        let AnswerOutcome::Completed(result) = state.answer("yes").unwrap() else {
            panic!("single question quiz completes on first answer");
        };
        assert_eq!(result.correct_count, 1);
        assert_eq!(result.answers.get(&1).map(String::as_str), Some("yes"));
    }

    #[test]
    fn test_answer_after_completion_is_rejected() {
        let bank = bank();
        let mut state = QuizState::Idle;
        state.start(&bank, "Biology").unwrap();
        for a in correct_answers(&bank, "Biology") {
            state.answer(a).unwrap();
        }
        assert_eq!(state.answer("46"), Err(QuizError::OutOfSequenceAnswer));
        assert!(matches!(state, QuizState::Completed { .. }));
    }

    #[test]
    fn test_restart_discards_previous_answers() {
        let bank = bank();
        let mut state = QuizState::Idle;
        state.start(&bank, "Chemistry").unwrap();
        state.answer("6").unwrap();
        state.answer("7").unwrap();

        let view = state.start(&bank, "Chemistry").unwrap();
        assert!(matches!(view, QuizView::InProgress { question_number: 1, .. }));
        let session = state.session().unwrap();
        assert_eq!(session.current_index(), 0);
        assert!(session.answers().is_empty());
    }

    #[test]
    fn test_reopen_withdraws_final_answer() {
        let bank = bank();
        let mut state = QuizState::Idle;
        state.start(&bank, "Physics").unwrap();
        let answers = correct_answers(&bank, "Physics");
        let mut last = None;
        for a in &answers {
            last = Some(state.answer(a.clone()).unwrap());
        }
        let Some(AnswerOutcome::Completed(result)) = last else {
            panic!("expected completion");
        };

        assert!(state.reopen(&result));
        let session = state.session().unwrap();
        assert!(matches!(state, QuizState::InProgress(_)));
        assert_eq!(session.current_index(), answers.len() - 1);
        assert_eq!(session.answers().len(), answers.len() - 1);

        let AnswerOutcome::Completed(again) = state.answer(answers[answers.len() - 1].clone()).unwrap()
        else {
            panic!("resubmitted answer should complete the quiz");
        };
        assert_eq!(again.correct_count, 5);
    }

    #[test]
    fn test_reopen_ignores_other_states() {
        let bank = bank();
        let mut state = QuizState::Idle;
        let result = QuizResult::new("Physics", 1, 5, Default::default(), Utc::now());
        assert!(!state.reopen(&result));
        assert!(matches!(state, QuizState::Idle));

        state.start(&bank, "Physics").unwrap();
        assert!(!state.reopen(&result));
        assert!(matches!(state, QuizState::InProgress(_)));
    }

    #[test]
    fn test_cursor_and_answers_stay_bounded() {
        let bank = bank();
        let mut state = QuizState::Idle;
        state.start(&bank, "Computer Science").unwrap();
        for _ in 0..5 {
            let session = state.session().unwrap();
            assert!(session.current_index() <= session.questions().len());
            state.answer("Stack").unwrap();
        }
        let session = state.session().unwrap();
        assert_eq!(session.answers().len(), session.questions().len());
    }

    #[test]
    fn test_view_reports_progress_without_answers() {
        let bank = bank();
        let mut state = QuizState::Idle;
        assert_eq!(state.view(), QuizView::Idle);

        state.start(&bank, "Physics").unwrap();
        state.answer("Newton").unwrap();
        match state.view() {
            QuizView::InProgress {
                subject,
                question,
                question_number,
                total_questions,
                progress_percent,
            } => {
                assert_eq!(subject, "Physics");
                assert_eq!(question.id, 2);
                assert_eq!(question_number, 2);
                assert_eq!(total_questions, 5);
                assert!((progress_percent - 40.0).abs() < 1e-9);
            }
            other => panic!("unexpected view {other:?}"),
        }

        let json = serde_json::to_value(state.view()).unwrap();
        assert_eq!(json["status"], "in_progress");
        assert!(json["question"].get("correct_answer").is_none());
    }
}
