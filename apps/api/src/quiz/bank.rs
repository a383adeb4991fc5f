use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const EMBEDDED_BANK: &str = include_str!("../../data/question_bank.json");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: u32,
    /// Filled in from the enclosing subject block when the bank is loaded.
    #[serde(default)]
    pub subject: String,
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_answer: String,
}

/// A question as shown to a quiz taker: no correct answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionView {
    pub id: u32,
    pub prompt: String,
    pub options: Vec<String>,
}

impl From<&Question> for QuestionView {
    fn from(q: &Question) -> Self {
        Self {
            id: q.id,
            prompt: q.prompt.clone(),
            options: q.options.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SubjectBlock {
    subject: String,
    questions: Vec<Question>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BankError {
    #[error("question bank declares no subjects")]
    Empty,
    #[error("subject name cannot be blank")]
    BlankSubject,
    #[error("subject '{0}' is declared more than once")]
    DuplicateSubject(String),
    #[error("subject '{0}' has no questions")]
    NoQuestions(String),
    #[error("question {id} in '{subject}' has no options")]
    NoOptions { subject: String, id: u32 },
    #[error("question {id} in '{subject}': correct answer '{answer}' is not one of its options")]
    AnswerNotInOptions {
        subject: String,
        id: u32,
        answer: String,
    },
    #[error("question id {id} appears more than once in '{subject}'")]
    DuplicateQuestionId { subject: String, id: u32 },
}

/// Static per-subject question lists, in declaration order.
#[derive(Debug, Clone)]
pub struct QuestionBank {
    subjects: Vec<(String, Arc<[Question]>)>,
}

impl QuestionBank {
    /// Builds a bank from `(subject, questions)` pairs and validates it.
    pub fn new(subjects: Vec<(String, Vec<Question>)>) -> Result<Self, BankError> {
        let subjects = subjects
            .into_iter()
            .map(|(subject, questions)| {
                let questions: Vec<Question> = questions
                    .into_iter()
                    .map(|q| Question {
                        subject: subject.clone(),
                        ..q
                    })
                    .collect();
                (subject, Arc::from(questions))
            })
            .collect();
        let bank = Self { subjects };
        bank.validate()?;
        Ok(bank)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let blocks: Vec<SubjectBlock> =
            serde_json::from_str(raw).context("question bank is not valid JSON")?;
        let bank = Self::new(
            blocks
                .into_iter()
                .map(|b| (b.subject, b.questions))
                .collect(),
        )?;
        Ok(bank)
    }

    /// Loads the bank from `path`, or the embedded default when `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::from_json(&super::read_table(path, EMBEDDED_BANK)?)
    }

    pub fn embedded() -> Result<Self> {
        Self::load(None)
    }

    /// Every question must have options containing its correct answer,
    /// with ids unique inside a subject.
    pub fn validate(&self) -> Result<(), BankError> {
        if self.subjects.is_empty() {
            return Err(BankError::Empty);
        }
        let mut seen_subjects = HashSet::new();
        for (subject, questions) in &self.subjects {
            if subject.trim().is_empty() {
                return Err(BankError::BlankSubject);
            }
            if !seen_subjects.insert(subject.as_str()) {
                return Err(BankError::DuplicateSubject(subject.clone()));
            }
            if questions.is_empty() {
                return Err(BankError::NoQuestions(subject.clone()));
            }
            let mut seen_ids = HashSet::new();
            for q in questions.iter() {
                if !seen_ids.insert(q.id) {
                    return Err(BankError::DuplicateQuestionId {
                        subject: subject.clone(),
                        id: q.id,
                    });
                }
                if q.options.is_empty() {
                    return Err(BankError::NoOptions {
                        subject: subject.clone(),
                        id: q.id,
                    });
                }
                if !q.options.contains(&q.correct_answer) {
                    return Err(BankError::AnswerNotInOptions {
                        subject: subject.clone(),
                        id: q.id,
                        answer: q.correct_answer.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Subject names in declaration order.
    pub fn subjects(&self) -> Vec<&str> {
        self.subjects.iter().map(|(s, _)| s.as_str()).collect()
    }

    pub fn contains(&self, subject: &str) -> bool {
        self.questions(subject).is_some()
    }

    pub fn questions(&self, subject: &str) -> Option<&Arc<[Question]>> {
        self.subjects
            .iter()
            .find(|(s, _)| s == subject)
            .map(|(_, qs)| qs)
    }
}

#[cfg(test)]
pub(crate) fn question(id: u32, prompt: &str, options: &[&str], correct: &str) -> Question {
    Question {
        id,
        subject: String::new(),
        prompt: prompt.to_string(),
        options: options.iter().map(|o| o.to_string()).collect(),
        correct_answer: correct.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_embedded_bank_is_valid() {
        let bank = QuestionBank::embedded().unwrap();
        assert_eq!(
            bank.subjects(),
            vec!["Physics", "Chemistry", "Biology", "Mathematics", "Computer Science"]
        );
        for subject in bank.subjects() {
            let questions = bank.questions(subject).unwrap();
            assert_eq!(questions.len(), 5, "{subject}");
            assert!(questions.iter().all(|q| q.subject == subject));
            assert!(questions.iter().all(|q| q.options.len() == 4));
        }
    }

    #[test]
    fn test_unknown_subject() {
        let bank = QuestionBank::embedded().unwrap();
        assert!(!bank.contains("Astrology"));
        assert!(bank.questions("physics").is_none());
    }

    #[test]
    fn test_rejects_answer_missing_from_options() {
        let err = QuestionBank::new(vec![(
            "Physics".into(),
            vec![question(1, "Unit of force?", &["Joule", "Watt"], "Newton")],
        )])
        .unwrap_err();
        assert!(matches!(err, BankError::AnswerNotInOptions { id: 1, .. }));
    }

    #[test]
    fn test_rejects_empty_options() {
        let err = QuestionBank::new(vec![(
            "Physics".into(),
            vec![question(1, "Unit of force?", &[], "Newton")],
        )])
        .unwrap_err();
        assert!(matches!(err, BankError::NoOptions { .. }));
    }

    #[test]
    fn test_rejects_duplicate_ids_and_subjects() {
        let q = question(1, "2+2?", &["4", "5"], "4");
        let err = QuestionBank::new(vec![("Maths".into(), vec![q.clone(), q.clone()])]).unwrap_err();
        assert_eq!(
            err,
            BankError::DuplicateQuestionId {
                subject: "Maths".into(),
                id: 1
            }
        );

        let err = QuestionBank::new(vec![
            ("Maths".into(), vec![q.clone()]),
            ("Maths".into(), vec![q]),
        ])
        .unwrap_err();
        assert_eq!(err, BankError::DuplicateSubject("Maths".into()));
    }

    #[test]
    fn test_rejects_empty_bank_and_empty_subject() {
        assert_eq!(QuestionBank::new(vec![]).unwrap_err(), BankError::Empty);
        assert_eq!(
            QuestionBank::new(vec![("Art".into(), vec![])]).unwrap_err(),
            BankError::NoQuestions("Art".into())
        );
    }

    #[test]
    fn test_load_from_file_override() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"subject": "Geography", "questions": [
                {{"id": 7, "prompt": "Capital of France?", "options": ["Paris", "Rome"], "correct_answer": "Paris"}}
            ]}}]"#
        )
        .unwrap();

        let bank = QuestionBank::load(Some(file.path())).unwrap();
        assert_eq!(bank.subjects(), vec!["Geography"]);
        assert_eq!(bank.questions("Geography").unwrap()[0].id, 7);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(QuestionBank::from_json("{not json").is_err());
    }

    #[test]
    fn test_question_view_hides_answer() {
        let q = question(3, "pH of water?", &["7", "1"], "7");
        let json = serde_json::to_value(QuestionView::from(&q)).unwrap();
        assert!(json.get("correct_answer").is_none());
        assert_eq!(json["options"][0], "7");
    }
}
