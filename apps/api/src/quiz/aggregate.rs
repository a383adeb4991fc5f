use serde::Serialize;

use crate::quiz::scoring::QuizResult;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OverallStats {
    pub quizzes_taken: usize,
    /// Mean percentage over every result; 0 when there are none.
    pub average_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectScore {
    pub subject: String,
    /// Mean percentage for the subject; 0 when it was never attempted.
    pub score: f64,
    pub attempts: usize,
}

pub fn overall_stats(history: &[QuizResult]) -> OverallStats {
    OverallStats {
        quizzes_taken: history.len(),
        average_percentage: mean(history.iter().map(|r| r.percentage)),
    }
}

/// One entry per subject in `subjects`, in the same order, attempted or not.
pub fn subject_scores<S: AsRef<str>>(history: &[QuizResult], subjects: &[S]) -> Vec<SubjectScore> {
    subjects
        .iter()
        .map(|subject| {
            let subject = subject.as_ref();
            let percentages: Vec<f64> = history
                .iter()
                .filter(|r| r.subject == subject)
                .map(|r| r.percentage)
                .collect();
            SubjectScore {
                subject: subject.to_string(),
                score: mean(percentages.iter().copied()),
                attempts: percentages.len(),
            }
        })
        .collect()
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}
