use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::quiz::aggregate::SubjectScore;
use crate::quiz::bank::QuestionBank;

const EMBEDDED_PROGRAMS: &str = include_str!("../../data/degree_programs.json");

/// How many subjects a recommendation covers at most.
pub const MAX_RECOMMENDED_SUBJECTS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DegreeProgram {
    pub title: String,
    pub description: String,
    pub colleges: Vec<String>,
    pub domains: Vec<String>,
}

/// Degree programs keyed by subject. Read-only after load.
#[derive(Debug, Clone, Default)]
pub struct DegreeCatalog {
    programs: HashMap<String, Vec<DegreeProgram>>,
}

impl DegreeCatalog {
    pub fn new(programs: HashMap<String, Vec<DegreeProgram>>) -> Self {
        Self { programs }
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let programs = serde_json::from_str(raw).context("degree programs are not valid JSON")?;
        Ok(Self::new(programs))
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::from_json(&super::read_table(path, EMBEDDED_PROGRAMS)?)
    }

    pub fn embedded() -> Result<Self> {
        Self::load(None)
    }

    pub fn programs_for(&self, subject: &str) -> &[DegreeProgram] {
        self.programs.get(subject).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Catalog keys with no matching subject in `bank`; they can never be recommended.
    pub fn orphaned_subjects(&self, bank: &QuestionBank) -> Vec<&str> {
        let mut orphans: Vec<&str> = self
            .programs
            .keys()
            .map(String::as_str)
            .filter(|s| !bank.contains(s))
            .collect();
        orphans.sort_unstable();
        orphans
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub subject: String,
    pub score: f64,
    pub programs: Vec<DegreeProgram>,
}

/// Top subjects by average score with their degree programs.
///
/// Subjects scoring 0 are skipped. Ties keep the order of `scores`, which is
/// the subject declaration order. An empty result means no quiz was taken yet.
pub fn recommend(scores: &[SubjectScore], catalog: &DegreeCatalog) -> Vec<Recommendation> {
    let mut ranked: Vec<&SubjectScore> = scores.iter().filter(|s| s.score > 0.0).collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));

    ranked
        .into_iter()
        .take(MAX_RECOMMENDED_SUBJECTS)
        .map(|s| Recommendation {
            subject: s.subject.clone(),
            score: s.score,
            programs: catalog.programs_for(&s.subject).to_vec(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(subject: &str, score: f64) -> SubjectScore {
        SubjectScore {
            subject: subject.to_string(),
            score,
            attempts: usize::from(score > 0.0),
        }
    }

    fn subjects(recs: &[Recommendation]) -> Vec<&str> {
        recs.iter().map(|r| r.subject.as_str()).collect()
    }

    #[test]
    fn test_orders_by_score_and_drops_zero() {
        let catalog = DegreeCatalog::embedded().unwrap();
        let scores = vec![
            score("Physics", 90.0),
            score("Biology", 70.0),
            score("Chemistry", 0.0),
        ];
        let recs = recommend(&scores, &catalog);
        assert_eq!(subjects(&recs), vec!["Physics", "Biology"]);
        assert_eq!(recs[0].score, 90.0);
        assert_eq!(recs[0].programs, catalog.programs_for("Physics"));
        assert_eq!(recs[0].programs[0].title, "Aerospace Engineering");
    }

    #[test]
    fn test_takes_top_three_with_stable_ties() {
        let catalog = DegreeCatalog::embedded().unwrap();
        let scores = vec![
            score("Physics", 60.0),
            score("Chemistry", 80.0),
            score("Biology", 60.0),
            score("Mathematics", 60.0),
            score("Computer Science", 40.0),
        ];
        let recs = recommend(&scores, &catalog);
        assert_eq!(subjects(&recs), vec!["Chemistry", "Physics", "Biology"]);
    }

    #[test]
    fn test_no_scores_means_no_recommendations() {
        let catalog = DegreeCatalog::embedded().unwrap();
        let scores = vec![score("Physics", 0.0), score("Biology", 0.0)];
        assert!(recommend(&scores, &catalog).is_empty());
        assert!(recommend(&[], &catalog).is_empty());
    }

    #[test]
    fn test_subject_without_programs_is_still_listed() {
        let catalog = DegreeCatalog::default();
        let recs = recommend(&[score("Geography", 50.0)], &catalog);
        assert_eq!(recs.len(), 1);
        assert!(recs[0].programs.is_empty());
    }

    #[test]
    fn test_embedded_catalog_covers_every_subject() {
        let catalog = DegreeCatalog::embedded().unwrap();
        let bank = QuestionBank::embedded().unwrap();
        assert!(catalog.orphaned_subjects(&bank).is_empty());
        for subject in bank.subjects() {
            assert_eq!(catalog.programs_for(subject).len(), 3, "{subject}");
        }
    }
}
