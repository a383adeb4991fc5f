//! Job matching: how well a graduate's skills cover each job's requirements.
//!
//! Skill names are compared case-insensitively. A job's match percentage is
//! the share of its required skills the graduate has. Missing skills are
//! paired with certifications whose tags teach them.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::catalog::{CertificationRow, JobRow};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobMatch {
    pub job_id: Uuid,
    pub title: String,
    pub match_percentage: f64,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    /// Certification titles covering at least one missing skill.
    pub suggested_certifications: Vec<String>,
}

/// Jobs sharing at least one skill with `skills`, best match first,
/// ties by title.
pub fn match_jobs(
    skills: &[String],
    jobs: &[JobRow],
    certifications: &[CertificationRow],
) -> Vec<JobMatch> {
    let have: HashSet<String> = skills.iter().map(|s| normalize(s)).collect();

    let mut matches: Vec<JobMatch> = jobs
        .iter()
        .filter(|job| !job.required_skills.is_empty())
        .filter_map(|job| {
            let (matched, missing): (Vec<String>, Vec<String>) = job
                .required_skills
                .iter()
                .cloned()
                .partition(|s| have.contains(&normalize(s)));
            if matched.is_empty() {
                return None;
            }
            let match_percentage =
                100.0 * matched.len() as f64 / job.required_skills.len() as f64;
            Some(JobMatch {
                job_id: job.id,
                title: job.title.clone(),
                match_percentage,
                suggested_certifications: certifications_for(&missing, certifications),
                matched_skills: matched,
                missing_skills: missing,
            })
        })
        .collect();

    matches.sort_by(|a, b| {
        b.match_percentage
            .total_cmp(&a.match_percentage)
            .then_with(|| a.title.cmp(&b.title))
    });
    matches
}

fn certifications_for(missing: &[String], certifications: &[CertificationRow]) -> Vec<String> {
    let wanted: HashSet<String> = missing.iter().map(|s| normalize(s)).collect();
    certifications
        .iter()
        .filter(|c| c.skill_tags.iter().any(|t| wanted.contains(&normalize(t))))
        .map(|c| c.title.clone())
        .collect()
}

/// Trims, lowercases and strips duplicate skills, keeping first spelling.
pub fn normalize_skill_list(skills: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    skills
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(normalize(s)))
        .map(String::from)
        .collect()
}

fn normalize(skill: &str) -> String {
    skill.trim().to_lowercase()
}
