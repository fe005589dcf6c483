//! Result schemas for the analyze and customize flows.
//!
//! Every field carries a serde default so partial model output still
//! deserializes to empty strings / empty lists / zero scores, never null.
//! Both top-level results are created fresh per request, immutable once
//! returned, and never persisted.

use serde::{Deserialize, Serialize};

/// Schema-valid safe-default substituted when generation or parsing fails
/// irrecoverably. Masks the failure from the HTTP layer: the request still
/// succeeds with degraded content, and the note lands in a visible text field.
pub trait SafeFallback {
    fn fallback(note: &str) -> Self;
}

// ────────────────────────────────────────────────────────────────────────────
// Analysis
// ────────────────────────────────────────────────────────────────────────────

/// One identified gap, paired with a concrete remediation step.
/// `action` defaults to empty when the model omits it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillGap {
    pub gap: String,
    pub action: String,
}

/// Six-criterion evaluation of a CV against a job description (or an
/// auto-inferred role). Scores are integers in [0,100].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisResult {
    pub candidate_name: String,

    /// Derived, never trusted from the model — see `finalize_scores`.
    pub overall_score: u8,
    pub overall_summary: String,

    pub writing_score: u8,
    pub writing_detail: String,

    pub ats_score: u8,
    pub ats_detail: String,

    pub skill_score: u8,
    pub skill_detail: String,

    pub experience_score: u8,
    pub experience_detail: String,

    pub keyword_score: u8,
    pub keyword_detail: String,

    pub key_strengths: Vec<String>,
    pub missing_skills: Vec<SkillGap>,
}

impl AnalysisResult {
    /// Clamps sub-scores to 100 and recomputes `overall_score` as the
    /// rounded mean of the writing/ATS/skill/experience sub-scores,
    /// overwriting whatever the model emitted for that field.
    pub fn finalize_scores(&mut self) {
        self.writing_score = self.writing_score.min(100);
        self.ats_score = self.ats_score.min(100);
        self.skill_score = self.skill_score.min(100);
        self.experience_score = self.experience_score.min(100);
        self.keyword_score = self.keyword_score.min(100);

        let sum = self.writing_score as u16
            + self.ats_score as u16
            + self.skill_score as u16
            + self.experience_score as u16;
        self.overall_score = (sum as f64 / 4.0).round() as u8;
    }
}

impl SafeFallback for AnalysisResult {
    fn fallback(note: &str) -> Self {
        AnalysisResult {
            candidate_name: "Unknown".to_string(),
            overall_summary: format!("Error: {note}"),
            ..Default::default()
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Improved / extracted CV
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactInfo {
    pub email: String,
    pub phone: String,
    pub location: String,
    pub linkedin: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkExperience {
    pub title: String,
    pub company: String,
    pub dates: String,
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Education {
    pub institution: String,
    pub degree: String,
    pub year: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub name: String,
    pub description: String,
    pub highlights: Vec<String>,
}

/// Structured CV, produced either by verbatim extraction (analyze flow) or
/// by the truthful rewrite (customize flow). Lists preserve source order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImprovedCvResult {
    pub full_name: String,
    pub professional_summary: String,
    pub contact_info: ContactInfo,
    pub hard_skills: Vec<String>,
    pub soft_skills: Vec<String>,
    pub work_experience: Vec<WorkExperience>,
    pub education: Vec<Education>,
    pub projects: Vec<Project>,
}

impl SafeFallback for ImprovedCvResult {
    fn fallback(note: &str) -> Self {
        ImprovedCvResult {
            full_name: "Candidate".to_string(),
            professional_summary: format!("Error: {note}"),
            ..Default::default()
        }
    }
}
