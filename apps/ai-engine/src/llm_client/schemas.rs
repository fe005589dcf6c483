//! Response JSON schemas attached to schema-constrained generation calls.
//!
//! Hand-written to match the serde models in `analysis::models` exactly.
//! The backend treats these as a constraint, not a guarantee — the resolver
//! still validates everything on the way back in.

use serde_json::{json, Value};

/// Schema for `analysis::models::AnalysisResult`.
pub fn analysis_result_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "candidate_name": { "type": "string" },
            "overall_score": { "type": "integer", "minimum": 0, "maximum": 100 },
            "overall_summary": { "type": "string" },
            "writing_score": { "type": "integer", "minimum": 0, "maximum": 100 },
            "writing_detail": { "type": "string" },
            "ats_score": { "type": "integer", "minimum": 0, "maximum": 100 },
            "ats_detail": { "type": "string" },
            "skill_score": { "type": "integer", "minimum": 0, "maximum": 100 },
            "skill_detail": { "type": "string" },
            "experience_score": { "type": "integer", "minimum": 0, "maximum": 100 },
            "experience_detail": { "type": "string" },
            "keyword_score": { "type": "integer", "minimum": 0, "maximum": 100 },
            "keyword_detail": { "type": "string" },
            "key_strengths": {
                "type": "array",
                "items": { "type": "string" }
            },
            "missing_skills": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "gap": { "type": "string" },
                        "action": {
                            "type": "string",
                            "description": "Concrete, educational remediation step for this gap"
                        }
                    },
                    "required": ["gap", "action"]
                }
            }
        },
        "required": [
            "candidate_name", "overall_score", "overall_summary",
            "writing_score", "writing_detail", "ats_score", "ats_detail",
            "skill_score", "skill_detail", "experience_score", "experience_detail",
            "keyword_score", "keyword_detail", "key_strengths", "missing_skills"
        ]
    })
}

/// Schema for `analysis::models::ImprovedCvResult`.
pub fn improved_cv_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "full_name": { "type": "string" },
            "professional_summary": { "type": "string" },
            "contact_info": {
                "type": "object",
                "properties": {
                    "email": { "type": "string" },
                    "phone": { "type": "string" },
                    "location": { "type": "string" },
                    "linkedin": { "type": "string" }
                },
                "required": ["email", "phone", "location"]
            },
            "hard_skills": {
                "type": "array",
                "items": { "type": "string" }
            },
            "soft_skills": {
                "type": "array",
                "items": { "type": "string" }
            },
            "work_experience": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "title": { "type": "string" },
                        "company": { "type": "string" },
                        "dates": { "type": "string" },
                        "achievements": {
                            "type": "array",
                            "items": { "type": "string" }
                        }
                    },
                    "required": ["title", "company", "dates", "achievements"]
                }
            },
            "education": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "institution": { "type": "string" },
                        "degree": { "type": "string" },
                        "year": { "type": "string" }
                    },
                    "required": ["institution", "degree", "year"]
                }
            },
            "projects": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string" },
                        "description": { "type": "string" },
                        "highlights": {
                            "type": "array",
                            "items": { "type": "string" }
                        }
                    },
                    "required": ["name", "description", "highlights"]
                }
            }
        },
        "required": [
            "full_name", "professional_summary", "contact_info",
            "hard_skills", "soft_skills", "work_experience",
            "education", "projects"
        ]
    })
}
