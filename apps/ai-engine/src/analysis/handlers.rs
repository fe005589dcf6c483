//! Axum route handlers for the analyze and customize endpoints.
//!
//! Request bodies carry already-extracted CV text: PDF/DOCX parsing and
//! job-URL scraping live in upstream collaborators. Input validation happens
//! here, before any prompt is built or generation attempted.

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::analysis::engine::{analyze, customize, AnalyzeOutcome, CustomizeMode, MIN_CV_CHARS};
use crate::analysis::models::ImprovedCvResult;
use crate::analysis::prompts::AUTO_DETECT_ROLE;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub cv_text: String,
    #[serde(default)]
    pub job_description: Option<String>,
    #[serde(default)]
    pub current_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CustomizeRequest {
    pub cv_text: String,
    pub mode: String,
    #[serde(default)]
    pub job_description: Option<String>,
    #[serde(default)]
    pub analysis_context: Option<String>,
    #[serde(default)]
    pub current_date: Option<String>,
}

fn validate_cv_text(cv_text: &str) -> Result<&str, AppError> {
    let trimmed = cv_text.trim();
    if trimmed.chars().count() < MIN_CV_CHARS {
        return Err(AppError::Validation(
            "CV text is too short or empty.".to_string(),
        ));
    }
    Ok(trimmed)
}

/// POST /api/analyze
///
/// An empty or missing job description switches the evaluation into
/// auto-role-inference mode. Generation failures never surface here:
/// both branches degrade to fallback objects.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeOutcome>, AppError> {
    let cv_text = validate_cv_text(&request.cv_text)?;

    let job_desc = match request.job_description.as_deref().map(str::trim) {
        Some(jd) if !jd.is_empty() => jd.to_string(),
        _ => AUTO_DETECT_ROLE.to_string(),
    };

    let outcome = analyze(
        &state.llm,
        cv_text,
        &job_desc,
        request.current_date.as_deref(),
    )
    .await;

    Ok(Json(outcome))
}

/// POST /api/customize
///
/// Mode is required: `job_desc` tailors the rewrite to a supplied job
/// description, `analysis` tailors it to prior analysis feedback.
pub async fn handle_customize(
    State(state): State<AppState>,
    Json(request): Json<CustomizeRequest>,
) -> Result<Json<ImprovedCvResult>, AppError> {
    let cv_text = validate_cv_text(&request.cv_text)?;
    let mode = CustomizeMode::parse(&request.mode)?;

    let context = match mode {
        CustomizeMode::JobDesc => {
            let jd = request
                .job_description
                .as_deref()
                .map(str::trim)
                .unwrap_or("");
            if jd.is_empty() {
                return Err(AppError::Validation(
                    "Mode 'job_desc' requires a job_description.".to_string(),
                ));
            }
            jd.to_string()
        }
        CustomizeMode::Analysis => request
            .analysis_context
            .as_deref()
            .unwrap_or("")
            .trim()
            .to_string(),
    };

    let improved = customize(
        &state.llm,
        cv_text,
        mode,
        &context,
        request.current_date.as_deref(),
    )
    .await?;

    Ok(Json(improved))
}
