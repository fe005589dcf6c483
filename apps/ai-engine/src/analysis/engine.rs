//! Analyze / Customize orchestration.
//!
//! Analyze fans out two generation calls concurrently (verbatim extraction
//! on the Flash tier, evaluation on the Pro tier), joins them, recomputes
//! the aggregate score, and returns the composite. Each branch applies the
//! resolver's fallback policy independently: analyze never raises on
//! generation failure. Customize issues a single Pro-tier rewrite call and
//! propagates an exhausted-retry error to the caller.

use serde::Serialize;
use tracing::{info, warn};

use crate::analysis::models::{AnalysisResult, ImprovedCvResult, SafeFallback};
use crate::analysis::prompts::{
    build_evaluation_prompt, build_extraction_prompt, build_rewrite_prompt,
    GENERIC_ANALYSIS_FEEDBACK,
};
use crate::analysis::resolver;
use crate::analysis::sanitizer::sanitize;
use crate::errors::AppError;
use crate::llm_client::{schemas, GenerationRequest, LlmClient, TaskKind};

/// Minimum CV length accepted before any generation call is attempted.
pub const MIN_CV_CHARS: usize = 50;

/// Tailoring target for the customize flow. Required, enumerated input:
/// an unrecognized mode string is a caller error, never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomizeMode {
    JobDesc,
    Analysis,
}

impl CustomizeMode {
    pub fn parse(s: &str) -> Result<Self, AppError> {
        match s {
            "job_desc" => Ok(CustomizeMode::JobDesc),
            "analysis" => Ok(CustomizeMode::Analysis),
            other => Err(AppError::Validation(format!(
                "Invalid mode '{other}'. Expected 'job_desc' or 'analysis'."
            ))),
        }
    }
}

/// Composite output of the analyze flow.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeOutcome {
    pub analysis: AnalysisResult,
    pub cv_data: ImprovedCvResult,
}

/// Uses the caller-supplied `YYYY-MM-DD` stamp when present, otherwise
/// today's date.
pub fn current_date_or_today(current_date: Option<&str>) -> String {
    match current_date.map(str::trim) {
        Some(date) if !date.is_empty() => date.to_string(),
        _ => chrono::Utc::now().format("%Y-%m-%d").to_string(),
    }
}

/// Runs the full analyze flow. `job_desc` is either real job-description
/// text or the `AUTO_DETECT_ROLE` sentinel. The caller has already
/// validated the CV length.
pub async fn analyze(
    llm: &LlmClient,
    cv_text: &str,
    job_desc: &str,
    current_date: Option<&str>,
) -> AnalyzeOutcome {
    let cv_text = sanitize(cv_text);
    let date = current_date_or_today(current_date);

    // Fan out: extraction on Flash, evaluation on Pro. The two calls have no
    // ordering guarantee relative to each other; a failure in one branch
    // never blocks the other.
    let (cv_data, mut analysis) = tokio::join!(
        extract_cv_data(llm, &cv_text),
        evaluate_cv(llm, &cv_text, job_desc, &date),
    );

    // The aggregate is derived, never trusted from the model. A failed
    // evaluation branch carries zeroed sub-scores here, so the degraded
    // result is visibly low rather than silently plausible.
    analysis.finalize_scores();

    info!(
        "analysis complete: candidate={}, overall={}",
        analysis.candidate_name, analysis.overall_score
    );

    AnalyzeOutcome { analysis, cv_data }
}

/// Verbatim extraction branch. Best-effort: both call and parse failures
/// collapse into the schema-valid fallback.
async fn extract_cv_data(llm: &LlmClient, cv_text: &str) -> ImprovedCvResult {
    let request = GenerationRequest::for_task(
        TaskKind::Extraction,
        build_extraction_prompt(cv_text),
        schemas::improved_cv_schema(),
    );

    match llm.generate(&request).await {
        Ok(raw) => resolver::resolve(&raw).unwrap_or_else(|e| {
            warn!("extraction output failed to resolve: {e}");
            ImprovedCvResult::fallback("could not parse extracted CV data")
        }),
        Err(e) => {
            warn!("extraction call failed after retries: {e}");
            ImprovedCvResult::fallback("CV extraction unavailable")
        }
    }
}

/// Evaluation branch. Best-effort like extraction; the fallback's zero
/// scores flow into the recomputed aggregate.
async fn evaluate_cv(
    llm: &LlmClient,
    cv_text: &str,
    job_desc: &str,
    current_date: &str,
) -> AnalysisResult {
    let request = GenerationRequest::for_task(
        TaskKind::Evaluation,
        build_evaluation_prompt(cv_text, job_desc, current_date),
        schemas::analysis_result_schema(),
    );

    match llm.generate(&request).await {
        Ok(raw) => resolver::resolve(&raw).unwrap_or_else(|e| {
            warn!("evaluation output failed to resolve: {e}");
            AnalysisResult::fallback("could not parse analysis result")
        }),
        Err(e) => {
            warn!("evaluation call failed after retries: {e}");
            AnalysisResult::fallback("CV analysis unavailable")
        }
    }
}

/// Runs the customize flow: one Pro-tier rewrite call. The mode and its
/// context have already been validated by the handler; `Analysis` mode with
/// empty context falls back to the generic fix-weaknesses framing.
///
/// Unlike analyze, the rewrite call is the primary product of this request:
/// an exhausted-retry generation error propagates as a server error. Parse
/// failures are still masked with the fallback object.
pub async fn customize(
    llm: &LlmClient,
    cv_text: &str,
    mode: CustomizeMode,
    context: &str,
    current_date: Option<&str>,
) -> Result<ImprovedCvResult, AppError> {
    let cv_text = sanitize(cv_text);
    let date = current_date_or_today(current_date);

    let mode_context = match mode {
        CustomizeMode::JobDesc => format!("TARGET JOB: {context}"),
        CustomizeMode::Analysis => {
            let feedback = if context.trim().is_empty() {
                GENERIC_ANALYSIS_FEEDBACK
            } else {
                context
            };
            format!("ANALYSIS FEEDBACK: {feedback}")
        }
    };

    let request = GenerationRequest::for_task(
        TaskKind::Rewrite,
        build_rewrite_prompt(&cv_text, &mode_context, &date),
        schemas::improved_cv_schema(),
    );

    let raw = llm
        .generate(&request)
        .await
        .map_err(|e| AppError::Llm(format!("CV rewrite failed: {e}")))?;

    Ok(resolver::resolve(&raw).unwrap_or_else(|e| {
        warn!("rewrite output failed to resolve: {e}");
        ImprovedCvResult::fallback("could not parse rewritten CV")
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::analysis::prompts::AUTO_DETECT_ROLE;
    use crate::llm_client::{
        GenerationTransport, LlmError, ModelTier, RawResponse,
    };

    /// Scripted transport returning canned JSON per tier and recording every
    /// request it sees.
    struct ScriptedTransport {
        flash_text: Option<String>,
        pro_text: Option<String>,
        requests: Mutex<Vec<GenerationRequest>>,
    }

    impl ScriptedTransport {
        fn new(flash_text: Option<&str>, pro_text: Option<&str>) -> Self {
            Self {
                flash_text: flash_text.map(str::to_string),
                pro_text: pro_text.map(str::to_string),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn prompts_for(&self, tier: ModelTier) -> Vec<String> {
            self.requests
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.tier == tier)
                .map(|r| r.prompt.clone())
                .collect()
        }

        fn call_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl GenerationTransport for ScriptedTransport {
        async fn generate_once(
            &self,
            request: &GenerationRequest,
        ) -> Result<RawResponse, LlmError> {
            self.requests.lock().unwrap().push(request.clone());
            let text = match request.tier {
                ModelTier::Flash => &self.flash_text,
                ModelTier::Pro => &self.pro_text,
            };
            match text {
                Some(text) => Ok(RawResponse {
                    text: text.clone(),
                    parsed: serde_json::from_str(text).ok(),
                }),
                None => Err(LlmError::Api {
                    status: 503,
                    message: "backend unavailable".to_string(),
                }),
            }
        }
    }

    fn evaluation_json() -> String {
        json!({
            "candidate_name": "Jane Doe",
            "overall_score": 11,
            "overall_summary": "Strong systems background.",
            "writing_score": 80,
            "writing_detail": "Clear and active.",
            "ats_score": 70,
            "ats_detail": "Readable layout.",
            "skill_score": 60,
            "skill_detail": "Good overlap.",
            "experience_score": 90,
            "experience_detail": "Directly relevant.",
            "keyword_score": 55,
            "keyword_detail": "Some gaps.",
            "key_strengths": ["Rust", "Distributed systems"],
            "missing_skills": [
                {"gap": "Kubernetes", "action": "Deploy a toy service to a local kind cluster."}
            ]
        })
        .to_string()
    }

    fn extraction_json() -> String {
        json!({
            "full_name": "Jane Doe",
            "professional_summary": "Rust engineer.",
            "contact_info": {"email": "jane@doe.dev", "phone": "", "location": "Berlin", "linkedin": ""},
            "hard_skills": ["Rust"],
            "soft_skills": [],
            "work_experience": [
                {"title": "Engineer", "company": "Acme", "dates": "2020 – Present", "achievements": ["Built things"]}
            ],
            "education": [],
            "projects": []
        })
        .to_string()
    }

    const CV: &str = "Jane Doe, Rust engineer with ten years of compiler and distributed systems experience.";

    #[tokio::test]
    async fn test_analyze_joins_both_branches_and_recomputes_overall() {
        let transport = Arc::new(ScriptedTransport::new(
            Some(&extraction_json()),
            Some(&evaluation_json()),
        ));
        let llm = LlmClient::with_transport(transport.clone());

        let outcome = analyze(&llm, CV, "Senior Rust Engineer", Some("2026-08-28")).await;

        // (80 + 70 + 60 + 90) / 4 = 75, overwriting the model's 11.
        assert_eq!(outcome.analysis.overall_score, 75);
        assert_eq!(outcome.analysis.candidate_name, "Jane Doe");
        assert_eq!(outcome.cv_data.full_name, "Jane Doe");
        assert_eq!(outcome.cv_data.work_experience.len(), 1);

        // One Flash extraction call, one Pro evaluation call.
        assert_eq!(transport.prompts_for(ModelTier::Flash).len(), 1);
        assert_eq!(transport.prompts_for(ModelTier::Pro).len(), 1);
    }

    #[tokio::test]
    async fn test_analyze_sentinel_switches_evaluation_to_role_inference() {
        let transport = Arc::new(ScriptedTransport::new(
            Some(&extraction_json()),
            Some(&evaluation_json()),
        ));
        let llm = LlmClient::with_transport(transport.clone());

        analyze(&llm, CV, AUTO_DETECT_ROLE, Some("2026-08-28")).await;

        let pro_prompts = transport.prompts_for(ModelTier::Pro);
        assert!(pro_prompts[0].contains("Infer the candidate's professional role"));
    }

    #[tokio::test]
    async fn test_analyze_embeds_date_in_evaluation_prompt() {
        let transport = Arc::new(ScriptedTransport::new(
            Some(&extraction_json()),
            Some(&evaluation_json()),
        ));
        let llm = LlmClient::with_transport(transport.clone());

        analyze(&llm, CV, "Backend role", Some("2031-01-15")).await;

        let pro_prompts = transport.prompts_for(ModelTier::Pro);
        assert!(pro_prompts[0].contains("TODAY'S DATE: 2031-01-15"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_analyze_failed_evaluation_branch_yields_zeroed_fallback() {
        // Pro tier down, Flash fine: extraction survives, analysis degrades.
        let transport = Arc::new(ScriptedTransport::new(Some(&extraction_json()), None));
        let llm = LlmClient::with_transport(transport.clone());

        let outcome = analyze(&llm, CV, "Backend role", Some("2026-08-28")).await;

        assert_eq!(outcome.analysis.overall_score, 0);
        assert!(outcome.analysis.overall_summary.starts_with("Error:"));
        assert_eq!(outcome.cv_data.full_name, "Jane Doe");
    }

    #[tokio::test(start_paused = true)]
    async fn test_analyze_failed_extraction_branch_does_not_block_evaluation() {
        let transport = Arc::new(ScriptedTransport::new(None, Some(&evaluation_json())));
        let llm = LlmClient::with_transport(transport.clone());

        let outcome = analyze(&llm, CV, "Backend role", Some("2026-08-28")).await;

        assert_eq!(outcome.analysis.overall_score, 75);
        assert_eq!(outcome.cv_data.full_name, "Candidate");
        assert!(outcome.cv_data.professional_summary.starts_with("Error:"));
    }

    #[tokio::test]
    async fn test_analyze_unparsable_evaluation_text_falls_back() {
        let transport = Arc::new(ScriptedTransport::new(
            Some(&extraction_json()),
            Some("the model rambled with no json whatsoever"),
        ));
        let llm = LlmClient::with_transport(transport.clone());

        let outcome = analyze(&llm, CV, "Backend role", Some("2026-08-28")).await;

        assert_eq!(outcome.analysis.candidate_name, "Unknown");
        assert_eq!(outcome.analysis.overall_score, 0);
    }

    #[tokio::test]
    async fn test_customize_job_desc_mode_frames_target_job() {
        let transport = Arc::new(ScriptedTransport::new(None, Some(&extraction_json())));
        let llm = LlmClient::with_transport(transport.clone());

        let improved = customize(
            &llm,
            CV,
            CustomizeMode::JobDesc,
            "Platform engineer at Acme",
            Some("2026-08-28"),
        )
        .await
        .unwrap();

        assert_eq!(improved.full_name, "Jane Doe");
        let prompts = transport.prompts_for(ModelTier::Pro);
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("TARGET JOB: Platform engineer at Acme"));
    }

    #[tokio::test]
    async fn test_customize_analysis_mode_defaults_to_generic_feedback() {
        let transport = Arc::new(ScriptedTransport::new(None, Some(&extraction_json())));
        let llm = LlmClient::with_transport(transport.clone());

        customize(&llm, CV, CustomizeMode::Analysis, "  ", Some("2026-08-28"))
            .await
            .unwrap();

        let prompts = transport.prompts_for(ModelTier::Pro);
        assert!(prompts[0].contains("ANALYSIS FEEDBACK: Fix general weaknesses found in the CV."));
    }

    #[tokio::test]
    async fn test_customize_analysis_mode_uses_supplied_feedback() {
        let transport = Arc::new(ScriptedTransport::new(None, Some(&extraction_json())));
        let llm = LlmClient::with_transport(transport.clone());

        customize(
            &llm,
            CV,
            CustomizeMode::Analysis,
            "Weak summary section.",
            Some("2026-08-28"),
        )
        .await
        .unwrap();

        let prompts = transport.prompts_for(ModelTier::Pro);
        assert!(prompts[0].contains("ANALYSIS FEEDBACK: Weak summary section."));
    }

    #[tokio::test(start_paused = true)]
    async fn test_customize_propagates_exhausted_generation_error() {
        let transport = Arc::new(ScriptedTransport::new(None, None));
        let llm = LlmClient::with_transport(transport.clone());

        let result = customize(&llm, CV, CustomizeMode::JobDesc, "Some job", None).await;

        assert!(matches!(result, Err(AppError::Llm(_))));
        // 3 sequential attempts on the single rewrite call.
        assert_eq!(transport.call_count(), 3);
    }

    #[tokio::test]
    async fn test_customize_masks_parse_failure_with_fallback() {
        let transport = Arc::new(ScriptedTransport::new(None, Some("no json here")));
        let llm = LlmClient::with_transport(transport.clone());

        let improved = customize(&llm, CV, CustomizeMode::JobDesc, "Some job", None)
            .await
            .unwrap();

        assert_eq!(improved.full_name, "Candidate");
        assert!(improved.professional_summary.starts_with("Error:"));
    }

    #[test]
    fn test_customize_mode_parse() {
        assert_eq!(
            CustomizeMode::parse("job_desc").unwrap(),
            CustomizeMode::JobDesc
        );
        assert_eq!(
            CustomizeMode::parse("analysis").unwrap(),
            CustomizeMode::Analysis
        );
        assert!(matches!(
            CustomizeMode::parse("yolo"),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_current_date_defaults_to_today() {
        let today = chrono::Utc::now().format("%Y-%m-%d").to_string();
        assert_eq!(current_date_or_today(None), today);
        assert_eq!(current_date_or_today(Some("  ")), today);
        assert_eq!(current_date_or_today(Some("2026-08-28")), "2026-08-28");
    }
}
