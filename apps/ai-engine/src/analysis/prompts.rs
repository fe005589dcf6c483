//! Prompt builders for the three generation tasks.
//!
//! All three are pure functions of (CV text, context, current date) and end
//! with an explicit strictly-JSON output directive naming the target shape.
//! Templates use `{placeholder}` substitution, filled by the builders below.

use crate::analysis::sanitizer::{truncate_chars, EXTRACTION_CHAR_BOUND};

/// Sentinel job-description value signaling "no job description was given —
/// infer the role from the CV instead". Reserved input, never literal data.
pub const AUTO_DETECT_ROLE: &str = "AUTO_DETECT_ROLE";

/// Default rewrite feedback when customize runs in analysis mode without
/// any prior analysis context.
pub const GENERIC_ANALYSIS_FEEDBACK: &str = "Fix general weaknesses found in the CV.";

/// Directive closing every prompt. Names the target shape and forbids prose.
const STRICT_JSON_DIRECTIVE: &str = "Respond with a single JSON object matching the {schema_name} schema. \
Output strictly JSON: no prose, no markdown, nothing outside the JSON object.";

// ────────────────────────────────────────────────────────────────────────────
// Extraction — verbatim structured copy of the original CV
// ────────────────────────────────────────────────────────────────────────────

const EXTRACTION_PROMPT_TEMPLATE: &str = r#"You are a strict data parser.
Extract the following CV text into structured JSON.

RULES:
1. DO NOT rewrite, improve, or change the content. Copy the original wording exactly as it appears.
2. If a field is missing from the CV, use an empty string "" or an empty list [].
3. When the text contains a hyperlink pattern of the form "Text [URL]", encode it as a markdown link: [Text](URL).
4. Never invent, infer, or embellish anything that is not literally present in the CV text.

CV TEXT:
{cv_text}

{json_directive}"#;

/// Builds the strict extraction prompt. The CV text is bounded to
/// `EXTRACTION_CHAR_BOUND` chars to keep the fast-tier call cheap.
pub fn build_extraction_prompt(cv_text: &str) -> String {
    EXTRACTION_PROMPT_TEMPLATE
        .replace("{cv_text}", truncate_chars(cv_text, EXTRACTION_CHAR_BOUND))
        .replace(
            "{json_directive}",
            &STRICT_JSON_DIRECTIVE.replace("{schema_name}", "ImprovedCvResult"),
        )
}

// ────────────────────────────────────────────────────────────────────────────
// Evaluation — six-criterion scoring
// ────────────────────────────────────────────────────────────────────────────

const EVALUATION_PROMPT_TEMPLATE: &str = r#"You are a Senior Technical Recruiter and CV Expert.
Analyze the candidate CV below. Address the candidate as "you", never "he" or "she".

{job_block}

CANDIDATE CV CONTENT:
{cv_text}

TODAY'S DATE: {current_date}
DATE RULES: treat roles tagged "Present" or ending in the current year as ongoing employment.
NEVER flag current-year or "Present" experience as a future-date error.

LANGUAGE RULE: detect the dominant language of the CV and write ALL output text
(summaries, details, strengths, gaps, actions) in that same language. Never mix languages.

Perform a deep analysis based on these 6 specific criteria:

1. **Candidate Overview**:
   - Extract the candidate's full name.
   - Give an overall score (0-100) with detailed feedback covering strengths and weaknesses.

2. **Writing Style (0-100)**:
   - Check clarity, grammar, and typos.
   - Identify weak phrasing (excessive passive voice) vs action-oriented language.

3. **CV Format & ATS (0-100)**:
   - Is the format ATS-friendly? Clean structure, machine-readable?

4. **Skill Match (0-100)**:
   - How well do the hard and soft skills match the requirements?

5. **Experience & Projects (0-100)**:
   - RELEVANCE OVER SENIORITY: a candidate who is senior in an unrelated domain
     must score BELOW 50 here, regardless of seniority.
   - A candidate whose projects directly address the job's stated problems scores high.

6. **Keyword Relevance & Critical Gaps (0-100)**:
   - List the primary selling points as key_strengths.
   - Identify critical gaps as missing_skills.
   - CRITICAL INSTRUCTION: for EACH gap, provide a concrete, educational "action".
     Do NOT just say "Learn Docker". Say "Build a simple microservice using Docker
     to understand containerization basics."

{json_directive}"#;

const JOB_DESCRIPTION_BLOCK: &str = r#"JOB DESCRIPTION:
{job_desc}"#;

const AUTO_INFERENCE_BLOCK: &str = r#"NO JOB DESCRIPTION WAS PROVIDED. Instead:
1. Infer the candidate's professional role from the CV content.
2. Synthesize the standard requirements a typical job posting for that role would list.
3. Score the CV against those synthesized requirements.
4. Explicitly name the inferred role inside overall_summary."#;

/// Builds the evaluation prompt. When `job_desc` is the `AUTO_DETECT_ROLE`
/// sentinel, the job block switches to the role-inference instructions.
pub fn build_evaluation_prompt(cv_text: &str, job_desc: &str, current_date: &str) -> String {
    let job_block = if job_desc == AUTO_DETECT_ROLE {
        AUTO_INFERENCE_BLOCK.to_string()
    } else {
        JOB_DESCRIPTION_BLOCK.replace("{job_desc}", job_desc)
    };

    EVALUATION_PROMPT_TEMPLATE
        .replace("{job_block}", &job_block)
        .replace("{cv_text}", cv_text)
        .replace("{current_date}", current_date)
        .replace(
            "{json_directive}",
            &STRICT_JSON_DIRECTIVE.replace("{schema_name}", "AnalysisResult"),
        )
}

// ────────────────────────────────────────────────────────────────────────────
// Rewrite — truthful improvement
// ────────────────────────────────────────────────────────────────────────────

const REWRITE_PROMPT_TEMPLATE: &str = r#"You are an Ethical Expert Resume Writer.
Rewrite the CV below to maximize impact while remaining strictly factual.

ORIGINAL CV CONTENT:
{cv_text}

CONTEXT:
{mode_context}

TODAY'S DATE: {current_date}

*** STRICT ETHICAL GUIDELINES ***
1. NO HALLUCINATIONS: do NOT add hard skills, certifications, or work experiences not present in the original CV.
2. NO FABRICATION: if the context asks for a skill the candidate does not have, do NOT add it.
3. TRUTH OPTIMIZATION: you MAY rephrase existing bullets to highlight keywords when the facts support it.

*** WRITING INSTRUCTIONS ***
1. Summary: punchy, metric-driven, tailored to the context using ONLY existing facts.
2. Experience: polish bullets with strong action verbs (Spearheaded, Engineered).
   Quantify results if metrics exist or can be reasonably estimated from context.
   Preserve EVERY work history entry. Drop none.
3. Preserve every URL. Encode "Text [URL]" patterns as markdown links: [Text](URL).
4. Format ongoing roles consistently as "start date – Present".
5. Detect the dominant language of the original CV and write ALL output text in that same language. Never mix languages.
6. Skills: re-organize to prioritize relevance.

{json_directive}"#;

/// Builds the rewrite prompt. `mode_context` carries mode-specific framing
/// (`TARGET JOB: ...` or `ANALYSIS FEEDBACK: ...`) supplied by the engine.
pub fn build_rewrite_prompt(cv_text: &str, mode_context: &str, current_date: &str) -> String {
    REWRITE_PROMPT_TEMPLATE
        .replace("{cv_text}", cv_text)
        .replace("{mode_context}", mode_context)
        .replace("{current_date}", current_date)
        .replace(
            "{json_directive}",
            &STRICT_JSON_DIRECTIVE.replace("{schema_name}", "ImprovedCvResult"),
        )
}
