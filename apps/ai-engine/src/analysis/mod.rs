// AI analysis core: sanitize → prompt → route → generate-with-retry →
// resolve → orchestrate. All LLM calls go through llm_client — no direct
// Gemini calls here.

pub mod engine;
pub mod handlers;
pub mod models;
pub mod prompts;
pub mod resolver;
pub mod sanitizer;
