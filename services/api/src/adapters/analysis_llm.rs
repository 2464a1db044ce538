//! services/api/src/adapters/analysis_llm.rs
//!
//! This module contains the adapter for the text-analysis LLM.
//! It implements the `AnalysisOracle` port from the `core` crate.

const SYSTEM_INSTRUCTIONS: &str = r#"You are a reading assistant that annotates documents.

Analyze the document you are given.
1. Write a concise, high-level summary (max 3 sentences) capturing the core essence.
2. Extract the most significant segments and categorize them into:
   - IMPORTANT (Key insights, main ideas)
   - FACT (Statistics, specific data points, dates, definitions)
   - ACTION (Instructions, next steps, to-dos)
   - WARNING (Risks, caveats, critical alerts)

Respond with ONLY a JSON object of this shape, no prose around it:
{"summary": "...", "highlights": [{"quote": "...", "category": "IMPORTANT", "explanation": "..."}]}

Every "quote" MUST be copied exactly, character for character, from the document.
"explanation" is optional."#;

const USER_INPUT_TEMPLATE: &str = r#"Text to analyze:
"{text}""#;

use async_openai::{
    config::OpenAIConfig,
    error::{ApiError, OpenAIError},
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use luminary_core::{
    ports::{AnalysisOracle, AnalysisResult, PortError, PortResult, QuoteCandidate},
    HighlightCategory,
};
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;
use tracing::{info, warn};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `AnalysisOracle` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiAnalysisAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiAnalysisAdapter {
    /// Creates a new `OpenAiAnalysisAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

//=========================================================================================
// `AnalysisOracle` Trait Implementation
//=========================================================================================

#[async_trait]
impl AnalysisOracle for OpenAiAnalysisAdapter {
    /// Asks the model for a summary and categorized quotes.
    async fn analyze(&self, document_text: &str) -> PortResult<AnalysisResult> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_INSTRUCTIONS)
                .build()
                .map_err(map_openai_error)?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(USER_INPUT_TEMPLATE.replace("{text}", document_text))
                .build()
                .map_err(map_openai_error)?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .n(1)
            .build()
            .map_err(map_openai_error)?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(map_openai_error)?;

        let raw = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        let result = parse_analysis(&raw)?;
        info!(
            "Analysis returned {} candidate highlights.",
            result.highlights.len()
        );
        Ok(result)
    }
}

/// Maps client errors onto the port's failure kinds.
pub(crate) fn map_openai_error(e: OpenAIError) -> PortError {
    match e {
        OpenAIError::ApiError(ref api) if is_auth_failure(api) => PortError::Unauthorized,
        OpenAIError::JSONDeserialize(..) => PortError::MalformedResponse(e.to_string()),
        _ => PortError::Unavailable(e.to_string()),
    }
}

/// A rejected or missing API key. OpenAI reports `invalid_api_key`; compatible
/// endpoints such as Gemini's report the HTTP status instead.
fn is_auth_failure(api: &ApiError) -> bool {
    let code = api.code.as_deref().unwrap_or_default();
    let kind = api.r#type.as_deref().unwrap_or_default();
    matches!(code, "invalid_api_key" | "401" | "403" | "unauthorized")
        || matches!(kind, "authentication_error" | "permission_error")
}

//=========================================================================================
// Response Parsing
//=========================================================================================

#[derive(Deserialize)]
struct RawAnalysis {
    #[serde(default)]
    summary: String,
    #[serde(default)]
    highlights: Vec<RawCandidate>,
}

#[derive(Deserialize)]
struct RawCandidate {
    quote: String,
    category: String,
    #[serde(default)]
    explanation: Option<String>,
}

static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*```[A-Za-z]*\s*(.*?)\s*```\s*$").unwrap()
});

/// Removes a surrounding markdown code fence, if the model added one.
fn strip_code_fence(raw: &str) -> &str {
    match CODE_FENCE.captures(raw).and_then(|c| c.get(1)) {
        Some(body) => body.as_str(),
        None => raw.trim(),
    }
}

/// Decodes the model's JSON answer. An empty answer is an empty analysis.
/// Candidates with a category outside the closed set are skipped.
pub fn parse_analysis(raw: &str) -> PortResult<AnalysisResult> {
    let body = strip_code_fence(raw);
    if body.is_empty() {
        return Ok(AnalysisResult::default());
    }

    let parsed: RawAnalysis = serde_json::from_str(body)
        .map_err(|e| PortError::MalformedResponse(e.to_string()))?;

    let mut highlights = Vec::with_capacity(parsed.highlights.len());
    for candidate in parsed.highlights {
        match candidate.category.parse::<HighlightCategory>() {
            Ok(category) => highlights.push(QuoteCandidate {
                quote: candidate.quote,
                category,
                explanation: candidate.explanation,
            }),
            Err(e) => warn!("Skipping analysis candidate: {}", e),
        }
    }

    Ok(AnalysisResult {
        summary: parsed.summary,
        highlights,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn parses_plain_json() {
        let raw = r#"{"summary":"Short.","highlights":[{"quote":"cat","category":"FACT"}]}"#;
        let result = parse_analysis(raw).expect("parse");
        assert_eq!(result.summary, "Short.");
        assert_eq!(result.highlights, vec![QuoteCandidate::new("cat", HighlightCategory::Fact)]);
    }

    #[test]
    fn strips_markdown_fence() {
        let raw = "```json\n{\"summary\":\"S\",\"highlights\":[{\"quote\":\"q\",\"category\":\"warning\",\"explanation\":\"risky\"}]}\n```";
        let result = parse_analysis(raw).expect("parse");
        assert_eq!(result.highlights.len(), 1);
        assert_eq!(result.highlights[0].category, HighlightCategory::Warning);
        assert_eq!(result.highlights[0].explanation.as_deref(), Some("risky"));
    }

    #[test]
    fn empty_answer_is_empty_analysis() {
        assert_eq!(parse_analysis("  \n").expect("parse"), AnalysisResult::default());
    }

    #[test]
    fn missing_highlights_is_tolerated() {
        let result = parse_analysis(r#"{"summary":"Only a summary."}"#).expect("parse");
        assert!(result.highlights.is_empty());
    }

    #[test]
    fn malformed_json_is_a_port_error() {
        let err = parse_analysis("Sure! Here are your highlights:").expect_err("malformed");
        assert!(matches!(err, PortError::MalformedResponse(_)));
    }

    fn api_error(code: Option<&str>, kind: Option<&str>) -> OpenAIError {
        OpenAIError::ApiError(ApiError {
            message: "request failed".to_string(),
            r#type: kind.map(str::to_string),
            param: None,
            code: code.map(str::to_string),
        })
    }

    #[rstest]
    #[case(Some("invalid_api_key"), Some("invalid_request_error"), PortError::Unauthorized)]
    #[case(Some("401"), None, PortError::Unauthorized)]
    #[case(None, Some("authentication_error"), PortError::Unauthorized)]
    #[case(Some("rate_limit_exceeded"), Some("requests"), PortError::Unavailable(String::new()))]
    fn api_errors_map_to_port_errors(
        #[case] code: Option<&str>,
        #[case] kind: Option<&str>,
        #[case] expected: PortError,
    ) {
        let mapped = map_openai_error(api_error(code, kind));
        assert_eq!(
            std::mem::discriminant(&mapped),
            std::mem::discriminant(&expected)
        );
    }

    #[test]
    fn fence_without_language_tag_is_stripped() {
        assert_eq!(strip_code_fence("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fence("  {} "), "{}");
    }

    #[test]
    fn unknown_categories_are_skipped() {
        let raw = r#"{"summary":"S","highlights":[{"quote":"a","category":"TRIVIA"},{"quote":"b","category":"ACTION"}]}"#;
        let result = parse_analysis(raw).expect("parse");
        assert_eq!(result.highlights, vec![QuoteCandidate::new("b", HighlightCategory::Action)]);
    }
}
