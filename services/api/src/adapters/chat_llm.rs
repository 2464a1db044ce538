//! services/api/src/adapters/chat_llm.rs
//!
//! This module contains the adapter for the document Question-Answering LLM.
//! It implements the `ChatOracle` port from the `core` crate.

const SYSTEM_INSTRUCTIONS: &str = "You are a helpful assistant analyzing a specific document. \
Answer the user's question based strictly on the provided document text. \
Be concise and direct. If the answer is not in the text, say so.";

/// Returned when the model produces no text.
pub const EMPTY_ANSWER: &str = "I couldn't generate a response.";

use crate::adapters::analysis_llm::map_openai_error;
use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use luminary_core::{
    domain::{ChatMessage, ChatRole},
    ports::{ChatOracle, PortResult},
};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `ChatOracle` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiChatAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiChatAdapter {
    /// Creates a new `OpenAiChatAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

/// Renders prior turns as `role: text` lines.
fn format_history(history: &[ChatMessage]) -> String {
    history
        .iter()
        .map(|msg| {
            let role = match msg.role {
                ChatRole::User => "user",
                ChatRole::Ai => "ai",
            };
            format!("{}: {}", role, msg.text)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Lays out the document, the history window and the question in one pass, so
/// placeholder-like text inside any of them reaches the model verbatim.
fn build_user_input(document_text: &str, question: &str, history: &[ChatMessage]) -> String {
    format!(
        "Document Text:\n\"\"\"\n{}\n\"\"\"\n\nChat History:\n{}\n\nUser Question: {}",
        document_text,
        format_history(history),
        question
    )
}

//=========================================================================================
// `ChatOracle` Trait Implementation
//=========================================================================================

#[async_trait]
impl ChatOracle for OpenAiChatAdapter {
    async fn chat(
        &self,
        document_text: &str,
        question: &str,
        history: &[ChatMessage],
    ) -> PortResult<String> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_INSTRUCTIONS)
                .build()
                .map_err(map_openai_error)?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(build_user_input(document_text, question, history))
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

        let answer = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| EMPTY_ANSWER.to_string());

        Ok(answer)
    }
}
