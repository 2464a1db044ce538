pub mod analysis_llm;
pub mod chat_llm;

pub use analysis_llm::OpenAiAnalysisAdapter;
pub use chat_llm::OpenAiChatAdapter;
