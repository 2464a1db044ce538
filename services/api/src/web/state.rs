//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use luminary_core::{
    ports::{AnalysisOracle, ChatOracle},
    workspace::Workspace,
};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Text of the document a fresh workspace opens with.
pub const WELCOME_TEXT: &str = "Welcome to Luminary AI Highlighter.

Artificial Intelligence is reshaping how we process information. According to recent studies, AI tools can increase reading comprehension speed by up to 40% when key information is visually segmented.

Here are some things to try:
1. Paste a long article or email into this editor.
2. Click the \"AI Analyze\" button to automatically detect insights.
3. Review the sidebar to see your categorized knowledge.

Warning: Always verify AI-generated highlights for critical accuracy.

Enjoy exploring your text in a new light!";

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
///
/// The workspace is locked only around synchronous operations. Oracle calls run
/// with the lock released.
#[derive(Clone)]
pub struct AppState {
    pub workspace: Arc<Mutex<Workspace>>,
    pub config: Arc<Config>,
    pub analysis_adapter: Arc<dyn AnalysisOracle>,
    pub chat_adapter: Arc<dyn ChatOracle>,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        analysis_adapter: Arc<dyn AnalysisOracle>,
        chat_adapter: Arc<dyn ChatOracle>,
    ) -> Self {
        let workspace = if config.seed_welcome_document {
            Workspace::with_seed(WELCOME_TEXT)
        } else {
            Workspace::new()
        };
        Self {
            workspace: Arc::new(Mutex::new(workspace)),
            config,
            analysis_adapter,
            chat_adapter,
        }
    }
}
