//! Fake oracles and state builders shared by the web tests.

use crate::{config::Config, web::state::AppState};
use async_trait::async_trait;
use luminary_core::{
    domain::ChatMessage,
    ports::{AnalysisOracle, AnalysisResult, ChatOracle, PortResult},
    workspace::Workspace,
};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use tokio::sync::{Mutex, Notify};

/// Holds a fake oracle inside its call until released.
#[derive(Clone, Default)]
pub struct Gate {
    pub entered: Arc<Notify>,
    pub release: Arc<Notify>,
}

impl Gate {
    async fn pass(&self) {
        self.entered.notify_one();
        self.release.notified().await;
    }
}

pub struct FakeAnalysis {
    result: PortResult<AnalysisResult>,
    pub calls: Arc<AtomicUsize>,
    gate: Option<Gate>,
}

impl FakeAnalysis {
    pub fn answering(result: AnalysisResult) -> Self {
        Self {
            result: Ok(result),
            calls: Arc::default(),
            gate: None,
        }
    }

    pub fn failing(error: luminary_core::PortError) -> Self {
        Self {
            result: Err(error),
            calls: Arc::default(),
            gate: None,
        }
    }

    pub fn gated(mut self, gate: Gate) -> Self {
        self.gate = Some(gate);
        self
    }
}

#[async_trait]
impl AnalysisOracle for FakeAnalysis {
    async fn analyze(&self, _document_text: &str) -> PortResult<AnalysisResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.pass().await;
        }
        self.result.clone()
    }
}

pub struct FakeChat {
    result: PortResult<String>,
    pub calls: Arc<AtomicUsize>,
    /// History length seen on the most recent call.
    pub last_history: Arc<AtomicUsize>,
    gate: Option<Gate>,
}

impl FakeChat {
    pub fn answering(answer: &str) -> Self {
        Self {
            result: Ok(answer.to_string()),
            calls: Arc::default(),
            last_history: Arc::default(),
            gate: None,
        }
    }

    pub fn failing(error: luminary_core::PortError) -> Self {
        Self {
            result: Err(error),
            calls: Arc::default(),
            last_history: Arc::default(),
            gate: None,
        }
    }

    pub fn gated(mut self, gate: Gate) -> Self {
        self.gate = Some(gate);
        self
    }
}

#[async_trait]
impl ChatOracle for FakeChat {
    async fn chat(
        &self,
        _document_text: &str,
        _question: &str,
        history: &[ChatMessage],
    ) -> PortResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.last_history.store(history.len(), Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.pass().await;
        }
        self.result.clone()
    }
}

pub fn test_config() -> Config {
    Config::from_lookup(|_| None).expect("default config")
}

/// Application state over a single document holding `text`.
pub fn app_state(text: &str, analysis: FakeAnalysis, chat: FakeChat) -> Arc<AppState> {
    Arc::new(AppState {
        workspace: Arc::new(Mutex::new(Workspace::with_seed(text))),
        config: Arc::new(test_config()),
        analysis_adapter: Arc::new(analysis),
        chat_adapter: Arc::new(chat),
    })
}
