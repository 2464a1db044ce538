pub mod domain;
pub mod listing;
pub mod ports;
pub mod reconciler;
pub mod segments;
pub mod selection;
pub mod span;
pub mod workspace;

pub use domain::{ChatMessage, ChatRole, Document, Highlight, HighlightCategory};
pub use ports::{AnalysisOracle, AnalysisResult, ChatOracle, PortError, PortResult, QuoteCandidate};
pub use reconciler::{DropReason, ReconcileError};
pub use segments::{segment, Run, RunKind};
pub use selection::{map_selection, MappedSelection};
pub use span::Span;
pub use workspace::{Workspace, WorkspaceError, WorkspaceResult};
