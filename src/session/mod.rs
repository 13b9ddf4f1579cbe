pub mod navigation;
pub mod orchestrator;
pub mod state_store;

pub use navigation::{NavDecision, NavigationController};
pub use orchestrator::{ExamSession, NavOutcome, Phase, SessionView, TickOutcome};
pub use state_store::{StateStore, Stats};
