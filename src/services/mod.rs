pub mod autosave;
pub mod integrity;
pub mod persistence;
pub mod scoring;
pub mod timer;

pub use autosave::{AutosaveController, SavePayload, SaveRequest};
pub use integrity::{IntegrityAction, IntegrityEvent, IntegrityMonitor, NoopProctor, ProctorHost};
pub use persistence::{SessionSnapshot, SnapshotStore};
pub use scoring::score_locally;
pub use timer::{Countdown, TimerMode, TimerSignal};
