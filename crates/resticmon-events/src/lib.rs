//! # resticmon-events
//!
//! Incremental parsing of restic's `--json` stdout protocol and projection
//! of each event into a flat metric batch.
//!
//! Restic emits one JSON object per line while a backup runs: `status`
//! events report progress, a single `summary` event closes the stream.
//! Classification happens exactly once per line; everything downstream
//! works with a closed tagged union instead of re-inspecting the JSON.

mod classifier;
mod projector;

pub use classifier::{classify, ResticEvent, StatusEvent, SummaryEvent};
pub use projector::project;
