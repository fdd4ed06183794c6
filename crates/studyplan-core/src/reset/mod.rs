//! Daily progress reset: the state machine that rolls a day's progress into
//! history once per calendar day, and the aggregate it maintains.

mod engine;
mod state;

pub use engine::{EngineSettings, ResetEngine};
pub use state::{CheckOutcome, EnginePhase, ResetOutcome, ResetSystemState};
