pub mod poll_cycle;

pub use poll_cycle::{CycleOutcome, CycleReport, EngineState, PollCycleConfig, PollCycleEngine};
