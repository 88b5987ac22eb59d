pub mod config;
pub mod engine;
pub mod error;
pub mod matching;
pub mod models;

pub mod metrics;

pub use engine::{Sequencer, SharedBook};
pub use error::{EngineError, EngineResult};
pub use matching::{IdSource, MatchingEngine, SequenceIds};
pub use models::{BookSnapshot, Command, Match, OrderId, Outcome, Price, Quantity, Side};
