//! Benchmark data models
//!
//! Contains the test case settings container and the per-iteration run
//! record produced by the engine.

pub mod case;
pub mod record;

pub use case::TestCase;
pub use record::RunRecord;
