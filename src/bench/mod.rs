//! Benchmark execution engine
//!
//! Drives the per-test-case warmup and measurement loop and arms the
//! cooperative shutdown timer for duration-bounded runs.

pub mod engine;
pub mod timer;

pub use engine::Benchmark;
pub use timer::ShutdownTimer;
