//! benchrig - pluggable micro-benchmark harness
//!
//! Runs a sequence of user-supplied workloads ("drivers"), each configured
//! by a test case, through a warmup phase followed by a measured phase,
//! optionally bounded by wall-clock duration, and collects timing and
//! outcome data per iteration.

use std::fmt;
use std::time::Duration;

// Public re-exports
pub mod bench;
pub mod driver;
pub mod models;
pub mod util;

pub use bench::{Benchmark, ShutdownTimer};
pub use driver::{Driver, DriverError, DriverResult, DriverSpec, StopFlag};
pub use models::{RunRecord, TestCase};

// Common error types
#[derive(Debug)]
pub enum BenchError {
    /// Driver factory failed to produce an instance
    DriverInit(String),
    /// Driver set_up hook failed
    DriverSetUp(String),
    /// Shutdown timer failed or exceeded the wait limit
    Timer(String),
    /// Test case validation error
    Case(String),
    /// Benchmark engine internal error
    Engine(String),
}

impl fmt::Display for BenchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BenchError::DriverInit(msg) => write!(f, "Driver instantiation error: {}", msg),
            BenchError::DriverSetUp(msg) => write!(f, "Driver set_up error: {}", msg),
            BenchError::Timer(msg) => write!(f, "Shutdown timer error: {}", msg),
            BenchError::Case(msg) => write!(f, "Test case error: {}", msg),
            BenchError::Engine(msg) => write!(f, "Engine error: {}", msg),
        }
    }
}

impl std::error::Error for BenchError {}

impl From<tokio::task::JoinError> for BenchError {
    fn from(err: tokio::task::JoinError) -> Self {
        BenchError::Engine(format!("task join failed: {}", err))
    }
}

/// Result type alias for benchrig operations
pub type Result<T> = std::result::Result<T, BenchError>;

/// Upper bound on how long the engine waits for an armed shutdown timer to
/// finish after an iteration completes. Exceeding it aborts the benchmark.
pub const SHUTDOWN_WAIT_LIMIT: Duration = Duration::from_secs(3600);
