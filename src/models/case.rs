//! Test case configuration
//!
//! A test case bundles the run parameters for a single driver execution:
//! iteration counts, an optional duration bound, the driver identity, and an
//! extensible settings bag for driver-specific configuration. It also owns
//! the ordered sequence of run records its executions produce.

use std::collections::HashMap;
use std::time::Duration;

use serde_json::Value;
use uuid::Uuid;

use crate::driver::DriverSpec;
use crate::models::RunRecord;
use crate::{BenchError, Result};

/// Settings for a single driver execution plus the records it produced.
///
/// A test case can be executed more than once; `clear_results` is called by
/// the engine before every benchmark run, so re-running never accumulates
/// stale records. Not thread-safe; the engine executes cases sequentially.
#[derive(Debug, Clone)]
pub struct TestCase {
    id: String,
    name: String,
    driver: DriverSpec,
    warmup_iterations: u64,
    iterations: u64,
    duration: Option<Duration>,
    settings: HashMap<String, Value>,
    results: Vec<RunRecord>,
}

impl TestCase {
    /// Creates a test case with one warmup iteration, one measured
    /// iteration and no duration bound.
    pub fn new(name: impl Into<String>, driver: DriverSpec) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            driver,
            warmup_iterations: 1,
            iterations: 1,
            duration: None,
            settings: HashMap::new(),
            results: Vec::new(),
        }
    }

    /// Set the number of warmup iterations (zero skips the warmup phase)
    pub fn with_warmup_iterations(mut self, count: u64) -> Self {
        self.warmup_iterations = count;
        self
    }

    /// Set the number of measured iterations
    pub fn with_iterations(mut self, count: u64) -> Self {
        self.iterations = count;
        self
    }

    /// Bound each iteration by a wall-clock duration; the engine signals the
    /// driver to stop once it elapses
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Add a driver-specific setting
    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.put(key, value);
        self
    }

    /// Validate the test case parameters
    pub fn validate(&self) -> Result<()> {
        if let Some(duration) = self.duration {
            if duration.is_zero() {
                return Err(BenchError::Case(format!(
                    "test case '{}': duration bound must be greater than 0",
                    self.name
                )));
            }
        }
        Ok(())
    }

    /// Unique id of this test case
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Driver identity used to instantiate a fresh driver per execution
    pub fn driver(&self) -> &DriverSpec {
        &self.driver
    }

    /// Number of warmup iterations (no records are produced for these)
    pub fn warmup_iterations(&self) -> u64 {
        self.warmup_iterations
    }

    /// Number of measured iterations
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Wall-clock bound per iteration; `None` means unbounded
    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    /// Puts a driver-specific setting. Last write wins, no type checking.
    pub fn put(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.settings.insert(key.into(), value.into());
    }

    /// Gets a driver-specific setting, or `None` if absent.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.settings.get(key)
    }

    /// All driver-specific settings
    pub fn settings(&self) -> &HashMap<String, Value> {
        &self.settings
    }

    /// Records produced by this test case's executions, in iteration order
    pub fn results(&self) -> &[RunRecord] {
        &self.results
    }

    /// Appends a run record. No duplicate checking is performed.
    pub fn add_result(&mut self, record: RunRecord) {
        self.results.push(record);
    }

    /// Removes all run records, if there are any.
    pub fn clear_results(&mut self) {
        self.results.clear();
    }
}
