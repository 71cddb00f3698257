//! Per-iteration run records
//!
//! A run record captures one measured iteration's outcome: timestamps,
//! duration, the captured failure if the driver raised one, and an
//! extensible properties bag a driver may populate during
//! `run`/`process_results`.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::models::TestCase;

/// The outcome of a single measured iteration.
///
/// Created by the engine once per measured iteration (warmup iterations
/// produce no retained record). Timing fields are filled in by the engine
/// before the record is handed to its test case. Not thread-safe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    id: String,
    test_case_id: String,
    iteration: u64,
    start_ms: i64,
    end_ms: i64,
    duration_ms: i64,
    date: DateTime<Utc>,
    failure: Option<String>,
    properties: HashMap<String, Value>,
}

impl RunRecord {
    /// Creates a record owned by the given test case. The back-reference is
    /// kept by id, for lookup only.
    pub fn new(test_case: &TestCase) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            test_case_id: test_case.id().to_string(),
            iteration: 0,
            start_ms: 0,
            end_ms: 0,
            duration_ms: 0,
            date: Utc::now(),
            failure: None,
            properties: HashMap::new(),
        }
    }

    /// Unique id of this record
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Id of the test case this record belongs to
    pub fn test_case_id(&self) -> &str {
        &self.test_case_id
    }

    /// 1-based index of the measured iteration that produced this record
    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    /// Start of the iteration, milliseconds since the Unix epoch
    pub fn start_ms(&self) -> i64 {
        self.start_ms
    }

    /// End of the iteration, milliseconds since the Unix epoch
    pub fn end_ms(&self) -> i64 {
        self.end_ms
    }

    /// Iteration duration in milliseconds (`end - start`)
    pub fn duration_ms(&self) -> i64 {
        self.duration_ms
    }

    /// Wall-clock date at the start of the iteration
    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    /// The captured failure, or `None` if the iteration succeeded
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Whether the iteration's `run` completed without failing
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    /// Puts a property value. If the property already exists it is
    /// overwritten; no type checking is performed.
    pub fn put(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.properties.insert(key.into(), value.into());
    }

    /// Gets a property value, or `None` if absent.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// All properties stored in this record
    pub fn properties(&self) -> &HashMap<String, Value> {
        &self.properties
    }

    // Engine-owned setters: timing and outcome are finalized by the engine
    // before the record reaches its test case.

    pub(crate) fn set_iteration(&mut self, iteration: u64) {
        self.iteration = iteration;
    }

    pub(crate) fn set_start_ms(&mut self, start_ms: i64) {
        self.start_ms = start_ms;
    }

    pub(crate) fn set_end_ms(&mut self, end_ms: i64) {
        self.end_ms = end_ms;
    }

    pub(crate) fn set_duration_ms(&mut self, duration_ms: i64) {
        self.duration_ms = duration_ms;
    }

    pub(crate) fn set_date(&mut self, date: DateTime<Utc>) {
        self.date = date;
    }

    pub(crate) fn set_failure(&mut self, failure: String) {
        self.failure = Some(failure);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{Driver, DriverResult, DriverSpec, StopFlag};

    struct NoopDriver;

    impl Driver for NoopDriver {
        fn run(&mut self, _stop: &StopFlag, _record: &mut RunRecord) -> DriverResult<()> {
            Ok(())
        }
    }

    fn test_case() -> TestCase {
        TestCase::new("record-tests", DriverSpec::new("noop", || Ok(Box::new(NoopDriver))))
    }

    #[test]
    fn test_new_record_links_back_to_case() {
        let case = test_case();
        let record = RunRecord::new(&case);

        assert!(!record.id().is_empty());
        assert_eq!(record.test_case_id(), case.id());
        assert_eq!(record.iteration(), 0);
        assert!(record.is_success());
        assert!(record.properties().is_empty());
    }

    #[test]
    fn test_unique_ids() {
        let case = test_case();
        let a = RunRecord::new(&case);
        let b = RunRecord::new(&case);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_properties_last_write_wins() {
        let case = test_case();
        let mut record = RunRecord::new(&case);

        record.put("operations", 1000);
        record.put("operations", 2000);
        record.put("ops_per_second", 125.5);

        assert_eq!(record.get("operations"), Some(&Value::from(2000)));
        assert_eq!(record.get("ops_per_second"), Some(&Value::from(125.5)));
        assert_eq!(record.get("missing"), None);
    }

    #[test]
    fn test_engine_setters_finalize_timing() {
        let case = test_case();
        let mut record = RunRecord::new(&case);
        let date = Utc::now();

        record.set_iteration(3);
        record.set_start_ms(1_000);
        record.set_end_ms(1_250);
        record.set_duration_ms(250);
        record.set_date(date);

        assert_eq!(record.iteration(), 3);
        assert_eq!(record.start_ms(), 1_000);
        assert_eq!(record.end_ms(), 1_250);
        assert_eq!(record.duration_ms(), 250);
        assert_eq!(record.date(), date);
    }

    #[test]
    fn test_failure_capture() {
        let case = test_case();
        let mut record = RunRecord::new(&case);
        assert!(record.is_success());

        record.set_failure("connection refused".to_string());
        assert!(!record.is_success());
        assert_eq!(record.failure(), Some("connection refused"));
    }

    #[test]
    fn test_serde_serialization() {
        let case = test_case();
        let mut record = RunRecord::new(&case);
        record.set_iteration(1);
        record.set_start_ms(10);
        record.set_end_ms(30);
        record.set_duration_ms(20);
        record.put("checksum", "abc123");

        let json = serde_json::to_string(&record).expect("Failed to serialize to JSON");
        let deserialized: RunRecord =
            serde_json::from_str(&json).expect("Failed to deserialize from JSON");

        assert_eq!(record.id(), deserialized.id());
        assert_eq!(record.test_case_id(), deserialized.test_case_id());
        assert_eq!(record.duration_ms(), deserialized.duration_ms());
        assert_eq!(deserialized.get("checksum"), Some(&Value::from("abc123")));
    }
}
