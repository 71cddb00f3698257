//! Driver contract for pluggable benchmark workloads
//!
//! A driver is the workload under measurement. The engine creates a fresh
//! instance per test case, cycles it through
//! set_up -> run -> process_results -> tear_down on every iteration, and
//! signals duration-bounded runs to stop through a shared [`StopFlag`].

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::models::RunRecord;
use crate::{BenchError, Result};

/// Error type drivers may return from their hooks.
pub type DriverError = Box<dyn std::error::Error + Send + Sync>;

/// Result type alias for driver hooks.
pub type DriverResult<T> = std::result::Result<T, DriverError>;

/// A benchmark workload.
///
/// Only `run` is mandatory; the remaining hooks default to no-ops. `run` is
/// executed on a blocking thread and is expected to poll the supplied
/// [`StopFlag`] at its own granularity so duration-bounded test cases can
/// finish near their bound. Polling is best-effort and driver-cooperative:
/// the engine never preempts a running driver, so a driver that ignores the
/// flag simply runs past the bound.
pub trait Driver: Send {
    /// Allocates per-iteration resources. A failure here aborts the whole
    /// benchmark; it is not a recoverable iteration failure.
    fn set_up(&mut self) -> DriverResult<()> {
        Ok(())
    }

    /// Executes the workload once. Observations that do not depend on the
    /// engine's timing can be written into the record's properties bag.
    /// Returning an error (or panicking) marks the iteration as failed;
    /// the benchmark continues with the next iteration.
    fn run(&mut self, stop: &StopFlag, record: &mut RunRecord) -> DriverResult<()>;

    /// Computes derived statistics after a successful `run` and stores them
    /// in the record. Skipped when `run` failed.
    fn process_results(&mut self, _record: &mut RunRecord) {}

    /// Releases per-iteration resources. Invoked unconditionally after
    /// `run`/`process_results`, whether or not `run` failed.
    fn tear_down(&mut self) {}
}

impl fmt::Debug for dyn Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("dyn Driver")
    }
}

/// Cooperative stop signal shared between the engine, the shutdown timer and
/// an in-flight `run` call.
///
/// One context may set the flag while another polls it; no other state is
/// shared between the timer and the running driver. The engine resets the
/// flag before every iteration's `set_up`.
#[derive(Debug, Clone, Default)]
pub struct StopFlag {
    inner: Arc<AtomicBool>,
}

impl StopFlag {
    /// Creates a flag in the unset state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests a cooperative stop.
    pub fn set(&self) {
        self.inner.store(true, Ordering::Release);
    }

    /// Polls whether a stop has been requested.
    pub fn is_set(&self) -> bool {
        self.inner.load(Ordering::Acquire)
    }

    /// Clears the flag. Engine-owned: called before each iteration's
    /// `set_up`, never by drivers.
    pub(crate) fn reset(&self) {
        self.inner.store(false, Ordering::Release);
    }
}

/// Factory producing fresh driver instances on demand.
pub type DriverFactory = Arc<dyn Fn() -> DriverResult<Box<dyn Driver>> + Send + Sync>;

/// Opaque driver identity: a display name plus a factory the engine uses to
/// instantiate a fresh driver per test case.
#[derive(Clone)]
pub struct DriverSpec {
    name: String,
    factory: DriverFactory,
}

impl DriverSpec {
    /// Creates a driver spec from a name and a factory closure.
    pub fn new<F>(name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> DriverResult<Box<dyn Driver>> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            factory: Arc::new(factory),
        }
    }

    /// Display name of the driver.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Produces a new, independent driver instance. Factory failure is a
    /// fatal engine error.
    pub fn instantiate(&self) -> Result<Box<dyn Driver>> {
        (self.factory)()
            .map_err(|e| BenchError::DriverInit(format!("driver '{}': {}", self.name, e)))
    }
}

impl fmt::Debug for DriverSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverSpec").field("name", &self.name).finish()
    }
}
