//! Benchmark engine
//!
//! Owns an ordered sequence of test cases and executes them one at a time:
//! a fresh driver per test case, the warmup phase entirely before the
//! measured phase, one run record per measured iteration. Driver runs
//! execute on the blocking pool; the engine itself is strictly sequential,
//! and the only concurrency is the one-shot shutdown timer for
//! duration-bounded cases.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::task;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::bench::timer::ShutdownTimer;
use crate::driver::{Driver, StopFlag};
use crate::models::{RunRecord, TestCase};
use crate::{BenchError, Result};

/// An ordered collection of test cases executed in insertion order.
///
/// The benchmark holds no results of its own; each test case owns the
/// records its iterations produce. `run` clears all prior results first, so
/// re-running a benchmark is idempotent with respect to stale records.
#[derive(Debug)]
pub struct Benchmark {
    id: String,
    name: String,
    cases: Vec<TestCase>,
}

impl Benchmark {
    /// Creates an empty benchmark.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            cases: Vec::new(),
        }
    }

    /// Unique id of this benchmark
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Appends a test case; execution order is insertion order.
    pub fn add(&mut self, case: TestCase) {
        self.cases.push(case);
    }

    /// The test cases, in execution order. Inspect their records after
    /// `run` to discover which iterations failed and with what detail.
    pub fn test_cases(&self) -> &[TestCase] {
        &self.cases
    }

    /// Executes every test case once, in insertion order, returning only
    /// after all complete. Iteration-level driver failures are captured on
    /// their records and do not stop the benchmark; driver instantiation
    /// failures, `set_up` failures and timer failures abort the whole run.
    pub async fn run(&mut self) -> Result<()> {
        info!(
            benchmark = %self.name,
            id = %self.id,
            test_cases = self.cases.len(),
            "starting benchmark"
        );

        for case in &mut self.cases {
            case.clear_results();
        }

        let started = Instant::now();
        let total = self.cases.len();
        for (position, case) in self.cases.iter_mut().enumerate() {
            run_case(case, position + 1, total).await?;
        }

        info!(
            elapsed = %humantime::format_duration(truncate_to_millis(started.elapsed())),
            "benchmark completed"
        );
        Ok(())
    }
}

/// Runs all warmup and measured iterations of one test case with a single
/// driver instance.
async fn run_case(case: &mut TestCase, position: usize, total: usize) -> Result<()> {
    case.validate()?;

    info!(case = case.name(), "starting test case {}/{}", position, total);
    info!(driver = case.driver().name(), "instantiating driver");
    let mut driver = case.driver().instantiate()?;
    let stop = StopFlag::new();

    if case.warmup_iterations() > 0 {
        info!(iterations = case.warmup_iterations(), "starting warmup");
        for iteration in 1..=case.warmup_iterations() {
            let (returned, _discarded) = run_iteration(case, driver, &stop, iteration, true).await?;
            driver = returned;
        }
        info!("finished warmup");
    } else {
        info!("skipping warmup");
    }

    info!(iterations = case.iterations(), "executing measured iterations");
    for iteration in 1..=case.iterations() {
        let (returned, record) = run_iteration(case, driver, &stop, iteration, false).await?;
        driver = returned;
        case.add_result(record);
    }

    Ok(())
}

/// Runs one iteration: reset flag, arm the timer if bounded, set_up, run on
/// the blocking pool with panic capture, finalize the record, tear_down,
/// then wait for the timer. The bound starts counting before `set_up`, so
/// setup time is charged against it. The driver is moved through the blocking task
/// and handed back so it persists across iterations.
async fn run_iteration(
    case: &TestCase,
    mut driver: Box<dyn Driver>,
    stop: &StopFlag,
    iteration: u64,
    warmup: bool,
) -> Result<(Box<dyn Driver>, RunRecord)> {
    if warmup {
        info!(
            case = case.name(),
            "running warmup iteration {}/{}",
            iteration,
            case.warmup_iterations()
        );
    } else {
        info!(
            case = case.name(),
            "running iteration {}/{}",
            iteration,
            case.iterations()
        );
    }

    let mut record = RunRecord::new(case);

    // the flag is reset before arming so a timer from a previous iteration
    // can never satisfy this one's bound
    stop.reset();
    let timer = case.duration().map(|bound| {
        info!(
            bound = %humantime::format_duration(bound),
            "running with duration bound"
        );
        ShutdownTimer::arm(bound, stop.clone())
    });

    debug!("setting up driver");
    driver
        .set_up()
        .map_err(|e| BenchError::DriverSetUp(format!("driver '{}': {}", case.driver().name(), e)))?;

    let date = Utc::now();
    let start_ms = date.timestamp_millis();

    let run_stop = stop.clone();
    let (mut driver, mut record, outcome) = task::spawn_blocking(move || {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| driver.run(&run_stop, &mut record)));
        (driver, record, outcome)
    })
    .await?;

    let end_ms = Utc::now().timestamp_millis();

    record.set_iteration(iteration);
    record.set_start_ms(start_ms);
    record.set_end_ms(end_ms);
    record.set_duration_ms(end_ms - start_ms);
    record.set_date(date);

    info!(
        took = %humantime::format_duration(Duration::from_millis((end_ms - start_ms).max(0) as u64)),
        "iteration finished"
    );

    match outcome {
        Ok(Ok(())) => {
            debug!("processing results");
            driver.process_results(&mut record);
        }
        Ok(Err(e)) => {
            warn!(error = %e, "driver run failed, continuing with the next iteration");
            record.set_failure(e.to_string());
        }
        Err(payload) => {
            let message = panic_message(payload);
            warn!(error = %message, "driver run panicked, continuing with the next iteration");
            record.set_failure(message);
        }
    }

    debug!("tearing down driver");
    driver.tear_down();

    if let Some(timer) = timer {
        debug!("waiting for shutdown timer to finish");
        timer.wait().await?;
    }

    Ok((driver, record))
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "driver panicked".to_string()
    }
}

fn truncate_to_millis(duration: Duration) -> Duration {
    Duration::from_millis(duration.as_millis() as u64)
}
