//! Outcome recording.
//!
//! The runner reports through [`TestListener`] only. [`TestReport`] is the
//! collecting implementation, formatted in the style of `cargo test` output.

use std::fmt;
use std::time::Duration;

/// Identifies one test method of one suite
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct TestId {
    pub suite: String,
    pub method: String,
}

impl TestId {
    pub fn new(suite: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            suite: suite.into(),
            method: method.into(),
        }
    }
}

impl fmt::Display for TestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.suite, self.method)
    }
}

/// Sink for test outcomes
///
/// `start_test` and `end_test` bracket each method exactly once; failures and
/// errors are reported per iteration in between. Elapsed times are measured
/// from the method's start.
pub trait TestListener {
    fn start_test(&mut self, id: &TestId);

    fn add_failure(&mut self, id: &TestId, detail: &str, elapsed: Duration);

    fn add_error(&mut self, id: &TestId, detail: &str, elapsed: Duration);

    fn end_test(&mut self, id: &TestId, elapsed: Duration);
}

/// A recorded failure or error
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct Fault {
    pub detail: String,
    pub elapsed: Duration,
}

/// Everything recorded for one test method
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct UnitReport {
    pub id: TestId,
    pub failures: Vec<Fault>,
    pub errors: Vec<Fault>,
    /// Set once the method has ended
    pub elapsed: Option<Duration>,
}

impl UnitReport {
    fn new(id: TestId) -> Self {
        Self {
            id,
            failures: Vec::new(),
            errors: Vec::new(),
            elapsed: None,
        }
    }

    pub fn is_passed(&self) -> bool {
        self.failures.is_empty() && self.errors.is_empty()
    }

    pub fn is_ended(&self) -> bool {
        self.elapsed.is_some()
    }
}

/// Collecting [`TestListener`]
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct TestReport {
    units: Vec<UnitReport>,
}

impl TestReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports in start order
    pub fn units(&self) -> &[UnitReport] {
        &self.units
    }

    pub fn unit(&self, id: &TestId) -> Option<&UnitReport> {
        self.units.iter().find(|unit| &unit.id == id)
    }

    /// Number of started tests
    pub fn count(&self) -> usize {
        self.units.len()
    }

    pub fn failure_count(&self) -> usize {
        self.units.iter().map(|unit| unit.failures.len()).sum()
    }

    pub fn error_count(&self) -> usize {
        self.units.iter().map(|unit| unit.errors.len()).sum()
    }

    pub fn passed_count(&self) -> usize {
        self.units.iter().filter(|unit| unit.is_passed()).count()
    }

    pub fn was_successful(&self) -> bool {
        self.units.iter().all(UnitReport::is_passed)
    }

    /// Total time across ended tests
    pub fn elapsed(&self) -> Duration {
        self.units.iter().filter_map(|unit| unit.elapsed).sum()
    }

    #[cfg(feature = "json")]
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    fn unit_mut(&mut self, id: &TestId) -> &mut UnitReport {
        match self.units.iter().position(|unit| &unit.id == id) {
            Some(index) => &mut self.units[index],
            None => {
                self.units.push(UnitReport::new(id.clone()));
                let last = self.units.len() - 1;
                &mut self.units[last]
            }
        }
    }
}

impl TestListener for TestReport {
    fn start_test(&mut self, id: &TestId) {
        self.unit_mut(id);
    }

    fn add_failure(&mut self, id: &TestId, detail: &str, elapsed: Duration) {
        self.unit_mut(id).failures.push(Fault {
            detail: detail.to_string(),
            elapsed,
        });
    }

    fn add_error(&mut self, id: &TestId, detail: &str, elapsed: Duration) {
        self.unit_mut(id).errors.push(Fault {
            detail: detail.to_string(),
            elapsed,
        });
    }

    fn end_test(&mut self, id: &TestId, elapsed: Duration) {
        self.unit_mut(id).elapsed = Some(elapsed);
    }
}

impl fmt::Display for TestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for unit in &self.units {
            write!(f, "test {} ... ", unit.id)?;
            if unit.is_passed() {
                write!(f, "ok")?;
            } else {
                write!(
                    f,
                    "FAILED ({} failures, {} errors)",
                    unit.failures.len(),
                    unit.errors.len()
                )?;
            }
            match unit.elapsed {
                Some(elapsed) => writeln!(f, " ({:?})", elapsed)?,
                None => writeln!(f)?,
            }
        }

        let failing: Vec<&UnitReport> = self.units.iter().filter(|u| !u.is_passed()).collect();
        if !failing.is_empty() {
            writeln!(f, "\nfailures:")?;
            for unit in &failing {
                writeln!(f, "\n---- {} ----", unit.id)?;
                for fault in &unit.failures {
                    writeln!(f, "  failure: {}", fault.detail)?;
                }
                for fault in &unit.errors {
                    writeln!(f, "  error: {}", fault.detail)?;
                }
            }
        }

        write!(
            f,
            "\ntest result: {}. {} passed; {} failed; {} failures; {} errors; finished in {:?}",
            if self.was_successful() { "ok" } else { "FAILED" },
            self.passed_count(),
            failing.len(),
            self.failure_count(),
            self.error_count(),
            self.elapsed()
        )
    }
}
