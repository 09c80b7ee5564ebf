//! Discovery and iteration of test methods.

use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use tracing::{debug, info};

use crate::annotation;
use crate::binder;
use crate::config::RunnerConfig;
use crate::declaration::ClassRegistry;
use crate::error::{FactoryError, TestError};
use crate::report::{TestId, TestListener, TestReport};
use crate::rng::{DefaultRngProvider, RngProvider, create_rng};
use crate::subkind::SubKindRegistry;
use crate::suite::TestSuite;
use crate::type_spec::{ParameterDescriptor, TestCaseDescriptor};
use crate::value::Value;
use crate::value_gen::ValueGenerator;

/// Methods whose name starts with this are tests
pub const TEST_PREFIX: &str = "test";

/// Result of a single iteration, with time elapsed since the method started
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Pass { elapsed: Duration },
    Failure { detail: String, elapsed: Duration },
    Error { detail: String, elapsed: Duration },
}

/// Totals of one suite run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub tests: usize,
    pub iterations: usize,
    pub failures: usize,
    pub errors: usize,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.failures == 0 && self.errors == 0
    }
}

/// Runs every test method of a suite with freshly generated arguments
#[derive(Debug)]
pub struct Runner<R = StdRng> {
    config: RunnerConfig,
    sub_kinds: SubKindRegistry,
    rng: R,
}

impl Runner<StdRng> {
    /// Runner with the default configuration and an entropy-seeded RNG
    pub fn new() -> Self {
        Self {
            config: RunnerConfig::default(),
            sub_kinds: SubKindRegistry::new(),
            rng: create_rng(),
        }
    }

    /// Runner seeded from `config.seed` when set
    pub fn with_config(config: RunnerConfig) -> Result<Self, FactoryError> {
        let rng = DefaultRngProvider.create_rng(config.seed);
        Self::with_rng(config, rng)
    }
}

impl Default for Runner<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: rand::RngCore> Runner<R> {
    /// Runner drawing from the given random source
    pub fn with_rng(config: RunnerConfig, rng: R) -> Result<Self, FactoryError> {
        config.validate()?;
        Ok(Self {
            config,
            sub_kinds: SubKindRegistry::new(),
            rng,
        })
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    pub fn sub_kinds(&self) -> &SubKindRegistry {
        &self.sub_kinds
    }

    /// Register custom string sub-kinds here
    pub fn sub_kinds_mut(&mut self) -> &mut SubKindRegistry {
        &mut self.sub_kinds
    }

    /// Test cases of a suite in declaration order
    pub fn discover(&self, suite: &dyn TestSuite) -> Vec<TestCaseDescriptor> {
        suite
            .methods()
            .iter()
            .filter(|method| method.name.starts_with(TEST_PREFIX))
            .map(|method| annotation::test_case(method, self.config.default_iterations))
            .collect()
    }

    /// Total number of iterations a run of the suite performs
    pub fn count(&self, suite: &dyn TestSuite) -> usize {
        self.discover(suite)
            .iter()
            .map(|test_case| test_case.iterations)
            .sum()
    }

    /// Run every test method, reporting outcomes to `listener`
    ///
    /// Nothing raised while binding or invoking stops the run: it is recorded
    /// as a failure or error and iteration continues.
    pub fn run(
        &mut self,
        suite: &dyn TestSuite,
        listener: &mut dyn TestListener,
    ) -> RunSummary {
        let test_cases = self.discover(suite);

        let mut classes = ClassRegistry::new();
        suite.register_classes(&mut classes);

        let Self {
            config,
            sub_kinds,
            rng,
        } = self;
        let mut generator = ValueGenerator::new(&classes, sub_kinds, &config.generator_config);

        let run_started = Instant::now();
        let mut summary = RunSummary::default();

        for test_case in &test_cases {
            let id = TestId::new(suite.name(), &test_case.name);
            info!(test = %id, iterations = test_case.iterations, "starting test");

            listener.start_test(&id);
            let started = Instant::now();
            let mut failures = 0;
            let mut errors = 0;

            for iteration in 0..test_case.iterations {
                match run_iteration(suite, test_case, &mut generator, &mut *rng, started) {
                    Outcome::Pass { .. } => {}
                    Outcome::Failure { detail, elapsed } => {
                        debug!(test = %id, iteration, %detail, "iteration failed");
                        listener.add_failure(&id, &detail, elapsed);
                        failures += 1;
                    }
                    Outcome::Error { detail, elapsed } => {
                        debug!(test = %id, iteration, %detail, "iteration errored");
                        listener.add_error(&id, &detail, elapsed);
                        errors += 1;
                    }
                }
            }

            let elapsed = started.elapsed();
            listener.end_test(&id, elapsed);
            info!(test = %id, failures, errors, ?elapsed, "finished test");

            summary.tests += 1;
            summary.iterations += test_case.iterations;
            summary.failures += failures;
            summary.errors += errors;
        }

        summary.elapsed = run_started.elapsed();
        summary
    }

    /// Run the suite into a fresh [`TestReport`]
    pub fn run_report(&mut self, suite: &dyn TestSuite) -> TestReport {
        let mut report = TestReport::new();
        self.run(suite, &mut report);
        report
    }
}

/// Bind fresh arguments and invoke the method once
fn run_iteration(
    suite: &dyn TestSuite,
    test_case: &TestCaseDescriptor,
    generator: &mut ValueGenerator<'_>,
    rng: &mut dyn rand::RngCore,
    started: Instant,
) -> Outcome {
    generator.reset();
    let mut arguments = None;
    let result = panic::catch_unwind(AssertUnwindSafe(|| -> Result<(), TestError> {
        let args = binder::bind(generator, rng, test_case)?;
        arguments = Some(render_arguments(&test_case.parameters, &args));
        suite.invoke(&test_case.name, args)
    }));
    let elapsed = started.elapsed();

    let error = match result {
        Ok(Ok(())) => return Outcome::Pass { elapsed },
        Ok(Err(error)) => error,
        Err(payload) => panic_error(&*payload),
    };

    let detail = match arguments {
        Some(arguments) if !arguments.is_empty() => format!("{} with {}", error, arguments),
        _ => error.to_string(),
    };

    if error.is_assertion() {
        Outcome::Failure { detail, elapsed }
    } else {
        Outcome::Error { detail, elapsed }
    }
}

fn render_arguments(parameters: &[ParameterDescriptor], args: &[Value]) -> String {
    parameters
        .iter()
        .zip(args)
        .map(|(parameter, value)| format!("{} = {}", parameter.name, value))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Classify a panic: `assert!` family messages are assertion failures
fn panic_error(payload: &(dyn std::any::Any + Send)) -> TestError {
    let message = if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    };

    if message.starts_with("assertion") {
        TestError::assertion(message)
    } else {
        TestError::runtime(format!("panicked: {}", message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::argument::Arguments;
    use crate::declaration::MethodDeclaration;
    use crate::rng::create_seeded_rng;
    use crate::suite::SuiteBuilder;

    fn seeded_runner() -> Runner {
        Runner::with_config(RunnerConfig::default().seed(11)).unwrap()
    }

    #[test]
    fn test_discover_filters_and_keeps_order() {
        let suite = SuiteBuilder::new("Discovery")
            .method(MethodDeclaration::new("test_b"), |_| ())
            .method(MethodDeclaration::new("setup"), |_| ())
            .method(MethodDeclaration::new("test_a").doc("@iterations 3"), |_| ())
            .method(MethodDeclaration::new("Test_upper"), |_| ())
            .build();

        let runner = seeded_runner();
        let test_cases = runner.discover(&suite);
        let names: Vec<&str> = test_cases.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["test_b", "test_a"]);
        assert_eq!(test_cases[0].iterations, 100);
        assert_eq!(test_cases[1].iterations, 3);
        assert_eq!(runner.count(&suite), 103);
    }

    #[test]
    fn test_run_counts_iterations() {
        let suite = SuiteBuilder::new("Counting")
            .method(
                MethodDeclaration::new("test_int").param("a", "int"),
                |mut args: Arguments| -> Result<(), TestError> {
                    let _a: i64 = args.arg("a")?;
                    Ok(())
                },
            )
            .build();

        let mut runner = seeded_runner();
        let mut report = TestReport::new();
        let summary = runner.run(&suite, &mut report);

        assert_eq!(summary.tests, 1);
        assert_eq!(summary.iterations, 100);
        assert!(summary.is_success());
        assert!(report.was_successful());
        assert!(report.units()[0].is_ended());
    }

    #[test]
    fn test_failures_and_errors_are_classified() {
        let suite = SuiteBuilder::new("Mixed")
            .method(MethodDeclaration::new("test_fail").doc("@iterations 4"), |_| {
                Err::<(), _>(TestError::assertion("nope"))
            })
            .method(MethodDeclaration::new("test_error").doc("@iterations 2"), |_| {
                Err::<(), _>(TestError::runtime("broken"))
            })
            .method(
                MethodDeclaration::new("test_assert_panic").doc("@iterations 3"),
                |_| assert_eq!(1, 2),
            )
            .method(
                MethodDeclaration::new("test_other_panic").doc("@iterations 1"),
                |_| -> Result<(), TestError> { panic!("kaboom") },
            )
            .build();

        let mut runner = seeded_runner();
        let report = runner.run_report(&suite);

        let unit = |method: &str| report.unit(&TestId::new("Mixed", method)).unwrap();
        assert_eq!(unit("test_fail").failures.len(), 4);
        assert_eq!(unit("test_error").errors.len(), 2);
        assert_eq!(unit("test_assert_panic").failures.len(), 3);
        assert!(unit("test_assert_panic").failures[0].detail.contains("left: 1"));
        assert_eq!(unit("test_other_panic").errors.len(), 1);
        assert!(unit("test_other_panic").errors[0].detail.contains("panicked: kaboom"));
        assert_eq!(report.count(), 4);
    }

    #[test]
    fn test_failure_detail_includes_arguments() {
        let suite = SuiteBuilder::new("Detail")
            .method(
                MethodDeclaration::new("test_bool").doc("@iterations 1").param("flag", "bool"),
                |_| false,
            )
            .build();

        let report = seeded_runner().run_report(&suite);
        let detail = &report.units()[0].failures[0].detail;
        assert!(detail.starts_with("Assertion failed: test returned false with flag = "));
    }

    #[test]
    fn test_binding_error_is_recorded_per_iteration() {
        let suite = SuiteBuilder::new("Broken")
            .method(
                MethodDeclaration::new("test_ghost").doc("@iterations 5").param("g", "Ghost"),
                |_| (),
            )
            .method(MethodDeclaration::new("test_after").doc("@iterations 2"), |_| ())
            .build();

        let mut runner = seeded_runner();
        let report = runner.run_report(&suite);

        let ghost = &report.units()[0];
        assert_eq!(ghost.errors.len(), 5);
        assert_eq!(ghost.errors[0].detail, "Error: Class Ghost does not exist");
        assert!(report.units()[1].is_passed());
    }

    #[test]
    fn test_unparsable_iterations_do_not_abort_run() {
        let suite = SuiteBuilder::new("Loose")
            .method(MethodDeclaration::new("test_ok").doc("@iterations 2"), |_| ())
            .method(MethodDeclaration::new("test_suffix").doc("@iterations 5x"), |_| false)
            .method(MethodDeclaration::new("test_words").doc("@iterations many"), |_| false)
            .build();

        let mut report = TestReport::new();
        let summary = seeded_runner().run(&suite, &mut report);

        assert_eq!(summary.tests, 3);
        assert_eq!(summary.iterations, 7);
        assert_eq!(report.count(), 3);
        assert_eq!(report.units()[1].failures.len(), 5);
        assert!(report.units()[2].is_passed());
        assert!(report.units()[2].is_ended());
    }

    #[test]
    fn test_zero_iterations_still_brackets_test() {
        let suite = SuiteBuilder::new("Zero")
            .method(MethodDeclaration::new("test_none").doc("@iterations 0"), |_| false)
            .build();

        let report = seeded_runner().run_report(&suite);
        assert_eq!(report.count(), 1);
        assert!(report.was_successful());
        assert!(report.units()[0].is_ended());
    }

    #[test]
    fn test_runner_with_custom_rng() {
        let config = RunnerConfig::default().iterations(5);
        let runner = Runner::with_rng(config, create_seeded_rng(1)).unwrap();
        assert_eq!(runner.config().default_iterations, 5);
        assert!(runner.sub_kinds().contains("email"));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = RunnerConfig::default();
        config.generator_config.max_depth = 0;
        assert!(matches!(
            Runner::with_config(config),
            Err(FactoryError::Config(_))
        ));
    }

    #[test]
    fn test_panic_classification() {
        let error = panic_error(&"assertion failed: x > 0");
        assert!(error.is_assertion());

        let error = panic_error(&String::from("index out of bounds"));
        assert_eq!(error, TestError::runtime("panicked: index out of bounds"));

        let error = panic_error(&42u8);
        assert!(!error.is_assertion());
    }
}
