//! # Factory - annotation-driven argument generation for property tests
//!
//! Factory runs every `test*` method of a suite many times, each time with
//! freshly generated random arguments. What gets generated comes from each
//! parameter's declared type, refined by doc-comment annotations:
//!
//! ```text
//! @param string[5] $names            an array of exactly five strings
//! @param ?int[] $counts              an array of nullable ints, any length
//! @param string $to recipient [email]  a string from the "email" generator
//! @iterations 20                     run 20 times instead of 100
//! ```
//!
//! Failing iterations never stop a run: assertion failures and errors are
//! reported to a [`TestListener`] and the next iteration starts.
//!
//! ## Quick Start
//!
//! ```rust
//! use factory::{Arguments, MethodDeclaration, Runner, SuiteBuilder, TestError};
//!
//! let suite = SuiteBuilder::new("Strings")
//!     .method(
//!         MethodDeclaration::new("test_email_has_at")
//!             .doc("@param string $address [email]\n@iterations 10")
//!             .param("address", "string"),
//!         |mut args: Arguments| -> Result<(), TestError> {
//!             let address: String = args.arg("address")?;
//!             if address.contains('@') {
//!                 Ok(())
//!             } else {
//!                 Err(TestError::assertion(format!("{} has no @", address)))
//!             }
//!         },
//!     )
//!     .build();
//!
//! let report = Runner::new().run_report(&suite);
//! assert!(report.was_successful());
//! ```

pub mod annotation;
pub mod argument;
pub mod binder;
pub mod config;
pub mod declaration;
pub mod error;
pub mod generator;
pub mod report;
pub mod rng;
pub mod runner;
pub mod subkind;
pub mod suite;
pub mod type_spec;
pub mod value;
pub mod value_gen;

pub use annotation::{Annotations, TypeAnnotation};
pub use argument::{Argument, Arguments, TestReturn};
pub use config::{ConfigError, GeneratorConfig, RunnerConfig};
pub use declaration::{
    ClassDescriptor, ClassRegistry, DeclaredType, MethodDeclaration, ParamDeclaration,
    PropertyDeclaration,
};
pub use error::{FactoryError, TestError};
pub use generator::{FnGenerator, Generator, OneOfGenerator, from_fn};
pub use report::{Fault, TestId, TestListener, TestReport, UnitReport};
pub use rng::{DefaultRngProvider, RngProvider, create_rng, create_seeded_rng};
pub use runner::{Outcome, RunSummary, Runner, TEST_PREFIX};
pub use subkind::SubKindRegistry;
pub use suite::{Suite, SuiteBuilder, TestSuite};
pub use type_spec::{
    ArraySpec, Kind, MixedSpec, Nullability, ParameterDescriptor, PropertyDescriptor,
    TestCaseDescriptor, TypeSpec,
};
pub use value::{Object, Value};
pub use value_gen::ValueGenerator;

#[cfg(feature = "derive")]
pub use factory_derive::{Factory, factory_suite};
