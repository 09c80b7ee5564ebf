//! Argument tuples for methods and constructors.

use crate::error::FactoryError;
use crate::type_spec::{ParameterDescriptor, TestCaseDescriptor};
use crate::value::Value;
use crate::value_gen::ValueGenerator;

/// Generate one value per parameter, in declaration order
pub fn bind_parameters(
    generator: &mut ValueGenerator<'_>,
    rng: &mut dyn rand::RngCore,
    parameters: &[ParameterDescriptor],
) -> Result<Vec<Value>, FactoryError> {
    parameters
        .iter()
        .map(|parameter| generator.generate(rng, &parameter.spec))
        .collect()
}

/// Generate a fresh argument tuple for a test case
pub fn bind(
    generator: &mut ValueGenerator<'_>,
    rng: &mut dyn rand::RngCore,
    test_case: &TestCaseDescriptor,
) -> Result<Vec<Value>, FactoryError> {
    bind_parameters(generator, rng, &test_case.parameters)
}
