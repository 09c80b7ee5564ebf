//! Core generator trait and small building blocks.

use crate::config::GeneratorConfig;

/// Core generator trait for creating random test data
pub trait Generator<T> {
    /// Generate a random value of type T using the provided RNG and configuration
    fn generate(&self, rng: &mut dyn rand::RngCore, config: &GeneratorConfig) -> T;
}

impl<T, G: Generator<T> + ?Sized> Generator<T> for Box<G> {
    fn generate(&self, rng: &mut dyn rand::RngCore, config: &GeneratorConfig) -> T {
        (**self).generate(rng, config)
    }
}

/// A generator backed by a closure
pub struct FnGenerator<F> {
    f: F,
}

impl<T, F> Generator<T> for FnGenerator<F>
where
    F: Fn(&mut dyn rand::RngCore, &GeneratorConfig) -> T,
{
    fn generate(&self, rng: &mut dyn rand::RngCore, config: &GeneratorConfig) -> T {
        (self.f)(rng, config)
    }
}

/// Create a generator from a closure
pub fn from_fn<T, F>(f: F) -> FnGenerator<F>
where
    F: Fn(&mut dyn rand::RngCore, &GeneratorConfig) -> T,
{
    FnGenerator { f }
}

/// Picks uniformly from a fixed list of words
#[derive(Debug, Clone)]
pub struct OneOfGenerator {
    choices: &'static [&'static str],
}

impl OneOfGenerator {
    /// Create a generator over a non-empty word list
    pub fn new(choices: &'static [&'static str]) -> Self {
        Self { choices }
    }
}

impl Generator<String> for OneOfGenerator {
    fn generate(&self, rng: &mut dyn rand::RngCore, _config: &GeneratorConfig) -> String {
        use rand::seq::SliceRandom;

        self.choices
            .choose(rng)
            .map(|choice| choice.to_string())
            .unwrap_or_default()
    }
}
