//! Configuration types for controlling generation and test runs.

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Invalid maximum object nesting depth (must be > 0)
    InvalidMaxDepth(usize),
    /// Invalid maximum generic text length (must be >= 5)
    InvalidMaxTextLen(usize),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidMaxDepth(n) => {
                write!(f, "Invalid max depth: {} (must be > 0)", n)
            }
            ConfigError::InvalidMaxTextLen(n) => {
                write!(f, "Invalid max text length: {} (must be >= 5)", n)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Configuration for value generation
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    /// Upper bound (inclusive) for the length of arrays without a fixed length
    pub max_array_len: usize,
    /// Maximum nesting depth of constructed objects
    pub max_depth: usize,
    /// Upper bound for the character count of generic text
    pub max_text_len: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_array_len: 99,
            max_depth: 32,
            max_text_len: 200,
        }
    }
}

impl GeneratorConfig {
    /// Create a new generator configuration with validation
    pub fn new(
        max_array_len: usize,
        max_depth: usize,
        max_text_len: usize,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            max_array_len,
            max_depth,
            max_text_len,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the generator configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::InvalidMaxDepth(self.max_depth));
        }
        if self.max_text_len < 5 {
            return Err(ConfigError::InvalidMaxTextLen(self.max_text_len));
        }
        Ok(())
    }
}

/// Configuration for a suite run
#[derive(Debug, Clone, PartialEq)]
pub struct RunnerConfig {
    /// Iterations for methods without an `@iterations` annotation
    pub default_iterations: usize,
    /// Optional seed for reproducible runs
    pub seed: Option<u64>,
    /// Generator configuration
    pub generator_config: GeneratorConfig,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            default_iterations: 100,
            seed: None,
            generator_config: GeneratorConfig::default(),
        }
    }
}

impl RunnerConfig {
    /// Set the default iteration count
    pub fn iterations(mut self, n: usize) -> Self {
        self.default_iterations = n;
        self
    }

    /// Set a specific random seed
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the generator configuration
    pub fn generator_config(mut self, generator_config: GeneratorConfig) -> Self {
        self.generator_config = generator_config;
        self
    }

    /// Validate the runner configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.generator_config.validate()
    }
}
