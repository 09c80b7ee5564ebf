//! Error types for generation, binding and test execution.

use std::fmt;

use crate::config::ConfigError;

/// Errors raised while generating, binding or converting arguments
#[derive(Debug, Clone, PartialEq)]
pub enum FactoryError {
    /// An empty or unresolvable type reached the generator
    InvalidInput { message: String },

    /// A string sub-kind tag has no registered generator
    UnknownSubKind { tag: String },

    /// An object type is not present in the class registry
    UnknownClass { class: String },

    /// Object construction nested deeper than the configured limit
    RecursionLimit { class: String, depth: usize },

    /// A generated value could not be converted into the requested Rust type
    Conversion {
        expected: String,
        found: String,
        context: Option<String>,
    },

    /// A method was invoked with the wrong number of arguments
    ArgumentCount {
        method: String,
        expected: usize,
        found: usize,
    },

    /// The suite has no method with the requested name
    UnknownMethod { method: String },

    /// A class constructor rejected its arguments
    Construction { class: String, message: String },

    /// Configuration error
    Config(ConfigError),
}

impl fmt::Display for FactoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FactoryError::InvalidInput { message } => write!(f, "Invalid input: {}", message),
            FactoryError::UnknownSubKind { tag } => {
                write!(f, "Unknown string sub-kind: [{}]", tag)
            }
            FactoryError::UnknownClass { class } => write!(f, "Class {} does not exist", class),
            FactoryError::RecursionLimit { class, depth } => write!(
                f,
                "Recursion limit of {} reached while constructing {}",
                depth, class
            ),
            FactoryError::Conversion {
                expected,
                found,
                context,
            } => {
                write!(f, "Expected {}, found {}", expected, found)?;
                if let Some(ctx) = context {
                    write!(f, " (context: {})", ctx)?;
                }
                Ok(())
            }
            FactoryError::ArgumentCount {
                method,
                expected,
                found,
            } => write!(
                f,
                "{} expects {} argument(s), {} given",
                method, expected, found
            ),
            FactoryError::UnknownMethod { method } => write!(f, "Method {} does not exist", method),
            FactoryError::Construction { class, message } => {
                write!(f, "Cannot construct {}: {}", class, message)
            }
            FactoryError::Config(error) => write!(f, "Configuration error: {}", error),
        }
    }
}

impl std::error::Error for FactoryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FactoryError::Config(error) => Some(error),
            _ => None,
        }
    }
}

impl From<ConfigError> for FactoryError {
    fn from(error: ConfigError) -> Self {
        FactoryError::Config(error)
    }
}

impl FactoryError {
    /// Create an invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create an unknown sub-kind error
    pub fn unknown_sub_kind(tag: impl Into<String>) -> Self {
        Self::UnknownSubKind { tag: tag.into() }
    }

    /// Create an unknown class error
    pub fn unknown_class(class: impl Into<String>) -> Self {
        Self::UnknownClass {
            class: class.into(),
        }
    }

    /// Create an unknown method error
    pub fn unknown_method(method: impl Into<String>) -> Self {
        Self::UnknownMethod {
            method: method.into(),
        }
    }

    /// Create a conversion error
    pub fn conversion(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::Conversion {
            expected: expected.into(),
            found: found.into(),
            context: None,
        }
    }

    /// Create a conversion error with context such as the parameter name
    pub fn conversion_with_context(
        expected: impl Into<String>,
        found: impl Into<String>,
        context: Option<impl Into<String>>,
    ) -> Self {
        Self::Conversion {
            expected: expected.into(),
            found: found.into(),
            context: context.map(|c| c.into()),
        }
    }

    /// Create a construction error
    pub fn construction(class: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Construction {
            class: class.into(),
            message: message.into(),
        }
    }

    /// Attach context to a conversion error; other variants are returned unchanged
    ///
    /// Context added later is the outer one and is listed first, so an
    /// element error reads `parameter xs, element 3`.
    pub fn in_context(self, ctx: impl Into<String>) -> Self {
        match self {
            FactoryError::Conversion {
                expected,
                found,
                context,
            } => {
                let ctx = ctx.into();
                FactoryError::Conversion {
                    expected,
                    found,
                    context: Some(match context {
                        Some(inner) => format!("{}, {}", ctx, inner),
                        None => ctx,
                    }),
                }
            }
            other => other,
        }
    }
}

/// Failure signalled by a test body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestError {
    /// The body's own correctness check failed
    Assertion { message: String },
    /// Anything else went wrong while binding or running the body
    Runtime { message: String },
}

impl TestError {
    /// Create an assertion failure
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::Assertion {
            message: message.into(),
        }
    }

    /// Create a runtime error
    pub fn runtime(message: impl Into<String>) -> Self {
        Self::Runtime {
            message: message.into(),
        }
    }

    /// Whether this is an assertion failure
    pub fn is_assertion(&self) -> bool {
        matches!(self, TestError::Assertion { .. })
    }

    /// The message without classification prefix
    pub fn message(&self) -> &str {
        match self {
            TestError::Assertion { message } | TestError::Runtime { message } => message,
        }
    }
}

impl fmt::Display for TestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestError::Assertion { message } => write!(f, "Assertion failed: {}", message),
            TestError::Runtime { message } => write!(f, "Error: {}", message),
        }
    }
}

impl std::error::Error for TestError {}

impl From<FactoryError> for TestError {
    fn from(error: FactoryError) -> Self {
        TestError::Runtime {
            message: error.to_string(),
        }
    }
}
