//! Test suites: declared methods plus a way to invoke them by name.

use std::fmt;
use std::sync::Arc;

use crate::argument::{Argument, Arguments, TestReturn};
use crate::declaration::{ClassDescriptor, ClassRegistry, MethodDeclaration};
use crate::error::{FactoryError, TestError};
use crate::value::Value;

/// A collection of test methods the runner can discover and invoke
///
/// Implemented by [`Suite`] (built with [`SuiteBuilder`]) and by the
/// `#[factory_suite]` attribute on an inherent `impl` block.
pub trait TestSuite {
    /// Name used in test identifiers
    fn name(&self) -> &str;

    /// Declared methods in declaration order; the runner keeps those named `test*`
    fn methods(&self) -> Vec<MethodDeclaration>;

    /// Register the classes the methods' parameters need
    fn register_classes(&self, _classes: &mut ClassRegistry) {}

    /// Invoke a method with bound arguments
    fn invoke(&self, method: &str, args: Vec<Value>) -> Result<(), TestError>;
}

type Body = dyn Fn(Arguments) -> Result<(), TestError> + Send + Sync;

/// A suite assembled at runtime from closures
#[derive(Clone)]
pub struct Suite {
    name: String,
    methods: Vec<(MethodDeclaration, Arc<Body>)>,
    classes: Vec<ClassDescriptor>,
    registrars: Vec<fn(&mut ClassRegistry)>,
}

impl TestSuite for Suite {
    fn name(&self) -> &str {
        &self.name
    }

    fn methods(&self) -> Vec<MethodDeclaration> {
        self.methods
            .iter()
            .map(|(declaration, _)| declaration.clone())
            .collect()
    }

    fn register_classes(&self, classes: &mut ClassRegistry) {
        for register in &self.registrars {
            register(classes);
        }
        for class in &self.classes {
            classes.register(class.clone());
        }
    }

    fn invoke(&self, method: &str, args: Vec<Value>) -> Result<(), TestError> {
        let (_, body) = self
            .methods
            .iter()
            .find(|(declaration, _)| declaration.name == method)
            .ok_or_else(|| FactoryError::unknown_method(method))?;
        body(Arguments::new(method, args))
    }
}

impl fmt::Debug for Suite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Suite")
            .field("name", &self.name)
            .field(
                "methods",
                &self.methods.iter().map(|(m, _)| &m.name).collect::<Vec<_>>(),
            )
            .field("classes", &self.classes)
            .finish()
    }
}

/// Builder for [`Suite`]
pub struct SuiteBuilder {
    suite: Suite,
}

impl SuiteBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            suite: Suite {
                name: name.into(),
                methods: Vec::new(),
                classes: Vec::new(),
                registrars: Vec::new(),
            },
        }
    }

    /// Add a class description
    pub fn class(mut self, class: ClassDescriptor) -> Self {
        self.suite.classes.push(class);
        self
    }

    /// Register the classes a typed argument needs, e.g. a `#[derive(Factory)]` struct
    pub fn register<T: Argument>(mut self) -> Self {
        self.suite.registrars.push(T::register_classes);
        self
    }

    /// Add a method and its body
    pub fn method<F, R>(mut self, declaration: MethodDeclaration, body: F) -> Self
    where
        F: Fn(Arguments) -> R + Send + Sync + 'static,
        R: TestReturn,
    {
        let body: Arc<Body> = Arc::new(move |args: Arguments| body(args).into_test_result());
        self.suite.methods.push((declaration, body));
        self
    }

    pub fn build(self) -> Suite {
        self.suite
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Suite {
        SuiteBuilder::new("Sample")
            .class(ClassDescriptor::new("User"))
            .method(
                MethodDeclaration::new("test_positive").param("a", "int"),
                |mut args: Arguments| -> Result<(), TestError> {
                    let a: i64 = args.arg("a")?;
                    if a >= 0 {
                        Ok(())
                    } else {
                        Err(TestError::assertion(format!("{} < 0", a)))
                    }
                },
            )
            .method(MethodDeclaration::new("helper"), |_| ())
            .build()
    }

    #[test]
    fn test_suite_declarations() {
        let suite = sample();
        assert_eq!(suite.name(), "Sample");

        let names: Vec<String> = suite.methods().into_iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["test_positive", "helper"]);

        let mut classes = ClassRegistry::new();
        suite.register_classes(&mut classes);
        assert!(classes.contains("User"));
    }

    #[test]
    fn test_suite_invoke() {
        let suite = sample();
        assert_eq!(suite.invoke("test_positive", vec![Value::Int(3)]), Ok(()));
        assert_eq!(
            suite.invoke("test_positive", vec![Value::Int(-3)]),
            Err(TestError::assertion("-3 < 0"))
        );

        let error = suite.invoke("test_positive", vec![Value::Bool(true)]).unwrap_err();
        assert!(!error.is_assertion());
        assert!(error.message().contains("parameter a"));

        assert_eq!(suite.invoke("helper", vec![]), Ok(()));
    }

    #[test]
    fn test_suite_unknown_method() {
        let error = sample().invoke("test_missing", vec![]).unwrap_err();
        assert_eq!(error.message(), "Method test_missing does not exist");
    }
}
