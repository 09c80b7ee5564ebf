//! Static declarations of test methods and composite types.
//!
//! These stand in for runtime reflection: a suite lists its methods, their
//! parameters with declared types, and the raw doc text that annotations are
//! parsed from. Composite types are described by [`ClassDescriptor`]s held in
//! a [`ClassRegistry`].

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::FactoryError;
use crate::value::{Object, Value};

/// A declared parameter or element type, as written in a signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredType {
    pub name: String,
    pub nullable: bool,
    /// Element type of a declared array, when the signature carries one
    pub element: Option<Box<DeclaredType>>,
    /// Inclusive bounds of a declared `int` narrower than `i64`
    pub int_range: Option<(i64, i64)>,
}

impl DeclaredType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nullable: false,
            element: None,
            int_range: None,
        }
    }

    /// An `int` whose values must lie within `min..=max`
    pub fn int_range(min: i64, max: i64) -> Self {
        Self {
            int_range: Some((min, max)),
            ..Self::new("int")
        }
    }

    /// An `array` whose elements have the given declared type
    pub fn array_of(element: DeclaredType) -> Self {
        Self {
            element: Some(Box::new(element)),
            ..Self::new("array")
        }
    }

    /// Parse a `?type` token
    pub fn parse(token: &str) -> Self {
        match token.strip_prefix('?') {
            Some(name) => Self::new(name).nullable(),
            None => Self::new(token),
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nullable {
            write!(f, "?")?;
        }
        match &self.element {
            Some(element) => write!(f, "array<{}>", element),
            None => write!(f, "{}", self.name),
        }
    }
}

/// A parameter of a method or constructor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDeclaration {
    pub name: String,
    /// `None` when the parameter has no declared type
    pub declared: Option<DeclaredType>,
}

impl ParamDeclaration {
    pub fn new(name: impl Into<String>, declared: Option<DeclaredType>) -> Self {
        Self {
            name: name.into(),
            declared,
        }
    }
}

/// A method: name, ordered parameters and raw doc comment text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDeclaration {
    pub name: String,
    pub params: Vec<ParamDeclaration>,
    pub doc: String,
}

impl MethodDeclaration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            doc: String::new(),
        }
    }

    /// Set the doc comment text
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }

    /// Add a parameter with a declared type such as `int` or `?string`
    pub fn param(self, name: impl Into<String>, declared: &str) -> Self {
        self.param_declaration(ParamDeclaration::new(name, Some(DeclaredType::parse(declared))))
    }

    /// Add a parameter without a declared type
    pub fn untyped_param(self, name: impl Into<String>) -> Self {
        self.param_declaration(ParamDeclaration::new(name, None))
    }

    pub fn param_declaration(mut self, param: ParamDeclaration) -> Self {
        self.params.push(param);
        self
    }
}

/// A public, writable property of a class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDeclaration {
    pub name: String,
    /// Raw doc comment, if the property has one
    pub doc: Option<String>,
}

impl PropertyDeclaration {
    /// A property without a doc comment
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            doc: None,
        }
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }
}

type Instantiate = dyn Fn(Vec<Value>) -> Result<Object, FactoryError> + Send + Sync;

/// Constructor and public properties of a composite type
#[derive(Clone)]
pub struct ClassDescriptor {
    name: String,
    constructor: MethodDeclaration,
    properties: Vec<PropertyDeclaration>,
    instantiate: Option<Arc<Instantiate>>,
}

impl ClassDescriptor {
    /// Describe a class whose constructor stores each argument under its parameter name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constructor: MethodDeclaration::new("new"),
            properties: Vec::new(),
            instantiate: None,
        }
    }

    /// Set the constructor's doc comment (`@param` annotations)
    pub fn constructor_doc(mut self, doc: impl Into<String>) -> Self {
        self.constructor.doc = doc.into();
        self
    }

    pub fn constructor_param(mut self, param: ParamDeclaration) -> Self {
        self.constructor.params.push(param);
        self
    }

    pub fn property(mut self, property: PropertyDeclaration) -> Self {
        self.properties.push(property);
        self
    }

    /// Replace the default constructor
    pub fn instantiate_with<F>(mut self, instantiate: F) -> Self
    where
        F: Fn(Vec<Value>) -> Result<Object, FactoryError> + Send + Sync + 'static,
    {
        self.instantiate = Some(Arc::new(instantiate));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn constructor(&self) -> &MethodDeclaration {
        &self.constructor
    }

    pub fn properties(&self) -> &[PropertyDeclaration] {
        &self.properties
    }

    /// Run the constructor with bound arguments
    pub fn instantiate(&self, args: Vec<Value>) -> Result<Object, FactoryError> {
        if let Some(instantiate) = &self.instantiate {
            return instantiate(args);
        }

        let expected = self.constructor.params.len();
        if args.len() != expected {
            return Err(FactoryError::ArgumentCount {
                method: format!("{}::{}", self.name, self.constructor.name),
                expected,
                found: args.len(),
            });
        }

        let mut object = Object::new(&self.name);
        for (param, value) in self.constructor.params.iter().zip(args) {
            object.set(&param.name, value);
        }
        Ok(object)
    }
}

impl fmt::Debug for ClassDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassDescriptor")
            .field("name", &self.name)
            .field("constructor", &self.constructor)
            .field("properties", &self.properties)
            .field("custom_instantiate", &self.instantiate.is_some())
            .finish()
    }
}

/// Registry of composite types, keyed by class name
#[derive(Debug, Clone, Default)]
pub struct ClassRegistry {
    classes: HashMap<String, ClassDescriptor>,
}

impl ClassRegistry {
    /// Create a new empty class registry
    pub fn new() -> Self {
        Self {
            classes: HashMap::new(),
        }
    }

    /// Register a class, replacing any previous one with the same name
    pub fn register(&mut self, class: ClassDescriptor) {
        self.classes.insert(class.name.clone(), class);
    }

    pub fn get(&self, name: &str) -> Option<&ClassDescriptor> {
        self.classes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.classes.remove(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_type_parse() {
        assert_eq!(DeclaredType::parse("int"), DeclaredType::new("int"));
        assert_eq!(
            DeclaredType::parse("?string"),
            DeclaredType::new("string").nullable()
        );
        assert_eq!(
            DeclaredType::array_of(DeclaredType::new("int").nullable()).to_string(),
            "array<?int>"
        );
    }

    #[test]
    fn test_method_declaration_builder() {
        let method = MethodDeclaration::new("test_pair")
            .doc("@param string $b [email]")
            .param("a", "?int")
            .untyped_param("b");

        assert_eq!(method.params.len(), 2);
        assert_eq!(method.params[0].name, "a");
        assert_eq!(
            method.params[0].declared,
            Some(DeclaredType::new("int").nullable())
        );
        assert_eq!(method.params[1].declared, None);
        assert!(method.doc.contains("@param"));
    }

    #[test]
    fn test_default_instantiate_stores_arguments() {
        let class = ClassDescriptor::new("User")
            .constructor_param(ParamDeclaration::new("name", Some(DeclaredType::new("string"))));

        let object = class.instantiate(vec![Value::from("Ada")]).unwrap();
        assert_eq!(object.class(), "User");
        assert_eq!(object.get("name"), Some(&Value::from("Ada")));

        let error = class.instantiate(vec![]).unwrap_err();
        assert_eq!(
            error,
            FactoryError::ArgumentCount {
                method: "User::new".to_string(),
                expected: 1,
                found: 0,
            }
        );
    }

    #[test]
    fn test_custom_instantiate() {
        let class = ClassDescriptor::new("Point").instantiate_with(|args| {
            let mut object = Object::new("Point");
            object.set("count", Value::Int(args.len() as i64));
            Ok(object)
        });

        let object = class.instantiate(vec![Value::Null, Value::Null]).unwrap();
        assert_eq!(object.get("count"), Some(&Value::Int(2)));
    }

    #[test]
    fn test_class_registry_basic_operations() {
        let mut registry = ClassRegistry::new();
        assert!(registry.is_empty());

        registry.register(ClassDescriptor::new("User"));
        registry.register(ClassDescriptor::new("Account"));
        assert_eq!(registry.len(), 2);
        assert!(registry.contains("User"));
        assert_eq!(registry.get("Account").map(|c| c.name()), Some("Account"));

        assert!(registry.remove("User"));
        assert!(!registry.remove("User"));
        assert_eq!(registry.len(), 1);
    }
}
