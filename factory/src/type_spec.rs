//! Semantic descriptions of the values to generate.

use std::fmt;

/// How a generated value may be null
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nullability {
    /// Never null
    NonNull,
    /// Null on a fair coin flip
    Nullable,
    /// Whether null is allowed at all is itself decided per generation call
    CoinFlip,
}

/// Array constraints: element type and fixed length, both optional
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArraySpec {
    /// Declared element type; `None` picks a scalar kind once per array
    pub element: Option<Box<TypeSpec>>,
    /// Fixed length; `None` draws a random length
    pub length: Option<usize>,
}

/// Refinements carried by `mixed` for when it resolves to an array or a string
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MixedSpec {
    pub array: ArraySpec,
    pub sub_kind: Option<String>,
}

/// The kind of value to generate
#[derive(Debug, Clone, PartialEq)]
pub enum Kind {
    Bool,
    Float,
    /// Integers drawn uniformly from `min..=max`
    Int { min: i64, max: i64 },
    String { sub_kind: Option<String> },
    Array(ArraySpec),
    Mixed(MixedSpec),
    /// A registered composite type, constructed by name
    Object { class: String },
}

impl Kind {
    /// Integers over the full `i64` range
    pub fn int() -> Self {
        Kind::Int {
            min: i64::MIN,
            max: i64::MAX,
        }
    }

    /// Resolve a type token. Built-in names match case-insensitively; anything
    /// else, including the empty token, names a class.
    pub fn from_type_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "bool" => Kind::Bool,
            "float" => Kind::Float,
            "int" => Kind::int(),
            "string" => Kind::String { sub_kind: None },
            "array" => Kind::Array(ArraySpec::default()),
            "mixed" => Kind::Mixed(MixedSpec::default()),
            _ => Kind::Object {
                class: name.to_string(),
            },
        }
    }

    /// Name of the kind as written in annotations
    pub fn name(&self) -> &str {
        match self {
            Kind::Bool => "bool",
            Kind::Float => "float",
            Kind::Int { .. } => "int",
            Kind::String { .. } => "string",
            Kind::Array(_) => "array",
            Kind::Mixed(_) => "mixed",
            Kind::Object { class } => class,
        }
    }
}

/// A kind plus its nullability
#[derive(Debug, Clone, PartialEq)]
pub struct TypeSpec {
    pub kind: Kind,
    pub nullability: Nullability,
}

impl TypeSpec {
    pub fn new(kind: Kind) -> Self {
        Self {
            kind,
            nullability: Nullability::NonNull,
        }
    }

    pub fn bool() -> Self {
        Self::new(Kind::Bool)
    }

    pub fn int() -> Self {
        Self::new(Kind::int())
    }

    /// Integers within `min..=max`
    pub fn int_range(min: i64, max: i64) -> Self {
        Self::new(Kind::Int { min, max })
    }

    pub fn float() -> Self {
        Self::new(Kind::Float)
    }

    pub fn string() -> Self {
        Self::new(Kind::String { sub_kind: None })
    }

    /// A string produced by the named sub-kind generator
    pub fn sub_kind(tag: impl Into<String>) -> Self {
        Self::new(Kind::String {
            sub_kind: Some(tag.into()),
        })
    }

    pub fn array(element: Option<TypeSpec>, length: Option<usize>) -> Self {
        Self::new(Kind::Array(ArraySpec {
            element: element.map(Box::new),
            length,
        }))
    }

    /// `mixed` with coin-flip nullability, the default for undeclared values
    pub fn mixed() -> Self {
        Self::new(Kind::Mixed(MixedSpec::default())).with_nullability(Nullability::CoinFlip)
    }

    pub fn object(class: impl Into<String>) -> Self {
        Self::new(Kind::Object {
            class: class.into(),
        })
    }

    pub fn nullable(self) -> Self {
        self.with_nullability(Nullability::Nullable)
    }

    pub fn with_nullability(mut self, nullability: Nullability) -> Self {
        self.nullability = nullability;
        self
    }
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nullability == Nullability::Nullable {
            write!(f, "?")?;
        }
        match &self.kind {
            Kind::Array(array) => {
                match &array.element {
                    Some(element) => write!(f, "{}", element)?,
                    None => write!(f, "array")?,
                }
                match array.length {
                    Some(length) => write!(f, "[{}]", length),
                    None => write!(f, "[]"),
                }
            }
            Kind::String {
                sub_kind: Some(tag),
            } => write!(f, "string [{}]", tag),
            kind => write!(f, "{}", kind.name()),
        }
    }
}

/// A test method parameter with its resolved type
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDescriptor {
    pub name: String,
    /// Zero-based declaration order
    pub position: usize,
    pub spec: TypeSpec,
}

/// A public property of a generated object with its resolved type
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDescriptor {
    pub name: String,
    pub spec: TypeSpec,
}

/// A discovered test method
#[derive(Debug, Clone, PartialEq)]
pub struct TestCaseDescriptor {
    pub name: String,
    pub parameters: Vec<ParameterDescriptor>,
    pub iterations: usize,
}
