//! Bridge between generated values and typed Rust parameters.

use crate::declaration::{ClassRegistry, DeclaredType};
use crate::error::{FactoryError, TestError};
use crate::value::Value;

/// A Rust type that can receive a generated argument
///
/// `declared_type` plays the role of the parameter's declared type: it picks
/// the kind to generate before any annotation refinement. `None` means the
/// parameter is untyped and generated as `mixed`.
pub trait Argument: Sized {
    fn declared_type() -> Option<DeclaredType>;

    /// Register the classes this type needs constructed
    fn register_classes(_classes: &mut ClassRegistry) {}

    fn from_value(value: Value) -> Result<Self, FactoryError>;
}

macro_rules! impl_int_argument {
    ($($t:ty),*) => {
        $(
            impl Argument for $t {
                // bounds outside the i64 range are clamped to it
                fn declared_type() -> Option<DeclaredType> {
                    let min = num_traits::cast::<$t, i64>(<$t>::MIN).unwrap_or(i64::MIN);
                    let max = num_traits::cast::<$t, i64>(<$t>::MAX).unwrap_or(i64::MAX);
                    Some(DeclaredType::int_range(min, max))
                }

                fn from_value(value: Value) -> Result<Self, FactoryError> {
                    match value {
                        Value::Int(i) => num_traits::cast::<i64, $t>(i).ok_or_else(|| {
                            FactoryError::conversion(stringify!($t), format!("int {}", i))
                        }),
                        other => Err(FactoryError::conversion(stringify!($t), other.type_name())),
                    }
                }
            }
        )*
    };
}

impl_int_argument!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl Argument for f64 {
    fn declared_type() -> Option<DeclaredType> {
        Some(DeclaredType::new("float"))
    }

    fn from_value(value: Value) -> Result<Self, FactoryError> {
        match value {
            Value::Float(x) => Ok(x),
            other => Err(FactoryError::conversion("f64", other.type_name())),
        }
    }
}

impl Argument for f32 {
    fn declared_type() -> Option<DeclaredType> {
        Some(DeclaredType::new("float"))
    }

    fn from_value(value: Value) -> Result<Self, FactoryError> {
        match value {
            Value::Float(x) => Ok(x as f32),
            other => Err(FactoryError::conversion("f32", other.type_name())),
        }
    }
}

impl Argument for bool {
    fn declared_type() -> Option<DeclaredType> {
        Some(DeclaredType::new("bool"))
    }

    fn from_value(value: Value) -> Result<Self, FactoryError> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(FactoryError::conversion("bool", other.type_name())),
        }
    }
}

impl Argument for String {
    fn declared_type() -> Option<DeclaredType> {
        Some(DeclaredType::new("string"))
    }

    fn from_value(value: Value) -> Result<Self, FactoryError> {
        match value {
            Value::String(s) => Ok(s),
            other => Err(FactoryError::conversion("String", other.type_name())),
        }
    }
}

impl Argument for Value {
    fn declared_type() -> Option<DeclaredType> {
        None
    }

    fn from_value(value: Value) -> Result<Self, FactoryError> {
        Ok(value)
    }
}

impl<T: Argument> Argument for Option<T> {
    fn declared_type() -> Option<DeclaredType> {
        T::declared_type().map(DeclaredType::nullable)
    }

    fn register_classes(classes: &mut ClassRegistry) {
        T::register_classes(classes);
    }

    fn from_value(value: Value) -> Result<Self, FactoryError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: Argument> Argument for Vec<T> {
    fn declared_type() -> Option<DeclaredType> {
        Some(match T::declared_type() {
            Some(element) => DeclaredType::array_of(element),
            None => DeclaredType::new("array"),
        })
    }

    fn register_classes(classes: &mut ClassRegistry) {
        T::register_classes(classes);
    }

    fn from_value(value: Value) -> Result<Self, FactoryError> {
        match value {
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(i, item)| {
                    T::from_value(item).map_err(|e| e.in_context(format!("element {}", i)))
                })
                .collect(),
            other => Err(FactoryError::conversion("Vec", other.type_name())),
        }
    }
}

impl<T: Argument> Argument for Box<T> {
    fn declared_type() -> Option<DeclaredType> {
        T::declared_type()
    }

    fn register_classes(classes: &mut ClassRegistry) {
        T::register_classes(classes);
    }

    fn from_value(value: Value) -> Result<Self, FactoryError> {
        T::from_value(value).map(Box::new)
    }
}

/// Positional arguments of one invocation, consumed in declaration order
#[derive(Debug)]
pub struct Arguments {
    method: String,
    values: std::vec::IntoIter<Value>,
    total: usize,
    position: usize,
}

impl Arguments {
    pub fn new(method: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            method: method.into(),
            total: values.len(),
            values: values.into_iter(),
            position: 0,
        }
    }

    /// Convert the next argument into the parameter's type
    pub fn arg<T: Argument>(&mut self, name: &str) -> Result<T, FactoryError> {
        let value = self.values.next().ok_or_else(|| FactoryError::ArgumentCount {
            method: self.method.clone(),
            expected: self.position + 1,
            found: self.total,
        })?;
        self.position += 1;
        T::from_value(value).map_err(|e| e.in_context(format!("parameter {}", name)))
    }

    /// Arguments not consumed yet
    pub fn remaining(&self) -> usize {
        self.values.len()
    }

    /// Fail if arguments are left over
    pub fn finish(self) -> Result<(), FactoryError> {
        if !self.values.as_slice().is_empty() {
            return Err(FactoryError::ArgumentCount {
                method: self.method,
                expected: self.position,
                found: self.total,
            });
        }
        Ok(())
    }
}

/// Return types a test body may have
pub trait TestReturn {
    fn into_test_result(self) -> Result<(), TestError>;
}

impl TestReturn for () {
    fn into_test_result(self) -> Result<(), TestError> {
        Ok(())
    }
}

/// `false` is an assertion failure
impl TestReturn for bool {
    fn into_test_result(self) -> Result<(), TestError> {
        if self {
            Ok(())
        } else {
            Err(TestError::assertion("test returned false"))
        }
    }
}

impl<E: Into<TestError>> TestReturn for Result<(), E> {
    fn into_test_result(self) -> Result<(), TestError> {
        self.map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_types() {
        assert_eq!(
            i64::declared_type(),
            Some(DeclaredType::int_range(i64::MIN, i64::MAX))
        );
        assert_eq!(u8::declared_type(), Some(DeclaredType::int_range(0, 255)));
        assert_eq!(
            i32::declared_type(),
            Some(DeclaredType::int_range(i32::MIN.into(), i32::MAX.into()))
        );
        assert_eq!(u64::declared_type(), Some(DeclaredType::int_range(0, i64::MAX)));
        assert_eq!(
            i128::declared_type(),
            Some(DeclaredType::int_range(i64::MIN, i64::MAX))
        );
        assert_eq!(f32::declared_type(), Some(DeclaredType::new("float")));
        assert_eq!(
            Option::<String>::declared_type(),
            Some(DeclaredType::new("string").nullable())
        );
        assert_eq!(
            Vec::<Option<i64>>::declared_type(),
            Some(DeclaredType::array_of(
                DeclaredType::int_range(i64::MIN, i64::MAX).nullable()
            ))
        );
        assert_eq!(Vec::<Value>::declared_type(), Some(DeclaredType::new("array")));
        assert_eq!(Value::declared_type(), None);
        assert_eq!(Option::<Value>::declared_type(), None);
    }

    #[test]
    fn test_integer_conversion_is_range_checked() {
        assert_eq!(i64::from_value(Value::Int(i64::MIN)), Ok(i64::MIN));
        assert_eq!(u8::from_value(Value::Int(200)), Ok(200u8));
        assert_eq!(
            u8::from_value(Value::Int(300)),
            Err(FactoryError::conversion("u8", "int 300"))
        );
        assert_eq!(
            i32::from_value(Value::Bool(true)),
            Err(FactoryError::conversion("i32", "bool"))
        );
    }

    #[test]
    fn test_container_conversion() {
        let value = Value::Array(vec![Value::Int(1), Value::Null, Value::Int(3)]);
        assert_eq!(
            Vec::<Option<i64>>::from_value(value.clone()),
            Ok(vec![Some(1), None, Some(3)])
        );
        assert_eq!(
            Vec::<i64>::from_value(value),
            Err(FactoryError::conversion_with_context(
                "i64",
                "null",
                Some("element 1")
            ))
        );
        assert_eq!(Box::<bool>::from_value(Value::Bool(true)), Ok(Box::new(true)));
    }

    #[test]
    fn test_arguments_in_order() {
        let mut args = Arguments::new(
            "test_pair",
            vec![Value::Int(7), Value::String("x".to_string())],
        );
        assert_eq!(args.arg::<i64>("a"), Ok(7));
        assert_eq!(args.remaining(), 1);
        assert_eq!(args.arg::<String>("b"), Ok("x".to_string()));
        assert!(args.finish().is_ok());
    }

    #[test]
    fn test_arguments_errors() {
        let mut args = Arguments::new("test_one", vec![Value::Bool(true)]);
        assert_eq!(
            args.arg::<i64>("a"),
            Err(FactoryError::conversion_with_context(
                "i64",
                "bool",
                Some("parameter a")
            ))
        );
        assert_eq!(
            args.arg::<i64>("b"),
            Err(FactoryError::ArgumentCount {
                method: "test_one".to_string(),
                expected: 2,
                found: 1,
            })
        );

        let args = Arguments::new("test_none", vec![Value::Null]);
        assert!(matches!(
            args.finish(),
            Err(FactoryError::ArgumentCount { expected: 0, found: 1, .. })
        ));
    }

    #[test]
    fn test_test_return() {
        assert_eq!(().into_test_result(), Ok(()));
        assert!(true.into_test_result().is_ok());
        assert!(false.into_test_result().unwrap_err().is_assertion());

        let result: Result<(), FactoryError> = Err(FactoryError::unknown_class("User"));
        assert!(!result.into_test_result().unwrap_err().is_assertion());

        let result: Result<(), TestError> = Err(TestError::assertion("nope"));
        assert_eq!(result.into_test_result(), Err(TestError::assertion("nope")));
    }
}
