//! Random values for type specs.

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::trace;

use crate::annotation;
use crate::binder;
use crate::config::GeneratorConfig;
use crate::declaration::{ClassDescriptor, ClassRegistry};
use crate::error::FactoryError;
use crate::generator::Generator;
use crate::subkind::{SubKindRegistry, TextGenerator};
use crate::type_spec::{ArraySpec, Kind, MixedSpec, Nullability, TypeSpec};
use crate::value::Value;

/// Resolve whether a value may be null for this call
pub fn allows_null(rng: &mut dyn rand::RngCore, nullability: Nullability) -> bool {
    match nullability {
        Nullability::NonNull => false,
        Nullability::Nullable => true,
        Nullability::CoinFlip => rng.r#gen(),
    }
}

/// Uniform over `min..=max`; the full `i64` range when given `i64::MIN..=i64::MAX`
pub fn random_int(rng: &mut dyn rand::RngCore, min: i64, max: i64) -> Result<i64, FactoryError> {
    if min > max {
        return Err(FactoryError::invalid_input(format!(
            "Empty int range {}..={}",
            min, max
        )));
    }
    Ok(rng.r#gen_range(min..=max))
}

/// Non-negative float below a random bound of up to nine digits, rounded to
/// a random number of decimals between 0 and 9
pub fn random_float(rng: &mut dyn rand::RngCore) -> f64 {
    let decimals = rng.r#gen_range(0..10);
    let bound = rng.r#gen_range(0..1_000_000_000u32) as f64;
    let scale = 10f64.powi(decimals);
    (rng.r#gen::<f64>() * bound * scale).round() / scale
}

/// Generates values for type specs, constructing registered classes on demand
#[derive(Debug)]
pub struct ValueGenerator<'a> {
    classes: &'a ClassRegistry,
    sub_kinds: &'a SubKindRegistry,
    config: &'a GeneratorConfig,
    depth: usize,
}

impl<'a> ValueGenerator<'a> {
    pub fn new(
        classes: &'a ClassRegistry,
        sub_kinds: &'a SubKindRegistry,
        config: &'a GeneratorConfig,
    ) -> Self {
        Self {
            classes,
            sub_kinds,
            config,
            depth: 0,
        }
    }

    /// Current object nesting depth
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Forget any nesting left behind by an unwound construction
    pub fn reset(&mut self) {
        self.depth = 0;
    }

    /// Generate a value, resolving the spec's nullability first
    pub fn generate(
        &mut self,
        rng: &mut dyn rand::RngCore,
        spec: &TypeSpec,
    ) -> Result<Value, FactoryError> {
        let allows_null = allows_null(rng, spec.nullability);
        self.generate_with(rng, spec, allows_null)
    }

    /// Generate a value; when `allows_null` is set, a fair coin decides for null
    pub fn generate_with(
        &mut self,
        rng: &mut dyn rand::RngCore,
        spec: &TypeSpec,
        allows_null: bool,
    ) -> Result<Value, FactoryError> {
        if let Kind::Object { class } = &spec.kind
            && class.is_empty()
        {
            return Err(FactoryError::invalid_input("Type cannot be empty"));
        }

        if allows_null && rng.r#gen::<bool>() {
            return Ok(Value::Null);
        }

        self.generate_kind(rng, &spec.kind)
    }

    fn generate_kind(
        &mut self,
        rng: &mut dyn rand::RngCore,
        kind: &Kind,
    ) -> Result<Value, FactoryError> {
        match kind {
            Kind::Bool => Ok(Value::Bool(rng.r#gen())),
            Kind::Int { min, max } => Ok(Value::Int(random_int(rng, *min, *max)?)),
            Kind::Float => Ok(Value::Float(random_float(rng))),
            Kind::String { sub_kind } => self.generate_string(rng, sub_kind.as_deref()),
            Kind::Array(array) => self.generate_array(rng, array),
            Kind::Mixed(mixed) => self.generate_mixed(rng, mixed),
            Kind::Object { class } => self.generate_object(rng, class),
        }
    }

    fn generate_string(
        &self,
        rng: &mut dyn rand::RngCore,
        sub_kind: Option<&str>,
    ) -> Result<Value, FactoryError> {
        let text = match sub_kind {
            Some(tag) => self.sub_kinds.generate(tag, rng, self.config)?,
            None => TextGenerator.generate(rng, self.config),
        };
        Ok(Value::String(text))
    }

    fn generate_array(
        &mut self,
        rng: &mut dyn rand::RngCore,
        array: &ArraySpec,
    ) -> Result<Value, FactoryError> {
        let length = match array.length {
            Some(length) => length,
            None => rng.r#gen_range(0..=self.config.max_array_len),
        };

        let element = match &array.element {
            Some(element) => element.as_ref().clone(),
            None => {
                let kinds = [Kind::Bool, Kind::Float, Kind::int(), Kind::String { sub_kind: None }];
                let kind = kinds.choose(rng).cloned().unwrap_or_else(Kind::int);
                TypeSpec::new(kind).with_nullability(Nullability::CoinFlip)
            }
        };
        let element_allows_null = allows_null(rng, element.nullability);

        let items = (0..length)
            .map(|_| self.generate_with(rng, &element, element_allows_null))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Value::Array(items))
    }

    fn generate_mixed(
        &mut self,
        rng: &mut dyn rand::RngCore,
        mixed: &MixedSpec,
    ) -> Result<Value, FactoryError> {
        let kind = match rng.r#gen_range(0..5) {
            0 => Kind::Array(mixed.array.clone()),
            1 => Kind::Bool,
            2 => Kind::Float,
            3 => Kind::int(),
            _ => Kind::String {
                sub_kind: mixed.sub_kind.clone(),
            },
        };
        self.generate_kind(rng, &kind)
    }

    fn generate_object(
        &mut self,
        rng: &mut dyn rand::RngCore,
        class: &str,
    ) -> Result<Value, FactoryError> {
        let classes = self.classes;
        let descriptor = classes
            .get(class)
            .ok_or_else(|| FactoryError::unknown_class(class))?;

        if self.depth >= self.config.max_depth {
            return Err(FactoryError::RecursionLimit {
                class: class.to_string(),
                depth: self.config.max_depth,
            });
        }

        self.depth += 1;
        let result = self.construct(rng, descriptor);
        self.depth -= 1;
        result
    }

    fn construct(
        &mut self,
        rng: &mut dyn rand::RngCore,
        descriptor: &ClassDescriptor,
    ) -> Result<Value, FactoryError> {
        let parameters = annotation::parameters(descriptor.constructor());
        let args = binder::bind_parameters(self, rng, &parameters)?;
        let mut object = descriptor.instantiate(args)?;

        for declaration in descriptor.properties() {
            let property = annotation::property(declaration);
            let value = self.generate(rng, &property.spec)?;
            object.set(property.name, value);
        }

        trace!(class = descriptor.name(), depth = self.depth, "constructed object");
        Ok(Value::Object(object))
    }
}
