//! Doc-comment annotation parsing.
//!
//! Turns declared types plus `@param`, `@var` and `@iterations` annotations
//! into [`TypeSpec`]s and test case descriptors. The grammar:
//!
//! ```text
//! @param <type>[<N>|] <$name> <description…>   trailing "[tag]" = string sub-kind
//! @var <type> <description…>                   same conventions, for properties
//! @iterations <integer>
//! ```
//!
//! Parsing never fails on malformed `@param`/`@var` lines; whatever type token
//! results is handed to the generator, which rejects an empty one.

use std::collections::{BTreeMap, HashMap};

use crate::declaration::{DeclaredType, MethodDeclaration, PropertyDeclaration};
use crate::type_spec::{
    ArraySpec, Kind, MixedSpec, Nullability, ParameterDescriptor, PropertyDescriptor,
    TestCaseDescriptor, TypeSpec,
};

/// All `@name value` annotations of one doc comment, in declaration order per name
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Annotations {
    entries: BTreeMap<String, Vec<String>>,
}

impl Annotations {
    /// Parse annotations from doc text, ignoring comment decoration
    pub fn parse(doc: &str) -> Self {
        let mut entries: BTreeMap<String, Vec<String>> = BTreeMap::new();

        for line in doc.lines() {
            if let Some((name, value)) = parse_annotation_line(line) {
                entries
                    .entry(name.to_string())
                    .or_default()
                    .push(value.to_string());
            }
        }

        Self { entries }
    }

    /// All values of an annotation
    pub fn get(&self, name: &str) -> &[String] {
        self.entries.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First value of an annotation
    pub fn first(&self, name: &str) -> Option<&str> {
        self.get(name).first().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn strip_decoration(line: &str) -> &str {
    let line = line.trim();
    let line = line.strip_prefix("/**").unwrap_or(line);
    let line = line.strip_suffix("*/").unwrap_or(line);
    let line = line.trim_start_matches("///");
    line.trim_start().trim_start_matches('*').trim()
}

fn parse_annotation_line(line: &str) -> Option<(&str, &str)> {
    let rest = strip_decoration(line).strip_prefix('@')?;
    let name_len = rest
        .find(|c: char| !(c.is_ascii_alphabetic() || c == '_' || c == '-'))
        .unwrap_or(rest.len());
    if name_len == 0 {
        return None;
    }

    let (name, value) = rest.split_at(name_len);
    if !value.is_empty() && !value.starts_with([' ', '\t']) {
        return None;
    }
    Some((name, value.trim()))
}

/// A trailing `[N]` or `[]` on a type token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrayMarker {
    pub length: Option<usize>,
}

/// The type part of a `@param` or `@var` annotation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeAnnotation {
    /// Type token with `?` and array marker removed
    pub type_name: String,
    /// Leading `?` was present
    pub nullable: bool,
    pub array: Option<ArrayMarker>,
    /// Bracketed tag closing the description, only for `string`
    pub sub_kind: Option<String>,
    pub description: String,
}

impl TypeAnnotation {
    /// Parse a type token and its free-text description
    pub fn parse(type_token: &str, description: &str) -> Self {
        let (nullable, token) = match type_token.strip_prefix('?') {
            Some(rest) => (true, rest),
            None => (false, type_token),
        };

        let (type_name, array) = split_array_marker(token);
        let sub_kind = if type_name.eq_ignore_ascii_case("string") {
            trailing_tag(description)
        } else {
            None
        };

        Self {
            type_name: type_name.to_string(),
            nullable,
            array,
            sub_kind,
            description: description.to_string(),
        }
    }

    /// Type spec of the annotated type itself, or of one element when the
    /// annotation carries an array marker
    fn base_spec(&self) -> TypeSpec {
        let kind = match Kind::from_type_name(&self.type_name) {
            Kind::String { .. } => Kind::String {
                sub_kind: self.sub_kind.clone(),
            },
            kind => kind,
        };
        let nullability = if self.nullable {
            Nullability::Nullable
        } else {
            Nullability::NonNull
        };
        TypeSpec { kind, nullability }
    }

    /// Array constraints this annotation implies for a value known to be an array
    fn array_spec(&self) -> ArraySpec {
        let element = if self.type_name.is_empty() {
            None
        } else {
            Some(Box::new(self.base_spec()))
        };
        ArraySpec {
            element,
            length: self.array.and_then(|marker| marker.length),
        }
    }

    /// Type spec for a value described only by this annotation (`@var`)
    pub fn to_spec(&self) -> TypeSpec {
        if self.array.is_some() {
            TypeSpec::new(Kind::Array(self.array_spec()))
        } else {
            self.base_spec()
        }
    }
}

fn split_array_marker(token: &str) -> (&str, Option<ArrayMarker>) {
    let Some(body) = token.strip_suffix(']') else {
        return (token, None);
    };
    let Some(open) = body.rfind('[') else {
        return (token, None);
    };

    let digits = &body[open + 1..];
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return (token, None);
    }

    let length = if digits.is_empty() {
        None
    } else {
        match digits.parse() {
            Ok(length) => Some(length),
            Err(_) => return (token, None),
        }
    };
    (&body[..open], Some(ArrayMarker { length }))
}

fn trailing_tag(description: &str) -> Option<String> {
    let body = description.strip_suffix(']')?;
    let open = body.find('[')?;
    let tag = &body[open + 1..];
    if tag.is_empty() {
        None
    } else {
        Some(tag.to_string())
    }
}

/// A parsed `@param` annotation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamAnnotation {
    /// Parameter name without its `$` sigil
    pub name: String,
    pub annotation: TypeAnnotation,
}

fn split_tokens(value: &str) -> Vec<&str> {
    value.split(' ').filter(|token| !token.is_empty()).collect()
}

/// Parse the value of a `@param` annotation: `<type> <$name> <description…>`
pub fn parse_param(value: &str) -> ParamAnnotation {
    let tokens = split_tokens(value);
    let type_token = tokens.first().copied().unwrap_or("");
    let name = tokens.get(1).copied().unwrap_or("");
    let description = tokens.get(2..).unwrap_or(&[]).join(" ");

    ParamAnnotation {
        name: name.strip_prefix('$').unwrap_or(name).to_string(),
        annotation: TypeAnnotation::parse(type_token, &description),
    }
}

/// Parse the value of a `@var` annotation: `<type> <description…>`
pub fn parse_var(value: &str) -> TypeAnnotation {
    let tokens = split_tokens(value);
    let type_token = tokens.first().copied().unwrap_or("");
    let description = tokens.get(1..).unwrap_or(&[]).join(" ");
    TypeAnnotation::parse(type_token, &description)
}

/// `@param` annotations of a doc comment keyed by parameter name; a repeated
/// name keeps its last annotation
pub fn param_annotations(doc: &str) -> HashMap<String, TypeAnnotation> {
    Annotations::parse(doc)
        .get("param")
        .iter()
        .map(|value| {
            let param = parse_param(value);
            (param.name, param.annotation)
        })
        .collect()
}

/// Resolve the type spec of one parameter from its declared type and annotation
pub fn resolve_parameter(
    declared: Option<&DeclaredType>,
    annotation: Option<&TypeAnnotation>,
) -> TypeSpec {
    let Some(declared) = declared else {
        return TypeSpec::new(Kind::Mixed(mixed_spec(annotation)))
            .with_nullability(Nullability::CoinFlip);
    };

    let kind = match Kind::from_type_name(&declared.name) {
        kind @ Kind::Int { .. } => declared
            .int_range
            .map_or(kind, |(min, max)| Kind::Int { min, max }),
        Kind::Array(_) => Kind::Array(resolve_array(declared.element.as_deref(), annotation)),
        Kind::String { .. } => Kind::String {
            sub_kind: annotation.and_then(|a| a.sub_kind.clone()),
        },
        Kind::Mixed(_) => Kind::Mixed(mixed_spec(annotation)),
        kind => kind,
    };

    // On an array the `?` of the annotation belongs to the elements
    let annotated_null = annotation.is_some_and(|a| a.nullable) && !matches!(kind, Kind::Array(_));
    let nullability = if declared.nullable || annotated_null {
        Nullability::Nullable
    } else {
        Nullability::NonNull
    };

    TypeSpec { kind, nullability }
}

fn mixed_spec(annotation: Option<&TypeAnnotation>) -> MixedSpec {
    MixedSpec {
        array: annotation.map(TypeAnnotation::array_spec).unwrap_or_default(),
        sub_kind: annotation.and_then(|a| a.sub_kind.clone()),
    }
}

fn resolve_array(element: Option<&DeclaredType>, annotation: Option<&TypeAnnotation>) -> ArraySpec {
    let Some(element) = element else {
        return annotation.map(TypeAnnotation::array_spec).unwrap_or_default();
    };

    let mut spec = resolve_parameter(Some(element), None);
    if let Some(annotation) = annotation {
        if let Kind::String { sub_kind } = &mut spec.kind {
            *sub_kind = annotation.sub_kind.clone();
        }
        if annotation.nullable {
            spec.nullability = Nullability::Nullable;
        }
    }

    ArraySpec {
        element: Some(Box::new(spec)),
        length: annotation.and_then(|a| a.array).and_then(|marker| marker.length),
    }
}

/// Parameter descriptors of a method in declaration order
pub fn parameters(method: &MethodDeclaration) -> Vec<ParameterDescriptor> {
    let annotations = param_annotations(&method.doc);

    method
        .params
        .iter()
        .enumerate()
        .map(|(position, param)| {
            let name = param.name.strip_prefix('$').unwrap_or(&param.name);
            ParameterDescriptor {
                name: name.to_string(),
                position,
                spec: resolve_parameter(param.declared.as_ref(), annotations.get(name)),
            }
        })
        .collect()
}

/// Property descriptor from the property's `@var` annotation, `mixed` without one
pub fn property(declaration: &PropertyDeclaration) -> PropertyDescriptor {
    let spec = declaration
        .doc
        .as_deref()
        .map(Annotations::parse)
        .and_then(|annotations| annotations.first("var").map(parse_var))
        .map(|annotation| annotation.to_spec())
        .unwrap_or_else(TypeSpec::mixed);

    PropertyDescriptor {
        name: declaration.name.clone(),
        spec,
    }
}

/// The `@iterations` override of a method, if any
///
/// The value is read like an integer cast: leading whitespace and an optional
/// sign, then as many digits as follow. `5x` is 5, `many` is 0 and negative
/// counts are 0.
pub fn iterations(method: &MethodDeclaration) -> Option<usize> {
    let annotations = Annotations::parse(&method.doc);
    annotations.first("iterations").map(leading_count)
}

fn leading_count(value: &str) -> usize {
    let value = value.trim_start();
    let (negative, digits) = match value.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, value.strip_prefix('+').unwrap_or(value)),
    };

    let mut count: usize = 0;
    for digit in digits.chars().map_while(|c| c.to_digit(10)) {
        count = count.saturating_mul(10).saturating_add(digit as usize);
    }

    if negative { 0 } else { count }
}

/// Full test case descriptor of a method
pub fn test_case(method: &MethodDeclaration, default_iterations: usize) -> TestCaseDescriptor {
    TestCaseDescriptor {
        name: method.name.clone(),
        parameters: parameters(method),
        iterations: iterations(method).unwrap_or(default_iterations),
    }
}
