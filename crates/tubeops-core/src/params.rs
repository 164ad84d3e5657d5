//! Parameter resolution for workflow invocations
//!
//! Every workflow accepts a loosely typed bag of named values (deep links,
//! redirects, row menu actions). The resolver validates the bag against the
//! workflow's declared shape before any step runs: required fields must be
//! present and type-compatible, `resolvable` fields may be absent (the
//! workflow falls back to an interactive lookup), and unknown keys are
//! ignored.

use crate::error::WorkflowError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A loosely typed parameter value as it arrives at the transport boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Boolean value
    Bool(bool),
    /// Integer value
    Int(i64),
    /// Floating-point value
    Float(f64),
    /// String value
    String(String),
}

impl ParamValue {
    /// Read as a string, if string-typed
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Read as a boolean, coercing `"true"`/`"false"` strings
    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::String(s) => match s.as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// Read as an integer, coercing numeric strings
    #[inline]
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Read as a float, coercing integers and numeric strings
    #[inline]
    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            #[allow(clippy::cast_precision_loss)]
            Self::Int(i) => Some(*i as f64),
            Self::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Whether this value is compatible with the given kind
    #[inline]
    #[must_use]
    pub fn matches(&self, kind: ParamKind) -> bool {
        match kind {
            ParamKind::Bool => self.as_bool().is_some(),
            ParamKind::Int => self.as_int().is_some(),
            ParamKind::Float => self.as_float().is_some(),
            ParamKind::String => self.as_str().is_some(),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

/// Declared type of a parameter field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParamKind {
    /// Boolean
    Bool,
    /// Integer
    Int,
    /// Float
    Float,
    /// String
    String,
}

/// Named bag of invocation parameters
///
/// Always optional at the transport level; validation happens against a
/// [`ParamShape`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParamBag(HashMap<String, ParamValue>);

impl ParamBag {
    /// Create an empty bag
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    #[inline]
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Insert a value
    #[inline]
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Raw value lookup
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    /// String lookup
    #[inline]
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(ParamValue::as_str)
    }

    /// Boolean lookup with string coercion
    #[inline]
    #[must_use]
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(ParamValue::as_bool)
    }

    /// Integer lookup with string coercion
    #[inline]
    #[must_use]
    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(ParamValue::as_int)
    }

    /// Whether the bag carries no values
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of values in the bag
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// One declared parameter field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Parameter name
    pub name: &'static str,
    /// Declared type
    pub kind: ParamKind,
    /// Whether the invocation fails when the field is absent
    pub required: bool,
    /// Whether an absent value delegates to an interactive entity lookup
    pub resolvable: bool,
}

impl FieldSpec {
    /// Optional field
    #[inline]
    #[must_use]
    pub const fn optional(name: &'static str, kind: ParamKind) -> Self {
        Self {
            name,
            kind,
            required: false,
            resolvable: false,
        }
    }

    /// Required field; absence is a validation error
    #[inline]
    #[must_use]
    pub const fn required(name: &'static str, kind: ParamKind) -> Self {
        Self {
            name,
            kind,
            required: true,
            resolvable: false,
        }
    }

    /// Required-but-resolvable field; absence triggers an interactive lookup
    #[inline]
    #[must_use]
    pub const fn resolvable(name: &'static str, kind: ParamKind) -> Self {
        Self {
            name,
            kind,
            required: true,
            resolvable: true,
        }
    }
}

/// Declared parameter shape of one workflow
#[derive(Debug, Clone, Default)]
pub struct ParamShape {
    fields: Vec<FieldSpec>,
}

impl ParamShape {
    /// Shape with no declared fields (all incoming keys ignored)
    #[inline]
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Shape from a field list
    #[inline]
    #[must_use]
    pub fn of(fields: impl Into<Vec<FieldSpec>>) -> Self {
        Self {
            fields: fields.into(),
        }
    }

    /// Declared fields, in declaration order
    #[inline]
    #[must_use]
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Validate a bag against this shape
    ///
    /// Returns a bag containing only the declared fields that were present
    /// and type-compatible. Unknown keys are dropped silently.
    ///
    /// # Errors
    /// - [`WorkflowError::Validation`] naming the first missing
    ///   non-resolvable required field, or the first type-incompatible field
    pub fn resolve(&self, bag: &ParamBag) -> Result<ParamBag, WorkflowError> {
        let mut resolved = ParamBag::new();

        for field in &self.fields {
            match bag.get(field.name) {
                Some(value) => {
                    if !value.matches(field.kind) {
                        return Err(WorkflowError::validation(
                            field.name,
                            format!("expected {:?} value", field.kind),
                        ));
                    }
                    resolved.insert(field.name, value.clone());
                }
                None if field.required && !field.resolvable => {
                    return Err(WorkflowError::validation(field.name, "missing required field"));
                }
                None => {}
            }
        }

        Ok(resolved)
    }
}
