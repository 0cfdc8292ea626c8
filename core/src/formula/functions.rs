//! Named aggregate functions over groups of fields.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::formula::scan::{segments, FunctionCall, Segment};

/// A resolved field handed to an aggregate.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldValue {
    pub name: String,
    /// Text as supplied by the host, before normalization.
    pub raw: String,
    /// Leading number of the normalized text, NaN if there is none.
    pub number: f64,
}

impl FieldValue {
    pub fn is_numeric(&self) -> bool {
        self.number.is_finite()
    }

    pub fn is_blank(&self) -> bool {
        self.raw.trim().is_empty()
    }
}

pub type Aggregate = Arc<dyn Fn(&[FieldValue]) -> f64 + Send + Sync>;

/// A registered function.
#[derive(Clone)]
pub struct FunctionSpec {
    pub name: String,
    pub description: String,
    aggregate: Aggregate,
}

impl FunctionSpec {
    pub fn new<F>(name: impl Into<String>, description: impl Into<String>, aggregate: F) -> Self
    where
        F: Fn(&[FieldValue]) -> f64 + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            aggregate: Arc::new(aggregate),
        }
    }

    pub fn apply(&self, values: &[FieldValue]) -> f64 {
        (self.aggregate)(values)
    }

    pub fn signature(&self) -> String {
        format!("{}({{field1,field2,...}})", self.name)
    }
}

impl fmt::Debug for FunctionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionSpec")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Information about a registered function.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FunctionInfo {
    pub name: String,
    pub signature: String,
    pub description: String,
}

/// Functions available to equations.
///
/// Built once by the caller and passed into every calculation; there is no
/// global registry. [`FunctionRegistry::default`] holds the built-ins.
#[derive(Debug, Clone)]
pub struct FunctionRegistry {
    functions: BTreeMap<String, FunctionSpec>,
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::builtins()
    }
}

impl FunctionRegistry {
    /// A registry with no functions at all.
    pub fn empty() -> Self {
        Self {
            functions: BTreeMap::new(),
        }
    }

    /// `sum`, `avg`, `min`, `max`, `count` and `countNotEmpty`.
    pub fn builtins() -> Self {
        let mut registry = Self::empty();
        registry.register(FunctionSpec::new(
            "sum",
            "Sum of the numeric fields; other fields are skipped",
            sum,
        ));
        registry.register(FunctionSpec::new(
            "avg",
            "Mean of the numeric fields, 0 when there are none",
            avg,
        ));
        registry.register(FunctionSpec::new(
            "min",
            "Smallest value; NaN if any field is not numeric",
            min,
        ));
        registry.register(FunctionSpec::new(
            "max",
            "Largest value; NaN if any field is not numeric",
            max,
        ));
        registry.register(FunctionSpec::new(
            "count",
            "Number of fields listed",
            count,
        ));
        registry.register(FunctionSpec::new(
            "countNotEmpty",
            "Number of listed fields that are not blank",
            count_not_empty,
        ));
        registry
    }

    /// Add or replace a function.
    pub fn register(&mut self, spec: FunctionSpec) {
        self.functions.insert(spec.name.clone(), spec);
    }

    /// Builder form of [`register`](Self::register).
    pub fn with<F>(mut self, name: &str, description: &str, aggregate: F) -> Self
    where
        F: Fn(&[FieldValue]) -> f64 + Send + Sync + 'static,
    {
        self.register(FunctionSpec::new(name, description, aggregate));
        self
    }

    pub fn lookup(&self, name: &str) -> Option<&FunctionSpec> {
        self.functions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.functions.keys().map(String::as_str).collect()
    }

    pub fn describe(&self) -> Vec<FunctionInfo> {
        self.functions
            .values()
            .map(|spec| FunctionInfo {
                name: spec.name.clone(),
                signature: spec.signature(),
                description: spec.description.clone(),
            })
            .collect()
    }

    /// Calls to registered functions in `equation`, in order of appearance.
    pub fn match_all<'a>(&self, equation: &'a str) -> Vec<FunctionCall<'a>> {
        segments(equation)
            .into_iter()
            .filter_map(|segment| match segment {
                Segment::Call(call) if self.contains(call.name) => Some(call),
                _ => None,
            })
            .collect()
    }
}

fn sum(values: &[FieldValue]) -> f64 {
    values
        .iter()
        .filter(|v| v.is_numeric())
        .map(|v| v.number)
        .sum()
}

fn avg(values: &[FieldValue]) -> f64 {
    let numeric: Vec<f64> = values
        .iter()
        .filter(|v| v.is_numeric())
        .map(|v| v.number)
        .collect();
    if numeric.is_empty() {
        0.0
    } else {
        numeric.iter().sum::<f64>() / numeric.len() as f64
    }
}

fn min(values: &[FieldValue]) -> f64 {
    strict_fold(values, f64::INFINITY, f64::min)
}

fn max(values: &[FieldValue]) -> f64 {
    strict_fold(values, f64::NEG_INFINITY, f64::max)
}

/// Fold over every value; a single NaN makes the result NaN.
fn strict_fold(values: &[FieldValue], init: f64, f: fn(f64, f64) -> f64) -> f64 {
    values
        .iter()
        .try_fold(init, |acc, v| {
            if v.number.is_nan() {
                None
            } else {
                Some(f(acc, v.number))
            }
        })
        .unwrap_or(f64::NAN)
}

fn count(values: &[FieldValue]) -> f64 {
    values.len() as f64
}

fn count_not_empty(values: &[FieldValue]) -> f64 {
    values.iter().filter(|v| !v.is_blank()).count() as f64
}
