//! Equation engine for calculated display fields.
//!
//! An equation mixes arithmetic with field placeholders and aggregate calls.
//! Each calculation runs four stages from scratch: expand function calls,
//! substitute placeholders, evaluate the flattened arithmetic, format.
//!
//! # Supported Grammar
//!
//! - Arithmetic: `+ - * / ( )`, unsigned decimal literals
//! - Placeholders: `{field}`
//! - Functions: `sum({a,b})`, `avg({a,b})`, `min({a,b})`, `max({a,b})`,
//!   `count({a,b})`, `countNotEmpty({a,b})`, plus any registered by the caller
//!
//! Whitespace is insignificant and commas outside argument lists are dropped.
//!
//! # Example
//!
//! ```
//! use fieldcalc::formula::{validate, Engine, FunctionRegistry};
//!
//! validate("sum({a,b}) / 2", &FunctionRegistry::default()).expect("Equation should be valid");
//!
//! let fields = |name: &str| match name {
//!     "a" => Some("1,200".to_string()),
//!     "b" => Some("300".to_string()),
//!     _ => None,
//! };
//! let engine = Engine::default();
//! let result = engine.calculate("sum({a,b}) / 2", &fields).expect("Should calculate");
//! assert_eq!(result.value, 750.0);
//! assert_eq!(result.formatted, "750");
//! ```

pub mod evaluator;
pub mod functions;
pub mod parser;
pub mod scan;
pub mod substitute;
pub mod token;

pub use functions::{Aggregate, FieldValue, FunctionInfo, FunctionRegistry, FunctionSpec};
pub use parser::evaluate;
pub use scan::{field_references, FieldReference, FunctionCall};
pub use substitute::{expand_functions, substitute, FieldSource};
pub use token::{Associativity, Operator, OperatorSpec, Token};

use tracing::debug;

use crate::error::CalcError;
use crate::locale::{format_smart, format_value};
use crate::options::EngineOptions;
use scan::{segments, Segment};

/// Outcome of one calculation.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct Calculation {
    pub value: f64,
    pub formatted: String,
}

/// Validate an equation without field values.
///
/// Checks that every function is registered and that the arithmetic parses
/// once calls and placeholders stand for plain numbers. Whether the fields
/// exist is not checked, as that depends on the host.
pub fn validate(equation: &str, registry: &FunctionRegistry) -> Result<(), CalcError> {
    let mut skeleton = String::with_capacity(equation.len());
    for segment in segments(equation) {
        match segment {
            Segment::Text(text) => skeleton.push_str(text),
            Segment::Placeholder(_) => skeleton.push('1'),
            Segment::Call(call) => {
                if !registry.contains(call.name) {
                    return Err(CalcError::UnknownFunction(call.name.to_string()));
                }
                skeleton.push('1');
            }
        }
    }
    skeleton.retain(|c| !c.is_whitespace() && c != ',');
    evaluate(&skeleton)?;
    Ok(())
}

/// Run one full calculation.
pub fn calculate<S: FieldSource + ?Sized>(
    equation: &str,
    fields: &S,
    registry: &FunctionRegistry,
    options: &EngineOptions,
) -> Result<Calculation, CalcError> {
    let expanded = expand_functions(equation, fields, registry, &options.format)?;
    let flattened = substitute(&expanded, fields, options)?;
    debug!(equation, flattened = %flattened, "flattened equation");

    let value = evaluate(&flattened)?;
    let formatted = if options.smart_integers {
        format_smart(value, &options.format)
    } else {
        format_value(value, &options.format)
    };
    debug!(value, formatted = %formatted, "calculated");

    Ok(Calculation { value, formatted })
}

/// A registry and options, fixed at construction.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    registry: FunctionRegistry,
    options: EngineOptions,
}

impl Engine {
    pub fn new(registry: FunctionRegistry, options: EngineOptions) -> Self {
        Self { registry, options }
    }

    /// Built-in functions with the given options.
    pub fn with_options(options: EngineOptions) -> Self {
        Self::new(FunctionRegistry::default(), options)
    }

    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn calculate<S: FieldSource + ?Sized>(
        &self,
        equation: &str,
        fields: &S,
    ) -> Result<Calculation, CalcError> {
        calculate(equation, fields, &self.registry, &self.options)
    }

    pub fn validate(&self, equation: &str) -> Result<(), CalcError> {
        validate(equation, &self.registry)
    }
}
