//! Flat surface exported to foreign hosts through uniffi.

use std::collections::HashMap;

use crate::error::CalcError;
use crate::formula::{self, Calculation, FunctionInfo, FunctionRegistry};
use crate::options::{EngineOptions, FormatOptions};

/// Host-side view of [`EngineOptions`]. Separator sets are strings of characters.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct CalcOptions {
    /// Fixed digits after the decimal point, `-1` for natural precision; capped at 100.
    pub decimal_places: i32,
    pub thousands_separators: String,
    pub decimal_separators: String,
    pub empty_as_zero: bool,
    pub smart_integers: bool,
}

impl Default for CalcOptions {
    fn default() -> Self {
        EngineOptions::default().into()
    }
}

impl From<CalcOptions> for EngineOptions {
    fn from(opts: CalcOptions) -> Self {
        EngineOptions {
            format: FormatOptions {
                decimal_places: opts.decimal_places,
                thousands_separators: opts.thousands_separators.chars().collect(),
                decimal_separators: opts.decimal_separators.chars().collect(),
            },
            empty_as_zero: opts.empty_as_zero,
            smart_integers: opts.smart_integers,
        }
    }
}

impl From<EngineOptions> for CalcOptions {
    fn from(opts: EngineOptions) -> Self {
        CalcOptions {
            decimal_places: opts.format.decimal_places,
            thousands_separators: opts.format.thousands_separators.iter().collect(),
            decimal_separators: opts.format.decimal_separators.iter().collect(),
            empty_as_zero: opts.empty_as_zero,
            smart_integers: opts.smart_integers,
        }
    }
}

#[uniffi::export]
pub fn default_options() -> CalcOptions {
    CalcOptions::default()
}

/// Calculate an equation against a snapshot of field values using the
/// built-in functions.
#[uniffi::export]
pub fn calculate_equation(
    equation: String,
    fields: HashMap<String, String>,
    options: CalcOptions,
) -> Result<Calculation, CalcError> {
    formula::calculate(
        &equation,
        &fields,
        &FunctionRegistry::default(),
        &options.into(),
    )
}

#[uniffi::export]
pub fn validate_equation(equation: String) -> Result<(), CalcError> {
    formula::validate(&equation, &FunctionRegistry::default())
}

/// Names of the fields an equation depends on.
#[uniffi::export]
pub fn equation_fields(equation: String) -> Vec<String> {
    formula::field_references(&equation)
        .into_iter()
        .map(|r| r.field_name)
        .collect()
}

#[uniffi::export]
pub fn builtin_functions() -> Vec<FunctionInfo> {
    FunctionRegistry::default().describe()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_round_trip() {
        let opts = CalcOptions {
            decimal_places: 2,
            thousands_separators: ". ".to_string(),
            decimal_separators: ",".to_string(),
            empty_as_zero: true,
            smart_integers: false,
        };
        let engine: EngineOptions = opts.clone().into();
        assert_eq!(engine.format, FormatOptions::european().with_decimal_places(2));
        assert_eq!(CalcOptions::from(engine), opts);
    }

    #[test]
    fn test_calculate_equation() {
        let fields = HashMap::from([
            ("a".to_string(), "1.500,25".to_string()),
            ("b".to_string(), "2".to_string()),
        ]);
        let opts = CalcOptions {
            decimal_places: 2,
            thousands_separators: ".".to_string(),
            decimal_separators: ",".to_string(),
            ..CalcOptions::default()
        };
        let result = calculate_equation("{a} * {b}".to_string(), fields, opts).unwrap();
        assert!((result.value - 3000.5).abs() < f64::EPSILON);
        assert_eq!(result.formatted, "3.000,50");
    }

    #[test]
    fn test_calculate_equation_missing_field() {
        let result = calculate_equation("{a}".to_string(), HashMap::new(), default_options());
        assert_eq!(result, Err(CalcError::UnresolvedField("a".to_string())));
    }

    #[test]
    fn test_validate_and_fields() {
        assert!(validate_equation("sum({a,b}) * {c}".to_string()).is_ok());
        assert!(validate_equation("sum({a,b}) *".to_string()).is_err());
        assert_eq!(
            equation_fields("sum({a,b}) * {c} + {a}".to_string()),
            vec!["a", "b", "c"]
        );
        assert_eq!(builtin_functions().len(), 6);
    }
}
