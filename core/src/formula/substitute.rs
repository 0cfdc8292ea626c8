use std::collections::{BTreeMap, HashMap};

use tracing::trace;

use crate::error::CalcError;
use crate::formula::functions::{FieldValue, FunctionRegistry};
use crate::formula::scan::{segments, Segment};
use crate::locale::{normalize, parse_number};
use crate::options::{EngineOptions, FormatOptions};

/// Source of raw field values, usually the host's form state.
///
/// Returning `None` means the field does not exist.
pub trait FieldSource {
    fn raw_value(&self, name: &str) -> Option<String>;
}

impl<F> FieldSource for F
where
    F: Fn(&str) -> Option<String>,
{
    fn raw_value(&self, name: &str) -> Option<String> {
        self(name)
    }
}

impl FieldSource for HashMap<String, String> {
    fn raw_value(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl FieldSource for BTreeMap<String, String> {
    fn raw_value(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

fn resolve<S: FieldSource + ?Sized>(fields: &S, name: &str) -> Result<String, CalcError> {
    fields
        .raw_value(name)
        .ok_or_else(|| CalcError::UnresolvedField(name.to_string()))
}

/// Replace every function call in `equation` with its scalar result.
///
/// Placeholders outside calls are left untouched.
pub fn expand_functions<S: FieldSource + ?Sized>(
    equation: &str,
    fields: &S,
    registry: &FunctionRegistry,
    format: &FormatOptions,
) -> Result<String, CalcError> {
    let mut out = String::with_capacity(equation.len());
    for segment in segments(equation) {
        match segment {
            Segment::Text(text) => out.push_str(text),
            Segment::Placeholder(name) => {
                out.push('{');
                out.push_str(name);
                out.push('}');
            }
            Segment::Call(call) => {
                let spec = registry
                    .lookup(call.name)
                    .ok_or_else(|| CalcError::UnknownFunction(call.name.to_string()))?;
                let values = call
                    .fields
                    .iter()
                    .map(|&name| {
                        let raw = resolve(fields, name)?;
                        let number = parse_number(&normalize(&raw, format));
                        Ok(FieldValue {
                            name: name.to_string(),
                            raw,
                            number,
                        })
                    })
                    .collect::<Result<Vec<_>, CalcError>>()?;
                let result = spec.apply(&values);
                trace!(function = call.name, fields = values.len(), result, "expanded function call");
                out.push_str(&scalar_literal(result));
            }
        }
    }
    Ok(out)
}

/// Replace every `{field}` placeholder with the field's normalized value and
/// strip whitespace and stray commas, leaving pure arithmetic.
///
/// Function calls must already be expanded.
pub fn substitute<S: FieldSource + ?Sized>(
    equation: &str,
    fields: &S,
    options: &EngineOptions,
) -> Result<String, CalcError> {
    let mut out = String::with_capacity(equation.len());
    for segment in segments(equation) {
        match segment {
            Segment::Text(text) => out.push_str(text),
            Segment::Placeholder(name) => {
                let raw = resolve(fields, name)?;
                if options.empty_as_zero && raw.trim().is_empty() {
                    out.push('0');
                } else {
                    out.push_str(&normalize(&raw, &options.format));
                }
                trace!(field = name, "substituted placeholder");
            }
            Segment::Call(call) => out.push_str(call.text),
        }
    }
    out.retain(|c| !c.is_whitespace() && c != ',');
    Ok(out)
}

/// Text the arithmetic parser reads back as exactly `value`.
///
/// Numbers are unsigned and there are no non-finite literals, so negatives and
/// non-finite results are spelled as arithmetic.
fn scalar_literal(value: f64) -> String {
    if value.is_nan() {
        "(0/0)".to_string()
    } else if value == f64::INFINITY {
        "(1/0)".to_string()
    } else if value == f64::NEG_INFINITY {
        "(0-1/0)".to_string()
    } else if value == 0.0 {
        "0".to_string()
    } else if value < 0.0 {
        format!("(0-{})", -value)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::parser::evaluate;

    fn store(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_substitute_placeholders() {
        let fields = store(&[("price", "1,250.50"), ("qty", " 3 ")]);
        let flat = substitute("{price} * {qty}", &fields, &EngineOptions::default()).unwrap();
        assert_eq!(flat, "1250.50*3");
    }

    #[test]
    fn test_substitute_repeated_placeholder() {
        let fields = store(&[("a", "2")]);
        let flat = substitute("{a}*{a}+{a}", &fields, &EngineOptions::default()).unwrap();
        assert_eq!(flat, "2*2+2");
    }

    #[test]
    fn test_substitute_strips_template_commas() {
        let fields = store(&[("a", "2")]);
        let flat = substitute("1,000 + {a}", &fields, &EngineOptions::default()).unwrap();
        assert_eq!(flat, "1000+2");
    }

    #[test]
    fn test_substitute_unresolved_field() {
        let fields = store(&[("a", "2")]);
        let result = substitute("{a}+{missing}", &fields, &EngineOptions::default());
        assert_eq!(result, Err(CalcError::UnresolvedField("missing".to_string())));
    }

    #[test]
    fn test_substitute_with_closure_source() {
        let fields = |name: &str| (name == "x").then(|| "4,5".to_string());
        let options = EngineOptions::default().with_format(FormatOptions::european());
        let flat = substitute("{x}/2", &fields, &options).unwrap();
        assert_eq!(flat, "4.5/2");
    }

    #[test]
    fn test_empty_as_zero() {
        let fields = store(&[("a", "  "), ("b", "5")]);
        let flat = substitute("{a}+{b}", &fields, &EngineOptions::default()).unwrap();
        assert_eq!(flat, "+5");

        let options = EngineOptions::default().with_empty_as_zero(true);
        let flat = substitute("{a}+{b}", &fields, &options).unwrap();
        assert_eq!(flat, "0+5");
    }

    #[test]
    fn test_expand_functions_before_placeholders() {
        let fields = store(&[("a", "1"), ("b", "2"), ("c", "10")]);
        let expanded = expand_functions(
            "sum({a,b})*{c}",
            &fields,
            &FunctionRegistry::default(),
            &FormatOptions::default(),
        )
        .unwrap();
        assert_eq!(expanded, "3*{c}");
    }

    #[test]
    fn test_expand_unknown_function() {
        let fields = store(&[("a", "1")]);
        let result = expand_functions(
            "median({a})",
            &fields,
            &FunctionRegistry::default(),
            &FormatOptions::default(),
        );
        assert_eq!(result, Err(CalcError::UnknownFunction("median".to_string())));
    }

    #[test]
    fn test_expand_unresolved_argument() {
        let fields = store(&[("a", "1")]);
        let result = expand_functions(
            "avg({a,ghost})",
            &fields,
            &FunctionRegistry::default(),
            &FormatOptions::default(),
        );
        assert_eq!(result, Err(CalcError::UnresolvedField("ghost".to_string())));
    }

    #[test]
    fn test_non_finite_results_use_plain_arithmetic() {
        assert_eq!(scalar_literal(f64::NAN), "(0/0)");
        assert_eq!(scalar_literal(f64::INFINITY), "(1/0)");
        assert_eq!(scalar_literal(f64::NEG_INFINITY), "(0-1/0)");
        assert_eq!(scalar_literal(-2.5), "(0-2.5)");

        let fields = store(&[("a", "3"), ("b", "")]);
        let expanded = expand_functions(
            "max({a,b})*2",
            &fields,
            &FunctionRegistry::default(),
            &FormatOptions::default(),
        )
        .unwrap();
        assert_eq!(expanded, "(0/0)*2");
    }

    #[test]
    fn test_scalar_literal_reads_back() {
        for value in [3.0, 0.1 + 0.2, -4.25, 0.0, -0.0, 1e21, 1e-7, f64::INFINITY] {
            let parsed = evaluate(&scalar_literal(value)).unwrap();
            assert_eq!(parsed, value, "{}", scalar_literal(value));
        }
        assert_eq!(evaluate(&scalar_literal(f64::NEG_INFINITY)).unwrap(), f64::NEG_INFINITY);
        assert!(evaluate(&scalar_literal(f64::NAN)).unwrap().is_nan());
    }
}
