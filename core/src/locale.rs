//! Locale-aware reading and writing of numbers.
//!
//! Field values arrive as display strings such as `1 234,50` and leave the
//! engine the same way. Inside the engine every number uses `.` as the decimal
//! point and carries no grouping.

use nom::number::complete::recognize_float;

use crate::options::FormatOptions;

/// Canonicalize a field's raw text.
///
/// Whitespace is dropped, then every thousands character, then every decimal
/// character becomes `.`. The result is not validated.
pub fn normalize(raw: &str, opts: &FormatOptions) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .filter(|c| !opts.thousands_separators.contains(c))
        .map(|c| {
            if opts.decimal_separators.contains(&c) {
                '.'
            } else {
                c
            }
        })
        .collect()
}

/// Read the leading number of a normalized string, or NaN when there is none.
///
/// Trailing garbage is ignored, so `"12kg"` reads as 12.
pub fn parse_number(normalized: &str) -> f64 {
    recognize_float::<&str, nom::error::Error<&str>>(normalized.trim_start())
        .ok()
        .and_then(|(_, literal)| literal.parse().ok())
        .unwrap_or(f64::NAN)
}

/// Render a result for display.
pub fn format_value(value: f64, opts: &FormatOptions) -> String {
    render(value, opts.fixed_places(), opts)
}

/// Like [`format_value`], but integral values never get fractional digits.
pub fn format_smart(value: f64, opts: &FormatOptions) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        render(value, Some(0), opts)
    } else {
        format_value(value, opts)
    }
}

fn render(value: f64, places: Option<usize>, opts: &FormatOptions) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    // avoid "-0"
    let value = if value == 0.0 { 0.0 } else { value };
    let canonical = match places {
        Some(places) => format!("{:.*}", places, round_half_away(value, places)),
        None => value.to_string(),
    };
    localize(&canonical, opts)
}

fn round_half_away(value: f64, places: usize) -> f64 {
    let factor = 10_f64.powi(places.min(i32::MAX as usize) as i32);
    let rounded = (value * factor).round() / factor;
    if !rounded.is_finite() {
        value
    } else if rounded == 0.0 {
        // avoid "-0"
        0.0
    } else {
        rounded
    }
}

/// Apply grouping and the output decimal separator to a canonical number.
fn localize(canonical: &str, opts: &FormatOptions) -> String {
    let (sign, unsigned) = match canonical.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", canonical),
    };
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (unsigned, None),
    };

    let mut out = String::with_capacity(canonical.len() + integer.len() / 3 + 1);
    out.push_str(sign);
    match opts.output_thousands_separator() {
        Some(sep) => {
            for (i, digit) in integer.chars().enumerate() {
                if i > 0 && (integer.len() - i) % 3 == 0 {
                    out.push(sep);
                }
                out.push(digit);
            }
        }
        None => out.push_str(integer),
    }
    if let Some(fraction) = fraction {
        out.push(opts.output_decimal_separator());
        out.push_str(fraction);
    }
    out
}
