//! Splits an equation into literal text, field placeholders and function calls.

use std::collections::HashSet;

use nom::{
    branch::alt,
    bytes::complete::{take_till1, take_while, take_while1},
    character::complete::{anychar, char, multispace0},
    combinator::{consumed, map, recognize, verify},
    multi::{many0, separated_list1},
    sequence::delimited,
    IResult, Parser,
};

/// One piece of an equation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Arithmetic text copied through unchanged.
    Text(&'a str),
    /// `{field}`
    Placeholder(&'a str),
    /// `name({a,b,...})`
    Call(FunctionCall<'a>),
}

/// A function call found in an equation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionCall<'a> {
    pub name: &'a str,
    pub fields: Vec<&'a str>,
    /// The full matched text, e.g. `sum({a,b})`.
    pub text: &'a str,
}

/// A field named by an equation.
///
/// `eq_name` is the name as written in the equation and `field_name` the field
/// it resolves to. They are currently always equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldReference {
    pub eq_name: String,
    pub field_name: String,
}

impl FieldReference {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            eq_name: name.clone(),
            field_name: name,
        }
    }
}

/// Split an equation into segments. Never fails: anything that is not a
/// placeholder or a call is kept as text for the arithmetic parser to judge.
pub fn segments(equation: &str) -> Vec<Segment<'_>> {
    match many0(segment).parse(equation) {
        Ok((_, segments)) => segments,
        Err(_) => vec![Segment::Text(equation)],
    }
}

/// Every field an equation depends on, in order of first occurrence.
///
/// Includes fields named inside function argument lists.
pub fn field_references(equation: &str) -> Vec<FieldReference> {
    let mut seen = HashSet::new();
    let mut refs = Vec::new();
    for segment in segments(equation) {
        let names = match segment {
            Segment::Text(_) => continue,
            Segment::Placeholder(name) => vec![name],
            Segment::Call(call) => call.fields,
        };
        for name in names {
            if seen.insert(name) {
                refs.push(FieldReference::new(name));
            }
        }
    }
    refs
}

fn segment(input: &str) -> IResult<&str, Segment<'_>> {
    alt((
        map(function_call, Segment::Call),
        map(placeholder, Segment::Placeholder),
        map(identifier, Segment::Text),
        map(
            take_till1(|c: char| c == '{' || c.is_alphabetic() || c == '_'),
            Segment::Text,
        ),
        map(recognize(anychar), Segment::Text),
    ))
    .parse(input)
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize((
        take_while1(|c: char| c.is_alphabetic() || c == '_'),
        take_while(|c: char| c.is_alphanumeric() || c == '_'),
    ))
    .parse(input)
}

fn field_name(input: &str) -> IResult<&str, &str> {
    verify(
        map(
            take_while1(|c: char| !matches!(c, '{' | '}' | ',')),
            str::trim,
        ),
        |name: &str| !name.is_empty(),
    )
    .parse(input)
}

fn placeholder(input: &str) -> IResult<&str, &str> {
    delimited(char('{'), field_name, char('}')).parse(input)
}

fn function_call(input: &str) -> IResult<&str, FunctionCall<'_>> {
    map(
        consumed((
            identifier,
            multispace0,
            char('('),
            multispace0,
            char('{'),
            separated_list1(char(','), field_name),
            char('}'),
            multispace0,
            char(')'),
        )),
        |(text, (name, _, _, _, _, fields, _, _, _))| FunctionCall { name, fields, text },
    )
    .parse(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segments_plain_arithmetic() {
        assert_eq!(segments("1+2*3"), vec![Segment::Text("1+2*3")]);
        assert!(segments("").is_empty());
    }

    #[test]
    fn test_segments_placeholders() {
        assert_eq!(
            segments("{price}*{qty}+1"),
            vec![
                Segment::Placeholder("price"),
                Segment::Text("*"),
                Segment::Placeholder("qty"),
                Segment::Text("+1"),
            ]
        );
    }

    #[test]
    fn test_placeholder_names_are_trimmed() {
        assert_eq!(segments("{ a }"), vec![Segment::Placeholder("a")]);
    }

    #[test]
    fn test_segments_function_call() {
        let segs = segments("sum({a, b ,c})/2");
        assert_eq!(segs.len(), 2);
        match &segs[0] {
            Segment::Call(call) => {
                assert_eq!(call.name, "sum");
                assert_eq!(call.fields, vec!["a", "b", "c"]);
                assert_eq!(call.text, "sum({a, b ,c})");
            }
            other => panic!("expected call, got {other:?}"),
        }
        assert_eq!(segs[1], Segment::Text("/2"));
    }

    #[test]
    fn test_function_call_tolerates_whitespace() {
        let segs = segments("countNotEmpty ( {x} )");
        assert!(matches!(&segs[0], Segment::Call(call) if call.name == "countNotEmpty" && call.fields == vec!["x"]));
    }

    #[test]
    fn test_identifier_without_call_is_text() {
        assert_eq!(
            segments("sum(1)"),
            vec![Segment::Text("sum"), Segment::Text("(1)")]
        );
    }

    #[test]
    fn test_call_name_is_whole_identifier() {
        let segs = segments("xsum({a})");
        assert!(matches!(&segs[0], Segment::Call(call) if call.name == "xsum"));
    }

    #[test]
    fn test_stray_braces_are_text() {
        assert_eq!(
            segments("{a,b}"),
            vec![
                Segment::Text("{"),
                Segment::Text("a"),
                Segment::Text(","),
                Segment::Text("b"),
                Segment::Text("}"),
            ]
        );
        assert_eq!(segments("{}"), vec![Segment::Text("{"), Segment::Text("}")]);
    }

    #[test]
    fn test_field_references_order_and_dedup() {
        let refs = field_references("{b}+avg({a,b,c})*{a}+{d}");
        let names: Vec<_> = refs.iter().map(|r| r.field_name.as_str()).collect();
        assert_eq!(names, vec!["b", "a", "c", "d"]);
        assert!(refs.iter().all(|r| r.eq_name == r.field_name));
    }

    #[test]
    fn test_field_references_none() {
        assert!(field_references("(1+2)*3").is_empty());
    }
}
