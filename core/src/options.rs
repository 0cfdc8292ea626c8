//! Locale and engine configuration.

/// Sentinel for [`FormatOptions::decimal_places`] meaning "no forced rounding".
pub const NATURAL_PRECISION: i32 = -1;

/// Upper bound on fixed decimal places; larger requests are rendered with this many.
pub const MAX_DECIMAL_PLACES: usize = 100;

/// How numbers are read from fields and written back for display.
///
/// `thousands_separators` and `decimal_separators` are the sets of characters
/// recognized on input. Only the first entry of each is used on output.
///
/// The two sets must be disjoint. Thousands characters are stripped before
/// decimal characters are replaced, so a character present in both sets is
/// always treated as grouping noise. This is not checked at runtime.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FormatOptions {
    /// Digits after the decimal point, or [`NATURAL_PRECISION`]. Capped at
    /// [`MAX_DECIMAL_PLACES`] when rendering.
    pub decimal_places: i32,
    pub thousands_separators: Vec<char>,
    pub decimal_separators: Vec<char>,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            decimal_places: NATURAL_PRECISION,
            thousands_separators: vec![','],
            decimal_separators: vec!['.'],
        }
    }
}

impl FormatOptions {
    /// `1.234,5` style: dot or space grouping, comma decimals.
    pub fn european() -> Self {
        Self {
            decimal_places: NATURAL_PRECISION,
            thousands_separators: vec!['.', ' '],
            decimal_separators: vec![','],
        }
    }

    pub fn with_decimal_places(mut self, places: i32) -> Self {
        self.decimal_places = places;
        self
    }

    pub fn with_thousands_separators(mut self, separators: impl IntoIterator<Item = char>) -> Self {
        self.thousands_separators = separators.into_iter().collect();
        self
    }

    pub fn with_decimal_separators(mut self, separators: impl IntoIterator<Item = char>) -> Self {
        self.decimal_separators = separators.into_iter().collect();
        self
    }

    /// Rounding target, or `None` when results keep their natural precision.
    pub fn fixed_places(&self) -> Option<usize> {
        usize::try_from(self.decimal_places)
            .ok()
            .map(|places| places.min(MAX_DECIMAL_PLACES))
    }

    pub fn output_thousands_separator(&self) -> Option<char> {
        self.thousands_separators.first().copied()
    }

    pub fn output_decimal_separator(&self) -> char {
        self.decimal_separators.first().copied().unwrap_or('.')
    }
}

/// Everything that affects a calculation besides the registry.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineOptions {
    pub format: FormatOptions,
    /// Substitute `0` for placeholders whose field is blank.
    pub empty_as_zero: bool,
    /// Drop fractional digits from integral results.
    pub smart_integers: bool,
}

impl EngineOptions {
    pub fn with_format(mut self, format: FormatOptions) -> Self {
        self.format = format;
        self
    }

    pub fn with_empty_as_zero(mut self, enabled: bool) -> Self {
        self.empty_as_zero = enabled;
        self
    }

    pub fn with_smart_integers(mut self, enabled: bool) -> Self {
        self.smart_integers = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_format_options() {
        let opts = FormatOptions::default();
        assert_eq!(opts.decimal_places, NATURAL_PRECISION);
        assert_eq!(opts.fixed_places(), None);
        assert_eq!(opts.output_thousands_separator(), Some(','));
        assert_eq!(opts.output_decimal_separator(), '.');
    }

    #[test]
    fn test_builders() {
        let opts = FormatOptions::default()
            .with_decimal_places(2)
            .with_thousands_separators(Vec::new())
            .with_decimal_separators([',', '.']);
        assert_eq!(opts.fixed_places(), Some(2));
        assert_eq!(opts.output_thousands_separator(), None);
        assert_eq!(opts.output_decimal_separator(), ',');

        assert_eq!(opts.clone().with_decimal_places(100).fixed_places(), Some(100));
        assert_eq!(
            opts.clone().with_decimal_places(1_000_000_000).fixed_places(),
            Some(MAX_DECIMAL_PLACES)
        );
        assert_eq!(opts.with_decimal_places(-7).fixed_places(), None);

        let engine = EngineOptions::default()
            .with_format(FormatOptions::european())
            .with_empty_as_zero(true)
            .with_smart_integers(true);
        assert!(engine.empty_as_zero);
        assert!(engine.smart_integers);
        assert_eq!(engine.format.output_thousands_separator(), Some('.'));
    }

    #[test]
    fn test_empty_decimal_list_falls_back_to_dot() {
        let opts = FormatOptions::default().with_decimal_separators(Vec::new());
        assert_eq!(opts.output_decimal_separator(), '.');
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_partial_options() {
        let opts: EngineOptions = serde_json::from_str(
            r#"{ "format": { "decimal_places": 2, "thousands_separators": ["."], "decimal_separators": [","] }, "empty_as_zero": true }"#,
        )
        .unwrap();
        assert_eq!(opts.format.decimal_places, 2);
        assert_eq!(opts.format.thousands_separators, vec!['.']);
        assert_eq!(opts.format.decimal_separators, vec![',']);
        assert!(opts.empty_as_zero);
        assert!(!opts.smart_integers);
    }
}
