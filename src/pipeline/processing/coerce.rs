//! Lenient numeric coercion of survey cells.
//!
//! Survey exports mix units, footnote markers and locale-specific separators
//! into numeric columns. Coercion never fails: anything without a recognizable
//! number becomes `None`.

use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

use crate::table::Cell;

/// A numeric column; `None` marks a missing value.
pub type NumericColumn = Vec<Option<f64>>;

static NUMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[-+]?\d*\.?\d+(?:[eE][-+]?\d+)?").expect("numeric pattern is valid")
});

/// Extract the first signed decimal / scientific-notation number in `text`.
///
/// Commas are decimal separators unless the text also contains a period, in
/// which case they are thousands separators and are dropped.
pub fn coerce_str(text: &str) -> Option<f64> {
    let normalized: Cow<'_, str> = if text.contains(',') {
        if text.contains('.') {
            Cow::Owned(text.replace(',', ""))
        } else {
            Cow::Owned(text.replace(',', "."))
        }
    } else {
        Cow::Borrowed(text)
    };

    NUMBER_RE
        .find(&normalized)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

pub fn coerce_cell(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Missing => None,
        Cell::Number(v) => Some(*v).filter(|v| v.is_finite()),
        Cell::Text(s) => coerce_str(s),
    }
}

pub fn to_numeric(cells: &[Cell]) -> NumericColumn {
    cells.iter().map(coerce_cell).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thousands_and_exponent() {
        assert_eq!(coerce_str("1,234.5e2"), Some(123450.0));
    }

    #[test]
    fn test_comma_decimal_separator() {
        assert_eq!(coerce_str("3,14"), Some(3.14));
    }

    #[test]
    fn test_not_a_number() {
        assert_eq!(coerce_str("n/a"), None);
        assert_eq!(coerce_str("NaN"), None);
        assert_eq!(coerce_str("-"), None);
        assert_eq!(coerce_str(""), None);
    }

    #[test]
    fn test_embedded_units_and_markers() {
        assert_eq!(coerce_str("  3.14 units"), Some(3.14));
        assert_eq!(coerce_str("<0.5"), Some(0.5));
        assert_eq!(coerce_str("5772 K [a]"), Some(5772.0));
        assert_eq!(coerce_str("-2.5e-3"), Some(-0.0025));
        assert_eq!(coerce_str(".75"), Some(0.75));
    }

    #[test]
    fn test_overflow_is_missing() {
        assert_eq!(coerce_str("1e999"), None);
    }

    #[test]
    fn test_cells() {
        let cells = vec![
            Cell::Number(2.0),
            Cell::Number(f64::INFINITY),
            Cell::Missing,
            Cell::Text("FP".into()),
            Cell::Text("12".into()),
        ];
        assert_eq!(to_numeric(&cells), vec![Some(2.0), None, None, None, Some(12.0)]);
    }
}
