use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Pixel spacing in millimeters (row, column)
///
/// Physical distance between the centers of adjacent rows and adjacent
/// columns of a reference slice, in mm.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct PixelSpacing {
    pub row: f64,
    pub col: f64,
}

impl PixelSpacing {
    /// Creates a new PixelSpacing
    pub fn new(row: f64, col: f64) -> Self {
        Self { row, col }
    }

    /// Parses pixel spacing from string
    ///
    /// Accepts formats like:
    /// - "0.5\\0.5"
    /// - "0.5 0.5"
    /// - "[0.5, 0.5]"
    /// - Exponential notation: "5e-1 5e-1"
    ///
    /// # Errors
    ///
    /// Returns an error if the string does not hold two numbers
    pub fn parse(s: &str) -> Result<Self, String> {
        match parse_decimals(s).as_slice() {
            [row, col, ..] => Ok(PixelSpacing::new(*row, *col)),
            _ => Err(format!("Failed to parse PixelSpacing from '{}'", s)),
        }
    }

    /// Returns the values in DICOM order (row spacing, column spacing)
    pub fn to_array(&self) -> [f64; 2] {
        [self.row, self.col]
    }
}

/// Extracts every decimal number from a loosely formatted string
///
/// Some vendors write multi-valued DS attributes with spaces or brackets
/// instead of backslashes. Unparseable fragments are skipped.
pub(crate) fn parse_decimals(s: &str) -> Vec<f64> {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    let re = REGEX.get_or_init(|| {
        Regex::new(r"[-+]?\d*\.?\d+(?:[eE][-+]?\d+)?").expect("Failed to compile regex")
    });

    re.find_iter(s)
        .filter_map(|m| m.as_str().parse().ok())
        .collect()
}

impl fmt::Display for PixelSpacing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x {} mm", self.row, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_backslash_separator() {
        let ps = PixelSpacing::parse("0.5\\0.5").unwrap();
        assert_eq!(ps.row, 0.5);
        assert_eq!(ps.col, 0.5);
    }

    #[test]
    fn test_parse_space_separator() {
        let ps = PixelSpacing::parse("0.390625 0.46875").unwrap();
        assert_eq!(ps.row, 0.390625);
        assert_eq!(ps.col, 0.46875);
    }

    #[test]
    fn test_parse_array_format() {
        let ps = PixelSpacing::parse("[0.5, 0.5]").unwrap();
        assert_eq!(ps.to_array(), [0.5, 0.5]);
    }

    #[test]
    fn test_parse_exponential_notation() {
        let ps = PixelSpacing::parse("5e-1\\2.5e+0").unwrap();
        assert_eq!(ps.row, 0.5);
        assert_eq!(ps.col, 2.5);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(PixelSpacing::parse("invalid").is_err());
        assert!(PixelSpacing::parse("").is_err());
        assert!(PixelSpacing::parse("0.5").is_err());
    }

    #[test]
    fn test_parse_decimals_signed_position() {
        assert_eq!(
            parse_decimals("-120.5\\-98.25\\12"),
            vec![-120.5, -98.25, 12.0]
        );
    }
}
