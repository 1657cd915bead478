//! Course numbers such as "121" or "121c", ordered by (number, letter).

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

/// Numeric part used when a course number has no parseable digits
pub const UNPARSEABLE_NUMBER: u32 = 999;

/// Letter part used when a course number has no trailing letter. Sorts before 'A'.
pub const NO_LETTER: char = '0';

static COURSE_NUMBER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d*)\s*([A-Za-z]?)\s*$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct CourseNumber {
    pub number: u32,
    pub letter: char,
}

impl CourseNumber {
    /// Splits "121c" into (121, 'C'). Never fails: missing digits become
    /// [`UNPARSEABLE_NUMBER`] and a missing letter becomes [`NO_LETTER`].
    pub fn parse(raw: &str) -> Self {
        let Some(caps) = COURSE_NUMBER_REGEX.captures(raw) else {
            return Self {
                number: UNPARSEABLE_NUMBER,
                letter: NO_LETTER,
            };
        };

        let number = caps
            .get(1)
            .and_then(|m| m.as_str().parse::<u32>().ok())
            .unwrap_or(UNPARSEABLE_NUMBER);
        let letter = caps
            .get(2)
            .and_then(|m| m.as_str().chars().next())
            .map(|c| c.to_ascii_uppercase())
            .unwrap_or(NO_LETTER);

        Self { number, letter }
    }

    /// True if this number lies in `[lower, upper]`.
    ///
    /// Strictly between the two numeric parts always matches; on a boundary
    /// number the letter decides (at or after the lower letter, at or before
    /// the upper letter).
    pub fn in_range(&self, lower: &CourseNumber, upper: &CourseNumber) -> bool {
        (self.number > lower.number && self.number < upper.number)
            || (self.number == lower.number && self.letter >= lower.letter)
            || (self.number == upper.number && self.letter <= upper.letter)
    }
}

impl fmt::Display for CourseNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.letter == NO_LETTER {
            write!(f, "{}", self.number)
        } else {
            write!(f, "{}{}", self.number, self.letter)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cn(raw: &str) -> CourseNumber {
        CourseNumber::parse(raw)
    }

    fn in_range(n: &str, lower: &str, upper: &str) -> bool {
        cn(n).in_range(&cn(lower), &cn(upper))
    }

    #[test]
    fn test_parse() {
        assert_eq!(cn("121c"), CourseNumber { number: 121, letter: 'C' });
        assert_eq!(cn("121"), CourseNumber { number: 121, letter: '0' });
        assert_eq!(cn(" 7a "), CourseNumber { number: 7, letter: 'A' });
        assert_eq!(cn("abc"), CourseNumber { number: 999, letter: '0' });
        assert_eq!(cn("x"), CourseNumber { number: 999, letter: 'X' });
        assert_eq!(cn(""), CourseNumber { number: 999, letter: '0' });
    }

    #[test]
    fn test_letter_variants_sort_between_numbers() {
        let mut numbers = vec![cn("122"), cn("121c"), cn("121"), cn("121a"), cn("99")];
        numbers.sort();
        let printed: Vec<String> = numbers.iter().map(|n| n.to_string()).collect();
        assert_eq!(printed, vec!["99", "121", "121A", "121C", "122"]);
    }

    #[test]
    fn test_range_boundaries() {
        assert!(in_range("121c", "121", "200"));
        assert!(!in_range("121c", "121d", "200"));
        assert!(in_range("121", "101", "121c"));
        assert!(!in_range("121c", "101", "121"));
        assert!(in_range("150", "101", "200"));
        assert!(!in_range("201", "101", "200"));
        assert!(!in_range("100z", "101", "200"));
    }
}
