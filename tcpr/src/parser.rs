//! Test case line parser and validator
//!
//! Line grammar:
//!
//! ```text
//! TCID "," WS* DIGITS WS* "," STEP_SEGMENT
//! STEP_SEGMENT = STEP (";" STEP)*
//! STEP         = DIGITS "-" TEXT
//! ```
//!
//! The line is split on the first two commas only, so step descriptions may
//! themselves contain commas. Step numbers are counted, not checked for order
//! or uniqueness.

use crate::error::ParseError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Step marker: an integer directly followed by a hyphen, starting on a word boundary
pub static STEP_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d+-").expect("step marker pattern is valid"));

/// One parsed test case description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    /// Test case identifier (non-empty)
    pub id: String,
    /// Step descriptions in input order, each still carrying its `N-` prefix
    pub steps: Vec<String>,
    /// Step count declared in the line; equals the number of step markers
    pub declared_step_count: u32,
    /// Raw step segment text (everything after the second comma, trimmed)
    pub step_segment: String,
    /// Verbatim source line
    pub raw: String,
}

/// Parse one line into a [`TestCase`]
pub fn parse_line(line: &str) -> Result<TestCase, ParseError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Err(ParseError::EmptyInput);
    }

    let mut parts = trimmed.splitn(3, ',');
    let (tcid, count_str, step_segment) = match (parts.next(), parts.next(), parts.next()) {
        (Some(tcid), Some(count), Some(segment)) => (tcid.trim(), count.trim(), segment.trim()),
        _ => {
            return Err(ParseError::MalformedStructure(
                "expected `TCID, step_count, steps`".to_string(),
            ))
        }
    };

    if tcid.is_empty() {
        return Err(ParseError::MalformedStructure("empty TCID".to_string()));
    }

    let declared_step_count = parse_step_count(count_str)?;

    let found = count_step_markers(step_segment);
    if found != declared_step_count as usize {
        return Err(ParseError::StepCountMismatch {
            declared: declared_step_count,
            found,
        });
    }

    let steps = step_segment
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    Ok(TestCase {
        id: tcid.to_string(),
        steps,
        declared_step_count,
        step_segment: step_segment.to_string(),
        raw: line.to_string(),
    })
}

/// True iff [`parse_line`] accepts the line
pub fn validate(line: &str) -> bool {
    parse_line(line).is_ok()
}

/// Number of step markers in a step segment
pub fn count_step_markers(segment: &str) -> usize {
    STEP_MARKER.find_iter(segment).count()
}

/// Remove every step marker, leaving the plain keyword text
pub fn strip_step_markers(segment: &str) -> String {
    STEP_MARKER.replace_all(segment, "").trim().to_string()
}

/// Step description for display: leading `N-` removed
pub fn display_step(step: &str) -> &str {
    match STEP_MARKER.find(step) {
        Some(m) if m.start() == 0 => step[m.end()..].trim(),
        _ => step.trim(),
    }
}

fn parse_step_count(value: &str) -> Result<u32, ParseError> {
    // Digits only: rejects signs, decimals and embedded whitespace
    if value.is_empty() || !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(ParseError::NonNumericStepCount(value.to_string()));
    }
    value
        .parse::<u32>()
        .map_err(|_| ParseError::NonNumericStepCount(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_step_login_logout() {
        let case = parse_line("TC1,2,1-login; 2-logout").unwrap();
        assert_eq!(case.id, "TC1");
        assert_eq!(case.steps, vec!["1-login", "2-logout"]);
        assert_eq!(case.declared_step_count, 2);
        assert_eq!(case.step_segment, "1-login; 2-logout");
    }

    #[test]
    fn test_declared_count_mismatch() {
        let err = parse_line("TC2,3,1-a; 2-b").unwrap_err();
        assert_eq!(
            err,
            ParseError::StepCountMismatch {
                declared: 3,
                found: 2
            }
        );
    }

    #[test]
    fn test_whitespace_around_fields() {
        let case = parse_line("  TC7 ,  1 ,  1-open settings  ").unwrap();
        assert_eq!(case.id, "TC7");
        assert_eq!(case.steps, vec!["1-open settings"]);
    }

    #[test]
    fn test_commas_inside_steps() {
        let case = parse_line("TC3,2,1-enter name, surname; 2-submit, wait").unwrap();
        assert_eq!(case.steps, vec!["1-enter name, surname", "2-submit, wait"]);
    }

    #[test]
    fn test_zero_steps_accepted() {
        let case = parse_line("TC4,0,").unwrap();
        assert!(case.steps.is_empty());
        assert_eq!(case.declared_step_count, 0);

        let case = parse_line("TC5,0,free text without markers").unwrap();
        assert_eq!(case.declared_step_count, 0);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse_line(""), Err(ParseError::EmptyInput));
        assert_eq!(parse_line("   \t "), Err(ParseError::EmptyInput));
    }

    #[test]
    fn test_missing_fields() {
        assert!(matches!(
            parse_line("TC1,2"),
            Err(ParseError::MalformedStructure(_))
        ));
        assert!(matches!(
            parse_line("just text"),
            Err(ParseError::MalformedStructure(_))
        ));
        assert!(matches!(
            parse_line(" ,1,1-a"),
            Err(ParseError::MalformedStructure(_))
        ));
    }

    #[test]
    fn test_non_numeric_step_count() {
        for bad in ["TC1,two,1-a; 2-b", "TC1,-1,1-a", "TC1,1.0,1-a", "TC1,,1-a", "TC1,1 2,1-a"] {
            assert!(
                matches!(parse_line(bad), Err(ParseError::NonNumericStepCount(_))),
                "{} should be rejected",
                bad
            );
        }
        assert!(matches!(
            parse_line("TC1,99999999999,1-a"),
            Err(ParseError::NonNumericStepCount(_))
        ));
    }

    #[test]
    fn test_markers_must_start_a_token() {
        // "a1-" has no word boundary before the digit
        assert_eq!(count_step_markers("1-a; xa1-b"), 1);
        assert_eq!(count_step_markers("1-a;2-b; 10-c"), 3);
        assert_eq!(count_step_markers("no markers here"), 0);
    }

    #[test]
    fn test_duplicate_step_numbers_not_checked() {
        assert!(validate("TC1,2,1-a; 1-b"));
        assert!(validate("TC1,2,2-a; 1-b"));
    }

    #[test]
    fn test_strip_markers() {
        assert_eq!(strip_step_markers("1-login; 2-logout"), "login; logout");
        assert_eq!(strip_step_markers(""), "");
    }

    #[test]
    fn test_display_step() {
        assert_eq!(display_step("12-click save"), "click save");
        assert_eq!(display_step("click 1-save"), "click 1-save");
    }

    #[test]
    fn test_raw_line_kept_verbatim() {
        let line = " TC1,1,1-a ";
        assert_eq!(parse_line(line).unwrap().raw, line);
    }
}
