// Label-anchored extraction of certificate fields from raw OCR text.
use crate::models::ExtractedFields;
use chrono::Datelike;
use lazy_static::lazy_static;
use regex::Regex;

// Anchor tables for the four certificate fields. Extraction is best-effort
// throughout: a field with no anchor in the text comes back as None and
// scores zero downstream, it never fails the request.
lazy_static! {
    static ref NAME_ANCHOR_PATTERNS: Vec<Regex> = vec![
        // Certifying phrase up to the completion anchor, a blank line or EOF
        Regex::new(r"(?is)(?:this\s+is\s+to\s+certify\s+that|this\s+certifies\s+that|certif(?:y|ies)\s+that)\s+(.{2,80}?)(?:\s+ha(?:s|ve)\s+(?:successfully\s+)?completed|\s*\n\s*\n|\s*$)").unwrap(),
        // Labeled variants seen on grade cards
        Regex::new(r"(?i)name\s+of\s+the\s+(?:student|candidate)\s*[:\-]?\s*([^\n]+)").unwrap(),
        Regex::new(r"(?i)student\s+name\s*[:\-]?\s*([^\n]+)").unwrap(),
    ];

    static ref INSTITUTION_LABEL_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)name\s+of\s+the\s+(?:college|institution)\s*[:\-]?\s*([^\n]+)").unwrap(),
        Regex::new(r"(?i)(?:college|institution|institute)\s+name\s*[:\-]?\s*([^\n]+)").unwrap(),
    ];

    static ref INSTITUTION_FROM_PATTERN: Regex =
        Regex::new(r"(?is)\bfrom\b[\s:]+(.{3,100}?)(?:\s+in\s+the\s+year\b|\s*\n|$)").unwrap();

    static ref DEGREE_ANCHOR_PATTERN: Regex =
        Regex::new(r"(?is)ha(?:s|ve)\s+(?:successfully\s+)?completed\s+the\s+(?:course|program(?:me)?|degree)\s+(?:of\s+|in\s+)?(.{2,80}?)(?:\s+from\b|\s*\n|$)").unwrap();

    static ref DEGREE_KEYWORD_PATTERN: Regex =
        Regex::new(r"(?im)^(.*\b(?:B\.E\.?|B\.?Tech\b|M\.?Tech\b|B\.?Sc\b|M\.?Sc\b|B\.?Com\b|MBA\b|BBA\b|BCA\b|MCA\b|Bachelor|Master|Diploma|Ph\.?D\b).*)$").unwrap();

    static ref TRAILING_MONTH_YEAR: Regex =
        Regex::new(r"(?i)[\s,]*(?:january|february|march|april|may|june|july|august|september|october|november|december)?\s*(?:19|20)\d{2}\s*$").unwrap();

    static ref YEAR_LABEL_PATTERN: Regex =
        Regex::new(r"(?i)(?:in\s+the\s+year|year\s+of\s+(?:passing|completion)|year)\s*[:\-]?\s*((?:19|20)\d{2})").unwrap();

    static ref YEAR_ANY_PATTERN: Regex = Regex::new(r"\b((?:19|20)\d{2})\b").unwrap();

    // Fixed-layout university serial: digit, two letters, two-digit batch
    // year, two letters, three digits (1BG19CS100). The only code shape a
    // year may be recovered from.
    static ref BATCH_CODE_PATTERN: Regex =
        Regex::new(r"^[0-9][A-Z]{2}([0-9]{2})[A-Z]{2}[0-9]{3}$").unwrap();
}

// Headings that disqualify an all-uppercase line from being read as a name.
const NAME_STOPWORDS: [&str; 12] = [
    "CERTIFICATE", "GRADE", "CARD", "UNIVERSITY", "COLLEGE", "INSTITUTE",
    "ACADEMY", "DEPARTMENT", "EXAMINATION", "COMPLETION", "TRANSCRIPT", "MARKS",
];

const INSTITUTION_KEYWORDS: [&str; 7] = [
    "INSTITUTE", "UNIVERSITY", "COLLEGE", "ACADEMY", "POLYTECHNIC", "SCHOOL",
    "INSTITUTION",
];

pub struct FieldExtractor;

impl FieldExtractor {
    /// Parse certificate fields out of raw OCR text. Each field is
    /// independent; any of them may come back absent.
    pub fn extract_fields(text: &str) -> ExtractedFields {
        ExtractedFields {
            name: Self::extract_name(text),
            institution: Self::extract_institution(text),
            degree: Self::extract_degree(text),
            year: Self::extract_year(text),
            raw_text: text.to_string(),
        }
    }

    fn extract_name(text: &str) -> Option<String> {
        for pattern in NAME_ANCHOR_PATTERNS.iter() {
            if let Some(captures) = pattern.captures(text) {
                if let Some(matched) = captures.get(1) {
                    // An anchored capture may span lines; the name is on the first
                    let first_line = matched.as_str().lines().next().unwrap_or("");
                    let value = collapse_whitespace(first_line);
                    let lower = value.to_lowercase();
                    // A blank name line makes the capture slide onto the
                    // completion phrase itself; skip to the fallbacks.
                    let anchor_bleed = lower.starts_with("has ") || lower.starts_with("have ");
                    if value.len() >= 3 && !value.contains(':') && !anchor_bleed {
                        return Some(value);
                    }
                }
            }
        }
        // Fallback: first all-uppercase line of plausible name length
        for line in text.lines() {
            let line = line.trim();
            let words: Vec<&str> = line.split_whitespace().collect();
            if !(2..=4).contains(&words.len()) {
                continue;
            }
            let upper_shape = line
                .chars()
                .all(|c| c.is_ascii_uppercase() || c == ' ' || c == '.' || c == '\'' || c == '-');
            if !upper_shape || line.len() < 5 {
                continue;
            }
            if NAME_STOPWORDS.iter().any(|w| line.contains(w)) {
                continue;
            }
            return Some(collapse_whitespace(line));
        }
        None
    }

    fn extract_institution(text: &str) -> Option<String> {
        for pattern in INSTITUTION_LABEL_PATTERNS.iter() {
            if let Some(captures) = pattern.captures(text) {
                if let Some(matched) = captures.get(1) {
                    let value = collapse_whitespace(matched.as_str());
                    if value.len() >= 3 {
                        return Some(value);
                    }
                }
            }
        }
        // "from <institution-shaped phrase>"
        for captures in INSTITUTION_FROM_PATTERN.captures_iter(text) {
            if let Some(matched) = captures.get(1) {
                let value = collapse_whitespace(matched.as_str());
                let upper = value.to_uppercase();
                if INSTITUTION_KEYWORDS.iter().any(|k| upper.contains(k)) {
                    return Some(value);
                }
            }
        }
        None
    }

    fn extract_degree(text: &str) -> Option<String> {
        if let Some(captures) = DEGREE_ANCHOR_PATTERN.captures(text) {
            if let Some(matched) = captures.get(1) {
                let value = strip_trailing_month_year(&collapse_whitespace(matched.as_str()));
                if value.len() >= 2 {
                    return Some(value);
                }
            }
        }
        // Fallback: a line carrying a known degree keyword
        if let Some(captures) = DEGREE_KEYWORD_PATTERN.captures(text) {
            if let Some(matched) = captures.get(1) {
                let value = strip_trailing_month_year(&collapse_whitespace(matched.as_str()));
                if (2..=80).contains(&value.len()) {
                    return Some(value);
                }
            }
        }
        None
    }

    fn extract_year(text: &str) -> Option<i32> {
        let max_year = current_year() + 1;
        let in_window = |y: i32| (1950..=max_year).contains(&y);

        if let Some(captures) = YEAR_LABEL_PATTERN.captures(text) {
            if let Some(year) = captures.get(1).and_then(|m| m.as_str().parse().ok()) {
                if in_window(year) {
                    return Some(year);
                }
            }
        }
        for captures in YEAR_ANY_PATTERN.captures_iter(text) {
            if let Some(year) = captures.get(1).and_then(|m| m.as_str().parse().ok()) {
                if in_window(year) {
                    return Some(year);
                }
            }
        }
        None
    }

    /// Best-effort recovery of a batch year embedded in a university-serial
    /// identifier (1BG19CS100 -> 2019). Applies to that code shape only.
    pub fn batch_year_from_code(normalized_id: &str) -> Option<i32> {
        let captures = BATCH_CODE_PATTERN.captures(normalized_id)?;
        let two_digit: i32 = captures.get(1)?.as_str().parse().ok()?;
        let year = 2000 + two_digit;
        if year > current_year() + 1 {
            Some(1900 + two_digit)
        } else {
            Some(year)
        }
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn strip_trailing_month_year(s: &str) -> String {
    TRAILING_MONTH_YEAR.replace(s, "").trim().to_string()
}

fn current_year() -> i32 {
    chrono::Utc::now().year()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_CERTIFICATE: &str = "\
CERTIFICATE OF COMPLETION

This is to certify that

SAKSHAM SHARMA

has successfully completed the course

B.Tech Computer Engineering

from

DevLabs Institute

in the year 2023

Registration Number: ABC2023001

Date of Issue: December 2023";

    const SAMPLE_GRADE_CARD: &str = "\
VISVESVARAYA TECHNOLOGICAL UNIVERSITY, BELAGAVI
KARNATAKA, INDIA
GRADE CARD
B.E. Computer Science & Engineering August 2020
Name of the Student: VIKRAM VERMA
Father o / Mothers Name : ASHOK VERMA
Name of the College: B.N.M. INSTITUTE OF TECHNOLOGY, BANGALORE
USN: 1BG19CS100";

    #[test]
    fn test_certificate_fields() {
        let fields = FieldExtractor::extract_fields(SAMPLE_CERTIFICATE);
        assert_eq!(fields.name.as_deref(), Some("SAKSHAM SHARMA"));
        assert_eq!(fields.institution.as_deref(), Some("DevLabs Institute"));
        assert_eq!(fields.degree.as_deref(), Some("B.Tech Computer Engineering"));
        assert_eq!(fields.year, Some(2023));
    }

    #[test]
    fn test_grade_card_fields() {
        let fields = FieldExtractor::extract_fields(SAMPLE_GRADE_CARD);
        assert_eq!(fields.name.as_deref(), Some("VIKRAM VERMA"));
        assert_eq!(
            fields.institution.as_deref(),
            Some("B.N.M. INSTITUTE OF TECHNOLOGY, BANGALORE")
        );
        assert_eq!(
            fields.degree.as_deref(),
            Some("B.E. Computer Science & Engineering")
        );
        assert_eq!(fields.year, Some(2020));
    }

    #[test]
    fn test_all_caps_name_fallback() {
        let text = "CERTIFICATE OF MERIT\nJOHN ALAN DOE\nawarded 2021";
        let fields = FieldExtractor::extract_fields(text);
        assert_eq!(fields.name.as_deref(), Some("JOHN ALAN DOE"));
    }

    #[test]
    fn test_missing_fields_are_none() {
        let fields = FieldExtractor::extract_fields("nothing useful here");
        assert_eq!(fields.name, None);
        assert_eq!(fields.institution, None);
        assert_eq!(fields.degree, None);
        assert_eq!(fields.year, None);
    }

    #[test]
    fn test_empty_text() {
        let fields = FieldExtractor::extract_fields("");
        assert_eq!(fields.name, None);
        assert_eq!(fields.year, None);
        assert_eq!(fields.raw_text, "");
    }

    #[test]
    fn test_institution_requires_institution_shape() {
        // "from" followed by a non-institutional phrase must not match
        let text = "graduated from the morning session";
        let fields = FieldExtractor::extract_fields(text);
        assert_eq!(fields.institution, None);
    }

    #[test]
    fn test_year_out_of_window_skipped() {
        let text = "printed 1802, awarded in the year 2021";
        let fields = FieldExtractor::extract_fields(text);
        assert_eq!(fields.year, Some(2021));
    }

    #[test]
    fn test_batch_year_from_code() {
        assert_eq!(FieldExtractor::batch_year_from_code("1BG19CS100"), Some(2019));
        assert_eq!(FieldExtractor::batch_year_from_code("ABC2023001"), None);
        assert_eq!(FieldExtractor::batch_year_from_code("123456"), None);
    }
}
