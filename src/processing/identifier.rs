// Candidate registration-number extraction from raw OCR text.
use crate::models::{IdentifierCandidate, PatternKind};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

// Ordered rule table for identifier extraction. Label-anchored rules rank
// above bare code shapes, which rank above digit runs; new label variants or
// code eras are added here, not in the extraction logic.
lazy_static! {
    static ref IDENTIFIER_RULES: Vec<(Regex, PatternKind)> = vec![
        // Explicit label anchors
        (
            Regex::new(r"(?i)registration\s*(?:number|no\.?)\s*[:#\-]?\s*([A-Z0-9][A-Z0-9 ]{3,16}[A-Z0-9])").unwrap(),
            PatternKind::Labeled,
        ),
        (
            Regex::new(r"(?i)\bregn?\.?\s*no\.?\s*[:#\-]?\s*([A-Z0-9][A-Z0-9 ]{3,16}[A-Z0-9])").unwrap(),
            PatternKind::Labeled,
        ),
        (
            Regex::new(r"(?i)\broll\s*(?:number|no\.?)\s*[:#\-]?\s*([A-Z0-9][A-Z0-9 ]{3,16}[A-Z0-9])").unwrap(),
            PatternKind::Labeled,
        ),
        (
            Regex::new(r"(?i)\busn\s*[:#\-]?\s*([A-Z0-9][A-Z0-9 ]{3,16}[A-Z0-9])").unwrap(),
            PatternKind::Labeled,
        ),
        (
            Regex::new(r"(?i)\bserial\s*(?:number|no\.?)\s*[:#\-]?\s*([A-Z0-9][A-Z0-9 ]{3,16}[A-Z0-9])").unwrap(),
            PatternKind::Labeled,
        ),
        // Unlabeled institutional code shapes: fixed-layout university
        // serials (1BG19CS100) and letter-prefixed numerics (ABC2023001)
        (
            Regex::new(r"(?i)\b([0-9][A-Z]{2}[0-9]{2}[A-Z]{2}[0-9]{3})\b").unwrap(),
            PatternKind::InstitutionalCode,
        ),
        (
            Regex::new(r"(?i)\b([A-Z]{2,4}[0-9]{6,10})\b").unwrap(),
            PatternKind::InstitutionalCode,
        ),
        // Bare digit runs of plausible length, last resort
        (
            Regex::new(r"\b([0-9]{6,12})\b").unwrap(),
            PatternKind::NumericOnly,
        ),
    ];
}

pub struct IdentifierExtractor;

impl IdentifierExtractor {
    /// Scan raw OCR text for registration-number candidates, best first.
    ///
    /// All distinct candidates are returned so the caller can fall through
    /// to the next one when a registry lookup misses.
    pub fn extract_candidates(text: &str) -> Vec<IdentifierCandidate> {
        let mut candidates = Vec::new();

        for (pattern, kind) in IDENTIFIER_RULES.iter() {
            for captures in pattern.captures_iter(text) {
                if let Some(matched) = captures.get(1) {
                    let raw = Self::trim_trailing_words(matched.as_str());
                    let normalized = Self::normalize(&raw);
                    if Self::is_plausible(&normalized) {
                        candidates.push(IdentifierCandidate {
                            raw_text: raw,
                            normalized,
                            kind: *kind,
                            position: matched.start(),
                        });
                    }
                }
            }
        }

        // Higher priority first, earlier occurrence breaks ties; then one
        // candidate per normalized form, keeping the best occurrence.
        candidates.sort_by(|a, b| {
            b.kind
                .priority()
                .cmp(&a.kind.priority())
                .then(a.position.cmp(&b.position))
        });
        let mut seen = HashSet::new();
        candidates.retain(|c| seen.insert(c.normalized.clone()));
        candidates
    }

    /// Uppercase with all internal whitespace removed, the canonical form
    /// identifiers are compared in.
    pub fn normalize(raw: &str) -> String {
        raw.split_whitespace().collect::<String>().to_uppercase()
    }

    // A labeled capture may run past the identifier into following words
    // ("ABC2023001 Date of Issue"). Keep tokens until the value contains a
    // digit and the next token is purely alphabetic.
    fn trim_trailing_words(raw: &str) -> String {
        let mut kept: Vec<&str> = Vec::new();
        let mut has_digit = false;
        for token in raw.split_whitespace() {
            let token_has_digit = token.chars().any(|c| c.is_ascii_digit());
            if has_digit && !token_has_digit {
                break;
            }
            kept.push(token);
            has_digit |= token_has_digit;
        }
        kept.join(" ")
    }

    fn is_plausible(normalized: &str) -> bool {
        normalized.len() >= 5
            && normalized.len() <= 16
            && normalized.chars().all(|c| c.is_ascii_alphanumeric())
            && normalized.chars().any(|c| c.is_ascii_digit())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labeled_registration_number() {
        let text = "Registration Number: ABC2023001\nDate of Issue: December 2023";
        let candidates = IdentifierExtractor::extract_candidates(text);
        assert_eq!(candidates[0].normalized, "ABC2023001");
        assert_eq!(candidates[0].kind, PatternKind::Labeled);
    }

    #[test]
    fn test_labeled_beats_bare_code_shape() {
        // 1BG19CS100 matches both the USN label rule and the code-shape
        // rule; the labeled occurrence must win the dedup.
        let text = "Name of the College: BNM INSTITUTE\nUSN: 1BG19CS100";
        let candidates = IdentifierExtractor::extract_candidates(text);
        assert_eq!(candidates[0].normalized, "1BG19CS100");
        assert_eq!(candidates[0].kind, PatternKind::Labeled);
        assert!(candidates.iter().filter(|c| c.normalized == "1BG19CS100").count() == 1);
    }

    #[test]
    fn test_spaced_identifier_normalizes() {
        let text = "Reg No: ABC 2023 001";
        let candidates = IdentifierExtractor::extract_candidates(text);
        assert_eq!(candidates[0].normalized, "ABC2023001");
    }

    #[test]
    fn test_trailing_words_trimmed() {
        let text = "Registration No: ABC2023001 Date of Issue";
        let candidates = IdentifierExtractor::extract_candidates(text);
        assert_eq!(candidates[0].normalized, "ABC2023001");
    }

    #[test]
    fn test_multiple_candidates_ordered() {
        let text = "Serial No: XYZ2020009\nsome noise 123456789 more\n1BG19CS100";
        let candidates = IdentifierExtractor::extract_candidates(text);
        let normalized: Vec<&str> = candidates.iter().map(|c| c.normalized.as_str()).collect();
        assert_eq!(normalized[0], "XYZ2020009");
        assert!(normalized.contains(&"1BG19CS100"));
        assert!(normalized.contains(&"123456789"));
        // labeled > code shape > bare digits
        assert_eq!(candidates.last().unwrap().kind, PatternKind::NumericOnly);
    }

    #[test]
    fn test_no_candidates_in_plain_prose() {
        let text = "This certificate is awarded for outstanding participation.";
        assert!(IdentifierExtractor::extract_candidates(text).is_empty());
    }

    #[test]
    fn test_all_digit_run() {
        let text = "completed in batch 202301234";
        let candidates = IdentifierExtractor::extract_candidates(text);
        assert_eq!(candidates[0].normalized, "202301234");
        assert_eq!(candidates[0].kind, PatternKind::NumericOnly);
    }
}
