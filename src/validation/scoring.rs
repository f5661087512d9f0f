use crate::models::{ExtractedFields, FieldName, FieldScore, RegistryRecord, ScoringPolicy};
use std::collections::BTreeMap;
use strsim::normalized_levenshtein;

/// Credit given to a year that is off by one (OCR digit misreads,
/// graduation-vs-issue ambiguity).
const ADJACENT_YEAR_CREDIT: f64 = 0.5;

pub struct FieldMatcher;

impl FieldMatcher {
    /// Compare each extracted field against the registry record.
    ///
    /// With no record there is no basis for comparison and every similarity
    /// is 0. An absent extracted field also scores 0 without affecting the
    /// other fields.
    pub fn score(
        extracted: &ExtractedFields,
        record: Option<&RegistryRecord>,
    ) -> BTreeMap<FieldName, FieldScore> {
        let mut scores = BTreeMap::new();
        for field in FieldName::ALL {
            let similarity = match record {
                Some(record) => Self::field_similarity(field, extracted, record),
                None => 0.0,
            };
            scores.insert(field, FieldScore { field, similarity });
        }
        scores
    }

    /// Weighted aggregate of the per-field similarities, in [0, 1].
    pub fn aggregate(scores: &BTreeMap<FieldName, FieldScore>, policy: &ScoringPolicy) -> f64 {
        scores
            .values()
            .map(|s| s.similarity * policy.weight(s.field))
            .sum()
    }

    fn field_similarity(field: FieldName, extracted: &ExtractedFields, record: &RegistryRecord) -> f64 {
        match field {
            FieldName::Name => Self::text_similarity(extracted.name.as_deref(), &record.name),
            FieldName::Institution => {
                Self::text_similarity(extracted.institution.as_deref(), &record.institution)
            }
            FieldName::Degree => Self::text_similarity(extracted.degree.as_deref(), &record.degree),
            FieldName::Year => match extracted.year {
                Some(year) => Self::year_similarity(year, record.year),
                None => 0.0,
            },
        }
    }

    /// Case-insensitive, whitespace-normalized edit-distance ratio in [0, 1].
    pub fn text_similarity(extracted: Option<&str>, recorded: &str) -> f64 {
        let extracted = match extracted {
            Some(value) if !value.trim().is_empty() => normalize_text(value),
            _ => return 0.0,
        };
        let recorded = normalize_text(recorded);
        if recorded.is_empty() {
            return 0.0;
        }
        normalized_levenshtein(&extracted, &recorded)
    }

    pub fn year_similarity(extracted: i32, recorded: i32) -> f64 {
        match (extracted - recorded).abs() {
            0 => 1.0,
            1 => ADJACENT_YEAR_CREDIT,
            _ => 0.0,
        }
    }
}

fn normalize_text(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
