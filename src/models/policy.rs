use crate::models::FieldName;

/// Scoring weights and decision thresholds.
///
/// Constructed once and passed into the scorer and decision engine, so tests
/// can run alternate policies without process-wide state. Weights must sum
/// to 1; name and institution carry the most because they are the least
/// likely to match by coincidence.
#[derive(Debug, Clone)]
pub struct ScoringPolicy {
    pub name_weight: f64,
    pub institution_weight: f64,
    pub degree_weight: f64,
    pub year_weight: f64,
    /// Aggregate score at or above this is AUTHENTIC.
    pub authentic_threshold: f64,
    /// Aggregate score at or above this (but below authentic) is SUSPECT.
    pub suspect_threshold: f64,
    /// Per-field floors; fields below theirs are named in the reasons.
    pub name_min: f64,
    pub institution_min: f64,
    pub degree_min: f64,
    pub year_min: f64,
    /// A Fake seal verdict at or above this confidence overrides any text
    /// decision to REJECTED; a Real verdict below it cannot confirm.
    pub seal_confidence_floor: f64,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        ScoringPolicy {
            name_weight: 0.35,
            institution_weight: 0.30,
            degree_weight: 0.20,
            year_weight: 0.15,
            authentic_threshold: 0.80,
            suspect_threshold: 0.55,
            name_min: 0.60,
            institution_min: 0.60,
            degree_min: 0.50,
            year_min: 0.50,
            seal_confidence_floor: 0.70,
        }
    }
}

impl ScoringPolicy {
    pub fn weight(&self, field: FieldName) -> f64 {
        match field {
            FieldName::Name => self.name_weight,
            FieldName::Institution => self.institution_weight,
            FieldName::Degree => self.degree_weight,
            FieldName::Year => self.year_weight,
        }
    }

    pub fn field_min(&self, field: FieldName) -> f64 {
        match field {
            FieldName::Name => self.name_min,
            FieldName::Institution => self.institution_min,
            FieldName::Degree => self.degree_min,
            FieldName::Year => self.year_min,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_sum_to_one() {
        let policy = ScoringPolicy::default();
        let sum = FieldName::ALL.iter().map(|f| policy.weight(*f)).sum::<f64>();
        assert!((sum - 1.0).abs() < 1e-9);
    }
}
