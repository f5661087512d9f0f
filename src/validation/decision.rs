use crate::models::{
    Decision, FieldName, FieldScore, ScoringPolicy, SealStatus, SealVerdict,
};
use std::collections::BTreeMap;

pub struct DecisionEngine;

impl DecisionEngine {
    /// Map the lookup outcome and aggregate score onto the three-way
    /// decision, with a reason for every downgrade.
    pub fn decide(
        identifier_found: bool,
        scores: &BTreeMap<FieldName, FieldScore>,
        final_score: f64,
        policy: &ScoringPolicy,
    ) -> (Decision, Vec<String>) {
        if !identifier_found {
            return (
                Decision::Rejected,
                vec!["no matching registry identifier found".to_string()],
            );
        }

        let low_fields = Self::low_fields(scores, policy);
        if final_score >= policy.authentic_threshold {
            let mut reasons = vec![format!(
                "aggregate field similarity {:.2} meets the authenticity threshold",
                final_score
            )];
            reasons.extend(low_fields);
            (Decision::Authentic, reasons)
        } else if final_score >= policy.suspect_threshold {
            let mut reasons = vec![format!(
                "aggregate field similarity {:.2} below the authenticity threshold",
                final_score
            )];
            reasons.extend(low_fields);
            (Decision::Suspect, reasons)
        } else {
            let mut reasons = vec![
                "field mismatch below acceptable threshold".to_string(),
                format!("aggregate field similarity {:.2}", final_score),
            ];
            reasons.extend(low_fields);
            (Decision::Rejected, reasons)
        }
    }

    /// Fold an optional seal classifier verdict into the text decision.
    ///
    /// Conjunctive and security-first: overall authenticity needs both the
    /// text decision and a confident genuine verdict, and a confident fake
    /// verdict overrides everything else. Never an average.
    pub fn compose_with_seal(
        text_decision: Decision,
        seal: Option<&SealVerdict>,
        policy: &ScoringPolicy,
    ) -> (Decision, Vec<String>) {
        let verdict = match seal {
            Some(verdict) => verdict,
            None => return (text_decision, Vec::new()),
        };

        // Confident fake verdict overrides any text decision.
        if verdict.seal_status == SealStatus::Fake
            && verdict.confidence >= policy.seal_confidence_floor
        {
            return (
                Decision::Rejected,
                vec![format!(
                    "seal classified as fake with confidence {:.2}",
                    verdict.confidence
                )],
            );
        }

        match verdict.seal_status {
            SealStatus::Fake => {
                // Below the floor, still negative evidence: blocks
                // authenticity without overriding a harsher text decision.
                if text_decision == Decision::Authentic {
                    (
                        Decision::Rejected,
                        vec![format!(
                            "seal classified as fake (confidence {:.2}); authenticity cannot be confirmed",
                            verdict.confidence
                        )],
                    )
                } else {
                    (
                        text_decision,
                        vec![format!(
                            "seal classified as fake (confidence {:.2})",
                            verdict.confidence
                        )],
                    )
                }
            }
            SealStatus::Real => {
                if verdict.confidence >= policy.seal_confidence_floor {
                    (
                        text_decision,
                        vec![format!(
                            "seal verified as genuine (confidence {:.2})",
                            verdict.confidence
                        )],
                    )
                } else if text_decision == Decision::Authentic {
                    (
                        Decision::Suspect,
                        vec![format!(
                            "genuine seal verdict below confidence floor ({:.2} < {:.2})",
                            verdict.confidence, policy.seal_confidence_floor
                        )],
                    )
                } else {
                    (
                        text_decision,
                        vec![format!(
                            "genuine seal verdict below confidence floor ({:.2})",
                            verdict.confidence
                        )],
                    )
                }
            }
        }
    }

    fn low_fields(scores: &BTreeMap<FieldName, FieldScore>, policy: &ScoringPolicy) -> Vec<String> {
        FieldName::ALL
            .iter()
            .filter_map(|field| {
                let score = scores.get(field)?;
                if score.similarity < policy.field_min(*field) {
                    Some(format!(
                        "low {} similarity {:.2} (minimum {:.2})",
                        field,
                        score.similarity,
                        policy.field_min(*field)
                    ))
                } else {
                    None
                }
            })
            .collect()
    }
}
