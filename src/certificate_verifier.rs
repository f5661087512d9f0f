use crate::models::{OcrResult, ScoringPolicy, SealVerdict, VerificationResult};
use crate::processing::{FieldExtractor, IdentifierExtractor};
use crate::utils::VerifyError;
use crate::validation::{DecisionEngine, FieldMatcher, RegistryLookup, RegistryStore};

pub struct CertificateVerifier {
    store: RegistryStore,
    policy: ScoringPolicy,
}

impl CertificateVerifier {
    pub fn new(store: RegistryStore) -> Self {
        Self::with_policy(store, ScoringPolicy::default())
    }

    pub fn with_policy(store: RegistryStore, policy: ScoringPolicy) -> Self {
        CertificateVerifier { store, policy }
    }

    /// Verify an OCR result against the registry.
    pub fn verify(&self, ocr: &OcrResult) -> Result<VerificationResult, VerifyError> {
        self.verify_with_seal(ocr, None)
    }

    /// Verify an OCR result, optionally folding in a seal classifier
    /// verdict per the conjunctive composition policy.
    pub fn verify_with_seal(
        &self,
        ocr: &OcrResult,
        seal: Option<&SealVerdict>,
    ) -> Result<VerificationResult, VerifyError> {
        // Failed or empty OCR output is the soft-failure path: it runs the
        // normal chain over empty text and lands on REJECTED with a reason.
        let text = if ocr.success { ocr.extracted_text.as_str() } else { "" };

        let mut reasons = Vec::new();
        if !ocr.success {
            let error = ocr.error.as_deref().unwrap_or("no detail");
            reasons.push(format!("OCR extraction failed: {}", error));
        } else if text.trim().is_empty() {
            reasons.push("OCR produced no text".to_string());
        }

        // Step 1: candidate identifiers, best first
        let candidates = IdentifierExtractor::extract_candidates(text);

        // Step 2: resolve against the registry, first hit wins
        let (registration_no, db_record) = RegistryLookup::resolve(&self.store, &candidates)?;
        if let Some(id) = &registration_no {
            reasons.push(format!("identifier {} matched a registry record", id));
        }

        // Step 3: field extraction over the same raw text
        let mut extracted = FieldExtractor::extract_fields(text);
        if extracted.year.is_none() {
            // Batch-year recovery from the resolved identifier, or failing
            // that the top-ranked candidate.
            let code = registration_no
                .as_deref()
                .or_else(|| candidates.first().map(|c| c.normalized.as_str()));
            extracted.year = code.and_then(FieldExtractor::batch_year_from_code);
        }

        // Step 4: per-field similarity and weighted aggregate
        let field_scores = FieldMatcher::score(&extracted, db_record.as_ref());
        let final_score = FieldMatcher::aggregate(&field_scores, &self.policy);

        // Step 5: text-only decision, then the seal composition on top
        let (text_decision, decide_reasons) =
            DecisionEngine::decide(db_record.is_some(), &field_scores, final_score, &self.policy);
        reasons.extend(decide_reasons);

        let (decision, seal_reasons) =
            DecisionEngine::compose_with_seal(text_decision, seal, &self.policy);
        reasons.extend(seal_reasons);

        log::info!(
            "verification decision {} (score {:.2}, identifier {:?})",
            decision,
            final_score,
            registration_no
        );

        Ok(VerificationResult {
            decision,
            final_score,
            registration_no,
            db_record,
            extracted,
            field_scores,
            ocr_confidence: ocr.confidence,
            reasons,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Decision, FieldName, RegistryRecord, SealCheckStatus, SealStatus};

    const SAMPLE_TEXT: &str = "\
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

    fn seeded_verifier() -> CertificateVerifier {
        let store = RegistryStore::open_in_memory().unwrap();
        store
            .upsert(&RegistryRecord {
                reg_no: "ABC2023001".to_string(),
                usn: None,
                name: "SAKSHAM SHARMA".to_string(),
                guardian_name: None,
                institution: "DevLabs Institute".to_string(),
                degree: "B.Tech Computer Engineering".to_string(),
                year: 2023,
                issue_date: Some("December 2023".to_string()),
                record_type: Some("degree certificate".to_string()),
                notes: None,
            })
            .unwrap();
        CertificateVerifier::new(store)
    }

    fn ocr(text: &str) -> OcrResult {
        OcrResult {
            success: true,
            extracted_text: text.to_string(),
            confidence: 0.92,
            bounding_boxes: None,
            error: None,
        }
    }

    #[test]
    fn test_matching_certificate_is_authentic() {
        let verifier = seeded_verifier();
        let result = verifier.verify(&ocr(SAMPLE_TEXT)).unwrap();
        assert_eq!(result.decision, Decision::Authentic);
        assert!(result.final_score >= 0.80, "{}", result.final_score);
        assert_eq!(result.registration_no.as_deref(), Some("ABC2023001"));
        assert_eq!(result.db_record.as_ref().unwrap().name, "SAKSHAM SHARMA");
    }

    #[test]
    fn test_verification_is_idempotent() {
        let verifier = seeded_verifier();
        let first = verifier.verify(&ocr(SAMPLE_TEXT)).unwrap();
        let second = verifier.verify(&ocr(SAMPLE_TEXT)).unwrap();
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_institution_typo_still_authentic() {
        let verifier = seeded_verifier();
        let text = SAMPLE_TEXT.replace("DevLabs Institute", "DevLbs Institute");
        let result = verifier.verify(&ocr(&text)).unwrap();
        let institution = result.field_scores[&FieldName::Institution].similarity;
        assert!(institution > 0.8 && institution < 1.0, "{}", institution);
        assert_eq!(result.decision, Decision::Authentic);
    }

    #[test]
    fn test_missing_name_reduces_score_by_name_weight() {
        let verifier = seeded_verifier();
        let text = SAMPLE_TEXT.replace("SAKSHAM SHARMA", "");
        let result = verifier.verify(&ocr(&text)).unwrap();
        assert_eq!(result.field_scores[&FieldName::Name].similarity, 0.0);
        assert!((result.final_score - 0.65).abs() < 1e-9, "{}", result.final_score);
        assert_eq!(result.decision, Decision::Suspect);
        assert!(result.reasons.iter().any(|r| r.contains("low name similarity")));
    }

    #[test]
    fn test_no_identifier_text_is_rejected() {
        let verifier = seeded_verifier();
        let result = verifier
            .verify(&ocr("an award for general excellence"))
            .unwrap();
        assert_eq!(result.decision, Decision::Rejected);
        assert!(result.registration_no.is_none());
        assert!(result.db_record.is_none());
        assert_eq!(result.final_score, 0.0);
        assert!(result
            .reasons
            .contains(&"no matching registry identifier found".to_string()));
    }

    #[test]
    fn test_failed_ocr_is_soft_rejected() {
        let verifier = seeded_verifier();
        let failed = OcrResult {
            success: false,
            error: Some("E301: file processing error".to_string()),
            ..Default::default()
        };
        let result = verifier.verify(&failed).unwrap();
        assert_eq!(result.decision, Decision::Rejected);
        assert!(result.reasons[0].contains("OCR extraction failed"));
        assert!(result
            .reasons
            .contains(&"no matching registry identifier found".to_string()));
    }

    #[test]
    fn test_unknown_identifier_is_rejected_not_authentic() {
        let verifier = seeded_verifier();
        let text = SAMPLE_TEXT.replace("ABC2023001", "ZZZ9999999");
        let result = verifier.verify(&ocr(&text)).unwrap();
        assert_eq!(result.decision, Decision::Rejected);
        assert!(result.db_record.is_none());
    }

    #[test]
    fn test_fake_seal_overrides_authentic_text() {
        let verifier = seeded_verifier();
        let verdict = SealVerdict {
            status: SealCheckStatus::Fail,
            confidence: 0.85,
            seal_status: SealStatus::Fake,
            reason: "fake seals detected".to_string(),
        };
        let result = verifier
            .verify_with_seal(&ocr(SAMPLE_TEXT), Some(&verdict))
            .unwrap();
        assert_eq!(result.decision, Decision::Rejected);
        assert!(result.final_score >= 0.80);
        assert!(result.reasons.iter().any(|r| r.contains("fake")));
    }

    #[test]
    fn test_genuine_seal_confirms_authentic_text() {
        let verifier = seeded_verifier();
        let verdict = SealVerdict {
            status: SealCheckStatus::Pass,
            confidence: 0.90,
            seal_status: SealStatus::Real,
            reason: String::new(),
        };
        let result = verifier
            .verify_with_seal(&ocr(SAMPLE_TEXT), Some(&verdict))
            .unwrap();
        assert_eq!(result.decision, Decision::Authentic);
    }

    #[test]
    fn test_spaced_identifier_resolves_to_same_record() {
        let verifier = seeded_verifier();
        let text = SAMPLE_TEXT.replace("ABC2023001", "ABC 2023 001");
        let result = verifier.verify(&ocr(&text)).unwrap();
        assert_eq!(result.registration_no.as_deref(), Some("ABC2023001"));
        assert_eq!(result.decision, Decision::Authentic);
    }
}
