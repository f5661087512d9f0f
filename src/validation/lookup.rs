use crate::models::{IdentifierCandidate, RegistryRecord};
use crate::utils::VerifyError;
use crate::validation::RegistryStore;

pub struct RegistryLookup;

impl RegistryLookup {
    /// Try each candidate against the store in ranked order, stopping at the
    /// first hit. A spurious top candidate that misses simply falls through
    /// to the next one.
    ///
    /// `(None, None)` is the legitimate no-database-match outcome, not an
    /// error; the decision engine turns it into a rejection with a reason.
    pub fn resolve(
        store: &RegistryStore,
        candidates: &[IdentifierCandidate],
    ) -> Result<(Option<String>, Option<RegistryRecord>), VerifyError> {
        for candidate in candidates {
            log::debug!(
                "looking up candidate {} ({:?})",
                candidate.normalized,
                candidate.kind
            );
            if let Some(record) = store.lookup_by_id(&candidate.normalized)? {
                return Ok((Some(candidate.normalized.clone()), Some(record)));
            }
        }
        Ok((None, None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PatternKind, RegistryRecord};

    fn candidate(normalized: &str, kind: PatternKind, position: usize) -> IdentifierCandidate {
        IdentifierCandidate {
            raw_text: normalized.to_string(),
            normalized: normalized.to_string(),
            kind,
            position,
        }
    }

    fn stored_record(reg_no: &str) -> RegistryRecord {
        RegistryRecord {
            reg_no: reg_no.to_string(),
            usn: None,
            name: "SAKSHAM SHARMA".to_string(),
            guardian_name: None,
            institution: "DevLabs Institute".to_string(),
            degree: "B.Tech Computer Engineering".to_string(),
            year: 2023,
            issue_date: None,
            record_type: None,
            notes: None,
        }
    }

    #[test]
    fn test_first_hit_wins() {
        let store = RegistryStore::open_in_memory().unwrap();
        store.upsert(&stored_record("ABC2023001")).unwrap();
        store.upsert(&stored_record("ABC2023002")).unwrap();

        let candidates = vec![
            candidate("ABC2023001", PatternKind::Labeled, 0),
            candidate("ABC2023002", PatternKind::InstitutionalCode, 10),
        ];
        let (id, record) = RegistryLookup::resolve(&store, &candidates).unwrap();
        assert_eq!(id.as_deref(), Some("ABC2023001"));
        assert_eq!(record.unwrap().reg_no, "ABC2023001");
    }

    #[test]
    fn test_spurious_top_candidate_falls_through() {
        let store = RegistryStore::open_in_memory().unwrap();
        store.upsert(&stored_record("ABC2023002")).unwrap();

        let candidates = vec![
            candidate("BADC0DE999", PatternKind::Labeled, 0),
            candidate("ABC2023002", PatternKind::NumericOnly, 40),
        ];
        let (id, record) = RegistryLookup::resolve(&store, &candidates).unwrap();
        assert_eq!(id.as_deref(), Some("ABC2023002"));
        assert!(record.is_some());
    }

    #[test]
    fn test_no_candidate_resolves() {
        let store = RegistryStore::open_in_memory().unwrap();
        let candidates = vec![candidate("ABC2023001", PatternKind::Labeled, 0)];
        let (id, record) = RegistryLookup::resolve(&store, &candidates).unwrap();
        assert!(id.is_none());
        assert!(record.is_none());
    }
}
