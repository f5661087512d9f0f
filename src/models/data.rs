use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A known certificate record from the registry store.
///
/// `reg_no` is the canonical key. Older imports filled only `reg_no`; newer
/// ones also carry the institutional serial in `usn` — a lookup may hit on
/// either column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryRecord {
    pub reg_no: String,
    #[serde(default)]
    pub usn: Option<String>,
    pub name: String,
    #[serde(default)]
    pub guardian_name: Option<String>,
    pub institution: String,
    pub degree: String,
    pub year: i32,
    #[serde(default)]
    pub issue_date: Option<String>,
    #[serde(default)]
    pub record_type: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Which extraction rule produced an identifier candidate.
/// Higher priority kinds are tried against the registry first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatternKind {
    /// Token anchored to an explicit label ("Registration Number:", "USN:", ...).
    Labeled,
    /// Unlabeled token matching a known institutional code shape.
    InstitutionalCode,
    /// Bare digit run of plausible length.
    NumericOnly,
}

impl PatternKind {
    pub fn priority(&self) -> u8 {
        match self {
            PatternKind::Labeled => 3,
            PatternKind::InstitutionalCode => 2,
            PatternKind::NumericOnly => 1,
        }
    }
}

/// A registration-number candidate found in OCR text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentifierCandidate {
    pub raw_text: String,
    /// Uppercase, internal whitespace stripped.
    pub normalized: String,
    pub kind: PatternKind,
    /// Byte offset of the match in the source text; earlier wins ties.
    pub position: usize,
}

/// Best-effort fields parsed out of the OCR text. Any of them may be absent;
/// absence scores 0 against the registry record instead of failing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedFields {
    pub name: Option<String>,
    pub institution: Option<String>,
    pub degree: Option<String>,
    pub year: Option<i32>,
    /// Full OCR text, kept for the report.
    pub raw_text: String,
}

/// The four fields compared against the registry record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldName {
    Name,
    Institution,
    Degree,
    Year,
}

impl FieldName {
    pub const ALL: [FieldName; 4] = [
        FieldName::Name,
        FieldName::Institution,
        FieldName::Degree,
        FieldName::Year,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldName::Name => "name",
            FieldName::Institution => "institution",
            FieldName::Degree => "degree",
            FieldName::Year => "year",
        }
    }
}

impl std::fmt::Display for FieldName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Similarity of one extracted field against the registry record, in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldScore {
    pub field: FieldName,
    pub similarity: f64,
}

/// Outcome of a verification request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Decision {
    Authentic,
    Suspect,
    Rejected,
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Decision::Authentic => f.write_str("AUTHENTIC"),
            Decision::Suspect => f.write_str("SUSPECT"),
            Decision::Rejected => f.write_str("REJECTED"),
        }
    }
}

/// Result contract of the external OCR service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OcrResult {
    pub success: bool,
    #[serde(default)]
    pub extracted_text: String,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub bounding_boxes: Option<Vec<BoundingBox>>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Word-level box reported by the OCR service. Carried through for display
/// only; verification works on the plain text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub text: String,
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

/// Verdict of the external seal/stamp classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SealVerdict {
    pub status: SealCheckStatus,
    pub confidence: f64,
    pub seal_status: SealStatus,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SealCheckStatus {
    Pass,
    Fail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SealStatus {
    Real,
    Fake,
}

/// Full outcome of one verification request, serializable field-for-field
/// for the report/export path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationResult {
    pub decision: Decision,
    pub final_score: f64,
    pub registration_no: Option<String>,
    pub db_record: Option<RegistryRecord>,
    pub extracted: ExtractedFields,
    /// Keyed by field name; BTreeMap so report output is stably ordered.
    pub field_scores: BTreeMap<FieldName, FieldScore>,
    pub ocr_confidence: f64,
    pub reasons: Vec<String>,
}
