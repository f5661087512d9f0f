use crate::models::RegistryRecord;
use crate::processing::IdentifierExtractor;
use crate::utils::VerifyError;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

// Historical identifier columns, checked in order. Older imports filled only
// reg_no; newer ones carry the institutional serial in usn. Adding a schema
// era means adding a column name here.
const IDENTIFIER_COLUMNS: [&str; 2] = ["reg_no", "usn"];

const RECORD_COLUMNS: &str =
    "reg_no, usn, name, guardian_name, institution, degree, year, issue_date, record_type, notes";

/// Read-mostly store of known certificate records, backed by SQLite.
///
/// Writes happen only through `upsert` (bulk import); the verification path
/// is read-only, so one handle may serve concurrent lookups.
pub struct RegistryStore {
    conn: Connection,
}

impl RegistryStore {
    /// Open an existing registry database. A missing file is a fatal
    /// configuration error, distinct from any verification outcome.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, VerifyError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(VerifyError::StoreNotFound(path.to_path_buf()));
        }
        let conn = Connection::open(path)?;
        let store = RegistryStore { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Open the registry database, creating it (and the schema) if absent.
    /// Used by the import path only.
    pub fn open_or_create<P: AsRef<Path>>(path: P) -> Result<Self, VerifyError> {
        let conn = Connection::open(path.as_ref())?;
        let store = RegistryStore { conn };
        store.init_schema()?;
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self, VerifyError> {
        let conn = Connection::open_in_memory()?;
        let store = RegistryStore { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), VerifyError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS certificates (
                reg_no        TEXT PRIMARY KEY,
                usn           TEXT,
                name          TEXT NOT NULL,
                guardian_name TEXT,
                institution   TEXT NOT NULL,
                degree        TEXT NOT NULL,
                year          INTEGER NOT NULL,
                issue_date    TEXT,
                record_type   TEXT,
                notes         TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_certificates_usn ON certificates(usn);",
        )?;
        Ok(())
    }

    /// Resolve an identifier to at most one record, checking each historical
    /// identifier column in order. Comparison is uppercase with internal
    /// whitespace removed on both sides. No match is `None`, never an error.
    pub fn lookup_by_id(&self, identifier: &str) -> Result<Option<RegistryRecord>, VerifyError> {
        let needle = IdentifierExtractor::normalize(identifier);
        if needle.is_empty() {
            return Ok(None);
        }
        for column in IDENTIFIER_COLUMNS {
            let sql = format!(
                "SELECT {RECORD_COLUMNS} FROM certificates \
                 WHERE replace(upper({column}), ' ', '') = ?1"
            );
            let record = self
                .conn
                .prepare(&sql)?
                .query_row(params![needle], row_to_record)
                .optional()?;
            if let Some(record) = record {
                log::debug!("identifier {} resolved via {} column", needle, column);
                return Ok(Some(record));
            }
        }
        Ok(None)
    }

    /// Diagnostic prefix probe over all identifier columns. Not used on the
    /// verification path.
    pub fn lookup_by_prefix(&self, prefix: &str) -> Result<Vec<RegistryRecord>, VerifyError> {
        let needle = IdentifierExtractor::normalize(prefix);
        let clauses: Vec<String> = IDENTIFIER_COLUMNS
            .iter()
            .map(|column| format!("replace(upper({column}), ' ', '') LIKE ?1 || '%'"))
            .collect();
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM certificates WHERE {} ORDER BY reg_no",
            clauses.join(" OR ")
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![needle], row_to_record)?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    /// Insert or replace a record by registration number. Identifiers are
    /// stored in canonical (uppercase, whitespace-free) form.
    pub fn upsert(&self, record: &RegistryRecord) -> Result<(), VerifyError> {
        let reg_no = IdentifierExtractor::normalize(&record.reg_no);
        let usn = record
            .usn
            .as_deref()
            .map(IdentifierExtractor::normalize)
            .filter(|s| !s.is_empty());
        self.conn.execute(
            "INSERT INTO certificates (reg_no, usn, name, guardian_name, institution, degree, year, issue_date, record_type, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             ON CONFLICT(reg_no) DO UPDATE SET
                usn = excluded.usn,
                name = excluded.name,
                guardian_name = excluded.guardian_name,
                institution = excluded.institution,
                degree = excluded.degree,
                year = excluded.year,
                issue_date = excluded.issue_date,
                record_type = excluded.record_type,
                notes = excluded.notes",
            params![
                reg_no,
                usn,
                record.name,
                record.guardian_name,
                record.institution,
                record.degree,
                record.year,
                record.issue_date,
                record.record_type,
                record.notes,
            ],
        )?;
        Ok(())
    }

    pub fn count(&self) -> Result<u64, VerifyError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM certificates", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Bulk upsert from a JSON array of records. Each record is written with
    /// a single atomic statement; a re-import replaces on conflict.
    pub fn import_json<P: AsRef<Path>>(&self, path: P) -> Result<usize, VerifyError> {
        let reader = BufReader::new(File::open(path.as_ref())?);
        let records: Vec<RegistryRecord> = serde_json::from_reader(reader)?;
        for (index, record) in records.iter().enumerate() {
            if record.reg_no.trim().is_empty() {
                return Err(VerifyError::Import(format!(
                    "record {}: registration number is empty",
                    index
                )));
            }
            if record.name.trim().is_empty() {
                return Err(VerifyError::Import(format!(
                    "record {}: holder name is empty",
                    index
                )));
            }
            self.upsert(record)?;
        }
        log::info!("imported {} registry records", records.len());
        Ok(records.len())
    }
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<RegistryRecord> {
    Ok(RegistryRecord {
        reg_no: row.get(0)?,
        usn: row.get(1)?,
        name: row.get(2)?,
        guardian_name: row.get(3)?,
        institution: row.get(4)?,
        degree: row.get(5)?,
        year: row.get(6)?,
        issue_date: row.get(7)?,
        record_type: row.get(8)?,
        notes: row.get(9)?,
    })
}
