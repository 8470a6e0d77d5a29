//! SQLite-backed document store.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::models::{DocumentRecord, OcrData, ScanMetadata};

use super::{DocumentStore, Result, StoreError};

/// File-backed store. The UNIQUE constraint on `reference` is the
/// persistence-time re-verification of archive sequence uniqueness.
pub struct SqliteDocumentStore {
    conn: Mutex<Connection>,
}

impl SqliteDocumentStore {
    /// Open (or create) the database at `path` and ensure the schema.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(backend_err)?;
        Self::with_connection(conn)
    }

    /// In-memory database, used by tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(backend_err)?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS documents (
                id TEXT PRIMARY KEY,
                reference TEXT NOT NULL UNIQUE,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                category TEXT NOT NULL,
                priority TEXT NOT NULL,
                department TEXT NOT NULL,
                tags TEXT NOT NULL,
                confidential INTEGER NOT NULL,
                original_name TEXT,
                content_hash TEXT NOT NULL,
                file_path TEXT NOT NULL,
                ocr_data TEXT NOT NULL,
                scan_metadata TEXT NOT NULL,
                box_number INTEGER,
                folder_number INTEGER,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_documents_category_created
                ON documents(category, created_at);",
        )
        .map_err(backend_err)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl DocumentStore for SqliteDocumentStore {
    fn save(&self, record: &DocumentRecord) -> Result<String> {
        let conn = self.conn.lock().unwrap();

        let tags = serde_json::to_string(&record.tags).map_err(json_err)?;
        let ocr_data = serde_json::to_string(&record.ocr_data).map_err(json_err)?;
        let scan_metadata = serde_json::to_string(&record.scan_metadata).map_err(json_err)?;

        let result = conn.execute(
            "INSERT INTO documents (
                id, reference, title, description, category, priority,
                department, tags, confidential, original_name, content_hash,
                file_path, ocr_data, scan_metadata, box_number, folder_number,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
            params![
                record.id,
                record.reference,
                record.title,
                record.description,
                record.category,
                record.priority,
                record.department,
                tags,
                record.confidential as i64,
                record.original_name,
                record.content_hash,
                record.file_path.display().to_string(),
                ocr_data,
                scan_metadata,
                record.scan_metadata.box_number,
                record.scan_metadata.folder_number,
                record.created_at.to_rfc3339(),
            ],
        );

        match result {
            Ok(_) => Ok(record.id.clone()),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(StoreError::Conflict(record.reference.clone()))
            }
            Err(e) => Err(backend_err(e)),
        }
    }

    fn find_max_sequence(&self, category: &str, year: i32) -> Result<Option<u32>> {
        let conn = self.conn.lock().unwrap();
        let (start, end) = year_bounds(year);

        let max: Option<i64> = conn
            .query_row(
                "SELECT MAX(COALESCE(box_number, folder_number)) FROM documents
                 WHERE category = ?1 AND created_at >= ?2 AND created_at < ?3",
                params![category, start.to_rfc3339(), end.to_rfc3339()],
                |row| row.get(0),
            )
            .map_err(backend_err)?;

        Ok(max.map(|m| m as u32))
    }

    fn reference_exists(&self, reference: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let exists: i64 = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM documents WHERE reference = ?1)",
                params![reference],
                |row| row.get(0),
            )
            .map_err(backend_err)?;
        Ok(exists != 0)
    }

    fn get(&self, id: &str) -> Result<Option<DocumentRecord>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT id, reference, title, description, category, priority,
                    department, tags, confidential, original_name, content_hash,
                    file_path, ocr_data, scan_metadata, created_at
             FROM documents WHERE id = ?1",
            params![id],
            row_to_record,
        )
        .optional()
        .map_err(backend_err)
    }

    fn count(&self) -> Result<u64> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))
            .map_err(backend_err)?;
        Ok(count as u64)
    }
}

fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<DocumentRecord> {
    let tags: String = row.get(7)?;
    let ocr_data: String = row.get(12)?;
    let scan_metadata: String = row.get(13)?;
    let created_at: String = row.get(14)?;
    let file_path: String = row.get(11)?;

    Ok(DocumentRecord {
        id: row.get(0)?,
        reference: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        category: row.get(4)?,
        priority: row.get(5)?,
        department: row.get(6)?,
        tags: serde_json::from_str(&tags).unwrap_or_default(),
        confidential: row.get::<_, i64>(8)? != 0,
        original_name: row.get(9)?,
        content_hash: row.get(10)?,
        file_path: file_path.into(),
        ocr_data: serde_json::from_str::<OcrData>(&ocr_data)
            .unwrap_or_else(|_| OcrData::degraded("eng")),
        scan_metadata: serde_json::from_str::<ScanMetadata>(&scan_metadata).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                13,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })?,
        created_at: parse_datetime(&created_at),
    })
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc.timestamp_opt(0, 0).unwrap())
}

/// Inclusive start and exclusive end of a calendar year, UTC.
fn year_bounds(year: i32) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(year + 1, 1, 1, 0, 0, 0).unwrap();
    (start, end)
}

fn backend_err(e: rusqlite::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

fn json_err(e: serde_json::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}
