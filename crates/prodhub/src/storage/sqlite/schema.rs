//! SQLite schema definitions and SQL query constants.

/// SQL statement to create all tables.
pub const CREATE_TABLES: &str = r#"
-- One row per document; rowid preserves insertion order
CREATE TABLE IF NOT EXISTS documents (
    namespace TEXT NOT NULL,
    collection TEXT NOT NULL,
    id TEXT NOT NULL,
    body TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    PRIMARY KEY (namespace, collection, id)
);

CREATE INDEX IF NOT EXISTS idx_documents_collection ON documents(namespace, collection);
"#;

pub const SELECT_DOCUMENT: &str = r#"
SELECT body
FROM documents
WHERE namespace = ?1 AND collection = ?2 AND id = ?3
"#;

pub const SELECT_DOCUMENTS: &str = r#"
SELECT body
FROM documents
WHERE namespace = ?1 AND collection = ?2
ORDER BY rowid
"#;

pub const INSERT_DOCUMENT: &str = r#"
INSERT INTO documents (namespace, collection, id, body, created_at, updated_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?6)
"#;

pub const UPDATE_DOCUMENT: &str = r#"
UPDATE documents
SET body = ?4, updated_at = ?5
WHERE namespace = ?1 AND collection = ?2 AND id = ?3
"#;

/// Keeps the original rowid (and so the list position) on replace.
pub const UPSERT_DOCUMENT: &str = r#"
INSERT INTO documents (namespace, collection, id, body, created_at, updated_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?6)
ON CONFLICT (namespace, collection, id)
DO UPDATE SET body = excluded.body, updated_at = excluded.updated_at
"#;

pub const DELETE_DOCUMENT: &str = r#"
DELETE FROM documents
WHERE namespace = ?1 AND collection = ?2 AND id = ?3
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_is_valid_sql() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch(CREATE_TABLES).unwrap();

        for sql in [
            SELECT_DOCUMENT,
            SELECT_DOCUMENTS,
            INSERT_DOCUMENT,
            UPDATE_DOCUMENT,
            UPSERT_DOCUMENT,
            DELETE_DOCUMENT,
        ] {
            conn.prepare(sql).unwrap();
        }
    }
}
