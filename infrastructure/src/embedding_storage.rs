use super::search::SearchEngine;
use async_trait::async_trait;
use domain::models::{MedicationRecord, Metadata, RawMatch};
use domain::ports::{IndexQuery, VectorIndex};
use rusqlite::{params, Connection};
use shared::types::{MedMateError, Result};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// A vector with its medication metadata, as stored on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredVector {
    pub id: String,
    pub vector: Vec<f32>,
    pub metadata: Metadata,
}

impl StoredVector {
    pub fn new(id: impl Into<String>, vector: Vec<f32>, record: &MedicationRecord) -> Self {
        Self {
            id: id.into(),
            vector,
            metadata: record.to_metadata(),
        }
    }
}

/// SQLite-backed vector index for local runs and tests.
///
/// Ranking is brute force over one namespace; fine for a drug catalogue of a
/// few thousand rows.
pub struct EmbeddingStorage {
    conn: Mutex<Connection>,
    path: PathBuf,
}

impl EmbeddingStorage {
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self> {
        let path = db_path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(storage_err)?;
        }
        let conn = Connection::open(&path).map_err(storage_err)?;
        Self::setup_db(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path,
        })
    }

    fn setup_db(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;
            PRAGMA cache_size=-64000;
            PRAGMA temp_store=MEMORY;
            CREATE TABLE IF NOT EXISTS vectors (
                id TEXT NOT NULL,
                namespace TEXT NOT NULL,
                vector BLOB NOT NULL,
                metadata TEXT NOT NULL,
                PRIMARY KEY (namespace, id)
            );
            CREATE INDEX IF NOT EXISTS idx_vectors_namespace ON vectors(namespace);
        ",
        )
        .map_err(storage_err)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| MedMateError::Storage("connection lock poisoned".into()))
    }

    pub fn upsert(&self, namespace: &str, vectors: &[StoredVector]) -> Result<()> {
        let conn = self.lock()?;
        let tx = conn.unchecked_transaction().map_err(storage_err)?;
        {
            let mut stmt = tx
                .prepare(
                    "INSERT OR REPLACE INTO vectors (id, namespace, vector, metadata) VALUES (?, ?, ?, ?)",
                )
                .map_err(storage_err)?;
            for stored in vectors {
                let vector_bytes = serde_json::to_vec(&stored.vector).map_err(storage_err)?;
                let metadata = serde_json::to_string(&stored.metadata).map_err(storage_err)?;
                stmt.execute(params![stored.id, namespace, vector_bytes, metadata])
                    .map_err(storage_err)?;
            }
        }
        tx.commit().map_err(storage_err)?;
        Ok(())
    }

    pub fn count(&self, namespace: &str) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM vectors WHERE namespace = ?1",
                params![namespace],
                |row| row.get(0),
            )
            .map_err(storage_err)?;
        Ok(count as usize)
    }

    fn load_namespace(&self, namespace: &str) -> Result<Vec<StoredVector>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT id, vector, metadata FROM vectors WHERE namespace = ?1 ORDER BY id")
            .map_err(storage_err)?;
        let mut rows = stmt.query(params![namespace]).map_err(storage_err)?;
        let mut vectors = Vec::new();
        while let Some(row) = rows.next().map_err(storage_err)? {
            let id: String = row.get(0).map_err(storage_err)?;
            let vector_bytes: Vec<u8> = row.get(1).map_err(storage_err)?;
            let metadata: String = row.get(2).map_err(storage_err)?;
            vectors.push(StoredVector {
                id,
                vector: serde_json::from_slice(&vector_bytes).map_err(storage_err)?,
                metadata: serde_json::from_str(&metadata).map_err(storage_err)?,
            });
        }
        Ok(vectors)
    }
}

#[async_trait]
impl VectorIndex for EmbeddingStorage {
    fn describe(&self) -> String {
        format!("local:{}", self.path.display())
    }

    async fn query(&self, query: &IndexQuery) -> Result<Vec<RawMatch>> {
        let mut candidates = self.load_namespace(&query.namespace)?;
        if let Some(filter) = &query.filter {
            candidates.retain(|c| filter.matches(&c.metadata));
        }

        let to_match = |stored: &StoredVector, score: Option<f32>| RawMatch {
            id: stored.id.clone(),
            score,
            metadata: if query.include_metadata {
                stored.metadata.clone()
            } else {
                Metadata::new()
            },
        };

        let Some(vector) = &query.vector else {
            return Ok(candidates
                .iter()
                .take(query.top_k)
                .map(|c| to_match(c, None))
                .collect());
        };

        if let Some(bad) = candidates.iter().find(|c| c.vector.len() != vector.len()) {
            return Err(MedMateError::Index(format!(
                "vector `{}` has dimension {}, query has {}",
                bad.id,
                bad.vector.len(),
                vector.len()
            )));
        }

        Ok(
            SearchEngine::rank(vector, &candidates, |c| c.vector.as_slice(), query.top_k)
                .into_iter()
                .map(|(score, c)| to_match(c, Some(score)))
                .collect(),
        )
    }
}

fn storage_err(e: impl std::fmt::Display) -> MedMateError {
    MedMateError::Storage(e.to_string())
}
