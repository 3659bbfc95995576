use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;

use crate::app::ports::RecordSinkPort;
use crate::error::{Result, WardeadError};

/// Dry-run sink: writes each batch as NDJSON under a directory instead of
/// calling the store.
///
/// Inserts go to `<table>.insert.ndjson`, upserts to
/// `<table>.upsert.ndjson`. Each file is truncated the first time this sink
/// touches it.
pub struct NdjsonSink {
    dir: PathBuf,
    files: Mutex<HashMap<PathBuf, BufWriter<File>>>,
}

impl NdjsonSink {
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        info!("Dry run: writing rows under {}", dir.display());
        Ok(Self {
            dir,
            files: Mutex::new(HashMap::new()),
        })
    }

    pub fn path_for(&self, table: &str, kind: &str) -> PathBuf {
        self.dir.join(format!("{}.{}.ndjson", table, kind))
    }

    fn append(&self, path: PathBuf, rows: &[Value]) -> Result<()> {
        let mut files = self
            .files
            .lock()
            .map_err(|_| WardeadError::Config("ndjson sink lock poisoned".to_string()))?;

        if !files.contains_key(&path) {
            let file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&path)?;
            files.insert(path.clone(), BufWriter::new(file));
        }
        let writer = files
            .get_mut(&path)
            .ok_or_else(|| WardeadError::Config(format!("no writer for {}", path.display())))?;

        for row in rows {
            serde_json::to_writer(&mut *writer, row)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[async_trait]
impl RecordSinkPort for NdjsonSink {
    async fn insert(&self, table: &str, rows: &[Value]) -> Result<()> {
        self.append(self.path_for(table, "insert"), rows)
    }

    async fn upsert(&self, table: &str, rows: &[Value], conflict_key: &str) -> Result<()> {
        if let Some(row) = rows.iter().find(|row| row.get(conflict_key).map_or(true, Value::is_null)) {
            return Err(WardeadError::Api {
                status: 400,
                message: format!("row without '{}': {}", conflict_key, row),
            });
        }
        self.append(self.path_for(table, "upsert"), rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn read_lines(path: &Path) -> Vec<Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_batches_append_to_one_file() {
        let temp_dir = tempdir().unwrap();
        let sink = NdjsonSink::new(temp_dir.path().join("out")).unwrap();

        sink.insert("wardead_clean", &[json!({"a": 1}), json!({"a": 2})]).await.unwrap();
        sink.insert("wardead_clean", &[json!({"a": 3})]).await.unwrap();

        let lines = read_lines(&sink.path_for("wardead_clean", "insert"));
        assert_eq!(lines, vec![json!({"a": 1}), json!({"a": 2}), json!({"a": 3})]);
    }

    #[tokio::test]
    async fn test_existing_file_is_truncated() {
        let temp_dir = tempdir().unwrap();
        let sink = NdjsonSink::new(temp_dir.path()).unwrap();
        let path = sink.path_for("t", "upsert");
        std::fs::write(&path, "stale\n").unwrap();

        sink.upsert("t", &[json!({"id": 1, "iso_date": "1916-07-01"})], "id").await.unwrap();
        assert_eq!(read_lines(&path), vec![json!({"id": 1, "iso_date": "1916-07-01"})]);
    }

    #[tokio::test]
    async fn test_upsert_rejects_rows_without_key() {
        let temp_dir = tempdir().unwrap();
        let sink = NdjsonSink::new(temp_dir.path()).unwrap();

        let err = sink.upsert("t", &[json!({"iso_date": null})], "id").await.unwrap_err();
        assert!(matches!(err, WardeadError::Api { status: 400, .. }));
        assert!(!sink.path_for("t", "upsert").exists());
    }
}
