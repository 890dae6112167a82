//! FileStore - appends one JSON line per result

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use contracts::{ContractError, ResultStore, WorkResult};
use serde::Serialize;
use tracing::{debug, error, instrument};

/// Configuration for FileStore
#[derive(Debug, Clone)]
pub struct FileStoreConfig {
    /// Output file (JSON lines)
    pub path: PathBuf,
    /// Keep existing content instead of truncating
    pub append: bool,
}

impl FileStoreConfig {
    /// Create config from params map
    ///
    /// `path` defaults to `./results.jsonl`, `append` to `true`.
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let path = params
            .get("path")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./results.jsonl"));
        let append = params
            .get("append")
            .map(|v| !v.eq_ignore_ascii_case("false"))
            .unwrap_or(true);

        Self { path, append }
    }
}

/// One line of the output file
#[derive(Serialize)]
struct StoredRecord<'a> {
    sequence: u64,
    worker_id: &'a str,
    payload: String,
    outcome: &'a str,
    committed_at: String,
}

/// Store that writes results to a JSON-lines file
///
/// Each commit writes one complete line straight to the file, so a failed
/// write is reported by the commit of the result it belongs to.
pub struct FileStore {
    name: String,
    path: PathBuf,
    file: Option<File>,
}

impl FileStore {
    /// Create a new FileStore, creating parent directories as needed
    pub fn new(name: impl Into<String>, config: FileStoreConfig) -> std::io::Result<Self> {
        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(config.append)
            .truncate(!config.append)
            .open(&config.path)?;

        Ok(Self {
            name: name.into(),
            path: config.path,
            file: Some(file),
        })
    }

    /// Create from params map (for factory)
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> std::io::Result<Self> {
        Self::new(name, FileStoreConfig::from_params(params))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_record(&mut self, result: &WorkResult) -> std::io::Result<()> {
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| std::io::Error::other("store already closed"))?;

        let record = StoredRecord {
            sequence: result.sequence,
            worker_id: result.worker_id.as_str(),
            payload: result.payload_lossy(),
            outcome: &result.outcome,
            committed_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        };
        // Serialize fully first; a failed encode never leaves half a line
        let mut line = serde_json::to_vec(&record)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        line.push(b'\n');

        file.write_all(&line)?;
        file.flush()
    }

    fn persist(&mut self, result: &WorkResult) -> Result<(), ContractError> {
        self.write_record(result).map_err(|e| {
            error!(store = %self.name, sequence = result.sequence, error = %e, "Write failed");
            ContractError::store(&self.name, e.to_string())
        })
    }
}

impl ResultStore for FileStore {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "file_store_commit",
        skip(self, result),
        fields(store = %self.name, sequence = result.sequence)
    )]
    async fn commit(&mut self, result: &WorkResult) -> Result<(), ContractError> {
        self.persist(result)
    }

    #[instrument(name = "file_store_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        if let Some(file) = self.file.as_mut() {
            file.sync_data()
                .map_err(|e| ContractError::store(&self.name, e.to_string()))?;
        }
        Ok(())
    }

    #[instrument(name = "file_store_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        if let Some(file) = self.file.take() {
            file.sync_data()
                .map_err(|e| ContractError::store(&self.name, e.to_string()))?;
        }
        debug!(store = %self.name, path = %self.path.display(), "FileStore closed");
        Ok(())
    }
}
