//! JSONL writer and reader for generated datasets.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::ExportError;

/// Summary of one completed write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkReport {
    /// File that was written.
    pub path: PathBuf,
    /// Number of records (lines) written.
    pub records: usize,
    /// Size of the file in bytes.
    pub bytes: u64,
    /// Lowercase hex SHA-256 of the file contents.
    pub sha256: String,
}

/// Writes ordered records to a JSONL file.
///
/// One JSON object per line, UTF-8 with non-ASCII characters left
/// unescaped, no enclosing array and no newline after the last record. The
/// file is replaced wholesale on every write.
#[derive(Debug, Clone)]
pub struct JsonlSink {
    path: PathBuf,
}

impl JsonlSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serializes `records` in the given order and writes them out.
    ///
    /// # Errors
    ///
    /// Returns `ExportError` if the parent directory cannot be created or the
    /// file cannot be written. A failed write may leave a partial file.
    pub fn write<T: Serialize>(&self, records: &[T]) -> Result<SinkReport, ExportError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| ExportError::DirectoryCreationFailed {
                path: parent.display().to_string(),
                reason: e.to_string(),
            })?;
        }

        let file = File::create(&self.path)?;
        let mut writer = BufWriter::new(file);
        let mut hasher = Sha256::new();
        let mut bytes = 0u64;

        for (i, record) in records.iter().enumerate() {
            let mut line = serde_json::to_vec(record)?;
            if i > 0 {
                line.insert(0, b'\n');
            }
            writer.write_all(&line)?;
            hasher.update(&line);
            bytes += line.len() as u64;
        }
        writer.flush()?;

        let report = SinkReport {
            path: self.path.clone(),
            records: records.len(),
            bytes,
            sha256: hex::encode(hasher.finalize()),
        };

        tracing::info!(
            path = %report.path.display(),
            records = report.records,
            bytes = report.bytes,
            "Wrote JSONL dataset"
        );

        Ok(report)
    }
}

/// Records loaded from a JSONL file.
#[derive(Debug, Clone)]
pub struct JsonlRead<T> {
    pub records: Vec<T>,
    /// Non-blank lines that failed to decode or parse.
    pub skipped: usize,
}

/// Reads a JSONL dataset, skipping blank, non UTF-8 and unparseable lines.
///
/// # Errors
///
/// Returns `ExportError::FileNotFound` if `path` does not exist, or
/// `ExportError::Io` if it cannot be read.
pub fn read_jsonl<T: DeserializeOwned>(path: &Path) -> Result<JsonlRead<T>, ExportError> {
    if !path.exists() {
        return Err(ExportError::FileNotFound(path.display().to_string()));
    }

    let reader = BufReader::new(File::open(path)?);
    let mut records = Vec::new();
    let mut skipped = 0;

    for (index, line) in reader.split(b'\n').enumerate() {
        let line = line?;
        let text = match std::str::from_utf8(&line) {
            Ok(text) => text,
            Err(e) => {
                skipped += 1;
                tracing::warn!(
                    path = %path.display(),
                    line = index + 1,
                    error = %e,
                    "Skipping non UTF-8 JSONL line"
                );
                continue;
            }
        };

        let trimmed = text.trim_end_matches('\r').trim();
        if trimmed.is_empty() {
            continue;
        }

        match serde_json::from_str(trimmed) {
            Ok(record) => records.push(record),
            Err(e) => {
                skipped += 1;
                tracing::warn!(
                    path = %path.display(),
                    line = index + 1,
                    error = %e,
                    "Skipping corrupt JSONL line"
                );
            }
        }
    }

    Ok(JsonlRead { records, skipped })
}
