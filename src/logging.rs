//! Render history written as JSON Lines.

use crate::colormap::Colormap;
use crate::matrix::ConfusionMatrix;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// One rendered matrix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderRecord {
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    pub classes: usize,
    pub labels: Vec<String>,
    pub colormap: Colormap,
    pub max: f64,
    pub threshold: f64,
    pub normalized: bool,
}

impl RenderRecord {
    pub fn new(matrix: &ConfusionMatrix, colormap: Colormap) -> Self {
        Self {
            timestamp: Utc::now(),
            source: None,
            output: None,
            classes: matrix.n_classes(),
            labels: matrix.labels().to_vec(),
            colormap,
            max: matrix.max(),
            threshold: matrix.text_threshold(),
            normalized: false,
        }
    }
}

/// Appends render records to a JSON Lines file
pub struct RenderLog {
    writer: BufWriter<File>,
    records_written: u64,
}

impl RenderLog {
    /// Open `path` for appending, creating it if needed
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_ref())
            .with_context(|| format!("Failed to open render log: {}", path.as_ref().display()))?;

        Ok(Self {
            writer: BufWriter::new(file),
            records_written: 0,
        })
    }

    pub fn log(&mut self, record: &RenderRecord) -> Result<()> {
        let json = serde_json::to_string(record)?;
        writeln!(self.writer, "{}", json)?;
        self.records_written += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn records_written(&self) -> u64 {
        self.records_written
    }
}

impl Drop for RenderLog {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}

/// Read every record back from a render log
pub fn load_records<P: AsRef<Path>>(path: P) -> Result<Vec<RenderRecord>> {
    let file = File::open(path.as_ref())
        .with_context(|| format!("Failed to open render log: {}", path.as_ref().display()))?;

    let mut records = Vec::new();
    for (line_num, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read line {}", line_num + 1))?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line)
            .with_context(|| format!("Invalid render record on line {}", line_num + 1))?;
        records.push(record);
    }

    Ok(records)
}
