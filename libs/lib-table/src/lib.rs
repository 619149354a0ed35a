//! Tabular row store and summary surface abstractions.
//!
//! The checker reads photo rows through a [`TableStore`], writes verdict
//! cells back through it, and rewrites a [`SummarySink`] with aggregate
//! counts. Any array-backed or file-backed implementation satisfies the
//! contracts; the JSONL implementations here keep one serde record per line
//! and write through to disk on every cell write.

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

pub type TableResult<T> = Result<T, TableError>;

#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("table io failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("bad row record at line {line}: {source}")]
    BadRecord {
        line: usize,
        source: serde_json::Error,
    },

    #[error("could not encode record: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("row index {index} out of bounds ({len} rows)")]
    RowOutOfBounds { index: usize, len: usize },
}

/// One data row. `index` is the 0-based position among data rows and is the
/// join key between input and output; it never changes once read.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub index: usize,
    pub image_url: String,
    pub category: String,
    pub verdict: String,
}

/// Row store contract: read every data row in order, overwrite the verdict
/// cell of a single row. The verdict column is the only cell this crate's
/// callers ever mutate.
pub trait TableStore {
    fn read_rows(&self) -> TableResult<Vec<TableRow>>;

    fn write_verdict(&mut self, index: usize, verdict: &str) -> TableResult<()>;
}

/// Summary surface contract: cleared and rewritten wholesale on every
/// aggregation run.
pub trait SummarySink {
    fn clear(&mut self) -> TableResult<()>;

    fn append_row(&mut self, cells: &[String]) -> TableResult<()>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RowRecord {
    image_url: String,
    category: String,
    #[serde(default)]
    verdict: String,
}

/// File-backed store, one JSON row record per line. Line order is row order.
/// Every verdict write lands on disk before returning, so an interrupted run
/// resumes where it left off.
#[derive(Debug)]
pub struct JsonlTable {
    path: PathBuf,
    records: Vec<RowRecord>,
}

impl JsonlTable {
    pub fn open(path: impl AsRef<Path>) -> TableResult<Self> {
        let path = path.as_ref().to_path_buf();
        let content = fs::read_to_string(&path)?;

        let mut records = Vec::new();
        for (i, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let record = serde_json::from_str(line).map_err(|source| TableError::BadRecord {
                line: i + 1,
                source,
            })?;
            records.push(record);
        }

        Ok(Self { path, records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn flush(&self) -> TableResult<()> {
        let mut out = Vec::new();
        for record in &self.records {
            let line = serde_json::to_string(record)?;
            out.extend_from_slice(line.as_bytes());
            out.push(b'\n');
        }
        fs::write(&self.path, out)?;
        Ok(())
    }
}

impl TableStore for JsonlTable {
    fn read_rows(&self) -> TableResult<Vec<TableRow>> {
        Ok(self
            .records
            .iter()
            .enumerate()
            .map(|(index, record)| TableRow {
                index,
                image_url: record.image_url.clone(),
                category: record.category.clone(),
                verdict: record.verdict.clone(),
            })
            .collect())
    }

    fn write_verdict(&mut self, index: usize, verdict: &str) -> TableResult<()> {
        let len = self.records.len();
        let record = self
            .records
            .get_mut(index)
            .ok_or(TableError::RowOutOfBounds { index, len })?;
        record.verdict = verdict.to_string();
        self.flush()
    }
}

/// Array-backed store for tests and fakes.
#[derive(Debug, Default)]
pub struct MemoryTable {
    rows: Vec<TableRow>,
}

impl MemoryTable {
    /// Build from (image_url, category, verdict) cell triples, in row order.
    pub fn from_cells(cells: &[(&str, &str, &str)]) -> Self {
        let rows = cells
            .iter()
            .enumerate()
            .map(|(index, (image_url, category, verdict))| TableRow {
                index,
                image_url: image_url.to_string(),
                category: category.to_string(),
                verdict: verdict.to_string(),
            })
            .collect();
        Self { rows }
    }

    pub fn verdict(&self, index: usize) -> &str {
        &self.rows[index].verdict
    }
}

impl TableStore for MemoryTable {
    fn read_rows(&self) -> TableResult<Vec<TableRow>> {
        Ok(self.rows.clone())
    }

    fn write_verdict(&mut self, index: usize, verdict: &str) -> TableResult<()> {
        let len = self.rows.len();
        let row = self
            .rows
            .get_mut(index)
            .ok_or(TableError::RowOutOfBounds { index, len })?;
        row.verdict = verdict.to_string();
        Ok(())
    }
}

/// File-backed summary surface, one JSON cell array per line.
#[derive(Debug)]
pub struct JsonlSummary {
    path: PathBuf,
}

impl JsonlSummary {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl SummarySink for JsonlSummary {
    fn clear(&mut self) -> TableResult<()> {
        fs::write(&self.path, b"")?;
        Ok(())
    }

    fn append_row(&mut self, cells: &[String]) -> TableResult<()> {
        let line = serde_json::to_string(cells)?;
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{line}")?;
        Ok(())
    }
}

/// In-memory summary surface for tests.
#[derive(Debug, Default)]
pub struct MemorySummary {
    pub rows: Vec<Vec<String>>,
}

impl MemorySummary {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SummarySink for MemorySummary {
    fn clear(&mut self) -> TableResult<()> {
        self.rows.clear();
        Ok(())
    }

    fn append_row(&mut self, cells: &[String]) -> TableResult<()> {
        self.rows.push(cells.to_vec());
        Ok(())
    }
}
