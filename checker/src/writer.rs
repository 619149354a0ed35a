use lib_table::TableStore;

use crate::{error::AppResult, verdict::Verdict};

/// Sole mutation point for the verdict column. Renders a verdict and stores
/// it at the row's output position; callers write each row at most once per
/// run, and a failed write aborts the run.
pub struct ResultWriter<'a, S: TableStore> {
    store: &'a mut S,
    written: usize,
}

impl<'a, S: TableStore> ResultWriter<'a, S> {
    pub fn new(store: &'a mut S) -> Self {
        Self { store, written: 0 }
    }

    pub fn write(&mut self, row_index: usize, verdict: &Verdict) -> AppResult<()> {
        let rendered = verdict.render();
        tracing::debug!("row {} <- {}", row_index, rendered);
        self.store.write_verdict(row_index, &rendered)?;
        self.written += 1;
        Ok(())
    }

    pub fn rows_written(&self) -> usize {
        self.written
    }
}
