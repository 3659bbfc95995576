use std::fmt;

use crate::app::batch_writer::WriteSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineMode {
    /// Every row cleaned and inserted into a separate target table
    Rebuild,
    /// Only `iso_date` upserted back onto the source rows
    Patch,
}

impl PipelineMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineMode::Rebuild => "rebuild",
            PipelineMode::Patch => "patch",
        }
    }
}

impl fmt::Display for PipelineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub mode: PipelineMode,
    pub fetched: usize,
    pub normalized: usize,
    pub unparseable_dates: usize,
    /// Rows dropped because they had no identifier to upsert on
    pub skipped_without_id: usize,
    pub write: WriteSummary,
}

impl RunReport {
    pub fn new(mode: PipelineMode) -> Self {
        Self {
            mode,
            fetched: 0,
            normalized: 0,
            unparseable_dates: 0,
            skipped_without_id: 0,
            write: WriteSummary::default(),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.write.is_complete()
    }
}
