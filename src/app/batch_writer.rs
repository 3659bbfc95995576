use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::app::ports::RecordSinkPort;
use crate::config::BatchFailurePolicy;
use crate::error::{Result, WardeadError};
use crate::observability::metrics;

/// How each batch reaches the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteMode {
    Insert,
    Upsert { conflict_key: String },
}

/// A batch the store rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailure {
    /// Offset of the batch's first row within the full row set
    pub first_row: usize,
    pub rows: usize,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteSummary {
    pub batches_written: usize,
    pub rows_written: usize,
    pub failures: Vec<BatchFailure>,
    /// Batches never attempted because an earlier one failed under `Abort`
    pub batches_skipped: usize,
}

impl WriteSummary {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && self.batches_skipped == 0
    }
}

/// Splits rows into fixed-size batches and sends them one after another.
pub struct BatchWriter<'a> {
    sink: &'a dyn RecordSinkPort,
    table: String,
    mode: WriteMode,
    batch_size: usize,
    policy: BatchFailurePolicy,
}

impl<'a> BatchWriter<'a> {
    pub fn new(
        sink: &'a dyn RecordSinkPort,
        table: impl Into<String>,
        mode: WriteMode,
        batch_size: usize,
        policy: BatchFailurePolicy,
    ) -> Result<Self> {
        if batch_size == 0 {
            return Err(WardeadError::Config("batch size must be at least 1".to_string()));
        }
        Ok(Self {
            sink,
            table: table.into(),
            mode,
            batch_size,
            policy,
        })
    }

    /// Serialize and send `rows`. Store rejections are collected in the
    /// summary rather than returned as errors; only serialization failures
    /// abort with `Err`.
    pub async fn write_all<T: Serialize>(&self, rows: &[T]) -> Result<WriteSummary> {
        let values = rows
            .iter()
            .map(serde_json::to_value)
            .collect::<std::result::Result<Vec<Value>, _>>()?;

        let mut summary = WriteSummary::default();
        let batches: Vec<&[Value]> = values.chunks(self.batch_size).collect();
        let total_batches = batches.len();

        for (index, batch) in batches.into_iter().enumerate() {
            let first_row = index * self.batch_size;
            let outcome = match &self.mode {
                WriteMode::Insert => self.sink.insert(&self.table, batch).await,
                WriteMode::Upsert { conflict_key } => {
                    self.sink.upsert(&self.table, batch, conflict_key).await
                }
            };

            match outcome {
                Ok(()) => {
                    metrics::write::batch_written(batch.len());
                    info!("Batch {} written ({} rows) to {}", first_row, batch.len(), self.table);
                    summary.batches_written += 1;
                    summary.rows_written += batch.len();
                }
                Err(e) => {
                    metrics::write::batch_failed();
                    error!("Error on batch {} ({} rows) for {}: {}", first_row, batch.len(), self.table, e);
                    summary.failures.push(BatchFailure {
                        first_row,
                        rows: batch.len(),
                        error: e.to_string(),
                    });
                    if self.policy == BatchFailurePolicy::Abort {
                        summary.batches_skipped = total_batches - index - 1;
                        if summary.batches_skipped > 0 {
                            warn!("Aborting: {} remaining batches not sent", summary.batches_skipped);
                        }
                        break;
                    }
                }
            }
        }

        Ok(summary)
    }
}
