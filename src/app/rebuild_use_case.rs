use std::sync::Arc;
use tracing::info;

use crate::app::batch_writer::{BatchWriter, WriteMode};
use crate::app::fetch::fetch_all;
use crate::app::ports::{RecordSinkPort, RecordSourcePort};
use crate::app::report::{PipelineMode, RunReport};
use crate::config::PipelineSettings;
use crate::constants::CANONICAL_REGIMENTS;
use crate::domain::{CleanedRecord, RawRecord};
use crate::error::Result;
use crate::observability::metrics;
use crate::pipeline::normalize::clean_record;

/// Apply both normalizers to every record, in input order.
pub fn clean_all(records: &[RawRecord]) -> Vec<CleanedRecord> {
    records
        .iter()
        .map(|record| {
            let cleaned = clean_record(record);
            metrics::normalize::record_normalized(
                PipelineMode::Rebuild.as_str(),
                cleaned.date_of_death.is_some(),
            );
            let label = CANONICAL_REGIMENTS
                .iter()
                .copied()
                .find(|label| *label == cleaned.regiment)
                .unwrap_or("unmatched");
            metrics::normalize::regiment_resolved(label);
            cleaned
        })
        .collect()
}

/// Full rebuild: fetch the source table, clean every row and insert the
/// result into the target table.
pub struct RebuildUseCase {
    source: Arc<dyn RecordSourcePort>,
    sink: Arc<dyn RecordSinkPort>,
    settings: PipelineSettings,
}

impl RebuildUseCase {
    pub fn new(
        source: Arc<dyn RecordSourcePort>,
        sink: Arc<dyn RecordSinkPort>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            source,
            sink,
            settings,
        }
    }

    pub async fn run(&self) -> Result<RunReport> {
        self.settings.validate()?;
        let mut report = RunReport::new(PipelineMode::Rebuild);

        let raw = fetch_all(self.source.as_ref(), &self.settings.source_table, self.settings.batch_size).await?;
        report.fetched = raw.len();

        info!("Cleaning {} rows", raw.len());
        let cleaned = clean_all(&raw);
        report.normalized = cleaned.len();
        report.unparseable_dates = cleaned.iter().filter(|r| r.date_of_death.is_none()).count();

        info!(
            "Uploading {} rows to '{}' ({} without a parseable date)",
            cleaned.len(),
            self.settings.target_table,
            report.unparseable_dates
        );
        let writer = BatchWriter::new(
            self.sink.as_ref(),
            self.settings.target_table.clone(),
            WriteMode::Insert,
            self.settings.batch_size,
            self.settings.on_batch_error,
        )?;
        report.write = writer.write_all(&cleaned).await?;

        Ok(report)
    }
}
