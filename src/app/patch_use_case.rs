use std::sync::Arc;
use tracing::{info, warn};

use crate::app::batch_writer::{BatchWriter, WriteMode};
use crate::app::fetch::fetch_all;
use crate::app::ports::{RecordSinkPort, RecordSourcePort};
use crate::app::report::{PipelineMode, RunReport};
use crate::config::PipelineSettings;
use crate::constants::ID_COLUMN;
use crate::domain::{DatePatch, RawRecord};
use crate::error::Result;
use crate::observability::metrics;
use crate::pipeline::normalize::date_patch;

/// Build `(id, iso_date)` rows. Records without an id are dropped; the
/// second value is how many were dropped.
pub fn patch_all(records: &[RawRecord]) -> (Vec<DatePatch>, usize) {
    let mut patches = Vec::with_capacity(records.len());
    let mut skipped = 0;

    for record in records {
        match date_patch(record) {
            Some(patch) => {
                metrics::normalize::record_normalized(PipelineMode::Patch.as_str(), patch.iso_date.is_some());
                patches.push(patch);
            }
            None => {
                metrics::normalize::record_skipped("missing_id");
                skipped += 1;
            }
        }
    }

    (patches, skipped)
}

/// In-place patch: fetch the source table, normalize only `date_of_death`
/// and upsert `iso_date` back by id. Other columns are not sent.
pub struct PatchUseCase {
    source: Arc<dyn RecordSourcePort>,
    sink: Arc<dyn RecordSinkPort>,
    settings: PipelineSettings,
}

impl PatchUseCase {
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
        let mut report = RunReport::new(PipelineMode::Patch);
        let table = &self.settings.source_table;

        let raw = fetch_all(self.source.as_ref(), table, self.settings.batch_size).await?;
        report.fetched = raw.len();

        let (patches, skipped) = patch_all(&raw);
        if skipped > 0 {
            warn!("{} rows have no '{}' and will not be patched", skipped, ID_COLUMN);
        }
        report.normalized = patches.len();
        report.skipped_without_id = skipped;
        report.unparseable_dates = patches.iter().filter(|p| p.iso_date.is_none()).count();

        info!("Updating 'iso_date' for {} rows in {}", patches.len(), table);
        let writer = BatchWriter::new(
            self.sink.as_ref(),
            table.clone(),
            WriteMode::Upsert {
                conflict_key: ID_COLUMN.to_string(),
            },
            self.settings.batch_size,
            self.settings.on_batch_error,
        )?;
        report.write = writer.write_all(&patches).await?;

        Ok(report)
    }
}
