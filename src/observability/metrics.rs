//! Counters for the wardead pipeline, recorded through the `metrics` facade.
//!
//! No exporter is installed by the binary; an embedding process may install
//! a recorder to collect these.

pub mod fetch {
    /// Record one page read from the source table
    pub fn page_fetched(rows: usize) {
        ::metrics::counter!("wardead_fetch_pages_total").increment(1);
        ::metrics::counter!("wardead_fetch_rows_total").increment(rows as u64);
    }
}

pub mod normalize {
    /// Record a normalized row and whether its date parsed
    pub fn record_normalized(mode: &'static str, date_parsed: bool) {
        ::metrics::counter!("wardead_normalize_records_total", "mode" => mode).increment(1);
        if !date_parsed {
            ::metrics::counter!("wardead_normalize_unparseable_dates_total", "mode" => mode).increment(1);
        }
    }

    /// Record the canonical label a regiment resolved to, or "unmatched"
    pub fn regiment_resolved(label: &'static str) {
        ::metrics::counter!("wardead_normalize_regiments_total", "label" => label).increment(1);
    }

    pub fn record_skipped(reason: &'static str) {
        ::metrics::counter!("wardead_normalize_skipped_total", "reason" => reason).increment(1);
    }
}

pub mod write {
    pub fn batch_written(rows: usize) {
        ::metrics::counter!("wardead_write_batches_total", "outcome" => "ok").increment(1);
        ::metrics::histogram!("wardead_write_batch_size").record(rows as f64);
    }

    pub fn batch_failed() {
        ::metrics::counter!("wardead_write_batches_total", "outcome" => "error").increment(1);
    }
}
