// Observability: counters and histograms for each pipeline phase

pub mod metrics;
