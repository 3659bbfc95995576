//! Table and column names shared by the fetch, normalize and write paths.

// Tables
pub const SOURCE_TABLE: &str = "staffordshire_wardead";
pub const TARGET_TABLE: &str = "wardead_clean";

// Page size for reads and batch size for writes; the REST API caps both.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

// Upsert conflict key for the in-place patch
pub const ID_COLUMN: &str = "id";

// Canonical regiment labels
pub const NORTH_STAFFORDSHIRE: &str = "North Staffordshire Regiment";
pub const SOUTH_STAFFORDSHIRE: &str = "South Staffordshire Regiment";
pub const ROYAL_ARTILLERY: &str = "Royal Artillery";
pub const OTHER_REGIMENT: &str = "Other";

/// All labels the regiment normalizer can produce on its own.
pub const CANONICAL_REGIMENTS: &[&str] =
    &[NORTH_STAFFORDSHIRE, SOUTH_STAFFORDSHIRE, ROYAL_ARTILLERY, OTHER_REGIMENT];
