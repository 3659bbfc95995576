use async_trait::async_trait;
use serde_json::Value;

use crate::domain::RawRecord;
use crate::error::Result;

/// Paged read access to a remote table.
#[async_trait]
pub trait RecordSourcePort: Send + Sync {
    /// Fetch up to `limit` rows starting at `offset`. An empty page means the
    /// end of the table.
    async fn fetch_page(&self, table: &str, offset: usize, limit: usize) -> Result<Vec<RawRecord>>;
}

/// Batched write access to a remote table. Rows arrive already serialized.
#[async_trait]
pub trait RecordSinkPort: Send + Sync {
    async fn insert(&self, table: &str, rows: &[Value]) -> Result<()>;

    /// Insert or update rows matched on `conflict_key`; columns absent from
    /// the rows are left untouched.
    async fn upsert(&self, table: &str, rows: &[Value], conflict_key: &str) -> Result<()>;
}
