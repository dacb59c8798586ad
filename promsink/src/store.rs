//! The storage-engine capability consumed by the write path.
//!
//! The translation core never opens connections, pools them, or runs
//! migrations; it consumes a narrow, injectable view of an already-connected
//! SQL engine. Three operations cover everything the write path needs:
//! execute a statement, run an id-returning query, and bulk-load sample
//! rows. Tests implement [`SeriesStore`] over in-memory recorders; a
//! production implementation wraps a real driver connection.
//!
//! Row binding is statically typed per query: [`SeriesStore::query_ids`]
//! scans exactly one `bigint` per returned row, which is the only row shape
//! the write path reads back.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::sample::SampleRow;

/// Maximum number of distinct labels encoded into one upsert statement.
///
/// A label flush issues `ceil(distinct / LABEL_BATCH_SIZE)` statements.
pub const LABEL_BATCH_SIZE: usize = 500;

/// Destination table for the sample bulk load.
pub const SAMPLES_TABLE: &str = "samples";

/// Column list for the sample bulk load, matching [`SampleRow`] field order.
pub const SAMPLE_COLUMNS: &[&str] = &["series_id", "time", "value"];

/// Narrow view of the SQL engine consumed by the write path.
///
/// Every method is one engine round trip and blocks the caller for its
/// duration. Cancellation follows the standard async model: dropping an
/// in-flight future abandons the call, and the flush that issued it must be
/// redone from the caller's own input. Implementations perform no retries;
/// resilience policy belongs to the surrounding service.
#[async_trait]
pub trait SeriesStore: Send + Sync {
    /// Runs a statement that returns no rows.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Engine`] if the engine rejects the statement.
    async fn execute(&self, sql: &str) -> Result<(), StoreError>;

    /// Runs a query and scans one `bigint` identifier per returned row, in
    /// return order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Engine`] if the engine rejects the query, or
    /// [`StoreError::Scan`] if a returned row cannot be decoded.
    async fn query_ids(&self, sql: &str) -> Result<Vec<i64>, StoreError>;

    /// Bulk-loads `rows` into `table` with the given column list, returning
    /// the engine-acknowledged row count.
    ///
    /// The acknowledged count is reported as-is; the caller is responsible
    /// for comparing it against the submitted count.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Engine`] if the load fails outright.
    async fn copy_in(
        &self,
        table: &str,
        columns: &[&str],
        rows: &[SampleRow],
    ) -> Result<i64, StoreError>;
}
