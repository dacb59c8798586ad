//! Error types for the promsink translation core.

use thiserror::Error;

/// The main error type for all promsink operations.
///
/// This enum covers the error conditions of both translation pipelines: the
/// batched write path (labels, series, samples) and the series-set read path.
#[derive(Error, Debug)]
pub enum PromsinkError {
    /// Error reported by the underlying storage engine.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Error during a write-path flush.
    #[error("insert error: {0}")]
    Insert(#[from] InsertError),

    /// Error during series-set reconstruction.
    #[error("error retrieving series set: {0}")]
    Read(#[from] ReadError),
}

/// Errors surfaced by a [`SeriesStore`](crate::store::SeriesStore)
/// implementation.
///
/// Implementations map their driver's failures into these variants; the core
/// never inspects the message text, it only decides whether to abort the
/// current flush.
#[derive(Error, Debug, Clone)]
pub enum StoreError {
    /// The engine rejected a statement or query.
    #[error("engine rejected statement: {message}")]
    Engine {
        /// Driver-reported failure description.
        message: String,
    },

    /// A returned row could not be decoded into the expected shape.
    #[error("failed to scan row {index}: {message}")]
    Scan {
        /// Zero-based position of the offending row in the result.
        index: usize,
        /// Driver-reported decode failure description.
        message: String,
    },
}

/// Errors that can occur during a write-path flush.
#[derive(Error, Debug)]
pub enum InsertError {
    /// A label batch statement failed. Batches before `batch` stay committed;
    /// batches after it were never issued.
    #[error("label batch {batch} failed: {source}")]
    LabelBatch {
        /// Zero-based index of the failed batch.
        batch: usize,
        /// The underlying engine error.
        #[source]
        source: StoreError,
    },

    /// The combined series upsert-and-return query failed; no identifiers
    /// were assigned.
    #[error("series upsert failed: {source}")]
    SeriesUpsert {
        /// The underlying engine error.
        #[source]
        source: StoreError,
    },

    /// A label set could not be encoded to its canonical JSON form.
    #[error("failed to encode label set: {0}")]
    EncodeLabels(#[from] serde_json::Error),

    /// The sample bulk load failed outright.
    #[error("sample bulk load failed: {source}")]
    BulkLoad {
        /// The underlying engine error.
        #[source]
        source: StoreError,
    },

    /// The engine acknowledged a different row count than was submitted to
    /// the bulk load. Raised even when the engine reported success, since a
    /// short count signals an undetected partial write.
    #[error("bulk load acknowledged {acknowledged} of {submitted} rows")]
    CountMismatch {
        /// Number of rows handed to the bulk load.
        submitted: usize,
        /// Row count the engine reported as inserted.
        acknowledged: i64,
    },
}

/// Errors that can occur while reconstructing series on the read path.
#[derive(Error, Debug, Clone)]
pub enum ReadError {
    /// A query row failed to scan out of its cursor.
    #[error("row scan failed: {message}")]
    RowScan {
        /// Driver-reported decode failure description.
        message: String,
    },

    /// Label identifiers could not be resolved back to name/value pairs.
    #[error("label resolution failed: {source}")]
    Resolve {
        /// The underlying resolver error.
        #[source]
        source: StoreError,
    },
}

/// Type alias for `Result<T, PromsinkError>`.
pub type Result<T> = std::result::Result<T, PromsinkError>;
