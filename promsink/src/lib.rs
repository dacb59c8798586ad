//! # promsink
//!
//! Relational translation core for Prometheus remote storage.
//!
//! promsink maps an in-memory model of metric labels, series, and samples
//! onto a normalized SQL schema, and maps relational query results back into
//! time series. It is the middle of a remote-storage adapter: the wire
//! protocol that decodes write requests and the query planner that builds
//! read statements sit on either side of it and are consumed as interfaces
//! only.
//!
//! **Status**: This crate is in early development. The API is not yet stable.
//!
//! ## Key Properties
//!
//! - Deduplicated, fixed-size batched label upserts with bounded round trips
//! - Single upsert-and-return query per series flush, ids consumed
//!   positionally
//! - Bulk-loaded samples with an acknowledged-count guard against silent
//!   partial writes
//! - Lazy series reconstruction with presence-aware parallel arrays and a
//!   sticky, check-after-iteration error
//! - No internal retries, transactions, or locking; policy belongs to the
//!   caller
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use promsink::{Inserter, Label, LabelSet, SampleRow};
//! # use promsink::{SeriesStore, StoreError};
//! # struct Engine;
//! # #[async_trait::async_trait]
//! # impl SeriesStore for Engine {
//! #     async fn execute(&self, _sql: &str) -> Result<(), StoreError> { Ok(()) }
//! #     async fn query_ids(&self, _sql: &str) -> Result<Vec<i64>, StoreError> { Ok(vec![1]) }
//! #     async fn copy_in(
//! #         &self,
//! #         _table: &str,
//! #         _columns: &[&str],
//! #         rows: &[SampleRow],
//! #     ) -> Result<i64, StoreError> { Ok(rows.len() as i64) }
//! # }
//!
//! # async fn demo() -> promsink::Result<()> {
//! // One inserter per in-flight write request.
//! let mut inserter = Inserter::new(Engine);
//!
//! // Queue the decoded labels and series, then flush.
//! inserter.add_label(Label::new("__name__", "http_requests_total"));
//! inserter.add_label(Label::new("job", "api"));
//! inserter.insert_labels().await?;
//!
//! let mut set = LabelSet::new();
//! set.insert("__name__".to_string(), "http_requests_total".to_string());
//! set.insert("job".to_string(), "api".to_string());
//! inserter.add_series(0x9f1c_22ab, set);
//! let (ids, _fingerprints) = inserter.insert_series().await?;
//!
//! // Bulk-load the samples against the assigned series ids.
//! let rows = vec![SampleRow::new(ids[0], 1_700_000_000_000, 42.0)];
//! let inserted = inserter.insert_samples(&rows).await?;
//! assert_eq!(inserted, 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`Inserter`]: write path, the label/series batchers and the sample
//!   bulk loader
//! - [`SeriesStore`]: narrow engine capability the write path consumes
//! - [`SeriesSet`]: read path, drains query cursors and decodes series
//!   lazily
//! - [`SampleIterator`]: streams `(timestamp, value)` pairs out of one
//!   series
//!
//! ## Modules
//!
//! For lower-level access, the individual modules are also public:
//!
//! - [`insert`]: pending buffers, flush semantics, statement construction
//! - [`store`]: the engine capability trait and fixed identifiers
//! - [`series_set`]: row cursors, label resolution, sticky-error decoding
//! - [`iterator`]: per-series sample cursor
//! - [`label`]: labels, label sets, canonical JSON encoding
//! - [`sample`]: sample rows, stored-time slots, epoch decoding
//! - [`error`]: error types

pub mod error;
pub mod insert;
pub mod iterator;
pub mod label;
pub mod sample;
pub mod series_set;
pub mod store;

// Re-export primary API types at crate root for convenience.
pub use error::{InsertError, PromsinkError, ReadError, Result, StoreError};
pub use insert::Inserter;
pub use iterator::SampleIterator;
pub use label::{Label, LabelSet};
pub use sample::{POSTGRES_UNIX_EPOCH_MS, SampleRow, StoredTime};
pub use series_set::{LabelResolver, Series, SeriesRow, SeriesRowCursor, SeriesSet};
pub use store::{LABEL_BATCH_SIZE, SAMPLE_COLUMNS, SAMPLES_TABLE, SeriesStore};
