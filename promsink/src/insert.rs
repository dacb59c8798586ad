//! Batched write path: label and series upserts, sample bulk load.
//!
//! An [`Inserter`] accumulates decoded labels and series in pending buffers,
//! then flushes them as deduplicated upsert statements and hands sample rows
//! to the engine's bulk-load path. One inserter serves one in-flight write
//! request; it is not internally synchronized, so `add_*` calls and the
//! corresponding flush must be serialized by the caller.
//!
//! Engine round trips per flush are bounded and predictable:
//! `ceil(distinct / LABEL_BATCH_SIZE)` statements for labels, exactly one
//! query for series, exactly one bulk load for samples.
//!
//! # Example
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
//! let mut inserter = Inserter::new(Engine);
//!
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
//! let rows = vec![SampleRow::new(ids[0], 1_700_000_000_000, 42.0)];
//! inserter.insert_samples(&rows).await?;
//! # Ok(())
//! # }
//! ```

use tracing::debug;

use crate::error::{InsertError, Result};
use crate::label::{Label, LabelSet, canonical_json};
use crate::sample::SampleRow;
use crate::store::{LABEL_BATCH_SIZE, SAMPLE_COLUMNS, SAMPLES_TABLE, SeriesStore};

/// Accumulates pending labels and series, and flushes them to the engine.
///
/// Flushes are atomic only with respect to their own pending buffer: the
/// buffer is taken and cleared before any I/O is issued, so a failed or
/// cancelled flush leaves nothing pending and must be redone from the
/// caller's own input. Batches are not wrapped in an explicit transaction;
/// a mid-flush failure leaves earlier batches committed. Callers that need
/// all-or-nothing semantics must supply a transactional [`SeriesStore`].
pub struct Inserter<S> {
    store: S,
    pending_labels: Vec<Label>,
    pending_series: Vec<(u64, LabelSet)>,
}

impl<S: SeriesStore> Inserter<S> {
    /// Creates an inserter over the given store.
    pub fn new(store: S) -> Self {
        Self {
            store,
            pending_labels: Vec::new(),
            pending_series: Vec::new(),
        }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Queues one label for the next [`insert_labels`](Self::insert_labels)
    /// flush. No deduplication happens here and no I/O is performed.
    pub fn add_label(&mut self, label: Label) {
        self.pending_labels.push(label);
    }

    /// Queues one series for the next [`insert_series`](Self::insert_series)
    /// flush. No I/O is performed.
    ///
    /// The fingerprint is the caller-supplied digest of the label set; one
    /// fingerprint must map to exactly one label set. Collisions across
    /// distinct label sets are an input-contract violation and are not
    /// detected here.
    pub fn add_series(&mut self, fingerprint: u64, labels: LabelSet) {
        self.pending_series.push((fingerprint, labels));
    }

    /// Flushes all pending labels as deduplicated, fixed-size upsert batches.
    ///
    /// Takes ownership of the pending buffer and clears it immediately, then
    /// sorts by `(name, value)`, collapses exact duplicates, and issues one
    /// multi-row upsert statement per [`LABEL_BATCH_SIZE`] chunk, in batch
    /// order. Returns the sorted, deduplicated labels. An empty buffer
    /// short-circuits with no statement issued.
    ///
    /// # Errors
    ///
    /// Returns [`InsertError::LabelBatch`] on the first failed batch; later
    /// batches are not issued, and already-executed batches are not rolled
    /// back.
    pub async fn insert_labels(&mut self) -> Result<Vec<Label>> {
        let mut labels = std::mem::take(&mut self.pending_labels);
        if labels.is_empty() {
            return Ok(Vec::new());
        }

        labels.sort();
        labels.dedup();

        for (batch, chunk) in labels.chunks(LABEL_BATCH_SIZE).enumerate() {
            let sql = label_batch_statement(chunk);
            self.store
                .execute(&sql)
                .await
                .map_err(|source| InsertError::LabelBatch { batch, source })?;
        }

        debug!(
            labels = labels.len(),
            batches = labels.len().div_ceil(LABEL_BATCH_SIZE),
            "flushed pending labels"
        );

        Ok(labels)
    }

    /// Flushes all pending series through one upsert-and-return query.
    ///
    /// Takes ownership of the pending buffer and clears it immediately, then
    /// stable-sorts by fingerprint and collapses duplicate fingerprints
    /// keeping the first entry. Each survivor's label set is encoded as
    /// canonical JSON and embedded into a single combined statement that both
    /// upserts the series rows and returns their internal identifiers.
    ///
    /// The returned identifiers correspond positionally to the returned
    /// fingerprints: rows come back in the same fingerprint-sorted order the
    /// statement was built in. An empty buffer short-circuits with no query
    /// issued.
    ///
    /// # Errors
    ///
    /// Returns [`InsertError::SeriesUpsert`] if the query or any row scan
    /// fails; no partial identifiers are returned.
    pub async fn insert_series(&mut self) -> Result<(Vec<i64>, Vec<u64>)> {
        let mut pending = std::mem::take(&mut self.pending_series);
        if pending.is_empty() {
            return Ok((Vec::new(), Vec::new()));
        }

        pending.sort_by_key(|(fingerprint, _)| *fingerprint);
        pending.dedup_by_key(|(fingerprint, _)| *fingerprint);

        let mut fingerprints = Vec::with_capacity(pending.len());
        let mut encoded = Vec::with_capacity(pending.len());
        for (fingerprint, labels) in &pending {
            fingerprints.push(*fingerprint);
            encoded.push((*fingerprint, canonical_json(labels)?));
        }

        let sql = series_upsert_statement(&encoded);
        let ids = self
            .store
            .query_ids(&sql)
            .await
            .map_err(|source| InsertError::SeriesUpsert { source })?;

        debug!(series = fingerprints.len(), "upserted pending series");

        Ok((ids, fingerprints))
    }

    /// Bulk-loads sample rows and verifies the acknowledged row count.
    ///
    /// Empty input performs no I/O and returns zero. Otherwise issues one
    /// bulk-load call against [`SAMPLES_TABLE`] / [`SAMPLE_COLUMNS`] and
    /// compares the engine-acknowledged count with `rows.len()`.
    ///
    /// # Errors
    ///
    /// Returns [`InsertError::BulkLoad`] if the load fails, or
    /// [`InsertError::CountMismatch`] whenever the acknowledged count
    /// disagrees with the submitted count, even when the engine itself
    /// reported success.
    pub async fn insert_samples(&self, rows: &[SampleRow]) -> Result<u64> {
        if rows.is_empty() {
            return Ok(0);
        }

        let acknowledged = self
            .store
            .copy_in(SAMPLES_TABLE, SAMPLE_COLUMNS, rows)
            .await
            .map_err(|source| InsertError::BulkLoad { source })?;

        if acknowledged != rows.len() as i64 {
            return Err(InsertError::CountMismatch {
                submitted: rows.len(),
                acknowledged,
            }
            .into());
        }

        debug!(samples = rows.len(), "bulk-loaded sample rows");

        #[allow(clippy::cast_sign_loss)] // equality with the submitted count was just checked
        let inserted = acknowledged as u64;
        Ok(inserted)
    }
}

/// Escapes a string for embedding as a single-quoted SQL literal.
fn quote_literal(text: &str) -> String {
    text.replace('\'', "''")
}

/// Builds one multi-row label upsert statement for a deduplicated batch.
fn label_batch_statement(batch: &[Label]) -> String {
    let mut rows = Vec::with_capacity(batch.len());
    for label in batch {
        rows.push(format!(
            "('{}','{}')",
            quote_literal(&label.name),
            quote_literal(&label.value)
        ));
    }
    format!(
        "INSERT INTO labels (name, value) VALUES {} ON CONFLICT DO NOTHING",
        rows.join(",")
    )
}

/// Builds the combined series upsert-and-return statement.
///
/// The no-op conflict update makes the engine return an identifier for every
/// input row, already-known fingerprints included, in input order.
fn series_upsert_statement(entries: &[(u64, String)]) -> String {
    let mut rows = Vec::with_capacity(entries.len());
    for (fingerprint, json) in entries {
        rows.push(format!("({},'{}')", fingerprint, quote_literal(json)));
    }
    format!(
        "INSERT INTO series (fingerprint, labels) VALUES {} \
         ON CONFLICT (fingerprint) DO UPDATE SET fingerprint = EXCLUDED.fingerprint \
         RETURNING id",
        rows.join(",")
    )
}
