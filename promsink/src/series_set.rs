//! Read path: reconstructing series from parallel-array query rows.
//!
//! Read queries aggregate each series' samples into a row of three parallel
//! arrays: label identifiers, timestamps, and values. A [`SeriesSet`] drains
//! those rows out of one or more already-executed cursors into a flat,
//! ordered collection, then exposes a lazy forward-only cursor that decodes
//! one row into a [`Series`] at a time. Decode failures follow the
//! forward-cursor discipline: they latch into a sticky first-seen error that
//! callers check after exhausting the set.

use async_trait::async_trait;
use tracing::error;

use crate::error::{ReadError, StoreError};
use crate::iterator::SampleIterator;
use crate::label::Label;
use crate::sample::StoredTime;

/// One raw query row: a series' label identifiers plus its samples as
/// parallel presence arrays.
///
/// A row is only usable when `times` and `values` have equal length; ragged
/// rows are an expected artifact of array-aggregation joins and are dropped
/// silently during decoding.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SeriesRow {
    /// Identifiers of the labels describing this series.
    pub label_ids: Vec<i64>,
    /// Timestamp slots; `None` encodes "no sample here".
    pub times: Vec<Option<StoredTime>>,
    /// Value slots; `None` encodes "no sample here".
    pub values: Vec<Option<f64>>,
}

/// Cursor over the rows of one already-executed read query.
///
/// The set builder drains each cursor to exhaustion and then drops it,
/// releasing the underlying statement.
#[async_trait]
pub trait SeriesRowCursor: Send {
    /// Scans the next row; `None` once the cursor is exhausted.
    ///
    /// A scan failure is reported as an `Err` item; the cursor may still
    /// yield further rows after it.
    async fn next_row(&mut self) -> Option<std::result::Result<SeriesRow, ReadError>>;
}

/// Maps stored label identifiers back to `(name, value)` pairs.
///
/// Consumed by [`SeriesSet::at`] when a row carries label identifiers.
/// Production implementations sit on the label dictionary table, usually
/// behind a cache; tests inject a map.
#[async_trait]
pub trait LabelResolver: Send + Sync {
    /// Resolves `ids` to labels, in any order.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the lookup fails; the set latches it into
    /// its sticky error.
    async fn labels_for_ids(&self, ids: &[i64]) -> std::result::Result<Vec<Label>, StoreError>;
}

#[async_trait]
impl<R: LabelResolver + ?Sized> LabelResolver for &R {
    async fn labels_for_ids(&self, ids: &[i64]) -> std::result::Result<Vec<Label>, StoreError> {
        (**self).labels_for_ids(ids).await
    }
}

/// A drained row plus the scan error it carried, if any.
#[derive(Debug)]
struct RawRow {
    row: SeriesRow,
    error: Option<ReadError>,
}

/// An ordered, single-pass collection of series reconstructed from query
/// rows.
///
/// Built once per read request, consumed exactly once front to back, then
/// discarded. Decoding is lazy: a row is only turned into a [`Series`] when
/// the cursor stops on it and [`at`](Self::at) is called.
pub struct SeriesSet<R> {
    rows: Vec<RawRow>,
    pos: Option<usize>,
    err: Option<ReadError>,
    resolver: R,
}

impl<R: LabelResolver> SeriesSet<R> {
    /// Drains every row from every cursor, in cursor-supply order, into a
    /// new set.
    ///
    /// Rows that fail to scan are retained with their error attached so the
    /// cursor position accounting stays intact; the error is also logged
    /// here, at the point it was observed.
    pub async fn collect<C: SeriesRowCursor>(cursors: Vec<C>, resolver: R) -> Self {
        let mut rows = Vec::new();
        for mut cursor in cursors {
            while let Some(scanned) = cursor.next_row().await {
                match scanned {
                    Ok(row) => rows.push(RawRow { row, error: None }),
                    Err(err) => {
                        error!(error = %err, "failed to scan series row");
                        rows.push(RawRow {
                            row: SeriesRow::default(),
                            error: Some(err),
                        });
                    }
                }
            }
        }
        Self {
            rows,
            pos: None,
            err: None,
            resolver,
        }
    }

    /// Advances the cursor; returns whether a row is now available.
    ///
    /// Once the end has been passed, keeps returning `false`.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> bool {
        let next = match self.pos {
            None => 0,
            Some(i) if i >= self.rows.len() => return false,
            Some(i) => i + 1,
        };
        self.pos = Some(next);
        next < self.rows.len()
    }

    /// Decodes the row at the current position into a [`Series`].
    ///
    /// Returns `None` without touching the sticky error when the position is
    /// out of range, the row's parallel arrays are ragged, or the row
    /// carries no label identifiers (the resolver is not consulted).
    /// Returns `None` and latches the sticky error when the row carried a
    /// scan error or label resolution fails. Resolved labels are sorted
    /// ascending by name, value as tie-break.
    pub async fn at(&mut self) -> Option<Series> {
        let idx = match self.pos {
            Some(i) if i < self.rows.len() => i,
            _ => return None,
        };

        let raw = &self.rows[idx];
        if let Some(err) = &raw.error {
            if self.err.is_none() {
                self.err = Some(err.clone());
            }
            return None;
        }

        let row = &raw.row;
        if row.times.len() != row.values.len() {
            // Ragged array_agg output; drop the series, not the request.
            return None;
        }
        if row.label_ids.is_empty() {
            return None;
        }

        match self.resolver.labels_for_ids(&row.label_ids).await {
            Ok(mut labels) => {
                labels.sort();
                Some(Series {
                    labels,
                    times: row.times.clone(),
                    values: row.values.clone(),
                })
            }
            Err(source) => {
                let err = ReadError::Resolve { source };
                error!(error = %err, "failed to resolve series labels");
                if self.err.is_none() {
                    self.err = Some(err);
                }
                None
            }
        }
    }

    /// Reports the first error latched by any [`at`](Self::at) call.
    ///
    /// Set once and never overwritten by a later, different error. Callers
    /// check this after exhausting the set.
    pub fn err(&self) -> Option<&ReadError> {
        self.err.as_ref()
    }
}

/// One reconstructed time series: resolved labels plus parallel sample
/// arrays.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    labels: Vec<Label>,
    times: Vec<Option<StoredTime>>,
    values: Vec<Option<f64>>,
}

impl Series {
    /// The series' labels, sorted by name with value as tie-break.
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Number of slots in the sample arrays, absent slots included.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Whether the sample arrays hold no slots at all.
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Returns an iterator over this series' present samples.
    pub fn samples(&self) -> SampleIterator<'_> {
        SampleIterator::new(&self.times, &self.values)
    }
}
