//! Sample rows and stored-timestamp decoding.
//!
//! The write path ships samples to the engine as flat
//! `(series_id, time, value)` rows. The read path gets them back as parallel
//! arrays produced by array-aggregation joins, where every position is a
//! presence slot: a slot may legitimately hold no value at all, and
//! timestamps may carry the engine's open-ended infinity sentinels instead
//! of an instant.

use serde::{Deserialize, Serialize};

/// Offset of the Unix epoch in milliseconds from the storage time zero,
/// Sat Jan 01 00:00:00 2000 UTC.
///
/// Stored instants are offsets from that zero; adding this constant converts
/// them to Unix milliseconds.
pub const POSTGRES_UNIX_EPOCH_MS: i64 = -946_684_800_000;

/// One `(series, timestamp, value)` observation, in the shape the sample
/// bulk load submits to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleRow {
    /// Internal identifier of the owning series.
    pub series_id: i64,
    /// Sample instant in Unix milliseconds.
    pub millis: i64,
    /// The observed value.
    pub value: f64,
}

impl SampleRow {
    /// Creates a new sample row.
    pub fn new(series_id: i64, millis: i64, value: f64) -> Self {
        Self {
            series_id,
            millis,
            value,
        }
    }
}

/// A decoded timestamp slot from a read-path query row.
///
/// Presence is modeled one level up as `Option<StoredTime>`: a `None` slot
/// encodes "no sample here". A present slot is either an offset from the
/// storage epoch or one of the engine's infinity sentinels, which exist to
/// support open-ended range semantics in downstream queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoredTime {
    /// An instant, as milliseconds from the storage time zero.
    Offset(i64),
    /// The positive-infinity sentinel.
    Infinity,
    /// The negative-infinity sentinel.
    NegInfinity,
}

impl StoredTime {
    /// Decodes this slot to Unix milliseconds.
    ///
    /// Offsets are shifted by [`POSTGRES_UNIX_EPOCH_MS`]; the infinity
    /// sentinels map to the extreme `i64` values independent of any offset
    /// arithmetic.
    pub fn unix_millis(self) -> i64 {
        match self {
            Self::Offset(ms) => ms + POSTGRES_UNIX_EPOCH_MS,
            Self::Infinity => i64::MAX,
            Self::NegInfinity => i64::MIN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_zero_decodes_to_offset_constant() {
        assert_eq!(StoredTime::Offset(0).unix_millis(), -946_684_800_000);
    }

    #[test]
    fn test_offset_shifts_by_epoch() {
        assert_eq!(
            StoredTime::Offset(946_684_800_000).unix_millis(),
            0,
            "an offset equal to the epoch gap lands on the Unix epoch"
        );
        assert_eq!(
            StoredTime::Offset(946_684_801_500).unix_millis(),
            1_500
        );
    }

    #[test]
    fn test_infinity_sentinels_ignore_offset_arithmetic() {
        assert_eq!(StoredTime::Infinity.unix_millis(), i64::MAX);
        assert_eq!(StoredTime::NegInfinity.unix_millis(), i64::MIN);
    }
}
