//! Prometheus sample to Kubernetes value conversion

use chrono::{DateTime, Utc};

use crate::error::ValueError;
use crate::prometheus::response::Sample;
use crate::quantity::Quantity;

const NANOS_PER_SECOND: f64 = 1e9;

/// Convert float seconds since the epoch into an absolute timestamp
///
/// Whole seconds are `floor(seconds)`; the remainder is rounded to the
/// nearest nanosecond. Values outside the representable range are rejected
/// instead of wrapping.
pub fn timestamp_from_seconds(seconds: f64) -> Result<DateTime<Utc>, ValueError> {
    if !seconds.is_finite() {
        return Err(ValueError::TimestampOutOfRange(seconds));
    }

    let mut whole = seconds.floor();
    let mut nanos = ((seconds - whole) * NANOS_PER_SECOND).round();
    if nanos >= NANOS_PER_SECOND {
        whole += 1.0;
        nanos = 0.0;
    }

    // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive
    if whole < i64::MIN as f64 || whole >= i64::MAX as f64 {
        return Err(ValueError::TimestampOutOfRange(seconds));
    }

    DateTime::from_timestamp(whole as i64, nanos as u32).ok_or(ValueError::TimestampOutOfRange(seconds))
}

/// Convert a `[timestamp, "value"]` sample into a quantity and timestamp
pub fn sample_to_external(sample: &Sample) -> Result<(Quantity, DateTime<Utc>), ValueError> {
    let [timestamp, value, ..] = sample.0.as_slice() else {
        return Err(ValueError::MissingFields {
            found: sample.0.len(),
        });
    };

    let seconds = timestamp.as_f64().ok_or(ValueError::InvalidTimestamp)?;
    let timestamp = timestamp_from_seconds(seconds)?;

    let value = value.as_str().ok_or(ValueError::InvalidValue)?;
    let quantity = Quantity::parse(value)?;

    Ok((quantity, timestamp))
}
