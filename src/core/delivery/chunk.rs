//! Observation chunking and time-value pair mapping
//!
//! The registry caps how many observations one addition document may carry,
//! so an observation series is split into fixed-size chunks, each mapped
//! into an ordered time-value pair list. Chunk boundaries never split an
//! observation and chunk order matches input order.

use crate::adapters::lizard::LizardEvent;
use crate::domain::documents::format::parse_platform_timestamp;
use crate::domain::documents::TimeValuePair;
use crate::domain::Result;

use super::quality::{censor_reason, status_quality_control, CensorLimits};

/// Splits an ordered event series into delivery-sized chunks. Chunk `i`
/// covers `[i*size, min((i+1)*size, N))`.
pub fn chunk_events(events: &[LizardEvent], chunk_size: usize) -> impl Iterator<Item = &[LizardEvent]> {
    events.chunks(chunk_size.max(1))
}

/// Maps one chunk of platform events onto registry time-value pairs.
///
/// Timestamps are re-serialized into the registry shape (explicit offset
/// with a colon); the quality-control flag is derived from the numeric
/// validation code; censor fields follow the rejected/empty-value rules.
pub fn to_time_value_pairs(
    events: &[LizardEvent],
    limits: &CensorLimits,
) -> Result<Vec<TimeValuePair>> {
    let mut pairs = Vec::with_capacity(events.len());

    for event in events {
        let time = parse_platform_timestamp(&event.time)?.fixed_offset();
        let mut pair = TimeValuePair::new(&time, event.value);
        pair.status_quality_control = status_quality_control(event.flag).to_string();

        if pair.status_quality_control == "afgekeurd" && event.value.is_none() {
            pair.censor_reason = Some(censor_reason(event.detection_limit.as_deref()).to_string());
        } else if event.value.is_none() {
            pair.censor_reason = Some("onbekend".to_string());
        }

        if let Some(ref reason) = pair.censor_reason {
            pair.censoring_limitvalue = limits.for_reason(reason);
        }

        pairs.push(pair);
    }

    Ok(pairs)
}
