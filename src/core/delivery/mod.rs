//! Chunked time-series delivery
//!
//! Splits observation series into registry-sized chunks, derives the
//! quality-control fields, wraps each chunk in an addition document, and
//! advances the asset platform's delivered watermark only after the
//! registry confirmed the chunk.

pub mod chunk;
pub mod quality;
pub mod submitter;

pub use chunk::{chunk_events, to_time_value_pairs};
pub use quality::{censor_reason, status_quality_control, CensorLimits};
pub use submitter::{
    AdditionSubmitter, DeliverySummary, DeliveryTarget, ObservationSeries, ProcedureInfo,
};
