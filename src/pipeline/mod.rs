// src/pipeline/mod.rs
//! The shared ingestion pipeline.
//!
//! Every source, however it scrapes, funnels through the same machinery:
//!
//! ```text
//! adapter read → raw records → Normalizer (stages) → merge with prior
//!                                                  → monotonic clamp
//!                                                  → next snapshot
//! ```
//!
//! Stages are plain functions over `Vec<MetricRecord>`, applied in an
//! explicit order by `run_stages`. Each one is pure and testable on its
//! own; none of them touch the network or the store.

pub mod merge;
pub mod monotonic;
pub mod normalize;
pub mod timeline;

use crate::error::Result;
use crate::model::MetricRecord;

/// One pipeline stage. Consumes the records and returns the transformed
/// sequence; failures abort the whole run for that jurisdiction.
pub type Stage<'a> = Box<dyn Fn(Vec<MetricRecord>) -> Result<Vec<MetricRecord>> + 'a>;

/// Apply `stages` left to right.
pub fn run_stages(mut records: Vec<MetricRecord>, stages: &[Stage<'_>]) -> Result<Vec<MetricRecord>> {
    for stage in stages {
        records = stage(records)?;
    }
    Ok(records)
}
