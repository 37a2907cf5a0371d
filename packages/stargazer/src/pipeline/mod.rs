//! Per-repository processing: eligibility, sampling, aggregation.

pub mod aggregate;
pub mod eligibility;
pub mod sampler;
