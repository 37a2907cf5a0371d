//! Storage seams for the crawler.
//!
//! Applications provide these; the crate ships an in-memory implementation
//! and a Postgres one behind the `postgres` feature.

pub mod queue;
pub mod store;
