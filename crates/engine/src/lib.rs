//! Engines that move components through the catalog tables
//!
//! Three pieces live here:
//! - the codec, which splits an inbound component aggregate into its
//!   per-table records and joins them back for reads,
//! - the idempotent upsert engine for the entity tables,
//! - the embedding engine, which de-duplicates and value-compares vector
//!   rows on top of the same store.

#![warn(clippy::all)]

pub mod codec;
pub mod embedding;
pub mod upsert;

pub use codec::{join_component, split_component, validate_aggregate, SplitComponent};
pub use embedding::{validate_embedding_vector, EmbeddingEngine, EmbeddingEntry, EmbeddingWriteStats};
pub use upsert::{UpsertOutcome, Upserter};
