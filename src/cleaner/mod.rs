//! Cleaning pipeline stages.
//!
//! Each raw source table is annotated independently ([`annotate`]), the
//! annotated batches are combined in selection order ([`combine`]), and
//! the result is optionally narrowed by a location predicate
//! ([`filter`]). Every stage is a synchronous transform over an in-memory
//! [`polars::prelude::DataFrame`]; reading and writing happen in
//! [`crate::processor`].

pub mod annotate;
pub mod combine;
pub mod filter;

pub use annotate::RecordAnnotator;
pub use combine::combine_batches;
pub use filter::{FilterKind, apply_filter};
