//! Batch combination.
//!
//! Concatenates annotated batches diagonally: the output column set is the
//! union of every batch's columns and cells a batch does not have are
//! null. Row order is batch order, then row order within each batch.

use crate::error::{AqsError, Result};
use polars::prelude::*;
use tracing::{debug, warn};

/// Combine annotated batches (in selection order) into the cleaned table.
///
/// With `combine` unset only the first batch is kept, matching a
/// single-source run; the remaining batches are reported and discarded.
pub fn combine_batches(batches: Vec<DataFrame>, combine: bool) -> Result<DataFrame> {
    let batch_count = batches.len();
    let mut batches = batches.into_iter();

    let Some(first) = batches.next() else {
        return Err(AqsError::NoUsableSources {
            reason: "no annotated batches to combine".to_string(),
        });
    };

    if !combine {
        if batch_count > 1 {
            warn!(
                "Combination disabled: writing the first source only, {} other source(s) ignored",
                batch_count - 1
            );
        }
        return Ok(first);
    }

    if batch_count == 1 {
        return Ok(first);
    }

    let frames: Vec<LazyFrame> = std::iter::once(first)
        .chain(batches)
        .map(|df| df.lazy())
        .collect();

    let args = UnionArgs {
        to_supertypes: true,
        ..Default::default()
    };
    let combined = concat_lf_diagonal(frames, args)?.collect()?;

    debug!(
        "Combined {} batches into {} rows x {} columns",
        batch_count,
        combined.height(),
        combined.width()
    );
    Ok(combined)
}
