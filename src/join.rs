//! Parallel lineitem join and revenue aggregation
//!
//! Lineitem is split into contiguous chunks, one per worker. Every worker
//! probes the shared read-only indexes and accumulates into its own
//! [`PartialAggregate`]; nothing is written across threads.

use std::num::NonZeroUsize;

use arrow::array::{RecordBatch, UInt64Array};
use tracing::{debug, info};

use crate::aggregator::PartialAggregate;
use crate::error::Result;
use crate::expressions::evaluate_revenue;
use crate::filter::ValidOrders;
use crate::index::Indexes;
use crate::partition::{run_partitioned, WorkerStats};
use crate::tables::LineitemColumns;

/// Aggregate one chunk of lineitem. Returns the partial and the number of
/// rows that passed the join predicate.
///
/// The probe runs first; price and discount are parsed only for the rows that
/// matched, so a bad value on a row that never joins is never looked at.
fn aggregate_chunk<'a>(
    chunk: &RecordBatch,
    row_offset: usize,
    valid_orders: &ValidOrders,
    indexes: &'a Indexes,
) -> Result<(PartialAggregate<'a>, usize)> {
    let lineitem = LineitemColumns::new(chunk)?;

    let mut matched_rows = Vec::new();
    let mut nations = Vec::new();

    let keys = lineitem.order_key.values().iter().zip(lineitem.supp_key.values().iter());
    for (row, (order_key, supp_key)) in keys.enumerate() {
        let Some(cust_key) = valid_orders.get(order_key) else {
            continue;
        };
        let Some(&supp_nation) = indexes.supplier_nation.get(supp_key) else {
            continue;
        };
        // c_nationkey = s_nationkey
        if indexes.customer_nation.get(cust_key) != Some(&supp_nation) {
            continue;
        }
        if let Some(nation) = indexes.nation_name(supp_nation) {
            matched_rows.push(row as u64);
            nations.push(nation);
        }
    }

    let mut partial = PartialAggregate::default();
    if nations.is_empty() {
        return Ok((partial, 0));
    }

    let revenue = evaluate_revenue(&lineitem, &UInt64Array::from(matched_rows), row_offset)?;
    for (&nation, &revenue) in nations.iter().zip(revenue.values().iter()) {
        partial.add(nation, revenue);
    }

    Ok((partial, nations.len()))
}

/// Join lineitem against the order and supplier indexes and sum revenue per
/// nation, one partial aggregate per worker (in worker order).
pub fn join_aggregate<'a>(
    lineitem: &RecordBatch,
    valid_orders: &ValidOrders,
    indexes: &'a Indexes,
    workers: NonZeroUsize,
) -> Result<(Vec<PartialAggregate<'a>>, Vec<WorkerStats>)> {
    let results = run_partitioned("join aggregate", lineitem.num_rows(), workers, |_, rows| {
        let chunk = lineitem.slice(rows.start, rows.len());
        aggregate_chunk(&chunk, rows.start, valid_orders, indexes)
    })?;

    let mut partials = Vec::with_capacity(results.len());
    let mut stats = Vec::with_capacity(results.len());
    for (partial, worker) in results {
        debug!(
            worker = worker.worker,
            start = worker.rows.start,
            end = worker.rows.end,
            matched = worker.matched,
            nations = partial.len(),
            elapsed_us = worker.elapsed.as_micros() as u64,
            "join worker done"
        );
        partials.push(partial);
        stats.push(worker);
    }

    let matched: usize = stats.iter().map(|s| s.matched).sum();
    info!(scanned = lineitem.num_rows(), matched, "joined lineitem");
    Ok((partials, stats))
}
