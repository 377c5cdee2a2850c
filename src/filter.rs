//! Parallel order filtering using Arrow compute kernels
//!
//! Produces the `order key -> customer key` map of orders placed in the date
//! range by a customer of the target region.

use arrow::array::{BooleanArray, Date32Array, RecordBatch, Scalar};
use arrow::compute;
use arrow::compute::kernels::cmp::{gt_eq, lt};
use arrow_select::filter::filter_record_batch;
use rustc_hash::FxHashMap;
use std::num::NonZeroUsize;
use tracing::{debug, info};

use crate::config::DateRange;
use crate::error::Result;
use crate::index::NationOf;
use crate::partition::{run_partitioned, WorkerStats};
use crate::tables::OrderColumns;
use crate::utils::column;

/// order key -> customer key
pub type ValidOrders = FxHashMap<i64, i64>;

/// Mask of rows with `start <= o_orderdate < end`
pub fn create_date_filter_mask(batch: &RecordBatch, dates: &DateRange) -> Result<BooleanArray> {
    let order_date = column::<Date32Array>(batch, "o_orderdate")?;

    let start = Scalar::new(Date32Array::from(vec![dates.start]));
    let end = Scalar::new(Date32Array::from(vec![dates.end]));

    let on_or_after = gt_eq(order_date, &start)?;
    let before = lt(order_date, &end)?;
    Ok(compute::and(&on_or_after, &before)?)
}

/// Filter one contiguous chunk of orders into a private map
fn filter_chunk(chunk: &RecordBatch, dates: &DateRange, customer_nation: &NationOf) -> Result<ValidOrders> {
    let mask = create_date_filter_mask(chunk, dates)?;
    if mask.true_count() == 0 {
        return Ok(ValidOrders::default());
    }

    let in_range = filter_record_batch(chunk, &mask)?;
    let orders = OrderColumns::new(&in_range)?;

    let mut valid = ValidOrders::default();
    for (&order_key, &cust_key) in orders.order_key.values().iter().zip(orders.cust_key.values().iter()) {
        if customer_nation.contains_key(&cust_key) {
            valid.insert(order_key, cust_key);
        }
    }
    Ok(valid)
}

/// Filter orders by date range and customer, in parallel.
///
/// Each worker scans one chunk into its own map; the maps are merged after
/// all workers have joined. An order key only ever appears in one chunk, so
/// the merge never overwrites.
pub fn filter_orders(
    orders: &RecordBatch,
    dates: &DateRange,
    customer_nation: &NationOf,
    workers: NonZeroUsize,
) -> Result<(ValidOrders, Vec<WorkerStats>)> {
    let partials = run_partitioned("order filter", orders.num_rows(), workers, |_, rows| {
        let chunk = orders.slice(rows.start, rows.len());
        let valid = filter_chunk(&chunk, dates, customer_nation)?;
        let matched = valid.len();
        Ok((valid, matched))
    })?;

    let total: usize = partials.iter().map(|(valid, _)| valid.len()).sum();
    let mut valid_orders = ValidOrders::with_capacity_and_hasher(total, Default::default());
    let mut stats = Vec::with_capacity(partials.len());
    for (valid, worker) in partials {
        debug!(
            worker = worker.worker,
            start = worker.rows.start,
            end = worker.rows.end,
            matched = worker.matched,
            elapsed_us = worker.elapsed.as_micros() as u64,
            "order filter worker done"
        );
        valid_orders.extend(valid);
        stats.push(worker);
    }

    info!(scanned = orders.num_rows(), valid = valid_orders.len(), "filtered orders");
    Ok((valid_orders, stats))
}
