//! Query orchestration - ties together all components

use std::time::Instant;

use tracing::info;

use crate::aggregator::{reduce, QueryResult};
use crate::config::{QueryConfig, QueryParams};
use crate::error::Result;
use crate::filter::filter_orders;
use crate::index::build_indexes;
use crate::join::join_aggregate;
use crate::output::write_result;
use crate::partition::WorkerStats;
use crate::reader::load_tables;
use crate::schema::Relation;
use crate::tables::Tables;

/// What a run did, stage by stage
#[derive(Debug, Clone, Default)]
pub struct ExecutionStats {
    /// The region (or its nations) did not match, so orders and lineitem
    /// were never scanned
    pub short_circuited: bool,
    pub orders_scanned: usize,
    pub valid_orders: usize,
    pub lineitems_scanned: usize,
    pub lineitems_matched: usize,
    pub order_workers: Vec<WorkerStats>,
    pub lineitem_workers: Vec<WorkerStats>,
}

#[derive(Debug, Clone)]
pub struct QueryOutput {
    pub result: QueryResult,
    pub stats: ExecutionStats,
}

/// Execute TPC-H Query 5 over loaded tables
///
/// Returns revenue per nation sorted by revenue descending
pub fn execute_q5(tables: &Tables, params: &QueryParams) -> Result<QueryOutput> {
    let Some(indexes) = build_indexes(tables, &params.region_name)? else {
        return Ok(QueryOutput {
            result: QueryResult::default(),
            stats: ExecutionStats {
                short_circuited: true,
                ..Default::default()
            },
        });
    };

    let orders = tables.get(Relation::Orders);
    let (valid_orders, order_workers) =
        filter_orders(orders, &params.dates, &indexes.customer_nation, params.workers)?;

    let lineitem = tables.get(Relation::Lineitem);
    let (partials, lineitem_workers) = join_aggregate(lineitem, &valid_orders, &indexes, params.workers)?;

    let result = reduce(partials);

    let stats = ExecutionStats {
        short_circuited: false,
        orders_scanned: order_workers.iter().map(WorkerStats::scanned).sum(),
        valid_orders: valid_orders.len(),
        lineitems_scanned: lineitem_workers.iter().map(WorkerStats::scanned).sum(),
        lineitems_matched: lineitem_workers.iter().map(|w| w.matched).sum(),
        order_workers,
        lineitem_workers,
    };

    Ok(QueryOutput { result, stats })
}

/// Load, execute and write the result for a validated configuration.
///
/// Nothing is written unless every stage succeeded.
pub fn run(config: &QueryConfig) -> Result<QueryOutput> {
    let params = config.params();

    let started = Instant::now();
    let tables = load_tables(&config.input_dir)?;
    let loaded = started.elapsed();

    let output = execute_q5(&tables, &params)?;
    let executed = started.elapsed() - loaded;
    // relations are no longer needed once the result exists
    drop(tables);

    write_result(&config.output_path, &output.result)?;

    info!(
        nations = output.result.len(),
        load_ms = loaded.as_secs_f64() * 1000.0,
        query_ms = executed.as_secs_f64() * 1000.0,
        output = %config.output_path.display(),
        "query finished"
    );
    Ok(output)
}
