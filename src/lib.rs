//! TPC-H Query 5 (local supplier volume) over pipe-delimited `.tbl` files.
//!
//! The pipeline loads the six relations into Arrow record batches, builds
//! region-restricted lookup indexes, filters orders and joins lineitem in
//! parallel with static block partitioning, then reduces the per-worker
//! partial aggregates into revenue per nation.

pub mod aggregator;
pub mod config;
pub mod error;
pub mod expressions;
pub mod filter;
pub mod index;
pub mod join;
pub mod output;
pub mod partition;
pub mod query;
pub mod reader;
pub mod schema;
pub mod tables;
pub mod utils;

#[cfg(test)]
mod fixtures;

pub use aggregator::{NationRevenue, QueryResult};
pub use config::{DateRange, QueryConfig, QueryParams, RawConfig};
pub use error::{ConfigError, QueryError, Result};
pub use query::{execute_q5, run, ExecutionStats, QueryOutput};
pub use reader::{load_tables, read_tables_with};
pub use tables::Tables;
