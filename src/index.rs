//! Selective lookup indexes over the dimension relations
//!
//! Each index is built by one filtering pass over one relation, narrowing
//! everything down to the nations of the target region.

use arrow::array::Array;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, info};

use crate::error::Result;
use crate::tables::Tables;

/// key -> nation key
pub type NationOf = FxHashMap<i64, i64>;

#[derive(Debug, Clone, Default)]
pub struct Indexes {
    /// Regions whose name equals the target
    pub region_keys: FxHashSet<i64>,
    /// nation key -> nation name, for nations in `region_keys`
    pub nation_keys: FxHashMap<i64, String>,
    /// supplier key -> nation key, for suppliers in `nation_keys`
    pub supplier_nation: NationOf,
    /// customer key -> nation key, for customers in `nation_keys`
    pub customer_nation: NationOf,
}

impl Indexes {
    /// Name of a nation in the target region
    #[inline]
    pub fn nation_name(&self, nation_key: i64) -> Option<&str> {
        self.nation_keys.get(&nation_key).map(String::as_str)
    }
}

/// Build the lookup indexes for `region_name`.
///
/// Returns `None` when no region or no nation matches: the query result is
/// then empty and orders/lineitem must not be scanned.
pub fn build_indexes(tables: &Tables, region_name: &str) -> Result<Option<Indexes>> {
    let region = tables.region()?;
    let region_keys: FxHashSet<i64> = (0..region.name.len())
        .filter(|&i| region.name.value(i) == region_name)
        .map(|i| region.region_key.value(i))
        .collect();
    if region_keys.is_empty() {
        info!(region = region_name, "no matching region, result is empty");
        return Ok(None);
    }

    let nation = tables.nation()?;
    let nation_keys: FxHashMap<i64, String> = (0..nation.nation_key.len())
        .filter(|&i| region_keys.contains(&nation.region_key.value(i)))
        .map(|i| (nation.nation_key.value(i), nation.name.value(i).to_string()))
        .collect();
    if nation_keys.is_empty() {
        info!(region = region_name, "region has no nations, result is empty");
        return Ok(None);
    }

    let supplier = tables.supplier()?;
    let supplier_nation = nation_filter(supplier.supp_key.values(), supplier.nation_key.values(), &nation_keys);

    let customer = tables.customer()?;
    let customer_nation = nation_filter(customer.cust_key.values(), customer.nation_key.values(), &nation_keys);

    debug!(
        regions = region_keys.len(),
        nations = nation_keys.len(),
        suppliers = supplier_nation.len(),
        customers = customer_nation.len(),
        "built indexes"
    );

    Ok(Some(Indexes {
        region_keys,
        nation_keys,
        supplier_nation,
        customer_nation,
    }))
}

/// key -> nation for the rows whose nation is one of `nations`
fn nation_filter(keys: &[i64], nation_of_row: &[i64], nations: &FxHashMap<i64, String>) -> NationOf {
    keys.iter()
        .zip(nation_of_row)
        .filter(|&(_, &nation)| nations.contains_key(&nation))
        .map(|(&key, &nation)| (key, nation))
        .collect()
}
