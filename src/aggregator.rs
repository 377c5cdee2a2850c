//! Per-worker revenue accumulators and the final reduction
//!
//! Each join worker owns a [`PartialAggregate`]; after the join barrier the
//! partials are summed in worker order into a [`QueryResult`].

use rustc_hash::FxHashMap;

/// nation name -> revenue accumulated by one worker
#[derive(Debug, Clone, Default)]
pub struct PartialAggregate<'a> {
    revenue: FxHashMap<&'a str, f64>,
}

impl<'a> PartialAggregate<'a> {
    #[inline]
    pub fn add(&mut self, nation: &'a str, revenue: f64) {
        *self.revenue.entry(nation).or_insert(0.0) += revenue;
    }

    /// Merge another partial into this one
    pub fn merge(&mut self, other: &PartialAggregate<'a>) {
        for (&nation, &revenue) in &other.revenue {
            self.add(nation, revenue);
        }
    }

    pub fn get(&self, nation: &str) -> Option<f64> {
        self.revenue.get(nation).copied()
    }

    pub fn len(&self) -> usize {
        self.revenue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.revenue.is_empty()
    }
}

/// Final result row
#[derive(Debug, Clone, PartialEq)]
pub struct NationRevenue {
    pub nation: String,
    pub revenue: f64,
}

/// Revenue per nation, ordered by revenue descending.
///
/// Equal revenues are ordered by nation name so the order is deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    rows: Vec<NationRevenue>,
}

impl QueryResult {
    pub fn rows(&self) -> &[NationRevenue] {
        &self.rows
    }

    pub fn revenue_of(&self, nation: &str) -> Option<f64> {
        self.rows.iter().find(|r| r.nation == nation).map(|r| r.revenue)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Sum the worker partials key-wise and order the result
pub fn reduce(partials: Vec<PartialAggregate<'_>>) -> QueryResult {
    let mut merged = PartialAggregate::default();
    for partial in &partials {
        merged.merge(partial);
    }

    let mut rows: Vec<NationRevenue> = merged
        .revenue
        .into_iter()
        .map(|(nation, revenue)| NationRevenue {
            nation: nation.to_string(),
            revenue,
        })
        .collect();

    rows.sort_by(|a, b| {
        b.revenue
            .total_cmp(&a.revenue)
            .then_with(|| a.nation.cmp(&b.nation))
    });

    QueryResult { rows }
}
