//! Loaded relations and typed column views over them

use arrow_array::{Date32Array, Int64Array, RecordBatch, StringArray};

use crate::error::Result;
use crate::schema::Relation;
use crate::utils::column;

/// The six Q5 relations, one record batch each.
///
/// Immutable once loaded; the parallel stages only ever read from it.
#[derive(Debug, Clone)]
pub struct Tables {
    // Indexed by `Relation as usize`, in `Relation::ALL` order
    batches: Vec<RecordBatch>,
}

impl Tables {
    pub(crate) fn from_batches(batches: Vec<RecordBatch>) -> Self {
        debug_assert_eq!(batches.len(), Relation::ALL.len());
        Self { batches }
    }

    pub fn get(&self, relation: Relation) -> &RecordBatch {
        &self.batches[relation as usize]
    }

    pub fn num_rows(&self, relation: Relation) -> usize {
        self.get(relation).num_rows()
    }

    pub fn region(&self) -> Result<RegionColumns<'_>> {
        RegionColumns::new(self.get(Relation::Region))
    }

    pub fn nation(&self) -> Result<NationColumns<'_>> {
        NationColumns::new(self.get(Relation::Nation))
    }

    pub fn customer(&self) -> Result<CustomerColumns<'_>> {
        CustomerColumns::new(self.get(Relation::Customer))
    }

    pub fn supplier(&self) -> Result<SupplierColumns<'_>> {
        SupplierColumns::new(self.get(Relation::Supplier))
    }
}

pub struct RegionColumns<'a> {
    pub region_key: &'a Int64Array,
    pub name: &'a StringArray,
}

impl<'a> RegionColumns<'a> {
    pub fn new(batch: &'a RecordBatch) -> Result<Self> {
        Ok(Self {
            region_key: column(batch, "r_regionkey")?,
            name: column(batch, "r_name")?,
        })
    }
}

pub struct NationColumns<'a> {
    pub nation_key: &'a Int64Array,
    pub name: &'a StringArray,
    pub region_key: &'a Int64Array,
}

impl<'a> NationColumns<'a> {
    pub fn new(batch: &'a RecordBatch) -> Result<Self> {
        Ok(Self {
            nation_key: column(batch, "n_nationkey")?,
            name: column(batch, "n_name")?,
            region_key: column(batch, "n_regionkey")?,
        })
    }
}

pub struct CustomerColumns<'a> {
    pub cust_key: &'a Int64Array,
    pub nation_key: &'a Int64Array,
}

impl<'a> CustomerColumns<'a> {
    pub fn new(batch: &'a RecordBatch) -> Result<Self> {
        Ok(Self {
            cust_key: column(batch, "c_custkey")?,
            nation_key: column(batch, "c_nationkey")?,
        })
    }
}

pub struct SupplierColumns<'a> {
    pub supp_key: &'a Int64Array,
    pub nation_key: &'a Int64Array,
}

impl<'a> SupplierColumns<'a> {
    pub fn new(batch: &'a RecordBatch) -> Result<Self> {
        Ok(Self {
            supp_key: column(batch, "s_suppkey")?,
            nation_key: column(batch, "s_nationkey")?,
        })
    }
}

pub struct OrderColumns<'a> {
    pub order_key: &'a Int64Array,
    pub cust_key: &'a Int64Array,
    pub order_date: &'a Date32Array,
}

impl<'a> OrderColumns<'a> {
    pub fn new(batch: &'a RecordBatch) -> Result<Self> {
        Ok(Self {
            order_key: column(batch, "o_orderkey")?,
            cust_key: column(batch, "o_custkey")?,
            order_date: column(batch, "o_orderdate")?,
        })
    }
}

/// Lineitem columns; price and discount are still text at this point
pub struct LineitemColumns<'a> {
    pub order_key: &'a Int64Array,
    pub supp_key: &'a Int64Array,
    pub extended_price: &'a StringArray,
    pub discount: &'a StringArray,
}

impl<'a> LineitemColumns<'a> {
    pub fn new(batch: &'a RecordBatch) -> Result<Self> {
        Ok(Self {
            order_key: column(batch, "l_orderkey")?,
            supp_key: column(batch, "l_suppkey")?,
            extended_price: column(batch, "l_extendedprice")?,
            discount: column(batch, "l_discount")?,
        })
    }
}
