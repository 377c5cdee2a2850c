//! Fixed relation schemas for TPC-H Q5
//!
//! Every `.tbl` file is read against its full TPC-H column list (that decides
//! how wide a record must be), but only the projected columns below are
//! materialized.

use std::sync::Arc;

use arrow_schema::{DataType, Field, Schema, SchemaRef};

/// How a projected column is typed in memory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Integer key, parsed at load
    Key,
    /// `YYYY-MM-DD`, stored as days since epoch
    Date,
    /// Free text
    Text,
    /// Decimal kept as text until the aggregation stage casts it
    Decimal,
}

impl ColumnKind {
    pub fn data_type(self) -> DataType {
        match self {
            ColumnKind::Key => DataType::Int64,
            ColumnKind::Date => DataType::Date32,
            ColumnKind::Text | ColumnKind::Decimal => DataType::Utf8,
        }
    }
}

/// A column the query needs, with its position in the on-disk record
#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub index: usize,
    pub kind: ColumnKind,
}

const fn col(name: &'static str, index: usize, kind: ColumnKind) -> ColumnSpec {
    ColumnSpec { name, index, kind }
}

const CUSTOMER_PROJECTION: &[ColumnSpec] = &[
    col("c_custkey", 0, ColumnKind::Key),
    col("c_nationkey", 3, ColumnKind::Key),
];

const ORDERS_PROJECTION: &[ColumnSpec] = &[
    col("o_orderkey", 0, ColumnKind::Key),
    col("o_custkey", 1, ColumnKind::Key),
    col("o_orderdate", 4, ColumnKind::Date),
];

const LINEITEM_PROJECTION: &[ColumnSpec] = &[
    col("l_orderkey", 0, ColumnKind::Key),
    col("l_suppkey", 2, ColumnKind::Key),
    col("l_extendedprice", 5, ColumnKind::Decimal),
    col("l_discount", 6, ColumnKind::Decimal),
];

const SUPPLIER_PROJECTION: &[ColumnSpec] = &[
    col("s_suppkey", 0, ColumnKind::Key),
    col("s_nationkey", 3, ColumnKind::Key),
];

const NATION_PROJECTION: &[ColumnSpec] = &[
    col("n_nationkey", 0, ColumnKind::Key),
    col("n_name", 1, ColumnKind::Text),
    col("n_regionkey", 2, ColumnKind::Key),
];

const REGION_PROJECTION: &[ColumnSpec] = &[col("r_regionkey", 0, ColumnKind::Key), col("r_name", 1, ColumnKind::Text)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    Customer,
    Orders,
    Lineitem,
    Supplier,
    Nation,
    Region,
}

impl Relation {
    /// Canonical order; load failures are reported in this order
    pub const ALL: [Relation; 6] = [
        Relation::Customer,
        Relation::Orders,
        Relation::Lineitem,
        Relation::Supplier,
        Relation::Nation,
        Relation::Region,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Relation::Customer => "customer",
            Relation::Orders => "orders",
            Relation::Lineitem => "lineitem",
            Relation::Supplier => "supplier",
            Relation::Nation => "nation",
            Relation::Region => "region",
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            Relation::Customer => "customer.tbl",
            Relation::Orders => "orders.tbl",
            Relation::Lineitem => "lineitem.tbl",
            Relation::Supplier => "supplier.tbl",
            Relation::Nation => "nation.tbl",
            Relation::Region => "region.tbl",
        }
    }

    /// Full on-disk column list
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            Relation::Customer => &[
                "c_custkey",
                "c_name",
                "c_address",
                "c_nationkey",
                "c_phone",
                "c_acctbal",
                "c_mktsegment",
                "c_comment",
            ],
            Relation::Orders => &[
                "o_orderkey",
                "o_custkey",
                "o_orderstatus",
                "o_totalprice",
                "o_orderdate",
                "o_orderpriority",
                "o_clerk",
                "o_shippriority",
                "o_comment",
            ],
            Relation::Lineitem => &[
                "l_orderkey",
                "l_partkey",
                "l_suppkey",
                "l_linenumber",
                "l_quantity",
                "l_extendedprice",
                "l_discount",
                "l_tax",
                "l_returnflag",
                "l_linestatus",
                "l_shipdate",
                "l_commitdate",
                "l_receiptdate",
                "l_shipinstruct",
                "l_shipmode",
                "l_comment",
            ],
            Relation::Supplier => &[
                "s_suppkey",
                "s_name",
                "s_address",
                "s_nationkey",
                "s_phone",
                "s_acctbal",
                "s_comment",
            ],
            Relation::Nation => &["n_nationkey", "n_name", "n_regionkey", "n_comment"],
            Relation::Region => &["r_regionkey", "r_name", "r_comment"],
        }
    }

    /// Columns materialized for Q5
    pub fn projection(self) -> &'static [ColumnSpec] {
        match self {
            Relation::Customer => CUSTOMER_PROJECTION,
            Relation::Orders => ORDERS_PROJECTION,
            Relation::Lineitem => LINEITEM_PROJECTION,
            Relation::Supplier => SUPPLIER_PROJECTION,
            Relation::Nation => NATION_PROJECTION,
            Relation::Region => REGION_PROJECTION,
        }
    }

    pub fn arrow_schema(self) -> SchemaRef {
        let fields: Vec<Field> = self
            .projection()
            .iter()
            .map(|c| Field::new(c.name, c.kind.data_type(), false))
            .collect();
        Arc::new(Schema::new(fields))
    }
}

impl std::fmt::Display for Relation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
