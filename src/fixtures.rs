//! Small synthetic TPC-H datasets for unit tests

use std::io::Cursor;
use std::path::PathBuf;

use crate::reader::read_tables_with;
use crate::schema::Relation;
use crate::tables::Tables;

#[derive(Debug, Clone, Default)]
pub struct Dataset {
    region: String,
    nation: String,
    customer: String,
    supplier: String,
    orders: String,
    lineitem: String,
}

impl Dataset {
    pub fn region(mut self, key: i64, name: &str) -> Self {
        self.region.push_str(&format!("{key}|{name}|region comment|\n"));
        self
    }

    pub fn nation(mut self, key: i64, name: &str, region: i64) -> Self {
        self.nation.push_str(&format!("{key}|{name}|{region}|nation comment|\n"));
        self
    }

    pub fn customer(mut self, key: i64, nation: i64) -> Self {
        self.customer.push_str(&format!("{key}|Customer#{key}|addr|{nation}|10-000-000-0000|0.00|BUILDING|comment|\n"));
        self
    }

    pub fn supplier(mut self, key: i64, nation: i64) -> Self {
        self.supplier.push_str(&format!("{key}|Supplier#{key}|addr|{nation}|10-000-000-0000|0.00|comment|\n"));
        self
    }

    pub fn order(mut self, key: i64, customer: i64, date: &str) -> Self {
        self.orders.push_str(&format!("{key}|{customer}|O|0.00|{date}|1-URGENT|Clerk#1|0|comment|\n"));
        self
    }

    pub fn lineitem(mut self, order: i64, supplier: i64, price: &str, discount: &str) -> Self {
        self.lineitem.push_str(&format!("{order}|1|{supplier}|1|1|{price}|{discount}|0.00|N|O|1996-01-01|1996-01-01|1996-01-01|NONE|AIR|comment|\n"));
        self
    }

    pub fn text(&self, relation: Relation) -> &str {
        match relation {
            Relation::Customer => &self.customer,
            Relation::Orders => &self.orders,
            Relation::Lineitem => &self.lineitem,
            Relation::Supplier => &self.supplier,
            Relation::Nation => &self.nation,
            Relation::Region => &self.region,
        }
    }

    pub fn tables(&self) -> Tables {
        read_tables_with(|relation| {
            let input = Cursor::new(self.text(relation).as_bytes().to_vec());
            Ok((input, PathBuf::from(relation.file_name())))
        })
        .expect("fixture tables load")
    }
}

/// Two ASIA nations and one EUROPE nation with a handful of trades.
///
/// Expected 1994 revenue for ASIA: INDIA 95 + 50 = 145, JAPAN 180.
pub fn asia_trades() -> Dataset {
    Dataset::default()
        .region(0, "EUROPE")
        .region(2, "ASIA")
        .nation(7, "GERMANY", 0)
        .nation(8, "INDIA", 2)
        .nation(12, "JAPAN", 2)
        .customer(1, 8)
        .customer(2, 12)
        .customer(3, 7)
        .supplier(10, 8)
        .supplier(20, 12)
        .supplier(30, 7)
        .order(100, 1, "1994-01-01")
        .order(101, 2, "1994-06-15")
        .order(102, 3, "1994-06-15")
        .order(103, 1, "1995-01-01")
        .order(104, 1, "1993-12-31")
        .lineitem(100, 10, "100.00", "0.05")
        .lineitem(100, 10, "50.00", "0.00")
        // JAPAN supplier for an INDIA customer
        .lineitem(100, 20, "1000.00", "0.10")
        .lineitem(101, 20, "200.00", "0.10")
        // EUROPE
        .lineitem(102, 30, "999.00", "0.00")
        // out of the date range
        .lineitem(103, 10, "500.00", "0.00")
        .lineitem(104, 10, "500.00", "0.00")
}
