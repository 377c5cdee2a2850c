//! Pipe-delimited `.tbl` reader with column projection
//!
//! Each relation is read into a single Arrow record batch holding only the
//! projected Q5 columns. Records shorter than the relation's full column list
//! are skipped; extra trailing fields are ignored. A record whose key or date
//! does not parse can never take part in a join, so it is skipped too.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use arrow::array::{ArrayRef, Date32Builder, Int64Builder, RecordBatch, StringBuilder};
use tracing::{debug, error, info, warn};

use crate::error::{QueryError, Result};
use crate::schema::{ColumnKind, ColumnSpec, Relation};
use crate::tables::Tables;
use crate::utils::{date_to_days, parse_date};

/// Widest record in the schema (lineitem)
const MAX_WIDTH: usize = 16;

/// Most projected columns of any relation (lineitem)
const MAX_PROJECTED: usize = 4;

const READ_BUFFER_BYTES: usize = 1 << 20;

/// A projected field after typing
#[derive(Clone, Copy)]
enum Value<'a> {
    Key(i64),
    Date(i32),
    Text(&'a str),
}

impl<'a> Value<'a> {
    fn parse(kind: ColumnKind, field: &'a str) -> Option<Self> {
        match kind {
            ColumnKind::Key => field.parse().ok().map(Value::Key),
            ColumnKind::Date => parse_date(field).map(|date| Value::Date(date_to_days(date))),
            ColumnKind::Text | ColumnKind::Decimal => Some(Value::Text(field)),
        }
    }
}

enum ColumnBuilder {
    Key(Int64Builder),
    Date(Date32Builder),
    Text(StringBuilder),
}

impl ColumnBuilder {
    fn new(kind: ColumnKind) -> Self {
        match kind {
            ColumnKind::Key => ColumnBuilder::Key(Int64Builder::new()),
            ColumnKind::Date => ColumnBuilder::Date(Date32Builder::new()),
            ColumnKind::Text | ColumnKind::Decimal => ColumnBuilder::Text(StringBuilder::new()),
        }
    }

    fn append(&mut self, value: Value<'_>) {
        match (self, value) {
            (ColumnBuilder::Key(b), Value::Key(key)) => b.append_value(key),
            (ColumnBuilder::Date(b), Value::Date(days)) => b.append_value(days),
            (ColumnBuilder::Text(b), Value::Text(text)) => b.append_value(text),
            // builders and values are both derived from the same ColumnKind
            _ => unreachable!("value does not match its column builder"),
        }
    }

    fn finish(self) -> ArrayRef {
        match self {
            ColumnBuilder::Key(mut b) => Arc::new(b.finish()),
            ColumnBuilder::Date(mut b) => Arc::new(b.finish()),
            ColumnBuilder::Text(mut b) => Arc::new(b.finish()),
        }
    }
}

/// Read one relation from `input`. `source` is only used in error messages.
pub fn read_relation<R: BufRead>(relation: Relation, mut input: R, source: &Path) -> Result<RecordBatch> {
    let width = relation.columns().len();
    let projection: &[ColumnSpec] = relation.projection();
    let mut builders: Vec<ColumnBuilder> = projection.iter().map(|c| ColumnBuilder::new(c.kind)).collect();

    let mut line = String::new();
    let mut line_no = 0usize;
    let mut rows = 0usize;
    let mut skipped = 0usize;
    let mut malformed = 0usize;

    loop {
        line.clear();
        let read = input.read_line(&mut line).map_err(|source_err| QueryError::Read {
            path: source.to_path_buf(),
            source: source_err,
        })?;
        if read == 0 {
            break;
        }
        line_no += 1;

        let record = line.trim_end_matches(['\n', '\r']);
        if record.is_empty() {
            continue;
        }
        // The `|` after the last field terminates the record, it does not open a new one
        let record = record.strip_suffix('|').unwrap_or(record);

        let mut fields = [""; MAX_WIDTH];
        let mut count = 0;
        for (slot, field) in fields[..width].iter_mut().zip(record.split('|')) {
            *slot = field;
            count += 1;
        }
        if count < width {
            skipped += 1;
            continue;
        }

        let mut values = [Value::Text(""); MAX_PROJECTED];
        let mut untyped = None;
        for (spec, slot) in projection.iter().zip(values.iter_mut()) {
            match Value::parse(spec.kind, fields[spec.index]) {
                Some(value) => *slot = value,
                None => {
                    untyped = Some(spec);
                    break;
                }
            }
        }
        if let Some(spec) = untyped {
            debug!(%relation, line = line_no, column = spec.name, value = fields[spec.index], "skipped untyped record");
            malformed += 1;
            continue;
        }

        for (builder, value) in builders.iter_mut().zip(values) {
            builder.append(value);
        }
        rows += 1;
    }

    if skipped > 0 {
        debug!(%relation, skipped, "skipped short records");
    }
    if malformed > 0 {
        warn!(%relation, malformed, "skipped records with a malformed key or date");
    }
    info!(%relation, rows, skipped, malformed, "loaded relation");

    let columns = builders.into_iter().map(ColumnBuilder::finish).collect();
    Ok(RecordBatch::try_new(relation.arrow_schema(), columns)?)
}

/// Load all six relations from `<dir>/<relation>.tbl`
pub fn load_tables(dir: &Path) -> Result<Tables> {
    read_tables_with(|relation| {
        let path = dir.join(relation.file_name());
        let file = File::open(&path).map_err(|source| QueryError::Open {
            path: path.clone(),
            source,
        })?;
        Ok((BufReader::with_capacity(READ_BUFFER_BYTES, file), path))
    })
}

/// Load all six relations, one thread per relation.
///
/// `open` returns the reader for a relation plus a path used in messages.
/// Every load runs to completion before a failure is reported; the first
/// failure in `Relation::ALL` order wins.
pub fn read_tables_with<F, R>(open: F) -> Result<Tables>
where
    F: Fn(Relation) -> Result<(R, PathBuf)> + Sync,
    R: BufRead,
{
    let open = &open;
    let results: Vec<(Relation, Result<RecordBatch>)> = thread::scope(|scope| {
        let handles: Vec<_> = Relation::ALL
            .iter()
            .map(|&relation| {
                let handle = scope.spawn(move || {
                    let (input, path) = open(relation)?;
                    read_relation(relation, input, &path)
                });
                (relation, handle)
            })
            .collect();

        handles
            .into_iter()
            .map(|(relation, handle)| {
                let result = handle
                    .join()
                    .unwrap_or_else(|_| Err(QueryError::WorkerPanicked { stage: "load" }));
                (relation, result)
            })
            .collect()
    });

    let mut batches = Vec::with_capacity(Relation::ALL.len());
    let mut first_error = None;
    for (relation, result) in results {
        match result {
            Ok(batch) => batches.push(batch),
            Err(err) => {
                error!(%relation, error = %err, "failed to load relation");
                first_error.get_or_insert(err);
            }
        }
    }

    match first_error {
        Some(err) => Err(err),
        None => Ok(Tables::from_batches(batches)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Array, Date32Array, Int64Array, StringArray};
    use std::io::Cursor;

    fn read(relation: Relation, text: &str) -> Result<RecordBatch> {
        read_relation(relation, Cursor::new(text.as_bytes()), Path::new(relation.file_name()))
    }

    #[test]
    fn test_reads_projected_columns() {
        let batch = read(
            Relation::Nation,
            "0|ALGERIA|0| haggle. carefully final deposits|\n8|INDIA|2|ss excuses cajole|\n",
        )
        .unwrap();
        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.num_columns(), 3);

        let names = batch.column(1).as_any().downcast_ref::<StringArray>().unwrap();
        assert_eq!(names.value(1), "INDIA");
        let regions = batch.column(2).as_any().downcast_ref::<Int64Array>().unwrap();
        assert_eq!(regions.value(1), 2);
    }

    #[test]
    fn test_short_records_are_skipped() {
        // second line is one field short once the terminator is stripped
        let batch = read(Relation::Region, "2|ASIA|comment|\n3|EUROPE|\n4|MIDDLE EAST|x\n").unwrap();
        assert_eq!(batch.num_rows(), 2);
        let keys = batch.column(0).as_any().downcast_ref::<Int64Array>().unwrap();
        assert_eq!(keys.values().to_vec(), vec![2, 4]);
    }

    #[test]
    fn test_extra_fields_and_blank_lines_ignored() {
        let batch = read(Relation::Region, "\n1|AMERICA|c|extra|more|\r\n\n").unwrap();
        assert_eq!(batch.num_rows(), 1);
        let names = batch.column(1).as_any().downcast_ref::<StringArray>().unwrap();
        assert_eq!(names.value(0), "AMERICA");
    }

    #[test]
    fn test_order_date_is_date32() {
        let batch = read(Relation::Orders, "1|37|O|131251.81|1996-01-02|5-LOW|Clerk#1|0|nstructions|\n").unwrap();
        let dates = batch.column(2).as_any().downcast_ref::<Date32Array>().unwrap();
        assert_eq!(dates.value(0), date_to_days(parse_date("1996-01-02").unwrap()));
    }

    #[test]
    fn test_prices_stay_text_until_aggregation() {
        // a bad price loads fine; the aggregation stage rejects it
        let batch = read(
            Relation::Lineitem,
            "1|155|7|1|17|oops|0.04|0.02|N|O|1996-03-13|1996-02-12|1996-03-22|DELIVER IN PERSON|TRUCK|egular|\n",
        )
        .unwrap();
        assert_eq!(batch.num_rows(), 1);
    }

    #[test]
    fn test_untyped_records_are_skipped() {
        let batch = read(Relation::Customer, "1|a|b|3|p|0|s|c|\nX|a|b|3|p|0|s|c|\n2|a|b|N/A|p|0|s|c|\n4|a|b|5|p|0|s|c|\n")
            .unwrap();
        assert_eq!(batch.num_rows(), 2);
        let keys = batch.column(0).as_any().downcast_ref::<Int64Array>().unwrap();
        let nations = batch.column(1).as_any().downcast_ref::<Int64Array>().unwrap();
        assert_eq!(keys.values().to_vec(), vec![1, 4]);
        assert_eq!(nations.values().to_vec(), vec![3, 5]);
    }

    #[test]
    fn test_order_with_bad_date_is_skipped() {
        let batch = read(
            Relation::Orders,
            "ORD-9|3|O|1.00|1994-02-01|5-LOW|Clerk#1|0|c|\n2|3|O|1.00|1994/02/01|5-LOW|Clerk#1|0|c|\n3|3|O|1.00|1994-02-01|5-LOW|Clerk#1|0|c|\n",
        )
        .unwrap();
        assert_eq!(batch.num_rows(), 1);
        let keys = batch.column(0).as_any().downcast_ref::<Int64Array>().unwrap();
        assert_eq!(keys.value(0), 3);
    }

    #[test]
    fn test_missing_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("region.tbl"), "0|AFRICA|c|\n").unwrap();

        let err = load_tables(dir.path()).unwrap_err();
        match err {
            QueryError::Open { path, .. } => assert!(path.ends_with("customer.tbl")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
