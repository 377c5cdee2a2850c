//! Utility functions for data processing

use arrow::array::{Array, AsArray, Float64Array, RecordBatch, StringArray};
use arrow::compute::{cast_with_options, CastOptions};
use arrow::datatypes::{DataType, Float64Type};
use chrono::NaiveDate;

use crate::error::{QueryError, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

/// Days since 1970-01-01, the Date32 representation
pub fn date_to_days(date: NaiveDate) -> i32 {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default();
    (date - epoch).num_days() as i32
}

/// Get a typed column by name
pub fn column<'a, T: Array + 'static>(batch: &'a RecordBatch, name: &'static str) -> Result<&'a T> {
    batch
        .column_by_name(name)
        .and_then(|col| col.as_any().downcast_ref::<T>())
        .ok_or(QueryError::MissingColumn(name))
}

/// Cast a decimal text column to Float64 using the Arrow cast kernel.
///
/// Unlike a safe cast, unparsable values are an error rather than nulls.
/// `row_number` maps a position in `text` to the row reported in the error,
/// so a gathered subset can point back into the full relation.
pub fn decimal_to_f64(
    text: &StringArray,
    column: &'static str,
    row_number: impl Fn(usize) -> usize,
) -> Result<Float64Array> {
    let options = CastOptions {
        safe: false,
        ..Default::default()
    };
    match cast_with_options(text, &DataType::Float64, &options) {
        Ok(cast) => Ok(cast.as_primitive::<Float64Type>().clone()),
        Err(err) => {
            // Point at the offending row if we can find it
            let bad = text
                .iter()
                .enumerate()
                .find_map(|(i, v)| v.filter(|v| v.parse::<f64>().is_err()).map(|v| (i, v)));
            match bad {
                Some((i, value)) => Err(QueryError::MalformedNumeric {
                    column,
                    row: row_number(i),
                    value: value.to_string(),
                }),
                None => Err(err.into()),
            }
        }
    }
}
