//! Vectorized revenue evaluation using Arrow arithmetic kernels

use arrow::array::{AsArray, Float64Array, UInt64Array};
use arrow::compute::kernels::numeric;
use arrow::datatypes::Float64Type;
use arrow_select::take::take;

use crate::error::Result;
use crate::tables::LineitemColumns;
use crate::utils::decimal_to_f64;

/// l_extendedprice * (1 - l_discount)
pub fn revenue(price: &Float64Array, discount: &Float64Array) -> Result<Float64Array> {
    let ones = Float64Array::from(vec![1.0f64; discount.len()]);

    let one_minus_discount = numeric::sub(&ones, discount)?;
    let revenue = numeric::mul(price, &one_minus_discount)?;

    Ok(revenue.as_primitive::<Float64Type>().clone())
}

/// Parse price and discount for the chunk rows in `rows` and evaluate their
/// revenue, in `rows` order. Only those rows are parsed. `row_offset` is where
/// the chunk starts in the full relation.
pub fn evaluate_revenue(lineitem: &LineitemColumns<'_>, rows: &UInt64Array, row_offset: usize) -> Result<Float64Array> {
    let row_number = |i: usize| row_offset + rows.value(i) as usize;

    let price = take(lineitem.extended_price, rows, None)?;
    let price = decimal_to_f64(price.as_string::<i32>(), "l_extendedprice", row_number)?;
    let discount = take(lineitem.discount, rows, None)?;
    let discount = decimal_to_f64(discount.as_string::<i32>(), "l_discount", row_number)?;
    revenue(&price, &discount)
}
