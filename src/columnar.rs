//! Columnar (Arrow IPC stream) to row decoding.
//!
//! Column names and type names come from the embedded schema in
//! declaration order; each row becomes a map from column name to JSON value.
//!
//! 64-bit integers outside ±(2^53 - 1) are narrowed to the nearest `f64`,
//! matching what a browser host would show. Callers that need exact 64-bit
//! values must read the raw payload themselves.

use std::io::Cursor;

use arrow_array::cast::AsArray;
use arrow_array::types::{
    Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type, UInt16Type, UInt32Type,
    UInt64Type, UInt8Type,
};
use arrow_array::{Array, RecordBatch};
use arrow_cast::display::{ArrayFormatter, FormatOptions};
use arrow_ipc::reader::StreamReader;
use arrow_schema::{ArrowError, DataType};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::result::{Row, RowTable};

/// Largest integer a double represents exactly.
pub const MAX_SAFE_INTEGER: i64 = (1 << 53) - 1;

/// Result type for decoding.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Errors raised while decoding a columnar payload.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("empty columnar payload")]
    Empty,

    #[error("invalid Arrow IPC payload: {0}")]
    Ipc(#[from] ArrowError),
}

/// Decode an Arrow IPC stream into a row table.
pub fn decode(payload: &[u8]) -> DecodeResult<RowTable> {
    if payload.is_empty() {
        return Err(DecodeError::Empty);
    }

    let reader = StreamReader::try_new(Cursor::new(payload), None)?;
    let schema = reader.schema();

    let columns: Vec<String> = schema.fields().iter().map(|f| f.name().clone()).collect();
    let types: Vec<String> = schema
        .fields()
        .iter()
        .map(|f| f.data_type().to_string())
        .collect();

    let mut rows = Vec::new();
    for batch in reader {
        append_rows(&batch?, &columns, &mut rows)?;
    }

    debug!(columns = columns.len(), rows = rows.len(), "decoded columnar payload");
    Ok(RowTable {
        columns,
        types,
        rows,
    })
}

fn append_rows(batch: &RecordBatch, columns: &[String], rows: &mut Vec<Row>) -> DecodeResult<()> {
    let options = FormatOptions::default();
    let formatters = batch
        .columns()
        .iter()
        .map(|array| ArrayFormatter::try_new(array.as_ref(), &options))
        .collect::<Result<Vec<_>, _>>()?;

    rows.reserve(batch.num_rows());
    for index in 0..batch.num_rows() {
        let mut row = Row::new();
        for ((name, array), formatter) in columns.iter().zip(batch.columns()).zip(&formatters) {
            row.insert(name.clone(), cell(array.as_ref(), formatter, index));
        }
        rows.push(row);
    }
    Ok(())
}

/// JSON value of one cell. Types without a natural JSON form (dates,
/// timestamps, decimals, nested) use Arrow's display formatting.
fn cell(array: &dyn Array, formatter: &ArrayFormatter<'_>, index: usize) -> Value {
    if array.is_null(index) {
        return Value::Null;
    }

    match array.data_type() {
        DataType::Boolean => Value::Bool(array.as_boolean().value(index)),
        DataType::Int8 => array.as_primitive::<Int8Type>().value(index).into(),
        DataType::Int16 => array.as_primitive::<Int16Type>().value(index).into(),
        DataType::Int32 => array.as_primitive::<Int32Type>().value(index).into(),
        DataType::Int64 => narrow_i64(array.as_primitive::<Int64Type>().value(index)),
        DataType::UInt8 => array.as_primitive::<UInt8Type>().value(index).into(),
        DataType::UInt16 => array.as_primitive::<UInt16Type>().value(index).into(),
        DataType::UInt32 => array.as_primitive::<UInt32Type>().value(index).into(),
        DataType::UInt64 => narrow_u64(array.as_primitive::<UInt64Type>().value(index)),
        DataType::Float32 => Value::from(array.as_primitive::<Float32Type>().value(index) as f64),
        DataType::Float64 => Value::from(array.as_primitive::<Float64Type>().value(index)),
        DataType::Utf8 => Value::String(array.as_string::<i32>().value(index).to_string()),
        DataType::LargeUtf8 => Value::String(array.as_string::<i64>().value(index).to_string()),
        _ => Value::String(formatter.value(index).to_string()),
    }
}

// TODO: expose an opt-in exact mode that keeps out-of-range 64-bit integers as strings.
fn narrow_i64(value: i64) -> Value {
    if (-MAX_SAFE_INTEGER..=MAX_SAFE_INTEGER).contains(&value) {
        Value::from(value)
    } else {
        Value::from(value as f64)
    }
}

fn narrow_u64(value: u64) -> Value {
    if value <= MAX_SAFE_INTEGER as u64 {
        Value::from(value)
    } else {
        Value::from(value as f64)
    }
}
