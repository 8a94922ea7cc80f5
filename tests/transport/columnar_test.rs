use std::sync::Arc;

use arrow_array::{
    ArrayRef, BooleanArray, Date32Array, Float64Array, Int32Array, Int64Array, RecordBatch,
    StringArray, UInt64Array,
};
use arrow_ipc::writer::StreamWriter;
use arrow_schema::{DataType, Field, Schema, SchemaRef};
use serde_json::{json, Value};
use sqlbench::columnar::{decode, DecodeError, MAX_SAFE_INTEGER};

fn encode(schema: &SchemaRef, batches: &[RecordBatch]) -> Vec<u8> {
    let mut buffer = Vec::new();
    {
        let mut writer = StreamWriter::try_new(&mut buffer, schema).unwrap();
        for batch in batches {
            writer.write(batch).unwrap();
        }
        writer.finish().unwrap();
    }
    buffer
}

fn single_column(name: &str, data_type: DataType, array: ArrayRef) -> Vec<u8> {
    let schema = Arc::new(Schema::new(vec![Field::new(name, data_type, true)]));
    let batch = RecordBatch::try_new(schema.clone(), vec![array]).unwrap();
    encode(&schema, &[batch])
}

#[test]
fn test_columns_follow_schema_order() {
    let schema = Arc::new(Schema::new(vec![
        Field::new("z_last", DataType::Int32, false),
        Field::new("a_first", DataType::Utf8, false),
        Field::new("m_middle", DataType::Float64, false),
    ]));
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int32Array::from(vec![7])),
            Arc::new(StringArray::from(vec!["x"])),
            Arc::new(Float64Array::from(vec![1.5])),
        ],
    )
    .unwrap();

    let table = decode(&encode(&schema, &[batch])).unwrap();
    assert_eq!(table.columns, vec!["z_last", "a_first", "m_middle"]);
    assert_eq!(table.types, vec!["Int32", "Utf8", "Float64"]);
    assert_eq!(table.rows[0]["z_last"], json!(7));
    assert_eq!(table.rows[0]["m_middle"], json!(1.5));
}

#[test]
fn test_rows_from_every_batch() {
    let schema = Arc::new(Schema::new(vec![Field::new("n", DataType::Int64, false)]));
    let first = RecordBatch::try_new(schema.clone(), vec![Arc::new(Int64Array::from(vec![1, 2]))])
        .unwrap();
    let second =
        RecordBatch::try_new(schema.clone(), vec![Arc::new(Int64Array::from(vec![3]))]).unwrap();

    let table = decode(&encode(&schema, &[first, second])).unwrap();
    let values: Vec<_> = table.rows.iter().map(|row| row["n"].clone()).collect();
    assert_eq!(values, vec![json!(1), json!(2), json!(3)]);
}

#[test]
fn test_schema_without_batches() {
    let schema = Arc::new(Schema::new(vec![Field::new("n", DataType::Int64, false)]));
    let table = decode(&encode(&schema, &[])).unwrap();
    assert_eq!(table.columns, vec!["n"]);
    assert_eq!(table.num_rows(), 0);
}

#[test]
fn test_nulls_and_booleans() {
    let payload = single_column(
        "flag",
        DataType::Boolean,
        Arc::new(BooleanArray::from(vec![Some(true), None, Some(false)])),
    );
    let table = decode(&payload).unwrap();
    assert_eq!(table.rows[0]["flag"], json!(true));
    assert_eq!(table.rows[1]["flag"], Value::Null);
    assert_eq!(table.rows[2]["flag"], json!(false));
}

#[test]
fn test_dates_render_as_text() {
    // 19723 days after the epoch is 2024-01-01.
    let payload = single_column(
        "day",
        DataType::Date32,
        Arc::new(Date32Array::from(vec![19723])),
    );
    let table = decode(&payload).unwrap();
    assert_eq!(table.types, vec!["Date32"]);
    assert_eq!(table.rows[0]["day"], json!("2024-01-01"));
}

#[test]
fn test_large_integers_are_narrowed() {
    let payload = single_column(
        "big",
        DataType::Int64,
        Arc::new(Int64Array::from(vec![MAX_SAFE_INTEGER, MAX_SAFE_INTEGER + 2, i64::MIN])),
    );
    let table = decode(&payload).unwrap();
    assert_eq!(table.rows[0]["big"], json!(MAX_SAFE_INTEGER));
    assert!(table.rows[1]["big"].is_f64());
    assert_eq!(table.rows[2]["big"], json!(i64::MIN as f64));
}

#[test]
fn test_large_unsigned_integers_are_narrowed() {
    let payload = single_column(
        "big",
        DataType::UInt64,
        Arc::new(UInt64Array::from(vec![5, u64::MAX])),
    );
    let table = decode(&payload).unwrap();
    assert_eq!(table.rows[0]["big"], json!(5));
    assert_eq!(table.rows[1]["big"], json!(u64::MAX as f64));
}

#[test]
fn test_invalid_payloads() {
    assert!(matches!(decode(&[]), Err(DecodeError::Empty)));
    assert!(matches!(
        decode(&[0xff, 0xff, 0xff, 0xff, 0x00]),
        Err(DecodeError::Ipc(_))
    ));
}
