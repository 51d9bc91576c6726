//! Parquet source tables.
//!
//! Reads a Parquet file through the Arrow reader and converts the requested
//! columns into a [`Table`]. Columns missing from the file schema are a
//! schema error; anything else that goes wrong while opening or decoding the
//! file is reported as a load error naming the file.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow_array::cast::AsArray;
use arrow_array::types::{
    Float64Type, Int16Type, Int32Type, Int64Type, Int8Type, UInt16Type, UInt32Type, UInt64Type,
    UInt8Type,
};
use arrow_array::{Array, ArrowPrimitiveType, RecordBatch};
use arrow_cast::display::{ArrayFormatter, FormatOptions};
use arrow_schema::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ProjectionMask;
use tracing::{debug, info};

use crate::error::{ExportError, Result};
use crate::table::{Cell, Table};

/// Load `columns` of the Parquet file at `path` into a table named `name`.
///
/// The returned table has exactly `columns`, in the requested order.
pub fn read_parquet_table(path: &Path, name: &str, columns: &[&str]) -> Result<Table> {
    match read_parquet_inner(path, name, columns) {
        Ok(table) => {
            info!(table = name, rows = table.num_rows(), path = %path.display(), "Loaded source table");
            Ok(table)
        }
        Err(e @ ExportError::MissingColumn { .. }) => Err(e),
        Err(e) => Err(ExportError::load(path, e)),
    }
}

fn read_parquet_inner(path: &Path, name: &str, columns: &[&str]) -> Result<Table> {
    let file = File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;

    let schema = Arc::clone(builder.schema());
    let mut roots = Vec::with_capacity(columns.len());
    for column in columns {
        let idx = schema
            .index_of(column)
            .map_err(|_| ExportError::MissingColumn {
                table: name.to_string(),
                column: column.to_string(),
            })?;
        roots.push(idx);
    }
    let mask = ProjectionMask::roots(builder.parquet_schema(), roots);
    let reader = builder.with_projection(mask).build()?;

    let mut rows: Vec<Vec<Cell>> = Vec::new();
    for batch in reader {
        let batch = batch?;
        append_batch_rows(&batch, columns, &mut rows)?;
    }
    debug!(table = name, rows = rows.len(), "Decoded parquet batches");

    Table::new(name, columns.iter().map(|c| c.to_string()).collect(), rows)
}

fn append_batch_rows(batch: &RecordBatch, columns: &[&str], rows: &mut Vec<Vec<Cell>>) -> Result<()> {
    // Projected batches keep file column order, so look each column up by name.
    let mut decoded = Vec::with_capacity(columns.len());
    for column in columns {
        let idx = batch.schema().index_of(column)?;
        decoded.push(array_to_cells(batch.column(idx).as_ref())?.into_iter());
    }

    for _ in 0..batch.num_rows() {
        let row = decoded
            .iter_mut()
            .map(|col| col.next().unwrap_or(Cell::Null))
            .collect();
        rows.push(row);
    }
    Ok(())
}

fn primitive_cells<T: ArrowPrimitiveType>(
    array: &dyn Array,
    to_cell: impl Fn(T::Native) -> Cell,
) -> Vec<Cell> {
    array
        .as_primitive::<T>()
        .iter()
        .map(|v| v.map(&to_cell).unwrap_or(Cell::Null))
        .collect()
}

/// Convert one Arrow column into cells.
pub fn array_to_cells(array: &dyn Array) -> Result<Vec<Cell>> {
    let cells = match array.data_type() {
        DataType::Null => vec![Cell::Null; array.len()],
        DataType::Boolean => array
            .as_boolean()
            .iter()
            .map(|v| v.map(Cell::Bool).unwrap_or(Cell::Null))
            .collect(),
        DataType::Int8 => primitive_cells::<Int8Type>(array, |v| Cell::Int(v.into())),
        DataType::Int16 => primitive_cells::<Int16Type>(array, |v| Cell::Int(v.into())),
        DataType::Int32 => primitive_cells::<Int32Type>(array, |v| Cell::Int(v.into())),
        DataType::Int64 => primitive_cells::<Int64Type>(array, Cell::Int),
        DataType::UInt8 => primitive_cells::<UInt8Type>(array, |v| Cell::Int(v.into())),
        DataType::UInt16 => primitive_cells::<UInt16Type>(array, |v| Cell::Int(v.into())),
        DataType::UInt32 => primitive_cells::<UInt32Type>(array, |v| Cell::Int(v.into())),
        DataType::UInt64 => primitive_cells::<UInt64Type>(array, |v| match i64::try_from(v) {
            Ok(i) => Cell::Int(i),
            Err(_) => Cell::Text(v.to_string()),
        }),
        // Go through the shortest f32 text form so 0.9f32 stays 0.9, not 0.8999999761581421.
        DataType::Float32 => array
            .as_primitive::<arrow_array::types::Float32Type>()
            .iter()
            .map(|v| match v {
                Some(f) => Cell::Float(f.to_string().parse::<f64>().unwrap_or(f64::from(f))),
                None => Cell::Null,
            })
            .collect(),
        DataType::Float64 => primitive_cells::<Float64Type>(array, Cell::Float),
        DataType::Utf8 => array
            .as_string::<i32>()
            .iter()
            .map(|v| v.map(Cell::text).unwrap_or(Cell::Null))
            .collect(),
        DataType::LargeUtf8 => array
            .as_string::<i64>()
            .iter()
            .map(|v| v.map(Cell::text).unwrap_or(Cell::Null))
            .collect(),
        DataType::Utf8View => array
            .as_string_view()
            .iter()
            .map(|v| v.map(Cell::text).unwrap_or(Cell::Null))
            .collect(),
        DataType::Dictionary(_, _) => {
            let decoded = arrow_cast::cast(array, &DataType::Utf8)?;
            return array_to_cells(decoded.as_ref());
        }
        _ => {
            let formatter = ArrayFormatter::try_new(array, &FormatOptions::default())?;
            (0..array.len())
                .map(|i| {
                    if array.is_null(i) {
                        Cell::Null
                    } else {
                        Cell::Text(formatter.value(i).to_string())
                    }
                })
                .collect()
        }
    };
    Ok(cells)
}
