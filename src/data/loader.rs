use std::path::Path;
use std::sync::Arc;

use arrow::array::{Array, AsArray, StringArray};
use arrow::datatypes::DataType;
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{DatasetSchema, Field, ReviewRecord, ReviewTable, SharedTable};
use crate::error::{DashboardError, Result};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a review dataset using the default column names and vocabularies.
pub fn load(path: &Path) -> Result<ReviewTable> {
    load_with_schema(path, &DatasetSchema::default())
}

/// Load a review dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – comma separated, header row
/// * `.tsv`     – tab separated, header row
/// * `.json`    – `[{ "ulasan": "...", "rumah_sakit": "...", ... }, ...]`
/// * `.parquet` – one column per field
pub fn load_with_schema(path: &Path, schema: &DatasetSchema) -> Result<ReviewTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let records = match ext.as_str() {
        "csv" => load_delimited(path, schema, b',')?,
        "tsv" => load_delimited(path, schema, b'\t')?,
        "json" => load_json(path, schema)?,
        "parquet" | "pq" => load_parquet(path, schema)?,
        other => {
            return Err(DashboardError::Parse(format!(
                "unsupported file extension: .{other}"
            )))
        }
    };

    let table = ReviewTable::new(records, schema.clone())?.with_source(path.to_path_buf());
    log::info!(
        "Loaded {} reviews from {} ({} hospitals)",
        table.len(),
        path.display(),
        table.distinct_values(Field::Hospital).len()
    );
    Ok(table)
}

/// Rebuild a shared table from its source file. The old table is untouched,
/// so readers holding it never observe a half-updated state.
pub fn reload(table: &ReviewTable) -> Result<SharedTable> {
    let source = table
        .source()
        .ok_or_else(|| DashboardError::Parse("table has no source file to reload".into()))?;
    Ok(Arc::new(load_with_schema(source, table.schema())?))
}

// ---------------------------------------------------------------------------
// Header resolution
// ---------------------------------------------------------------------------

/// Map each field to its index in `headers`. Required fields must be present.
fn resolve_columns(headers: &[String], schema: &DatasetSchema) -> Result<Vec<(Field, usize)>> {
    let mut resolved = Vec::with_capacity(Field::ALL.len());
    for field in Field::ALL {
        let name = schema.columns.name_of(field);
        match headers.iter().position(|h| h == name) {
            Some(idx) => resolved.push((field, idx)),
            None if Field::REQUIRED.contains(&field) => {
                return Err(DashboardError::MissingColumn(name.to_string()))
            }
            None => log::debug!("Optional column '{name}' absent, using raw text"),
        }
    }
    Ok(resolved)
}

// ---------------------------------------------------------------------------
// Delimited text loader
// ---------------------------------------------------------------------------

fn load_delimited(path: &Path, schema: &DatasetSchema, delimiter: u8) -> Result<Vec<ReviewRecord>> {
    let file = std::fs::File::open(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .from_reader(file);
    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| DashboardError::Parse(format!("reading header: {e}")))?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    let columns = resolve_columns(&headers, schema)?;

    let mut records = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let row = result.map_err(|e| DashboardError::Parse(format!("row {row_no}: {e}")))?;
        records.push(ReviewRecord::from_cells(
            columns
                .iter()
                .map(|&(field, idx)| (field, row.get(idx).unwrap_or(""))),
        ));
    }
    Ok(records)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the default `df.to_json(orient='records')`.
fn load_json(path: &Path, schema: &DatasetSchema) -> Result<Vec<ReviewRecord>> {
    let text = std::fs::read_to_string(path)?;
    let root: JsonValue = serde_json::from_str(&text)
        .map_err(|e| DashboardError::Parse(format!("parsing JSON: {e}")))?;
    let rows = root
        .as_array()
        .ok_or_else(|| DashboardError::Parse("expected top-level JSON array".into()))?;

    // Header = keys of the first object; an empty array has no header to check.
    let headers: Vec<String> = match rows.first() {
        Some(JsonValue::Object(obj)) => obj.keys().cloned().collect(),
        Some(_) => return Err(DashboardError::Parse("row 0 is not a JSON object".into())),
        None => Vec::new(),
    };
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let columns = resolve_columns(&headers, schema)?;

    let mut records = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let obj = row
            .as_object()
            .ok_or_else(|| DashboardError::Parse(format!("row {i} is not a JSON object")))?;
        // Every row must carry the keys resolved from row 0; `null` reads as "".
        let cells = columns
            .iter()
            .map(|&(field, idx)| match obj.get(&headers[idx]) {
                Some(value) => Ok((field, json_to_text(value))),
                None => Err(DashboardError::Parse(format!(
                    "row {i}: missing key '{}'",
                    headers[idx]
                ))),
            })
            .collect::<Result<Vec<_>>>()?;
        records.push(ReviewRecord::from_cells(
            cells.iter().map(|(f, v)| (*f, v.as_str())),
        ));
    }
    Ok(records)
}

fn json_to_text(val: &JsonValue) -> String {
    match val {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path, schema: &DatasetSchema) -> Result<Vec<ReviewRecord>> {
    let file = std::fs::File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(|e| DashboardError::Parse(format!("reading parquet metadata: {e}")))?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let columns = resolve_columns(&headers, schema)?;
    let reader = builder
        .build()
        .map_err(|e| DashboardError::Parse(format!("building parquet reader: {e}")))?;

    let mut records = Vec::new();
    for batch_result in reader {
        let batch =
            batch_result.map_err(|e| DashboardError::Parse(format!("reading record batch: {e}")))?;
        for row in 0..batch.num_rows() {
            let cells = columns
                .iter()
                .map(|&(field, idx)| Ok((field, cell_text(batch.column(idx), row)?)))
                .collect::<Result<Vec<_>>>()?;
            records.push(ReviewRecord::from_cells(
                cells.iter().map(|(f, v)| (*f, v.as_str())),
            ));
        }
    }
    Ok(records)
}

/// Render one Arrow cell as text. Nulls become the empty string.
fn cell_text(col: &Arc<dyn Array>, row: usize) -> Result<String> {
    if col.is_null(row) {
        return Ok(String::new());
    }
    match col.data_type() {
        DataType::Utf8 => match col.as_any().downcast_ref::<StringArray>() {
            Some(s) => Ok(s.value(row).to_string()),
            None => Err(DashboardError::Parse("expected StringArray".into())),
        },
        DataType::LargeUtf8 => Ok(col.as_string::<i64>().value(row).to_string()),
        _ => array_value_to_string(col, row)
            .map_err(|e| DashboardError::Parse(format!("row {row}: {e}"))),
    }
}
