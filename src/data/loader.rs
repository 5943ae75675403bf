use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{
    Array, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array, StringArray,
};
use arrow::datatypes::DataType;
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{LaunchDataset, LaunchRecord, OutcomeClass};

// ---------------------------------------------------------------------------
// Column contract
// ---------------------------------------------------------------------------

/// Required columns. Any other column in the file is ignored.
pub const COL_SITE: &str = "Launch Site";
pub const COL_PAYLOAD: &str = "Payload Mass (kg)";
pub const COL_CLASS: &str = "class";
pub const COL_BOOSTER: &str = "Booster Version Category";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),

    #[error("reading {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("decoding CSV")]
    Csv(#[from] csv::Error),

    #[error("decoding JSON")]
    Json(#[from] serde_json::Error),

    #[error("decoding Parquet")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("decoding Arrow batch")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("row {row}: invalid value {value:?} in column '{column}'")]
    InvalidValue {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("expected a top-level JSON array of objects")]
    NotARecordArray,
}

pub type Result<T> = std::result::Result<T, DatasetError>;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a launch dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – the SpaceX launch export with a header row
/// * `.json`    – `[{ "Launch Site": "...", "Payload Mass (kg)": 0.0, ... }, ...]`
/// * `.parquet` – one column per required field
pub fn load_file(path: &Path) -> Result<LaunchDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" => load_csv(path)?,
        "json" => load_json(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        other => return Err(DatasetError::UnsupportedExtension(other.to_string())),
    };

    log::info!(
        "Loaded {} launch records from {} ({} sites)",
        dataset.len(),
        path.display(),
        dataset.sites().len()
    );
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// Cell parsing shared by all formats
// ---------------------------------------------------------------------------

fn invalid(row: usize, column: &'static str, value: impl ToString) -> DatasetError {
    DatasetError::InvalidValue {
        row,
        column,
        value: value.to_string(),
    }
}

fn parse_label(s: &str, row: usize, column: &'static str) -> Result<String> {
    if s.is_empty() {
        return Err(invalid(row, column, s));
    }
    Ok(s.to_string())
}

fn check_payload(v: f64, row: usize) -> Result<f64> {
    if !v.is_finite() || v < 0.0 {
        return Err(invalid(row, COL_PAYLOAD, v));
    }
    Ok(v)
}

fn parse_payload(s: &str, row: usize) -> Result<f64> {
    let v = s
        .trim()
        .parse::<f64>()
        .map_err(|_| invalid(row, COL_PAYLOAD, s))?;
    check_payload(v, row)
}

fn parse_class(s: &str, row: usize) -> Result<OutcomeClass> {
    s.parse::<OutcomeClass>()
        .map_err(|_| invalid(row, COL_CLASS, s))
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<LaunchDataset> {
    let file = std::fs::File::open(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_csv(file)
}

/// Parse CSV text with a header row. Exposed for callers that already hold
/// the bytes (tests, embedded datasets).
pub fn read_csv<R: std::io::Read>(input: R) -> Result<LaunchDataset> {
    let mut reader = csv::Reader::from_reader(input);
    let headers = reader.headers()?.clone();

    let position = |name: &'static str| {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or(DatasetError::MissingColumn(name))
    };
    let site_idx = position(COL_SITE)?;
    let payload_idx = position(COL_PAYLOAD)?;
    let class_idx = position(COL_CLASS)?;
    let booster_idx = position(COL_BOOSTER)?;

    let mut records = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = result?;
        let cell = |idx: usize| record.get(idx).unwrap_or("");

        records.push(LaunchRecord {
            site: parse_label(cell(site_idx), row, COL_SITE)?,
            payload_mass_kg: parse_payload(cell(payload_idx), row)?,
            outcome: parse_class(cell(class_idx), row)?,
            booster_version_category: parse_label(cell(booster_idx), row, COL_BOOSTER)?,
        });
    }

    Ok(LaunchDataset::from_records(records))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   {
///     "Launch Site": "CCAFS LC-40",
///     "Payload Mass (kg)": 525.0,
///     "class": 0,
///     "Booster Version Category": "v1.0"
///   },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<LaunchDataset> {
    let text = std::fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let root: JsonValue = serde_json::from_str(&text)?;
    let rows = root.as_array().ok_or(DatasetError::NotARecordArray)?;

    let mut records = Vec::with_capacity(rows.len());
    for (row, value) in rows.iter().enumerate() {
        let obj = value.as_object().ok_or(DatasetError::NotARecordArray)?;
        let field = |name: &'static str| obj.get(name).ok_or(DatasetError::MissingColumn(name));

        let site = match field(COL_SITE)? {
            JsonValue::String(s) => parse_label(s, row, COL_SITE)?,
            other => return Err(invalid(row, COL_SITE, other)),
        };
        let payload_mass_kg = match field(COL_PAYLOAD)? {
            JsonValue::Number(n) => check_payload(n.as_f64().unwrap_or(f64::NAN), row)?,
            JsonValue::String(s) => parse_payload(s, row)?,
            other => return Err(invalid(row, COL_PAYLOAD, other)),
        };
        let outcome = match field(COL_CLASS)? {
            JsonValue::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
                .and_then(|i| OutcomeClass::try_from(i).ok())
                .ok_or_else(|| invalid(row, COL_CLASS, n))?,
            JsonValue::Bool(b) => {
                if *b {
                    OutcomeClass::Success
                } else {
                    OutcomeClass::Failure
                }
            }
            JsonValue::String(s) => parse_class(s, row)?,
            other => return Err(invalid(row, COL_CLASS, other)),
        };
        let booster_version_category = match field(COL_BOOSTER)? {
            JsonValue::String(s) => parse_label(s, row, COL_BOOSTER)?,
            other => return Err(invalid(row, COL_BOOSTER, other)),
        };

        records.push(LaunchRecord {
            site,
            payload_mass_kg,
            outcome,
            booster_version_category,
        });
    }

    Ok(LaunchDataset::from_records(records))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file whose schema carries the four required columns.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`); integer and float payload/class
/// columns are both accepted.
fn load_parquet(path: &Path) -> Result<LaunchDataset> {
    let file = std::fs::File::open(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;
    read_batches(reader)
}

/// Collect Arrow record batches into a dataset. Rows in errors are counted
/// from the start of the first batch.
fn read_batches(
    batches: impl IntoIterator<Item = std::result::Result<RecordBatch, ArrowError>>,
) -> Result<LaunchDataset> {
    let mut records = Vec::new();
    let mut row_offset = 0;

    for batch_result in batches {
        let batch = batch_result?;
        let schema = batch.schema();
        let column = |name: &'static str| {
            schema
                .index_of(name)
                .map(|idx| batch.column(idx))
                .map_err(|_| DatasetError::MissingColumn(name))
        };

        let site_col = column(COL_SITE)?;
        let payload_col = column(COL_PAYLOAD)?;
        let class_col = column(COL_CLASS)?;
        let booster_col = column(COL_BOOSTER)?;

        for i in 0..batch.num_rows() {
            let row = row_offset + i;
            let payload = extract_f64(payload_col, i).ok_or_else(|| invalid(row, COL_PAYLOAD, "null"))?;
            let class = extract_f64(class_col, i)
                .filter(|f| f.fract() == 0.0)
                .and_then(|f| OutcomeClass::try_from(f as i64).ok())
                .ok_or_else(|| invalid(row, COL_CLASS, format!("{:?}", class_col.data_type())))?;

            records.push(LaunchRecord {
                site: extract_string(site_col, i, row, COL_SITE)?,
                payload_mass_kg: check_payload(payload, row)?,
                outcome: class,
                booster_version_category: extract_string(booster_col, i, row, COL_BOOSTER)?,
            });
        }
        row_offset += batch.num_rows();
    }

    Ok(LaunchDataset::from_records(records))
}

// -- Parquet / Arrow helpers --

fn extract_string(
    col: &Arc<dyn Array>,
    i: usize,
    row: usize,
    column: &'static str,
) -> Result<String> {
    if col.is_null(i) {
        return Err(invalid(row, column, "null"));
    }
    let value = match col.data_type() {
        DataType::Utf8 => col
            .as_any()
            .downcast_ref::<StringArray>()
            .map(|s| s.value(i).to_string()),
        DataType::LargeUtf8 => Some(col.as_string::<i64>().value(i).to_string()),
        _ => None,
    };
    match value {
        Some(s) => parse_label(&s, row, column),
        None => Err(invalid(row, column, format!("{:?}", col.data_type()))),
    }
}

/// Numeric cell as `f64`; `None` for nulls and non-numeric columns.
fn extract_f64(col: &Arc<dyn Array>, i: usize) -> Option<f64> {
    if col.is_null(i) {
        return None;
    }
    let any = col.as_any();
    match col.data_type() {
        DataType::Float64 => any.downcast_ref::<Float64Array>().map(|a| a.value(i)),
        DataType::Float32 => any
            .downcast_ref::<Float32Array>()
            .map(|a| f64::from(a.value(i))),
        DataType::Int64 => any.downcast_ref::<Int64Array>().map(|a| a.value(i) as f64),
        DataType::Int32 => any
            .downcast_ref::<Int32Array>()
            .map(|a| f64::from(a.value(i))),
        DataType::Boolean => any
            .downcast_ref::<BooleanArray>()
            .map(|a| if a.value(i) { 1.0 } else { 0.0 }),
        _ => None,
    }
}
