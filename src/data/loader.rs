use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, RawTable};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a score table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row followed by one row per student
/// * `.json`    – `[{ "name": "...", "math": 71, ... }, ...]`
/// * `.parquet` – flat columns of strings, integers, floats or booleans
pub fn load_file(path: &Path) -> Result<RawTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    if table.is_empty() {
        log::warn!("{} has a header but no rows", path.display());
    }
    log::info!(
        "Loaded {} rows with columns {:?} from {}",
        table.len(),
        table.columns,
        path.display()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Cells read as missing, on top of the empty string.
const NA_TOKENS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];
const TRUE_TOKENS: [&str; 3] = ["true", "True", "TRUE"];
const FALSE_TOKENS: [&str; 3] = ["false", "False", "FALSE"];

/// CSV layout: header row with column names, then one record per student.
/// Short rows are padded with nulls; rows longer than the header are an error.
fn load_csv(path: &Path) -> Result<RawTable> {
    let reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .context("opening CSV")?;
    read_csv(reader)
}

fn read_csv<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<RawTable> {
    let columns: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        if record.len() > columns.len() {
            bail!(
                "CSV row {row_no}: expected {} fields, saw {}",
                columns.len(),
                record.len()
            );
        }
        let mut row: Vec<CellValue> = record.iter().map(guess_cell_type).collect();
        row.resize(columns.len(), CellValue::Null);
        rows.push(row);
    }

    Ok(RawTable::new(columns, rows))
}

fn guess_cell_type(s: &str) -> CellValue {
    if s.is_empty() || NA_TOKENS.contains(&s) {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    if TRUE_TOKENS.contains(&s) {
        return CellValue::Bool(true);
    }
    if FALSE_TOKENS.contains(&s) {
        return CellValue::Bool(false);
    }
    CellValue::String(s.to_string())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "roll no": 1, "name": "Asha", "math": 71, "gender": "F" },
///   ...
/// ]
/// ```
///
/// Columns appear in first-seen order; keys missing from a record read as null.
fn load_json(path: &Path) -> Result<RawTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    parse_json(&text)
}

fn parse_json(text: &str) -> Result<RawTable> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;
    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut columns: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }

    let rows = records
        .iter()
        .filter_map(JsonValue::as_object)
        .map(|obj| {
            columns
                .iter()
                .map(|col| obj.get(col).map(json_to_cell).unwrap_or(CellValue::Null))
                .collect()
        })
        .collect();

    Ok(RawTable::new(columns, rows))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a flat Parquet file, one column per field.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for row in 0..batch.num_rows() {
            rows.push(
                batch
                    .columns()
                    .iter()
                    .map(|col| extract_cell_value(col, row))
                    .collect(),
            );
        }
    }

    Ok(RawTable::new(columns, rows))
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell_value(col: &Arc<dyn Array>, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 => CellValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => CellValue::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        other => CellValue::String(format!("{other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(suffix)
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn csv_cells_are_typed() {
        let file = write_temp(".csv", "Roll,Name,Math,Passed\n1,Asha,71.5,true\n2,Ben,,false\n");
        let table = load_file(file.path()).unwrap();
        assert_eq!(table.columns, vec!["Roll", "Name", "Math", "Passed"]);
        assert_eq!(
            table.rows[0],
            vec![
                CellValue::Integer(1),
                CellValue::String("Asha".into()),
                CellValue::Float(71.5),
                CellValue::Bool(true),
            ]
        );
        assert_eq!(table.rows[1][2], CellValue::Null);
    }

    #[test]
    fn short_csv_rows_are_padded_with_nulls() {
        let file = write_temp(".csv", "name,math,science\nAsha,70,80\nBen,60\n");
        let table = load_file(file.path()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.rows[1],
            vec![
                CellValue::String("Ben".into()),
                CellValue::Integer(60),
                CellValue::Null,
            ]
        );
    }

    #[test]
    fn long_csv_rows_are_rejected() {
        let file = write_temp(".csv", "a,b\n1,2\n3,4,5\n");
        let err = load_file(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("expected 2 fields, saw 3"));
    }

    #[test]
    fn boolean_and_missing_tokens() {
        assert_eq!(guess_cell_type("TRUE"), CellValue::Bool(true));
        assert_eq!(guess_cell_type("False"), CellValue::Bool(false));
        assert_eq!(guess_cell_type("yes"), CellValue::String("yes".into()));
        for token in ["NA", "N/A", "null", "None", "NaN", "nan", "#N/A"] {
            assert_eq!(guess_cell_type(token), CellValue::Null, "{token}");
        }
        assert_eq!(guess_cell_type("Nancy"), CellValue::String("Nancy".into()));
    }

    #[test]
    fn json_records_fill_missing_keys_with_null() {
        let table = parse_json(r#"[{"math": 10, "name": "A"}, {"science": 2.5}]"#).unwrap();
        assert_eq!(table.columns, vec!["math", "name", "science"]);
        assert_eq!(
            table.rows[1],
            vec![CellValue::Null, CellValue::Null, CellValue::Float(2.5)]
        );
        assert!(parse_json(r#"{"math": 1}"#).is_err());
    }

    #[test]
    fn parquet_columns_keep_their_types() {
        use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
        use arrow::datatypes::{Field, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let schema = Arc::new(Schema::new(vec![
            Field::new("roll", DataType::Int64, false),
            Field::new("name", DataType::Utf8, false),
            Field::new("math", DataType::Float64, true),
        ]));
        let columns: Vec<ArrayRef> = vec![
            Arc::new(Int64Array::from(vec![1, 2])),
            Arc::new(StringArray::from(vec!["Asha", "Ben"])),
            Arc::new(Float64Array::from(vec![Some(71.5), None])),
        ];
        let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();

        let file = tempfile::Builder::new()
            .suffix(".parquet")
            .tempfile()
            .unwrap();
        let mut writer = ArrowWriter::try_new(file.as_file().try_clone().unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = load_file(file.path()).unwrap();
        assert_eq!(table.columns, vec!["roll", "name", "math"]);
        assert_eq!(
            table.rows[0],
            vec![
                CellValue::Integer(1),
                CellValue::String("Asha".into()),
                CellValue::Float(71.5),
            ]
        );
        assert_eq!(table.rows[1][2], CellValue::Null);
    }

    #[test]
    fn unknown_extension_is_an_error() {
        let file = write_temp(".xlsx", "");
        let err = load_file(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("Unsupported file extension"));
    }
}
