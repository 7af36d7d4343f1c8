use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{Array, LargeListArray, ListArray};
use arrow::datatypes::DataType;
use arrow::error::ArrowError;
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::errors::ParquetError;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{AnimeTable, COL_TITLE};
use super::normalize::{RawTable, build_table};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Everything that can stop a dataset from loading.
///
/// Per-field problems (bad dates, bad ratings) are not errors; they are
/// repaired by the normalizer and counted in the table's `LoadReport`.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The source file does not exist.
    #[error("Data source not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// The source exists but could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    /// The dataset has no column to key records by.
    #[error("Required column '{0}' is missing")]
    MissingColumn(&'static str),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parquet error: {0}")]
    Parquet(#[from] ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    /// The file parsed but does not have the expected shape.
    #[error("Malformed data: {0}")]
    Malformed(String),
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load and normalize an anime dataset.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row plus one row per title (the canonical format)
/// * `.json`    – `[{ "anime": ..., "studio": ..., ... }, ...]`
/// * `.parquet` – one column per field, any scalar type
pub fn load_file(path: &Path) -> Result<AnimeTable, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let raw = match ext.as_str() {
        "csv" => read_csv(open(path)?)?,
        "json" => read_json(open(path)?)?,
        "parquet" | "pq" => read_parquet(open(path)?)?,
        other => return Err(LoadError::UnsupportedFormat(other.to_string())),
    };

    let table = build_table(&raw).ok_or(LoadError::MissingColumn(COL_TITLE))?;
    let report = &table.report;
    log::info!(
        "Loaded {} titles from {} ({} rows read, {} duplicates, {} untitled, {} bad dates, {} bad ratings, {} clamped)",
        table.len(),
        path.display(),
        report.rows_read,
        report.duplicates_dropped,
        report.untitled_dropped,
        report.unparsed_dates,
        report.unparsed_ratings,
        report.clamped_ratings,
    );
    Ok(table)
}

fn open(path: &Path) -> Result<File, LoadError> {
    File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => LoadError::SourceNotFound(path.to_path_buf()),
        _ => LoadError::Io {
            path: path.to_path_buf(),
            source: e,
        },
    })
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

/// Rows may be ragged; missing trailing cells read as null. Cells that are
/// not valid UTF-8 are decoded lossily rather than failing the row.
pub fn read_csv<R: io::Read>(input: R) -> Result<RawTable, LoadError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(input);
    let headers = reader.byte_headers()?.clone();
    let mut raw = RawTable::new(headers.iter().map(|h| String::from_utf8_lossy(h).into_owned()));

    for record in reader.byte_records() {
        let record = record?;
        let row = (0..raw.headers.len())
            .map(|i| {
                record
                    .get(i)
                    .filter(|bytes| !bytes.is_empty())
                    .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
            })
            .collect();
        raw.rows.push(row);
    }

    Ok(raw)
}

// ---------------------------------------------------------------------------
// JSON reader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "anime": "Naruto", "genre_tags": "Action/Adventure", "note_globale": 8.7 },
///   ...
/// ]
/// ```
///
/// Keys are unioned across objects in first-seen order.
pub fn read_json<R: io::Read>(input: R) -> Result<RawTable, LoadError> {
    let root: JsonValue = serde_json::from_reader(io::BufReader::new(input))?;
    let records = root
        .as_array()
        .ok_or_else(|| LoadError::Malformed("expected top-level JSON array".to_string()))?;

    let mut keys: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| LoadError::Malformed(format!("row {i} is not a JSON object")))?;
        for key in obj.keys() {
            if !keys.contains(key) {
                keys.push(key.clone());
            }
        }
    }

    let mut raw = RawTable::new(&keys);
    for rec in records {
        // Already checked above.
        let Some(obj) = rec.as_object() else { continue };
        raw.rows
            .push(keys.iter().map(|k| obj.get(k).and_then(json_to_text)).collect());
    }
    Ok(raw)
}

fn json_to_text(val: &JsonValue) -> Option<String> {
    match val {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Array(items) => Some(
            items
                .iter()
                .filter_map(json_to_text)
                .collect::<Vec<_>>()
                .join("/"),
        ),
        other => Some(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet reader
// ---------------------------------------------------------------------------

/// Every column is rendered to text with Arrow's display formatter, so the
/// normalizer sees the same cells whatever the physical types are. List
/// columns (e.g. genre tags written as a list) are joined with `/`.
pub fn read_parquet(file: File) -> Result<RawTable, LoadError> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let schema = builder.schema().clone();
    let reader = builder.build()?;

    let mut raw = RawTable::new(schema.fields().iter().map(|f| f.name().clone()));

    for batch_result in reader {
        let batch = batch_result?;
        for row in 0..batch.num_rows() {
            let cells = batch
                .columns()
                .iter()
                .map(|col| cell_to_text(col, row))
                .collect::<Result<Vec<_>, _>>()?;
            raw.rows.push(cells);
        }
    }

    Ok(raw)
}

fn cell_to_text(col: &Arc<dyn Array>, row: usize) -> Result<Option<String>, LoadError> {
    if col.is_null(row) {
        return Ok(None);
    }

    let items = match col.data_type() {
        DataType::List(_) => col
            .as_any()
            .downcast_ref::<ListArray>()
            .map(|list| list.value(row)),
        DataType::LargeList(_) => col
            .as_any()
            .downcast_ref::<LargeListArray>()
            .map(|list| list.value(row)),
        _ => None,
    };

    match items {
        Some(values) => {
            let mut parts = Vec::with_capacity(values.len());
            for i in 0..values.len() {
                if !values.is_null(i) {
                    parts.push(array_value_to_string(values.as_ref(), i)?);
                }
            }
            Ok(Some(parts.join("/")))
        }
        None => Ok(Some(array_value_to_string(col.as_ref(), row)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use arrow::array::{Float64Array, Int64Array, ListBuilder, StringArray, StringBuilder};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;
    use tempfile::TempDir;

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        write!(file, "{contents}").unwrap();
        path
    }

    const SAMPLE_CSV: &str = "\
Anime, Genre Tags ,Source,Status,Studio,Date Pub,Note Globale,Note Meilleur Ep,Note Pire Ep,Nb Episodes
Naruto,Action / Adventure,Manga,Terminé,Pierrot,2002-10-03,8.7,9.5,5.0,220
Bleach,Action,Manga,Terminé,Pierrot,2004-10-05,6.2,9.0,3.1,366
naruto ,Comedy,Manga,Terminé,Other,2002-10-03,1.0,1.0,1.0,1
";

    // ── CSV ───────────────────────────────────────────────────────────────────

    #[test]
    fn test_load_csv_normalizes_headers_and_rows() {
        let dir = TempDir::new().unwrap();
        let path = write_file(dir.path(), "animes.csv", SAMPLE_CSV);

        let table = load_file(&path).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.records[0].title, "NARUTO");
        assert_eq!(table.records[0].studio, "Pierrot");
        assert_eq!(table.records[0].genre_tags, vec!["action", "adventure"]);
        assert_eq!(table.records[0].best_episode_rating, Some(9.5));
        assert_eq!(table.records[1].title, "BLEACH");
        assert_eq!(table.records[1].episode_count, 366);
        assert_eq!(table.report.duplicates_dropped, 1);
    }

    #[test]
    fn test_read_csv_ragged_rows() {
        let raw = read_csv("anime,studio,note_globale\nAkira\nPaprika,Madhouse,7.8,extra\n".as_bytes())
            .unwrap();
        assert_eq!(raw.rows.len(), 2);
        assert_eq!(raw.rows[0], vec![Some("Akira".to_string()), None, None]);
        assert_eq!(raw.rows[1][2].as_deref(), Some("7.8"));
    }

    #[test]
    fn test_load_missing_file_is_source_not_found() {
        let dir = TempDir::new().unwrap();
        let err = load_file(&dir.path().join("animes.csv")).unwrap_err();
        assert!(matches!(err, LoadError::SourceNotFound(_)), "{err:?}");
    }

    #[test]
    fn test_load_unsupported_extension() {
        let dir = TempDir::new().unwrap();
        let path = write_file(dir.path(), "animes.txt", "anime\nAkira\n");
        let err = load_file(&path).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedFormat(ref ext) if ext == "txt"));
    }

    #[test]
    fn test_load_without_title_column() {
        let dir = TempDir::new().unwrap();
        let path = write_file(dir.path(), "animes.csv", "name,studio\nAkira,TMS\n");
        let err = load_file(&path).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn("anime")));
    }

    // ── JSON ──────────────────────────────────────────────────────────────────

    #[test]
    fn test_load_json_records() {
        let dir = TempDir::new().unwrap();
        let json = serde_json::json!([
            { "Anime": "Naruto", "genre_tags": ["Action", "Adventure"], "note_globale": 8.7, "nb_episodes": 220 },
            { "Anime": "Monster", "studio": "Madhouse", "note_globale": null }
        ]);
        let path = write_file(dir.path(), "animes.json", &json.to_string());

        let table = load_file(&path).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.records[0].genre_tags, vec!["action", "adventure"]);
        assert_eq!(table.records[0].overall_rating, Some(8.7));
        assert_eq!(table.records[0].studio, "");
        assert_eq!(table.records[1].studio, "Madhouse");
        assert_eq!(table.records[1].overall_rating, None);
    }

    #[test]
    fn test_load_json_rejects_non_array() {
        let dir = TempDir::new().unwrap();
        let path = write_file(dir.path(), "animes.json", r#"{"anime": "Akira"}"#);
        assert!(matches!(load_file(&path), Err(LoadError::Malformed(_))));
    }

    // ── Parquet ───────────────────────────────────────────────────────────────

    #[test]
    fn test_load_parquet_mixed_types() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("animes.parquet");

        let mut genres = ListBuilder::new(StringBuilder::new());
        genres.values().append_value("Drama");
        genres.values().append_value("Thriller");
        genres.append(true);
        genres.append(false);

        let schema = Arc::new(Schema::new(vec![
            Field::new("Anime", DataType::Utf8, false),
            Field::new(
                "genre_tags",
                DataType::List(Arc::new(Field::new("item", DataType::Utf8, true))),
                true,
            ),
            Field::new("note_globale", DataType::Float64, true),
            Field::new("nb_episodes", DataType::Int64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec!["Monster", "Akira"])),
                Arc::new(genres.finish()),
                Arc::new(Float64Array::from(vec![Some(9.1), None])),
                Arc::new(Int64Array::from(vec![74, 1])),
            ],
        )
        .unwrap();

        let file = File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = load_file(&path).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.records[0].title, "MONSTER");
        assert_eq!(table.records[0].genre_tags, vec!["drama", "thriller"]);
        assert_eq!(table.records[0].overall_rating, Some(9.1));
        assert_eq!(table.records[0].episode_count, 74);
        assert_eq!(table.records[1].primary_genre, "Unknown");
        assert_eq!(table.records[1].overall_rating, None);
    }
}
