//! Table loading for CSV files and spreadsheet workbooks.
//!
//! The file format is chosen from the extension. CSV files are parsed with
//! Polars and produce a single table; workbooks are read with calamine and
//! produce one table per sheet, in sheet order.
//!
//! Both paths normalise missing values the same way: empty cells, the
//! markers in [`MISSING_VALUE_MARKERS`] and NaN floats all become nulls, so
//! the checks only ever have to look at the Polars null mask.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use calamine::{Data, ExcelDateTime, Range, Reader, open_workbook_auto};
use chrono::NaiveTime;
use polars::io::csv::read::{CsvParseOptions, CsvReadOptions, NullValues};
use polars::prelude::*;
use tracing::{debug, info};

use crate::error::{CheckerError, Result, ResultExt};
use crate::utils::{MISSING_VALUE_MARKERS, dtype_category_str, is_missing_marker};

/// Table name used for CSV input when the path has no usable file stem.
pub const DEFAULT_TABLE_NAME: &str = "data";

/// Extensions read as workbooks (one table per sheet).
pub const WORKBOOK_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Largest magnitude at which every integer is exactly representable as f64.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Input file kind, decided by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Csv,
    Workbook,
}

impl FileKind {
    /// Detect the file kind from the (case-insensitive) extension.
    pub fn detect(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        if extension == "csv" {
            Ok(FileKind::Csv)
        } else if WORKBOOK_EXTENSIONS.contains(&extension.as_str()) {
            Ok(FileKind::Workbook)
        } else {
            Err(CheckerError::FileFormat {
                extension: if extension.is_empty() {
                    "(none)".to_string()
                } else {
                    format!(".{extension}")
                },
            })
        }
    }
}

/// One loaded table: a CSV file or a single workbook sheet.
#[derive(Debug, Clone)]
pub struct NamedTable {
    pub name: String,
    pub data: DataFrame,
}

impl NamedTable {
    pub fn new(name: impl Into<String>, data: DataFrame) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }
}

/// Load every table contained in `path`.
///
/// # Errors
///
/// - [`CheckerError::FileFormat`] when the extension is not recognised.
/// - An IO-class error (see [`CheckerError::is_io`]) when the file is missing,
///   unreadable or cannot be parsed.
pub fn load_tables(path: impl AsRef<Path>) -> Result<Vec<NamedTable>> {
    let path = path.as_ref();
    let kind = FileKind::detect(path)?;

    fs::metadata(path).context(format!("Cannot read '{}'", path.display()))?;

    info!("Loading {:?} file: {}", kind, path.display());
    let tables = match kind {
        FileKind::Csv => vec![load_csv(path)?],
        FileKind::Workbook => load_workbook(path)?,
    };

    for table in &tables {
        info!(
            "Loaded table '{}' ({} rows x {} columns)",
            table.name,
            table.data.height(),
            table.data.width()
        );
    }

    Ok(tables)
}

/// Load a CSV file (header row, comma-delimited) as a single table named
/// after the file stem.
///
/// Repeated or blank headers are renamed with the same scheme as workbook
/// headers (see [`unique_column_names`]).
pub fn load_csv(path: &Path) -> Result<NamedTable> {
    let context = || format!("Failed to parse CSV '{}'", path.display());

    let null_values = NullValues::AllColumns(
        MISSING_VALUE_MARKERS
            .iter()
            .map(|&marker| PlSmallStr::from_static(marker))
            .collect(),
    );

    // Scan the whole file for schema inference so a late text value keeps
    // the column as text instead of failing the parse.
    let mut df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .with_parse_options(csv_parse_options().with_null_values(Some(null_values)))
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))
        .and_then(|reader| reader.finish())
        .context(context())?;

    let names = unique_column_names(read_csv_header(path).context(context())?);
    df.set_column_names(names).context(context())?;

    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_TABLE_NAME);

    Ok(NamedTable::new(name, normalize_missing(df)?))
}

fn csv_parse_options() -> CsvParseOptions {
    CsvParseOptions::default().with_quote_char(Some(b'"'))
}

/// Header cells exactly as written in the file.
///
/// Polars de-duplicates header names on its own, so the first line is read
/// again as a data row with every column typed as text.
fn read_csv_header(path: &Path) -> PolarsResult<Vec<String>> {
    let header = CsvReadOptions::default()
        .with_has_header(false)
        .with_n_rows(Some(1))
        .with_infer_schema_length(Some(0))
        .with_parse_options(csv_parse_options())
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))?
        .finish()?;

    header
        .get_columns()
        .iter()
        .map(|col| -> PolarsResult<String> {
            let cell = col.as_materialized_series().str()?.get(0);
            Ok(cell.unwrap_or_default().to_string())
        })
        .collect()
}

/// Load every sheet of a workbook, preserving sheet order.
pub fn load_workbook(path: &Path) -> Result<Vec<NamedTable>> {
    let context = || format!("Failed to open workbook '{}'", path.display());

    let mut workbook =
        open_workbook_auto(path).map_err(|e| CheckerError::from(e).with_context(context()))?;

    let mut tables = Vec::new();
    for sheet_name in workbook.sheet_names() {
        let range = workbook.worksheet_range(&sheet_name).map_err(|e| {
            CheckerError::from(e).with_context(format!("Failed to read sheet '{sheet_name}'"))
        })?;
        let df = sheet_to_frame(&range)
            .map_err(|e| e.with_context(format!("Failed to convert sheet '{sheet_name}'")))?;
        tables.push(NamedTable::new(sheet_name, df));
    }

    Ok(tables)
}

/// Convert a sheet range into a DataFrame, using the first row as header.
pub(crate) fn sheet_to_frame(range: &Range<Data>) -> Result<DataFrame> {
    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(DataFrame::empty());
    };
    let body: Vec<&[Data]> = rows.collect();

    let raw_names = header.iter().map(|cell| match cell {
        Data::Empty => String::new(),
        other => other.to_string(),
    });

    let columns = unique_column_names(raw_names)
        .into_iter()
        .enumerate()
        .map(|(idx, name)| {
            let cells: Vec<SheetCell> = body
                .iter()
                .map(|row| SheetCell::from_data(row.get(idx)))
                .collect();
            build_column(name, &cells)
        })
        .collect::<Vec<Column>>();

    normalize_missing(DataFrame::new(columns)?)
}

/// Header cells to unique column names.
///
/// Names are trimmed; a blank header becomes `column_{idx}`. A repeated name
/// gets the first free `.1`, `.2`, ... suffix, skipping names that are
/// already taken (`a, a, a.1` becomes `a, a.1, a.1.1`).
pub(crate) fn unique_column_names(raw: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::new();
    let mut suffixes: HashMap<String, usize> = HashMap::new();

    raw.into_iter()
        .enumerate()
        .map(|(idx, cell)| {
            let trimmed = cell.trim();
            let base = if trimmed.is_empty() {
                format!("column_{idx}")
            } else {
                trimmed.to_string()
            };

            let mut name = base.clone();
            while taken.contains(&name) {
                let suffix = suffixes.entry(base.clone()).or_insert(0);
                *suffix += 1;
                name = format!("{base}.{suffix}");
            }
            taken.insert(name.clone());
            name
        })
        .collect()
}

/// A workbook cell reduced to the shapes that matter for dtype inference.
#[derive(Debug, Clone, PartialEq)]
enum SheetCell {
    Missing,
    Number(f64),
    Integer(i64),
    Bool(bool),
    Text(String),
}

impl SheetCell {
    fn from_data(cell: Option<&Data>) -> Self {
        match cell {
            None | Some(Data::Empty) | Some(Data::Error(_)) => SheetCell::Missing,
            Some(Data::Int(v)) => SheetCell::Integer(*v),
            Some(Data::Float(v)) if v.is_nan() => SheetCell::Missing,
            Some(Data::Float(v)) => SheetCell::Number(*v),
            Some(Data::Bool(v)) => SheetCell::Bool(*v),
            Some(Data::String(s)) if is_missing_marker(s) => SheetCell::Missing,
            Some(Data::String(s)) => SheetCell::Text(s.clone()),
            Some(Data::DateTime(dt)) => SheetCell::Text(format_excel_datetime(dt)),
            Some(Data::DateTimeIso(s)) | Some(Data::DurationIso(s)) => SheetCell::Text(s.clone()),
        }
    }

    /// Integer value of a whole number cell, if it has one.
    fn as_integer(&self) -> Option<i64> {
        match self {
            SheetCell::Integer(v) => Some(*v),
            SheetCell::Number(v) if v.fract() == 0.0 && v.abs() <= MAX_EXACT_INTEGER => {
                Some(*v as i64)
            }
            _ => None,
        }
    }

    fn as_float(&self) -> Option<f64> {
        match self {
            SheetCell::Integer(v) => Some(*v as f64),
            SheetCell::Number(v) => Some(*v),
            _ => None,
        }
    }

    fn as_text(&self) -> Option<String> {
        match self {
            SheetCell::Missing => None,
            SheetCell::Integer(v) => Some(v.to_string()),
            SheetCell::Number(v) => Some(v.to_string()),
            SheetCell::Bool(v) => Some(v.to_string()),
            SheetCell::Text(s) => Some(s.clone()),
        }
    }
}

/// Render an Excel date/time serial as ISO 8601 text: `2024-01-01` for a
/// plain date, `2024-01-01T09:30:00` with a time of day, `PT5400S` for a
/// duration.
fn format_excel_datetime(dt: &ExcelDateTime) -> String {
    if dt.is_duration() {
        if let Some(duration) = dt.as_duration() {
            return duration.to_string();
        }
    } else if let Some(timestamp) = dt.as_datetime() {
        return if timestamp.time() == NaiveTime::MIN {
            timestamp.date().format("%Y-%m-%d").to_string()
        } else {
            timestamp.format("%Y-%m-%dT%H:%M:%S").to_string()
        };
    }
    dt.as_f64().to_string()
}

/// Build a typed column from sheet cells.
///
/// Whole numbers → Int64, any numbers → Float64, booleans → Boolean,
/// anything mixed or textual → String.
fn build_column(name: String, cells: &[SheetCell]) -> Column {
    let present: Vec<&SheetCell> = cells
        .iter()
        .filter(|c| **c != SheetCell::Missing)
        .collect();

    let series = if !present.is_empty() && present.iter().all(|c| c.as_integer().is_some()) {
        let values: Vec<Option<i64>> = cells.iter().map(SheetCell::as_integer).collect();
        Series::new(name.into(), values)
    } else if !present.is_empty() && present.iter().all(|c| c.as_float().is_some()) {
        let values: Vec<Option<f64>> = cells.iter().map(SheetCell::as_float).collect();
        Series::new(name.into(), values)
    } else if !present.is_empty() && present.iter().all(|c| matches!(c, SheetCell::Bool(_))) {
        let values: Vec<Option<bool>> = cells
            .iter()
            .map(|c| match c {
                SheetCell::Bool(v) => Some(*v),
                _ => None,
            })
            .collect();
        Series::new(name.into(), values)
    } else {
        let values: Vec<Option<String>> = cells.iter().map(SheetCell::as_text).collect();
        Series::new(name.into(), values)
    };

    debug!(
        "Inferred {} column '{}' from {} cells",
        dtype_category_str(&series),
        series.name(),
        cells.len()
    );
    series.into()
}

/// Map missing-value markers in text columns and NaN in float columns to null.
///
/// A non-empty column with no values at all is typed Float64, matching a
/// numeric column whose every cell is blank.
pub(crate) fn normalize_missing(df: DataFrame) -> Result<DataFrame> {
    let columns = df
        .get_columns()
        .iter()
        .map(|col| {
            let series = col.as_materialized_series();
            let name = series.name().clone();

            let normalized: Series = match series.dtype() {
                DataType::String => {
                    let cleaned: StringChunked = series
                        .str()?
                        .into_iter()
                        .map(|v| v.filter(|s| !is_missing_marker(s)))
                        .collect();
                    cleaned.with_name(name).into_series()
                }
                DataType::Float32 | DataType::Float64 => {
                    let casted = series.cast(&DataType::Float64)?;
                    let cleaned: Float64Chunked = casted
                        .f64()?
                        .into_iter()
                        .map(|v| v.filter(|x| !x.is_nan()))
                        .collect();
                    cleaned.with_name(name).into_series()
                }
                _ => series.clone(),
            };

            if !normalized.is_empty() && normalized.null_count() == normalized.len() {
                return normalized.cast(&DataType::Float64).map(Column::from);
            }
            Ok(Column::from(normalized))
        })
        .collect::<PolarsResult<Vec<Column>>>()?;

    Ok(DataFrame::new(columns)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(suffix: &str, contents: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .prefix("sample")
            .suffix(suffix)
            .tempfile()
            .unwrap();
        file.write_all(contents).unwrap();
        file.flush().unwrap();
        file
    }

    fn sheet(rows: Vec<Vec<Data>>) -> Range<Data> {
        let height = rows.len() as u32;
        let width = rows.iter().map(|r| r.len()).max().unwrap_or(0) as u32;
        let mut range = Range::new((0, 0), (height - 1, width - 1));
        for (r, row) in rows.into_iter().enumerate() {
            for (c, cell) in row.into_iter().enumerate() {
                range.set_value((r as u32, c as u32), cell);
            }
        }
        range
    }

    // ==================== FileKind tests ====================

    #[test]
    fn test_detect_csv_case_insensitive() {
        assert_eq!(FileKind::detect(Path::new("a.csv")).unwrap(), FileKind::Csv);
        assert_eq!(FileKind::detect(Path::new("A.CSV")).unwrap(), FileKind::Csv);
    }

    #[test]
    fn test_detect_workbooks() {
        for name in ["a.xlsx", "a.XLS", "a.xlsm", "a.xlsb", "a.ods"] {
            assert_eq!(
                FileKind::detect(Path::new(name)).unwrap(),
                FileKind::Workbook,
                "{name}"
            );
        }
    }

    #[test]
    fn test_detect_unsupported_extension() {
        let err = FileKind::detect(Path::new("notes.txt")).unwrap_err();
        assert!(err.is_file_format());
        assert!(err.to_string().contains(".txt"));

        let err = FileKind::detect(Path::new("no_extension")).unwrap_err();
        assert!(err.is_file_format());
    }

    // ==================== CSV tests ====================

    #[test]
    fn test_load_csv_single_table_named_after_stem() {
        let file = write_temp(".csv", b"id,name,score\n1,a,1.5\n2,,2.5\n3,c,\n");
        let tables = load_tables(file.path()).unwrap();

        assert_eq!(tables.len(), 1);
        let expected_name = file.path().file_stem().unwrap().to_str().unwrap();
        assert_eq!(tables[0].name, expected_name);

        let df = &tables[0].data;
        assert_eq!(df.shape(), (3, 3));
        assert_eq!(df.column("id").unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column("name").unwrap().null_count(), 1);
        assert_eq!(df.column("score").unwrap().null_count(), 1);
    }

    #[test]
    fn test_load_csv_missing_markers_become_null() {
        let file = write_temp(".csv", b"value,label\n1,NA\nN/A,x\n3,null\n");
        let tables = load_tables(file.path()).unwrap();
        let df = &tables[0].data;

        let value = df.column("value").unwrap();
        assert!(crate::utils::is_numeric_dtype(value.dtype()));
        assert_eq!(value.null_count(), 1);
        assert_eq!(df.column("label").unwrap().null_count(), 2);
    }

    #[test]
    fn test_load_csv_na_spellings_keep_column_numeric() {
        let file = write_temp(".csv", b"v\n1\n2\nn/a\n3\n<NA>\n#NA\n-nan\n100\n");
        let tables = load_tables(file.path()).unwrap();
        let v = tables[0].data.column("v").unwrap();

        assert!(crate::utils::is_numeric_dtype(v.dtype()));
        assert_eq!(v.null_count(), 4);
    }

    #[test]
    fn test_load_csv_repeated_headers_use_dot_suffix() {
        let file = write_temp(".csv", b"a,a,a.1\n1,2,3\n");
        let tables = load_tables(file.path()).unwrap();

        let names: Vec<String> = tables[0]
            .data
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(names, vec!["a", "a.1", "a.1.1"]);
    }

    #[test]
    fn test_load_csv_all_empty_column_is_float() {
        let file = write_temp(".csv", b"a,b\n1,\n2,\n");
        let tables = load_tables(file.path()).unwrap();
        let b = tables[0].data.column("b").unwrap();
        assert_eq!(b.dtype(), &DataType::Float64);
        assert_eq!(b.null_count(), 2);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = load_tables("/definitely/not/here.csv").unwrap_err();
        assert!(err.is_io());
    }

    #[test]
    fn test_load_corrupt_workbook_is_io_error() {
        let file = write_temp(".xlsx", b"this is not a zip archive");
        let err = load_tables(file.path()).unwrap_err();
        assert!(err.is_io());
    }

    // ==================== Sheet conversion tests ====================

    #[test]
    fn test_sheet_to_frame_infers_dtypes() {
        let range = sheet(vec![
            vec![
                Data::String("int".into()),
                Data::String("float".into()),
                Data::String("flag".into()),
                Data::String("mixed".into()),
            ],
            vec![Data::Float(1.0), Data::Float(1.5), Data::Bool(true), Data::Int(1)],
            vec![Data::Float(2.0), Data::Empty, Data::Bool(false), Data::String("x".into())],
        ]);

        let df = sheet_to_frame(&range).unwrap();
        assert_eq!(df.shape(), (2, 4));
        assert_eq!(df.column("int").unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column("float").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("float").unwrap().null_count(), 1);
        assert_eq!(df.column("flag").unwrap().dtype(), &DataType::Boolean);
        assert_eq!(df.column("mixed").unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn test_sheet_to_frame_header_names() {
        let range = sheet(vec![
            vec![
                Data::String("a".into()),
                Data::Empty,
                Data::String("a".into()),
            ],
            vec![Data::Int(1), Data::Int(2), Data::Int(3)],
        ]);

        let df = sheet_to_frame(&range).unwrap();
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(names, vec!["a", "column_1", "a.1"]);
    }

    #[test]
    fn test_unique_column_names_skip_taken_suffixes() {
        let names = unique_column_names(["a", "a", "a.1", "a", "", "column_4"].map(String::from));
        assert_eq!(names, vec!["a", "a.1", "a.1.1", "a.2", "column_4", "column_4.1"]);
    }

    #[test]
    fn test_sheet_to_frame_header_collision() {
        let range = sheet(vec![
            vec![
                Data::String("a".into()),
                Data::String("a".into()),
                Data::String("a.1".into()),
            ],
            vec![Data::Int(1), Data::Int(2), Data::Int(3)],
        ]);

        let df = sheet_to_frame(&range).unwrap();
        assert_eq!(df.width(), 3);
        assert_eq!(df.column("a.1.1").unwrap().dtype(), &DataType::Int64);
    }

    #[test]
    fn test_sheet_dates_render_as_iso_text() {
        use calamine::ExcelDateTimeType;

        let date = |serial: f64| {
            Data::DateTime(ExcelDateTime::new(
                serial,
                ExcelDateTimeType::DateTime,
                false,
            ))
        };
        let range = sheet(vec![
            vec![Data::String("day".into())],
            vec![date(45292.0)],
            vec![date(45292.0)],
            vec![date(45292.5)],
        ]);

        let df = sheet_to_frame(&range).unwrap();
        let day = df.column("day").unwrap().as_materialized_series().clone();
        let values: Vec<Option<&str>> = day.str().unwrap().into_iter().collect();
        assert_eq!(
            values,
            vec![
                Some("2024-01-01"),
                Some("2024-01-01"),
                Some("2024-01-01T12:00:00")
            ]
        );
    }

    #[test]
    fn test_sheet_to_frame_markers_and_errors_are_null() {
        let range = sheet(vec![
            vec![Data::String("v".into())],
            vec![Data::String("NA".into())],
            vec![Data::Error(calamine::CellErrorType::Div0)],
            vec![Data::String("kept".into())],
        ]);

        let df = sheet_to_frame(&range).unwrap();
        assert_eq!(df.column("v").unwrap().null_count(), 2);
    }

    #[test]
    fn test_sheet_with_header_only_has_zero_rows() {
        let range = sheet(vec![vec![Data::String("a".into()), Data::String("b".into())]]);
        let df = sheet_to_frame(&range).unwrap();
        assert_eq!(df.shape(), (0, 2));
    }

    #[test]
    fn test_empty_sheet_has_no_columns() {
        let range: Range<Data> = Range::empty();
        let df = sheet_to_frame(&range).unwrap();
        assert_eq!(df.width(), 0);
    }
}
