use crate::column_resolver::{self, DATE};
use crate::error::{PipelineError, Result};
use crate::processing_context::ProcessingContext;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

// The raw per-game table. Cells stay as text and are parsed on access, since the
// column set differs between sources. Only the date column is normalized at load.
#[derive(Debug, Clone)]
pub struct GameTable {
    headers: Vec<String>,
    records: Vec<StringRecord>,
    dates: Vec<Option<NaiveDate>>,
}

#[derive(Debug, Clone, Copy)]
pub struct GameRow<'a> {
    record: &'a StringRecord,
    date: Option<NaiveDate>,
}

impl<'a> GameRow<'a> {
    pub fn text(&self, col: usize) -> &'a str {
        self.record.get(col).unwrap_or("")
    }

    // Empty, unparsable and non-finite cells all count as missing.
    pub fn number(&self, col: usize) -> Option<f64> {
        self.text(col).parse::<f64>().ok().filter(|v| v.is_finite())
    }

    // None for a blank date cell.
    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }
}

impl GameTable {
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = GameRow<'_>> + '_ {
        self.records
            .iter()
            .zip(&self.dates)
            .map(|(record, date)| GameRow { record, date: *date })
    }
}

// Picks the first CSV in the directory. Sorted so the choice doesn't depend on
// directory iteration order.
pub fn find_dataset_file(dir: &Path) -> Result<PathBuf> {
    let io_err = |source| PipelineError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut csv_files = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        let is_csv = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if path.is_file() && is_csv {
            csv_files.push(path);
        }
    }
    csv_files.sort();

    info!("Found {} CSV files in {}: {:?}", csv_files.len(), dir.display(), csv_files);

    csv_files
        .into_iter()
        .next()
        .ok_or_else(|| PipelineError::NoCsvFiles { dir: dir.to_path_buf() })
}

pub fn load_data(path: &Path, ctx: &ProcessingContext) -> Result<GameTable> {
    info!("Loading data from: {}", path.display());

    let file = File::open(path).map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let table = load_data_from_reader(file, path, ctx)?;

    info!(
        "Dataset loaded with {} rows and {} columns",
        table.len(),
        table.headers.len()
    );
    info!("Columns: {:?}", table.headers);

    Ok(table)
}

/// Reads a whole table from any reader. `source` only labels errors.
///
/// Rows may be ragged; short rows read as empty cells. A blank date cell leaves
/// that row undated, while unparsable date text fails the load. If no header
/// resolves to a date, consecutive daily dates starting at
/// `ctx.synthetic_date_start` are appended as a `Date` column so downstream
/// transforms can still resolve it.
pub fn load_data_from_reader<R: Read>(
    rdr: R,
    source: &Path,
    ctx: &ProcessingContext,
) -> Result<GameTable> {
    let csv_err = |source_err| PipelineError::Csv {
        path: source.to_path_buf(),
        source: source_err,
    };

    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(rdr);

    let mut headers: Vec<String> = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(str::to_string)
        .collect();

    let mut records = Vec::new();
    for result in reader.records() {
        records.push(result.map_err(csv_err)?);
    }

    let dates = match column_resolver::resolve(&headers, DATE) {
        Some(col) => parse_date_column(&records, col)?,
        None => {
            warn!("No date column found, creating synthetic dates");
            let dates = synthetic_dates(ctx.synthetic_date_start, records.len());
            headers.push(DATE.to_string());
            for (record, date) in records.iter_mut().zip(&dates) {
                // Pad ragged rows so the appended cell lands under the new header.
                while record.len() < headers.len() - 1 {
                    record.push_field("");
                }
                record.push_field(&date.format("%Y-%m-%d").to_string());
            }
            dates.into_iter().map(Some).collect()
        }
    };

    Ok(GameTable { headers, records, dates })
}

fn parse_date_column(records: &[StringRecord], col: usize) -> Result<Vec<Option<NaiveDate>>> {
    let mut dates = Vec::with_capacity(records.len());
    let mut blanks = 0;

    for (row, record) in records.iter().enumerate() {
        let raw = record.get(col).unwrap_or("").trim();
        if raw.is_empty() {
            blanks += 1;
            dates.push(None);
            continue;
        }

        let date = parse_date(raw).ok_or_else(|| PipelineError::InvalidDate {
            row: row + 1,
            value: raw.to_string(),
        })?;
        dates.push(Some(date));
    }

    if blanks > 0 {
        warn!("{} rows have no date", blanks);
    }

    Ok(dates)
}

fn synthetic_dates(start: NaiveDate, count: usize) -> Vec<NaiveDate> {
    start.iter_days().take(count).collect()
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(date);
        }
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.date_naive());
    }

    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|ts| ts.date())
}

#[cfg(test)]
pub(crate) fn table_from_csv(text: &str) -> GameTable {
    load_data_from_reader(
        text.as_bytes(),
        Path::new("test.csv"),
        &ProcessingContext::default(),
    )
    .expect("test CSV should load")
}
