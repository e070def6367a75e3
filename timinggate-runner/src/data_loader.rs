//! CSV loading of price tables.
//!
//! Files are header-driven: a `date` column (ISO `YYYY-MM-DD`) is required,
//! and any of `open, high, low, close, volume` may be present. An absent
//! column stays absent in the resulting `PriceTable` so the engine can report
//! it; an empty cell is a missing observation (`NaN`). Anything that cannot be
//! coerced into a bar at all is a hard `LoadError` at this boundary.
//!
//! Universe files add a `ticker` column and may interleave tickers freely.

use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::io;
use std::path::Path;
use thiserror::Error;
use timinggate_core::{BarError, Column, PriceTable};

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing required column '{0}'")]
    MissingHeader(&'static str),

    #[error("line {line}: {reason}")]
    Malformed { line: u64, reason: String },

    #[error("invalid price table: {0}")]
    Shape(#[from] BarError),
}

/// Column positions resolved from the header row.
struct Layout {
    date: usize,
    ticker: Option<usize>,
    values: [Option<usize>; 5],
}

impl Layout {
    fn from_headers(headers: &csv::StringRecord, with_ticker: bool) -> Result<Self, LoadError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };

        let date = find("date").ok_or(LoadError::MissingHeader("date"))?;
        let ticker = if with_ticker {
            Some(find("ticker").ok_or(LoadError::MissingHeader("ticker"))?)
        } else {
            None
        };

        let mut values = [None; 5];
        for (index, header) in headers.iter().enumerate() {
            if let Some(column) = Column::from_header(header) {
                values[slot(column)] = Some(index);
            }
        }
        Ok(Self {
            date,
            ticker,
            values,
        })
    }
}

fn slot(column: Column) -> usize {
    match column {
        Column::Open => 0,
        Column::High => 1,
        Column::Low => 2,
        Column::Close => 3,
        Column::Volume => 4,
    }
}

/// Rows for one table, in file order until `into_table` sorts them.
#[derive(Default)]
struct Rows {
    dates: Vec<NaiveDate>,
    values: [Vec<f64>; 5],
}

impl Rows {
    fn push(&mut self, date: NaiveDate, values: [f64; 5]) {
        self.dates.push(date);
        for (column, value) in self.values.iter_mut().zip(values) {
            column.push(value);
        }
    }

    fn into_table(self, layout: &Layout) -> Result<PriceTable, LoadError> {
        let mut order: Vec<usize> = (0..self.dates.len()).collect();
        order.sort_by_key(|&i| self.dates[i]);

        let dates = order.iter().map(|&i| self.dates[i]).collect();
        let column = |column: Column| {
            let k = slot(column);
            layout.values[k].map(|_| order.iter().map(|&i| self.values[k][i]).collect())
        };
        Ok(PriceTable::from_columns(
            dates,
            column(Column::Open),
            column(Column::High),
            column(Column::Low),
            column(Column::Close),
            column(Column::Volume),
        )?)
    }
}

fn line_of(record: &csv::StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or(0)
}

fn field<'a>(record: &'a csv::StringRecord, index: usize) -> &'a str {
    record.get(index).unwrap_or("").trim()
}

fn parse_date(record: &csv::StringRecord, index: usize) -> Result<NaiveDate, LoadError> {
    let raw = field(record, index);
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| LoadError::Malformed {
        line: line_of(record),
        reason: format!("invalid date '{raw}': {e}"),
    })
}

fn parse_values(record: &csv::StringRecord, layout: &Layout) -> Result<[f64; 5], LoadError> {
    let mut values = [f64::NAN; 5];
    for (column, index) in Column::ALL.into_iter().zip(layout.values) {
        let Some(index) = index else { continue };
        let raw = field(record, index);
        if raw.is_empty() {
            continue;
        }
        values[slot(column)] = raw.parse::<f64>().map_err(|_| LoadError::Malformed {
            line: line_of(record),
            reason: format!("invalid {column} value '{raw}'"),
        })?;
    }
    Ok(values)
}

fn reader<R: io::Read>(source: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(source)
}

/// Read a single-ticker price table from any CSV source.
pub fn read_price_csv<R: io::Read>(source: R) -> Result<PriceTable, LoadError> {
    let mut rdr = reader(source);
    let layout = Layout::from_headers(rdr.headers()?, false)?;

    let mut rows = Rows::default();
    for record in rdr.records() {
        let record = record?;
        rows.push(
            parse_date(&record, layout.date)?,
            parse_values(&record, &layout)?,
        );
    }
    let table = rows.into_table(&layout)?;
    warn_insane_bars("", &table);
    Ok(table)
}

/// Read a multi-ticker universe from any CSV source, keyed by ticker.
pub fn read_universe_csv<R: io::Read>(
    source: R,
) -> Result<BTreeMap<String, PriceTable>, LoadError> {
    let mut rdr = reader(source);
    let layout = Layout::from_headers(rdr.headers()?, true)?;
    let ticker_index = layout.ticker.ok_or(LoadError::MissingHeader("ticker"))?;

    let mut grouped: BTreeMap<String, Rows> = BTreeMap::new();
    for record in rdr.records() {
        let record = record?;
        let ticker = field(&record, ticker_index);
        if ticker.is_empty() {
            return Err(LoadError::Malformed {
                line: line_of(&record),
                reason: "empty ticker".into(),
            });
        }
        let date = parse_date(&record, layout.date)?;
        let values = parse_values(&record, &layout)?;
        grouped
            .entry(ticker.to_string())
            .or_default()
            .push(date, values);
    }

    grouped
        .into_iter()
        .map(|(ticker, rows)| {
            let table = rows.into_table(&layout)?;
            warn_insane_bars(&ticker, &table);
            Ok((ticker, table))
        })
        .collect()
}

/// Dates of fully observed bars whose OHLC relationships do not hold
/// (high below low, open or close outside the range, non-positive price,
/// negative volume). Bars with a NaN field are not reported.
pub fn insane_bar_dates(table: &PriceTable) -> Vec<NaiveDate> {
    table
        .bars()
        .into_iter()
        .filter(|bar| !bar.is_void() && !bar.is_sane())
        .map(|bar| bar.date)
        .collect()
}

fn warn_insane_bars(ticker: &str, table: &PriceTable) {
    let dates = insane_bar_dates(table);
    if let Some(first) = dates.first() {
        tracing::warn!(
            ticker,
            count = dates.len(),
            first = %first,
            "bars violate OHLC relationships"
        );
    }
}

/// Load a single-ticker price table from a CSV file.
pub fn load_price_csv(path: impl AsRef<Path>) -> Result<PriceTable, LoadError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(csv::Error::from)?;
    let table = read_price_csv(file)?;
    tracing::debug!(path = %path.display(), bars = table.len(), "loaded price table");
    Ok(table)
}

/// Load a multi-ticker universe from a CSV file.
pub fn load_universe_csv(
    path: impl AsRef<Path>,
) -> Result<BTreeMap<String, PriceTable>, LoadError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(csv::Error::from)?;
    let universe = read_universe_csv(file)?;
    tracing::debug!(path = %path.display(), tickers = universe.len(), "loaded universe");
    Ok(universe)
}

/// Deterministic BLAKE3 hash over dates and every column.
///
/// Absent columns hash differently from all-NaN columns.
pub fn dataset_hash(table: &PriceTable) -> String {
    let mut hasher = blake3::Hasher::new();
    for date in table.dates() {
        hasher.update(date.to_string().as_bytes());
    }
    for column in Column::ALL {
        hasher.update(column.as_str().as_bytes());
        match table.column(column) {
            Some(values) => {
                hasher.update(&[1]);
                for value in values {
                    hasher.update(&value.to_le_bytes());
                }
            }
            None => {
                hasher.update(&[0]);
            }
        }
    }
    hasher.finalize().to_hex().to_string()
}
