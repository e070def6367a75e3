//! PriceTable: columnar, date-ascending price/volume series for one ticker.
//!
//! The engine reads columns, not rows: every indicator is a pass over one
//! column. A column the caller never supplied is `None`, which the engine
//! reports as `missing:<column>`; individual missing observations are `NaN`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::bar::{BarError, PriceBar};

/// The five value columns of a price table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Column {
    Open,
    High,
    Low,
    Close,
    Volume,
}

impl Column {
    /// All columns in the order the engine checks them.
    pub const ALL: [Column; 5] = [
        Column::Open,
        Column::High,
        Column::Low,
        Column::Close,
        Column::Volume,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Column::Open => "open",
            Column::High => "high",
            Column::Low => "low",
            Column::Close => "close",
            Column::Volume => "volume",
        }
    }

    /// Parse a header name (case-insensitive, surrounding whitespace ignored).
    pub fn from_header(name: &str) -> Option<Column> {
        let lowered = name.trim().to_ascii_lowercase();
        Column::ALL.into_iter().find(|c| c.as_str() == lowered)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPriceTable")]
pub struct PriceTable {
    dates: Vec<NaiveDate>,
    open: Option<Vec<f64>>,
    high: Option<Vec<f64>>,
    low: Option<Vec<f64>>,
    close: Option<Vec<f64>>,
    volume: Option<Vec<f64>>,
}

/// Wire shape of a table; validated through `PriceTable::from_columns`.
#[derive(Deserialize)]
struct RawPriceTable {
    dates: Vec<NaiveDate>,
    #[serde(default)]
    open: Option<Vec<f64>>,
    #[serde(default)]
    high: Option<Vec<f64>>,
    #[serde(default)]
    low: Option<Vec<f64>>,
    #[serde(default)]
    close: Option<Vec<f64>>,
    #[serde(default)]
    volume: Option<Vec<f64>>,
}

impl TryFrom<RawPriceTable> for PriceTable {
    type Error = BarError;

    fn try_from(raw: RawPriceTable) -> Result<Self, Self::Error> {
        PriceTable::from_columns(raw.dates, raw.open, raw.high, raw.low, raw.close, raw.volume)
    }
}

impl PriceTable {
    /// Build a table from bars. Bars are sorted by date; duplicate dates are rejected.
    pub fn from_bars(mut bars: Vec<PriceBar>) -> Result<Self, BarError> {
        bars.sort_by_key(|b| b.date);
        for pair in bars.windows(2) {
            if pair[0].date == pair[1].date {
                return Err(BarError::DuplicateDate(pair[1].date));
            }
        }

        let n = bars.len();
        let mut table = PriceTable {
            dates: Vec::with_capacity(n),
            open: Some(Vec::with_capacity(n)),
            high: Some(Vec::with_capacity(n)),
            low: Some(Vec::with_capacity(n)),
            close: Some(Vec::with_capacity(n)),
            volume: Some(Vec::with_capacity(n)),
        };
        for bar in bars {
            table.dates.push(bar.date);
            push(&mut table.open, bar.open);
            push(&mut table.high, bar.high);
            push(&mut table.low, bar.low);
            push(&mut table.close, bar.close);
            push(&mut table.volume, bar.volume);
        }
        Ok(table)
    }

    /// Build a table from columns. Dates must already be strictly ascending and
    /// every present column must match the date count.
    pub fn from_columns(
        dates: Vec<NaiveDate>,
        open: Option<Vec<f64>>,
        high: Option<Vec<f64>>,
        low: Option<Vec<f64>>,
        close: Option<Vec<f64>>,
        volume: Option<Vec<f64>>,
    ) -> Result<Self, BarError> {
        for (i, pair) in dates.windows(2).enumerate() {
            if pair[0] == pair[1] {
                return Err(BarError::DuplicateDate(pair[1]));
            }
            if pair[0] > pair[1] {
                return Err(BarError::Unsorted {
                    index: i + 1,
                    date: pair[1],
                });
            }
        }

        let table = PriceTable {
            dates,
            open,
            high,
            low,
            close,
            volume,
        };
        for column in Column::ALL {
            if let Some(values) = table.column(column) {
                if values.len() != table.dates.len() {
                    return Err(BarError::LengthMismatch {
                        column: column.to_string(),
                        expected: table.dates.len(),
                        actual: values.len(),
                    });
                }
            }
        }
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// Borrow a column, or `None` if the caller never supplied it.
    pub fn column(&self, column: Column) -> Option<&[f64]> {
        let values = match column {
            Column::Open => &self.open,
            Column::High => &self.high,
            Column::Low => &self.low,
            Column::Close => &self.close,
            Column::Volume => &self.volume,
        };
        values.as_deref()
    }

    /// First absent column in `Column::ALL` order.
    pub fn first_missing_column(&self) -> Option<Column> {
        Column::ALL.into_iter().find(|c| self.column(*c).is_none())
    }

    /// True if at least one close is a finite number.
    pub fn has_observations(&self) -> bool {
        self.column(Column::Close)
            .map(|closes| closes.iter().any(|c| c.is_finite()))
            .unwrap_or(false)
    }

    /// Copy of the first `n` rows (clamped to the table length).
    pub fn truncate(&self, n: usize) -> PriceTable {
        let n = n.min(self.len());
        let head = |col: &Option<Vec<f64>>| col.as_ref().map(|v| v[..n].to_vec());
        PriceTable {
            dates: self.dates[..n].to_vec(),
            open: head(&self.open),
            high: head(&self.high),
            low: head(&self.low),
            close: head(&self.close),
            volume: head(&self.volume),
        }
    }

    /// Row view at `index`, if every column is present.
    pub fn bar(&self, index: usize) -> Option<PriceBar> {
        Some(PriceBar {
            date: *self.dates.get(index)?,
            open: *self.column(Column::Open)?.get(index)?,
            high: *self.column(Column::High)?.get(index)?,
            low: *self.column(Column::Low)?.get(index)?,
            close: *self.column(Column::Close)?.get(index)?,
            volume: *self.column(Column::Volume)?.get(index)?,
        })
    }

    /// Row views for every index; empty if any column is absent.
    pub fn bars(&self) -> Vec<PriceBar> {
        (0..self.len()).map_while(|i| self.bar(i)).collect()
    }
}

fn push(column: &mut Option<Vec<f64>>, value: f64) {
    if let Some(values) = column.as_mut() {
        values.push(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn bar(day: u32, close: f64) -> PriceBar {
        PriceBar {
            date: date(day),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1000.0,
        }
    }

    #[test]
    fn from_bars_sorts_by_date() {
        let table = PriceTable::from_bars(vec![bar(3, 12.0), bar(1, 10.0), bar(2, 11.0)]).unwrap();
        assert_eq!(table.dates(), &[date(1), date(2), date(3)]);
        assert_eq!(table.column(Column::Close).unwrap(), &[10.0, 11.0, 12.0]);
    }

    #[test]
    fn from_bars_rejects_duplicate_dates() {
        let err = PriceTable::from_bars(vec![bar(1, 10.0), bar(1, 11.0)]).unwrap_err();
        assert_eq!(err, BarError::DuplicateDate(date(1)));
    }

    #[test]
    fn from_columns_rejects_length_mismatch() {
        let err = PriceTable::from_columns(
            vec![date(1), date(2)],
            None,
            None,
            None,
            Some(vec![10.0]),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, BarError::LengthMismatch { ref column, .. } if column == "close"));
    }

    #[test]
    fn from_columns_rejects_unsorted_dates() {
        let err = PriceTable::from_columns(vec![date(2), date(1)], None, None, None, None, None)
            .unwrap_err();
        assert_eq!(
            err,
            BarError::Unsorted {
                index: 1,
                date: date(1)
            }
        );
    }

    #[test]
    fn missing_column_reported_in_check_order() {
        let table = PriceTable::from_columns(
            vec![date(1)],
            Some(vec![1.0]),
            Some(vec![1.0]),
            None,
            Some(vec![1.0]),
            None,
        )
        .unwrap();
        assert_eq!(table.first_missing_column(), Some(Column::Low));
    }

    #[test]
    fn has_observations_ignores_nan() {
        let table = PriceTable::from_columns(
            vec![date(1), date(2)],
            None,
            None,
            None,
            Some(vec![f64::NAN, f64::NAN]),
            None,
        )
        .unwrap();
        assert!(!table.has_observations());
    }

    #[test]
    fn truncate_keeps_prefix() {
        let table =
            PriceTable::from_bars(vec![bar(1, 10.0), bar(2, 11.0), bar(3, 12.0)]).unwrap();
        let head = table.truncate(2);
        assert_eq!(head.len(), 2);
        assert_eq!(head.last_date(), Some(date(2)));
        assert_eq!(head.column(Column::Close).unwrap(), &[10.0, 11.0]);
        assert_eq!(table.truncate(10).len(), 3);
    }

    #[test]
    fn column_from_header_is_case_insensitive() {
        assert_eq!(Column::from_header(" Close "), Some(Column::Close));
        assert_eq!(Column::from_header("VOLUME"), Some(Column::Volume));
        assert_eq!(Column::from_header("adj_close"), None);
    }

    #[test]
    fn bars_roundtrip_rows() {
        let bars = vec![bar(1, 10.0), bar(2, 11.0)];
        let table = PriceTable::from_bars(bars.clone()).unwrap();
        assert_eq!(table.bars(), bars);
    }

    #[test]
    fn deserialize_rejects_length_mismatch() {
        let json = r#"{
            "dates": ["2024-01-01", "2024-01-02", "2024-01-03"],
            "open": [1.0, 1.0, 1.0],
            "high": [1.0, 1.0, 1.0],
            "low": [1.0, 1.0, 1.0],
            "close": [1.0, 1.0, 1.0],
            "volume": [1.0]
        }"#;
        let err = serde_json::from_str::<PriceTable>(json).unwrap_err();
        assert!(err.to_string().contains("'volume' has 1 values, expected 3"));
    }

    #[test]
    fn deserialize_rejects_unsorted_dates() {
        let json = r#"{"dates": ["2024-01-02", "2024-01-01"], "close": [1.0, 2.0]}"#;
        assert!(serde_json::from_str::<PriceTable>(json).is_err());
    }

    #[test]
    fn serde_roundtrip_keeps_absent_columns() {
        let table = PriceTable::from_columns(
            vec![date(1), date(2)],
            None,
            Some(vec![11.0, 12.0]),
            Some(vec![9.0, 10.0]),
            Some(vec![10.0, 11.0]),
            Some(vec![500.0, 600.0]),
        )
        .unwrap();
        let json = serde_json::to_string(&table).unwrap();
        let back: PriceTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back, table);
        assert_eq!(back.first_missing_column(), Some(Column::Open));
    }
}
