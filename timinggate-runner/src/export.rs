//! Export of batch results: CSV for spreadsheets, JSONL for pipelines.
//!
//! The writers take any `io::Write`; the `export_*` helpers add buffering and
//! create parent directories.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use thiserror::Error;

use timinggate_core::PriceBar;

use crate::batch::TickerSignal;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

const CSV_HEADER: [&str; 12] = [
    "ticker",
    "as_of",
    "horizon",
    "model_version",
    "signal",
    "confidence",
    "triggers",
    "risk_flags",
    "target_low",
    "target_high",
    "target_basis",
    "reason",
];

fn opt_num(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// One CSV row per signal. List fields are joined with `|`.
pub fn write_signals_csv<W: Write>(
    writer: W,
    signals: &[TickerSignal],
) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(CSV_HEADER)?;

    for s in signals {
        let target = s.target.as_ref();
        wtr.write_record([
            s.ticker.clone(),
            s.as_of.map(|d| d.to_string()).unwrap_or_default(),
            s.horizon.to_string(),
            s.model_version.clone(),
            s.signal.to_string(),
            format!("{:.4}", s.confidence),
            s.triggers.join("|"),
            s.risk_flags.join("|"),
            opt_num(target.map(|t| t.low)),
            opt_num(target.map(|t| t.high)),
            target.map(|t| t.basis.clone()).unwrap_or_default(),
            s.reason.as_ref().map(|r| r.to_string()).unwrap_or_default(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// One JSON object per line.
pub fn write_signals_jsonl<W: Write>(
    mut writer: W,
    signals: &[TickerSignal],
) -> Result<(), ExportError> {
    for s in signals {
        serde_json::to_writer(&mut writer, s)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

/// Price bars in the loader's single-ticker format.
pub fn write_bars_csv<W: Write>(writer: W, bars: &[PriceBar]) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["date", "open", "high", "low", "close", "volume"])?;
    for b in bars {
        wtr.write_record([
            b.date.to_string(),
            b.open.to_string(),
            b.high.to_string(),
            b.low.to_string(),
            b.close.to_string(),
            b.volume.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

fn create(path: &Path) -> Result<BufWriter<File>, ExportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(BufWriter::new(File::create(path)?))
}

/// Write bars to a CSV file at `path`.
pub fn export_bars(path: &Path, bars: &[PriceBar]) -> Result<(), ExportError> {
    write_bars_csv(create(path)?, bars)?;
    tracing::info!(path = %path.display(), bars = bars.len(), "exported bars");
    Ok(())
}

/// Write signals to `path`; `.jsonl` / `.json` produce JSONL, anything else CSV.
pub fn export_signals(path: &Path, signals: &[TickerSignal]) -> Result<(), ExportError> {
    let jsonl = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("jsonl") || ext.eq_ignore_ascii_case("json"));

    let writer = create(path)?;
    if jsonl {
        write_signals_jsonl(writer, signals)?;
    } else {
        write_signals_csv(writer, signals)?;
    }
    tracing::info!(path = %path.display(), rows = signals.len(), "exported signals");
    Ok(())
}
