//! CSV candle data adapter.
//!
//! Reads OHLCV files into a candle [`Frame`]. Column mapping and date
//! format live in [`CsvLayout`] so feeds with different headers or
//! newest-row-first ordering load without preprocessing.

use crate::domain::engine::CandleSource;
use crate::domain::error::SimError;
use crate::domain::frame::Frame;
use crate::domain::value::EpochTime;
use chrono::NaiveDate;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct CsvLayout {
    pub date: String,
    pub open: String,
    pub high: String,
    pub low: String,
    pub close: String,
    pub volume: String,
    pub date_format: String,
    /// True when the file stores the newest bar first.
    pub latest_first: bool,
}

impl Default for CsvLayout {
    fn default() -> Self {
        Self {
            date: "date".to_string(),
            open: "open".to_string(),
            high: "high".to_string(),
            low: "low".to_string(),
            close: "close".to_string(),
            volume: "volume".to_string(),
            date_format: "%Y-%m-%d".to_string(),
            latest_first: false,
        }
    }
}

pub struct CsvCandleAdapter {
    path: PathBuf,
    layout: CsvLayout,
}

impl CsvCandleAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            layout: CsvLayout::default(),
        }
    }

    pub fn with_layout(path: PathBuf, layout: CsvLayout) -> Self {
        Self { path, layout }
    }

    pub fn read(&self, name: &str) -> Result<Frame, SimError> {
        let mut rdr = csv::Reader::from_path(&self.path).map_err(|e| SimError::Csv {
            reason: format!("failed to open {}: {}", self.path.display(), e),
        })?;

        let headers = rdr
            .headers()
            .map_err(|e| SimError::Csv {
                reason: format!("CSV header error: {}", e),
            })?
            .clone();
        let find = |wanted: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(wanted))
                .ok_or_else(|| SimError::CsvSchema {
                    reason: format!("missing column '{}' in {}", wanted, self.path.display()),
                })
        };
        let date_col = find(&self.layout.date)?;
        let open_col = find(&self.layout.open)?;
        let high_col = find(&self.layout.high)?;
        let low_col = find(&self.layout.low)?;
        let close_col = find(&self.layout.close)?;
        let volume_col = find(&self.layout.volume)?;

        let mut bars = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| SimError::Csv {
                reason: format!("CSV parse error: {}", e),
            })?;
            let field = |col: usize, what: &str| {
                record.get(col).map(str::trim).ok_or_else(|| SimError::Csv {
                    reason: format!("short record, missing {}", what),
                })
            };
            let number = |col: usize, what: &str| -> Result<f64, SimError> {
                field(col, what)?.parse().map_err(|e| SimError::Csv {
                    reason: format!("invalid {} value: {}", what, e),
                })
            };

            let date = NaiveDate::parse_from_str(field(date_col, "date")?, &self.layout.date_format)
                .map_err(|e| SimError::Csv {
                    reason: format!("invalid date: {}", e),
                })?;
            let volume: i64 = field(volume_col, "volume")?
                .parse()
                .map_err(|e| SimError::Csv {
                    reason: format!("invalid volume value: {}", e),
                })?;

            bars.push((
                EpochTime::from_date(date),
                number(open_col, "open")?,
                number(high_col, "high")?,
                number(low_col, "low")?,
                number(close_col, "close")?,
                volume,
            ));
        }

        if self.layout.latest_first {
            bars.reverse();
        }

        let mut frame = Frame::candles(name);
        for (time, open, high, low, close, volume) in bars {
            frame.push_candle(time, open, high, low, close, volume)?;
        }
        Ok(frame)
    }
}

impl CandleSource for CsvCandleAdapter {
    fn fetch(&mut self, symbol: &str) -> Result<Frame, SimError> {
        self.read(symbol)
    }
}
