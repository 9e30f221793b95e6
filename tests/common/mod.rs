#![allow(dead_code)]

use candlesim::domain::frame::Frame;
use candlesim::domain::value::EpochTime;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Nine daily closes with one full swing and a breakout at the end.
pub const CLOSES: [f64; 9] = [1.15, 1.2, 1.25, 1.1, 1.15, 1.2, 1.25, 1.1, 1.3];

pub fn day(d: u32) -> EpochTime {
    EpochTime::from_date(NaiveDate::from_ymd_opt(2022, 1, d).unwrap())
}

pub fn sample_frame(symbol: &str) -> Frame {
    let mut frame = Frame::candles(symbol);
    for (i, &close) in CLOSES.iter().enumerate() {
        frame
            .push_candle(day(i as u32 + 1), 1.1, close + 0.1, close - 0.1, close, 100)
            .unwrap();
    }
    frame
}

/// The same nine candles as [`sample_frame`], on disk.
pub fn write_sample_csv() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("prices.csv");

    let mut content = String::from("date,open,high,low,close,volume\n");
    for (i, &close) in CLOSES.iter().enumerate() {
        content.push_str(&format!(
            "2022-01-{:02},1.1,{},{},{},100\n",
            i + 1,
            close + 0.1,
            close - 0.1,
            close,
        ));
    }
    fs::write(&path, content).unwrap();
    (dir, path)
}

pub fn write_config(content: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.ini");
    fs::write(&path, content).unwrap();
    (dir, path)
}
