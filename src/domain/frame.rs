//! A named collection of row-aligned columns.
//!
//! Columns are either plain or indexed by [`EpochTime`]; a frame's indexed
//! columns share one key domain, so `key_at` may assert cross-column
//! agreement. The frame subscribes to each column's rename events and
//! re-keys its name lookup when it next syncs, which every mutating entry
//! point does first.

use crate::domain::column::Column;
use crate::domain::error::SimError;
use crate::domain::indexed::IndexedColumn;
use crate::domain::signal::{ColumnEvent, EventKind, SubscriberId};
use crate::domain::value::{EpochTime, Value};
use std::collections::HashMap;

pub const DATE: &str = "Date";
pub const OPEN: &str = "Open";
pub const HIGH: &str = "High";
pub const LOW: &str = "Low";
pub const CLOSE: &str = "Close";
pub const VOLUME: &str = "Volume";

#[derive(Debug, Clone)]
pub enum FrameColumn {
    Plain(Column),
    Indexed(IndexedColumn<EpochTime>),
}

impl FrameColumn {
    pub fn name(&self) -> &str {
        match self {
            FrameColumn::Plain(c) => c.name(),
            FrameColumn::Indexed(c) => c.name(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            FrameColumn::Plain(c) => c.len(),
            FrameColumn::Indexed(c) => c.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn set_name(&mut self, name: &str) {
        match self {
            FrameColumn::Plain(c) => {
                c.set_name(name);
            }
            FrameColumn::Indexed(c) => {
                c.set_name(name);
            }
        }
    }

    pub fn float(&self, i: isize) -> f64 {
        match self {
            FrameColumn::Plain(c) => c.float(i),
            FrameColumn::Indexed(c) => c.column().float(i),
        }
    }

    pub fn int(&self, i: isize) -> i64 {
        match self {
            FrameColumn::Plain(c) => c.int(i),
            FrameColumn::Indexed(c) => c.column().int(i),
        }
    }

    pub fn text(&self, i: isize) -> String {
        match self {
            FrameColumn::Plain(c) => c.text(i),
            FrameColumn::Indexed(c) => c.column().text(i),
        }
    }

    pub fn time(&self, i: isize) -> EpochTime {
        match self {
            FrameColumn::Plain(c) => c.time(i),
            FrameColumn::Indexed(c) => c.column().time(i),
        }
    }

    pub fn as_plain(&self) -> Option<&Column> {
        match self {
            FrameColumn::Plain(c) => Some(c),
            FrameColumn::Indexed(_) => None,
        }
    }

    pub fn as_indexed(&self) -> Option<&IndexedColumn<EpochTime>> {
        match self {
            FrameColumn::Plain(_) => None,
            FrameColumn::Indexed(c) => Some(c),
        }
    }

    pub fn as_indexed_mut(&mut self) -> Option<&mut IndexedColumn<EpochTime>> {
        match self {
            FrameColumn::Plain(_) => None,
            FrameColumn::Indexed(c) => Some(c),
        }
    }

    fn copy(&self) -> FrameColumn {
        match self {
            FrameColumn::Plain(c) => FrameColumn::Plain(c.copy()),
            FrameColumn::Indexed(c) => FrameColumn::Indexed(c.copy()),
        }
    }

    fn copy_range(&self, start: isize, count: isize) -> FrameColumn {
        match self {
            FrameColumn::Plain(c) => FrameColumn::Plain(c.copy_range(start, count)),
            FrameColumn::Indexed(c) => FrameColumn::Indexed(c.copy_range(start, count)),
        }
    }

    fn signals_mut(&mut self) -> &mut crate::domain::signal::SignalHub {
        match self {
            FrameColumn::Plain(c) => c.signals_mut(),
            FrameColumn::Indexed(c) => c.signals_mut(),
        }
    }
}

impl From<Column> for FrameColumn {
    fn from(c: Column) -> Self {
        FrameColumn::Plain(c)
    }
}

impl From<IndexedColumn<EpochTime>> for FrameColumn {
    fn from(c: IndexedColumn<EpochTime>) -> Self {
        FrameColumn::Indexed(c)
    }
}

#[derive(Debug)]
pub struct Frame {
    name: String,
    columns: Vec<FrameColumn>,
    by_name: HashMap<String, usize>,
    id: SubscriberId,
}

impl Frame {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            columns: Vec::new(),
            by_name: HashMap::new(),
            id: SubscriberId::next(),
        }
    }

    /// An empty OHLCV frame: five time-indexed series, dates as keys.
    pub fn candles(name: &str) -> Self {
        let mut frame = Self::new(name);
        for col_name in [OPEN, HIGH, LOW, CLOSE, VOLUME] {
            // names are distinct, push cannot fail here
            let _ = frame.push_series(IndexedColumn::<EpochTime>::new(col_name));
        }
        frame
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: &str) -> &mut Self {
        self.name = name.to_string();
        self
    }

    /// Number of rows: the longest column. Columns may diverge transiently
    /// while a frame is being built up.
    pub fn len(&self) -> usize {
        self.columns.iter().map(FrameColumn::len).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(FrameColumn::name).collect()
    }

    /// Apply pending column rename events to the name lookup.
    pub fn sync(&mut self) -> &mut Self {
        let id = self.id;
        for idx in 0..self.columns.len() {
            for delivery in self.columns[idx].signals_mut().drain(id) {
                if let ColumnEvent::Renamed { from, to } = delivery.event {
                    if self.by_name.get(&from) == Some(&idx) {
                        self.by_name.remove(&from);
                        self.by_name.insert(to, idx);
                    }
                }
            }
        }
        self
    }

    pub fn push_series(&mut self, column: impl Into<FrameColumn>) -> Result<&mut Self, SimError> {
        self.sync();
        let mut column = column.into();
        let name = column.name().to_string();
        if self.by_name.contains_key(&name) {
            return Err(SimError::DuplicateColumn { name });
        }
        column
            .signals_mut()
            .connect(EventKind::Renamed, self.id, Some(self.name.clone()));
        self.by_name.insert(name, self.columns.len());
        self.columns.push(column);
        Ok(self)
    }

    /// Removing an unknown series is a no-op.
    pub fn remove_series(&mut self, name: &str) -> &mut Self {
        self.sync();
        if let Some(idx) = self.by_name.remove(name) {
            let mut removed = self.columns.remove(idx);
            removed.signals_mut().disconnect(EventKind::Renamed, self.id);
            self.by_name = self
                .columns
                .iter()
                .enumerate()
                .map(|(i, c)| (c.name().to_string(), i))
                .collect();
        }
        self
    }

    pub fn series(&self, name: &str) -> Option<&FrameColumn> {
        self.by_name.get(name).map(|&i| &self.columns[i])
    }

    pub fn series_mut(&mut self, name: &str) -> Option<&mut FrameColumn> {
        self.sync();
        self.by_name.get(name).map(|&i| &mut self.columns[i])
    }

    pub fn float(&self, name: &str, i: isize) -> f64 {
        self.series(name).map_or(0.0, |c| c.float(i))
    }

    pub fn int(&self, name: &str, i: isize) -> i64 {
        self.series(name).map_or(0, |c| c.int(i))
    }

    pub fn text(&self, name: &str, i: isize) -> String {
        self.series(name).map_or_else(String::new, |c| c.text(i))
    }

    pub fn time(&self, name: &str, i: isize) -> EpochTime {
        self.series(name).map_or(EpochTime(0), |c| c.time(i))
    }

    /// Append to a plain series.
    pub fn push_value(&mut self, name: &str, value: impl Into<Value>) -> Result<&mut Self, SimError> {
        self.sync();
        match self.by_name.get(name).map(|&i| &mut self.columns[i]) {
            Some(FrameColumn::Plain(c)) => {
                c.push(value);
                Ok(self)
            }
            _ => Err(SimError::UnknownColumn {
                name: name.to_string(),
            }),
        }
    }

    /// Insert into a time-indexed series at `key`.
    pub fn insert_value(
        &mut self,
        name: &str,
        key: EpochTime,
        value: impl Into<Value>,
    ) -> Result<&mut Self, SimError> {
        self.sync();
        match self.by_name.get(name).map(|&i| &mut self.columns[i]) {
            Some(FrameColumn::Indexed(c)) => {
                c.insert(key, value);
                Ok(self)
            }
            _ => Err(SimError::UnknownColumn {
                name: name.to_string(),
            }),
        }
    }

    /// Append one OHLCV bar keyed by `time`. Requires the candle columns.
    pub fn push_candle(
        &mut self,
        time: EpochTime,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: i64,
    ) -> Result<&mut Self, SimError> {
        self.insert_value(OPEN, time, open)?;
        self.insert_value(HIGH, time, high)?;
        self.insert_value(LOW, time, low)?;
        self.insert_value(CLOSE, time, close)?;
        self.insert_value(VOLUME, time, volume)?;
        Ok(self)
    }

    pub fn open(&self, i: isize) -> f64 {
        self.float(OPEN, i)
    }

    pub fn high(&self, i: isize) -> f64 {
        self.float(HIGH, i)
    }

    pub fn low(&self, i: isize) -> f64 {
        self.float(LOW, i)
    }

    pub fn close(&self, i: isize) -> f64 {
        self.float(CLOSE, i)
    }

    pub fn volume(&self, i: isize) -> i64 {
        self.int(VOLUME, i)
    }

    /// Bar timestamp for a row: the shared key of the indexed columns, or
    /// the Date column for plain frames.
    pub fn date(&self, i: isize) -> EpochTime {
        let len = self.len() as isize;
        let row = if i < 0 { len + i } else { i };
        if row < 0 || row >= len {
            return EpochTime(0);
        }
        match self.key_at(row as usize) {
            Some(key) => key,
            None => self.time(DATE, row),
        }
    }

    /// The key every indexed column agrees on for `row`.
    ///
    /// Panics if two indexed columns disagree: that means the frame's
    /// internal alignment has been broken and no result would be
    /// trustworthy.
    pub fn key_at(&self, row: usize) -> Option<EpochTime> {
        let mut agreed: Option<EpochTime> = None;
        for column in &self.columns {
            if let FrameColumn::Indexed(c) = column {
                if let Some(key) = c.key_at(row) {
                    if let Some(prev) = agreed {
                        assert_eq!(
                            prev,
                            key,
                            "frame {}: indexed columns disagree at row {row}",
                            self.name
                        );
                    }
                    agreed = Some(key);
                }
            }
        }
        agreed
    }

    /// Non-owning view over a subset of columns. Unknown names are skipped.
    pub fn select(&self, names: &[&str]) -> FrameView<'_> {
        FrameView {
            name: &self.name,
            columns: names.iter().filter_map(|n| self.series(n)).collect(),
        }
    }

    /// Independent deep copy. The copy has its own subscriptions.
    pub fn copy(&self) -> Frame {
        let mut out = Frame::new(&self.name);
        for column in &self.columns {
            // names are already unique in self
            let _ = out.push_series(column.copy());
        }
        out
    }

    /// Deep copy of a row range, clamped like column ranges.
    pub fn copy_range(&self, start: isize, count: isize) -> Frame {
        let mut out = Frame::new(&self.name);
        for column in &self.columns {
            let _ = out.push_series(column.copy_range(start, count));
        }
        out
    }
}

/// Borrowed view over selected columns of a frame.
#[derive(Debug)]
pub struct FrameView<'a> {
    name: &'a str,
    columns: Vec<&'a FrameColumn>,
}

impl<'a> FrameView<'a> {
    pub fn name(&self) -> &str {
        self.name
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn len(&self) -> usize {
        self.columns.iter().map(|c| c.len()).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn series(&self, name: &str) -> Option<&'a FrameColumn> {
        self.columns.iter().find(|c| c.name() == name).copied()
    }

    pub fn float(&self, name: &str, i: isize) -> f64 {
        self.series(name).map_or(0.0, |c| c.float(i))
    }

    pub fn int(&self, name: &str, i: isize) -> i64 {
        self.series(name).map_or(0, |c| c.int(i))
    }
}
