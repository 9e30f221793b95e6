//! Named dynamic array of tagged scalar values.
//!
//! Reads are total: a negative index addresses from the end, and anything
//! out of range or of the wrong variant comes back as that type's zero.
//! Mutators return `&mut Self` so construction chains.

use crate::domain::signal::{ColumnEvent, SignalHub};
use crate::domain::value::{EpochTime, Value};

#[derive(Debug, Clone, Default)]
pub struct Column {
    name: String,
    values: Vec<Value>,
    signals: SignalHub,
}

impl Column {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            values: Vec::new(),
            signals: SignalHub::new(),
        }
    }

    pub fn with_values(name: &str, values: Vec<Value>) -> Self {
        Self {
            name: name.to_string(),
            values,
            signals: SignalHub::new(),
        }
    }

    pub fn floats(name: &str, values: &[f64]) -> Self {
        Self::with_values(name, values.iter().map(|&v| Value::Float(v)).collect())
    }

    pub fn ints(name: &str, values: &[i64]) -> Self {
        Self::with_values(name, values.iter().map(|&v| Value::Int(v)).collect())
    }

    pub fn texts(name: &str, values: &[&str]) -> Self {
        Self::with_values(name, values.iter().map(|&v| Value::from(v)).collect())
    }

    pub fn times(name: &str, values: &[EpochTime]) -> Self {
        Self::with_values(name, values.iter().map(|&v| Value::Time(v)).collect())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename and notify subscribers.
    pub fn set_name(&mut self, name: &str) -> &mut Self {
        if name != self.name {
            let from = std::mem::replace(&mut self.name, name.to_string());
            self.signals.emit(ColumnEvent::Renamed {
                from,
                to: name.to_string(),
            });
        }
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn signals(&self) -> &SignalHub {
        &self.signals
    }

    pub fn signals_mut(&mut self) -> &mut SignalHub {
        &mut self.signals
    }

    /// Resolve a possibly-negative index. -1 is the last row.
    fn resolve(&self, i: isize) -> Option<usize> {
        let len = self.values.len() as isize;
        let i = if i < 0 { len + i } else { i };
        if i < 0 || i >= len {
            None
        } else {
            Some(i as usize)
        }
    }

    pub fn value(&self, i: isize) -> Option<&Value> {
        self.resolve(i).map(|i| &self.values[i])
    }

    pub fn float(&self, i: isize) -> f64 {
        self.value(i).map_or(0.0, Value::float)
    }

    pub fn int(&self, i: isize) -> i64 {
        self.value(i).map_or(0, Value::int)
    }

    pub fn text(&self, i: isize) -> String {
        self.value(i).map_or_else(String::new, |v| v.text().to_string())
    }

    pub fn time(&self, i: isize) -> EpochTime {
        self.value(i).map_or(EpochTime(0), Value::time)
    }

    pub fn push(&mut self, value: impl Into<Value>) -> &mut Self {
        self.values.push(value.into());
        self.emit_resized();
        self
    }

    pub fn pop(&mut self) -> Option<Value> {
        let popped = self.values.pop();
        if popped.is_some() {
            self.emit_resized();
        }
        popped
    }

    /// Overwrite the row at `i`. Out-of-range indices are ignored.
    pub fn set_value(&mut self, i: isize, value: impl Into<Value>) -> &mut Self {
        if let Some(i) = self.resolve(i) {
            self.values[i] = value.into();
        }
        self
    }

    /// Splice a value in before row `i`. `i == len` appends.
    pub fn insert(&mut self, i: usize, value: impl Into<Value>) -> &mut Self {
        if i <= self.values.len() {
            self.values.insert(i, value.into());
            self.emit_resized();
        }
        self
    }

    pub fn remove(&mut self, i: isize) -> &mut Self {
        if let Some(i) = self.resolve(i) {
            self.values.remove(i);
            self.emit_resized();
        }
        self
    }

    /// Remove `count` rows starting at `start`. A negative `count` means
    /// everything through the end; out-of-range bounds clamp.
    pub fn remove_range(&mut self, start: isize, count: isize) -> &mut Self {
        let (start, end) = match self.clamp_range(start, count) {
            Some(bounds) => bounds,
            None => return self,
        };
        self.values.drain(start..end);
        self.emit_resized();
        self
    }

    fn clamp_range(&self, start: isize, count: isize) -> Option<(usize, usize)> {
        let len = self.values.len() as isize;
        let start = if start < 0 { len + start } else { start };
        let start = start.clamp(0, len);
        let end = if count < 0 {
            len
        } else {
            (start + count).min(len)
        };
        if start >= end {
            None
        } else {
            Some((start as usize, end as usize))
        }
    }

    /// Deep copy with a fresh, empty subscription hub.
    pub fn copy(&self) -> Column {
        Column::with_values(&self.name, self.values.clone())
    }

    /// Deep copy of a row range, same clamping rules as [`remove_range`].
    ///
    /// [`remove_range`]: Column::remove_range
    pub fn copy_range(&self, start: isize, count: isize) -> Column {
        match self.clamp_range(start, count) {
            Some((start, end)) => Column::with_values(&self.name, self.values[start..end].to_vec()),
            None => Column::new(&self.name),
        }
    }

    pub fn reverse(&mut self) -> &mut Self {
        self.values.reverse();
        self
    }

    /// Keep only rows the predicate accepts.
    pub fn filter(&mut self, mut pred: impl FnMut(usize, &Value) -> bool) -> &mut Self {
        let before = self.values.len();
        let mut i = 0;
        self.values.retain(|v| {
            let keep = pred(i, v);
            i += 1;
            keep
        });
        if self.values.len() != before {
            self.emit_resized();
        }
        self
    }

    pub fn map(&mut self, mut f: impl FnMut(usize, &Value) -> Value) -> &mut Self {
        for i in 0..self.values.len() {
            self.values[i] = f(i, &self.values[i]);
        }
        self
    }

    /// Like [`map`] but visits rows last to first, so each row still sees
    /// the original values of the rows before it.
    ///
    /// [`map`]: Column::map
    pub fn map_reverse(&mut self, mut f: impl FnMut(usize, &Value) -> Value) -> &mut Self {
        for i in (0..self.values.len()).rev() {
            self.values[i] = f(i, &self.values[i]);
        }
        self
    }

    /// Move every value by `periods` rows (positive toward later rows),
    /// backfilling vacated rows with `fill`. Length is unchanged.
    pub fn shift(&mut self, periods: isize, fill: Value) -> &mut Self {
        let len = self.values.len() as isize;
        if periods == 0 || len == 0 {
            return self;
        }
        if periods.unsigned_abs() as isize >= len {
            for v in &mut self.values {
                *v = fill.clone();
            }
            return self;
        }
        let n = periods.unsigned_abs();
        if periods > 0 {
            self.values.truncate(self.values.len() - n);
            for _ in 0..n {
                self.values.insert(0, fill.clone());
            }
        } else {
            self.values.drain(..n);
            for _ in 0..n {
                self.values.push(fill.clone());
            }
        }
        self
    }

    pub(crate) fn replace_values(&mut self, values: Vec<Value>) {
        let resized = values.len() != self.values.len();
        self.values = values;
        if resized {
            self.emit_resized();
        }
    }

    fn emit_resized(&mut self) {
        let len = self.values.len();
        self.signals.emit(ColumnEvent::Resized(len));
    }
}
