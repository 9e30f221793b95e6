//! A column whose rows are addressed by strictly-ascending unique keys.
//!
//! Key order and row order always agree: the row of a key is its rank among
//! all keys. Inserting an unseen key splices it into place (binary-search
//! lookup, linear shift), which degenerates to an append for monotonically
//! increasing keys, the common case for time-keyed data.

use crate::domain::column::Column;
use crate::domain::signal::SignalHub;
use crate::domain::value::{EpochTime, Value};
use std::collections::HashMap;
use std::hash::Hash;

#[derive(Debug, Clone, Default)]
pub struct IndexedColumn<K: Ord + Copy + Hash> {
    column: Column,
    keys: Vec<K>,
    rows: HashMap<K, usize>,
}

impl<K: Ord + Copy + Hash> IndexedColumn<K> {
    pub fn new(name: &str) -> Self {
        Self {
            column: Column::new(name),
            keys: Vec::new(),
            rows: HashMap::new(),
        }
    }

    pub fn from_pairs(name: &str, pairs: impl IntoIterator<Item = (K, Value)>) -> Self {
        let mut col = Self::new(name);
        for (key, value) in pairs {
            col.insert(key, value);
        }
        col
    }

    pub fn name(&self) -> &str {
        self.column.name()
    }

    pub fn set_name(&mut self, name: &str) -> &mut Self {
        self.column.set_name(name);
        self
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    /// Read access to the underlying values in row order.
    pub fn column(&self) -> &Column {
        &self.column
    }

    pub fn signals(&self) -> &SignalHub {
        self.column.signals()
    }

    pub fn signals_mut(&mut self) -> &mut SignalHub {
        self.column.signals_mut()
    }

    pub fn row(&self, key: K) -> Option<usize> {
        self.rows.get(&key).copied()
    }

    pub fn key_at(&self, row: usize) -> Option<K> {
        self.keys.get(row).copied()
    }

    pub fn value(&self, key: K) -> Option<&Value> {
        self.row(key).and_then(|r| self.column.value(r as isize))
    }

    pub fn float(&self, key: K) -> f64 {
        self.value(key).map_or(0.0, Value::float)
    }

    pub fn int(&self, key: K) -> i64 {
        self.value(key).map_or(0, Value::int)
    }

    /// Insert or overwrite. An existing key overwrites its row in place;
    /// a new key is spliced in at its rank.
    pub fn insert(&mut self, key: K, value: impl Into<Value>) -> &mut Self {
        match self.keys.binary_search(&key) {
            Ok(pos) => {
                self.column.set_value(pos as isize, value);
            }
            Err(pos) => {
                self.keys.insert(pos, key);
                self.column.insert(pos, value);
                for k in &self.keys[pos + 1..] {
                    if let Some(row) = self.rows.get_mut(k) {
                        *row += 1;
                    }
                }
                self.rows.insert(key, pos);
            }
        }
        self
    }

    pub fn remove(&mut self, key: K) -> Option<Value> {
        let pos = self.keys.binary_search(&key).ok()?;
        self.keys.remove(pos);
        self.rows.remove(&key);
        for k in &self.keys[pos..] {
            if let Some(row) = self.rows.get_mut(k) {
                *row -= 1;
            }
        }
        let removed = self.column.value(pos as isize).cloned();
        self.column.remove(pos as isize);
        removed
    }

    /// Remove `count` rows starting at `start`; negative `count` runs to
    /// the end and out-of-range bounds clamp.
    pub fn remove_range(&mut self, start: isize, count: isize) -> &mut Self {
        if let Some((start, end)) = clamp_range(self.keys.len(), start, count) {
            self.keys.drain(start..end);
            self.column
                .remove_range(start as isize, (end - start) as isize);
            self.rebuild_rows();
        }
        self
    }

    /// Relabel every key through `step`, leaving values where they are.
    /// `step` must preserve key order.
    pub fn shift_index(&mut self, periods: i64, step: impl Fn(K, i64) -> K) -> &mut Self {
        for key in &mut self.keys {
            *key = step(*key, periods);
        }
        self.rebuild_rows();
        self
    }

    fn rebuild_rows(&mut self) {
        self.rows = self
            .keys
            .iter()
            .enumerate()
            .map(|(row, &key)| (key, row))
            .collect();
    }

    fn join(&mut self, other: &IndexedColumn<K>, op: impl Fn(&Value, &Value) -> Option<Value>) {
        let mut updates = Vec::new();
        for (row, key) in self.keys.iter().enumerate() {
            let Some(other_row) = other.rows.get(key) else {
                continue;
            };
            let (Some(mine), Some(theirs)) = (
                self.column.value(row as isize),
                other.column.value(*other_row as isize),
            ) else {
                continue;
            };
            if let Some(combined) = op(mine, theirs) {
                updates.push((row, combined));
            }
        }
        for (row, value) in updates {
            self.column.set_value(row as isize, value);
        }
    }

    fn apply_scalar(&mut self, scalar: &Value, op: impl Fn(&Value, &Value) -> Option<Value>) {
        let mut updates = Vec::new();
        for (row, value) in self.column.values().iter().enumerate() {
            if let Some(combined) = op(value, scalar) {
                updates.push((row, combined));
            }
        }
        for (row, value) in updates {
            self.column.set_value(row as isize, value);
        }
    }

    /// Join on shared keys; rows without a partner stay untouched.
    pub fn add(&mut self, other: &IndexedColumn<K>) -> &mut Self {
        self.join(other, Value::add);
        self
    }

    pub fn sub(&mut self, other: &IndexedColumn<K>) -> &mut Self {
        self.join(other, Value::sub);
        self
    }

    pub fn mul(&mut self, other: &IndexedColumn<K>) -> &mut Self {
        self.join(other, Value::mul);
        self
    }

    pub fn div(&mut self, other: &IndexedColumn<K>) -> &mut Self {
        self.join(other, Value::div);
        self
    }

    pub fn add_scalar(&mut self, scalar: impl Into<Value>) -> &mut Self {
        self.apply_scalar(&scalar.into(), Value::add);
        self
    }

    pub fn sub_scalar(&mut self, scalar: impl Into<Value>) -> &mut Self {
        self.apply_scalar(&scalar.into(), Value::sub);
        self
    }

    pub fn mul_scalar(&mut self, scalar: impl Into<Value>) -> &mut Self {
        self.apply_scalar(&scalar.into(), Value::mul);
        self
    }

    pub fn div_scalar(&mut self, scalar: impl Into<Value>) -> &mut Self {
        self.apply_scalar(&scalar.into(), Value::div);
        self
    }

    /// Rolling aggregates that replace the values in place, keys unchanged.
    pub fn rolling(&mut self, period: usize) -> IndexedWindow<'_, K> {
        IndexedWindow {
            target: self,
            period,
        }
    }

    pub fn copy(&self) -> IndexedColumn<K> {
        IndexedColumn {
            column: self.column.copy(),
            keys: self.keys.clone(),
            rows: self.rows.clone(),
        }
    }

    pub fn copy_range(&self, start: isize, count: isize) -> IndexedColumn<K> {
        match clamp_range(self.keys.len(), start, count) {
            Some((start, end)) => {
                let mut out = IndexedColumn {
                    column: self
                        .column
                        .copy_range(start as isize, (end - start) as isize),
                    keys: self.keys[start..end].to_vec(),
                    rows: HashMap::new(),
                };
                out.rebuild_rows();
                out
            }
            None => IndexedColumn::new(self.column.name()),
        }
    }
}

impl IndexedColumn<EpochTime> {
    pub fn time_at(&self, row: usize) -> EpochTime {
        self.key_at(row).unwrap_or(EpochTime(0))
    }
}

pub struct IndexedWindow<'a, K: Ord + Copy + Hash> {
    target: &'a mut IndexedColumn<K>,
    period: usize,
}

macro_rules! indexed_aggregate {
    ($($name:ident),+) => {
        impl<'a, K: Ord + Copy + Hash> IndexedWindow<'a, K> {
            $(
                pub fn $name(self) -> &'a mut IndexedColumn<K> {
                    let out = self.target.column.rolling(self.period).$name();
                    self.target.column.replace_values(out.values().to_vec());
                    self.target
                }
            )+
        }
    };
}

indexed_aggregate!(mean, ema, median, stddev, min, max);

fn clamp_range(len: usize, start: isize, count: isize) -> Option<(usize, usize)> {
    let len = len as isize;
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
