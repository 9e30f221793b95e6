//! Scalar cell values, epoch timestamps and bar frequencies.

use crate::domain::error::SimError;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use std::fmt;
use std::str::FromStr;

/// A point in time as whole seconds since the Unix epoch.
///
/// The engine indexes candles by `EpochTime`; calendar arithmetic only
/// happens at the edges, via the chrono conversions below.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EpochTime(pub i64);

impl EpochTime {
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt.timestamp())
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.and_time(NaiveTime::MIN).and_utc().timestamp())
    }

    pub fn to_datetime(self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.0, 0).unwrap_or_default()
    }

    /// Advance (or rewind, for negative `periods`) by whole bar periods.
    pub fn step(self, freq: Frequency, periods: i64) -> Self {
        Self(self.0 + freq.seconds() * periods)
    }
}

impl fmt::Display for EpochTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_datetime().format("%Y-%m-%d %H:%M:%S"))
    }
}

/// Bar frequency, named by the granularity codes the data feeds use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Frequency {
    S5,
    S10,
    S15,
    S30,
    M1,
    M2,
    M4,
    M5,
    M10,
    M15,
    M30,
    H1,
    H2,
    H3,
    H4,
    H6,
    H8,
    H12,
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    /// Seconds per bar period. Monthly is the 30-day convention.
    pub fn seconds(self) -> i64 {
        match self {
            Frequency::S5 => 5,
            Frequency::S10 => 10,
            Frequency::S15 => 15,
            Frequency::S30 => 30,
            Frequency::M1 => 60,
            Frequency::M2 => 120,
            Frequency::M4 => 240,
            Frequency::M5 => 300,
            Frequency::M10 => 600,
            Frequency::M15 => 900,
            Frequency::M30 => 1800,
            Frequency::H1 => 3600,
            Frequency::H2 => 7200,
            Frequency::H3 => 10800,
            Frequency::H4 => 14400,
            Frequency::H6 => 21600,
            Frequency::H8 => 28800,
            Frequency::H12 => 43200,
            Frequency::Daily => 86_400,
            Frequency::Weekly => 604_800,
            Frequency::Monthly => 2_592_000,
        }
    }

    pub fn duration(self) -> chrono::Duration {
        chrono::Duration::seconds(self.seconds())
    }

    /// The granularity code, the inverse of [`FromStr`].
    pub fn code(self) -> &'static str {
        match self {
            Frequency::S5 => "S5",
            Frequency::S10 => "S10",
            Frequency::S15 => "S15",
            Frequency::S30 => "S30",
            Frequency::M1 => "M1",
            Frequency::M2 => "M2",
            Frequency::M4 => "M4",
            Frequency::M5 => "M5",
            Frequency::M10 => "M10",
            Frequency::M15 => "M15",
            Frequency::M30 => "M30",
            Frequency::H1 => "H1",
            Frequency::H2 => "H2",
            Frequency::H3 => "H3",
            Frequency::H4 => "H4",
            Frequency::H6 => "H6",
            Frequency::H8 => "H8",
            Frequency::H12 => "H12",
            Frequency::Daily => "D",
            Frequency::Weekly => "W",
            Frequency::Monthly => "M",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Frequency {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let freq = match s {
            "S5" => Frequency::S5,
            "S10" => Frequency::S10,
            "S15" => Frequency::S15,
            "S30" => Frequency::S30,
            "M1" => Frequency::M1,
            "M2" => Frequency::M2,
            "M4" => Frequency::M4,
            "M5" => Frequency::M5,
            "M10" => Frequency::M10,
            "M15" => Frequency::M15,
            "M30" => Frequency::M30,
            "H1" => Frequency::H1,
            "H2" => Frequency::H2,
            "H3" => Frequency::H3,
            "H4" => Frequency::H4,
            "H6" => Frequency::H6,
            "H8" => Frequency::H8,
            "H12" => Frequency::H12,
            "D" => Frequency::Daily,
            "W" => Frequency::Weekly,
            "M" => Frequency::Monthly,
            other => {
                return Err(SimError::UnknownFrequency {
                    code: other.to_string(),
                });
            }
        };
        Ok(freq)
    }
}

/// One cell of a column. The variant set is closed; every variant has a
/// defined zero used for out-of-range and type-mismatched reads, which
/// keeps indicator arithmetic total.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Float(f64),
    Int(i64),
    Str(String),
    Time(EpochTime),
}

impl Value {
    /// The zero of the same variant.
    pub fn zero_like(&self) -> Value {
        match self {
            Value::Float(_) => Value::Float(0.0),
            Value::Int(_) => Value::Int(0),
            Value::Str(_) => Value::Str(String::new()),
            Value::Time(_) => Value::Time(EpochTime(0)),
        }
    }

    pub fn float(&self) -> f64 {
        match self {
            Value::Float(f) => *f,
            _ => 0.0,
        }
    }

    pub fn int(&self) -> i64 {
        match self {
            Value::Int(i) => *i,
            _ => 0,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Value::Str(s) => s,
            _ => "",
        }
    }

    pub fn time(&self) -> EpochTime {
        match self {
            Value::Time(t) => *t,
            _ => EpochTime(0),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Float(_) | Value::Int(_))
    }

    /// Numeric combination. Int pairs stay Int, mixed numeric promotes to
    /// Float, anything non-numeric yields None and the caller leaves the
    /// target row untouched.
    pub fn combine(
        &self,
        other: &Value,
        float_op: impl Fn(f64, f64) -> f64,
        int_op: impl Fn(i64, i64) -> Option<i64>,
    ) -> Option<Value> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => int_op(*a, *b).map(Value::Int),
            (Value::Float(a), Value::Float(b)) => Some(Value::Float(float_op(*a, *b))),
            (Value::Float(a), Value::Int(b)) => Some(Value::Float(float_op(*a, *b as f64))),
            (Value::Int(a), Value::Float(b)) => Some(Value::Float(float_op(*a as f64, *b))),
            _ => None,
        }
    }

    pub fn add(&self, other: &Value) -> Option<Value> {
        self.combine(other, |a, b| a + b, |a, b| a.checked_add(b))
    }

    pub fn sub(&self, other: &Value) -> Option<Value> {
        self.combine(other, |a, b| a - b, |a, b| a.checked_sub(b))
    }

    pub fn mul(&self, other: &Value) -> Option<Value> {
        self.combine(other, |a, b| a * b, |a, b| a.checked_mul(b))
    }

    pub fn div(&self, other: &Value) -> Option<Value> {
        self.combine(other, |a, b| a / b, |a, b| a.checked_div(b))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<EpochTime> for Value {
    fn from(v: EpochTime) -> Self {
        Value::Time(v)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Float(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Str(v) => write!(f, "{v}"),
            Value::Time(v) => write!(f, "{v}"),
        }
    }
}
