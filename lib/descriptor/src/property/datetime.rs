//! Date and time component features

use super::{Encoded, Feature, PropertyMeta};
use chrono::{Datelike, NaiveDateTime, Timelike};
use featurex_core::{Error, Result, Value, ValueType};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Fine-grained date/time components, one column each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u16", into = "u16")]
pub struct DateTimeFlags(u16);

impl DateTimeFlags {
    pub const NONE: Self = Self(0);
    pub const YEAR: Self = Self(1);
    pub const DAY_OF_YEAR: Self = Self(1 << 1);
    pub const MONTH: Self = Self(1 << 2);
    pub const DAY: Self = Self(1 << 3);
    pub const DAY_OF_WEEK: Self = Self(1 << 4);
    pub const HOUR: Self = Self(1 << 5);
    pub const MINUTE: Self = Self(1 << 6);
    pub const SECOND: Self = Self(1 << 7);
    pub const MILLISECOND: Self = Self(1 << 8);

    /// Every component in column order
    pub const ORDER: [(Self, &'static str); 9] = [
        (Self::YEAR, "year"),
        (Self::DAY_OF_YEAR, "day_of_year"),
        (Self::MONTH, "month"),
        (Self::DAY, "day"),
        (Self::DAY_OF_WEEK, "day_of_week"),
        (Self::HOUR, "hour"),
        (Self::MINUTE, "minute"),
        (Self::SECOND, "second"),
        (Self::MILLISECOND, "millisecond"),
    ];

    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Unknown bits are dropped
    pub const fn from_bits(bits: u16) -> Self {
        Self(bits & 0x1ff)
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn count(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Set components with their column suffix, in column order
    pub fn iter(self) -> impl Iterator<Item = (DateTimeFlags, &'static str)> {
        Self::ORDER
            .into_iter()
            .filter(move |(flag, _)| self.contains(*flag))
    }
}

impl Default for DateTimeFlags {
    fn default() -> Self {
        DateTimePortion::DATE.expand() | DateTimePortion::TIME.expand()
    }
}

impl BitOr for DateTimeFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl From<u16> for DateTimeFlags {
    fn from(bits: u16) -> Self {
        Self::from_bits(bits)
    }
}

impl From<DateTimeFlags> for u16 {
    fn from(flags: DateTimeFlags) -> Self {
        flags.bits()
    }
}

impl BitOrAssign for DateTimeFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for DateTimeFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(|(_, name)| name).collect();
        write!(f, "{}", names.join("|"))
    }
}

/// Coarse component groups that expand into [`DateTimeFlags`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DateTimePortion(u8);

impl DateTimePortion {
    /// year, month, day
    pub const DATE: Self = Self(1);
    /// day of year, day of week
    pub const DATE_EXTENDED: Self = Self(1 << 1);
    /// hour, minute
    pub const TIME: Self = Self(1 << 2);
    /// second, millisecond
    pub const TIME_EXTENDED: Self = Self(1 << 3);

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn expand(self) -> DateTimeFlags {
        let mut flags = DateTimeFlags::NONE;
        if self.contains(Self::DATE) {
            flags |= DateTimeFlags::YEAR | DateTimeFlags::MONTH | DateTimeFlags::DAY;
        }
        if self.contains(Self::DATE_EXTENDED) {
            flags |= DateTimeFlags::DAY_OF_YEAR | DateTimeFlags::DAY_OF_WEEK;
        }
        if self.contains(Self::TIME) {
            flags |= DateTimeFlags::HOUR | DateTimeFlags::MINUTE;
        }
        if self.contains(Self::TIME_EXTENDED) {
            flags |= DateTimeFlags::SECOND | DateTimeFlags::MILLISECOND;
        }
        flags
    }
}

impl BitOr for DateTimePortion {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl From<DateTimePortion> for DateTimeFlags {
    fn from(portion: DateTimePortion) -> Self {
        portion.expand()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateTimeProperty {
    #[serde(flatten)]
    meta: PropertyMeta,
    #[serde(default)]
    flags: DateTimeFlags,
}

impl DateTimeProperty {
    pub fn new(name: impl Into<String>, flags: DateTimeFlags) -> Self {
        Self {
            meta: PropertyMeta::new(name, ValueType::DateTime),
            flags,
        }
    }

    pub fn from_portion(name: impl Into<String>, portion: DateTimePortion) -> Self {
        Self::new(name, portion.expand())
    }

    pub fn flags(&self) -> DateTimeFlags {
        self.flags
    }
}

fn component(timestamp: &NaiveDateTime, flag: DateTimeFlags) -> f64 {
    match flag {
        DateTimeFlags::YEAR => timestamp.year() as f64,
        DateTimeFlags::DAY_OF_YEAR => timestamp.ordinal() as f64,
        DateTimeFlags::MONTH => timestamp.month() as f64,
        DateTimeFlags::DAY => timestamp.day() as f64,
        DateTimeFlags::DAY_OF_WEEK => timestamp.weekday().num_days_from_sunday() as f64,
        DateTimeFlags::HOUR => timestamp.hour() as f64,
        DateTimeFlags::MINUTE => timestamp.minute() as f64,
        DateTimeFlags::SECOND => timestamp.second() as f64,
        // leap seconds report nanoseconds past 1e9
        DateTimeFlags::MILLISECOND => ((timestamp.nanosecond() / 1_000_000) % 1000) as f64,
        _ => 0.0,
    }
}

impl Feature for DateTimeProperty {
    fn meta(&self) -> &PropertyMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut PropertyMeta {
        &mut self.meta
    }

    fn length(&self) -> usize {
        self.flags.count()
    }

    fn convert(&self, value: &Value) -> Result<Encoded> {
        let timestamp = value.as_datetime().ok_or_else(|| Error::Unconvertible {
            feature: self.meta.name.clone(),
            found: value.kind().to_string(),
            expected: "datetime".to_string(),
        })?;
        Ok(self
            .flags
            .iter()
            .map(|(flag, _)| component(&timestamp, flag))
            .collect())
    }

    fn convert_back(&self, _value: f64) -> Result<Value> {
        Err(Error::Irreversible {
            feature: self.meta.name.clone(),
        })
    }

    fn columns(&self) -> Vec<String> {
        self.flags
            .iter()
            .map(|(_, suffix)| format!("{}_{}", self.meta.name, suffix))
            .collect()
    }
}
