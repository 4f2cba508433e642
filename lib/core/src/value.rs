//! Dynamic values read off records
//!
//! A [`Value`] is whatever a record member holds at runtime; a [`ValueType`]
//! is the semantic type a feature declares for that member. Rust field types
//! map onto both through [`FieldValue`].

use crate::{Error, Result};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A member value of any supported shape
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Char(char),
    Int(i64),
    UInt(u64),
    Float(f64),
    Enum(EnumValue),
    Duration(Duration),
    Text(String),
    DateTime(NaiveDateTime),
    Uuid(Uuid),
    List(Vec<Value>),
}

impl Value {
    /// Short name of the runtime shape, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Char(_) => "char",
            Value::Int(_) => "int",
            Value::UInt(_) => "uint",
            Value::Float(_) => "float",
            Value::Enum(_) => "enum",
            Value::Duration(_) => "duration",
            Value::Text(_) => "string",
            Value::DateTime(_) => "datetime",
            Value::Uuid(_) => "uuid",
            Value::List(_) => "list",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Read a timestamp, accepting RFC 3339 and ISO-8601 text as well
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Value::DateTime(dt) => Some(*dt),
            Value::Text(s) => parse_datetime(s),
            _ => None,
        }
    }

    /// Whether the runtime shape is categorical rather than continuous
    pub fn is_discrete(&self) -> bool {
        matches!(
            self,
            Value::Bool(_) | Value::Char(_) | Value::Text(_) | Value::Enum(_)
        )
    }

    /// Convert into a JSON value for write-back into JSON records
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;
        match self {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Char(c) => Json::String(c.to_string()),
            Value::Int(i) => Json::from(*i),
            Value::UInt(u) => Json::from(*u),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            Value::Enum(e) => Json::String(e.variant.clone()),
            Value::Duration(d) => Json::from(d.num_milliseconds() as f64 / 1000.0),
            Value::Text(s) => Json::String(s.clone()),
            Value::DateTime(dt) => Json::String(dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string()),
            Value::Uuid(u) => Json::String(u.to_string()),
            Value::List(items) => Json::Array(items.iter().map(Value::to_json).collect()),
        }
    }
}

fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        use serde_json::Value as Json;
        match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Value::UInt(u)
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Json::String(s) => Value::Text(s),
            Json::Array(items) => Value::List(items.into_iter().map(Value::from).collect()),
            Json::Object(map) => Value::Text(Json::Object(map).to_string()),
        }
    }
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Value::$variant(v.into())
            }
        })*
    };
}

impl_from! {
    bool => Bool,
    char => Char,
    i32 => Int,
    i64 => Int,
    u32 => UInt,
    u64 => UInt,
    f32 => Float,
    f64 => Float,
    String => Text,
    &str => Text,
    NaiveDateTime => DateTime,
    Duration => Duration,
    Uuid => Uuid,
    Vec<Value> => List,
    EnumValue => Enum,
}

/// A runtime enumeration value: variant name plus its underlying ordinal
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumValue {
    pub variant: String,
    pub ordinal: i64,
}

impl EnumValue {
    pub fn new(variant: impl Into<String>, ordinal: i64) -> Self {
        Self {
            variant: variant.into(),
            ordinal,
        }
    }
}

/// Static description of an enumeration type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumType {
    pub name: String,
    pub variants: Vec<EnumVariant>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumVariant {
    pub name: String,
    pub ordinal: i64,
}

impl EnumType {
    /// Enumeration whose ordinals follow declaration order
    pub fn new(name: impl Into<String>, variants: &[&str]) -> Self {
        Self {
            name: name.into(),
            variants: variants
                .iter()
                .enumerate()
                .map(|(i, v)| EnumVariant {
                    name: v.to_string(),
                    ordinal: i as i64,
                })
                .collect(),
        }
    }

    pub fn by_ordinal(&self, ordinal: i64) -> Option<EnumValue> {
        self.variants
            .iter()
            .find(|v| v.ordinal == ordinal)
            .map(|v| EnumValue::new(v.name.clone(), v.ordinal))
    }

    pub fn by_name(&self, name: &str) -> Option<EnumValue> {
        self.variants
            .iter()
            .find(|v| v.name.eq_ignore_ascii_case(name))
            .map(|v| EnumValue::new(v.name.clone(), v.ordinal))
    }
}

/// Semantic type a feature maps a member to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    Bool,
    Char,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Enum(EnumType),
    Duration,
    String,
    DateTime,
    Uuid,
    Sequence(Box<ValueType>),
    /// Unknown at construction; resolved from the runtime value
    Any,
}

impl ValueType {
    /// Categorical types: bool, char, string, enum
    pub fn is_discrete(&self) -> bool {
        matches!(
            self,
            ValueType::Bool | ValueType::Char | ValueType::String | ValueType::Enum(_)
        )
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self, ValueType::Sequence(_))
    }

    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            ValueType::I8
                | ValueType::I16
                | ValueType::I32
                | ValueType::I64
                | ValueType::U8
                | ValueType::U16
                | ValueType::U32
                | ValueType::U64
        )
    }

    /// Element type of a sequence
    pub fn element(&self) -> Option<&ValueType> {
        match self {
            ValueType::Sequence(inner) => Some(inner),
            _ => None,
        }
    }

    pub fn name(&self) -> String {
        match self {
            ValueType::Enum(e) => e.name.clone(),
            ValueType::Sequence(inner) => format!("[{}]", inner.name()),
            other => format!("{:?}", other).to_lowercase(),
        }
    }
}

/// Identifier value used by categorical id features
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Identifier {
    Uuid(Uuid),
    Integer(i64),
    String(String),
}

impl Identifier {
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Uuid(u) => Some(Identifier::Uuid(*u)),
            Value::Int(i) => Some(Identifier::Integer(*i)),
            Value::UInt(u) => i64::try_from(*u).ok().map(Identifier::Integer),
            Value::Text(s) => Some(
                Uuid::parse_str(s)
                    .map(Identifier::Uuid)
                    .unwrap_or_else(|_| Identifier::String(s.clone())),
            ),
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Identifier::Uuid(u) => Value::Uuid(*u),
            Identifier::Integer(i) => Value::Int(*i),
            Identifier::String(s) => Value::Text(s.clone()),
        }
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Identifier::Uuid(u) => write!(f, "{}", u),
            Identifier::Integer(i) => write!(f, "{}", i),
            Identifier::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<Uuid> for Identifier {
    fn from(u: Uuid) -> Self {
        Identifier::Uuid(u)
    }
}

impl From<i64> for Identifier {
    fn from(i: i64) -> Self {
        Identifier::Integer(i)
    }
}

impl From<String> for Identifier {
    fn from(s: String) -> Self {
        Identifier::String(s)
    }
}

/// A Rust type that can live in a record member
pub trait FieldValue: Sized {
    fn value_type() -> ValueType;
    fn to_value(&self) -> Value;
    fn from_value(value: Value) -> Result<Self>;
}

fn mismatch(value: &Value, expected: ValueType) -> Error {
    Error::Unconvertible {
        feature: String::new(),
        found: value.kind().to_string(),
        expected: expected.name(),
    }
}

macro_rules! impl_signed {
    ($($ty:ty => $vt:ident),*) => {
        $(impl FieldValue for $ty {
            fn value_type() -> ValueType {
                ValueType::$vt
            }

            fn to_value(&self) -> Value {
                Value::Int(*self as i64)
            }

            fn from_value(value: Value) -> Result<Self> {
                let converted = match &value {
                    Value::Int(i) => <$ty>::try_from(*i).ok(),
                    Value::UInt(u) => <$ty>::try_from(*u).ok(),
                    Value::Text(s) => s.trim().parse::<$ty>().ok(),
                    _ => None,
                };
                converted.ok_or_else(|| mismatch(&value, ValueType::$vt))
            }
        })*
    };
}

macro_rules! impl_unsigned {
    ($($ty:ty => $vt:ident),*) => {
        $(impl FieldValue for $ty {
            fn value_type() -> ValueType {
                ValueType::$vt
            }

            fn to_value(&self) -> Value {
                Value::UInt(*self as u64)
            }

            fn from_value(value: Value) -> Result<Self> {
                let converted = match &value {
                    Value::Int(i) => <$ty>::try_from(*i).ok(),
                    Value::UInt(u) => <$ty>::try_from(*u).ok(),
                    Value::Text(s) => s.trim().parse::<$ty>().ok(),
                    _ => None,
                };
                converted.ok_or_else(|| mismatch(&value, ValueType::$vt))
            }
        })*
    };
}

impl_signed!(i8 => I8, i16 => I16, i32 => I32, i64 => I64);
impl_unsigned!(u8 => U8, u16 => U16, u32 => U32, u64 => U64);

macro_rules! impl_float {
    ($($ty:ty => $vt:ident),*) => {
        $(impl FieldValue for $ty {
            fn value_type() -> ValueType {
                ValueType::$vt
            }

            fn to_value(&self) -> Value {
                Value::Float(*self as f64)
            }

            fn from_value(value: Value) -> Result<Self> {
                match value {
                    Value::Float(f) => Ok(f as $ty),
                    Value::Int(i) => Ok(i as $ty),
                    Value::UInt(u) => Ok(u as $ty),
                    Value::Null => Ok(<$ty>::NAN),
                    Value::Text(ref s) => s
                        .trim()
                        .parse::<$ty>()
                        .map_err(|_| mismatch(&value, ValueType::$vt)),
                    other => Err(mismatch(&other, ValueType::$vt)),
                }
            }
        })*
    };
}

impl_float!(f32 => F32, f64 => F64);

impl FieldValue for bool {
    fn value_type() -> ValueType {
        ValueType::Bool
    }

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(mismatch(&other, ValueType::Bool)),
        }
    }
}

impl FieldValue for char {
    fn value_type() -> ValueType {
        ValueType::Char
    }

    fn to_value(&self) -> Value {
        Value::Char(*self)
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Char(c) => Ok(c),
            Value::Text(ref s) if s.chars().count() == 1 => {
                s.chars().next().ok_or_else(|| mismatch(&value, ValueType::Char))
            }
            other => Err(mismatch(&other, ValueType::Char)),
        }
    }
}

impl FieldValue for String {
    fn value_type() -> ValueType {
        ValueType::String
    }

    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Text(s) => Ok(s),
            Value::Null => Ok(String::new()),
            Value::Enum(e) => Ok(e.variant),
            Value::Char(c) => Ok(c.to_string()),
            other => Err(mismatch(&other, ValueType::String)),
        }
    }
}

impl FieldValue for NaiveDateTime {
    fn value_type() -> ValueType {
        ValueType::DateTime
    }

    fn to_value(&self) -> Value {
        Value::DateTime(*self)
    }

    fn from_value(value: Value) -> Result<Self> {
        value
            .as_datetime()
            .ok_or_else(|| mismatch(&value, ValueType::DateTime))
    }
}

impl FieldValue for Duration {
    fn value_type() -> ValueType {
        ValueType::Duration
    }

    fn to_value(&self) -> Value {
        Value::Duration(*self)
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Duration(d) => Ok(d),
            other => Err(mismatch(&other, ValueType::Duration)),
        }
    }
}

impl FieldValue for Uuid {
    fn value_type() -> ValueType {
        ValueType::Uuid
    }

    fn to_value(&self) -> Value {
        Value::Uuid(*self)
    }

    fn from_value(value: Value) -> Result<Self> {
        match &value {
            Value::Uuid(u) => Ok(*u),
            Value::Text(s) => Uuid::parse_str(s).map_err(|_| mismatch(&value, ValueType::Uuid)),
            _ => Err(mismatch(&value, ValueType::Uuid)),
        }
    }
}

impl<T: FieldValue> FieldValue for Vec<T> {
    fn value_type() -> ValueType {
        ValueType::Sequence(Box::new(T::value_type()))
    }

    fn to_value(&self) -> Value {
        Value::List(self.iter().map(FieldValue::to_value).collect())
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::List(items) => items.into_iter().map(T::from_value).collect(),
            other => Err(mismatch(&other, Self::value_type())),
        }
    }
}

impl<T: FieldValue> FieldValue for Option<T> {
    fn value_type() -> ValueType {
        T::value_type()
    }

    fn to_value(&self) -> Value {
        self.as_ref().map(FieldValue::to_value).unwrap_or(Value::Null)
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

/// Field types that encode to exactly one double
pub trait Scalar: FieldValue {}

macro_rules! impl_scalar {
    ($($ty:ty),*) => {
        $(impl Scalar for $ty {})*
    };
}

impl_scalar!(bool, char, i8, i16, i32, i64, u8, u16, u32, u64, f32, f64, Duration);

impl<T: Scalar> Scalar for Option<T> {}

/// Implement [`FieldValue`] and [`Scalar`] for a fieldless enum
///
/// Ordinals follow declaration order. The enum must be `Copy + PartialEq`.
///
/// ```rust
/// use featurex_core::{field_enum, FieldValue, Value};
///
/// #[derive(Debug, Clone, Copy, PartialEq)]
/// enum Color { Red, Green }
/// field_enum!(Color { Red, Green });
///
/// assert_eq!(Color::from_value(Value::from("green")).unwrap(), Color::Green);
/// ```
#[macro_export]
macro_rules! field_enum {
    ($ty:ident { $($variant:ident),+ $(,)? }) => {
        impl $crate::FieldValue for $ty {
            fn value_type() -> $crate::ValueType {
                $crate::ValueType::Enum($crate::EnumType::new(
                    stringify!($ty),
                    &[$(stringify!($variant)),+],
                ))
            }

            fn to_value(&self) -> $crate::Value {
                let variants = [$($ty::$variant),+];
                let names = [$(stringify!($variant)),+];
                let ordinal = variants.iter().position(|v| v == self).unwrap_or(0);
                $crate::Value::Enum($crate::EnumValue::new(names[ordinal], ordinal as i64))
            }

            fn from_value(value: $crate::Value) -> $crate::Result<Self> {
                let variants = [$($ty::$variant),+];
                let enum_type = $crate::EnumType::new(stringify!($ty), &[$(stringify!($variant)),+]);
                let found = match &value {
                    $crate::Value::Enum(e) => enum_type.by_name(&e.variant),
                    $crate::Value::Text(s) => enum_type.by_name(s.trim()),
                    $crate::Value::Int(i) => enum_type.by_ordinal(*i),
                    $crate::Value::UInt(u) => enum_type.by_ordinal(*u as i64),
                    _ => None,
                };
                found
                    .and_then(|e| variants.get(e.ordinal as usize).copied())
                    .ok_or_else(|| $crate::Error::Unconvertible {
                        feature: String::new(),
                        found: value.kind().to_string(),
                        expected: stringify!($ty).to_string(),
                    })
            }
        }

        impl $crate::Scalar for $ty {}
    };
}
