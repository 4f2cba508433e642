//! Scalar codec
//!
//! Canonical, locale-invariant mapping between scalar values and `f64`.
//! Booleans encode to [`TRUE_VALUE`]/[`FALSE_VALUE`] so downstream learners
//! see a zero-centered signal; decoding thresholds at their midpoint.

use crate::value::{Value, ValueType};
use crate::{Error, Result};
use chrono::Duration;

pub const TRUE_VALUE: f64 = 1.0;
pub const FALSE_VALUE: f64 = -1.0;

/// Whether values of `value_type` can be encoded as a single double
pub fn is_scalar_encodable(value_type: &ValueType) -> bool {
    !matches!(
        value_type,
        ValueType::DateTime | ValueType::Uuid | ValueType::Sequence(_)
    )
}

/// Whether a runtime value can be encoded as a single double
pub fn is_scalar_value(value: &Value) -> bool {
    !matches!(value, Value::DateTime(_) | Value::Uuid(_) | Value::List(_))
}

fn unconvertible(value: &Value, expected: &str) -> Error {
    Error::Unconvertible {
        feature: String::new(),
        found: value.kind().to_string(),
        expected: expected.to_string(),
    }
}

/// Encode a scalar value as a double
pub fn scalar_to_double(value: &Value) -> Result<f64> {
    match value {
        Value::Null => Ok(f64::NAN),
        Value::Bool(true) => Ok(TRUE_VALUE),
        Value::Bool(false) => Ok(FALSE_VALUE),
        Value::Char(c) => Ok(*c as u32 as f64),
        Value::Int(i) => Ok(*i as f64),
        Value::UInt(u) => Ok(*u as f64),
        Value::Float(f) => Ok(*f),
        Value::Enum(e) => Ok(e.ordinal as f64),
        Value::Duration(d) => Ok(duration_seconds(d)),
        Value::Text(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| unconvertible(value, "numeric text")),
        Value::DateTime(_) | Value::Uuid(_) | Value::List(_) => {
            Err(unconvertible(value, "scalar"))
        }
    }
}

/// Encode a value after coercing it to the declared type
///
/// Text read from untyped sources resolves to enum variants and chars here.
pub fn encode_as(value: &Value, value_type: &ValueType) -> Result<f64> {
    match (value, value_type) {
        (Value::Text(s), ValueType::Enum(enum_type)) => enum_type
            .by_name(s.trim())
            .map(|e| e.ordinal as f64)
            .ok_or_else(|| unconvertible(value, &enum_type.name)),
        (Value::Text(s), ValueType::Char) if s.chars().count() == 1 => {
            scalar_to_double(&Value::Char(s.chars().next().unwrap_or_default()))
        }
        (Value::Text(s), ValueType::Bool) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(TRUE_VALUE),
            "false" => Ok(FALSE_VALUE),
            _ => Err(unconvertible(value, "bool")),
        },
        _ => scalar_to_double(value),
    }
}

/// Decode a double into a value of `target`
pub fn double_to_scalar(value: f64, target: &ValueType) -> Result<Value> {
    if value.is_nan() {
        return Ok(Value::Null);
    }

    let decoded = match target {
        ValueType::Bool => Value::Bool(value >= (TRUE_VALUE + FALSE_VALUE) / 2.0),
        ValueType::Char => {
            let code = value.round();
            if code < 0.0 || code > u32::MAX as f64 {
                return Err(out_of_range(value, target));
            }
            char::from_u32(code as u32)
                .map(Value::Char)
                .ok_or_else(|| out_of_range(value, target))?
        }
        ValueType::I8 => Value::Int(signed(value, i8::MIN as f64, i8::MAX as f64, target)?),
        ValueType::I16 => Value::Int(signed(value, i16::MIN as f64, i16::MAX as f64, target)?),
        ValueType::I32 => Value::Int(signed(value, i32::MIN as f64, i32::MAX as f64, target)?),
        ValueType::I64 => Value::Int(signed(value, i64::MIN as f64, i64::MAX as f64, target)?),
        ValueType::U8 => Value::UInt(unsigned(value, u8::MAX as f64, target)?),
        ValueType::U16 => Value::UInt(unsigned(value, u16::MAX as f64, target)?),
        ValueType::U32 => Value::UInt(unsigned(value, u32::MAX as f64, target)?),
        ValueType::U64 => Value::UInt(unsigned(value, u64::MAX as f64, target)?),
        ValueType::F32 => Value::Float(value as f32 as f64),
        ValueType::F64 | ValueType::Any => Value::Float(value),
        ValueType::Enum(enum_type) => {
            let ordinal = value.round() as i64;
            Value::Enum(
                enum_type
                    .by_ordinal(ordinal)
                    .ok_or_else(|| out_of_range(value, target))?,
            )
        }
        ValueType::Duration => {
            let millis = (value * 1000.0).round();
            if !millis.is_finite() || millis.abs() >= i64::MAX as f64 {
                return Err(out_of_range(value, target));
            }
            Duration::try_milliseconds(millis as i64)
                .map(Value::Duration)
                .ok_or_else(|| out_of_range(value, target))?
        }
        ValueType::String => Value::Text(value.to_string()),
        ValueType::DateTime | ValueType::Uuid | ValueType::Sequence(_) => {
            return Err(Error::Unconvertible {
                feature: String::new(),
                found: "double".to_string(),
                expected: target.name(),
            })
        }
    };
    Ok(decoded)
}

fn duration_seconds(d: &Duration) -> f64 {
    match d.num_microseconds() {
        Some(us) => us as f64 / 1_000_000.0,
        None => d.num_milliseconds() as f64 / 1000.0,
    }
}

fn signed(value: f64, min: f64, max: f64, target: &ValueType) -> Result<i64> {
    let rounded = value.round();
    if rounded < min || rounded > max {
        return Err(out_of_range(value, target));
    }
    Ok(rounded as i64)
}

fn unsigned(value: f64, max: f64, target: &ValueType) -> Result<u64> {
    let rounded = value.round();
    if rounded < 0.0 || rounded > max {
        return Err(out_of_range(value, target));
    }
    Ok(rounded as u64)
}

fn out_of_range(value: f64, target: &ValueType) -> Error {
    Error::Unconvertible {
        feature: String::new(),
        found: value.to_string(),
        expected: target.name(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{EnumType, EnumValue};
    use proptest::prelude::*;

    #[test]
    fn test_bool_is_zero_centered() {
        assert_eq!(scalar_to_double(&Value::Bool(true)).unwrap(), 1.0);
        assert_eq!(scalar_to_double(&Value::Bool(false)).unwrap(), -1.0);
        assert_eq!(double_to_scalar(0.2, &ValueType::Bool).unwrap(), Value::Bool(true));
        assert_eq!(double_to_scalar(-0.2, &ValueType::Bool).unwrap(), Value::Bool(false));
        assert_eq!(double_to_scalar(0.0, &ValueType::Bool).unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_null_is_nan() {
        assert!(scalar_to_double(&Value::Null).unwrap().is_nan());
        assert_eq!(double_to_scalar(f64::NAN, &ValueType::I32).unwrap(), Value::Null);
    }

    #[test]
    fn test_duration_seconds() {
        let d = Duration::milliseconds(90_500);
        assert_eq!(scalar_to_double(&Value::Duration(d)).unwrap(), 90.5);
        assert_eq!(
            double_to_scalar(90.5, &ValueType::Duration).unwrap(),
            Value::Duration(d)
        );
    }

    #[test]
    fn test_duration_out_of_range() {
        for value in [-1e300, 1e300, f64::INFINITY, f64::NEG_INFINITY, -9.3e15] {
            assert!(matches!(
                double_to_scalar(value, &ValueType::Duration),
                Err(Error::Unconvertible { .. })
            ));
        }
        assert_eq!(
            double_to_scalar(-1.5, &ValueType::Duration).unwrap(),
            Value::Duration(Duration::milliseconds(-1500))
        );
    }

    #[test]
    fn test_text_parses_invariantly() {
        assert_eq!(scalar_to_double(&Value::from("3.25")).unwrap(), 3.25);
        assert!(scalar_to_double(&Value::from("3,25")).is_err());
    }

    #[test]
    fn test_non_scalars_fail() {
        assert!(scalar_to_double(&Value::List(vec![])).is_err());
        assert!(!is_scalar_encodable(&ValueType::DateTime));
        assert!(is_scalar_encodable(&ValueType::U16));
    }

    #[test]
    fn test_enum_round_trip_and_names() {
        let colors = ValueType::Enum(EnumType::new("Color", &["Red", "Green", "Blue"]));
        assert_eq!(encode_as(&Value::from("green"), &colors).unwrap(), 1.0);
        let back = double_to_scalar(2.0, &colors).unwrap();
        assert_eq!(back, Value::Enum(EnumValue::new("Blue", 2)));
        assert!(double_to_scalar(5.0, &colors).is_err());
    }

    #[test]
    fn test_integer_range_checked() {
        assert!(double_to_scalar(300.0, &ValueType::I8).is_err());
        assert!(double_to_scalar(-1.0, &ValueType::U32).is_err());
        assert_eq!(double_to_scalar(41.6, &ValueType::I32).unwrap(), Value::Int(42));
    }

    proptest! {
        #[test]
        fn prop_i32_round_trip(v in any::<i32>()) {
            let encoded = scalar_to_double(&Value::Int(v as i64)).unwrap();
            prop_assert_eq!(double_to_scalar(encoded, &ValueType::I32).unwrap(), Value::Int(v as i64));
        }

        #[test]
        fn prop_u16_round_trip(v in any::<u16>()) {
            let encoded = scalar_to_double(&Value::UInt(v as u64)).unwrap();
            prop_assert_eq!(double_to_scalar(encoded, &ValueType::U16).unwrap(), Value::UInt(v as u64));
        }

        #[test]
        fn prop_char_round_trip(c in any::<char>()) {
            let encoded = scalar_to_double(&Value::Char(c)).unwrap();
            prop_assert_eq!(double_to_scalar(encoded, &ValueType::Char).unwrap(), Value::Char(c));
        }

        #[test]
        fn prop_bool_round_trip(b in any::<bool>()) {
            let encoded = scalar_to_double(&Value::Bool(b)).unwrap();
            prop_assert_eq!(double_to_scalar(encoded, &ValueType::Bool).unwrap(), Value::Bool(b));
        }
    }
}
