//! # featurex Core
//!
//! Core library for featurex.
//!
//! This crate provides the building blocks the descriptor engine sits on:
//!
//! - [`Value`] / [`ValueType`] - dynamic member values and the semantic types features declare
//! - [`codec`] - canonical scalar ⇄ `f64` encoding
//! - [`Record`] - uniform named get/set over structured records and string-keyed maps
//! - [`Vector`] / [`Matrix`] - dense numeric containers handed to learning algorithms
//!
//! ## Example
//!
//! ```rust
//! use featurex_core::{codec, Record, Value, ValueType};
//! use serde_json::json;
//!
//! let row = json!({"age": 23, "good": false});
//! let good = Record::get(&row, "good").unwrap();
//! assert_eq!(codec::scalar_to_double(&good).unwrap(), -1.0);
//! assert_eq!(codec::double_to_scalar(0.7, &ValueType::Bool).unwrap(), Value::Bool(true));
//! ```

pub mod accessor;
pub mod codec;
pub mod error;
pub mod matrix;
pub mod value;
pub mod vector;

pub use accessor::{resolve_member, Record};
pub use error::{Error, Result};
pub use matrix::Matrix;
pub use value::{EnumType, EnumValue, EnumVariant, FieldValue, Identifier, Scalar, Value, ValueType};
pub use vector::Vector;
