//! # featurex Descriptor
//!
//! Turns records into fixed-layout numeric vectors and predictions back into
//! record values.
//!
//! ## Overview
//!
//! A [`Descriptor`] is an ordered list of [`Property`] encoders plus an
//! optional label. Each property reads one named member of a record and
//! expands it into a fixed number of columns:
//!
//! - **Scalar**: numbers, booleans (±1), chars, enums, durations; one column
//! - **Text**: bag-of-words histogram over a learned vocabulary, or a single
//!   categorical index in enum mode
//! - **DateTime**: selected calendar/clock components
//! - **FixedSequence**: a collection padded or truncated to a fixed width
//! - **CategoricalId**: index of an identifier among those seen in training
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ pre-process  │────>│ pin layout   │────>│ convert rows │
//! │ (vocabulary) │     │ (offsets)    │     │              │
//! └──────────────┘     └──────────────┘     └──────┬───────┘
//!                                                  │
//!                                           ┌──────┴───────┐
//!                                           │ post-process │
//!                                           └──────────────┘
//! ```
//!
//! Corpus-dependent widths are settled before any offset is assigned, and the
//! layout never changes once pinned.
//!
//! ## Example
//!
//! ```rust
//! use featurex_descriptor::{DescriptorBuilder, TextOptions};
//! use serde_json::json;
//!
//! let mut descriptor = DescriptorBuilder::new()
//!     .with("age").as_number()
//!     .with("notes").as_text(TextOptions::default())
//!     .learn("nice").as_bool()
//!     .build()
//!     .unwrap();
//!
//! let rows = vec![
//!     json!({"age": 23, "notes": "quick fox", "nice": true}),
//!     json!({"age": 31, "notes": "lazy dog", "nice": false}),
//! ];
//! let (x, y) = descriptor.to_examples(&rows).unwrap();
//! assert_eq!(x.cols(), 5);
//! assert_eq!(y.as_slice(), &[1.0, -1.0]);
//! assert_eq!(descriptor.column_name_at(3).unwrap(), "LAZY");
//! ```

pub mod builder;
pub mod descriptor;
pub mod layout;
pub mod property;
pub mod shape;
pub mod typed;

pub use builder::{DescriptorBuilder, PropertyBuilder};
pub use descriptor::Descriptor;
pub use layout::Layout;
pub use property::{
    CategoricalProperty, Dataset, DateTimeFlags, DateTimePortion, DateTimeProperty, Encoded, Feature, Property,
    PropertyMeta, ScalarProperty, SequenceProperty, SplitMode, TextOptions, TextProperty, Vocabulary,
};
pub use shape::{Marker, Member, Shape};
pub use typed::{Selector, TypedBuilder, TypedProperty};

// Used by the `shape!` expansion
pub use featurex_core::{Error, FieldValue, Record, Result, Value, ValueType};
