//! # featurex
//!
//! Turn records, string-keyed maps and property bags into fixed-layout
//! numeric vectors for learning algorithms, and turn predicted values back
//! into record values.
//!
//! ## Quick Start
//!
//! ### As a CLI
//!
//! ```bash
//! featurex fit --descriptor people.json --data train.jsonl --out fitted.json
//! featurex convert --descriptor fitted.json --data test.jsonl --labels --out rows.csv
//! featurex columns --descriptor fitted.json
//! ```
//!
//! ### As a Library
//!
//! ```rust
//! use featurex::prelude::*;
//! use serde_json::json;
//!
//! let mut descriptor = DescriptorBuilder::new()
//!     .with("Age").as_type(ValueType::I32)
//!     .with("Height").as_number()
//!     .with("Weight").as_number()
//!     .with("Good").as_bool()
//!     .learn("Nice").as_bool()
//!     .build()
//!     .unwrap();
//!
//! let item = json!({"Age": 23, "Height": 6.21, "Weight": 220, "Good": false, "Nice": true});
//! assert_eq!(descriptor.convert(&item, true).unwrap(), vec![23.0, 6.21, 220.0, -1.0, 1.0]);
//!
//! let (x, y) = descriptor.to_examples(&[item]).unwrap();
//! assert_eq!(x.cols(), 4);
//! assert_eq!(descriptor.label_value(y[0]).unwrap(), Value::Bool(true));
//! ```
//!
//! ## Crate Structure
//!
//! - [`featurex-core`](https://docs.rs/featurex-core) - Values, scalar codec, record access, vectors and matrices
//! - [`featurex-descriptor`](https://docs.rs/featurex-descriptor) - Properties, layout, descriptor pipeline and builders
//!
//! ## Features
//!
//! - **Variable-width features**: text histograms, date parts and fixed sequences
//! - **Corpus pre-processing**: vocabularies and category tables learned in one pass
//! - **Pinned layout**: column offsets fixed on the first dataset and persisted
//! - **Round trips**: predictions decoded back into typed label values
//! - **Three front-ends**: name-based, selector-based and declarative (`shape!`)

// Re-export core types
pub use featurex_core::{
    codec, field_enum, EnumType, EnumValue, Error, FieldValue, Identifier, Matrix, Record, Result, Scalar, Value,
    ValueType, Vector,
};

// Re-export the descriptor engine
pub use featurex_descriptor::{
    select, shape, CategoricalProperty, Dataset, DateTimeFlags, DateTimePortion, DateTimeProperty, Descriptor,
    DescriptorBuilder, Feature, Layout, Marker, Member, Property, ScalarProperty, Selector, SequenceProperty, Shape,
    SplitMode, TextOptions, TextProperty, TypedBuilder,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        DateTimeFlags, DateTimePortion, Descriptor, DescriptorBuilder, Error, Feature, FieldValue, Marker, Matrix,
        Property, Record, Result, TextOptions, TypedBuilder, Value, ValueType, Vector,
    };
}
