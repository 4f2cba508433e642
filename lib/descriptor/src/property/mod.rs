//! Feature properties
//!
//! A [`Property`] encodes one named member of a record into a fixed number
//! of doubles and, where an inverse exists, decodes a double back. The
//! variant set is closed so a serialized feature list can always be rebuilt
//! from its `kind` tag.

pub mod categorical;
pub mod datetime;
pub mod scalar;
pub mod sequence;
pub mod text;
pub mod vocabulary;

pub use categorical::CategoricalProperty;
pub use datetime::{DateTimeFlags, DateTimePortion, DateTimeProperty};
pub use scalar::ScalarProperty;
pub use sequence::SequenceProperty;
pub use text::{SplitMode, TextOptions, TextProperty};
pub use vocabulary::Vocabulary;

use featurex_core::{Record, Result, Value, ValueType};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Encoded output of a single feature; most features are one value wide
pub type Encoded = SmallVec<[f64; 4]>;

/// Attributes every property carries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyMeta {
    /// Member name on the source record
    pub name: String,
    /// Semantic type the member maps to
    pub declared_type: ValueType,
    /// First column in the assembled vector, `None` until the layout is pinned
    #[serde(default)]
    pub start: Option<usize>,
    /// Classification rather than regression hint
    #[serde(default)]
    pub discrete: bool,
}

impl PropertyMeta {
    pub fn new(name: impl Into<String>, declared_type: ValueType) -> Self {
        let discrete = declared_type.is_discrete();
        Self {
            name: name.into(),
            declared_type,
            start: None,
            discrete,
        }
    }
}

/// Read-only view over a dataset, one member column at a time
pub struct Dataset<'a, R> {
    items: &'a [R],
}

impl<'a, R: Record> Dataset<'a, R> {
    pub fn new(items: &'a [R]) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &'a [R] {
        self.items
    }

    /// Values of member `name`, in item order
    pub fn column<'b>(&'b self, name: &'b str) -> impl Iterator<Item = Result<Value>> + 'b {
        let items: &'b [R] = self.items;
        items.iter().map(move |item| item.get(name))
    }
}

/// Capability shared by every property variant
pub trait Feature {
    fn meta(&self) -> &PropertyMeta;

    fn meta_mut(&mut self) -> &mut PropertyMeta;

    /// Number of columns this feature occupies
    fn length(&self) -> usize;

    /// Corpus pass run once before any item of a dataset is converted
    fn pre_process<R: Record>(&mut self, _dataset: &Dataset<'_, R>) -> Result<()> {
        Ok(())
    }

    /// Corpus pass run once after every item of a dataset is converted
    fn post_process<R: Record>(&mut self, _dataset: &Dataset<'_, R>) -> Result<()> {
        Ok(())
    }

    fn pre_process_item(&self, _value: &Value) -> Result<()> {
        Ok(())
    }

    fn post_process_item(&self, _value: &Value) -> Result<()> {
        Ok(())
    }

    /// Encode a member value into exactly [`Feature::length`] doubles
    fn convert(&self, value: &Value) -> Result<Encoded>;

    /// Decode a predicted double back into a member value
    fn convert_back(&self, value: f64) -> Result<Value>;

    /// One human-readable name per occupied column
    fn columns(&self) -> Vec<String>;
}

/// A feature or label encoder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Property {
    Scalar(ScalarProperty),
    Text(TextProperty),
    DateTime(DateTimeProperty),
    FixedSequence(SequenceProperty),
    CategoricalId(CategoricalProperty),
}

macro_rules! dispatch {
    ($self:expr, $inner:ident => $body:expr) => {
        match $self {
            Property::Scalar($inner) => $body,
            Property::Text($inner) => $body,
            Property::DateTime($inner) => $body,
            Property::FixedSequence($inner) => $body,
            Property::CategoricalId($inner) => $body,
        }
    };
}

impl Property {
    #[inline]
    pub fn name(&self) -> &str {
        &self.meta().name
    }

    #[inline]
    pub fn start(&self) -> Option<usize> {
        self.meta().start
    }

    #[inline]
    pub fn is_discrete(&self) -> bool {
        self.meta().discrete
    }

    #[inline]
    pub fn declared_type(&self) -> &ValueType {
        &self.meta().declared_type
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Property::Scalar(_) => "scalar",
            Property::Text(_) => "text",
            Property::DateTime(_) => "date_time",
            Property::FixedSequence(_) => "fixed_sequence",
            Property::CategoricalId(_) => "categorical_id",
        }
    }
}

impl Feature for Property {
    fn meta(&self) -> &PropertyMeta {
        dispatch!(self, p => p.meta())
    }

    fn meta_mut(&mut self) -> &mut PropertyMeta {
        dispatch!(self, p => p.meta_mut())
    }

    fn length(&self) -> usize {
        dispatch!(self, p => p.length())
    }

    fn pre_process<R: Record>(&mut self, dataset: &Dataset<'_, R>) -> Result<()> {
        dispatch!(self, p => p.pre_process(dataset))
    }

    fn post_process<R: Record>(&mut self, dataset: &Dataset<'_, R>) -> Result<()> {
        dispatch!(self, p => p.post_process(dataset))
    }

    fn pre_process_item(&self, value: &Value) -> Result<()> {
        dispatch!(self, p => p.pre_process_item(value))
    }

    fn post_process_item(&self, value: &Value) -> Result<()> {
        dispatch!(self, p => p.post_process_item(value))
    }

    fn convert(&self, value: &Value) -> Result<Encoded> {
        dispatch!(self, p => p.convert(value))
    }

    fn convert_back(&self, value: f64) -> Result<Value> {
        dispatch!(self, p => p.convert_back(value))
    }

    fn columns(&self) -> Vec<String> {
        dispatch!(self, p => p.columns())
    }
}

impl From<ScalarProperty> for Property {
    fn from(p: ScalarProperty) -> Self {
        Property::Scalar(p)
    }
}

impl From<TextProperty> for Property {
    fn from(p: TextProperty) -> Self {
        Property::Text(p)
    }
}

impl From<DateTimeProperty> for Property {
    fn from(p: DateTimeProperty) -> Self {
        Property::DateTime(p)
    }
}

impl From<SequenceProperty> for Property {
    fn from(p: SequenceProperty) -> Self {
        Property::FixedSequence(p)
    }
}

impl From<CategoricalProperty> for Property {
    fn from(p: CategoricalProperty) -> Self {
        Property::CategoricalId(p)
    }
}
