//! Name-based fluent construction
//!
//! ```rust
//! use featurex_descriptor::{DescriptorBuilder, TextOptions};
//!
//! let descriptor = DescriptorBuilder::new()
//!     .with("Age").as_number()
//!     .with("Notes").as_text(TextOptions::default())
//!     .learn("Nice").as_bool()
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(descriptor.features().len(), 2);
//! assert_eq!(descriptor.label().unwrap().name(), "Nice");
//! ```

use crate::descriptor::Descriptor;
use crate::property::{
    CategoricalProperty, DateTimeFlags, DateTimePortion, DateTimeProperty, Property, ScalarProperty,
    SequenceProperty, TextOptions, TextProperty,
};
use featurex_core::{EnumType, Error, Result, ValueType};

/// Collects properties by member name
///
/// The first construction error is kept and reported by [`build`](Self::build)
/// so calls can be chained without intermediate `?`.
#[derive(Debug, Default)]
pub struct DescriptorBuilder {
    descriptor: Descriptor,
    error: Option<Error>,
}

impl DescriptorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declared_type(mut self, name: impl Into<String>) -> Self {
        self.descriptor.set_declared_type(name);
        self
    }

    /// Start a feature on member `name`
    pub fn with(self, name: impl Into<String>) -> PropertyBuilder {
        PropertyBuilder {
            parent: self,
            name: name.into(),
            is_label: false,
        }
    }

    /// Start the label on member `name`
    pub fn learn(self, name: impl Into<String>) -> PropertyBuilder {
        PropertyBuilder {
            parent: self,
            name: name.into(),
            is_label: true,
        }
    }

    /// Add a prebuilt property
    pub fn property(mut self, property: impl Into<Property>, is_label: bool) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.descriptor.add_property(property, is_label) {
                self.error = Some(e);
            }
        }
        self
    }

    pub fn build(self) -> Result<Descriptor> {
        if let Some(e) = self.error {
            return Err(e);
        }
        if self.descriptor.features().is_empty() {
            return Err(Error::EmptyDescriptor);
        }
        Ok(self.descriptor)
    }
}

/// Pending property on one member
#[derive(Debug)]
pub struct PropertyBuilder {
    parent: DescriptorBuilder,
    name: String,
    is_label: bool,
}

impl PropertyBuilder {
    fn finish(self, property: impl Into<Property>) -> DescriptorBuilder {
        let is_label = self.is_label;
        self.parent.property(property, is_label)
    }

    fn fail(mut self, error: Error) -> DescriptorBuilder {
        if self.parent.error.is_none() {
            self.parent.error = Some(error);
        }
        self.parent
    }

    /// Pick the property variant from a declared type
    ///
    /// Collections have no implied width and are rejected; use
    /// [`as_fixed_sequence`](Self::as_fixed_sequence) instead.
    pub fn as_type(self, value_type: ValueType) -> DescriptorBuilder {
        let name = self.name.clone();
        match value_type {
            ValueType::Sequence(_) => self.fail(Error::AmbiguousWidth { feature: name }),
            ValueType::DateTime => self.finish(DateTimeProperty::new(name, DateTimeFlags::default())),
            ValueType::Uuid => self.finish(CategoricalProperty::new(name)),
            ValueType::String => self.finish(TextProperty::new(name, TextOptions::default())),
            other => self.finish(ScalarProperty::new(name, other)),
        }
    }

    pub fn as_number(self) -> DescriptorBuilder {
        self.as_type(ValueType::F64)
    }

    pub fn as_bool(self) -> DescriptorBuilder {
        self.as_type(ValueType::Bool)
    }

    pub fn as_char(self) -> DescriptorBuilder {
        self.as_type(ValueType::Char)
    }

    pub fn as_enum(self, enum_type: EnumType) -> DescriptorBuilder {
        self.as_type(ValueType::Enum(enum_type))
    }

    pub fn as_text(self, options: TextOptions) -> DescriptorBuilder {
        let name = self.name.clone();
        self.finish(TextProperty::new(name, options))
    }

    /// Text treated as one categorical value rather than a bag of words
    pub fn as_string_enum(self) -> DescriptorBuilder {
        self.as_text(TextOptions::as_enum())
    }

    pub fn as_date_time(self, flags: DateTimeFlags) -> DescriptorBuilder {
        let name = self.name.clone();
        self.finish(DateTimeProperty::new(name, flags))
    }

    pub fn as_date_portion(self, portion: DateTimePortion) -> DescriptorBuilder {
        let name = self.name.clone();
        self.finish(DateTimeProperty::from_portion(name, portion))
    }

    pub fn as_fixed_sequence(self, element_type: ValueType, length: usize) -> DescriptorBuilder {
        let name = self.name.clone();
        self.finish(SequenceProperty::new(name, element_type, length))
    }

    pub fn as_categorical(self) -> DescriptorBuilder {
        let name = self.name.clone();
        self.finish(CategoricalProperty::new(name))
    }
}
