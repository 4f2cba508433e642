//! Declarative construction from a static record description
//!
//! [`shape!`](crate::shape) describes a struct's members once, tagging the
//! ones that become features or the label with a [`Marker`]. The same
//! description gives the struct a [`Record`] impl, so
//! [`Descriptor::of`] and conversion need nothing else.
//!
//! ```rust
//! use featurex_descriptor::{shape, Descriptor, Marker, TextOptions};
//!
//! #[derive(Default)]
//! struct Ticket {
//!     priority: u8,
//!     summary: String,
//!     escalated: bool,
//! }
//!
//! shape!(Ticket {
//!     priority: u8 => Marker::feature(),
//!     summary: String => Marker::text(TextOptions::default()),
//!     escalated: bool => Marker::label(),
//! });
//!
//! let descriptor = Descriptor::of::<Ticket>().unwrap();
//! assert_eq!(descriptor.features().len(), 2);
//! assert_eq!(descriptor.label().unwrap().name(), "escalated");
//! ```

use crate::descriptor::Descriptor;
use crate::property::{
    CategoricalProperty, DateTimeFlags, DateTimeProperty, Property, ScalarProperty, SequenceProperty,
    TextOptions, TextProperty,
};
use featurex_core::{resolve_member, Error, Result, Value, ValueType};

#[derive(Debug, Clone, PartialEq)]
enum Encoding {
    Plain,
    Text(TextOptions),
    DateTime(DateTimeFlags),
    FixedSequence(usize),
    Categorical,
}

/// Feature or label tag on a member
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    encoding: Encoding,
    is_label: bool,
}

impl Marker {
    fn of(encoding: Encoding) -> Self {
        Self {
            encoding,
            is_label: false,
        }
    }

    /// Encoding chosen from the member's type
    pub fn feature() -> Self {
        Self::of(Encoding::Plain)
    }

    pub fn label() -> Self {
        Self::feature().as_label()
    }

    pub fn text(options: TextOptions) -> Self {
        Self::of(Encoding::Text(options))
    }

    pub fn date_time(flags: DateTimeFlags) -> Self {
        Self::of(Encoding::DateTime(flags))
    }

    pub fn fixed_sequence(length: usize) -> Self {
        Self::of(Encoding::FixedSequence(length))
    }

    pub fn categorical() -> Self {
        Self::of(Encoding::Categorical)
    }

    pub fn as_label(mut self) -> Self {
        self.is_label = true;
        self
    }

    pub fn is_label(&self) -> bool {
        self.is_label
    }

    /// Property for member `name` of type `value_type`
    pub fn synthesize(&self, name: &str, value_type: &ValueType) -> Result<Property> {
        let property: Property = match &self.encoding {
            Encoding::Plain => match value_type {
                ValueType::Sequence(_) => {
                    return Err(Error::AmbiguousWidth {
                        feature: name.to_string(),
                    })
                }
                ValueType::DateTime => DateTimeProperty::new(name, DateTimeFlags::default()).into(),
                ValueType::Uuid => CategoricalProperty::new(name).into(),
                ValueType::String => TextProperty::new(name, TextOptions::default()).into(),
                other => ScalarProperty::new(name, other.clone()).into(),
            },
            Encoding::Text(options) => TextProperty::new(name, options.clone()).into(),
            Encoding::DateTime(flags) => DateTimeProperty::new(name, *flags).into(),
            Encoding::FixedSequence(length) => {
                let element = value_type.element().ok_or_else(|| {
                    Error::InvalidConfig(format!(
                        "'{}' is marked as a fixed sequence but has type {}",
                        name,
                        value_type.name()
                    ))
                })?;
                SequenceProperty::new(name, element.clone(), *length).into()
            }
            Encoding::Categorical => CategoricalProperty::new(name).into(),
        };
        Ok(property)
    }
}

/// One described member of `T`
pub struct Member<T> {
    pub name: &'static str,
    pub value_type: ValueType,
    pub marker: Option<Marker>,
    pub get: fn(&T) -> Value,
    pub set: fn(&mut T, Value) -> Result<()>,
}

/// A record type with a static member description, usually from [`shape!`](crate::shape)
pub trait Shape: Sized + 'static {
    fn type_name() -> &'static str;

    fn members() -> &'static [Member<Self>];
}

fn slot<T: Shape>(name: &str) -> Result<&'static Member<T>> {
    let members = T::members();
    resolve_member::<T>(name, || members.iter().position(|m| m.name == name))
        .and_then(|i| members.get(i))
        .ok_or_else(|| Error::MissingMember {
            member: name.to_string(),
        })
}

/// Read member `name` through the shape description
pub fn get_member<T: Shape>(item: &T, name: &str) -> Result<Value> {
    slot::<T>(name).map(|member| (member.get)(item))
}

/// Write member `name` through the shape description
pub fn set_member<T: Shape>(item: &mut T, name: &str, value: Value) -> Result<()> {
    let member = slot::<T>(name)?;
    (member.set)(item, value).map_err(|e| e.for_feature(name))
}

impl Descriptor {
    /// Descriptor synthesized from the markers of `T`'s members
    pub fn of<T: Shape>() -> Result<Self> {
        let mut descriptor = Descriptor::new().with_declared_type(T::type_name());
        for member in T::members() {
            if let Some(marker) = &member.marker {
                let property = marker.synthesize(member.name, &member.value_type)?;
                descriptor.add_property(property, marker.is_label())?;
            }
        }
        if descriptor.features().is_empty() {
            return Err(Error::EmptyDescriptor);
        }
        Ok(descriptor)
    }
}

/// Describe a struct's members for [`Descriptor::of`] and implement `Record` for it
///
/// Each member is `field: Type`, optionally followed by `=> marker`.
/// Unmarked members stay readable and writable but are not features.
#[macro_export]
macro_rules! shape {
    (@marker) => {
        None
    };
    (@marker $marker:expr) => {
        Some($marker)
    };
    ($ty:ident { $($field:ident : $fty:ty $(=> $marker:expr)?),* $(,)? }) => {
        impl $crate::Shape for $ty {
            fn type_name() -> &'static str {
                stringify!($ty)
            }

            fn members() -> &'static [$crate::Member<Self>] {
                static MEMBERS: ::std::sync::OnceLock<Vec<$crate::Member<$ty>>> = ::std::sync::OnceLock::new();
                MEMBERS.get_or_init(|| {
                    vec![$(
                        $crate::Member {
                            name: stringify!($field),
                            value_type: <$fty as $crate::FieldValue>::value_type(),
                            marker: $crate::shape!(@marker $($marker)?),
                            get: |item: &$ty| $crate::FieldValue::to_value(&item.$field),
                            set: |item: &mut $ty, value: $crate::Value| {
                                item.$field = <$fty as $crate::FieldValue>::from_value(value)?;
                                Ok(())
                            },
                        }
                    ),*]
                })
            }
        }

        impl $crate::Record for $ty {
            fn get(&self, name: &str) -> $crate::Result<$crate::Value> {
                $crate::shape::get_member(self, name)
            }

            fn set(&mut self, name: &str, value: $crate::Value) -> $crate::Result<()> {
                $crate::shape::set_member(self, name, value)
            }
        }
    };
}
