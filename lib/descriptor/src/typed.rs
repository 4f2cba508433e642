//! Selector-based fluent construction for a statically known record type
//!
//! Members are named through [`select!`](crate::select), so a misspelled
//! field fails to compile, and the available encodings follow the field's
//! Rust type.
//!
//! ```rust
//! use featurex_descriptor::{select, TypedBuilder, TextOptions};
//!
//! struct Review {
//!     stars: u8,
//!     body: String,
//!     helpful: bool,
//! }
//!
//! let descriptor = TypedBuilder::<Review>::new()
//!     .with(select!(Review, stars)).as_scalar()
//!     .with(select!(Review, body)).as_text(TextOptions::default())
//!     .learn(select!(Review, helpful)).as_scalar()
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(descriptor.declared_type(), Some("Review"));
//! ```

use crate::builder::{DescriptorBuilder, PropertyBuilder};
use crate::descriptor::Descriptor;
use crate::property::{DateTimeFlags, DateTimePortion, TextOptions};
use chrono::NaiveDateTime;
use featurex_core::{FieldValue, Result, Scalar};
use std::marker::PhantomData;
use uuid::Uuid;

/// Compile-time reference to field `name` of `T`, holding a value of `V`
pub struct Selector<T, V> {
    name: &'static str,
    get: fn(&T) -> &V,
}

impl<T, V> Selector<T, V> {
    pub fn new(name: &'static str, get: fn(&T) -> &V) -> Self {
        Self { name, get }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn read<'a>(&self, item: &'a T) -> &'a V {
        (self.get)(item)
    }
}

impl<T, V> Clone for Selector<T, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, V> Copy for Selector<T, V> {}

/// Build a [`Selector`] for `field` of `Type`
#[macro_export]
macro_rules! select {
    ($ty:ty, $field:ident) => {
        $crate::Selector::<$ty, _>::new(stringify!($field), |item: &$ty| &item.$field)
    };
}

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}

pub struct TypedBuilder<T> {
    inner: DescriptorBuilder,
    shape: PhantomData<fn() -> T>,
}

impl<T> Default for TypedBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TypedBuilder<T> {
    pub fn new() -> Self {
        Self {
            inner: DescriptorBuilder::new().declared_type(short_type_name::<T>()),
            shape: PhantomData,
        }
    }

    pub fn with<V>(self, selector: Selector<T, V>) -> TypedProperty<T, V> {
        TypedProperty {
            inner: self.inner.with(selector.name()),
            shape: PhantomData,
        }
    }

    pub fn learn<V>(self, selector: Selector<T, V>) -> TypedProperty<T, V> {
        TypedProperty {
            inner: self.inner.learn(selector.name()),
            shape: PhantomData,
        }
    }

    pub fn build(self) -> Result<Descriptor> {
        self.inner.build()
    }
}

/// Pending property on a selected member of type `V`
pub struct TypedProperty<T, V> {
    inner: PropertyBuilder,
    shape: PhantomData<fn() -> (T, V)>,
}

impl<T, V> TypedProperty<T, V> {
    fn done(builder: DescriptorBuilder) -> TypedBuilder<T> {
        TypedBuilder {
            inner: builder,
            shape: PhantomData,
        }
    }
}

impl<T, V: Scalar> TypedProperty<T, V> {
    /// Single column through the scalar codec
    pub fn as_scalar(self) -> TypedBuilder<T> {
        Self::done(self.inner.as_type(V::value_type()))
    }
}

impl<T> TypedProperty<T, String> {
    pub fn as_text(self, options: TextOptions) -> TypedBuilder<T> {
        Self::done(self.inner.as_text(options))
    }

    pub fn as_string_enum(self) -> TypedBuilder<T> {
        Self::done(self.inner.as_string_enum())
    }

    pub fn as_categorical(self) -> TypedBuilder<T> {
        Self::done(self.inner.as_categorical())
    }
}

impl<T> TypedProperty<T, NaiveDateTime> {
    pub fn as_date_time(self, flags: DateTimeFlags) -> TypedBuilder<T> {
        Self::done(self.inner.as_date_time(flags))
    }

    pub fn as_date_portion(self, portion: DateTimePortion) -> TypedBuilder<T> {
        Self::done(self.inner.as_date_portion(portion))
    }
}

impl<T, E: FieldValue> TypedProperty<T, Vec<E>> {
    pub fn as_fixed_sequence(self, length: usize) -> TypedBuilder<T> {
        Self::done(self.inner.as_fixed_sequence(E::value_type(), length))
    }
}

impl<T> TypedProperty<T, Uuid> {
    pub fn as_categorical(self) -> TypedBuilder<T> {
        Self::done(self.inner.as_categorical())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::Feature;
    use featurex_core::{field_enum, Error, ValueType};

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Tier {
        Free,
        Pro,
    }
    field_enum!(Tier { Free, Pro });

    #[allow(dead_code)]
    struct Account {
        id: Uuid,
        tier: Tier,
        opened: NaiveDateTime,
        balances: Vec<f64>,
        name: String,
        active: bool,
    }

    #[test]
    fn test_selector_reads_field() {
        let active = select!(Account, active);
        assert_eq!(active.name(), "active");
        let account = Account {
            id: Uuid::nil(),
            tier: Tier::Pro,
            opened: chrono::NaiveDate::from_ymd_opt(2020, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap(),
            balances: vec![1.0],
            name: "a".to_string(),
            active: true,
        };
        assert!(*active.read(&account));
        assert_eq!(*select!(Account, tier).read(&account), Tier::Pro);
    }

    #[test]
    fn test_variants_follow_field_types() {
        let d = TypedBuilder::<Account>::new()
            .with(select!(Account, id)).as_categorical()
            .with(select!(Account, tier)).as_scalar()
            .with(select!(Account, opened)).as_date_portion(DateTimePortion::DATE)
            .with(select!(Account, balances)).as_fixed_sequence(4)
            .with(select!(Account, name)).as_string_enum()
            .learn(select!(Account, active)).as_scalar()
            .build()
            .unwrap();

        assert_eq!(d.declared_type(), Some("Account"));
        let kinds: Vec<&str> = d.features().iter().map(|f| f.kind()).collect();
        assert_eq!(kinds, vec!["categorical_id", "scalar", "date_time", "fixed_sequence", "text"]);
        assert!(matches!(d.features()[1].declared_type(), ValueType::Enum(e) if e.name == "Tier"));
        assert_eq!(d.features()[2].length(), 3);
        assert_eq!(d.features()[3].length(), 4);
        assert_eq!(d.vector_length(), 1 + 1 + 3 + 4 + 1);
    }

    #[test]
    fn test_duplicate_selector() {
        let err = TypedBuilder::<Account>::new()
            .with(select!(Account, active)).as_scalar()
            .with(select!(Account, active)).as_scalar()
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateFeature(ref name) if name == "active"));
    }
}
