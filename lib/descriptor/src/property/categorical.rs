use super::{Dataset, Encoded, Feature, PropertyMeta, Vocabulary};
use featurex_core::{Error, Identifier, Record, Result, Value, ValueType};
use serde::{Deserialize, Serialize};
use smallvec::smallvec;
use tracing::debug;

/// Identifier member encoded as its index among the ids seen in the corpus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalProperty {
    #[serde(flatten)]
    meta: PropertyMeta,
    #[serde(default)]
    categories: Vocabulary<Identifier>,
}

impl CategoricalProperty {
    pub fn new(name: impl Into<String>) -> Self {
        let mut meta = PropertyMeta::new(name, ValueType::Uuid);
        meta.discrete = true;
        Self {
            meta,
            categories: Vocabulary::new(),
        }
    }

    pub fn categories(&self) -> &Vocabulary<Identifier> {
        &self.categories
    }

    /// Replace the learned categories, e.g. with ones fitted elsewhere
    pub fn set_categories(&mut self, ids: impl IntoIterator<Item = Identifier>) {
        self.categories = Vocabulary::from_entries(ids);
    }

    fn identifier(&self, value: &Value) -> Result<Identifier> {
        Identifier::from_value(value).ok_or_else(|| Error::Unconvertible {
            feature: self.meta.name.clone(),
            found: value.kind().to_string(),
            expected: "identifier".to_string(),
        })
    }

    fn out_of_range(&self, index: f64) -> Error {
        Error::IndexOutOfRange {
            feature: self.meta.name.clone(),
            index,
            len: self.categories.len(),
        }
    }
}

impl Feature for CategoricalProperty {
    fn meta(&self) -> &PropertyMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut PropertyMeta {
        &mut self.meta
    }

    fn length(&self) -> usize {
        1
    }

    fn pre_process<R: Record>(&mut self, dataset: &Dataset<'_, R>) -> Result<()> {
        let mut categories = Vocabulary::new();
        for value in dataset.column(&self.meta.name) {
            categories.insert(self.identifier(&value?)?);
        }
        self.categories = categories;
        debug!("Learned {} categories for '{}'", self.categories.len(), self.meta.name);
        Ok(())
    }

    fn convert(&self, value: &Value) -> Result<Encoded> {
        if self.categories.is_empty() {
            return Err(Error::NotPrepared {
                feature: self.meta.name.clone(),
            });
        }
        let id = self.identifier(value)?;
        let index = self.categories.position(&id).ok_or_else(|| Error::UnknownCategory {
            feature: self.meta.name.clone(),
            value: id.to_string(),
        })?;
        Ok(smallvec![index as f64])
    }

    fn convert_back(&self, value: f64) -> Result<Value> {
        if value.is_nan() {
            return Ok(Value::Null);
        }
        let index = value.round();
        if index < 0.0 {
            return Err(self.out_of_range(value));
        }
        self.categories
            .get(index as usize)
            .map(Identifier::to_value)
            .ok_or_else(|| self.out_of_range(value))
    }

    fn columns(&self) -> Vec<String> {
        vec![self.meta.name.clone()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    #[test]
    fn test_first_occurrence_order() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let rows = vec![
            json!({"Account": a.to_string()}),
            json!({"Account": b.to_string()}),
            json!({"Account": a.to_string()}),
        ];
        let mut account = CategoricalProperty::new("Account");
        account.pre_process(&Dataset::new(&rows)).unwrap();

        assert_eq!(account.categories().as_slice(), &[Identifier::Uuid(a), Identifier::Uuid(b)]);
        assert_eq!(account.convert(&Value::Uuid(b)).unwrap().as_slice(), &[1.0]);
        assert_eq!(account.convert(&Value::from(a.to_string())).unwrap().as_slice(), &[0.0]);
        assert_eq!(account.convert_back(1.0).unwrap(), Value::Uuid(b));
    }

    #[test]
    fn test_integer_and_string_ids() {
        let rows = vec![json!({"Store": 17}), json!({"Store": "north"})];
        let mut store = CategoricalProperty::new("Store");
        store.pre_process(&Dataset::new(&rows)).unwrap();
        assert_eq!(store.convert(&Value::from("north")).unwrap().as_slice(), &[1.0]);
        assert_eq!(store.convert_back(0.0).unwrap(), Value::Int(17));
    }

    #[test]
    fn test_miss_is_fatal() {
        let mut account = CategoricalProperty::new("Account");
        account.set_categories([Identifier::from(1i64)]);
        let err = account.convert(&Value::Int(2)).unwrap_err();
        assert!(matches!(err, Error::UnknownCategory { ref value, .. } if value == "2"));
    }

    #[test]
    fn test_not_prepared() {
        let account = CategoricalProperty::new("Account");
        assert!(matches!(
            account.convert(&Value::Uuid(Uuid::new_v4())),
            Err(Error::NotPrepared { .. })
        ));
    }

    #[test]
    fn test_convert_back_out_of_range() {
        let mut account = CategoricalProperty::new("Account");
        account.set_categories([Identifier::from(1i64), Identifier::from(2i64)]);
        assert!(matches!(account.convert_back(2.0), Err(Error::IndexOutOfRange { len: 2, .. })));
        assert!(matches!(account.convert_back(-3.0), Err(Error::IndexOutOfRange { .. })));
        assert_eq!(account.convert_back(f64::NAN).unwrap(), Value::Null);
    }
}
