use super::{Dataset, Encoded, Feature, PropertyMeta};
use featurex_core::{codec, Error, Record, Result, Value, ValueType};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::trace;

static ANY: ValueType = ValueType::Any;

/// A collection member flattened into exactly `length` columns
///
/// Short collections are zero-padded and long ones truncated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceProperty {
    #[serde(flatten)]
    meta: PropertyMeta,
    length: usize,
}

impl SequenceProperty {
    pub fn new(name: impl Into<String>, element_type: ValueType, length: usize) -> Self {
        let discrete = element_type.is_discrete();
        let mut meta = PropertyMeta::new(name, ValueType::Sequence(Box::new(element_type)));
        meta.discrete = discrete;
        Self { meta, length }
    }

    pub fn element_type(&self) -> &ValueType {
        self.meta.declared_type.element().unwrap_or(&ANY)
    }

    fn unconvertible(&self, found: &Value, expected: &str) -> Error {
        Error::Unconvertible {
            feature: self.meta.name.clone(),
            found: found.kind().to_string(),
            expected: expected.to_string(),
        }
    }

    fn elements(&self, value: &Value) -> Result<Vec<Value>> {
        match value {
            Value::List(items) => Ok(items.iter().take(self.length).cloned().collect()),
            Value::Text(s) if *self.element_type() == ValueType::Char => {
                Ok(s.chars().take(self.length).map(Value::Char).collect())
            }
            other => Err(self.unconvertible(other, "sequence")),
        }
    }
}

impl Feature for SequenceProperty {
    fn meta(&self) -> &PropertyMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut PropertyMeta {
        &mut self.meta
    }

    fn length(&self) -> usize {
        self.length
    }

    fn pre_process<R: Record>(&mut self, dataset: &Dataset<'_, R>) -> Result<()> {
        if *self.element_type() != ValueType::Any {
            return Ok(());
        }
        let name = self.meta.name.clone();
        for value in dataset.column(&name) {
            if let Some(first) = self.elements(&value?)?.into_iter().next() {
                self.meta.discrete = first.is_discrete();
                trace!("'{}' elements are {}", name, first.kind());
                break;
            }
        }
        Ok(())
    }

    fn convert(&self, value: &Value) -> Result<Encoded> {
        let elements = self.elements(value)?;
        if let Some(first) = elements.first() {
            if !codec::is_scalar_value(first) || !codec::is_scalar_encodable(self.element_type()) {
                return Err(self.unconvertible(first, "scalar element"));
            }
        }

        let mut encoded: Encoded = SmallVec::with_capacity(self.length);
        for element in &elements {
            let x = codec::encode_as(element, self.element_type()).map_err(|e| e.for_feature(&self.meta.name))?;
            encoded.push(x);
        }
        encoded.resize(self.length, 0.0);
        Ok(encoded)
    }

    fn convert_back(&self, _value: f64) -> Result<Value> {
        Err(Error::Irreversible {
            feature: self.meta.name.clone(),
        })
    }

    fn columns(&self) -> Vec<String> {
        (0..self.length).map(|i| format!("{}_{}", self.meta.name, i)).collect()
    }
}
