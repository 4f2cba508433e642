use super::{Encoded, Feature, PropertyMeta};
use featurex_core::{codec, Error, Result, Value, ValueType};
use serde::{Deserialize, Serialize};
use smallvec::smallvec;

/// One member, one column, encoded through the scalar codec
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarProperty {
    #[serde(flatten)]
    meta: PropertyMeta,
}

impl ScalarProperty {
    pub fn new(name: impl Into<String>, declared_type: ValueType) -> Self {
        Self {
            meta: PropertyMeta::new(name, declared_type),
        }
    }
}

impl Feature for ScalarProperty {
    fn meta(&self) -> &PropertyMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut PropertyMeta {
        &mut self.meta
    }

    fn length(&self) -> usize {
        1
    }

    fn convert(&self, value: &Value) -> Result<Encoded> {
        if !codec::is_scalar_encodable(&self.meta.declared_type) || !codec::is_scalar_value(value) {
            return Err(Error::Unconvertible {
                feature: self.meta.name.clone(),
                found: value.kind().to_string(),
                expected: self.meta.declared_type.name(),
            });
        }
        let encoded = codec::encode_as(value, &self.meta.declared_type)
            .map_err(|e| e.for_feature(&self.meta.name))?;
        Ok(smallvec![encoded])
    }

    fn convert_back(&self, value: f64) -> Result<Value> {
        codec::double_to_scalar(value, &self.meta.declared_type).map_err(|e| e.for_feature(&self.meta.name))
    }

    fn columns(&self) -> Vec<String> {
        vec![self.meta.name.clone()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use featurex_core::EnumType;

    #[test]
    fn test_numeric_and_bool() {
        let age = ScalarProperty::new("Age", ValueType::I32);
        assert_eq!(age.convert(&Value::Int(23)).unwrap().as_slice(), &[23.0]);
        assert!(!age.meta().discrete);

        let good = ScalarProperty::new("Good", ValueType::Bool);
        assert_eq!(good.convert(&Value::Bool(false)).unwrap().as_slice(), &[-1.0]);
        assert!(good.meta().discrete);
        assert_eq!(good.convert_back(0.9).unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_enum_from_name_and_back() {
        let color = ScalarProperty::new("Color", ValueType::Enum(EnumType::new("Color", &["Red", "Green"])));
        assert_eq!(color.convert(&Value::from("Green")).unwrap().as_slice(), &[1.0]);
        match color.convert_back(0.0).unwrap() {
            Value::Enum(e) => assert_eq!(e.variant, "Red"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_rejects_non_scalar() {
        let age = ScalarProperty::new("Age", ValueType::I32);
        let err = age.convert(&Value::List(vec![Value::Int(1)])).unwrap_err();
        assert!(matches!(err, Error::Unconvertible { ref feature, .. } if feature == "Age"));

        let err = age.convert(&Value::from("twelve")).unwrap_err();
        assert!(matches!(err, Error::Unconvertible { ref feature, .. } if feature == "Age"));
    }

    #[test]
    fn test_null_is_nan() {
        let height = ScalarProperty::new("Height", ValueType::F64);
        assert!(height.convert(&Value::Null).unwrap()[0].is_nan());
    }

    #[test]
    fn test_columns() {
        assert_eq!(ScalarProperty::new("Weight", ValueType::F64).columns(), vec!["Weight"]);
    }
}
