//! Descriptor: the ordered feature set of a record shape
//!
//! A descriptor owns its features and an optional label, drives the
//! dataset pre-process → convert → post-process pipeline, and pins the
//! column layout the first time a whole dataset is seen.

use crate::layout::Layout;
use crate::property::{Dataset, Feature, Property};
use atomicwrites::{AtomicFile, OverwriteBehavior};
use featurex_core::{Error, Matrix, Record, Result, Value, Vector};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::io::Write;
use std::path::Path;
use tracing::{debug, trace};

fn default_version() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Descriptor {
    /// Format version for future compatibility
    #[serde(default = "default_version")]
    pub version: u32,

    /// Name of the source shape, informational only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    declared_type: Option<String>,

    features: Vec<Property>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    label: Option<Property>,

    /// Pinned layout; absent until the first dataset pass
    #[serde(default, skip_serializing_if = "Option::is_none")]
    layout: Option<Layout>,
}

impl Default for Descriptor {
    fn default() -> Self {
        Self::new()
    }
}

impl Descriptor {
    pub fn new() -> Self {
        Self {
            version: default_version(),
            declared_type: None,
            features: Vec::new(),
            label: None,
            layout: None,
        }
    }

    pub fn with_declared_type(mut self, name: impl Into<String>) -> Self {
        self.declared_type = Some(name.into());
        self
    }

    pub fn declared_type(&self) -> Option<&str> {
        self.declared_type.as_deref()
    }

    pub(crate) fn set_declared_type(&mut self, name: impl Into<String>) {
        self.declared_type = Some(name.into());
    }

    /// Append a feature, or set the label
    ///
    /// Text labels are switched to enum mode so the label always occupies a
    /// single trailing value.
    pub fn add_property(&mut self, property: impl Into<Property>, is_label: bool) -> Result<()> {
        let mut property = property.into();
        if self.layout.is_some() {
            return Err(Error::InvalidConfig(format!(
                "cannot add '{}': layout is already pinned",
                property.name()
            )));
        }

        if is_label {
            if let Some(existing) = &self.label {
                return Err(Error::DuplicateLabel {
                    first: existing.name().to_string(),
                    second: property.name().to_string(),
                });
            }
            if let Property::Text(text) = &mut property {
                text.force_enum();
            }
            if property.length() != 1 {
                return Err(Error::InvalidConfig(format!(
                    "label '{}' must encode to a single value, not {}",
                    property.name(),
                    property.length()
                )));
            }
            self.label = Some(property);
            return Ok(());
        }

        if self.feature(property.name()).is_some() {
            return Err(Error::DuplicateFeature(property.name().to_string()));
        }
        self.features.push(property);
        Ok(())
    }

    #[inline]
    pub fn features(&self) -> &[Property] {
        &self.features
    }

    #[inline]
    pub fn label(&self) -> Option<&Property> {
        self.label.as_ref()
    }

    pub fn feature(&self, name: &str) -> Option<&Property> {
        self.features.iter().find(|f| f.name() == name)
    }

    pub fn feature_mut(&mut self, name: &str) -> Option<&mut Property> {
        self.features.iter_mut().find(|f| f.name() == name)
    }

    pub fn label_mut(&mut self) -> Option<&mut Property> {
        self.label.as_mut()
    }

    /// Pinned layout, or one derived from the current feature widths
    pub fn layout(&self) -> Cow<'_, Layout> {
        match &self.layout {
            Some(layout) => Cow::Borrowed(layout),
            None => Cow::Owned(Layout::from_features(&self.features)),
        }
    }

    #[inline]
    pub fn is_laid_out(&self) -> bool {
        self.layout.is_some()
    }

    /// Number of feature columns; the label is not counted
    pub fn vector_length(&self) -> usize {
        match &self.layout {
            Some(layout) => layout.vector_length(),
            None => self.features.iter().map(Feature::length).sum(),
        }
    }

    /// One name per feature column, in column order
    pub fn columns(&self) -> Vec<String> {
        self.features.iter().flat_map(|f| f.columns()).collect()
    }

    /// Feature whose span contains `column`
    pub fn feature_at(&self, column: usize) -> Result<&Property> {
        let (index, _) = self.layout().locate(column)?;
        Ok(&self.features[index])
    }

    pub fn column_name_at(&self, column: usize) -> Result<String> {
        let (index, offset) = self.layout().locate(column)?;
        let feature = &self.features[index];
        feature
            .columns()
            .into_iter()
            .nth(offset)
            .ok_or(Error::ColumnOutOfRange {
                index: column,
                len: self.vector_length(),
            })
    }

    /// Assign start offsets from the current widths and freeze them
    ///
    /// Pinning an already pinned descriptor only checks that no feature
    /// changed width since.
    pub fn pin_layout(&mut self) -> Result<()> {
        if self.features.is_empty() {
            return Err(Error::EmptyDescriptor);
        }
        let current = Layout::from_features(&self.features);

        if let Some(pinned) = &self.layout {
            for ((feature, expected), actual) in self.features.iter().zip(pinned.spans()).zip(current.spans()) {
                if expected.len() != actual.len() {
                    return Err(Error::LengthMismatch {
                        feature: feature.name().to_string(),
                        expected: expected.len(),
                        actual: actual.len(),
                    });
                }
            }
            return Ok(());
        }

        for (feature, span) in self.features.iter_mut().zip(current.spans()) {
            feature.meta_mut().start = Some(span.start);
        }
        if let Some(label) = &mut self.label {
            label.meta_mut().start = Some(current.vector_length());
        }
        debug!(
            "Pinned layout: {} features, vector length {}",
            self.features.len(),
            current.vector_length()
        );
        self.layout = Some(current);
        Ok(())
    }

    /// Encode one item
    ///
    /// On a descriptor that has not seen a dataset yet the layout is derived
    /// from current widths for this call only.
    pub fn convert<R: Record>(&self, item: &R, include_label: bool) -> Result<Vec<f64>> {
        if self.features.is_empty() {
            return Err(Error::EmptyDescriptor);
        }
        let layout = self.layout();
        self.convert_with_layout(item, include_label, &layout)
    }

    fn convert_with_layout<R: Record>(&self, item: &R, include_label: bool, layout: &Layout) -> Result<Vec<f64>> {
        let label = self.label.as_ref().filter(|_| include_label);
        let width = layout.vector_length() + label.map(Feature::length).unwrap_or(0);
        let mut row = vec![0.0; width];

        for (feature, span) in self.features.iter().zip(layout.spans()) {
            let value = item.get(feature.name())?;
            feature.pre_process_item(&value)?;
            let encoded = feature.convert(&value)?;
            if encoded.len() != span.len() {
                return Err(Error::LengthMismatch {
                    feature: feature.name().to_string(),
                    expected: span.len(),
                    actual: encoded.len(),
                });
            }
            row[span.clone()].copy_from_slice(&encoded);
            feature.post_process_item(&value)?;
        }

        if let Some(label) = label {
            let value = item.get(label.name())?;
            label.pre_process_item(&value)?;
            let encoded = label.convert(&value)?;
            let start = layout.vector_length();
            if encoded.len() != width - start {
                return Err(Error::LengthMismatch {
                    feature: label.name().to_string(),
                    expected: width - start,
                    actual: encoded.len(),
                });
            }
            row[start..].copy_from_slice(&encoded);
            label.post_process_item(&value)?;
        }

        trace!("Converted item into {} values", row.len());
        Ok(row)
    }

    fn pre_process_all<R: Record>(&mut self, dataset: &Dataset<'_, R>, include_label: bool) -> Result<()> {
        for feature in &mut self.features {
            feature.pre_process(dataset)?;
        }
        if include_label {
            if let Some(label) = &mut self.label {
                label.pre_process(dataset)?;
            }
        }
        Ok(())
    }

    fn post_process_all<R: Record>(&mut self, dataset: &Dataset<'_, R>, include_label: bool) -> Result<()> {
        for feature in &mut self.features {
            feature.post_process(dataset)?;
        }
        if include_label {
            if let Some(label) = &mut self.label {
                label.post_process(dataset)?;
            }
        }
        Ok(())
    }

    /// Dataset pre-processing followed by pinning
    ///
    /// On failure the features and label are left as they were before the call.
    fn prepare<R: Record>(&mut self, dataset: &Dataset<'_, R>, include_label: bool) -> Result<()> {
        let snapshot = (self.features.clone(), self.label.clone());
        let prepared = self
            .pre_process_all(dataset, include_label)
            .and_then(|()| self.pin_layout());
        if prepared.is_err() {
            (self.features, self.label) = snapshot;
        }
        prepared
    }

    /// Learn vocabularies and categories from `items` and pin the layout
    pub fn fit<R: Record>(&mut self, items: &[R]) -> Result<()> {
        if self.features.is_empty() {
            return Err(Error::EmptyDescriptor);
        }
        let dataset = Dataset::new(items);
        self.prepare(&dataset, true)?;
        self.post_process_all(&dataset, true)?;
        debug!("Fitted descriptor on {} items", dataset.len());
        Ok(())
    }

    /// Encode a whole dataset
    ///
    /// Every dataset hook runs exactly once: all pre-processing completes
    /// before the layout is pinned and the first item is converted, and
    /// post-processing runs after the last.
    pub fn convert_dataset<R: Record>(&mut self, items: &[R], include_labels: bool) -> Result<Vec<Vec<f64>>> {
        if self.features.is_empty() {
            return Err(Error::EmptyDescriptor);
        }
        let dataset = Dataset::new(items);
        self.prepare(&dataset, include_labels)?;

        let rows = {
            let layout = self.layout();
            items
                .iter()
                .map(|item| self.convert_with_layout(item, include_labels, &layout))
                .collect::<Result<Vec<_>>>()?
        };

        self.post_process_all(&dataset, include_labels)?;
        debug!(
            "Converted {} items into {} columns",
            rows.len(),
            self.vector_length()
        );
        Ok(rows)
    }

    /// Encode items with the vocabularies and layout already learned
    pub fn transform<R: Record>(&self, items: &[R], include_labels: bool) -> Result<Vec<Vec<f64>>> {
        items
            .iter()
            .map(|item| self.convert(item, include_labels))
            .collect()
    }

    pub fn to_vector<R: Record>(&self, item: &R) -> Result<Vector> {
        self.convert(item, false).map(Vector::from)
    }

    pub fn to_matrix<R: Record>(&mut self, items: &[R]) -> Result<Matrix> {
        let rows = self.convert_dataset(items, false)?;
        Matrix::from_rows_with_width(rows, self.vector_length())
    }

    /// Feature matrix plus the label column as a vector
    pub fn to_examples<R: Record>(&mut self, items: &[R]) -> Result<(Matrix, Vector)> {
        if self.label.is_none() {
            return Err(Error::NoLabel);
        }
        let rows = self.convert_dataset(items, true)?;
        let width = self.vector_length();
        let mut labels = Vec::with_capacity(rows.len());
        let mut features = Vec::with_capacity(rows.len());
        for mut row in rows {
            labels.push(row.get(width).copied().unwrap_or(f64::NAN));
            row.truncate(width);
            features.push(row);
        }
        Ok((Matrix::from_rows_with_width(features, width)?, Vector::from(labels)))
    }

    /// Decode a predicted label value
    pub fn label_value(&self, y: f64) -> Result<Value> {
        self.label.as_ref().ok_or(Error::NoLabel)?.convert_back(y)
    }

    /// Decode a predicted label value and write it onto `item`
    pub fn apply_prediction<R: Record>(&self, item: &mut R, y: f64) -> Result<Value> {
        let label = self.label.as_ref().ok_or(Error::NoLabel)?;
        let value = label.convert_back(y)?;
        item.set(label.name(), value.clone())?;
        Ok(value)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a descriptor, rejecting a stored layout that disagrees with its features
    pub fn from_json(json: &str) -> Result<Self> {
        let descriptor: Self = serde_json::from_str(json)?;
        descriptor.check_layout()?;
        Ok(descriptor)
    }

    fn check_layout(&self) -> Result<()> {
        let Some(pinned) = &self.layout else {
            return Ok(());
        };
        if Layout::from_starts(&self.features).as_ref() != Some(pinned) {
            return Err(Error::InvalidConfig(format!(
                "stored layout of {} spans does not match the starts and widths of {} features",
                pinned.len(),
                self.features.len()
            )));
        }
        if let Some(label) = &self.label {
            if label.start().is_some_and(|start| start != pinned.vector_length()) {
                return Err(Error::InvalidConfig(format!(
                    "label '{}' must start at column {}",
                    label.name(),
                    pinned.vector_length()
                )));
            }
        }
        Ok(())
    }

    /// Write the descriptor as JSON, replacing `path` atomically
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = self.to_json()?;
        AtomicFile::new(path.as_ref(), OverwriteBehavior::AllowOverwrite)
            .write(|file| file.write_all(json.as_bytes()))
            .map_err(|e| match e {
                atomicwrites::Error::Internal(e) | atomicwrites::Error::User(e) => Error::Io(e),
            })?;
        debug!("Saved descriptor to {}", path.as_ref().display());
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Descriptor")?;
        if let Some(name) = &self.declared_type {
            write!(f, " ({})", name)?;
        }
        writeln!(
            f,
            ": {} features, vector length {}{}",
            self.features.len(),
            self.vector_length(),
            if self.is_laid_out() { "" } else { " (not laid out)" }
        )?;

        let layout = self.layout();
        for (feature, span) in self.features.iter().zip(layout.spans()) {
            writeln!(
                f,
                "  [{}..{}) {} ({})",
                span.start,
                span.end,
                feature.name(),
                feature.kind()
            )?;
        }
        if let Some(label) = &self.label {
            writeln!(f, "  label {} ({})", label.name(), label.kind())?;
        }
        Ok(())
    }
}
