//! Column layout
//!
//! Assigning column offsets is a separate step from computing feature
//! widths. Corpus-dependent widths must be final before [`Layout::finalize`]
//! runs, otherwise offsets are computed against a stale vocabulary size.

use crate::property::{Feature, Property};
use featurex_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Half-open column span per feature, in feature order
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Layout {
    spans: Vec<Range<usize>>,
}

impl Layout {
    /// Contiguous spans for features of the given widths
    pub fn finalize(lengths: impl IntoIterator<Item = usize>) -> Self {
        let mut start = 0;
        let spans = lengths
            .into_iter()
            .map(|len| {
                let span = start..start + len;
                start += len;
                span
            })
            .collect();
        Self { spans }
    }

    pub fn from_features(features: &[Property]) -> Self {
        Self::finalize(features.iter().map(Feature::length))
    }

    /// Rebuild from offsets already stored on the features
    ///
    /// Returns `None` when any feature is missing its start or the stored
    /// offsets are not contiguous with the current widths.
    pub fn from_starts(features: &[Property]) -> Option<Self> {
        let layout = Self::from_features(features);
        let consistent = features
            .iter()
            .zip(&layout.spans)
            .all(|(feature, span)| feature.start() == Some(span.start));
        consistent.then_some(layout)
    }

    /// Total width of all features
    #[inline]
    pub fn vector_length(&self) -> usize {
        self.spans.last().map(|s| s.end).unwrap_or(0)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn span(&self, feature: usize) -> Option<Range<usize>> {
        self.spans.get(feature).cloned()
    }

    pub fn spans(&self) -> &[Range<usize>] {
        &self.spans
    }

    /// Feature index owning `column`, and the column's offset within it
    pub fn locate(&self, column: usize) -> Result<(usize, usize)> {
        let len = self.vector_length();
        if column >= len {
            return Err(Error::ColumnOutOfRange { index: column, len });
        }
        // zero-width spans never contain a column; the first span ending past it owns it
        let feature = self.spans.partition_point(|span| span.end <= column);
        let span = &self.spans[feature];
        Ok((feature, column - span.start))
    }
}
