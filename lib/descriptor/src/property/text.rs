//! Text features
//!
//! Strings are sanitized and tokenized against a vocabulary learned from the
//! whole corpus. In histogram mode every vocabulary entry owns one column
//! holding its token count; in enum mode the whole sanitized string is a
//! single categorical index.

use super::{Dataset, Encoded, Feature, PropertyMeta, Vocabulary};
use featurex_core::{Error, Record, Result, Value, ValueType};
use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};
use std::borrow::Cow;
use tracing::debug;

/// Token standing in for any numeric word
pub const NUMBER: &str = "#NUM#";
/// Token standing in for empty or blank input
pub const EMPTY: &str = "#EMPTY#";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitMode {
    Character,
    #[default]
    Word,
}

/// Construction parameters for a [`TextProperty`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextOptions {
    #[serde(default = "default_separator")]
    pub separator: String,
    #[serde(default)]
    pub split_mode: SplitMode,
    #[serde(default)]
    pub as_enum: bool,
    #[serde(default)]
    pub exclude: Vec<String>,
}

fn default_separator() -> String {
    " ".to_string()
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            separator: default_separator(),
            split_mode: SplitMode::Word,
            as_enum: false,
            exclude: Vec::new(),
        }
    }
}

impl TextOptions {
    pub fn as_enum() -> Self {
        Self {
            as_enum: true,
            ..Self::default()
        }
    }

    pub fn characters() -> Self {
        Self {
            split_mode: SplitMode::Character,
            ..Self::default()
        }
    }

    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    pub fn exclude<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(words.into_iter().map(Into::into));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextProperty {
    #[serde(flatten)]
    meta: PropertyMeta,
    #[serde(default = "default_separator")]
    separator: String,
    #[serde(default)]
    split_mode: SplitMode,
    #[serde(default)]
    dictionary: Vocabulary<String>,
    #[serde(default)]
    exclude: Vec<String>,
    #[serde(default)]
    as_enum: bool,
}

impl TextProperty {
    pub fn new(name: impl Into<String>, options: TextOptions) -> Self {
        let mut meta = PropertyMeta::new(name, ValueType::String);
        meta.discrete = true;
        Self {
            meta,
            separator: options.separator,
            split_mode: options.split_mode,
            dictionary: Vocabulary::new(),
            exclude: options.exclude.iter().map(|w| sanitize(w).into_owned()).collect(),
            as_enum: options.as_enum,
        }
    }

    pub fn dictionary(&self) -> &Vocabulary<String> {
        &self.dictionary
    }

    pub fn as_enum(&self) -> bool {
        self.as_enum
    }

    pub fn split_mode(&self) -> SplitMode {
        self.split_mode
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    pub(crate) fn force_enum(&mut self) {
        if !self.as_enum {
            self.as_enum = true;
            self.dictionary.clear();
        }
    }

    /// Replace the learned vocabulary, e.g. with one fitted elsewhere
    pub fn set_dictionary(&mut self, entries: impl IntoIterator<Item = String>) {
        self.dictionary = Vocabulary::from_entries(entries);
    }

    /// Tokens of `text` in order, after sanitizing and exclusion
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return vec![EMPTY.to_string()];
        }

        let raw: Vec<String> = match self.split_mode {
            SplitMode::Character => text
                .chars()
                .filter(|c| !c.is_whitespace())
                .map(|c| c.to_string())
                .collect(),
            SplitMode::Word => {
                let separators: Vec<char> = self.separator.chars().collect();
                text.split(|c: char| separators.contains(&c) || (separators.is_empty() && c.is_whitespace()))
                    .map(str::to_string)
                    .collect()
            }
        };

        raw.iter()
            .map(|token| sanitize(token).into_owned())
            .filter(|token| token != EMPTY)
            .filter(|token| !self.exclude.contains(token))
            .collect()
    }

    fn text_of<'v>(&self, value: &'v Value) -> Result<Cow<'v, str>> {
        match value {
            Value::Text(s) => Ok(Cow::Borrowed(s)),
            Value::Null => Ok(Cow::Borrowed("")),
            Value::Char(c) => Ok(Cow::Owned(c.to_string())),
            Value::Enum(e) => Ok(Cow::Borrowed(&e.variant)),
            Value::Bool(b) => Ok(Cow::Owned(b.to_string())),
            Value::Int(i) => Ok(Cow::Owned(i.to_string())),
            Value::UInt(u) => Ok(Cow::Owned(u.to_string())),
            Value::Float(f) => Ok(Cow::Owned(f.to_string())),
            other => Err(Error::Unconvertible {
                feature: self.meta.name.clone(),
                found: other.kind().to_string(),
                expected: "string".to_string(),
            }),
        }
    }
}

/// Uppercase, strip symbols and fold numbers and blanks to sentinels
pub fn sanitize(text: &str) -> Cow<'_, str> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Cow::Borrowed(EMPTY);
    }
    if trimmed.chars().any(|c| c.is_ascii_digit()) && trimmed.parse::<f64>().is_ok() {
        return Cow::Borrowed(NUMBER);
    }

    let mut cleaned = String::with_capacity(trimmed.len());
    let mut pending_space = false;
    for c in trimmed.chars() {
        if c.is_alphanumeric() {
            if pending_space && !cleaned.is_empty() {
                cleaned.push(' ');
            }
            pending_space = false;
            cleaned.extend(c.to_uppercase());
        } else if c.is_whitespace() {
            pending_space = true;
        }
    }

    if cleaned.is_empty() {
        Cow::Borrowed(EMPTY)
    } else if cleaned.chars().all(|c| c.is_ascii_digit()) {
        Cow::Borrowed(NUMBER)
    } else {
        Cow::Owned(cleaned)
    }
}

impl Feature for TextProperty {
    fn meta(&self) -> &PropertyMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut PropertyMeta {
        &mut self.meta
    }

    fn length(&self) -> usize {
        if self.as_enum {
            1
        } else {
            self.dictionary.len()
        }
    }

    fn pre_process<R: Record>(&mut self, dataset: &Dataset<'_, R>) -> Result<()> {
        let mut dictionary = Vocabulary::new();
        for value in dataset.column(&self.meta.name) {
            let value = value?;
            let text = self.text_of(&value)?;
            if self.as_enum {
                dictionary.insert(sanitize(&text).into_owned());
            } else {
                for token in self.tokenize(&text) {
                    dictionary.insert(token);
                }
            }
        }
        self.dictionary = dictionary;

        debug!(
            "Learned {} {} for '{}' from {} items",
            self.dictionary.len(),
            if self.as_enum { "categories" } else { "tokens" },
            self.meta.name,
            dataset.len()
        );
        Ok(())
    }

    fn convert(&self, value: &Value) -> Result<Encoded> {
        if self.dictionary.is_empty() {
            return Err(Error::NotPrepared {
                feature: self.meta.name.clone(),
            });
        }

        let text = self.text_of(value)?;
        if self.as_enum {
            let key = sanitize(&text).into_owned();
            let index = self
                .dictionary
                .position(&key)
                .ok_or_else(|| Error::UnknownCategory {
                    feature: self.meta.name.clone(),
                    value: key.clone(),
                })?;
            return Ok(smallvec![index as f64]);
        }

        let mut counts: Encoded = SmallVec::from_elem(0.0, self.dictionary.len());
        for token in self.tokenize(&text) {
            if let Some(index) = self.dictionary.position(&token) {
                counts[index] += 1.0;
            }
        }
        Ok(counts)
    }

    fn convert_back(&self, value: f64) -> Result<Value> {
        if !self.as_enum {
            return Err(Error::Irreversible {
                feature: self.meta.name.clone(),
            });
        }
        if value.is_nan() {
            return Ok(Value::Null);
        }

        let index = value.round();
        if index < 0.0 {
            return Err(self.out_of_range(value));
        }
        self.dictionary
            .get(index as usize)
            .map(|entry| Value::Text(entry.clone()))
            .ok_or_else(|| self.out_of_range(value))
    }

    fn columns(&self) -> Vec<String> {
        if self.as_enum {
            vec![self.meta.name.clone()]
        } else {
            self.dictionary.iter().cloned().collect()
        }
    }
}

impl TextProperty {
    fn out_of_range(&self, index: f64) -> Error {
        Error::IndexOutOfRange {
            feature: self.meta.name.clone(),
            index,
            len: self.dictionary.len(),
        }
    }
}
