use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Descriptor has no features")]
    EmptyDescriptor,

    #[error("Duplicate label: '{second}' conflicts with existing label '{first}'")]
    DuplicateLabel { first: String, second: String },

    #[error("Duplicate feature: {0}")]
    DuplicateFeature(String),

    #[error("Feature '{feature}' is a collection; declare a fixed sequence length")]
    AmbiguousWidth { feature: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Feature '{feature}': cannot convert {found} (expected {expected})")]
    Unconvertible {
        feature: String,
        found: String,
        expected: String,
    },

    #[error("Feature '{feature}': dictionary/categories not populated, run dataset pre-processing first")]
    NotPrepared { feature: String },

    #[error("Feature '{feature}': value '{value}' is not in the learned dictionary/categories")]
    UnknownCategory { feature: String, value: String },

    #[error("Column index {index} out of range for vector length {len}")]
    ColumnOutOfRange { index: usize, len: usize },

    #[error("Feature '{feature}': produced {actual} values, expected {expected}")]
    LengthMismatch {
        feature: String,
        expected: usize,
        actual: usize,
    },

    #[error("Member not found: {member}")]
    MissingMember { member: String },

    #[error("Descriptor has no label")]
    NoLabel,

    #[error("Feature '{feature}': index {index} out of range for {len} entries")]
    IndexOutOfRange {
        feature: String,
        index: f64,
        len: usize,
    },

    #[error("Feature '{feature}' has no scalar inverse")]
    Irreversible { feature: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Attach a feature name to a codec failure raised without one.
    pub fn for_feature(self, name: &str) -> Self {
        match self {
            Error::Unconvertible { feature, found, expected } if feature.is_empty() => {
                Error::Unconvertible {
                    feature: name.to_string(),
                    found,
                    expected,
                }
            }
            other => other,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
