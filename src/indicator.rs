use std::collections::BTreeMap;
use std::fmt::Display;
use std::path::PathBuf;

use ndarray::Array2;

/// Indicator arrays keyed by indicator short name.
pub type IndicatorArrays = BTreeMap<String, Array2<f32>>;

/// Describes one indicator a processor factory can produce.
///
/// Two descriptions are the same indicator when both the short name and the
/// description match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndicatorDescription {
    pub short_name: String,
    pub description: String,
}

impl IndicatorDescription {
    pub fn new(short_name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            short_name: short_name.into(),
            description: description.into(),
        }
    }
}

impl Display for IndicatorDescription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.short_name, self.description)
    }
}

/// A computed indicator array paired with the file it will be written to.
#[derive(Debug, Clone)]
pub struct IndicatorRaster {
    pub file_name: PathBuf,
    pub data: Array2<f32>,
}
