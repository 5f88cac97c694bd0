use serde::Deserialize;
use serde::Deserializer;
use serde::de::Error;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::pipeline::RunOptions;
use crate::spatial::GridRequest;
use crate::writer::OutputFormat;

pub mod error;
pub use error::ConfigError;

/// What a run derives: a named processor or a set of indicators.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    Processor {
        name: String,
        indicators: Vec<String>,
    },
    Indicators(Vec<String>),
}

/// Settings of one run, every field optional.
///
/// This is the on-disk shape of a run configuration and the shape command
/// line flags are collected into before both are merged and validated.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRunConfig {
    pub name: Option<String>,
    pub indicators: Option<Vec<String>>,
    pub input_path: Option<String>,
    pub output_path: Option<PathBuf>,
    pub roi: Option<String>,
    pub spatial_resolution: Option<f64>,
    pub variable_names: Option<Vec<String>>,
    pub roi_grid: Option<String>,
    pub destination_grid: Option<String>,
    pub format: Option<String>,
}

impl RawRunConfig {
    /// Reads settings without validating them, for merging with flags.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<RawRunConfig, ConfigError> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Fields set in `overrides` replace the ones in `self`.
    pub fn merge(self, overrides: RawRunConfig) -> RawRunConfig {
        RawRunConfig {
            name: overrides.name.or(self.name),
            indicators: overrides.indicators.or(self.indicators),
            input_path: overrides.input_path.or(self.input_path),
            output_path: overrides.output_path.or(self.output_path),
            roi: overrides.roi.or(self.roi),
            spatial_resolution: overrides.spatial_resolution.or(self.spatial_resolution),
            variable_names: overrides.variable_names.or(self.variable_names),
            roi_grid: overrides.roi_grid.or(self.roi_grid),
            destination_grid: overrides.destination_grid.or(self.destination_grid),
            format: overrides.format.or(self.format),
        }
    }
}

/// A validated run configuration.
#[derive(Debug, Clone)]
pub struct RunConfig {
    target: Target,
    input_path: String,
    output_path: PathBuf,
    roi: String,
    spatial_resolution: f64,
    variable_names: Option<Vec<String>>,
    roi_grid: Option<String>,
    destination_grid: Option<String>,
    format: OutputFormat,
}

// Deserializes through `RawRunConfig` so a config file gets the same
// validation as command line flags.
impl<'de> Deserialize<'de> for RunConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawRunConfig::deserialize(deserializer)?;
        RunConfig::try_from(raw).map_err(D::Error::custom)
    }
}

impl TryFrom<RawRunConfig> for RunConfig {
    type Error = ConfigError;

    fn try_from(raw: RawRunConfig) -> Result<Self, Self::Error> {
        let target = match (raw.name, raw.indicators) {
            (Some(name), indicators) => Target::Processor {
                name,
                indicators: indicators.unwrap_or_default(),
            },
            (None, Some(indicators)) if !indicators.is_empty() => Target::Indicators(indicators),
            _ => return Err(ConfigError::Target),
        };

        let roi = raw.roi.ok_or(ConfigError::MissingField("roi"))?;
        if roi.trim().is_empty() {
            return Err(ConfigError::EmptyRoi);
        }

        let spatial_resolution = raw
            .spatial_resolution
            .ok_or(ConfigError::MissingField("spatial_resolution"))?;
        if !(spatial_resolution.is_finite() && spatial_resolution > 0.0) {
            return Err(ConfigError::SpatialResolution(spatial_resolution));
        }

        let format = raw
            .format
            .as_deref()
            .map(OutputFormat::from)
            .unwrap_or_default();

        Ok(RunConfig {
            target,
            input_path: raw.input_path.ok_or(ConfigError::MissingField("input_path"))?,
            output_path: raw
                .output_path
                .ok_or(ConfigError::MissingField("output_path"))?,
            roi,
            spatial_resolution,
            variable_names: raw.variable_names,
            roi_grid: raw.roi_grid,
            destination_grid: raw.destination_grid,
            format,
        })
    }
}

impl RunConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<RunConfig, ConfigError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);

        let config: RunConfig = serde_json::from_reader(reader).map_err(ConfigError::from)?;

        Ok(config)
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn format(&self) -> &OutputFormat {
        &self.format
    }

    pub fn run_options(&self) -> RunOptions {
        let mut grid = GridRequest::new(self.roi.as_str(), self.spatial_resolution);
        grid.roi_grid = self.roi_grid.clone();
        grid.destination_grid = self.destination_grid.clone();

        RunOptions {
            data_path: self.input_path.clone(),
            output_path: self.output_path.clone(),
            grid,
            variable_names: self.variable_names.clone(),
            format: self.format.clone(),
        }
    }
}
