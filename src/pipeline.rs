//! Orchestration of post-processing runs.
//!
//! A run resolves processors from the [`Registry`], assembles their inputs
//! according to the processor variant and writes every indicator they
//! return:
//!
//! - observation processors get the observations of each window between two
//!   consecutive acquisition dates, outputs are named after both dates;
//! - variable processors get the requested variables of each acquisition
//!   date, outputs are named after that date.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use gdal::Dataset;
use tracing::{debug, info};

use crate::discovery::{FileDiscovery, NamingConvention};
use crate::error::{PipelineError, Result};
use crate::indicator::{IndicatorArrays, IndicatorRaster};
use crate::observations::Observations;
use crate::processor::{ObservationProcessor, Processor, VariableProcessor};
use crate::registry::Registry;
use crate::spatial::GridRequest;
use crate::temporal;
use crate::writer::{self, OutputFormat};

/// Inputs and outputs of one run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub data_path: String,
    pub output_path: PathBuf,
    pub grid: GridRequest,
    /// Required by variable processors only.
    pub variable_names: Option<Vec<String>>,
    pub format: OutputFormat,
}

impl RunOptions {
    pub fn new(data_path: impl Into<String>, output_path: impl Into<PathBuf>, grid: GridRequest) -> Self {
        Self {
            data_path: data_path.into(),
            output_path: output_path.into(),
            grid,
            variable_names: None,
            format: OutputFormat::default(),
        }
    }

    pub fn with_variable_names(mut self, variable_names: Vec<String>) -> Self {
        self.variable_names = Some(variable_names);
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }
}

pub struct Pipeline<'r, D = NamingConvention> {
    registry: &'r Registry,
    discovery: D,
}

impl<'r> Pipeline<'r, NamingConvention> {
    pub fn with_naming_convention(registry: &'r Registry) -> Self {
        Self::new(registry, NamingConvention::new())
    }
}

impl<'r, D: FileDiscovery> Pipeline<'r, D> {
    pub fn new(registry: &'r Registry, discovery: D) -> Self {
        Self {
            registry,
            discovery,
        }
    }

    /// Derives `indicator_names` with every processor that declares any of them.
    pub fn run_indicators(&self, indicator_names: &[String], options: &RunOptions) -> Result<Vec<PathBuf>> {
        let processors = self.registry.resolve_by_indicators(indicator_names);
        if processors.is_empty() {
            info!("No post processor derives any of {:?}", indicator_names);
        }

        let mut written = Vec::new();
        for processor in &processors {
            written.extend(self.run(processor, options)?);
        }
        Ok(written)
    }

    /// Runs the processor registered as `name`.
    pub fn run_processor(
        &self,
        name: &str,
        indicator_names: &[String],
        options: &RunOptions,
    ) -> Result<Vec<PathBuf>> {
        let processor = self.registry.resolve_by_name(name, indicator_names)?;
        self.run(&processor, options)
    }

    pub fn run(&self, processor: &Processor, options: &RunOptions) -> Result<Vec<PathBuf>> {
        info!("Running post processor {}", processor.name());
        match processor {
            Processor::Observation(processor) => {
                self.run_observation_processor(processor.as_ref(), options)
            }
            Processor::Variable(processor) => {
                let variable_names = options.variable_names.as_deref().ok_or_else(|| {
                    PipelineError::MissingArgument {
                        argument: "variable_names",
                        processor: processor.name().to_string(),
                    }
                })?;
                self.run_variable_processor(processor.as_ref(), variable_names, options)
            }
        }
    }

    fn run_observation_processor(
        &self,
        processor: &dyn ObservationProcessor,
        options: &RunOptions,
    ) -> Result<Vec<PathBuf>> {
        let data_types = processor.supported_data_types();
        let file_refs = self
            .discovery
            .list_valid_files(&options.data_path, &data_types)?;
        let reprojection = options.grid.reprojection()?;
        let observations = Observations::new(file_refs, &reprojection);

        let num_dates = observations.num_dates();
        if num_dates < 2 {
            info!(
                "Not enough observations found. Can not conduct post processing for {}",
                processor.name()
            );
            return Ok(Vec::new());
        }

        let mut written = Vec::new();
        let windows = temporal::observation_windows(observations.dates());
        for (index, (start, end)) in windows.into_iter().enumerate() {
            let window = observations.subset(start, end);
            debug!(
                "Window {} to {} holds {} observations",
                start,
                end,
                window.len()
            );
            let indicators = processor.process_observations(&window)?;
            let rasters = to_rasters(indicators, &options.output_path, |indicator| {
                writer::date_range_file_name(indicator, start, end)
            });
            written.extend(writer::write(&rasters, &options.grid, &options.format)?);
            temporal::report_progress(
                processor.name(),
                temporal::observation_progress(index, num_dates),
            );
        }

        Ok(written)
    }

    fn run_variable_processor(
        &self,
        processor: &dyn VariableProcessor,
        variable_names: &[String],
        options: &RunOptions,
    ) -> Result<Vec<PathBuf>> {
        let file_refs = self
            .discovery
            .list_valid_files(&options.data_path, variable_names)?;
        let groups = temporal::group_by_date(&file_refs);
        let reprojection = options.grid.reprojection()?;

        let mut written = Vec::new();
        let num_groups = groups.len();
        for (index, (date, group)) in groups.iter().enumerate() {
            let data_files = temporal::select_variable_files(group, variable_names, &self.discovery);

            let mut variables = BTreeMap::new();
            for (variable_name, url) in data_files {
                let dataset = Dataset::open(&url)?;
                variables.insert(variable_name, reprojection.reproject_band(&dataset, 1)?);
            }

            let indicators = processor.process_variables(&variables)?;
            let rasters = to_rasters(indicators, &options.output_path, |indicator| {
                writer::single_date_file_name(indicator, *date)
            });
            written.extend(writer::write(&rasters, &options.grid, &options.format)?);
            temporal::report_progress(
                processor.name(),
                temporal::variable_progress(index, num_groups),
            );
        }

        Ok(written)
    }
}

fn to_rasters(
    indicators: IndicatorArrays,
    output_path: &Path,
    file_name: impl Fn(&str) -> String,
) -> Vec<IndicatorRaster> {
    indicators
        .into_iter()
        .map(|(indicator, data)| IndicatorRaster {
            file_name: output_path.join(file_name(&indicator)),
            data,
        })
        .collect()
}
