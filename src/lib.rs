//! Indicator post processing for satellite products.
//!
//! Post processors are registered as factories in a [`Registry`]. A
//! [`Pipeline`] resolves them by name or by the indicators they produce,
//! assembles their inputs on a common grid and writes one raster per
//! indicator and date or date range.

pub mod config;
pub mod discovery;
pub mod error;
pub mod indicator;
pub mod logging;
pub mod observations;
pub mod pipeline;
pub mod plugins;
pub mod processor;
pub mod registry;
pub mod spatial;
pub mod temporal;
pub mod writer;

pub use error::{PipelineError, Result};
pub use indicator::{IndicatorArrays, IndicatorDescription, IndicatorRaster};
pub use pipeline::{Pipeline, RunOptions};
pub use processor::{ObservationProcessor, Processor, ProcessorFactory, VariableProcessor};
pub use registry::Registry;
pub use spatial::{GridRequest, Roi};
