use std::path::PathBuf;

use clap::Parser;

use geoindicator::config::RawRunConfig;

/// Derives indicator rasters from time series of satellite products.
#[derive(Parser)]
#[command(
    name = "geoindicator",
    version,
    about = "Runs indicator post processors over satellite products"
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Print the registered post processors and available indicators, then exit.
    #[arg(long)]
    pub list: bool,

    /// JSON run configuration; flags override its values.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Name of the post processor to run.
    #[arg(short, long)]
    pub name: Option<String>,

    /// Indicators to derive, comma separated.
    #[arg(long, value_delimiter = ',', num_args = 1..)]
    pub indicators: Option<Vec<String>>,

    /// Directory or glob pattern of the input products.
    #[arg(short, long = "input_path")]
    pub input_path: Option<String>,

    /// Directory the indicator rasters are written to.
    #[arg(short, long = "output_path")]
    pub output_path: Option<PathBuf>,

    /// Output format [default: GeoTiff].
    #[arg(short, long)]
    pub format: Option<String>,

    /// Region of interest as WKT polygon.
    #[arg(long)]
    pub roi: Option<String>,

    /// Pixel size of the output rasters, in destination grid units.
    #[arg(long = "spatial_resolution")]
    pub spatial_resolution: Option<f64>,

    /// Reference system of the region of interest, e.g. EPSG:4326.
    #[arg(long = "roi_grid")]
    pub roi_grid: Option<String>,

    /// Reference system of the output rasters, e.g. EPSG:32632.
    #[arg(long = "destination_grid")]
    pub destination_grid: Option<String>,

    /// Variables handed to variable post processors, comma separated.
    #[arg(long, value_delimiter = ',', num_args = 1..)]
    pub variables: Option<Vec<String>>,
}

impl Cli {
    /// Run settings given on the command line.
    pub fn overrides(&self) -> RawRunConfig {
        RawRunConfig {
            name: self.name.clone(),
            indicators: self.indicators.clone(),
            input_path: self.input_path.clone(),
            output_path: self.output_path.clone(),
            roi: self.roi.clone(),
            spatial_resolution: self.spatial_resolution,
            variable_names: self.variables.clone(),
            roi_grid: self.roi_grid.clone(),
            destination_grid: self.destination_grid.clone(),
            format: self.format.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags() {
        let cli = Cli::parse_from([
            "geoindicator",
            "-vv",
            "--indicators",
            "ObservationCount,VariableMean",
            "-i",
            "/data/in",
            "--output_path",
            "/data/out",
            "--roi",
            "POLYGON((9 48, 10 48, 10 49, 9 49, 9 48))",
            "--spatial_resolution",
            "20",
        ]);

        assert_eq!(cli.verbose, 2);
        let overrides = cli.overrides();
        assert_eq!(
            overrides.indicators,
            Some(vec!["ObservationCount".to_string(), "VariableMean".to_string()])
        );
        assert_eq!(overrides.input_path.as_deref(), Some("/data/in"));
        assert_eq!(overrides.spatial_resolution, Some(20.0));
        assert!(overrides.name.is_none());
        assert!(overrides.format.is_none());
    }

    #[test]
    fn test_list_needs_no_run_settings() {
        let cli = Cli::parse_from(["geoindicator", "--list"]);
        assert!(cli.list);
        assert!(cli.config.is_none());
    }
}
