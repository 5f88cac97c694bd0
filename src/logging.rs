use tracing_subscriber::EnvFilter;

/// Target of the progress events emitted while a processor runs.
///
/// Progress is reported as an `info` event with a `progress` field in
/// percent and a `processor` field naming the running processor.
pub const PROGRESS_TARGET: &str = "component_progress";

const CRATE_TARGET: &str = "geoindicator";

/// Initialize tracing based on CLI verbosity level.
///
/// Mapping:
/// - 0 (none) -> warn
/// - 1 (-v)   -> info
/// - 2 (-vv)  -> debug
/// - 3+ (-vvv)-> trace
///
/// Progress events stay visible at every verbosity.
/// `RUST_LOG` env var overrides the CLI flag if set.
pub fn init(verbosity: u8) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn default_filter(verbosity: u8) -> String {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    format!("{CRATE_TARGET}={level},{PROGRESS_TARGET}=info")
}
