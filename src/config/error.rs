#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("either 'name' or a non-empty 'indicators' list must be given")]
    Target,
    #[error("missing required setting '{0}'")]
    MissingField(&'static str),
    #[error("spatial_resolution must be a positive number, got {0}")]
    SpatialResolution(f64),
    #[error("roi cannot be empty")]
    EmptyRoi,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
}
