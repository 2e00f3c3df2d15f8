use thiserror::Error;

/// Rejected engine or run configuration. No partial engine is ever built.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("invalid grid shape {xgrid}x{ygrid}: both dimensions must be >= 1")]
    InvalidGridShape { xgrid: usize, ygrid: usize },
    #[error("parameter {name} must be finite, got {value}")]
    NonFiniteParameter { name: &'static str, value: f64 },
    #[error("elevation grid has {len} values, expected {w}x{h}")]
    ElevationShapeMismatch { len: usize, w: usize, h: usize },
    #[error("config file: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for ConfigurationError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

/// Errors from writing frames to disk or encoding them.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("image encoding error: {0}")]
    Image(#[from] image::ImageError),
    #[error("no frames recorded; run the model before exporting")]
    NoFrames,
    #[error("unsupported animation format: {0}")]
    UnsupportedFormat(String),
}
