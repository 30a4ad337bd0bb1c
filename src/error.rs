use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum GeneratorError {
    #[error("Failed to read config file \"{}\": {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed config in {origin}: {source}")]
    ConfigParse {
        origin: String,
        source: serde_json::Error,
    },

    #[error("Invalid address \"{value}\" for {name}")]
    InvalidAddress { name: String, value: String },

    #[error("Failed to write output file \"{}\": {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Validation failed with {} problem(s):\n  {}", .0.len(), .0.join("\n  "))]
    Validation(Vec<String>),
}
