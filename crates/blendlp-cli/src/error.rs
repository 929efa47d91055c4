use blendlp_solver::ModelError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Error reading {path}: {source}")]
    Io { path: String, source: std::io::Error },
    #[error("Invalid JSON in {path}: {source}")]
    Json { path: String, source: serde_json::Error },
    #[error("Model error: {0}")]
    Model(#[from] ModelError),
    #[error("Invalid solver options: {0}")]
    Options(String),
    #[error("Invalid blend recipe: {0}")]
    Recipe(String),
    #[error("Failed to format report")]
    Report(#[from] std::fmt::Error),
}

/// Read and deserialize a JSON file
pub fn read_json<T: serde::de::DeserializeOwned>(path: &std::path::Path) -> Result<T, CliError> {
    let source = std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&source).map_err(|source| CliError::Json {
        path: path.display().to_string(),
        source,
    })
}
