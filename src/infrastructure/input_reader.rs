//! Input files - The batch table and single-Pokemon paste files

use std::path::{Path, PathBuf};

use crate::application::services::data_rows;

#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("Failed to read input {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Read the batch table and return its data rows in file order
pub async fn read_data_rows(path: &Path) -> Result<Vec<String>, InputError> {
    let contents = read_to_string(path).await?;
    Ok(data_rows(&contents))
}

/// Read a whole paste file
pub async fn read_to_string(path: &Path) -> Result<String, InputError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| InputError::Read {
            path: path.to_path_buf(),
            source,
        })
}
