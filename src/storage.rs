use crate::models::AppData;
use std::{ffi::OsString, path::Path, path::PathBuf};
use tokio::fs;
use tracing::error;

pub const LOAD_FAILURE_NOTICE: &str = "저장된 데이터를 불러오는데 실패했습니다.";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to read data file: {0}")]
    Read(#[source] std::io::Error),
    #[error("failed to parse data file: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("failed to encode data: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to write data file: {0}")]
    Write(#[source] std::io::Error),
}

/// Loaded data plus a user-facing notice when the file had to be ignored.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub data: AppData,
    pub notice: Option<String>,
}

pub async fn load_data(path: &Path) -> LoadOutcome {
    match read_data(path).await {
        Ok(Some(data)) => LoadOutcome { data, notice: None },
        Ok(None) => LoadOutcome::default(),
        Err(err) => {
            error!("{err}");
            LoadOutcome {
                data: AppData::default(),
                notice: Some(LOAD_FAILURE_NOTICE.to_string()),
            }
        }
    }
}

/// `None` when there is no data file yet.
async fn read_data(path: &Path) -> Result<Option<AppData>, StorageError> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(StorageError::Read(err)),
    };
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(StorageError::Parse)
}

/// Writes the whole payload to a sibling temp file, then renames it over
/// `path`.
pub async fn persist_data(path: &Path, data: &AppData) -> Result<(), StorageError> {
    let payload = serde_json::to_vec_pretty(data).map_err(StorageError::Encode)?;
    let staging = staging_path(path);
    fs::write(&staging, payload)
        .await
        .map_err(StorageError::Write)?;
    fs::rename(&staging, path)
        .await
        .map_err(StorageError::Write)?;
    Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("state.json"));
    name.push(".tmp");
    path.with_file_name(name)
}
