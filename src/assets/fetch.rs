//! Single-asset download.
//!
//! Bytes land in a hidden sibling `.part` file first and are renamed onto the
//! destination only once fully written and synced, so a failed download never
//! leaves a truncated file at the destination path.

use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

use super::AssetStore;
use crate::defaults::keys;
use crate::error::MistyError;
use crate::http::{Params, ResponseBody};

/// A successfully persisted asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedAsset {
    pub name: String,
    pub path: PathBuf,
    pub bytes_written: u64,
}

/// Reject names that are empty or would resolve outside their directory.
pub fn validate_asset_name(name: &str) -> Result<(), MistyError> {
    if name.is_empty() {
        return Err(MistyError::InvalidInput(
            "asset name cannot be empty".to_string(),
        ));
    }
    if Path::new(name).file_name().and_then(|n| n.to_str()) != Some(name) {
        return Err(MistyError::InvalidInput(format!(
            "asset name {name:?} is not a plain file name"
        )));
    }
    Ok(())
}

fn part_path(destination: &Path) -> Result<PathBuf, MistyError> {
    let file_name = destination
        .file_name()
        .ok_or_else(|| {
            MistyError::InvalidInput(format!(
                "destination {} has no file name",
                destination.display()
            ))
        })?
        .to_string_lossy();
    Ok(destination.with_file_name(format!(".{file_name}.part")))
}

/// Write `bytes` to `destination`, replacing it only on complete success.
pub async fn write_file_atomic(destination: &Path, bytes: &[u8]) -> Result<u64, MistyError> {
    let part = part_path(destination)?;
    match write_part(&part, bytes).await {
        Ok(()) => {}
        Err(e) => {
            let _ = tokio::fs::remove_file(&part).await;
            return Err(e);
        }
    }
    if let Err(e) = tokio::fs::rename(&part, destination).await {
        let _ = tokio::fs::remove_file(&part).await;
        return Err(MistyError::io(destination, e));
    }
    Ok(bytes.len() as u64)
}

async fn write_part(part: &Path, bytes: &[u8]) -> Result<(), MistyError> {
    let mut file = tokio::fs::File::create(part)
        .await
        .map_err(|e| MistyError::io(part, e))?;
    file.write_all(bytes)
        .await
        .map_err(|e| MistyError::io(part, e))?;
    file.flush().await.map_err(|e| MistyError::io(part, e))?;
    file.sync_all().await.map_err(|e| MistyError::io(part, e))?;
    Ok(())
}

impl AssetStore {
    /// Download `name` to `destination` (default: `./<name>`).
    ///
    /// A non-success status creates no file and leaves an existing one
    /// untouched.
    pub async fn fetch(
        &self,
        name: &str,
        destination: Option<&Path>,
    ) -> Result<FetchedAsset, MistyError> {
        validate_asset_name(name)?;
        let path = destination
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(name));

        let params = Params::new().with(keys::FILE_NAME, name);
        let response = self
            .client()
            .get_binary(self.kind().asset_endpoint(), Some(&params))
            .await?;
        if !response.is_success() {
            return Err(MistyError::rejection(response.status(), response.text()));
        }
        let bytes = match response.into_body() {
            ResponseBody::Bytes(bytes) => bytes,
            ResponseBody::Text(text) => text.into_bytes(),
            ResponseBody::Json(value) => value.to_string().into_bytes(),
        };

        let bytes_written = write_file_atomic(&path, &bytes).await?;
        tracing::info!(kind = %self.kind(), name, path = %path.display(), bytes = bytes_written, "asset saved");
        Ok(FetchedAsset {
            name: name.to_string(),
            path,
            bytes_written,
        })
    }

    /// Boolean form of [`AssetStore::fetch`]: logs the failure, never propagates it.
    pub async fn fetch_ok(&self, name: &str, destination: Option<&Path>) -> bool {
        match self.fetch(name, destination).await {
            Ok(_) => true,
            Err(e) => {
                tracing::error!(kind = %self.kind(), name, err = %e, "asset download failed");
                false
            }
        }
    }
}
