//! Bulk download with partial-failure accounting.

use std::path::{Path, PathBuf};

use super::AssetStore;
use super::fetch::FetchedAsset;
use crate::error::MistyError;

/// Result of one attempted download.
#[derive(Debug)]
pub struct DownloadOutcome {
    pub name: String,
    pub result: Result<FetchedAsset, MistyError>,
}

impl DownloadOutcome {
    pub const fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Per-run accounting of a bulk download. Nothing is persisted between runs.
#[derive(Debug)]
pub struct DownloadReport {
    pub output_dir: PathBuf,
    /// Attempts in listing order.
    pub outcomes: Vec<DownloadOutcome>,
    /// Entries whose name resolved to empty.
    pub skipped: usize,
    /// Set when the listing itself was unusable; no fetch was attempted.
    pub listing_error: Option<MistyError>,
}

impl DownloadReport {
    fn empty(output_dir: PathBuf) -> Self {
        Self {
            output_dir,
            outcomes: Vec::new(),
            skipped: 0,
            listing_error: None,
        }
    }

    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }

    pub fn failures(&self) -> impl Iterator<Item = &DownloadOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    /// Every attempted download succeeded and the listing was usable.
    pub fn is_complete(&self) -> bool {
        self.listing_error.is_none() && self.success_count() == self.attempted()
    }
}

impl AssetStore {
    /// Download every listed asset into `output_dir`.
    ///
    /// The directory is created first (idempotent); failing to create it is the
    /// only error. An unusable listing is recorded on the report. One failed
    /// asset never stops the rest of the batch.
    pub async fn download_all(&self, output_dir: &Path) -> Result<DownloadReport, MistyError> {
        tokio::fs::create_dir_all(output_dir)
            .await
            .map_err(|e| MistyError::io(output_dir, e))?;
        let mut report = DownloadReport::empty(output_dir.to_path_buf());

        let listing = match self.list().await {
            Ok(listing) => listing,
            Err(e) => {
                tracing::warn!(kind = %self.kind(), err = %e, "no assets to download");
                report.listing_error = Some(e);
                return Ok(report);
            }
        };
        if listing.is_empty() {
            tracing::info!(kind = %self.kind(), "no assets to download");
            return Ok(report);
        }

        let total = listing.entries().len();
        for (index, entry) in listing.entries().iter().enumerate() {
            let name = entry.name();
            if name.is_empty() {
                tracing::debug!(index, "skipping entry without a name");
                report.skipped += 1;
                continue;
            }
            tracing::info!(kind = %self.kind(), "[{}/{}] downloading {}", index + 1, total, name);
            let destination = output_dir.join(name);
            let result = self.fetch(name, Some(&destination)).await;
            if let Err(e) = &result {
                tracing::error!(kind = %self.kind(), name, err = %e, "asset download failed");
            }
            report.outcomes.push(DownloadOutcome {
                name: name.to_string(),
                result,
            });
        }

        tracing::info!(
            kind = %self.kind(),
            succeeded = report.success_count(),
            attempted = report.attempted(),
            skipped = report.skipped,
            dir = %output_dir.display(),
            "bulk download finished"
        );
        Ok(report)
    }
}
