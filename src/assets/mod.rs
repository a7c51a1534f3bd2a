//! Remote asset operations
//!
//! An [`AssetStore`] is a handle on one asset family of a device. It lists the
//! inventory, fetches single assets to disk, bulk-downloads everything and
//! deletes assets.
//!
//! # Example
//!
//! ```rust,no_run
//! use misty_client::MistyClient;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), misty_client::MistyError> {
//! let client = MistyClient::new("http://192.168.0.111")?;
//! let audio = client.audio();
//! let listing = audio.list().await?;
//! println!("{:?}", listing.names());
//! let report = audio.download_all(Path::new("downloads")).await?;
//! println!("{}/{} downloaded", report.success_count(), report.attempted());
//! # Ok(())
//! # }
//! ```

pub mod bulk;
pub mod fetch;
pub mod kind;
pub mod listing;

pub use bulk::{DownloadOutcome, DownloadReport};
pub use fetch::{FetchedAsset, validate_asset_name, write_file_atomic};
pub use kind::AssetKind;
pub use listing::{AssetEntry, AssetListing};

use crate::client::MistyClient;
use crate::defaults::keys;
use crate::error::MistyError;
use crate::http::{ApiResponse, Params};

/// Asset operations for one [`AssetKind`].
#[derive(Debug, Clone)]
pub struct AssetStore {
    client: MistyClient,
    kind: AssetKind,
}

impl AssetStore {
    pub const fn new(client: MistyClient, kind: AssetKind) -> Self {
        Self { client, kind }
    }

    pub const fn kind(&self) -> AssetKind {
        self.kind
    }

    pub(crate) const fn client(&self) -> &MistyClient {
        &self.client
    }

    /// Delete `name` from the device.
    pub async fn delete(&self, name: &str) -> Result<ApiResponse, MistyError> {
        validate_asset_name(name)?;
        let params = Params::new().with(keys::FILE_NAME, name);
        let response = self
            .client
            .delete(self.kind.asset_endpoint(), Some(&params))
            .await?;
        if !response.is_success() {
            tracing::warn!(kind = %self.kind, name, status = response.status(), "delete rejected");
            return Err(MistyError::rejection(response.status(), response.text()));
        }
        tracing::info!(kind = %self.kind, name, "asset deleted");
        Ok(response)
    }
}
