//! Asset families and their endpoints.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::defaults::endpoints;

/// Family of named binary resources stored on the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    #[default]
    Audio,
    Image,
}

impl AssetKind {
    /// Inventory endpoint (`GET`).
    pub const fn list_endpoint(&self) -> &'static str {
        match self {
            Self::Audio => endpoints::AUDIO_LIST,
            Self::Image => endpoints::IMAGES_LIST,
        }
    }

    /// Single-asset endpoint (`GET` to fetch, `DELETE` to remove).
    pub const fn asset_endpoint(&self) -> &'static str {
        match self {
            Self::Audio => endpoints::AUDIO,
            Self::Image => endpoints::IMAGES,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Audio => "audio",
            Self::Image => "image",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
