//! # misty-client
//!
//! Client for the Misty robot HTTP API, focused on acquiring voice recordings:
//! start a capture on the device, wait for it to finish, list the stored audio,
//! fetch one file or bulk-download all of them with per-file accounting.
//!
//! ```rust,no_run
//! use misty_client::prelude::*;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), MistyError> {
//! let client = MistyClient::new("http://192.168.0.111")?;
//!
//! let request = CaptureRequest::new("x.wav")
//!     .with_max_speech_length_ms(10_000)
//!     .with_silence_timeout_ms(5_000);
//! client
//!     .recording()
//!     .record(&request, CompletionPolicy::fixed_for(&request))
//!     .await?;
//!
//! let saved = client.audio().fetch("x.wav", Some(Path::new("x.wav"))).await?;
//! println!("{} bytes", saved.bytes_written);
//! # Ok(())
//! # }
//! ```
#![deny(unsafe_code)]

pub mod assets;
pub mod client;
pub mod config;
pub mod defaults;
pub mod error;
pub mod http;
pub mod recording;
pub mod telemetry;
pub mod transcription;

#[cfg(test)]
pub(crate) mod testing;

pub use client::MistyClient;
pub use error::{ErrorKind, MistyError};

/// Common imports.
pub mod prelude {
    pub use crate::assets::{
        AssetEntry, AssetKind, AssetListing, AssetStore, DownloadOutcome, DownloadReport,
        FetchedAsset,
    };
    pub use crate::client::MistyClient;
    pub use crate::config::{ClientConfig, HttpConfig};
    pub use crate::error::{ErrorKind, MistyError};
    pub use crate::http::{ApiResponse, HttpMethod, NormalizedBody, Params, ResponseBody};
    pub use crate::recording::{
        CaptureOutcome, CaptureRequest, CompletionPolicy, RecordingController,
    };
    pub use crate::transcription::{Transcriber, transcribe_file};
}
