//! Asset inventory.
//!
//! The inventory endpoint answers in one of three shapes: a bare array, an
//! envelope `{"result": [...]}`, or (unexpectedly) some other single object.
//! [`AssetListing`] keeps that distinction explicit so callers pattern-match
//! instead of assuming a shape. Anything else is a decode error.

use serde_json::{Map, Value};

use super::AssetStore;
use crate::defaults::keys;
use crate::error::MistyError;
use crate::http::{ApiResponse, ResponseBody};

/// One inventory entry.
#[derive(Debug, Clone, PartialEq)]
pub enum AssetEntry {
    /// A bare filename.
    Name(String),
    /// An object describing the asset.
    Record(Map<String, Value>),
    /// Anything else the device put in the array.
    Other(Value),
}

impl AssetEntry {
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::String(name) => Self::Name(name),
            Value::Object(record) => Self::Record(record),
            other => Self::Other(other),
        }
    }

    /// Display name: the string itself, or a record's `name`, then `fileName`.
    /// Empty when neither resolves.
    pub fn name(&self) -> &str {
        match self {
            Self::Name(name) => name,
            Self::Record(record) => record
                .get("name")
                .and_then(Value::as_str)
                .or_else(|| record.get("fileName").and_then(Value::as_str))
                .unwrap_or(""),
            Self::Other(_) => "",
        }
    }
}

/// Decoded inventory, tagged with the shape it arrived in.
#[derive(Debug, Clone, PartialEq)]
pub enum AssetListing {
    Bare(Vec<AssetEntry>),
    Envelope(Vec<AssetEntry>),
    /// A single object without a `result` array; carries no entries.
    Opaque(Map<String, Value>),
}

impl AssetListing {
    /// Classify a decoded body.
    pub fn from_json(value: Value) -> Result<Self, MistyError> {
        match value {
            Value::Array(items) => Ok(Self::Bare(entries(items))),
            Value::Object(mut obj) => match obj.remove(keys::RESULT) {
                Some(Value::Array(items)) => Ok(Self::Envelope(entries(items))),
                Some(other) => Err(MistyError::Decode(format!(
                    "listing `result` is not an array: {other}"
                ))),
                None => Ok(Self::Opaque(obj)),
            },
            other => Err(MistyError::Decode(format!(
                "unexpected listing shape: {other}"
            ))),
        }
    }

    /// Classify a response: non-success status is a rejection, a non-JSON body
    /// a decode error.
    pub fn from_response(response: &ApiResponse) -> Result<Self, MistyError> {
        if !response.is_success() {
            return Err(MistyError::rejection(response.status(), response.text()));
        }
        match response.body() {
            ResponseBody::Json(value) => Self::from_json(value.clone()),
            ResponseBody::Text(text) => Err(MistyError::Decode(format!(
                "listing body is not JSON: {text}"
            ))),
            ResponseBody::Bytes(raw) => {
                let value = serde_json::from_slice(raw)?;
                Self::from_json(value)
            }
        }
    }

    /// Entries in device order; empty for an opaque object.
    pub fn entries(&self) -> &[AssetEntry] {
        match self {
            Self::Bare(entries) | Self::Envelope(entries) => entries,
            Self::Opaque(_) => &[],
        }
    }

    /// Non-empty display names in device order.
    pub fn names(&self) -> Vec<String> {
        self.entries()
            .iter()
            .map(AssetEntry::name)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries().iter().any(|entry| entry.name() == name)
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    pub const fn is_opaque(&self) -> bool {
        matches!(self, Self::Opaque(_))
    }
}

fn entries(items: Vec<Value>) -> Vec<AssetEntry> {
    items.into_iter().map(AssetEntry::from_value).collect()
}

impl AssetStore {
    /// Query the inventory endpoint. No retries.
    pub async fn list(&self) -> Result<AssetListing, MistyError> {
        let response = self
            .client()
            .get(self.kind().list_endpoint(), None)
            .await?;
        match AssetListing::from_response(&response) {
            Ok(listing) => {
                if listing.is_opaque() {
                    tracing::warn!(kind = %self.kind(), "asset listing is a bare object without `result`");
                }
                tracing::info!(kind = %self.kind(), count = listing.entries().len(), "listed assets");
                Ok(listing)
            }
            Err(e) => {
                tracing::warn!(kind = %self.kind(), status = response.status(), err = %e, "asset listing unusable");
                Err(e)
            }
        }
    }
}
