//! Asset resolution
//!
//! The host engine's asset loader is a blocking call. The coordinator runs it
//! on the blocking worker pool and treats any failure as fatal to the run.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque identifier for an imported asset
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetHandle(String);

impl AssetHandle {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for AssetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for AssetHandle {
    fn from(handle: String) -> Self {
        Self(handle)
    }
}

impl From<&str> for AssetHandle {
    fn from(handle: &str) -> Self {
        Self(handle.to_string())
    }
}

/// Errors raised by an asset loader
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Asset not found: {0}")]
    NotFound(String),

    #[error("Engine error: {0}")]
    Engine(String),
}

/// Resolves an asset path to a handle. Implementations may block.
pub trait AssetLoader: Send + Sync {
    /// `Ok(None)` means the engine answered but produced no asset
    fn load_asset(&self, path: &str) -> Result<Option<AssetHandle>, LoaderError>;
}

/// Loader used when no engine is attached: wraps the path as `AssetData(<path>)`
#[derive(Debug, Default, Clone, Copy)]
pub struct StubAssetLoader;

impl AssetLoader for StubAssetLoader {
    fn load_asset(&self, path: &str) -> Result<Option<AssetHandle>, LoaderError> {
        Ok(Some(AssetHandle::new(format!("AssetData({})", path))))
    }
}
