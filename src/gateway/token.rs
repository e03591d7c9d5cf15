//! Bearer token access for the travel-data provider
//!
//! The provider's token expires every 30 minutes; an external refresh
//! process rewrites it at a shared file location on a shorter interval.
//! The token is therefore a single-writer (refresh process), multi-reader
//! (every session's gateway calls) resource: readers re-read it fresh per
//! request and never cache it inside a session, so rotation is transparent.

use crate::error::{Result, VoyagentError};
use std::path::PathBuf;

/// Source of the current provider bearer token
///
/// `current` is called once per outgoing request. `refresh` is the
/// single refresh-triggering side effect the gateway performs after an
/// authorization failure; implementations pick up whatever the external
/// refresh process has written since.
pub trait TokenSource: Send + Sync {
    /// Returns the token to use for the next request
    fn current(&self) -> Result<String>;

    /// Re-acquires the token after an authorization failure
    fn refresh(&self) -> Result<String>;
}

/// Token source backed by the shared token file
///
/// Reads the file on every call. The external refresh collaborator is the
/// only writer; this process only ever reads.
pub struct FileTokenSource {
    path: PathBuf,
}

impl FileTokenSource {
    /// Creates a token source reading from the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read(&self) -> Result<String> {
        let raw = std::fs::read_to_string(&self.path).map_err(|e| {
            VoyagentError::Config(format!(
                "cannot read gateway token from {}: {}",
                self.path.display(),
                e
            ))
        })?;
        let token = raw.trim();
        if token.is_empty() {
            return Err(VoyagentError::Config(format!(
                "gateway token file {} is empty",
                self.path.display()
            ))
            .into());
        }
        Ok(token.to_string())
    }
}

impl TokenSource for FileTokenSource {
    fn current(&self) -> Result<String> {
        self.read()
    }

    fn refresh(&self) -> Result<String> {
        // The refresh process owns rotation; refreshing here means picking
        // up whatever it wrote most recently.
        tracing::debug!("re-reading gateway token after authorization failure");
        self.read()
    }
}
