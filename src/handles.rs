//! Revocable object handles for previews and results
//!
//! Works like a browser's object-URL registry: a blob is registered and
//! addressed through an opaque `blob:` reference until it is revoked.
//! Sessions own the store and revoke every handle before discarding it.

use crate::types::Blob;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

const URL_PREFIX: &str = "blob:clearcut/";

/// Opaque reference to a blob registered in a [`HandleStore`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ObjectUrl(String);

impl ObjectUrl {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Registry of live handles
#[derive(Debug, Default)]
pub struct HandleStore {
    live: HashMap<ObjectUrl, Blob>,
    created: usize,
    revoked: usize,
    stale_revocations: usize,
}

impl HandleStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a blob and return a fresh handle for it
    pub fn create(&mut self, blob: Blob) -> ObjectUrl {
        let url = ObjectUrl(format!("{}{}", URL_PREFIX, uuid::Uuid::new_v4()));
        log::trace!("Created handle {} ({} bytes, {})", url, blob.len(), blob.mime_type());
        self.live.insert(url.clone(), blob);
        self.created += 1;
        url
    }

    /// Look up the blob behind a live handle
    #[must_use]
    pub fn resolve(&self, url: &ObjectUrl) -> Option<&Blob> {
        self.live.get(url)
    }

    #[must_use]
    pub fn is_live(&self, url: &ObjectUrl) -> bool {
        self.live.contains_key(url)
    }

    /// Release a handle
    ///
    /// Returns `false` if the handle was already revoked or never issued here.
    pub fn revoke(&mut self, url: &ObjectUrl) -> bool {
        if self.live.remove(url).is_some() {
            log::trace!("Revoked handle {}", url);
            self.revoked += 1;
            true
        } else {
            log::warn!("Attempted to revoke unknown or already revoked handle {}", url);
            self.stale_revocations += 1;
            false
        }
    }

    /// Number of handles currently live
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Total handles ever created
    #[must_use]
    pub fn created_count(&self) -> usize {
        self.created
    }

    /// Total successful revocations
    #[must_use]
    pub fn revoked_count(&self) -> usize {
        self.revoked
    }

    /// Revocations of handles that were not live
    #[must_use]
    pub fn stale_revocation_count(&self) -> usize {
        self.stale_revocations
    }
}
