//! Test utilities for code built on `Pinner`.
//!
//! In your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! cardpin_core = { workspace = true, features = ["testutil"] }
//! ```

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use anyhow::{Context, anyhow};
use bytes::Bytes;
use dashmap::{DashMap, DashSet};

use crate::{ContentHash, PinLabel, Pinner};

/// A `Pinner` that keeps pinned content in memory.
///
/// Hashes are derived from the content with BLAKE3, so identical content
/// always yields the same (fake, non-CID) hash. Every call is counted,
/// including failed ones, which makes "no network call happened"
/// assertions possible.
#[derive(Debug, Default)]
pub struct MemoryPinner {
    pinned: DashMap<String, (ContentHash, Bytes)>,
    failing: DashSet<String>,
    fail_all: AtomicBool,
    calls: AtomicUsize,
}

impl MemoryPinner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every pin with this label fail.
    pub fn fail_label(&self, label: impl Into<String>) {
        self.failing.insert(label.into());
    }

    /// Makes every pin fail (or succeed again).
    pub fn set_fail_all(&self, fail: bool) {
        self.fail_all.store(fail, Ordering::SeqCst);
    }

    /// Number of pin calls made, successful or not.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Labels of successfully pinned content, sorted.
    pub fn pinned_labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = self.pinned.iter().map(|e| e.key().clone()).collect();
        labels.sort();
        labels
    }

    /// Content pinned under `label`.
    pub fn content(&self, label: &str) -> Option<Bytes> {
        self.pinned.get(label).map(|entry| entry.value().1.clone())
    }

    pub fn hash_for(content: &[u8]) -> ContentHash {
        ContentHash::new(format!("b3{}", blake3::hash(content).to_hex()))
    }

    fn record(&self, label: &PinLabel, content: Bytes) -> anyhow::Result<ContentHash> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_all.load(Ordering::SeqCst) || self.failing.contains(label.as_str()) {
            return Err(anyhow!("simulated failure pinning {label}"));
        }
        let hash = Self::hash_for(&content);
        self.pinned
            .insert(label.as_str().to_owned(), (hash.clone(), content));
        Ok(hash)
    }
}

#[async_trait::async_trait]
impl Pinner for MemoryPinner {
    async fn pin_file(&self, path: &Path, label: &PinLabel) -> anyhow::Result<ContentHash> {
        let content = match tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))
        {
            Ok(content) => content,
            Err(err) => {
                self.calls.fetch_add(1, Ordering::SeqCst);
                return Err(err);
            }
        };
        self.record(label, content.into())
    }

    async fn pin_json(
        &self,
        document: &serde_json::Value,
        label: &PinLabel,
    ) -> anyhow::Result<ContentHash> {
        let content = serde_json::to_vec(document)?;
        self.record(label, content.into())
    }
}
