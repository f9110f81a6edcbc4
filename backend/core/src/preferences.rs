//! Per-chat watermark size preferences.
//!
//! Held in memory for the lifetime of the process; lost on restart.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::types::WatermarkSize;

/// Store of the watermark size each chat asked for.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Preference for `chat_id`, or the default preset when none was set.
    async fn get(&self, chat_id: i64) -> WatermarkSize;

    /// Record a new preference. Last write wins.
    async fn set(&self, chat_id: i64, size: WatermarkSize);
}

/// `PreferenceStore` backed by a plain in-memory map.
#[derive(Debug, Default)]
pub struct InMemoryPreferenceStore {
    sizes: RwLock<HashMap<i64, WatermarkSize>>,
}

impl InMemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PreferenceStore for InMemoryPreferenceStore {
    async fn get(&self, chat_id: i64) -> WatermarkSize {
        self.sizes
            .read()
            .await
            .get(&chat_id)
            .copied()
            .unwrap_or_default()
    }

    async fn set(&self, chat_id: i64, size: WatermarkSize) {
        debug!(chat_id, size = %size, "Watermark size preference updated");
        self.sizes.write().await.insert(chat_id, size);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unset_chat_gets_large() {
        let store = InMemoryPreferenceStore::new();
        assert_eq!(store.get(42).await, WatermarkSize::Large);
    }

    #[tokio::test]
    async fn preferences_are_per_chat() {
        let store = InMemoryPreferenceStore::new();
        store.set(1, WatermarkSize::Small).await;
        store.set(2, WatermarkSize::Medium).await;
        assert_eq!(store.get(1).await, WatermarkSize::Small);
        assert_eq!(store.get(2).await, WatermarkSize::Medium);
        assert_eq!(store.get(3).await, WatermarkSize::Large);
    }

    #[tokio::test]
    async fn last_write_wins() {
        let store = InMemoryPreferenceStore::new();
        store.set(7, WatermarkSize::Small).await;
        store.set(7, WatermarkSize::Large).await;
        assert_eq!(store.get(7).await, WatermarkSize::Large);
    }
}
