#![allow(dead_code)]

use async_trait::async_trait;
use pocketnote_core::{Clock, KeyValueStore, MemoryKeyValueStore, StorageError, StorageResult};
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;

/// Memory-backed storage that can be told to fail and counts writes.
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryKeyValueStore,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl FlakyStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_entries(entries: &[(&str, &str)]) -> Arc<Self> {
        Arc::new(Self {
            inner: MemoryKeyValueStore::with_entries(entries.iter().copied()),
            ..Self::default()
        })
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful `set` calls so far.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Stores `value` as if an older app version had written it.
    pub async fn set_raw(&self, key: &str, value: &str) {
        self.inner.set(key, value).await.unwrap();
    }

    pub async fn raw(&self, key: &str) -> Option<String> {
        self.inner.get(key).await.unwrap()
    }

    pub async fn json(&self, key: &str) -> serde_json::Value {
        let raw = self.raw(key).await.expect("key should be persisted");
        serde_json::from_str(&raw).unwrap()
    }
}

#[async_trait]
impl KeyValueStore for FlakyStore {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Backend("read refused".to_string()));
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Backend("write refused".to_string()));
        }
        self.inner.set(key, value).await?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Clock that returns `start`, `start + 1`, ... on successive calls.
pub fn stepping_clock(start: i64) -> Clock {
    let next = Arc::new(AtomicI64::new(start));
    Arc::new(move || next.fetch_add(1, Ordering::SeqCst))
}

/// Clock frozen at `at`.
pub fn fixed_clock(at: i64) -> Clock {
    Arc::new(move || at)
}
