//! Observable in-memory collection bound to one storage key.

use super::{StoreError, StoreResult};
use crate::migrator::{decode_records, DecodeError};
use crate::storage::{KeyValueStore, StorageError};
use log::{debug, error};
use serde::Serialize;
use serde_json::Value;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

/// What a mutation did to the collection.
pub(crate) struct Change<R> {
    value: R,
    notify: bool,
    persist: bool,
}

impl<R> Change<R> {
    /// Records changed: notify observers and write.
    pub(crate) fn modified(value: R) -> Self {
        Self {
            value,
            notify: true,
            persist: true,
        }
    }

    /// Records untouched, but the operation still counts as a write.
    pub(crate) fn unchanged(value: R) -> Self {
        Self {
            value,
            notify: false,
            persist: true,
        }
    }

    /// Nothing to do at all.
    pub(crate) fn skipped(value: R) -> Self {
        Self {
            value,
            notify: false,
            persist: false,
        }
    }
}

/// Why a persisted collection could not be read.
#[derive(Debug)]
pub(crate) enum FetchError {
    Storage(StorageError),
    Decode(DecodeError),
}

impl Display for FetchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage(err) => write!(f, "{err}"),
            Self::Decode(err) => write!(f, "{err}"),
        }
    }
}

pub(crate) struct Collection<T> {
    key: &'static str,
    storage: Arc<dyn KeyValueStore>,
    state: watch::Sender<Vec<T>>,
}

impl<T> Collection<T>
where
    T: Clone + Serialize + Send + Sync,
{
    pub(crate) fn new(key: &'static str, storage: Arc<dyn KeyValueStore>) -> Self {
        let (state, _) = watch::channel(Vec::new());
        Self {
            key,
            storage,
            state,
        }
    }

    pub(crate) fn key(&self) -> &'static str {
        self.key
    }

    pub(crate) fn snapshot(&self) -> Vec<T> {
        self.state.borrow().clone()
    }

    pub(crate) fn read<R>(&self, inspect: impl FnOnce(&[T]) -> R) -> R {
        inspect(&self.state.borrow())
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<Vec<T>> {
        self.state.subscribe()
    }

    /// Replaces the whole collection without writing it.
    pub(crate) fn publish(&self, records: Vec<T>) {
        self.state.send_replace(records);
    }

    /// Reads and decodes the persisted blob; `None` when never written.
    pub(crate) async fn fetch(&self) -> Result<Option<Vec<Value>>, FetchError> {
        let raw = self.storage.get(self.key).await.map_err(FetchError::Storage)?;
        raw.map(|raw| decode_records(&raw).map_err(FetchError::Decode))
            .transpose()
    }

    /// Applies `apply` to the current records, then writes the result.
    ///
    /// Errors from `apply` leave the collection untouched and skip the write.
    pub(crate) async fn mutate<R>(
        &self,
        op: &'static str,
        apply: impl FnOnce(&mut Vec<T>) -> StoreResult<Change<R>>,
    ) -> StoreResult<R> {
        let mut applied = None;
        self.state.send_if_modified(|records| {
            let result = apply(records).map(|change| {
                let payload = change
                    .persist
                    .then(|| (serde_json::to_string(&*records), records.len()));
                (change, payload)
            });
            let notify = matches!(&result, Ok((change, _)) if change.notify);
            applied = Some(result);
            notify
        });

        let (change, payload) = match applied {
            Some(outcome) => outcome?,
            // `send_if_modified` runs its closure exactly once, synchronously.
            None => unreachable!("mutation `{op}` closure did not run"),
        };
        match payload {
            None => {}
            Some((Ok(json), count)) => self.write(op, json, count).await?,
            Some((Err(err), _)) => {
                error!(
                    "event=store_write module=store status=error key={} op={} error_code=encode_failed error={}",
                    self.key, op, err
                );
                return Err(StorageError::Encode(err).into());
            }
        }
        Ok(change.value)
    }

    /// Writes the current records as they are.
    pub(crate) async fn persist_current(&self, op: &'static str) -> StoreResult<()> {
        let (encoded, count) = {
            let records = self.state.borrow();
            (serde_json::to_string(&*records), records.len())
        };
        let json = encoded.map_err(StorageError::Encode)?;
        self.write(op, json, count).await
    }

    async fn write(&self, op: &'static str, json: String, records: usize) -> StoreResult<()> {
        let started_at = Instant::now();
        match self.storage.set(self.key, &json).await {
            Ok(()) => {
                debug!(
                    "event=store_write module=store status=ok key={} op={} records={} bytes={} duration_ms={}",
                    self.key,
                    op,
                    records,
                    json.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=store_write module=store status=error key={} op={} records={} duration_ms={} error={}",
                    self.key,
                    op,
                    records,
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(StoreError::Persistence(err))
            }
        }
    }
}
