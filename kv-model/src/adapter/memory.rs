use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_stream::try_stream;
use log::trace;
use parking_lot::RwLock;

use super::{BatchOp, KvPair, KvStream, StorageAdapter};
use crate::{AdapterConfig, Error};

/// Ordered in-memory store backed by a `BTreeMap`.
///
/// Clones share the same map. Batches are applied under one write lock, so
/// they are atomic. Scans take one page per read lock and resume after the
/// last key seen: a scan observes writes that land between pages.
#[derive(Clone)]
pub struct MemoryAdapter {
    inner: Arc<MemoryInner>,
}

struct MemoryInner {
    data: RwLock<BTreeMap<String, Vec<u8>>>,
    open: AtomicBool,
    config: AdapterConfig,
}

impl Default for MemoryAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self::with_config(AdapterConfig::default())
    }

    pub fn with_config(config: AdapterConfig) -> Self {
        Self {
            inner: Arc::new(MemoryInner {
                data: RwLock::new(BTreeMap::new()),
                open: AtomicBool::new(true),
                config,
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.data.read().is_empty()
    }
}

impl MemoryInner {
    fn ensure_open(&self) -> Result<(), Error> {
        if self.open.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(Error::StorageFailure("memory adapter is closed".to_string()))
        }
    }
}

impl StorageAdapter for MemoryAdapter {
    async fn open(&self) -> Result<(), Error> {
        self.inner.open.store(true, Ordering::Release);
        Ok(())
    }

    async fn close(&self) -> Result<(), Error> {
        self.inner.open.store(false, Ordering::Release);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, Error> {
        self.inner.ensure_open()?;
        Ok(self.inner.data.read().get(key).cloned())
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), Error> {
        self.inner.ensure_open()?;
        self.inner.data.write().insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), Error> {
        self.inner.ensure_open()?;
        self.inner.data.write().remove(key);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<Option<Vec<u8>>, Error> {
        self.inner.ensure_open()?;
        Ok(self.inner.data.write().remove(key))
    }

    async fn batch_write(&self, ops: Vec<BatchOp>) -> Result<(), Error> {
        self.inner.ensure_open()?;
        let mut data = self.inner.data.write();
        for op in ops {
            match op {
                BatchOp::Put { key, value } => {
                    data.insert(key, value);
                }
                BatchOp::Delete { key } => {
                    data.remove(&key);
                }
            }
        }
        Ok(())
    }

    fn scan(&self, prefix: &str) -> KvStream {
        let inner = self.inner.clone();
        let prefix = prefix.to_string();

        Box::pin(try_stream! {
            let page_size = inner.config.scan_page_size.max(1) as usize;
            let mut cursor = Bound::Included(prefix.clone());
            loop {
                inner.ensure_open()?;
                let page: Vec<(String, Vec<u8>)> = {
                    let data = inner.data.read();
                    data.range((cursor.clone(), Bound::<String>::Unbounded))
                        .take_while(|(k, _)| k.starts_with(prefix.as_str()))
                        .take(page_size)
                        .map(|(k, v)| (k.clone(), v.clone()))
                        .collect()
                };
                let len = page.len();
                trace!("memory scan {}: page of {}", prefix, len);
                if let Some((last, _)) = page.last() {
                    cursor = Bound::Excluded(last.clone());
                }
                for (key, value) in page {
                    yield KvPair { key: key.into_bytes(), value };
                }
                if len < page_size {
                    break;
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use futures::TryStreamExt;

    use super::*;

    fn put_op(key: &str, value: &[u8]) -> BatchOp {
        BatchOp::Put {
            key: key.to_string(),
            value: value.to_vec(),
        }
    }

    #[tokio::test]
    async fn put_get_remove() {
        let adapter = MemoryAdapter::new();
        adapter.put("a", b"1".to_vec()).await.unwrap();
        assert_eq!(adapter.get("a").await.unwrap(), Some(b"1".to_vec()));
        assert_eq!(adapter.remove("a").await.unwrap(), Some(b"1".to_vec()));
        assert_eq!(adapter.remove("a").await.unwrap(), None);
        assert!(adapter.is_empty());
    }

    #[tokio::test]
    async fn scan_is_ordered_prefixed_and_paged() {
        let adapter = MemoryAdapter::with_config(AdapterConfig { scan_page_size: 2 });
        adapter
            .batch_write(vec![
                put_op("p/c", b"3"),
                put_op("p/a", b"1"),
                put_op("q/a", b"x"),
                put_op("p/b", b"2"),
                put_op("o/z", b"y"),
            ])
            .await
            .unwrap();

        let pairs: Vec<KvPair> = adapter.scan("p/").try_collect().await.unwrap();
        let keys: Vec<_> = pairs.iter().map(|p| p.key.clone()).collect();
        assert_eq!(keys, vec![b"p/a".to_vec(), b"p/b".to_vec(), b"p/c".to_vec()]);
    }

    #[tokio::test]
    async fn batch_deletes() {
        let adapter = MemoryAdapter::new();
        adapter
            .batch_write(vec![put_op("a", b"1"), put_op("b", b"2")])
            .await
            .unwrap();
        adapter
            .batch_write(vec![
                BatchOp::Delete { key: "a".to_string() },
                BatchOp::Delete { key: "b".to_string() },
            ])
            .await
            .unwrap();
        assert!(adapter.is_empty());
    }

    #[tokio::test]
    async fn closed_adapter_fails() {
        let adapter = MemoryAdapter::new();
        adapter.close().await.unwrap();
        assert!(matches!(
            adapter.get("a").await,
            Err(Error::StorageFailure(_))
        ));
        let scanned: Result<Vec<KvPair>, Error> = adapter.scan("").try_collect().await;
        assert!(scanned.is_err());

        adapter.open().await.unwrap();
        assert_eq!(adapter.get("a").await.unwrap(), None);
    }
}
