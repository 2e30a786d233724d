//! Storage engine contract consumed by the datastore.
//!
//! Adapters are black boxes: the datastore only issues point reads, writes,
//! deletes, batches and prefix scans. Consistency beyond a single key is a
//! property of the adapter, not of this crate.

mod memory;
#[cfg(feature = "tikv")]
mod tikv;

use std::future::Future;
use std::pin::Pin;

use futures::Stream;

use crate::Error;

pub use memory::MemoryAdapter;
#[cfg(feature = "tikv")]
pub use tikv::TikvAdapter;

/// Ordered stream of raw pairs produced by [`StorageAdapter::scan`].
pub type KvStream = Pin<Box<dyn Stream<Item = Result<KvPair, Error>> + Send>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KvPair {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOp {
    Put { key: String, value: Vec<u8> },
    Delete { key: String },
}

pub trait StorageAdapter: Send + Sync + 'static {
    fn open(&self) -> impl Future<Output = Result<(), Error>> + Send {
        async { Ok(()) }
    }

    /// Callers must let in-flight operations finish before closing.
    fn close(&self) -> impl Future<Output = Result<(), Error>> + Send {
        async { Ok(()) }
    }

    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Vec<u8>>, Error>> + Send;

    fn put(&self, key: &str, value: Vec<u8>) -> impl Future<Output = Result<(), Error>> + Send;

    fn delete(&self, key: &str) -> impl Future<Output = Result<(), Error>> + Send;

    /// Deletes a key and returns the value it held. Adapters that can do this
    /// atomically should override the read-then-delete default.
    fn remove(&self, key: &str) -> impl Future<Output = Result<Option<Vec<u8>>, Error>> + Send {
        async move {
            let previous = self.get(key).await?;
            if previous.is_some() {
                self.delete(key).await?;
            }
            Ok(previous)
        }
    }

    /// Applies all operations. The default issues them one by one; a failure
    /// part way leaves the earlier operations applied.
    fn batch_write(&self, ops: Vec<BatchOp>) -> impl Future<Output = Result<(), Error>> + Send {
        async move {
            for op in ops {
                match op {
                    BatchOp::Put { key, value } => self.put(&key, value).await?,
                    BatchOp::Delete { key } => self.delete(&key).await?,
                }
            }
            Ok(())
        }
    }

    /// Every pair whose key starts with `prefix`, in ascending key order.
    fn scan(&self, prefix: &str) -> KvStream;
}
