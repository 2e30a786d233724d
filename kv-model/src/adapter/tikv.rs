use async_stream::try_stream;
use log::trace;
use tikv_client::{Key, Snapshot, TransactionClient, TransactionOptions};

use super::{BatchOp, KvPair, KvStream, StorageAdapter};
use crate::{
    AdapterConfig, Error, TikvConfig,
    utils::{key_successor, prefix_end},
};

/// Adapter over a TiKV cluster.
///
/// Every read runs against a snapshot taken at the current timestamp, so one
/// scan sees a consistent view of the keyspace. Writes and batches run in
/// optimistic transactions; a batch commits atomically.
#[derive(Clone)]
pub struct TikvAdapter {
    client: TransactionClient,
    config: AdapterConfig,
}

impl TikvAdapter {
    pub async fn connect(config: TikvConfig) -> Result<Self, Error> {
        let client = TransactionClient::new(config.pd_endpoints)
            .await
            .map_err(Error::TikvError)?;
        Ok(Self {
            client,
            config: config.adapter,
        })
    }

    async fn snapshot(client: &TransactionClient) -> Result<Snapshot, Error> {
        Ok(client.snapshot(
            client.current_timestamp().await.map_err(Error::TikvError)?,
            TransactionOptions::new_optimistic(),
        ))
    }
}

impl StorageAdapter for TikvAdapter {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, Error> {
        let mut snapshot = Self::snapshot(&self.client).await?;
        snapshot
            .get(key.to_string())
            .await
            .map_err(Error::TikvError)
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), Error> {
        let mut txn = self
            .client
            .begin_optimistic()
            .await
            .map_err(Error::TikvError)?;
        txn.put(key.to_string(), value)
            .await
            .map_err(Error::TikvError)?;
        txn.commit().await.map_err(Error::TikvError)?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), Error> {
        let mut txn = self
            .client
            .begin_optimistic()
            .await
            .map_err(Error::TikvError)?;
        txn.delete(key.to_string())
            .await
            .map_err(Error::TikvError)?;
        txn.commit().await.map_err(Error::TikvError)?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<Option<Vec<u8>>, Error> {
        let mut txn = self
            .client
            .begin_optimistic()
            .await
            .map_err(Error::TikvError)?;
        let Some(previous) = txn
            .get(key.to_string())
            .await
            .map_err(Error::TikvError)?
        else {
            txn.rollback().await.map_err(Error::TikvError)?;
            return Ok(None);
        };
        txn.delete(key.to_string())
            .await
            .map_err(Error::TikvError)?;
        txn.commit().await.map_err(Error::TikvError)?;
        Ok(Some(previous))
    }

    async fn batch_write(&self, ops: Vec<BatchOp>) -> Result<(), Error> {
        let mut txn = self
            .client
            .begin_optimistic()
            .await
            .map_err(Error::TikvError)?;
        for op in ops {
            match op {
                BatchOp::Put { key, value } => {
                    txn.put(key, value).await.map_err(Error::TikvError)?;
                }
                BatchOp::Delete { key } => {
                    txn.delete(key).await.map_err(Error::TikvError)?;
                }
            }
        }
        txn.commit().await.map_err(Error::TikvError)?;
        Ok(())
    }

    fn scan(&self, prefix: &str) -> KvStream {
        let client = self.client.clone();
        let page_size = self.config.scan_page_size.max(1);
        let prefix = prefix.as_bytes().to_vec();

        Box::pin(try_stream! {
            let mut snapshot = Self::snapshot(&client).await?;
            let mut start_key: Key = prefix.clone().into();
            let end_key: Key = prefix_end(&prefix).into();
            loop {
                let kvs = snapshot
                    .scan(start_key.clone()..end_key.clone(), page_size)
                    .await
                    .map_err(Error::TikvError)?
                    .collect::<Vec<_>>();
                let len = kvs.len();
                trace!("tikv scan: page of {}", len);
                let Some(last) = kvs.last() else {
                    break;
                };
                start_key = key_successor(&Into::<Vec<u8>>::into(last.key().clone())).into();

                for kv in kvs {
                    yield KvPair {
                        key: Into::<Vec<u8>>::into(kv.key().clone()),
                        value: kv.value().to_vec(),
                    };
                }
                if len < page_size as usize {
                    break;
                }
            }
        })
    }
}
