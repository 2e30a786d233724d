use log::debug;

use crate::{
    BatchOp, Datastore, Error, Model, StorageAdapter, codec::encode_record, new_metadata,
    persisted_id,
};

/// Stores one item under a fresh identity.
pub struct Push<T, A> {
    store: Datastore<T, A>,
    item: Option<T>,
}

impl<T: Model, A: StorageAdapter> Push<T, A> {
    pub(crate) fn new(store: Datastore<T, A>) -> Self {
        Self { store, item: None }
    }

    pub fn item(mut self, item: T) -> Self {
        self.item = Some(item);
        self
    }

    /// Writes the item and returns it with its new metadata. Any metadata the
    /// item already carried is replaced, so running twice stores two records.
    pub async fn run(&self) -> Result<T, Error> {
        let mut item = self
            .item
            .clone()
            .ok_or(Error::InvalidOperationParameters("nothing to push"))?;
        *item.metadata_mut() = new_metadata();
        let id = persisted_id(&item)?;

        self.store
            .adapter()
            .put(&self.store.key(id)?, encode_record(&item)?)
            .await?;
        debug!("push {}: {}", T::collection(), id);

        self.store.notify_push(&item);
        Ok(item)
    }
}

/// Stores many items with one batch write.
///
/// Each item gets its identity when it is added, so ids can be read and
/// cross-referenced before anything is written.
pub struct BatchedPush<T, A> {
    store: Datastore<T, A>,
    items: Vec<T>,
}

impl<T: Model, A: StorageAdapter> BatchedPush<T, A> {
    pub(crate) fn new(store: Datastore<T, A>) -> Self {
        Self {
            store,
            items: Vec::new(),
        }
    }

    pub fn item(mut self, mut item: T) -> Self {
        *item.metadata_mut() = new_metadata();
        self.items.push(item);
        self
    }

    pub fn items(self, items: impl IntoIterator<Item = T>) -> Self {
        items.into_iter().fold(self, |batch, item| batch.item(item))
    }

    /// Ids already assigned to the queued items, in insertion order.
    pub fn ids(&self) -> Vec<&str> {
        self.items.iter().filter_map(|item| item.id()).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Writes every queued item, then fires the push callback once per item.
    /// Running again overwrites the same ids.
    pub async fn run(&self) -> Result<Vec<T>, Error> {
        if self.items.is_empty() {
            return Ok(Vec::new());
        }

        let ops = self
            .items
            .iter()
            .map(|item| {
                Ok(BatchOp::Put {
                    key: self.store.key(persisted_id(item)?)?,
                    value: encode_record(item)?,
                })
            })
            .collect::<Result<Vec<_>, Error>>()?;

        self.store.adapter().batch_write(ops).await?;
        debug!("push batched {}: {} items", T::collection(), self.items.len());

        for item in &self.items {
            self.store.notify_push(item);
        }
        Ok(self.items.clone())
    }
}
