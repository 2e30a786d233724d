use log::debug;

use crate::{
    BatchOp, Datastore, Error, Model, StorageAdapter, codec::decode_record, is_persisted,
    operations::Target,
};

/// Removes one record, by id or by an item with persisted identity.
pub struct Delete<T, A> {
    store: Datastore<T, A>,
    target: Option<Target<T>>,
}

impl<T: Model, A: StorageAdapter> Delete<T, A> {
    pub(crate) fn new(store: Datastore<T, A>) -> Self {
        Self {
            store,
            target: None,
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.target = Some(Target::Id(id.into()));
        self
    }

    pub fn item(mut self, item: &T) -> Self {
        self.target = Some(Target::from_item(item));
        self
    }

    /// Returns the removed record, or `None` if nothing was stored under the
    /// id. The delete callback fires only when a record was removed.
    pub async fn run(&self) -> Result<Option<T>, Error> {
        let id = self
            .target
            .as_ref()
            .ok_or(Error::InvalidOperationParameters("no item or id to delete"))?
            .id()?;

        let Some(bytes) = self.store.adapter().remove(&self.store.key(id)?).await? else {
            debug!("delete {}: {} not stored", T::collection(), id);
            return Ok(None);
        };
        let item = decode_record(id, &bytes)?;
        debug!("delete {}: {}", T::collection(), id);

        self.store.notify_delete(id);
        Ok(Some(item))
    }
}

/// Removes many records with one batch write.
pub struct BatchedDelete<T, A> {
    store: Datastore<T, A>,
    ids: Vec<String>,
    rejected: bool,
}

impl<T: Model, A: StorageAdapter> BatchedDelete<T, A> {
    pub(crate) fn new(store: Datastore<T, A>) -> Self {
        Self {
            store,
            ids: Vec::new(),
            rejected: false,
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        let id = id.into();
        if !self.ids.contains(&id) {
            self.ids.push(id);
        }
        self
    }

    pub fn ids<I, S>(self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ids.into_iter().fold(self, |batch, id| batch.id(id))
    }

    /// Queues the item's id. An item without persisted identity makes the
    /// whole batch fail at run.
    pub fn item(mut self, item: &T) -> Self {
        match item.metadata().filter(|meta| is_persisted(meta)) {
            Some(meta) => match meta.id.clone() {
                Some(id) => self.id(id),
                None => self,
            },
            None => {
                self.rejected = true;
                self
            }
        }
    }

    pub fn items<'a>(self, items: impl IntoIterator<Item = &'a T>) -> Self {
        items.into_iter().fold(self, |batch, item| batch.item(item))
    }

    /// Deletes the queued ids that are stored and returns their records in
    /// queue order. Missing ids are skipped.
    pub async fn run(&self) -> Result<Vec<T>, Error> {
        if self.rejected {
            return Err(Error::UnpersistedItem);
        }

        let mut removed = Vec::with_capacity(self.ids.len());
        for id in &self.ids {
            if let Some(item) = self.store.read(id).await? {
                removed.push((id.as_str(), item));
            }
        }
        if removed.is_empty() {
            debug!("delete batched {}: nothing stored", T::collection());
            return Ok(Vec::new());
        }

        let ops = removed
            .iter()
            .map(|(id, _)| {
                Ok(BatchOp::Delete {
                    key: self.store.key(id)?,
                })
            })
            .collect::<Result<Vec<_>, Error>>()?;
        self.store.adapter().batch_write(ops).await?;
        debug!(
            "delete batched {}: {} of {} ids",
            T::collection(),
            removed.len(),
            self.ids.len()
        );

        for (id, _) in &removed {
            self.store.notify_delete(id);
        }
        Ok(removed.into_iter().map(|(_, item)| item).collect())
    }
}
