use std::sync::Weak;

use log::warn;

use crate::{Datastore, Error, Model, StorageAdapter, db::DatastoreInner, persisted_id};

/// An item together with a non-owning handle to the datastore it came from.
///
/// The handle never keeps the datastore alive. Once every [`Datastore`]
/// clone is dropped, `save`, `delete` and `reload` fail with
/// [`Error::InvalidOperationParameters`]; the item itself stays usable.
pub struct DocumentHandler<T, A> {
    item: T,
    store: Option<Weak<DatastoreInner<T, A>>>,
}

impl<T: Model, A: StorageAdapter> DocumentHandler<T, A> {
    pub(crate) fn attached(item: T, store: &Datastore<T, A>) -> Self {
        Self {
            item,
            store: Some(store.downgrade()),
        }
    }

    pub fn detached(item: T) -> Self {
        Self { item, store: None }
    }

    pub fn item(&self) -> &T {
        &self.item
    }

    pub fn item_mut(&mut self) -> &mut T {
        &mut self.item
    }

    pub fn into_item(self) -> T {
        self.item
    }

    pub fn is_attached(&self) -> bool {
        self.store
            .as_ref()
            .is_some_and(|store| store.strong_count() > 0)
    }

    /// Pushes the item if it has no persisted identity yet, otherwise writes
    /// its current fields back and touches `updated`.
    pub async fn save(&mut self) -> Result<&T, Error> {
        let store = self.store()?;
        self.item = if self.item.is_persisted() {
            store
                .edit()
                .item(&self.item)
                .with(T::Patch::default())
                .run()
                .await?
        } else {
            store.push().item(self.item.clone()).run().await?
        };
        Ok(&self.item)
    }

    pub async fn delete(&self) -> Result<Option<T>, Error> {
        self.store()?.delete().item(&self.item).run().await
    }

    /// Replaces the item with the stored record. Returns `false` and leaves
    /// the item alone when nothing is stored under its id.
    pub async fn reload(&mut self) -> Result<bool, Error> {
        let store = self.store()?;
        let id = persisted_id(&self.item)?.to_string();
        match store.fetch(&id).await? {
            Some(item) => {
                self.item = item;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn store(&self) -> Result<Datastore<T, A>, Error> {
        let Some(store) = &self.store else {
            return Err(Error::InvalidOperationParameters(
                "document is not attached to a datastore",
            ));
        };
        match store.upgrade() {
            Some(inner) => Ok(Datastore::from_inner(inner)),
            None => {
                warn!(
                    "{} document {} outlived its datastore",
                    T::collection(),
                    self.item.id().unwrap_or("(unsaved)")
                );
                Err(Error::InvalidOperationParameters("datastore has been dropped"))
            }
        }
    }
}

impl<T: Clone, A> Clone for DocumentHandler<T, A> {
    fn clone(&self) -> Self {
        Self {
            item: self.item.clone(),
            store: self.store.clone(),
        }
    }
}
