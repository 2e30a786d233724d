use std::sync::{Arc, Weak};

use log::debug;
use parking_lot::RwLock;

use crate::{
    DocumentHandler, Error, Model, Pagination, StorageAdapter, ValueStream,
    codec::decode_record,
    filter::Predicate,
    operations::{BatchedDelete, BatchedPush, Delete, Edit, Get, Push},
    utils::{document_path, document_prefix, is_valid_id},
};

pub type PushCallback<T> = Arc<dyn Fn(&T) + Send + Sync>;
pub type EditCallback<T> = Arc<dyn Fn(&str, &T) + Send + Sync>;
pub type DeleteCallback = Arc<dyn Fn(&str) + Send + Sync>;

struct Callbacks<T> {
    on_push: Option<PushCallback<T>>,
    on_edit: Option<EditCallback<T>>,
    on_delete: Option<DeleteCallback>,
}

impl<T> Default for Callbacks<T> {
    fn default() -> Self {
        Self {
            on_push: None,
            on_edit: None,
            on_delete: None,
        }
    }
}

pub(crate) struct DatastoreInner<T, A> {
    adapter: A,
    callbacks: RwLock<Callbacks<T>>,
}

/// Owns one storage adapter and binds it to the record type `T`.
///
/// Cloning is cheap and shares the adapter. The datastore keeps no record
/// state between operations; every read goes to the adapter.
pub struct Datastore<T, A> {
    inner: Arc<DatastoreInner<T, A>>,
}

impl<T, A> Clone for Datastore<T, A> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Model, A: StorageAdapter> Datastore<T, A> {
    pub fn new(adapter: A) -> Self {
        Self {
            inner: Arc::new(DatastoreInner {
                adapter,
                callbacks: RwLock::new(Callbacks::default()),
            }),
        }
    }

    /// Opens the adapter and wraps it.
    pub async fn open(adapter: A) -> Result<Self, Error> {
        adapter.open().await?;
        debug!("datastore {} opened", T::collection());
        Ok(Self::new(adapter))
    }

    /// Closes the adapter. Operations still running on any clone of this
    /// datastore must be finished first.
    pub async fn close(&self) -> Result<(), Error> {
        debug!("datastore {} closing", T::collection());
        self.inner.adapter.close().await
    }

    pub fn collection(&self) -> &'static str {
        T::collection()
    }

    pub fn adapter(&self) -> &A {
        &self.inner.adapter
    }

    pub fn get(&self) -> Get<T, A> {
        Get::new(self.clone())
    }

    pub fn push(&self) -> Push<T, A> {
        Push::new(self.clone())
    }

    pub fn push_batched(&self) -> BatchedPush<T, A> {
        BatchedPush::new(self.clone())
    }

    pub fn edit(&self) -> Edit<T, A> {
        Edit::new(self.clone())
    }

    pub fn delete(&self) -> Delete<T, A> {
        Delete::new(self.clone())
    }

    pub fn delete_batched(&self) -> BatchedDelete<T, A> {
        BatchedDelete::new(self.clone())
    }

    pub fn on_push(&self, callback: impl Fn(&T) + Send + Sync + 'static) -> &Self {
        self.inner.callbacks.write().on_push = Some(Arc::new(callback));
        self
    }

    pub fn on_edit(&self, callback: impl Fn(&str, &T) + Send + Sync + 'static) -> &Self {
        self.inner.callbacks.write().on_edit = Some(Arc::new(callback));
        self
    }

    pub fn on_delete(&self, callback: impl Fn(&str) + Send + Sync + 'static) -> &Self {
        self.inner.callbacks.write().on_delete = Some(Arc::new(callback));
        self
    }

    pub fn clear_callbacks(&self) {
        *self.inner.callbacks.write() = Callbacks::default();
    }

    /// Record with this id, if stored.
    pub async fn fetch(&self, id: &str) -> Result<Option<T>, Error> {
        self.get().id(id).first().await
    }

    pub async fn fetch_items(
        &self,
        filter: Option<Predicate<T>>,
        pagination: Option<Pagination>,
    ) -> Result<Vec<T>, Error> {
        let mut query = self.get();
        if let Some(filter) = filter {
            query = query.predicate(filter);
        }
        if let Some(pagination) = pagination {
            query = query.paginate(pagination);
        }
        query.run().await
    }

    pub async fn push_item(&self, item: T) -> Result<T, Error> {
        self.push().item(item).run().await
    }

    pub async fn push_items(&self, items: Vec<T>) -> Result<Vec<T>, Error> {
        self.push_batched().items(items).run().await
    }

    pub async fn remove_id(&self, id: &str) -> Result<Option<T>, Error> {
        self.delete().id(id).run().await
    }

    pub async fn remove_item(&self, item: &T) -> Result<Option<T>, Error> {
        self.delete().item(item).run().await
    }

    /// Binds `item` to this datastore for `save`/`delete` convenience calls.
    pub fn handler(&self, item: T) -> DocumentHandler<T, A> {
        DocumentHandler::attached(item, self)
    }

    pub(crate) fn key(&self, id: &str) -> Result<String, Error> {
        if !is_valid_id(id) {
            return Err(Error::InvalidOperationParameters(
                "id must be non-empty and must not contain '/'",
            ));
        }
        Ok(document_path(T::collection(), id))
    }

    pub(crate) fn values(&self, filter: Option<Predicate<T>>) -> ValueStream<T> {
        let prefix = document_prefix(T::collection());
        ValueStream::new(self.inner.adapter.scan(&prefix), prefix).with_filter(filter)
    }

    /// Ids that cannot be stored in this collection read as absent.
    pub(crate) async fn read(&self, id: &str) -> Result<Option<T>, Error> {
        if !is_valid_id(id) {
            return Ok(None);
        }
        match self.inner.adapter.get(&self.key(id)?).await? {
            Some(bytes) => Ok(Some(decode_record(id, &bytes)?)),
            None => Ok(None),
        }
    }

    pub(crate) fn notify_push(&self, item: &T) {
        let callback = self.inner.callbacks.read().on_push.clone();
        if let Some(callback) = callback {
            callback(item);
        }
    }

    pub(crate) fn notify_edit(&self, id: &str, item: &T) {
        let callback = self.inner.callbacks.read().on_edit.clone();
        if let Some(callback) = callback {
            callback(id, item);
        }
    }

    pub(crate) fn notify_delete(&self, id: &str) {
        let callback = self.inner.callbacks.read().on_delete.clone();
        if let Some(callback) = callback {
            callback(id);
        }
    }

    pub(crate) fn downgrade(&self) -> Weak<DatastoreInner<T, A>> {
        Arc::downgrade(&self.inner)
    }

    pub(crate) fn from_inner(inner: Arc<DatastoreInner<T, A>>) -> Self {
        Self { inner }
    }
}
