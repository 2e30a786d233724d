use log::debug;

use crate::{
    Datastore, Error, Model, StorageAdapter, codec::encode_record, operations::Target,
    persisted_id, touch_updated,
};

/// Partial update of one stored record.
///
/// The target is either an item with persisted identity, used as is, or an
/// id whose current record is fetched first. Only the `Some` fields of the
/// patch are copied; metadata is never patched.
pub struct Edit<T: Model, A> {
    store: Datastore<T, A>,
    target: Option<Target<T>>,
    patch: Option<T::Patch>,
}

impl<T: Model, A: StorageAdapter> Edit<T, A> {
    pub(crate) fn new(store: Datastore<T, A>) -> Self {
        Self {
            store,
            target: None,
            patch: None,
        }
    }

    pub fn item(mut self, item: &T) -> Self {
        self.target = Some(Target::from_item(item));
        self
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.target = Some(Target::Id(id.into()));
        self
    }

    pub fn with(mut self, patch: T::Patch) -> Self {
        self.patch = Some(patch);
        self
    }

    pub fn patch(self, patch: T::Patch) -> Self {
        self.with(patch)
    }

    /// Applies the patch, touches `updated` and writes the record back.
    /// Editing an id that is not stored fails with [`Error::NotFound`].
    pub async fn run(&self) -> Result<T, Error> {
        let patch = self
            .patch
            .clone()
            .ok_or(Error::InvalidOperationParameters("no patch data to edit with"))?;

        let mut item = match &self.target {
            None => return Err(Error::InvalidOperationParameters("no item or id to edit")),
            Some(Target::Unpersisted) => return Err(Error::UnpersistedItem),
            Some(Target::Item(item)) => item.clone(),
            Some(Target::Id(id)) => self
                .store
                .read(id)
                .await?
                .ok_or_else(|| Error::NotFound(id.clone()))?,
        };

        item.apply_patch(patch);
        touch_updated(item.metadata_mut());
        let id = persisted_id(&item)?;

        self.store
            .adapter()
            .put(&self.store.key(id)?, encode_record(&item)?)
            .await?;
        debug!("edit {}: {}", T::collection(), id);

        self.store.notify_edit(id, &item);
        Ok(item)
    }
}
