use std::fmt;
use std::marker::PhantomData;

use crate::{Datastore, Error, Model, StorageAdapter, persisted_id};

/// Typed id of a record in another collection.
///
/// A reference carries no store; it is resolved against whichever datastore
/// the caller passes in.
pub struct Reference<T> {
    id: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Model> Reference<T> {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            _marker: PhantomData,
        }
    }

    /// Reference to an item that has persisted identity.
    pub fn of(item: &T) -> Result<Self, Error> {
        Ok(Self::new(persisted_id(item)?))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub async fn get<A: StorageAdapter>(&self, store: &Datastore<T, A>) -> Result<Option<T>, Error> {
        store.fetch(&self.id).await
    }
}

impl<T> Clone for Reference<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> PartialEq for Reference<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Reference<T> {}

impl<T: Model> fmt::Debug for Reference<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Reference<{}>({})", T::collection(), self.id)
    }
}
