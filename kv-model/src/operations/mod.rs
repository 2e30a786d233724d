//! Fluent operation builders handed out by [`Datastore`](crate::Datastore).
//!
//! A builder is configured with chained calls and executed by its terminal
//! method. Calling the terminal method again re-runs the same configuration.

mod delete;
mod edit;
mod get;
mod push;

pub use delete::{BatchedDelete, Delete};
pub use edit::Edit;
pub use get::Get;
pub use push::{BatchedPush, Push};

use crate::{Error, Model, is_persisted};

/// What a single-record write operates on.
#[derive(Clone)]
pub(crate) enum Target<T> {
    Item(T),
    Id(String),
    /// An item without persisted identity was supplied; rejected at run.
    Unpersisted,
}

impl<T: Model> Target<T> {
    pub(crate) fn from_item(item: &T) -> Self {
        match item.metadata() {
            Some(meta) if is_persisted(meta) => Target::Item(item.clone()),
            _ => Target::Unpersisted,
        }
    }

    pub(crate) fn id(&self) -> Result<&str, Error> {
        match self {
            Target::Item(item) => crate::persisted_id(item),
            Target::Id(id) => Ok(id),
            Target::Unpersisted => Err(Error::UnpersistedItem),
        }
    }
}
