//! Typed document layer over an ordered key-value store.
//!
//! Records are prost messages that carry a [`Metadata`] block. A [`Datastore`]
//! binds one record type to one [`StorageAdapter`] and hands out fluent
//! operation builders:
//!
//! ```ignore
//! let store = Datastore::<Planet, _>::open(MemoryAdapter::new()).await?;
//! let earth = store.push().item(Planet::new("earth", 3)).run().await?;
//! let inner = store
//!     .get()
//!     .filter(|p: &Planet| p.index < 4)
//!     .sort(Sort::new().asc("index"))
//!     .run()
//!     .await?;
//! ```

#[allow(unused_extern_crates)]
extern crate self as kv_model;

pub mod adapter;
mod codec;
mod config;
mod db;
mod document_handler;
mod error;
mod field;
mod filter;
mod meta;
pub mod operations;
mod pagination;
mod reference;
mod sort;
mod stream;
mod utils;

pub use adapter::{BatchOp, KvPair, KvStream, MemoryAdapter, StorageAdapter};
#[cfg(feature = "tikv")]
pub use adapter::TikvAdapter;
pub use codec::{RECORD_VERSION, decode_record, encode_record};
#[cfg(feature = "tikv")]
pub use config::TikvConfig;
pub use config::AdapterConfig;
pub use db::{Datastore, DeleteCallback, EditCallback, PushCallback};
pub use document_handler::DocumentHandler;
pub use error::Error;
pub use field::{FieldValue, ToFieldValue, resolve_field};
pub use filter::{FieldOp, FilterExpr, Predicate, predicate};
pub use kv_model_derive::Model;
pub use meta::{Metadata, is_persisted, new_metadata, now_millis, touch_updated};
pub use pagination::{Pagination, paginate};
pub use reference::Reference;
pub use sort::{Comparator, Sort, SortBy, SortDirection, SortField};
pub use stream::{Outcome, ValueStream};

/// A record type that can be stored in a [`Datastore`].
///
/// Usually implemented with `#[derive(Model)]` next to `::prost::Message`;
/// the field marked `#[meta]` holds the [`Metadata`] block.
pub trait Model: prost::Message + Default + Clone + Send + Sync + 'static {
    /// Partial update applied by the edit operation. Every declared field,
    /// wrapped in `Option`; `None` leaves the field untouched.
    type Patch: Clone + Default + Send + Sync + 'static;

    /// Key prefix under which records of this type live. Must be non-empty
    /// and free of `/`.
    fn collection() -> &'static str;

    fn metadata(&self) -> Option<&Metadata>;

    fn metadata_mut(&mut self) -> &mut Metadata;

    /// Dynamic access to a declared field, used by sorting and field filters.
    fn field(&self, name: &str) -> Option<FieldValue>;

    fn field_names() -> Vec<&'static str>;

    fn apply_patch(&mut self, patch: Self::Patch);

    fn id(&self) -> Option<&str> {
        self.metadata().and_then(|meta| meta.id.as_deref())
    }

    /// True once id, created and updated are all set.
    fn is_persisted(&self) -> bool {
        self.metadata().is_some_and(is_persisted)
    }
}

/// Returns the id of an item that has persisted identity.
pub(crate) fn persisted_id<T: Model>(item: &T) -> Result<&str, Error> {
    match item.metadata() {
        Some(meta) if is_persisted(meta) => meta.id.as_deref().ok_or(Error::UnpersistedItem),
        _ => Err(Error::UnpersistedItem),
    }
}
