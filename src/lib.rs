//! # rd-cache
//!
//! Lazily populated, invalidatable caches for lists of remote objects.
//!
//! Think of it as the layer that keeps an object model over a slow remote protocol from re-fetching the same list on
//! every access.
//!
//! # The Basics
//!
//! The crate is designed for the following use case:
//!
//! - The remote side can only hand out whole lists of objects (all workflows of a project, all pages of a folder).
//! - Every fetch is a roundtrip that is expensive compared to anything done locally.
//! - The code owning a list knows when it has changed the list on the server and can say so.
//!
//! The caches operate on the following principles:
//!
//! - A container is built over a *producer*, a type implementing [`ListProducer`], which performs the actual fetch.
//! - With caching enabled, the first read fetches and the result (the *snapshot*) serves all following reads.
//! - [`invalidate_cache()`](CachedList::invalidate_cache) drops the snapshot lazily,
//!   [`refresh()`](CachedList::refresh) re-fetches eagerly.
//! - With caching disabled, every read fetches.
//! - A read never costs more than one producer call.
//! - A failed fetch leaves the container exactly as it was and the error goes back to the caller of that read.
//!
//! # Containers
//!
//! - [`CachedList`] is the plain list.
//! - [`IndexedCachedList`] adds lookups by a key derived from each item by a [`KeyedProducer`]. [`ByName`] and
//!   [`ById`] derive keys from [`RefreshableItem`]s. The index is built together with the snapshot and is never out of
//!   sync with it.
//! - [`RefreshableHandle`] is the single-object counterpart: it starts from a key or a partial fragment and loads the
//!   full object through an [`ObjectLoader`] only when a field is asked for that isn't there yet.
//!
//! [`CachingScope`] temporarily forces the caching mode of a container:
//!
//! ```ignore
//! let workflows = CachedList::new(ProjectWorkflows::new(&session, project), true);
//! {
//!     let _scope = workflows.caching_scope(false);
//!     // Always straight from the server in here.
//!     workflows.count().await?;
//! }
//! ```
//!
//! # Concurrency
//!
//! Containers are `Send + Sync` and are used through shared references. Locks are never held while a producer runs,
//! hence concurrent readers missing the cache each call the producer. An invalidation, refresh, or mode change that
//! happens while a fetch is in flight prevents that fetch from storing its result.

pub mod cached_list;
pub mod error;
pub mod handle;
pub mod indexed_list;
pub mod scope;
pub(crate) mod slot;
pub mod snapshot;
pub mod traits;
pub mod wait;

#[doc(inline)]
pub use cached_list::CachedList;
#[doc(inline)]
pub use error::CacheError;
#[doc(inline)]
pub use handle::LoadState;
#[doc(inline)]
pub use handle::RefreshableHandle;
#[doc(inline)]
pub use indexed_list::ById;
#[doc(inline)]
pub use indexed_list::ByName;
#[doc(inline)]
pub use indexed_list::IndexedCachedList;
#[doc(inline)]
pub use scope::CachingScope;
#[doc(inline)]
pub use traits::CachingControl;
#[doc(inline)]
pub use traits::KeyedProducer;
#[doc(inline)]
pub use traits::ListProducer;
#[doc(inline)]
pub use traits::ObjectLoader;
#[doc(inline)]
pub use traits::RefreshableItem;
#[doc(inline)]
pub use wait::wait_until;

pub mod prelude {
    pub use crate::cached_list::CachedList;
    pub use crate::error::CacheError;
    pub use crate::error::WaitError;
    pub use crate::handle::LoadState;
    pub use crate::handle::RefreshableHandle;
    pub use crate::indexed_list::ById;
    pub use crate::indexed_list::ByName;
    pub use crate::indexed_list::IndexedCachedList;
    pub use crate::indexed_list::IndexedSnapshot;
    pub use crate::scope::CachingScope;
    pub use crate::snapshot::*;
    pub use crate::traits::*;
    pub use crate::wait::wait_until;
}
