use async_trait::async_trait;
use std::fmt::Debug;
use std::fmt::Display;
use std::hash::Hash;
use std::sync::atomic::AtomicUsize;

use crate::scope::CachingScope;

// For types that are in charge of fetching an entire list of records from the remote side.
#[async_trait]
pub trait ListProducer: Send + Sync + 'static {
    type Item: Debug + Clone + Send + Sync + 'static;
    type Error: Display + Debug + Send + Sync + 'static;

    /// Perform the expensive fetch and return the current authoritative sequence of items. The order of the items is
    /// preserved by the containers.
    async fn fetch(&self) -> Result<Vec<Self::Item>, Self::Error>;
}

/// A producer which also knows how to derive an index key from its items.
pub trait KeyedProducer: ListProducer {
    /// The key type to be used with methods like
    /// [`IndexedCachedList::get_by_key()`](crate::IndexedCachedList::get_by_key).
    type Key: Debug + Display + Hash + Eq + Clone + Send + Sync + 'static;

    /// Must be deterministic for any given item.
    fn key_of(&self, item: &Self::Item) -> Self::Key;
}

/// Any entity retrievable by an identity key and having a display name.
pub trait RefreshableItem {
    type Id: Debug + Display + Hash + Eq + Clone + Send + Sync + 'static;

    fn id(&self) -> Self::Id;
    fn name(&self) -> &str;
}

// Full loader of a single object, the counterpart of ListProducer for RefreshableHandle.
#[async_trait]
pub trait ObjectLoader: Send + Sync + 'static {
    type Key: Debug + Display + Clone + Send + Sync + 'static;
    type Data: Debug + Clone + Send + Sync + 'static;
    type Error: Display + Debug + Send + Sync + 'static;

    async fn load(&self, key: &Self::Key) -> Result<Self::Data, Self::Error>;
}

/// Common control over a container's caching mode.
pub trait CachingControl {
    fn is_caching_enabled(&self) -> bool;

    /// Switching caching off keeps the held snapshot but stops consulting it. Switching it back on discards the
    /// snapshot; the next read fetches exactly once.
    fn set_caching_enabled(&self, enabled: bool);

    /// Depth counter of the currently open [`CachingScope`]s. Maintained by the scopes only.
    #[doc(hidden)]
    fn scope_depth(&self) -> &AtomicUsize;

    /// Force the caching mode until the returned guard is dropped.
    fn caching_scope(&self, enabled: bool) -> CachingScope<'_, Self>
    where
        Self: Sized,
    {
        CachingScope::enter(self, enabled)
    }
}
