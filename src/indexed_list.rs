use crate::error::CacheError;
use crate::error::Result;
use crate::slot::SnapshotSlot;
use crate::snapshot::IndexedItems;
use crate::snapshot::Items;
use crate::snapshot::ItemsIter;
use crate::traits::CachingControl;
use crate::traits::KeyedProducer;
use crate::traits::ListProducer;
use crate::traits::RefreshableItem;
use async_trait::async_trait;
use fieldx::fxstruct;
use std::borrow::Borrow;
use std::fmt::Debug;
use std::fmt::Display;
use std::hash::Hash;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use tracing::debug;
use tracing::trace;

/// Snapshot type of an [`IndexedCachedList`] over producer `P`.
pub type IndexedSnapshot<P> = IndexedItems<<P as ListProducer>::Item, <P as KeyedProducer>::Key>;

/// A [`CachedList`](crate::CachedList) with an index over keys derived from its items by
/// [`KeyedProducer::key_of()`].
///
/// The index is built together with every snapshot and is dropped together with it, so it always reflects exactly the
/// items being served. If more than one item produces the same key the item closer to the end of the list wins.
#[fxstruct(sync, no_new, default(off), builder(post_build))]
pub struct IndexedCachedList<P>
where
    P: KeyedProducer,
{
    #[fieldx(get(clone), builder(required))]
    producer: Arc<P>,

    /// List name. Most useful for debugging and logging.
    #[fieldx(get, builder(into), default(String::from("<anon>")))]
    name: String,

    /// Caching mode the list starts with.
    #[fieldx(get(off), default(true))]
    caching: bool,

    #[fieldx(get(off), builder(off), default(SnapshotSlot::new(true)))]
    slot: SnapshotSlot<IndexedSnapshot<P>>,
}

impl<P> IndexedCachedList<P>
where
    P: KeyedProducer,
{
    pub fn new(producer: P, caching: bool) -> Self {
        Self::builder()
            .producer(Arc::new(producer))
            .caching(caching)
            .build()
            .expect("all required fields of IndexedCachedList are set")
    }

    fn post_build(mut self) -> Self {
        self.slot = SnapshotSlot::new(self.caching);
        self
    }

    async fn fetch(&self) -> Result<IndexedSnapshot<P>, P::Error> {
        debug!("[{}] fetching list", self.name());
        let items = self.producer.fetch().await.map_err(CacheError::Producer)?;
        let producer = &self.producer;
        let (snapshot, duplicates) = IndexedItems::build(items, |item| producer.key_of(item));
        for key in duplicates {
            debug!("[{}] duplicate key '{key}', the later item is indexed", self.name());
        }
        debug!("[{}] fetched and indexed {} item(s)", self.name(), snapshot.len());
        Ok(snapshot)
    }

    /// The current snapshot along with its index.
    pub async fn indexed(&self) -> Result<Arc<IndexedSnapshot<P>>, P::Error> {
        let (snapshot, fetched) = self.slot.current(|| self.fetch()).await?;
        if !fetched {
            trace!("[{}] served from cache", self.name());
        }
        Ok(snapshot)
    }

    pub async fn items(&self) -> Result<Arc<Items<P::Item>>, P::Error> {
        Ok(self.indexed().await?.shared_items())
    }

    pub async fn count(&self) -> Result<usize, P::Error> {
        Ok(self.indexed().await?.len())
    }

    pub async fn is_empty(&self) -> Result<bool, P::Error> {
        Ok(self.indexed().await?.is_empty())
    }

    pub async fn iter(&self) -> Result<ItemsIter<P::Item>, P::Error> {
        Ok(ItemsIter::new(self.items().await?))
    }

    pub async fn get(&self, position: usize) -> Result<Option<P::Item>, P::Error> {
        Ok(self.indexed().await?.items().get(position).cloned())
    }

    pub async fn first(&self) -> Result<Option<P::Item>, P::Error> {
        Ok(self.indexed().await?.items().first().cloned())
    }

    pub async fn find<F>(&self, predicate: F) -> Result<Option<P::Item>, P::Error>
    where
        F: Fn(&P::Item) -> bool,
    {
        Ok(self.indexed().await?.items().find(predicate).cloned())
    }

    pub async fn position<F>(&self, predicate: F) -> Result<Option<usize>, P::Error>
    where
        F: Fn(&P::Item) -> bool,
    {
        Ok(self.indexed().await?.items().position(predicate))
    }

    pub async fn contains(&self, item: &P::Item) -> Result<bool, P::Error>
    where
        P::Item: PartialEq,
    {
        Ok(self.indexed().await?.items().contains(item))
    }

    /// Look up an item by its key. Fails with [`CacheError::KeyNotFound`] if there is none.
    pub async fn get_by_key<Q>(&self, key: &Q) -> Result<P::Item, P::Error>
    where
        P::Key: Borrow<Q>,
        Q: Hash + Eq + Display + ?Sized,
    {
        self.indexed()
            .await?
            .get_by_key(key)
            .cloned()
            .ok_or_else(|| CacheError::KeyNotFound {
                list: self.name().clone(),
                key:  key.to_string(),
            })
    }

    /// Same as [`get_by_key()`](Self::get_by_key) but reports a missing key as `None`. Producer failures are still
    /// errors.
    pub async fn try_get_by_key<Q>(&self, key: &Q) -> Result<Option<P::Item>, P::Error>
    where
        P::Key: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        Ok(self.indexed().await?.get_by_key(key).cloned())
    }

    pub async fn contains_key<Q>(&self, key: &Q) -> Result<bool, P::Error>
    where
        P::Key: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        Ok(self.indexed().await?.contains_key(key))
    }

    pub async fn keys(&self) -> Result<Vec<P::Key>, P::Error> {
        Ok(self.indexed().await?.keys().into_iter().cloned().collect())
    }

    /// Drop the held snapshot and its index without fetching.
    pub fn invalidate_cache(&self) {
        if self.slot.invalidate() {
            debug!("[{}] cache invalidated", self.name());
        }
    }

    pub async fn refresh(&self) -> Result<Arc<IndexedSnapshot<P>>, P::Error> {
        debug!("[{}] refresh requested", self.name());
        self.slot.refresh(|| self.fetch()).await
    }

    pub fn is_cached(&self) -> bool {
        self.slot.cached().is_some()
    }
}

impl<P> CachingControl for IndexedCachedList<P>
where
    P: KeyedProducer,
{
    fn is_caching_enabled(&self) -> bool {
        self.slot.is_caching_enabled()
    }

    fn set_caching_enabled(&self, enabled: bool) {
        if self.slot.set_caching(enabled) != enabled {
            debug!("[{}] caching {}", self.name(), if enabled { "enabled" } else { "disabled" });
        }
    }

    fn scope_depth(&self) -> &AtomicUsize {
        self.slot.scope_depth()
    }
}

impl<P> Debug for IndexedCachedList<P>
where
    P: KeyedProducer,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexedCachedList")
            .field("name", &self.name)
            .field("slot", &self.slot)
            .finish()
    }
}

/// Index items of a producer by their [`RefreshableItem::name()`].
#[derive(Debug, Clone)]
pub struct ByName<P>(P);

impl<P> ByName<P> {
    pub fn new(producer: P) -> Self {
        Self(producer)
    }

    pub fn inner(&self) -> &P {
        &self.0
    }
}

#[async_trait]
impl<P> ListProducer for ByName<P>
where
    P: ListProducer,
    P::Item: RefreshableItem,
{
    type Error = P::Error;
    type Item = P::Item;

    async fn fetch(&self) -> std::result::Result<Vec<Self::Item>, Self::Error> {
        self.0.fetch().await
    }
}

impl<P> KeyedProducer for ByName<P>
where
    P: ListProducer,
    P::Item: RefreshableItem,
{
    type Key = String;

    fn key_of(&self, item: &Self::Item) -> Self::Key {
        item.name().to_string()
    }
}

/// Index items of a producer by their [`RefreshableItem::id()`].
#[derive(Debug, Clone)]
pub struct ById<P>(P);

impl<P> ById<P> {
    pub fn new(producer: P) -> Self {
        Self(producer)
    }

    pub fn inner(&self) -> &P {
        &self.0
    }
}

#[async_trait]
impl<P> ListProducer for ById<P>
where
    P: ListProducer,
    P::Item: RefreshableItem,
{
    type Error = P::Error;
    type Item = P::Item;

    async fn fetch(&self) -> std::result::Result<Vec<Self::Item>, Self::Error> {
        self.0.fetch().await
    }
}

impl<P> KeyedProducer for ById<P>
where
    P: ListProducer,
    P::Item: RefreshableItem,
{
    type Key = <P::Item as RefreshableItem>::Id;

    fn key_of(&self, item: &Self::Item) -> Self::Key {
        item.id()
    }
}
