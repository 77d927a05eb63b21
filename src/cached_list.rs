use crate::error::CacheError;
use crate::error::Result;
use crate::slot::SnapshotSlot;
use crate::snapshot::Items;
use crate::snapshot::ItemsIter;
use crate::traits::CachingControl;
use crate::traits::ListProducer;
use fieldx::fxstruct;
use std::fmt::Debug;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use tracing::debug;
use tracing::trace;

/// A lazily populated list over a [`ListProducer`].
///
/// With caching enabled the first read fetches the list and every following read is served from that snapshot until
/// [`invalidate_cache()`](Self::invalidate_cache) or [`refresh()`](Self::refresh) is called. With caching disabled
/// every read calls the producer.
///
/// ```ignore
/// let workflows = CachedList::builder()
///     .producer(Arc::new(ProjectWorkflows::new(session, project)))
///     .name("workflows")
///     .build()?;
///
/// let count = workflows.count().await?;
/// // ...after creating a new workflow on the server:
/// workflows.invalidate_cache();
/// ```
#[fxstruct(sync, no_new, default(off), builder(post_build))]
pub struct CachedList<P>
where
    P: ListProducer,
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
    slot: SnapshotSlot<Items<P::Item>>,
}

impl<P> CachedList<P>
where
    P: ListProducer,
{
    pub fn new(producer: P, caching: bool) -> Self {
        Self::builder()
            .producer(Arc::new(producer))
            .caching(caching)
            .build()
            .expect("all required fields of CachedList are set")
    }

    fn post_build(mut self) -> Self {
        self.slot = SnapshotSlot::new(self.caching);
        self
    }

    async fn fetch(&self) -> Result<Items<P::Item>, P::Error> {
        debug!("[{}] fetching list", self.name());
        let items = self.producer.fetch().await.map_err(CacheError::Producer)?;
        debug!("[{}] fetched {} item(s)", self.name(), items.len());
        Ok(Items::new(items))
    }

    /// The current snapshot. Fetches it if caching is off or nothing is cached.
    pub async fn items(&self) -> Result<Arc<Items<P::Item>>, P::Error> {
        let (items, fetched) = self.slot.current(|| self.fetch()).await?;
        if !fetched {
            trace!("[{}] served from cache", self.name());
        }
        Ok(items)
    }

    pub async fn count(&self) -> Result<usize, P::Error> {
        Ok(self.items().await?.len())
    }

    pub async fn is_empty(&self) -> Result<bool, P::Error> {
        Ok(self.items().await?.is_empty())
    }

    /// Iterate over one snapshot in producer order.
    pub async fn iter(&self) -> Result<ItemsIter<P::Item>, P::Error> {
        Ok(ItemsIter::new(self.items().await?))
    }

    pub async fn get(&self, position: usize) -> Result<Option<P::Item>, P::Error> {
        Ok(self.items().await?.get(position).cloned())
    }

    pub async fn first(&self) -> Result<Option<P::Item>, P::Error> {
        Ok(self.items().await?.first().cloned())
    }

    pub async fn find<F>(&self, predicate: F) -> Result<Option<P::Item>, P::Error>
    where
        F: Fn(&P::Item) -> bool,
    {
        Ok(self.items().await?.find(predicate).cloned())
    }

    pub async fn position<F>(&self, predicate: F) -> Result<Option<usize>, P::Error>
    where
        F: Fn(&P::Item) -> bool,
    {
        Ok(self.items().await?.position(predicate))
    }

    pub async fn contains(&self, item: &P::Item) -> Result<bool, P::Error>
    where
        P::Item: PartialEq,
    {
        Ok(self.items().await?.contains(item))
    }

    /// Drop the held snapshot without fetching. The next read fetches.
    pub fn invalidate_cache(&self) {
        if self.slot.invalidate() {
            debug!("[{}] cache invalidated", self.name());
        }
    }

    /// Fetch right away. With caching enabled the result replaces the held snapshot.
    pub async fn refresh(&self) -> Result<Arc<Items<P::Item>>, P::Error> {
        debug!("[{}] refresh requested", self.name());
        self.slot.refresh(|| self.fetch()).await
    }

    /// True if the next read would be served without calling the producer.
    pub fn is_cached(&self) -> bool {
        self.slot.cached().is_some()
    }
}

impl<P> CachingControl for CachedList<P>
where
    P: ListProducer,
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

impl<P> Debug for CachedList<P>
where
    P: ListProducer,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedList")
            .field("name", &self.name)
            .field("slot", &self.slot)
            .finish()
    }
}
