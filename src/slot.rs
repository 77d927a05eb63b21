use parking_lot::RwLock;
use std::fmt::Debug;
use std::future::Future;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

// `Loading` is only a marker: nobody waits on it and it's treated exactly like `Absent` by readers. It is what remains
// when a read future gets dropped mid-fetch.
#[derive(Debug)]
pub(crate) enum SlotState<S> {
    Absent,
    Loading { epoch: u64 },
    Loaded { snapshot: Arc<S> },
}

#[derive(Debug)]
struct SlotInner<S> {
    caching: bool,
    // Bumped by every invalidate, refresh and caching mode toggle. A fetch can only store its result if the epoch
    // hasn't changed since the fetch began.
    epoch:   u64,
    state:   SlotState<S>,
}

enum Lookup<S> {
    Hit(Arc<S>),
    // Fetch required; Some(epoch) if the result is to be stored.
    Miss(Option<u64>),
}

/// Holder of a container's snapshot and caching mode. Locks are never held across an await point, thus concurrent
/// readers missing the cache each call the producer.
pub(crate) struct SnapshotSlot<S> {
    inner:       RwLock<SlotInner<S>>,
    scope_depth: AtomicUsize,
}

impl<S> SnapshotSlot<S> {
    pub(crate) fn new(caching: bool) -> Self {
        Self {
            inner:       RwLock::new(SlotInner {
                caching,
                epoch: 0,
                state: SlotState::Absent,
            }),
            scope_depth: AtomicUsize::new(0),
        }
    }

    pub(crate) fn is_caching_enabled(&self) -> bool {
        self.inner.read().caching
    }

    /// Returns the previous mode.
    pub(crate) fn set_caching(&self, enabled: bool) -> bool {
        let mut inner = self.inner.write();
        let previous = inner.caching;
        if previous != enabled {
            inner.epoch += 1;
            inner.caching = enabled;
            // A snapshot kept while caching was off must not be served after turning it back on.
            if enabled {
                inner.state = SlotState::Absent;
            }
        }
        previous
    }

    /// Returns true if a snapshot has been discarded.
    pub(crate) fn invalidate(&self) -> bool {
        let mut inner = self.inner.write();
        inner.epoch += 1;
        matches!(
            std::mem::replace(&mut inner.state, SlotState::Absent),
            SlotState::Loaded { .. }
        )
    }

    /// The snapshot which would be served by the next read, if any.
    pub(crate) fn cached(&self) -> Option<Arc<S>> {
        let inner = self.inner.read();
        match inner.state {
            SlotState::Loaded { ref snapshot } if inner.caching => Some(Arc::clone(snapshot)),
            _ => None,
        }
    }

    pub(crate) fn scope_depth(&self) -> &AtomicUsize {
        &self.scope_depth
    }

    fn lookup(&self) -> Lookup<S> {
        if let Some(snapshot) = self.cached() {
            return Lookup::Hit(snapshot);
        }

        let mut inner = self.inner.write();
        if !inner.caching {
            return Lookup::Miss(None);
        }

        // Somebody could have stored a snapshot while we were waiting for the write lock.
        if let SlotState::Loaded { ref snapshot } = inner.state {
            return Lookup::Hit(Arc::clone(snapshot));
        }

        let epoch = inner.epoch;
        inner.state = SlotState::Loading { epoch };
        Lookup::Miss(Some(epoch))
    }

    fn store(&self, epoch: u64, snapshot: Arc<S>) -> bool {
        let mut inner = self.inner.write();
        if inner.caching && inner.epoch == epoch {
            inner.state = SlotState::Loaded { snapshot };
            true
        }
        else {
            false
        }
    }

    fn abandon(&self, epoch: u64) {
        let mut inner = self.inner.write();
        if matches!(inner.state, SlotState::Loading { epoch: e } if e == epoch) {
            inner.state = SlotState::Absent;
        }
    }

    /// Serve the held snapshot or call `fetch` exactly once. Returns the snapshot and whether it was fetched.
    pub(crate) async fn current<F, Fut, E>(&self, fetch: F) -> Result<(Arc<S>, bool), E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<S, E>>,
    {
        let epoch = match self.lookup() {
            Lookup::Hit(snapshot) => return Ok((snapshot, false)),
            Lookup::Miss(epoch) => epoch,
        };

        match fetch().await {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                if let Some(epoch) = epoch {
                    self.store(epoch, Arc::clone(&snapshot));
                }
                Ok((snapshot, true))
            }
            Err(err) => {
                if let Some(epoch) = epoch {
                    self.abandon(epoch);
                }
                Err(err)
            }
        }
    }

    /// Always calls `fetch`. On success the result replaces the held snapshot when caching is on; on failure the held
    /// snapshot stays as it was.
    pub(crate) async fn refresh<F, Fut, E>(&self, fetch: F) -> Result<Arc<S>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<S, E>>,
    {
        let epoch = {
            let mut inner = self.inner.write();
            inner.epoch += 1;
            inner.caching.then_some(inner.epoch)
        };

        let snapshot = Arc::new(fetch().await?);
        if let Some(epoch) = epoch {
            self.store(epoch, Arc::clone(&snapshot));
        }
        Ok(snapshot)
    }
}

impl<S> Debug for SnapshotSlot<S>
where
    S: Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("SnapshotSlot")
            .field("caching", &inner.caching)
            .field("epoch", &inner.epoch)
            .field("state", &inner.state)
            .finish()
    }
}
