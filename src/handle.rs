use crate::error::CacheError;
use crate::error::Result;
use crate::traits::ObjectLoader;
use parking_lot::RwLock;
use std::fmt::Debug;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadState {
    /// Only the key is known.
    Unloaded,
    /// Built from a fragment; some fields may be missing.
    PartiallyLoaded,
    /// All fields come from a full load.
    FullyLoaded,
}

#[derive(Debug)]
enum HandleData<D> {
    Unloaded,
    Partial(D),
    Full(D),
}

#[derive(Debug)]
struct HandleInner<D> {
    data:  HandleData<D>,
    // Bumped by every load. Only the most recently started load may store its result.
    epoch: u64,
}

/// A single remote object which defers its full load until a field is needed that the data at hand doesn't have.
///
/// Fields are picked from the object's data by closures returning `Option`: `None` means "not available here" and, if
/// the object isn't fully loaded yet, causes a full load. Once fully loaded the handle stays so; only
/// [`refresh()`](Self::refresh) loads again.
pub struct RefreshableHandle<L>
where
    L: ObjectLoader,
{
    loader: Arc<L>,
    key:    L::Key,
    inner:  RwLock<HandleInner<L::Data>>,
}

impl<L> RefreshableHandle<L>
where
    L: ObjectLoader,
{
    pub fn new(loader: Arc<L>, key: L::Key) -> Self {
        Self::with_data(loader, key, HandleData::Unloaded)
    }

    /// Create a handle from the partial data that usually comes along with a list of objects.
    pub fn from_fragment(loader: Arc<L>, key: L::Key, fragment: L::Data) -> Self {
        Self::with_data(loader, key, HandleData::Partial(fragment))
    }

    fn with_data(loader: Arc<L>, key: L::Key, data: HandleData<L::Data>) -> Self {
        Self {
            loader,
            key,
            inner: RwLock::new(HandleInner { data, epoch: 0 }),
        }
    }

    pub fn key(&self) -> &L::Key {
        &self.key
    }

    pub fn loader(&self) -> Arc<L> {
        Arc::clone(&self.loader)
    }

    pub fn load_state(&self) -> LoadState {
        match self.inner.read().data {
            HandleData::Unloaded => LoadState::Unloaded,
            HandleData::Partial(_) => LoadState::PartiallyLoaded,
            HandleData::Full(_) => LoadState::FullyLoaded,
        }
    }

    /// The data currently held, without any I/O.
    pub fn peek(&self) -> Option<L::Data> {
        match self.inner.read().data {
            HandleData::Unloaded => None,
            HandleData::Partial(ref data) | HandleData::Full(ref data) => Some(data.clone()),
        }
    }

    async fn load(&self) -> Result<L::Data, L::Error> {
        let epoch = {
            let mut inner = self.inner.write();
            inner.epoch += 1;
            inner.epoch
        };

        debug!("[{}] loading object", self.key);
        let data = self.loader.load(&self.key).await.map_err(CacheError::Producer)?;

        let mut inner = self.inner.write();
        if inner.epoch == epoch {
            inner.data = HandleData::Full(data.clone());
        }
        else {
            debug!("[{}] a newer load is in progress, result not stored", self.key);
        }
        Ok(data)
    }

    /// Full data of the object; loads it unless already fully loaded.
    pub async fn data(&self) -> Result<L::Data, L::Error> {
        {
            let inner = self.inner.read();
            if let HandleData::Full(ref data) = inner.data {
                return Ok(data.clone());
            }
        }
        self.load().await
    }

    /// Pick a field from the object's data. A field missing from partial data causes a full load; a field missing
    /// after a full load is `None`.
    pub async fn field<T, F>(&self, pick: F) -> Result<Option<T>, L::Error>
    where
        F: Fn(&L::Data) -> Option<T>,
    {
        {
            let inner = self.inner.read();
            match inner.data {
                HandleData::Full(ref data) => return Ok(pick(data)),
                HandleData::Partial(ref data) => {
                    if let Some(value) = pick(data) {
                        return Ok(Some(value));
                    }
                }
                HandleData::Unloaded => (),
            }
        }

        let data = self.load().await?;
        Ok(pick(&data))
    }

    /// Load the object again, whatever state it is in.
    pub async fn refresh(&self) -> Result<L::Data, L::Error> {
        self.load().await
    }
}

impl<L> Debug for RefreshableHandle<L>
where
    L: ObjectLoader,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("RefreshableHandle")
            .field("key", &self.key)
            .field("data", &inner.data)
            .finish()
    }
}
