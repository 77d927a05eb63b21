use crate::traits::CachingControl;
use std::fmt::Debug;
use std::sync::atomic::Ordering;
use tracing::error;

/// Forces a container's caching mode for as long as the guard lives.
///
/// The mode in effect right before the scope is entered is restored when the guard is dropped, including while
/// unwinding. Scopes over the same container must be dropped in the reverse order of their creation; Rust's drop order
/// of locals takes care of that unless a guard is moved out or dropped explicitly. Releasing a scope out of order
/// panics, since the modes the remaining scopes would restore are no longer meaningful.
///
/// ```ignore
/// {
///     let _uncached = pages.caching_scope(false);
///     // Every read in here goes to the server.
///     let fresh = pages.count().await?;
/// }
/// // The previous mode is back.
/// ```
pub struct CachingScope<'a, C>
where
    C: CachingControl,
{
    container: &'a C,
    saved:     bool,
    depth:     usize,
}

impl<'a, C> CachingScope<'a, C>
where
    C: CachingControl,
{
    pub fn enter(container: &'a C, enabled: bool) -> Self {
        let saved = container.is_caching_enabled();
        let depth = container.scope_depth().fetch_add(1, Ordering::SeqCst) + 1;
        container.set_caching_enabled(enabled);
        Self {
            container,
            saved,
            depth,
        }
    }

    /// The mode that will be restored on exit.
    pub fn saved_mode(&self) -> bool {
        self.saved
    }

    /// Nesting level of this scope over its container, starting from 1.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Leave the scope now. Same as dropping the guard.
    pub fn exit(self) {}
}

impl<C> Drop for CachingScope<'_, C>
where
    C: CachingControl,
{
    fn drop(&mut self) {
        let current = self.container.scope_depth().fetch_sub(1, Ordering::SeqCst);
        self.container.set_caching_enabled(self.saved);
        if current != self.depth {
            error!(
                "caching scope at depth {} released while depth {} is open; scopes must be released in reverse order",
                self.depth, current
            );
            assert!(
                std::thread::panicking(),
                "caching scope released out of order (depth {} vs {current})",
                self.depth
            );
        }
    }
}

impl<C> Debug for CachingScope<'_, C>
where
    C: CachingControl,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachingScope")
            .field("saved", &self.saved)
            .field("depth", &self.depth)
            .finish()
    }
}
