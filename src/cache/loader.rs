//! Loaders and Sinks
//!
//! A loader recomputes values on a cache miss and deposits them into the
//! group through a write-only `Sink`.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::cache::store::GroupStore;
use crate::cache::CacheValue;

// == Loader ==
/// Caller-supplied logic invoked on every miss.
///
/// A loader may call `sink.set` any number of times (for the requested key
/// or others) before returning. Returning an error caches nothing and is
/// reported to the caller as `CacheError::LoaderFailed`.
#[async_trait]
pub trait Loader: Send + Sync + 'static {
    async fn load(&self, key: String, sink: Sink) -> anyhow::Result<()>;
}

#[async_trait]
impl<L: Loader + ?Sized> Loader for Arc<L> {
    async fn load(&self, key: String, sink: Sink) -> anyhow::Result<()> {
        (**self).load(key, sink).await
    }
}

// == Loader Fn ==
/// Adapts an async closure into a `Loader`.
pub struct LoaderFn<F>(F);

/// Wraps `f` so it can be registered as a group loader.
///
/// ```ignore
/// let loader = loader_fn(|key: String, sink: Sink| async move {
///     sink.set(key.clone(), format!("value for {key}"));
///     Ok(())
/// });
/// ```
pub fn loader_fn<F, Fut>(f: F) -> LoaderFn<F>
where
    F: Fn(String, Sink) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    LoaderFn(f)
}

#[async_trait]
impl<F, Fut> Loader for LoaderFn<F>
where
    F: Fn(String, Sink) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    async fn load(&self, key: String, sink: Sink) -> anyhow::Result<()> {
        (self.0)(key, sink).await
    }
}

// == Sink ==
/// Write-only handle onto a group's entries.
#[derive(Clone)]
pub struct Sink {
    store: Arc<GroupStore>,
}

impl Sink {
    pub(crate) fn new(store: Arc<GroupStore>) -> Self {
        Self { store }
    }

    /// Inserts or overwrites `key`, expiring one group TTL from now.
    pub fn set(&self, key: impl Into<String>, value: impl Into<CacheValue>) {
        self.store.set(key.into(), value.into());
    }
}

impl fmt::Debug for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sink").field("ttl", &self.store.ttl()).finish()
    }
}
