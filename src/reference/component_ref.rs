use futures_util::future::{BoxFuture, FutureExt, Shared};
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::infrastructure::sync::lock;

/// Retry and timeout budget for a [`ComponentReference`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceConfig {
    /// Wait between two resolver attempts. Default: 100ms
    pub retry_interval: Duration,
    /// Maximum number of resolver attempts per resolution. Default: 20
    pub max_retries: u32,
    /// Upper bound for one resolution, whatever attempts remain. Default: 5000ms
    pub timeout: Duration,
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            retry_interval: Duration::from_millis(100),
            max_retries: 20,
            timeout: Duration::from_millis(5000),
        }
    }
}

type ResolverFn<T> = Arc<dyn Fn() -> Result<Option<T>, String> + Send + Sync>;
type Flight<T> = Shared<BoxFuture<'static, Option<T>>>;

struct RefInner<T> {
    name: String,
    resolver: ResolverFn<T>,
    config: ReferenceConfig,
    cached: Mutex<Option<T>>,
    in_flight: Mutex<Option<Flight<T>>>,
}

impl<T: Clone> RefInner<T> {
    /// Runs the resolver once. Errors and panics count as "not yet available".
    fn attempt(&self, attempt: u32) -> Option<T> {
        match std::panic::catch_unwind(AssertUnwindSafe(|| (self.resolver)())) {
            Ok(Ok(value)) => value,
            Ok(Err(error)) => {
                tracing::debug!(component = %self.name, attempt, error = %error, "resolver failed");
                None
            }
            Err(_) => {
                tracing::warn!(component = %self.name, attempt, "resolver panicked");
                None
            }
        }
    }
}

/// Lazily resolved, permanently cached handle to a component.
///
/// Lifecycle: unresolved → resolving → resolved (cached until
/// [`clear_cache`](Self::clear_cache)), or unresolved → resolving → failed
/// (`get` returned `None`; the next `get` starts over).
///
/// Concurrent `get` calls made while a resolution is running share that
/// resolution instead of starting their own retry loops. Clones share the cache
/// and the in-flight resolution.
pub struct ComponentReference<T> {
    inner: Arc<RefInner<T>>,
}

impl<T> Clone for ComponentReference<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> ComponentReference<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Creates a reference over an infallible resolver.
    ///
    /// `name` only appears in log output.
    pub fn new<F>(name: impl Into<String>, resolver: F, config: ReferenceConfig) -> Self
    where
        F: Fn() -> Option<T> + Send + Sync + 'static,
    {
        Self::from_resolver(name.into(), Arc::new(move || Ok::<_, String>(resolver())), config)
    }

    /// Creates a reference over a resolver that may fail.
    ///
    /// A failed attempt is logged and treated like an attempt that found
    /// nothing.
    pub fn fallible<F, E>(name: impl Into<String>, resolver: F, config: ReferenceConfig) -> Self
    where
        F: Fn() -> Result<Option<T>, E> + Send + Sync + 'static,
        E: fmt::Display,
    {
        Self::from_resolver(
            name.into(),
            Arc::new(move || resolver().map_err(|e| e.to_string())),
            config,
        )
    }

    fn from_resolver(name: String, resolver: ResolverFn<T>, config: ReferenceConfig) -> Self {
        Self {
            inner: Arc::new(RefInner {
                name,
                resolver,
                config,
                cached: Mutex::new(None),
                in_flight: Mutex::new(None),
            }),
        }
    }

    /// Resolves the component, retrying until it appears.
    ///
    /// Returns the cached value immediately when one exists. Otherwise joins
    /// the running resolution or starts a new one. Resolves to `None` when the
    /// retry budget or the timeout is exhausted; it never fails.
    pub async fn get(&self) -> Option<T> {
        if let Some(value) = self.get_cached() {
            return Some(value);
        }

        let flight = {
            let mut in_flight = lock(&self.inner.in_flight);
            if let Some(flight) = in_flight.as_ref() {
                tracing::trace!(component = %self.inner.name, "joining in-flight resolution");
                flight.clone()
            } else {
                let flight = resolve(Arc::clone(&self.inner)).boxed().shared();
                *in_flight = Some(flight.clone());
                flight
            }
        };

        flight.await
    }

    /// Returns the cached value without triggering resolution.
    #[must_use]
    pub fn get_cached(&self) -> Option<T> {
        lock(&self.inner.cached).clone()
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        lock(&self.inner.cached).is_some()
    }

    /// Drops the cached value so the next `get` resolves from scratch.
    pub fn clear_cache(&self) {
        *lock(&self.inner.cached) = None;
        tracing::debug!(component = %self.inner.name, "reference cache cleared");
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    #[must_use]
    pub fn config(&self) -> ReferenceConfig {
        self.inner.config
    }
}

/// The bounded retry loop behind one in-flight resolution.
async fn resolve<T>(inner: Arc<RefInner<T>>) -> Option<T>
where
    T: Clone + Send + Sync + 'static,
{
    let config = inner.config;
    let max_attempts = config.max_retries.max(1);
    let started = tokio::time::Instant::now();

    let attempts = async {
        for attempt in 1..=max_attempts {
            if let Some(value) = inner.attempt(attempt) {
                tracing::debug!(
                    component = %inner.name,
                    attempt,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "component resolved"
                );
                return Some(value);
            }
            if attempt < max_attempts {
                tokio::time::sleep(config.retry_interval).await;
            }
        }
        tracing::debug!(component = %inner.name, attempts = max_attempts, "retries exhausted");
        None
    };

    let outcome = tokio::time::timeout(config.timeout, attempts)
        .await
        .unwrap_or_else(|_| {
            tracing::debug!(
                component = %inner.name,
                timeout_ms = config.timeout.as_millis() as u64,
                "resolution timed out"
            );
            None
        });

    if let Some(value) = &outcome {
        *lock(&inner.cached) = Some(value.clone());
    }
    *lock(&inner.in_flight) = None;

    outcome
}

impl<T> fmt::Debug for ComponentReference<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentReference")
            .field("name", &self.inner.name)
            .field("config", &self.inner.config)
            .field("available", &lock(&self.inner.cached).is_some())
            .finish_non_exhaustive()
    }
}
