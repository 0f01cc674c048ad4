//! # In-Flight Operation Registry
//!
//! [`OperationRegistry`] collapses concurrent requests for the same mutating
//! operation into a single unit of work. The first caller for a key starts
//! the operation; everyone who submits the same key while it is running gets
//! a clone of the same [`Shared`] future and therefore the same outcome,
//! success or failure.
//!
//! The entry for a key is removed inside the shared future itself, after the
//! underlying operation finishes and before its output is published to any
//! waiter. A caller arriving at or after settlement therefore either joins
//! the running operation or starts a fresh one; it never sees a stale entry.
//!
//! Because any clone of a `Shared` future can drive it, a caller that stops
//! waiting does not strand the others.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use futures::future::{BoxFuture, FutureExt, Shared};
use log::debug;

use crate::error::{Error, Result};

/// The kind of a registered operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    IsInstalled,
    Install,
    Update,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            OperationKind::IsInstalled => "is-installed",
            OperationKind::Install => "install",
            OperationKind::Update => "update",
        };
        f.write_str(tag)
    }
}

/// Identifies one operation on one mirror, e.g. `install:/cache/github/o/r`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OperationKey {
    pub kind: OperationKind,
    pub path: PathBuf,
}

impl OperationKey {
    pub fn new(kind: OperationKind, path: &Path) -> Self {
        Self {
            kind,
            path: path.to_path_buf(),
        }
    }
}

impl fmt::Display for OperationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.path.display())
    }
}

/// A registered operation, awaitable by any number of callers.
pub type SharedOperation<T> = Shared<BoxFuture<'static, Result<T>>>;

type InFlight<T> = Arc<Mutex<HashMap<OperationKey, SharedOperation<T>>>>;

/// Map from operation key to the operation currently running for it.
pub struct OperationRegistry<T> {
    in_flight: InFlight<T>,
}

impl<T> OperationRegistry<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Join the operation running for `key`, or start one with `factory`.
    ///
    /// `factory` is invoked at most once per registered operation and only
    /// while no operation for `key` is running. It is called with the
    /// registry locked and must not submit to this registry itself.
    pub fn submit<F, Fut>(&self, key: OperationKey, factory: F) -> Result<SharedOperation<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let mut in_flight = lock(&self.in_flight)?;
        if let Some(running) = in_flight.get(&key) {
            debug!("joining in-flight operation {}", key);
            return Ok(running.clone());
        }

        debug!("starting operation {}", key);
        let operation = factory();
        let registry = Arc::clone(&self.in_flight);
        let settled = key.clone();
        let shared = async move {
            let outcome = operation.await;
            // unregister before the outcome becomes visible to waiters
            let mut in_flight = match registry.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            in_flight.remove(&settled);
            outcome
        }
        .boxed()
        .shared();

        in_flight.insert(key, shared.clone());
        Ok(shared)
    }

    /// Whether an operation for `key` is currently registered.
    pub fn is_in_flight(&self, key: &OperationKey) -> Result<bool> {
        Ok(lock(&self.in_flight)?.contains_key(key))
    }

    /// Number of registered operations.
    pub fn len(&self) -> Result<usize> {
        Ok(lock(&self.in_flight)?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(lock(&self.in_flight)?.is_empty())
    }
}

impl<T> Default for OperationRegistry<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for OperationRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let in_flight = self.in_flight.lock().map(|m| m.len()).unwrap_or_default();
        f.debug_struct("OperationRegistry")
            .field("in_flight", &in_flight)
            .finish()
    }
}

fn lock<T>(in_flight: &InFlight<T>) -> Result<MutexGuard<'_, HashMap<OperationKey, SharedOperation<T>>>> {
    in_flight.lock().map_err(|_| Error::LockPoisoned {
        context: "operation registry".to_string(),
    })
}
