//! Request-scoped context.
//!
//! A `Context` is an immutable chain of nodes. Deriving a child (`with_value`,
//! `with_cancel`, `with_timeout`) allocates a new node pointing at its parent,
//! so any number of tasks can derive from the same parent concurrently.
//!
//! Responsibility:
//! - Carry typed dependency handles down a call chain (`Key<T>`).
//! - Carry a cancellation signal and an optional deadline.
//!
//! Lookups never fall back to a default: an absent key or a value stored with
//! a different type is a `ResourceNotAvailable` error.

use std::any::{Any, type_name};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use futures::future::select_all;
use thiserror::Error;
use tokio::sync::watch;
use tokio::time::Instant;

/// Typed key for values stored in a `Context`.
///
/// Two keys refer to the same slot when their names are equal, whatever
/// module defines them. Names must be unique across the crate: two keys with
/// the same name and type read and shadow each other's values. The type
/// parameter is checked at lookup time.
pub struct Key<T> {
    name: &'static str,
    _type: PhantomData<fn() -> T>,
}

impl<T> Key<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _type: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Key<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Key")
            .field("name", &self.name)
            .field("type", &type_name::<T>())
            .finish()
    }
}

/// A dependency could not be retrieved from a `Context`.
///
/// This is a wiring defect (the value was never bound, or was bound with a
/// different type), not a runtime condition of the backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceNotAvailable {
    #[error("no value bound for key `{key}`")]
    Missing { key: &'static str },
    #[error("value bound for key `{key}` is not a `{expected}`")]
    TypeMismatch {
        key: &'static str,
        expected: &'static str,
    },
}

/// Why a context is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ContextError {
    #[error("context canceled")]
    Canceled,
    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

struct Entry {
    name: &'static str,
    value: Arc<dyn Any + Send + Sync>,
}

/// One cancellation scope. `canceled` flips to `true` exactly once and the
/// flag is inherited by every scope derived below it.
struct CancelScope {
    canceled: watch::Receiver<bool>,
    parent: Option<Arc<CancelScope>>,
}

impl CancelScope {
    fn is_canceled(&self) -> bool {
        let mut scope = Some(self);
        while let Some(s) = scope {
            if *s.canceled.borrow() {
                return true;
            }
            scope = s.parent.as_deref();
        }
        false
    }

    fn receivers(&self) -> Vec<watch::Receiver<bool>> {
        let mut out = Vec::new();
        let mut scope = Some(self);
        while let Some(s) = scope {
            out.push(s.canceled.clone());
            scope = s.parent.as_deref();
        }
        out
    }
}

struct Node {
    parent: Option<Context>,
    entry: Option<Entry>,
    cancel: Option<Arc<CancelScope>>,
    deadline: Option<Instant>,
}

/// Immutable, cheaply clonable request context.
#[derive(Clone)]
pub struct Context {
    node: Arc<Node>,
}

impl Context {
    /// Root context: no values, never canceled, no deadline.
    pub fn background() -> Self {
        Self {
            node: Arc::new(Node {
                parent: None,
                entry: None,
                cancel: None,
                deadline: None,
            }),
        }
    }

    fn derive(
        &self,
        entry: Option<Entry>,
        cancel: Option<Arc<CancelScope>>,
        deadline: Option<Instant>,
    ) -> Self {
        Self {
            node: Arc::new(Node {
                parent: Some(self.clone()),
                entry,
                cancel,
                deadline,
            }),
        }
    }

    /// Returns a child context carrying `value` under `key`.
    pub fn with_value<T>(&self, key: &Key<T>, value: T) -> Self
    where
        T: Send + Sync + 'static,
    {
        let entry = Entry {
            name: key.name,
            value: Arc::new(value),
        };
        self.derive(Some(entry), self.node.cancel.clone(), self.node.deadline)
    }

    /// Looks up `key`, nearest binding first.
    pub fn value<T>(&self, key: &Key<T>) -> Result<T, ResourceNotAvailable>
    where
        T: Clone + Send + Sync + 'static,
    {
        let mut ctx = Some(self);
        while let Some(c) = ctx {
            if let Some(entry) = &c.node.entry
                && entry.name == key.name
            {
                return entry.value.downcast_ref::<T>().cloned().ok_or(
                    ResourceNotAvailable::TypeMismatch {
                        key: key.name,
                        expected: type_name::<T>(),
                    },
                );
            }
            ctx = c.node.parent.as_ref();
        }
        Err(ResourceNotAvailable::Missing { key: key.name })
    }

    /// Returns a child with its own cancellation scope.
    ///
    /// Canceling (or dropping) the handle cancels the child and everything
    /// derived from it. The parent is unaffected.
    pub fn with_cancel(&self) -> (Self, CancelHandle) {
        self.with_scope(self.node.deadline)
    }

    /// Like `with_cancel`, with a deadline `timeout` from now.
    ///
    /// A timeout too large to represent as an instant means no deadline.
    pub fn with_timeout(&self, timeout: Duration) -> (Self, CancelHandle) {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.with_deadline(deadline),
            None => self.with_cancel(),
        }
    }

    /// Like `with_cancel`, with a deadline. A parent deadline that is
    /// earlier still applies.
    pub fn with_deadline(&self, deadline: Instant) -> (Self, CancelHandle) {
        let deadline = match self.node.deadline {
            Some(parent) if parent < deadline => parent,
            _ => deadline,
        };
        self.with_scope(Some(deadline))
    }

    fn with_scope(&self, deadline: Option<Instant>) -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        let scope = Arc::new(CancelScope {
            canceled: rx,
            parent: self.node.cancel.clone(),
        });
        let ctx = self.derive(None, Some(scope), deadline);
        (ctx, CancelHandle { tx })
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.node.deadline
    }

    /// `None` while the context is live.
    pub fn err(&self) -> Option<ContextError> {
        if self
            .node
            .cancel
            .as_ref()
            .is_some_and(|scope| scope.is_canceled())
        {
            return Some(ContextError::Canceled);
        }
        match self.node.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(ContextError::DeadlineExceeded),
            _ => None,
        }
    }

    /// Resolves once the context is canceled or its deadline passes.
    pub async fn done(&self) -> ContextError {
        if let Some(err) = self.err() {
            return err;
        }

        let canceled = async {
            match &self.node.cancel {
                Some(scope) => {
                    let mut receivers = scope.receivers();
                    let waits = receivers
                        .iter_mut()
                        .map(|rx| Box::pin(async move { rx.wait_for(|c| *c).await.is_ok() }));
                    // The sender always publishes `true` before it is dropped,
                    // so either outcome means canceled.
                    let _ = select_all(waits).await;
                }
                None => std::future::pending::<()>().await,
            }
        };

        let expired = async {
            match self.node.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            _ = canceled => ContextError::Canceled,
            _ = expired => ContextError::DeadlineExceeded,
        }
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys = Vec::new();
        let mut ctx = Some(self);
        while let Some(c) = ctx {
            if let Some(entry) = &c.node.entry {
                keys.push(entry.name);
            }
            ctx = c.node.parent.as_ref();
        }
        f.debug_struct("Context")
            .field("keys", &keys)
            .field("deadline", &self.deadline())
            .field("err", &self.err())
            .finish()
    }
}

/// Cancels the scope created by `Context::with_cancel` and friends.
///
/// Dropping the handle cancels too, so a scope never outlives its owner.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

impl Drop for CancelHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}
