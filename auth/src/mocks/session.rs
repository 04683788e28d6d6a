//! Mock session store for testing.

use crate::error::{AuthError, Result};
use crate::providers::SessionStore;
use crate::state::Session;
use crate::stores::InMemorySessionStore;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Mock session store.
///
/// Wraps [`InMemorySessionStore`] with write counters and switchable
/// failures. A failed write leaves the held session untouched.
#[derive(Debug, Clone, Default)]
pub struct MockSessionStore {
    inner: InMemorySessionStore,
    fail_reads: bool,
    fail_writes: bool,
    fail_clears: bool,
    set_calls: Arc<AtomicUsize>,
    clear_calls: Arc<AtomicUsize>,
}

impl MockSessionStore {
    /// Create an empty mock store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock store holding `session`.
    #[must_use]
    pub fn with_session(session: Session) -> Self {
        Self {
            inner: InMemorySessionStore::with_session(session),
            ..Self::default()
        }
    }

    /// Make `get_session` fail.
    #[must_use]
    pub const fn failing_reads(mut self) -> Self {
        self.fail_reads = true;
        self
    }

    /// Make `set_session` fail.
    #[must_use]
    pub const fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    /// Make `clear_session` fail.
    #[must_use]
    pub const fn failing_clears(mut self) -> Self {
        self.fail_clears = true;
        self
    }

    /// Held session, bypassing injected failures.
    pub async fn snapshot(&self) -> Option<Session> {
        self.inner.snapshot().await
    }

    /// Number of `set_session` calls.
    #[must_use]
    pub fn set_calls(&self) -> usize {
        self.set_calls.load(Ordering::SeqCst)
    }

    /// Number of `clear_session` calls.
    #[must_use]
    pub fn clear_calls(&self) -> usize {
        self.clear_calls.load(Ordering::SeqCst)
    }
}

impl SessionStore for MockSessionStore {
    async fn get_session(&self) -> Result<Option<Session>> {
        if self.fail_reads {
            return Err(AuthError::Storage("read failed".to_string()));
        }
        self.inner.get_session().await
    }

    async fn set_session(&self, session: &Session) -> Result<()> {
        self.set_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes {
            return Err(AuthError::Storage("write failed".to_string()));
        }
        self.inner.set_session(session).await
    }

    async fn clear_session(&self) -> Result<()> {
        self.clear_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_clears {
            return Err(AuthError::Storage("clear failed".to_string()));
        }
        self.inner.clear_session().await
    }
}
