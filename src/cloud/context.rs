//! Caller-supplied context for the native client builders.
//!
//! The builders are the only place in the core that touches the process
//! environment. [`ClientContext`] lets callers cancel them, give them a
//! deadline, and substitute the environment lookup.

use std::{
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

use super::error::{ConfigError, Result};


type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;


#[derive(Clone)]
pub struct ClientContext {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
    env_lookup: EnvLookup,
}

/// Cancels every [`ClientContext`] it was obtained from, including clones.
#[derive(Clone, Debug)]
pub struct CancellationHandle {
    cancelled: Arc<AtomicBool>,
}

impl CancellationHandle {
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }
}


impl ClientContext {
    /// A context with no deadline that reads the real process environment.
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            deadline: None,
            env_lookup: Arc::new(|name: &str| std::env::var(name).ok()),
        }
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Replaces the environment lookup, e.g. with a fixed map in tests.
    pub fn with_env_lookup<F>(mut self, env_lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.env_lookup = Arc::new(env_lookup);
        self
    }

    pub fn cancellation_handle(&self) -> CancellationHandle {
        CancellationHandle {
            cancelled: self.cancelled.clone(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        if self.cancelled.load(Ordering::SeqCst) {
            return true;
        }

        self.deadline
            .is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// Fails with [`ConfigError::Cancelled`] once cancelled or past the deadline.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(ConfigError::Cancelled);
        }

        Ok(())
    }

    /// Reads an environment variable; empty values count as unset.
    pub fn env_var(&self, name: &str) -> Option<String> {
        (self.env_lookup)(name).filter(|value| !value.is_empty())
    }
}

impl Default for ClientContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ClientContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientContext")
            .field("cancelled", &self.cancelled.load(Ordering::SeqCst))
            .field("deadline", &self.deadline)
            .finish_non_exhaustive()
    }
}
