//! Save lifecycle: `Idle → Validating → Saving → Recalculating → Refreshing → Idle`.
//!
//! `Error` is reachable from every in-flight phase. Only one save may be in
//! flight per handle.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SavePhase {
    #[default]
    Idle,
    Validating,
    Saving,
    Recalculating,
    Refreshing,
    Error(String),
}

impl SavePhase {
    pub fn name(&self) -> &'static str {
        match self {
            SavePhase::Idle => "idle",
            SavePhase::Validating => "validating",
            SavePhase::Saving => "saving",
            SavePhase::Recalculating => "recalculating",
            SavePhase::Refreshing => "refreshing",
            SavePhase::Error(_) => "error",
        }
    }

    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            SavePhase::Validating
                | SavePhase::Saving
                | SavePhase::Recalculating
                | SavePhase::Refreshing
        )
    }

    pub fn can_advance_to(&self, next: &SavePhase) -> bool {
        use SavePhase::*;

        match (self, next) {
            (current, Error(_)) => current.is_busy(),
            (Idle | Error(_), Validating) => true,
            (Error(_), Idle) => true,
            (Validating, Idle | Saving) => true,
            (Saving, Recalculating | Refreshing) => true,
            (Recalculating, Refreshing) => true,
            (Refreshing, Idle) => true,
            _ => false,
        }
    }
}

impl fmt::Display for SavePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SavePhase::Error(message) => write!(f, "error: {}", message),
            other => write!(f, "{}", other.name()),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PhaseError {
    #[error("a save is already in progress ({0})")]
    Busy(&'static str),
    #[error("cannot move from {from} to {to}")]
    InvalidTransition {
        from: &'static str,
        to: &'static str,
    },
}

/// Shared view of the save phase. Clones observe the same state.
#[derive(Debug, Clone, Default)]
pub struct PhaseHandle {
    inner: Arc<Mutex<SavePhase>>,
}

impl PhaseHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> SavePhase {
        self.inner.lock().clone()
    }

    pub fn is_busy(&self) -> bool {
        self.inner.lock().is_busy()
    }

    /// Enter `Validating`, or refuse when a save is already in flight.
    pub fn begin(&self) -> Result<SaveGuard, PhaseError> {
        let mut phase = self.inner.lock();
        if phase.is_busy() {
            return Err(PhaseError::Busy(phase.name()));
        }
        tracing::debug!(from = phase.name(), "save phase -> validating");
        *phase = SavePhase::Validating;
        Ok(SaveGuard {
            handle: self.clone(),
        })
    }

    fn transition(&self, next: SavePhase) -> Result<(), PhaseError> {
        let mut phase = self.inner.lock();
        if !phase.can_advance_to(&next) {
            return Err(PhaseError::InvalidTransition {
                from: phase.name(),
                to: next.name(),
            });
        }
        tracing::debug!(from = phase.name(), to = next.name(), "save phase transition");
        *phase = next;
        Ok(())
    }
}

/// Ownership of an in-flight save. Dropping it mid-flight returns the
/// handle to `Idle`.
#[derive(Debug)]
pub struct SaveGuard {
    handle: PhaseHandle,
}

impl SaveGuard {
    pub fn advance(&self, next: SavePhase) -> Result<(), PhaseError> {
        self.handle.transition(next)
    }

    pub fn finish(self) -> Result<(), PhaseError> {
        self.handle.transition(SavePhase::Idle)
    }

    pub fn fail(self, message: impl Into<String>) -> Result<(), PhaseError> {
        self.handle.transition(SavePhase::Error(message.into()))
    }
}

impl Drop for SaveGuard {
    fn drop(&mut self) {
        let mut phase = self.handle.inner.lock();
        if phase.is_busy() {
            tracing::warn!(phase = phase.name(), "save abandoned before completion");
            *phase = SavePhase::Idle;
        }
    }
}

/// Counts fetches in flight. Each `LoadingGuard` lowers the count when
/// dropped, including when its future is cancelled mid-await.
#[derive(Debug, Clone, Default)]
pub struct LoadingHandle {
    depth: Arc<AtomicUsize>,
}

impl LoadingHandle {
    pub fn enter(&self) -> LoadingGuard {
        self.depth.fetch_add(1, Ordering::SeqCst);
        LoadingGuard {
            handle: self.clone(),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.depth.load(Ordering::SeqCst) > 0
    }
}

#[derive(Debug)]
pub struct LoadingGuard {
    handle: LoadingHandle,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.handle.depth.fetch_sub(1, Ordering::SeqCst);
    }
}
