//! Interactive transitions
//!
//! Tracks a gesture-driven transition between `begin` and `finish`/`cancel`.
//! The live list is never touched while the gesture runs: `finish` commits
//! the pending update through the ordinary surface commit, and `cancel`
//! leaves (or puts back) the pre-gesture list.
//!
//! When a navigator owns the tree, end the gesture with
//! [`InteractiveTransition::complete`] and hand the resulting
//! [`FinishedGesture`] to the navigator so the commit is queued behind other
//! requests.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::component::Content;
use crate::error::{CommitError, TransitionError};
use crate::surface::PendingCommit;

/// Direction of an interactive transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionDirection {
    /// Showing a new destination
    Show,
    /// Hiding the current destination
    Hide,
}

/// Observable phase of a transition
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransitionPhase {
    /// No gesture in progress
    Idle,
    /// Gesture in progress
    Interacting {
        /// Direction requested at `begin`
        direction: TransitionDirection,
        /// Progress in `0.0..=1.0`
        progress: f32,
    },
}

struct Gesture {
    direction: TransitionDirection,
    pending: PendingCommit,
    snapshot: Vec<Content>,
    snapshot_active: Option<usize>,
}

/// A completed gesture whose commit has not been applied yet
#[derive(Debug, Clone)]
pub struct FinishedGesture {
    direction: TransitionDirection,
    pending: PendingCommit,
    snapshot: Vec<Content>,
    snapshot_active: Option<usize>,
}

impl FinishedGesture {
    /// Direction requested at `begin`
    pub fn direction(&self) -> TransitionDirection {
        self.direction
    }

    /// Commit the gesture will apply
    pub fn pending(&self) -> &PendingCommit {
        &self.pending
    }

    /// Check the surface still shows what it showed when the gesture began
    pub fn is_current(&self) -> bool {
        let surface = self.pending.surface();
        let live = surface.live_list();
        live.len() == self.snapshot.len()
            && live.iter().zip(&self.snapshot).all(|(a, b)| a.same_instance(b))
            && surface.active_index() == self.snapshot_active
    }

    /// Apply the pending commit
    ///
    /// Fails with [`CommitError::Interrupted`] without touching the surface
    /// when another commit changed it since the gesture began.
    pub async fn apply(self) -> Result<(), CommitError> {
        if !self.is_current() {
            tracing::warn!(direction = ?self.direction, "surface changed under gesture");
            return Err(CommitError::Interrupted);
        }
        self.pending.apply().await
    }
}

/// Gesture-driven transition state machine
///
/// # Example
///
/// ```no_run
/// use nav_core::{InteractiveTransition, PendingCommit, TransitionDirection};
/// # async fn example(pending: PendingCommit) -> Result<(), nav_core::TransitionError> {
/// let transition = InteractiveTransition::new();
/// transition.begin(TransitionDirection::Hide, pending)?;
/// transition.update(0.4)?;
/// transition.update(0.9)?;
/// transition.finish().await?;
/// # Ok(())
/// # }
/// ```
pub struct InteractiveTransition {
    gesture: Mutex<Option<Gesture>>,
    phase_tx: watch::Sender<TransitionPhase>,
}

impl InteractiveTransition {
    /// Create an idle transition
    pub fn new() -> Self {
        let (phase_tx, _) = watch::channel(TransitionPhase::Idle);
        Self {
            gesture: Mutex::new(None),
            phase_tx,
        }
    }

    /// Current phase
    pub fn phase(&self) -> TransitionPhase {
        *self.phase_tx.borrow()
    }

    /// Subscribe to phase and progress changes
    pub fn subscribe(&self) -> watch::Receiver<TransitionPhase> {
        self.phase_tx.subscribe()
    }

    /// Start a gesture towards `pending`
    pub fn begin(&self, direction: TransitionDirection, pending: PendingCommit) -> Result<(), TransitionError> {
        let mut gesture = self.gesture.lock();
        if gesture.is_some() {
            return Err(TransitionError::NotIdle);
        }

        let surface = pending.surface();
        *gesture = Some(Gesture {
            direction,
            snapshot: surface.live_list(),
            snapshot_active: surface.active_index(),
            pending,
        });
        self.phase_tx.send_replace(TransitionPhase::Interacting {
            direction,
            progress: 0.0,
        });
        tracing::debug!(?direction, "interactive transition started");
        Ok(())
    }

    /// Report gesture progress, clamped to `0.0..=1.0`
    pub fn update(&self, progress: f32) -> Result<(), TransitionError> {
        let gesture = self.gesture.lock();
        let direction = gesture.as_ref().ok_or(TransitionError::NotActive)?.direction;
        let progress = if progress.is_nan() { 0.0 } else { progress.clamp(0.0, 1.0) };
        self.phase_tx
            .send_replace(TransitionPhase::Interacting { direction, progress });
        Ok(())
    }

    /// Abandon the gesture, keeping the pre-gesture live list
    ///
    /// Returns the restored list.
    pub fn cancel(&self) -> Result<Vec<Content>, TransitionError> {
        let gesture = self.gesture.lock().take().ok_or(TransitionError::NotActive)?;
        self.phase_tx.send_replace(TransitionPhase::Idle);

        let surface = gesture.pending.surface();
        let live = surface.live_list();
        let untouched = live.len() == gesture.snapshot.len()
            && live.iter().zip(&gesture.snapshot).all(|(a, b)| a.same_instance(b));
        if !untouched || surface.active_index() != gesture.snapshot_active {
            tracing::debug!("restoring pre-gesture live list");
            surface.install(gesture.snapshot.clone(), gesture.snapshot_active);
        }

        tracing::debug!(direction = ?gesture.direction, "interactive transition cancelled");
        Ok(gesture.snapshot)
    }

    /// End the gesture without committing
    ///
    /// The returned [`FinishedGesture`] carries the pending update; apply it
    /// directly or queue it on a navigator.
    pub fn complete(&self) -> Result<FinishedGesture, TransitionError> {
        let gesture = self.gesture.lock().take().ok_or(TransitionError::NotActive)?;
        self.phase_tx.send_replace(TransitionPhase::Idle);
        tracing::debug!(direction = ?gesture.direction, "interactive transition finished");
        Ok(FinishedGesture {
            direction: gesture.direction,
            pending: gesture.pending,
            snapshot: gesture.snapshot,
            snapshot_active: gesture.snapshot_active,
        })
    }

    /// Complete the gesture by committing the pending update
    pub async fn finish(&self) -> Result<(), TransitionError> {
        self.complete()?.apply().await?;
        Ok(())
    }
}

impl Default for InteractiveTransition {
    fn default() -> Self {
        Self::new()
    }
}
