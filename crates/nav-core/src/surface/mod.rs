//! Surface adapters
//!
//! A surface owns the live instance list of one container and commits new
//! lists to the platform through a [`Presenter`]. Each container kind has its
//! own commit policy:
//!
//! - [`StackSurface`] keeps the declared prefix up to the target and truncates
//!   everything above it.
//! - [`TabSurface`] keeps every declared child materialized and only moves the
//!   selection.
//! - [`OverlaySurface`] keeps the prefix up to the target as a front-to-back
//!   stack and unwinds one layer at a time.
//!
//! After a successful commit every instance that left the container, whether
//! truncated, dismissed or dropped by reconciliation, is handed to
//! [`Presenter::release`] once.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

use crate::component::{ComponentKind, Content};
use crate::error::CommitError;
use crate::host::{Presenter, ScreenHandle};
use crate::reconcile::Span;

mod overlay;
mod stack;
mod tabs;

pub use overlay::OverlaySurface;
pub use stack::StackSurface;
pub use tabs::TabSurface;

/// New live list handed to a surface
#[derive(Debug, Clone)]
pub struct SurfaceUpdate {
    /// Reconciled list, in declared order
    pub list: Vec<Content>,
    /// Index of the child to make active
    pub target: usize,
    /// Whether the platform transition should animate
    pub animated: bool,
    /// Live instances reconciliation no longer references
    pub dropped: Vec<Content>,
}

impl SurfaceUpdate {
    fn check_target(&self) -> Result<(), CommitError> {
        if self.target < self.list.len() {
            Ok(())
        } else {
            Err(CommitError::InvalidTarget {
                target: self.target,
                len: self.list.len(),
            })
        }
    }
}

/// Live-list owner for one container instance
#[async_trait]
pub trait Surface: Send + Sync {
    /// Container kind this surface serves
    fn kind(&self) -> ComponentKind;

    /// Part of the declared child list this surface keeps materialized
    fn span(&self) -> Span;

    /// Current live list
    fn live_list(&self) -> Vec<Content>;

    /// Index of the active child in the live list
    fn active_index(&self) -> Option<usize>;

    /// Set the initial live list without touching the platform
    fn install(&self, list: Vec<Content>, active: Option<usize>);

    /// Commit a new live list, resolving once the platform has caught up
    async fn commit(&self, update: SurfaceUpdate) -> Result<(), CommitError>;

    /// Update that moves the active child one position back
    fn back_update(&self, animated: bool) -> Option<SurfaceUpdate> {
        let active = self.active_index()?;
        if active == 0 {
            return None;
        }
        Some(SurfaceUpdate {
            list: self.live_list(),
            target: active - 1,
            animated,
            dropped: Vec::new(),
        })
    }
}

/// Build the surface for a container kind
///
/// Leaves have no surface.
pub fn for_kind(
    kind: ComponentKind,
    container: ScreenHandle,
    presenter: Arc<dyn Presenter>,
) -> Option<Arc<dyn Surface>> {
    match kind {
        ComponentKind::Leaf => None,
        ComponentKind::Sequential => Some(Arc::new(StackSurface::new(container, presenter))),
        ComponentKind::Exclusive => Some(Arc::new(TabSurface::new(container, presenter))),
        ComponentKind::Overlay => Some(Arc::new(OverlaySurface::new(container, presenter))),
    }
}

/// A reconciled update waiting to be committed to its surface
#[derive(Clone)]
pub struct PendingCommit {
    surface: Arc<dyn Surface>,
    update: SurfaceUpdate,
}

impl PendingCommit {
    /// Pair an update with the surface it targets
    pub fn new(surface: Arc<dyn Surface>, update: SurfaceUpdate) -> Self {
        Self { surface, update }
    }

    /// Pending commit that moves `surface` one position back
    pub fn back(surface: Arc<dyn Surface>, animated: bool) -> Option<Self> {
        let update = surface.back_update(animated)?;
        Some(Self::new(surface, update))
    }

    /// Target surface
    pub fn surface(&self) -> &Arc<dyn Surface> {
        &self.surface
    }

    /// Update to be committed
    pub fn update(&self) -> &SurfaceUpdate {
        &self.update
    }

    /// Commit the update
    pub async fn apply(self) -> Result<(), CommitError> {
        let kind = self.surface.kind();
        let target = self.update.target;
        let result = self.surface.commit(self.update).await;
        match &result {
            Ok(()) => tracing::debug!(?kind, target, "surface committed"),
            Err(e) => tracing::warn!(?kind, target, error = %e, "surface commit failed"),
        }
        result
    }
}

impl fmt::Debug for PendingCommit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingCommit")
            .field("kind", &self.surface.kind())
            .field("update", &self.update)
            .finish()
    }
}

/// Live list and active index shared by every surface kind
#[derive(Debug, Default)]
struct LiveState {
    list: Vec<Content>,
    active: Option<usize>,
}

/// Lock-guarded live state
#[derive(Debug, Default)]
struct LiveCell(RwLock<LiveState>);

impl LiveCell {
    fn snapshot(&self) -> (Vec<Content>, Option<usize>) {
        let state = self.0.read();
        (state.list.clone(), state.active)
    }

    fn list(&self) -> Vec<Content> {
        self.0.read().list.clone()
    }

    fn active(&self) -> Option<usize> {
        self.0.read().active
    }

    fn set(&self, list: Vec<Content>, active: Option<usize>) {
        let mut state = self.0.write();
        state.list = list;
        state.active = active;
    }
}

/// Check two lists hold the same instances in the same order
fn same_instances(a: &[Content], b: &[Content]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same_instance(y))
}

fn screens(list: &[Content]) -> Vec<ScreenHandle> {
    list.iter().map(|c| c.screen().clone()).collect()
}

/// Instances leaving a container after a commit
///
/// Everything that was live or reported dropped and is absent from `next`,
/// each instance once, in the order first seen.
fn released(previous: &[Content], dropped: &[Content], next: &[Content]) -> Vec<Content> {
    let mut out: Vec<Content> = Vec::new();
    for instance in previous.iter().chain(dropped) {
        let kept = next.iter().any(|c| c.same_instance(instance));
        let seen = out.iter().any(|c| c.same_instance(instance));
        if !kept && !seen {
            out.push(instance.clone());
        }
    }
    out
}

/// Hand instances that left a container back to the presenter
async fn release(
    presenter: &dyn Presenter,
    container: &ScreenHandle,
    previous: &[Content],
    dropped: &[Content],
    next: &[Content],
) -> Result<(), CommitError> {
    let gone = released(previous, dropped, next);
    if gone.is_empty() {
        return Ok(());
    }
    tracing::debug!(container = %container.id(), released = gone.len(), "releasing screens");
    presenter.release(container, &screens(&gone)).await
}
