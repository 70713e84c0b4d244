//! Overlay (presentation) surface

use async_trait::async_trait;
use std::sync::Arc;

use super::{release, screens, LiveCell, Surface, SurfaceUpdate};
use crate::component::{ComponentKind, Content};
use crate::error::CommitError;
use crate::host::{Presenter, ScreenHandle};
use crate::reconcile::Span;

/// One platform step of an overlay commit
#[derive(Debug)]
enum OverlayOp {
    Dismiss(Content),
    SetBase(Content),
    Present(Content),
}

/// Overlay container surface
///
/// Layer 0 is the base; every layer above it is presented on top of the one
/// below. Platforms can only add or remove the front-most layer, so a commit
/// dismisses surplus layers top-down before presenting new ones bottom-up.
/// Only the final platform step animates.
pub struct OverlaySurface {
    container: ScreenHandle,
    presenter: Arc<dyn Presenter>,
    live: LiveCell,
}

impl OverlaySurface {
    /// Create an empty overlay surface
    pub fn new(container: ScreenHandle, presenter: Arc<dyn Presenter>) -> Self {
        Self {
            container,
            presenter,
            live: LiveCell::default(),
        }
    }

    /// Number of layers presented above the base
    pub fn presented_count(&self) -> usize {
        self.live.list().len().saturating_sub(1)
    }

    fn plan(current: &[Content], next: &[Content]) -> Vec<OverlayOp> {
        let common = current
            .iter()
            .zip(next)
            .take_while(|(a, b)| a.same_instance(b))
            .count();

        let mut ops: Vec<OverlayOp> = current[common..]
            .iter()
            .skip(usize::from(common == 0))
            .rev()
            .cloned()
            .map(OverlayOp::Dismiss)
            .collect();

        if common == 0 {
            if let Some(base) = next.first() {
                ops.push(OverlayOp::SetBase(base.clone()));
            }
        }

        ops.extend(next.iter().skip(common.max(1)).cloned().map(OverlayOp::Present));
        ops
    }
}

#[async_trait]
impl Surface for OverlaySurface {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Overlay
    }

    fn span(&self) -> Span {
        Span::UpToTarget
    }

    fn live_list(&self) -> Vec<Content> {
        self.live.list()
    }

    fn active_index(&self) -> Option<usize> {
        self.live.active()
    }

    fn install(&self, list: Vec<Content>, active: Option<usize>) {
        let active = active.filter(|&i| i < list.len());
        let list = match active {
            Some(top) => list.into_iter().take(top + 1).collect(),
            None => list,
        };
        self.live.set(list, active);
    }

    async fn commit(&self, update: SurfaceUpdate) -> Result<(), CommitError> {
        update.check_target()?;
        let next: Vec<Content> = update.list.into_iter().take(update.target + 1).collect();
        let previous = self.live.list();
        let mut layers = previous.clone();
        let ops = Self::plan(&layers, &next);
        let last = ops.len().saturating_sub(1);

        tracing::debug!(
            container = %self.container.id(),
            from = layers.len(),
            to = next.len(),
            steps = ops.len(),
            "overlay unwinding"
        );

        for (i, op) in ops.into_iter().enumerate() {
            let animated = update.animated && i == last;
            match op {
                OverlayOp::Dismiss(layer) => {
                    self.presenter
                        .dismiss(&self.container, layer.screen(), animated)
                        .await?;
                    layers.pop();
                }
                OverlayOp::SetBase(base) => {
                    self.presenter.set_base(&self.container, base.screen()).await?;
                    layers = vec![base];
                }
                OverlayOp::Present(layer) => {
                    self.presenter
                        .present(&self.container, layer.screen(), animated)
                        .await?;
                    layers.push(layer);
                }
            }
            // Keep the live list in step with the platform after every layer.
            let top = layers.len().checked_sub(1);
            self.live.set(layers.clone(), top);
        }

        debug_assert_eq!(screens(&layers), screens(&next));
        self.live.set(next.clone(), Some(update.target));
        // Dismissed layers and reconciliation drops leave together.
        release(&*self.presenter, &self.container, &previous, &update.dropped, &next).await
    }
}
