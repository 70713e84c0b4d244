//! Tab set surface

use async_trait::async_trait;
use std::sync::Arc;

use super::{release, same_instances, screens, LiveCell, Surface, SurfaceUpdate};
use crate::component::{ComponentKind, Content};
use crate::error::CommitError;
use crate::host::{Presenter, ScreenHandle};
use crate::reconcile::Span;

/// Exclusive container surface
///
/// Every declared child stays materialized; a commit only marks the target
/// as the selected tab.
pub struct TabSurface {
    container: ScreenHandle,
    presenter: Arc<dyn Presenter>,
    live: LiveCell,
}

impl TabSurface {
    /// Create an empty tab surface
    pub fn new(container: ScreenHandle, presenter: Arc<dyn Presenter>) -> Self {
        Self {
            container,
            presenter,
            live: LiveCell::default(),
        }
    }

    /// Currently selected tab
    pub fn selected(&self) -> Option<Content> {
        let (list, active) = self.live.snapshot();
        active.and_then(|i| list.get(i).cloned())
    }
}

#[async_trait]
impl Surface for TabSurface {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Exclusive
    }

    fn span(&self) -> Span {
        Span::Full
    }

    fn live_list(&self) -> Vec<Content> {
        self.live.list()
    }

    fn active_index(&self) -> Option<usize> {
        self.live.active()
    }

    fn install(&self, list: Vec<Content>, active: Option<usize>) {
        let active = active.filter(|&i| i < list.len());
        self.live.set(list, active);
    }

    async fn commit(&self, update: SurfaceUpdate) -> Result<(), CommitError> {
        update.check_target()?;
        let (current, active) = self.live.snapshot();

        if !same_instances(&current, &update.list) {
            tracing::debug!(
                container = %self.container.id(),
                tabs = update.list.len(),
                "tab set changed"
            );
            self.presenter
                .set_tabs(&self.container, &screens(&update.list))
                .await?;
            // The tab list is live from here on even if selection fails.
            self.live.set(update.list.clone(), active.filter(|&i| i < update.list.len()));
        }

        if active != Some(update.target) {
            self.presenter
                .select_tab(&self.container, update.target, update.animated)
                .await?;
        }

        self.live.set(update.list.clone(), Some(update.target));
        release(&*self.presenter, &self.container, &current, &update.dropped, &update.list).await
    }
}
