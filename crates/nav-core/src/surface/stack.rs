//! Push-stack surface

use async_trait::async_trait;
use std::sync::Arc;

use super::{release, same_instances, screens, LiveCell, Surface, SurfaceUpdate};
use crate::component::{ComponentKind, Content};
use crate::error::CommitError;
use crate::host::{Presenter, ScreenHandle};
use crate::reconcile::Span;

/// Sequential container surface
///
/// The visible stack is the reconciled list up to and including the target;
/// anything above the target is truncated. The top of the stack is active.
pub struct StackSurface {
    container: ScreenHandle,
    presenter: Arc<dyn Presenter>,
    live: LiveCell,
}

impl StackSurface {
    /// Create an empty stack surface
    pub fn new(container: ScreenHandle, presenter: Arc<dyn Presenter>) -> Self {
        Self {
            container,
            presenter,
            live: LiveCell::default(),
        }
    }

    /// Depth of the stack
    pub fn depth(&self) -> usize {
        self.live.list().len()
    }

    /// Check if the stack can pop
    pub fn can_go_back(&self) -> bool {
        self.depth() > 1
    }
}

#[async_trait]
impl Surface for StackSurface {
    fn kind(&self) -> ComponentKind {
        ComponentKind::Sequential
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
        let target = update.target;
        let previous = self.live.list();
        let visible: Vec<Content> = update.list.into_iter().take(target + 1).collect();

        if !same_instances(&previous, &visible) {
            tracing::debug!(
                container = %self.container.id(),
                depth = visible.len(),
                "stack order changed"
            );
            self.presenter
                .set_stack(&self.container, &screens(&visible), update.animated)
                .await?;
        }

        self.live.set(visible.clone(), Some(target));
        release(&*self.presenter, &self.container, &previous, &update.dropped, &visible).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Component;
    use crate::host::{HeadlessHost, HeadlessPresenter, PresenterOp};
    use crate::component::Environment;
    use crate::step::Identity;

    fn setup() -> (Environment, Arc<HeadlessPresenter>) {
        let presenter = Arc::new(HeadlessPresenter::new());
        let env = Environment::new(Arc::new(HeadlessHost::new()), presenter.clone());
        (env, presenter)
    }

    #[tokio::test]
    async fn test_push_then_pop() {
        let (env, presenter) = setup();
        let root = Component::leaf("root").create(&env);
        let detail = Component::leaf("detail").create(&env);
        let stack = StackSurface::new(ScreenHandle::new(Identity::new("stack")), presenter.clone());
        stack.install(vec![root.clone()], Some(0));
        assert!(!stack.can_go_back());

        stack
            .commit(SurfaceUpdate {
                list: vec![root.clone(), detail.clone()],
                target: 1,
                animated: true,
                dropped: Vec::new(),
            })
            .await
            .unwrap();
        assert_eq!(stack.depth(), 2);
        assert_eq!(stack.active_index(), Some(1));

        let back = stack.back_update(true).unwrap();
        stack.commit(back).await.unwrap();
        assert_eq!(stack.depth(), 1);
        assert!(stack.live_list()[0].same_instance(&root));

        // Can't pop past root
        assert!(stack.back_update(true).is_none());

        assert_eq!(
            presenter.ops(),
            vec![
                PresenterOp::SetStack {
                    container: Identity::new("stack"),
                    screens: vec![Identity::new("root"), Identity::new("detail")],
                    animated: true,
                },
                PresenterOp::SetStack {
                    container: Identity::new("stack"),
                    screens: vec![Identity::new("root")],
                    animated: true,
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_unchanged_stack_skips_presenter() {
        let (env, presenter) = setup();
        let root = Component::leaf("root").create(&env);
        let stack = StackSurface::new(ScreenHandle::new(Identity::new("stack")), presenter.clone());
        stack.install(vec![root.clone()], Some(0));

        stack
            .commit(SurfaceUpdate {
                list: vec![root],
                target: 0,
                animated: true,
                dropped: Vec::new(),
            })
            .await
            .unwrap();
        assert!(presenter.ops().is_empty());
    }

    #[tokio::test]
    async fn test_out_of_range_target_is_rejected() {
        let (env, presenter) = setup();
        let root = Component::leaf("root").create(&env);
        let stack = StackSurface::new(ScreenHandle::new(Identity::new("stack")), presenter);
        stack.install(vec![root.clone()], Some(0));

        let err = stack
            .commit(SurfaceUpdate {
                list: vec![root],
                target: 3,
                animated: false,
                dropped: Vec::new(),
            })
            .await
            .unwrap_err();
        assert_eq!(err, CommitError::InvalidTarget { target: 3, len: 1 });
        assert_eq!(stack.depth(), 1);
    }

    #[tokio::test]
    async fn test_truncated_and_dropped_screens_are_released() {
        let (env, presenter) = setup();
        let root = Component::leaf("root").create(&env);
        let detail = Component::leaf("detail").create(&env);
        let orphan = Component::leaf("orphan").create(&env);
        let stack = StackSurface::new(ScreenHandle::new(Identity::new("stack")), presenter.clone());
        stack.install(vec![root.clone(), detail, orphan.clone()], Some(2));

        stack
            .commit(SurfaceUpdate {
                list: vec![root],
                target: 0,
                animated: true,
                dropped: vec![orphan],
            })
            .await
            .unwrap();

        assert_eq!(
            presenter.released(),
            vec![Identity::new("detail"), Identity::new("orphan")]
        );
    }
}
