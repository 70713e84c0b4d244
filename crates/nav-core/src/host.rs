//! Screen host and presenter collaborators
//!
//! The engine never renders anything itself. It asks a [`ScreenHost`] to
//! materialize opaque screens and a [`Presenter`] to mutate the platform's
//! containers. Headless implementations of both are provided for tests and
//! for driving the engine without a UI.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use uuid::Uuid;

use crate::component::ComponentKind;
use crate::error::CommitError;
use crate::step::Identity;

// =============================================================================
// Screen Handles
// =============================================================================

/// Opaque handle to a materialized screen
///
/// Two handles are equal only if they refer to the same screen instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScreenHandle {
    key: Uuid,
    id: Identity,
}

impl ScreenHandle {
    /// Create a handle for a fresh screen instance
    pub fn new(id: Identity) -> Self {
        Self {
            key: Uuid::new_v4(),
            id,
        }
    }

    /// Unique key of this instance
    pub fn key(&self) -> Uuid {
        self.key
    }

    /// Identity the screen was created for
    pub fn id(&self) -> &Identity {
        &self.id
    }
}

/// What the host needs to know to build a screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenDescriptor {
    /// Identity of the component being materialized
    pub id: Identity,
    /// Classification of the component
    pub kind: ComponentKind,
}

// =============================================================================
// Screen Host
// =============================================================================

/// Creates and updates screens
pub trait ScreenHost: Send + Sync {
    /// Materialize a new, independent screen
    fn create(&self, descriptor: &ScreenDescriptor) -> ScreenHandle;

    /// Hand a payload to an existing screen
    fn update(&self, handle: &ScreenHandle, payload: Option<&Value>);
}

/// In-memory screen host
///
/// Counts creations and remembers the last payload each screen received.
#[derive(Debug, Default)]
pub struct HeadlessHost {
    created: AtomicUsize,
    updated: AtomicUsize,
    payloads: Mutex<HashMap<Uuid, Value>>,
}

impl HeadlessHost {
    /// Create a new headless host
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of screens created so far
    pub fn created_count(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    /// Number of payload updates delivered so far
    pub fn update_count(&self) -> usize {
        self.updated.load(Ordering::SeqCst)
    }

    /// Last payload delivered to a screen
    pub fn payload(&self, handle: &ScreenHandle) -> Option<Value> {
        self.payloads.lock().get(&handle.key()).cloned()
    }
}

impl ScreenHost for HeadlessHost {
    fn create(&self, descriptor: &ScreenDescriptor) -> ScreenHandle {
        self.created.fetch_add(1, Ordering::SeqCst);
        ScreenHandle::new(descriptor.id.clone())
    }

    fn update(&self, handle: &ScreenHandle, payload: Option<&Value>) {
        self.updated.fetch_add(1, Ordering::SeqCst);
        let mut payloads = self.payloads.lock();
        match payload {
            Some(value) => {
                payloads.insert(handle.key(), value.clone());
            }
            None => {
                payloads.remove(&handle.key());
            }
        }
    }
}

// =============================================================================
// Presenter
// =============================================================================

/// Platform-side mutation of container screens
///
/// Each call resolves once the platform transition has finished.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Presenter: Send + Sync {
    /// Replace the visible order of a stack container
    async fn set_stack(
        &self,
        container: &ScreenHandle,
        screens: &[ScreenHandle],
        animated: bool,
    ) -> Result<(), CommitError>;

    /// Replace the tabs of a tab container
    async fn set_tabs(&self, container: &ScreenHandle, screens: &[ScreenHandle]) -> Result<(), CommitError>;

    /// Select a tab by index
    async fn select_tab(&self, container: &ScreenHandle, index: usize, animated: bool) -> Result<(), CommitError>;

    /// Replace the base layer of an overlay container
    async fn set_base(&self, container: &ScreenHandle, screen: &ScreenHandle) -> Result<(), CommitError>;

    /// Present one overlay layer on top
    async fn present(&self, container: &ScreenHandle, screen: &ScreenHandle, animated: bool) -> Result<(), CommitError>;

    /// Dismiss the top overlay layer
    async fn dismiss(&self, container: &ScreenHandle, screen: &ScreenHandle, animated: bool) -> Result<(), CommitError>;

    /// Take back screens that left a container
    ///
    /// Called after the container's commit succeeded. The default keeps
    /// nothing and does nothing.
    async fn release(&self, _container: &ScreenHandle, _screens: &[ScreenHandle]) -> Result<(), CommitError> {
        Ok(())
    }
}

/// A platform operation recorded by [`HeadlessPresenter`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenterOp {
    /// Stack order replaced
    SetStack {
        /// Container identity
        container: Identity,
        /// New visible order, bottom to top
        screens: Vec<Identity>,
        /// Animated flag
        animated: bool,
    },
    /// Tabs replaced
    SetTabs {
        /// Container identity
        container: Identity,
        /// New tab order
        screens: Vec<Identity>,
    },
    /// Tab selected
    SelectTab {
        /// Container identity
        container: Identity,
        /// Selected index
        index: usize,
    },
    /// Overlay base replaced
    SetBase {
        /// Container identity
        container: Identity,
        /// New base
        screen: Identity,
    },
    /// Overlay presented
    Present {
        /// Container identity
        container: Identity,
        /// Presented layer
        screen: Identity,
        /// Animated flag
        animated: bool,
    },
    /// Overlay dismissed
    Dismiss {
        /// Container identity
        container: Identity,
        /// Dismissed layer
        screen: Identity,
        /// Animated flag
        animated: bool,
    },
}

/// Presenter that completes every operation immediately and records it
#[derive(Debug, Default)]
pub struct HeadlessPresenter {
    ops: Mutex<Vec<PresenterOp>>,
    released: Mutex<Vec<Identity>>,
}

impl HeadlessPresenter {
    /// Create a new headless presenter
    pub fn new() -> Self {
        Self::default()
    }

    /// Operations recorded so far
    pub fn ops(&self) -> Vec<PresenterOp> {
        self.ops.lock().clone()
    }

    /// Drain the recorded operations
    pub fn take_ops(&self) -> Vec<PresenterOp> {
        std::mem::take(&mut *self.ops.lock())
    }

    /// Identities of every screen released so far
    pub fn released(&self) -> Vec<Identity> {
        self.released.lock().clone()
    }

    fn record(&self, op: PresenterOp) {
        tracing::trace!(?op, "headless presenter");
        self.ops.lock().push(op);
    }
}

fn ids(screens: &[ScreenHandle]) -> Vec<Identity> {
    screens.iter().map(|s| s.id().clone()).collect()
}

#[async_trait]
impl Presenter for HeadlessPresenter {
    async fn set_stack(
        &self,
        container: &ScreenHandle,
        screens: &[ScreenHandle],
        animated: bool,
    ) -> Result<(), CommitError> {
        self.record(PresenterOp::SetStack {
            container: container.id().clone(),
            screens: ids(screens),
            animated,
        });
        Ok(())
    }

    async fn set_tabs(&self, container: &ScreenHandle, screens: &[ScreenHandle]) -> Result<(), CommitError> {
        self.record(PresenterOp::SetTabs {
            container: container.id().clone(),
            screens: ids(screens),
        });
        Ok(())
    }

    async fn select_tab(&self, container: &ScreenHandle, index: usize, _animated: bool) -> Result<(), CommitError> {
        self.record(PresenterOp::SelectTab {
            container: container.id().clone(),
            index,
        });
        Ok(())
    }

    async fn set_base(&self, container: &ScreenHandle, screen: &ScreenHandle) -> Result<(), CommitError> {
        self.record(PresenterOp::SetBase {
            container: container.id().clone(),
            screen: screen.id().clone(),
        });
        Ok(())
    }

    async fn present(&self, container: &ScreenHandle, screen: &ScreenHandle, animated: bool) -> Result<(), CommitError> {
        self.record(PresenterOp::Present {
            container: container.id().clone(),
            screen: screen.id().clone(),
            animated,
        });
        Ok(())
    }

    async fn dismiss(&self, container: &ScreenHandle, screen: &ScreenHandle, animated: bool) -> Result<(), CommitError> {
        self.record(PresenterOp::Dismiss {
            container: container.id().clone(),
            screen: screen.id().clone(),
            animated,
        });
        Ok(())
    }

    async fn release(&self, _container: &ScreenHandle, screens: &[ScreenHandle]) -> Result<(), CommitError> {
        self.released.lock().extend(ids(screens));
        Ok(())
    }
}
