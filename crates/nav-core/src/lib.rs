//! Navigation core for Waypoint
//!
//! This crate provides the building blocks of declarative navigation:
//!
//! - [`step`] - Identities, steps and paths addressing nested destinations
//! - [`component`] - The declarative component tree and its live instances
//! - [`reconcile`] - Identity-preserving diff of declared vs. live children
//! - [`surface`] - Per-container commit policies (stack, tabs, overlay)
//! - [`host`] - Screen host and presenter collaborators
//! - [`transition`] - Interactive, gesture-driven transitions

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod component;
pub mod error;
pub mod host;
pub mod reconcile;
pub mod step;
pub mod surface;
pub mod transition;

// Re-export commonly used types
pub use component::{Component, ComponentBuilder, ComponentKind, Content, Delivery, Environment, Prepared};
pub use error::{CommitError, NavigationError, TransitionError};
pub use host::{
    HeadlessHost, HeadlessPresenter, Presenter, PresenterOp, ScreenDescriptor, ScreenHandle,
    ScreenHost,
};
pub use reconcile::{reconcile, Reconciliation, Span};
pub use step::{Identity, Path, Step};
pub use surface::{OverlaySurface, PendingCommit, StackSurface, Surface, SurfaceUpdate, TabSurface};
pub use transition::{FinishedGesture, InteractiveTransition, TransitionDirection, TransitionPhase};
