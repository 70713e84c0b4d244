//! Waypoint: declarative, path-addressed navigation
//!
//! Declare a tree of components once, then navigate by path. Containers
//! reconcile their live children against the request, keep instances whose
//! identity survives, and commit the change through a [`Presenter`].
//!
//! ```no_run
//! use waypoint::{Component, Environment, Navigator, NavigatorConfig, Path};
//!
//! # async fn run() -> Result<(), waypoint::NavigationError> {
//! let root = Component::tabs("root")
//!     .child(Component::leaf("A"))
//!     .child(Component::stack("B").child(Component::leaf("B1")).child(Component::leaf("B2")))
//!     .build();
//!
//! let navigator = Navigator::spawn(root, Environment::headless(), NavigatorConfig::default());
//! let report = navigator.navigate(Path::from(["B", "B2"])).await?;
//! assert_eq!(report.location, Path::from(["B", "B2"]));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub use nav_core::{
    reconcile, CommitError, Component, ComponentBuilder, ComponentKind, Content, Delivery,
    Environment, FinishedGesture, HeadlessHost, HeadlessPresenter, Identity, InteractiveTransition, NavigationError,
    OverlaySurface, Path, PendingCommit, Prepared, Presenter, PresenterOp, Reconciliation,
    ScreenDescriptor, ScreenHandle, ScreenHost, Span, StackSurface, Step, Surface, SurfaceUpdate,
    TabSurface, TransitionDirection, TransitionError, TransitionPhase,
};
pub use nav_state::{
    init_logging, ConfigError, CoordinatorState, NavigationReport, NavigationResult, Navigator,
    NavigatorConfig, NavigatorEvent, RelativeMove, ResolutionOrder, Target,
};
