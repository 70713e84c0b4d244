//! Navigation coordination for Waypoint
//!
//! This crate drives a [`nav_core`] component tree: it serializes requests
//! through a FIFO queue, resolves paths against the live tree, and publishes
//! location, state and lifecycle events.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod events;
pub mod logging;
pub mod navigator;
pub mod relative;
pub mod resolver;

// Re-export commonly used types
pub use config::{ConfigError, NavigatorConfig, ResolutionOrder};
pub use events::NavigatorEvent;
pub use logging::init_logging;
pub use navigator::{CoordinatorState, NavigationResult, Navigator};
pub use relative::RelativeMove;
pub use resolver::{NavigationReport, Target};
