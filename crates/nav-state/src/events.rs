//! Navigator lifecycle events

use nav_core::Path;

/// Events broadcast as requests move through the navigator
#[derive(Debug, Clone, PartialEq)]
pub enum NavigatorEvent {
    /// A request left the queue and started resolving
    Started {
        /// Request sequence number
        request: u64,
    },
    /// A request completed successfully
    Completed {
        /// Request sequence number
        request: u64,
        /// Location after the request
        location: Path,
    },
    /// A request failed
    Failed {
        /// Request sequence number
        request: u64,
        /// Failure description
        error: String,
    },
}

impl NavigatorEvent {
    /// Request sequence number carried by the event
    pub fn request(&self) -> u64 {
        match self {
            NavigatorEvent::Started { request }
            | NavigatorEvent::Completed { request, .. }
            | NavigatorEvent::Failed { request, .. } => *request,
        }
    }
}
