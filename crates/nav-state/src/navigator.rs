//! Navigation coordinator
//!
//! The [`Navigator`] owns the root instance and a FIFO request queue drained
//! by a single task, so at most one structural mutation is in flight at any
//! time. Requests complete strictly in the order they were accepted, and an
//! accepted request always runs to completion.

use parking_lot::{Mutex, RwLock};
use std::collections::VecDeque;
use std::future::Future;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot, watch};

use nav_core::{Component, Content, Environment, InteractiveTransition, NavigationError, Path};

use crate::config::NavigatorConfig;
use crate::events::NavigatorEvent;
use crate::relative::RelativeMove;
use crate::resolver::{NavigationReport, Resolver, Target};

/// Result delivered to a request's completion
pub type NavigationResult = Result<NavigationReport, NavigationError>;

/// Capacity of the event broadcast channel
const EVENT_CAPACITY: usize = 64;

/// Coordinator state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoordinatorState {
    /// No request in flight
    #[default]
    Idle,
    /// A request is being resolved and committed
    Resolving,
}

/// How a request reports back
enum Completion {
    Channel(oneshot::Sender<NavigationResult>),
    Callback(Box<dyn FnOnce(NavigationResult) + Send>),
}

impl Completion {
    fn complete(self, result: NavigationResult) {
        match self {
            // The caller may have stopped waiting; that is fine.
            Completion::Channel(tx) => {
                let _ = tx.send(result);
            }
            Completion::Callback(callback) => callback(result),
        }
    }
}

struct Request {
    id: u64,
    target: Target,
    completion: Completion,
}

/// State shared between the handle and the worker task
struct Shared {
    config: NavigatorConfig,
    state: RwLock<CoordinatorState>,
    queued: AtomicUsize,
    next_id: AtomicU64,
    location_tx: watch::Sender<Path>,
    events_tx: broadcast::Sender<NavigatorEvent>,
    history: Mutex<VecDeque<Path>>,
}

impl Shared {
    fn record(&self, location: &Path) {
        if self.config.history_limit == 0 {
            return;
        }
        let mut history = self.history.lock();
        if history.back() != Some(location) {
            history.push_back(location.clone());
        }
        while history.len() > self.config.history_limit {
            history.pop_front();
        }
    }
}

/// Serializing navigation coordinator
///
/// # Example
///
/// ```no_run
/// use nav_core::{Component, Environment, Path};
/// use nav_state::{Navigator, NavigatorConfig};
///
/// #[tokio::main]
/// async fn main() {
///     let root = Component::tabs("root")
///         .child(Component::leaf("home"))
///         .child(Component::stack("profile").child(Component::leaf("overview")).child(Component::leaf("followers")))
///         .build();
///     let navigator = Navigator::spawn(root, Environment::headless(), NavigatorConfig::default());
///
///     navigator.navigate(Path::from(["profile", "followers"])).await.unwrap();
///     assert_eq!(navigator.current_location(), Path::from(["profile", "followers"]));
/// }
/// ```
#[derive(Clone)]
pub struct Navigator {
    tx: mpsc::UnboundedSender<Request>,
    shared: Arc<Shared>,
    root_content: Content,
}

impl Navigator {
    /// Materialize `root` and start the coordinator task
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(root: Component, env: Environment, config: NavigatorConfig) -> Self {
        let resolver = Resolver::new(root, env, config.clone());
        let root_content = resolver.root_content().clone();
        let (location_tx, _) = watch::channel(resolver.location());
        let (events_tx, _) = broadcast::channel(EVENT_CAPACITY);

        let shared = Arc::new(Shared {
            config,
            state: RwLock::new(CoordinatorState::Idle),
            queued: AtomicUsize::new(0),
            next_id: AtomicU64::new(1),
            location_tx,
            events_tx,
            history: Mutex::new(VecDeque::new()),
        });
        shared.record(&resolver.location());

        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run(rx, resolver, Arc::clone(&shared)));

        Self {
            tx,
            shared,
            root_content,
        }
    }

    /// Navigate to `path`
    ///
    /// The request is queued when this method is called, not when the
    /// returned future is first polled.
    pub fn navigate(&self, path: impl Into<Path>) -> impl Future<Output = NavigationResult> + Send + 'static {
        self.submit(Target::Path(path.into()))
    }

    /// Navigate to `path`, reporting through a callback
    pub fn navigate_with<F>(&self, path: impl Into<Path>, completion: F)
    where
        F: FnOnce(NavigationResult) + Send + 'static,
    {
        self.enqueue(Target::Path(path.into()), Completion::Callback(Box::new(completion)));
    }

    /// Move relative to the current position
    pub fn navigate_relative(&self, mv: RelativeMove) -> impl Future<Output = NavigationResult> + Send + 'static {
        self.submit(Target::Relative(mv))
    }

    /// Move relative to the current position, reporting through a callback
    pub fn navigate_relative_with<F>(&self, mv: RelativeMove, completion: F)
    where
        F: FnOnce(NavigationResult) + Send + 'static,
    {
        self.enqueue(Target::Relative(mv), Completion::Callback(Box::new(completion)));
    }

    /// Commit a finished interactive transition as a queued request
    ///
    /// The gesture ends immediately; its commit runs after every request
    /// accepted before it and publishes location, history and events like any
    /// other navigation. If an earlier request changed the surface in the
    /// meantime the commit fails with [`CommitError::Interrupted`].
    ///
    /// [`CommitError::Interrupted`]: nav_core::CommitError::Interrupted
    pub fn finish_transition(
        &self,
        transition: &InteractiveTransition,
    ) -> impl Future<Output = NavigationResult> + Send + 'static {
        let (tx, rx) = oneshot::channel();
        self.finish_transition_with(transition, move |result| {
            let _ = tx.send(result);
        });
        async move { rx.await.unwrap_or(Err(NavigationError::Closed)) }
    }

    /// Commit a finished interactive transition, reporting through a callback
    pub fn finish_transition_with<F>(&self, transition: &InteractiveTransition, completion: F)
    where
        F: FnOnce(NavigationResult) + Send + 'static,
    {
        match transition.complete() {
            Ok(gesture) => self.enqueue(Target::Gesture(gesture), Completion::Callback(Box::new(completion))),
            Err(e) => completion(Err(e.into())),
        }
    }

    /// Location after the most recently completed request
    pub fn current_location(&self) -> Path {
        self.shared.location_tx.borrow().clone()
    }

    /// Watch the location
    pub fn watch_location(&self) -> watch::Receiver<Path> {
        self.shared.location_tx.subscribe()
    }

    /// Subscribe to lifecycle events
    pub fn subscribe(&self) -> broadcast::Receiver<NavigatorEvent> {
        self.shared.events_tx.subscribe()
    }

    /// Coordinator state
    pub fn state(&self) -> CoordinatorState {
        *self.shared.state.read()
    }

    /// Number of requests waiting behind the in-flight one
    pub fn pending(&self) -> usize {
        self.shared.queued.load(Ordering::SeqCst)
    }

    /// Completed locations, oldest first
    pub fn history(&self) -> Vec<Path> {
        self.shared.history.lock().iter().cloned().collect()
    }

    /// Live root instance
    pub fn root_content(&self) -> &Content {
        &self.root_content
    }

    /// Configuration in use
    pub fn config(&self) -> &NavigatorConfig {
        &self.shared.config
    }

    fn submit(&self, target: Target) -> impl Future<Output = NavigationResult> + Send + 'static {
        let (tx, rx) = oneshot::channel();
        self.enqueue(target, Completion::Channel(tx));
        async move { rx.await.unwrap_or(Err(NavigationError::Closed)) }
    }

    fn enqueue(&self, target: Target, completion: Completion) {
        let id = self.shared.next_id.fetch_add(1, Ordering::SeqCst);

        // Check and reserve a slot in one step.
        let limit = self.shared.config.max_pending.unwrap_or(usize::MAX);
        let reserved = self
            .shared
            .queued
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |queued| {
                (queued < limit).then_some(queued + 1)
            });
        if let Err(queued) = reserved {
            tracing::warn!(request = id, queued, "navigation queue full");
            completion.complete(Err(NavigationError::QueueFull(queued)));
            return;
        }

        tracing::debug!(request = id, destination = ?target, "navigation queued");

        let request = Request {
            id,
            target,
            completion,
        };
        if let Err(mpsc::error::SendError(request)) = self.tx.send(request) {
            self.shared.queued.fetch_sub(1, Ordering::SeqCst);
            request.completion.complete(Err(NavigationError::Closed));
        }
    }
}

/// Drain the queue one request at a time
async fn run(mut rx: mpsc::UnboundedReceiver<Request>, resolver: Resolver, shared: Arc<Shared>) {
    while let Some(request) = rx.recv().await {
        shared.queued.fetch_sub(1, Ordering::SeqCst);
        *shared.state.write() = CoordinatorState::Resolving;
        let _ = shared.events_tx.send(NavigatorEvent::Started { request: request.id });
        tracing::info!(request = request.id, destination = ?request.target, "navigation started");

        let result = resolver.execute(&request.target).await;

        // Publish where we ended up, even after a failed commit.
        let location = resolver.location();
        shared.location_tx.send_replace(location.clone());
        *shared.state.write() = CoordinatorState::Idle;

        match &result {
            Ok(report) => {
                shared.record(&report.location);
                tracing::info!(
                    request = request.id,
                    location = %report.location,
                    created = report.created,
                    reused = report.reused,
                    "navigation completed"
                );
                let _ = shared.events_tx.send(NavigatorEvent::Completed {
                    request: request.id,
                    location,
                });
            }
            Err(e) => {
                tracing::warn!(request = request.id, error = %e, "navigation failed");
                let _ = shared.events_tx.send(NavigatorEvent::Failed {
                    request: request.id,
                    error: e.to_string(),
                });
            }
        }

        request.completion.complete(result);
    }
    tracing::debug!("navigator stopped");
}

impl std::fmt::Debug for Navigator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Navigator")
            .field("state", &self.state())
            .field("pending", &self.pending())
            .field("location", &self.current_location())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    fn tree() -> Component {
        Component::tabs("root")
            .child(Component::leaf("A"))
            .child(
                Component::stack("B")
                    .child(Component::leaf("B1"))
                    .child(Component::leaf("B2")),
            )
            .child(Component::leaf("C"))
            .build()
    }

    #[tokio::test]
    async fn test_initial_location() {
        let navigator = Navigator::spawn(tree(), Environment::headless(), NavigatorConfig::default());
        assert_eq!(navigator.current_location(), Path::from(["A"]));
        assert_eq!(navigator.state(), CoordinatorState::Idle);
        assert_eq!(navigator.history(), vec![Path::from(["A"])]);
    }

    #[tokio::test]
    async fn test_callbacks_fire_in_order() {
        let navigator = Navigator::spawn(tree(), Environment::headless(), NavigatorConfig::default());
        let order = Arc::new(StdMutex::new(Vec::new()));

        for (label, path) in [("c1", Path::from(["B", "B2"])), ("c2", Path::from(["C"]))] {
            let order = Arc::clone(&order);
            navigator.navigate_with(path, move |result| {
                assert!(result.is_ok());
                order.lock().unwrap().push(label);
            });
        }

        // Flush the queue
        navigator.navigate(Path::new()).await.unwrap();
        assert_eq!(*order.lock().unwrap(), vec!["c1", "c2"]);
        assert_eq!(navigator.current_location(), Path::from(["C"]));
    }

    #[tokio::test]
    async fn test_queue_limit() {
        let navigator = Navigator::spawn(
            tree(),
            Environment::headless(),
            NavigatorConfig::default().max_pending(Some(1)),
        );

        // Nothing runs until we yield, so both stay queued.
        let first = navigator.navigate(Path::from(["C"]));
        let second = navigator.navigate(Path::from(["B"]));

        assert_eq!(second.await, Err(NavigationError::QueueFull(1)));
        assert!(first.await.is_ok());
        assert_eq!(navigator.current_location(), Path::from(["C"]));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_queue_limit_under_concurrent_callers() {
        let navigator = Navigator::spawn(
            tree(),
            Environment::headless(),
            NavigatorConfig::default().max_pending(Some(3)),
        );
        let callers: Vec<_> = (0..16)
            .map(|_| {
                let navigator = navigator.clone();
                tokio::spawn(async move {
                    let pending = navigator.navigate(Path::from(["C"]));
                    assert!(navigator.pending() <= 3);
                    pending.await
                })
            })
            .collect();

        for caller in callers {
            match caller.await.unwrap() {
                Ok(report) => assert_eq!(report.location, Path::from(["C"])),
                Err(NavigationError::QueueFull(queued)) => assert!(queued <= 3),
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert!(navigator.pending() <= 3);
    }

    #[tokio::test]
    async fn test_finish_transition_publishes_location() {
        use nav_core::{PendingCommit, TransitionDirection};

        let navigator = Navigator::spawn(tree(), Environment::headless(), NavigatorConfig::default());
        navigator.navigate(Path::from(["B", "B2"])).await.unwrap();
        let mut location = navigator.watch_location();
        location.borrow_and_update();

        let stack = navigator.root_content().live_children()[1].clone();
        let surface = stack.surface().unwrap().clone();
        let transition = InteractiveTransition::new();
        transition
            .begin(TransitionDirection::Hide, PendingCommit::back(surface, true).unwrap())
            .unwrap();

        let report = navigator.finish_transition(&transition).await.unwrap();
        assert_eq!(report.location, Path::from(["B", "B1"]));
        assert!(location.has_changed().unwrap());
        assert_eq!(navigator.current_location(), Path::from(["B", "B1"]));
        assert_eq!(navigator.history().last(), Some(&Path::from(["B", "B1"])));

        // Nothing left to finish.
        assert_eq!(
            navigator.finish_transition(&transition).await,
            Err(NavigationError::Transition(nav_core::TransitionError::NotActive))
        );
    }

    #[tokio::test]
    async fn test_events_and_history() {
        let navigator = Navigator::spawn(
            tree(),
            Environment::headless(),
            NavigatorConfig::default().history_limit(2),
        );
        let mut events = navigator.subscribe();

        navigator.navigate(Path::from(["C"])).await.unwrap();
        assert!(navigator.navigate(Path::from(["Z"])).await.is_err());
        navigator.navigate(Path::from(["B"])).await.unwrap();

        let started = events.recv().await.unwrap();
        assert!(matches!(started, NavigatorEvent::Started { .. }));
        assert_eq!(
            events.recv().await.unwrap(),
            NavigatorEvent::Completed {
                request: started.request(),
                location: Path::from(["C"])
            }
        );
        assert!(matches!(events.recv().await.unwrap(), NavigatorEvent::Started { .. }));
        assert!(matches!(events.recv().await.unwrap(), NavigatorEvent::Failed { .. }));

        assert_eq!(navigator.history(), vec![Path::from(["C"]), Path::from(["B", "B1"])]);
    }

    #[tokio::test]
    async fn test_relative_moves() {
        let navigator = Navigator::spawn(tree(), Environment::headless(), NavigatorConfig::default());

        navigator.navigate_relative(RelativeMove::Forward(1)).await.unwrap();
        assert_eq!(navigator.current_location(), Path::from(["B", "B1"]));

        navigator.navigate_relative(RelativeMove::Forward(1)).await.unwrap();
        assert_eq!(navigator.current_location(), Path::from(["B", "B2"]));

        navigator.navigate_relative(RelativeMove::Back(1)).await.unwrap();
        assert_eq!(navigator.current_location(), Path::from(["B", "B1"]));

        let err = navigator.navigate_relative(RelativeMove::Back(1)).await.unwrap_err();
        assert!(matches!(err, NavigationError::NoRelativeTarget(_)));
        assert_eq!(navigator.current_location(), Path::from(["B", "B1"]));
    }

    #[tokio::test]
    async fn test_watch_location() {
        let navigator = Navigator::spawn(tree(), Environment::headless(), NavigatorConfig::default());
        let mut rx = navigator.watch_location();

        navigator.navigate(Path::from(["C"])).await.unwrap();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), Path::from(["C"]));
    }
}
