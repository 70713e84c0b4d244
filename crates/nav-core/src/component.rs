//! Declarative component tree
//!
//! A [`Component`] is a node of the static navigation tree: a leaf screen or a
//! container (stack, tabs, overlay) with ordered children. Calling
//! [`Component::create`] materializes a live [`Content`] instance; containers
//! carry a [`Surface`] that owns their live child list.
//!
//! Components are built once with the builder API and are cheap to clone.
//!
//! ```
//! use nav_core::Component;
//!
//! let root = Component::tabs("root")
//!     .child(Component::leaf("A"))
//!     .child(Component::stack("B").child(Component::leaf("B1")).child(Component::leaf("B2")))
//!     .child(Component::leaf("C"))
//!     .build();
//! assert_eq!(root.children().len(), 3);
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::error::NavigationError;
use crate::host::{HeadlessHost, HeadlessPresenter, Presenter, ScreenDescriptor, ScreenHandle, ScreenHost};
use crate::reconcile::{self, Declared, Span, Tagged};
use crate::step::{Identity, Path, Step};
use crate::surface::{self, PendingCommit, Surface, SurfaceUpdate};

// =============================================================================
// Classification
// =============================================================================

/// How a component presents itself and its children
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    /// Renders a screen directly
    Leaf,
    /// Ordered history, e.g. a push stack
    Sequential,
    /// One active child at a time, e.g. a tab set
    Exclusive,
    /// Ordered stack of overlays
    Overlay,
}

impl ComponentKind {
    /// Check if this kind holds children
    pub fn is_container(&self) -> bool {
        !matches!(self, ComponentKind::Leaf)
    }
}

// =============================================================================
// Environment
// =============================================================================

/// Collaborators used while materializing and committing
#[derive(Clone)]
pub struct Environment {
    host: Arc<dyn ScreenHost>,
    presenter: Arc<dyn Presenter>,
}

impl Environment {
    /// Create an environment from a host and a presenter
    pub fn new(host: Arc<dyn ScreenHost>, presenter: Arc<dyn Presenter>) -> Self {
        Self { host, presenter }
    }

    /// Environment backed by [`HeadlessHost`] and [`HeadlessPresenter`]
    pub fn headless() -> Self {
        Self::new(Arc::new(HeadlessHost::new()), Arc::new(HeadlessPresenter::new()))
    }

    /// Screen host
    pub fn host(&self) -> &Arc<dyn ScreenHost> {
        &self.host
    }

    /// Presenter
    pub fn presenter(&self) -> &Arc<dyn Presenter> {
        &self.presenter
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment").finish_non_exhaustive()
    }
}

// =============================================================================
// Content
// =============================================================================

struct ContentInner {
    tag: Identity,
    screen: ScreenHandle,
    surface: Option<Arc<dyn Surface>>,
}

/// A live, materialized instance of a component
///
/// Clones share the same instance; use [`Content::same_instance`] to compare
/// identity of instances rather than of destinations.
#[derive(Clone)]
pub struct Content {
    inner: Arc<ContentInner>,
}

impl Content {
    /// Identity of the component that produced this instance
    pub fn tag(&self) -> &Identity {
        &self.inner.tag
    }

    /// Screen materialized by the host
    pub fn screen(&self) -> &ScreenHandle {
        &self.inner.screen
    }

    /// Surface owning the live child list (containers only)
    pub fn surface(&self) -> Option<&Arc<dyn Surface>> {
        self.inner.surface.as_ref()
    }

    /// Live children of a container instance
    pub fn live_children(&self) -> Vec<Content> {
        self.surface().map(|s| s.live_list()).unwrap_or_default()
    }

    /// Check whether two handles point at the same instance
    pub fn same_instance(&self, other: &Content) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Tagged for Content {
    fn tag(&self) -> &Identity {
        &self.inner.tag
    }
}

impl fmt::Debug for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Content")
            .field("tag", &self.inner.tag)
            .field("screen", &self.inner.screen.key())
            .field("kind", &self.inner.surface.as_ref().map(|s| s.kind()))
            .finish()
    }
}

// =============================================================================
// Component
// =============================================================================

#[derive(Debug)]
struct ComponentNode {
    id: Identity,
    kind: ComponentKind,
    children: Vec<Component>,
}

/// A node of the declarative navigation tree
#[derive(Debug, Clone)]
pub struct Component {
    node: Arc<ComponentNode>,
}

/// Builder for container components
#[derive(Debug)]
pub struct ComponentBuilder {
    id: Identity,
    kind: ComponentKind,
    children: Vec<Component>,
}

impl ComponentBuilder {
    /// Append a child
    pub fn child(mut self, child: impl Into<Component>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Append several children
    pub fn children<I, C>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Component>,
    {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }

    /// Finish the component
    pub fn build(self) -> Component {
        Component {
            node: Arc::new(ComponentNode {
                id: self.id,
                kind: self.kind,
                children: self.children,
            }),
        }
    }
}

impl From<ComponentBuilder> for Component {
    fn from(builder: ComponentBuilder) -> Self {
        builder.build()
    }
}

/// A step's payload waiting for its screen
///
/// Delivered only once the commits of the request have succeeded, so a
/// screen never sees a payload for a navigation that did not happen.
#[derive(Debug, Clone)]
pub struct Delivery {
    /// Receiving screen
    pub screen: ScreenHandle,
    /// Payload carried by the step
    pub payload: Option<Value>,
}

impl Delivery {
    fn new(content: &Content, step: &Step) -> Self {
        Self {
            screen: content.screen().clone(),
            payload: step.payload.clone(),
        }
    }

    /// Hand the payload to the screen
    pub fn deliver(self, host: &dyn ScreenHost) {
        host.update(&self.screen, self.payload.as_ref());
    }
}

/// Result of preparing one navigation hop
///
/// Reconciliation has run and any new instances exist, but nothing has been
/// committed to the surface yet.
#[derive(Debug)]
pub struct Prepared {
    /// Child that became the target, with its live instance
    pub target: Option<(Component, Content)>,
    /// Whether the step was consumed at this level
    pub consumed: bool,
    /// Commit to apply for this container
    pub commit: Option<PendingCommit>,
    /// Payload for the screen the step landed on, handed over after commit
    pub delivery: Option<Delivery>,
    /// Instances created while reconciling
    pub created: usize,
    /// Instances reused while reconciling
    pub reused: usize,
}

impl Component {
    /// Leaf component that renders a screen directly
    pub fn leaf(id: impl Into<Identity>) -> Component {
        ComponentBuilder {
            id: id.into(),
            kind: ComponentKind::Leaf,
            children: Vec::new(),
        }
        .build()
    }

    /// Push-stack container
    pub fn stack(id: impl Into<Identity>) -> ComponentBuilder {
        Self::container(id, ComponentKind::Sequential)
    }

    /// Tab container
    pub fn tabs(id: impl Into<Identity>) -> ComponentBuilder {
        Self::container(id, ComponentKind::Exclusive)
    }

    /// Overlay container
    pub fn overlay(id: impl Into<Identity>) -> ComponentBuilder {
        Self::container(id, ComponentKind::Overlay)
    }

    /// Container of any kind
    pub fn container(id: impl Into<Identity>, kind: ComponentKind) -> ComponentBuilder {
        ComponentBuilder {
            id: id.into(),
            kind,
            children: Vec::new(),
        }
    }

    /// Stable identity
    pub fn id(&self) -> &Identity {
        &self.node.id
    }

    /// Classification
    pub fn kind(&self) -> ComponentKind {
        self.node.kind
    }

    /// Declared children, in order
    pub fn children(&self) -> &[Component] {
        &self.node.children
    }

    /// First declared child with the given identity
    pub fn child(&self, id: &Identity) -> Option<&Component> {
        self.node.children.iter().find(|c| c.id() == id)
    }

    /// Descriptor handed to the screen host
    pub fn descriptor(&self) -> ScreenDescriptor {
        ScreenDescriptor {
            id: self.node.id.clone(),
            kind: self.node.kind,
        }
    }

    /// Materialize a new, independent instance
    ///
    /// Containers also materialize their initial children: the first child for
    /// stacks and overlays, every child for tab sets.
    pub fn create(&self, env: &Environment) -> Content {
        let screen = env.host().create(&self.descriptor());
        let surface = surface::for_kind(self.kind(), screen.clone(), env.presenter().clone());

        if let Some(surface) = &surface {
            let initial: Vec<Content> = match surface.span() {
                Span::Full => self.children().iter().map(|c| c.create(env)).collect(),
                Span::UpToTarget => self.children().iter().take(1).map(|c| c.create(env)).collect(),
            };
            let active = if initial.is_empty() { None } else { Some(0) };
            surface.install(initial, active);
        }

        tracing::trace!(id = %self.id(), kind = ?self.kind(), "created content");

        Content {
            inner: Arc::new(ContentInner {
                tag: self.id().clone(),
                screen,
                surface,
            }),
        }
    }

    /// Check whether this component or a descendant accepts the step
    pub fn contains(&self, step: &Step) -> bool {
        step.matches(self.id()) || self.reaches(step)
    }

    /// Check whether one of the children accepts the step
    pub fn reaches(&self, step: &Step) -> bool {
        self.children().iter().any(|c| c.contains(step))
    }

    /// Pick the child a step leads to
    ///
    /// A direct match consumes the step. Otherwise the first child whose
    /// subtree contains the step is chosen and the step is left for it.
    pub fn route(&self, step: &Step) -> Option<(usize, bool)> {
        if let Some(index) = self.children().iter().position(|c| step.matches(c.id())) {
            return Some((index, true));
        }
        self.children()
            .iter()
            .position(|c| c.reaches(step))
            .map(|index| (index, false))
    }

    /// Reconcile this component's instance towards `step` without committing
    ///
    /// Returns `None` when the step is not reachable from here. A leaf
    /// accepts a step naming itself. Payloads are not delivered here; see
    /// [`Prepared::delivery`].
    pub fn prepare(&self, step: &Step, content: &Content, env: &Environment) -> Option<Prepared> {
        let Some(surface) = content.surface() else {
            if !step.matches(self.id()) {
                return None;
            }
            return Some(Prepared {
                target: None,
                consumed: true,
                commit: None,
                delivery: Some(Delivery::new(content, step)),
                created: 0,
                reused: 0,
            });
        };

        let (index, consumed) = self.route(step)?;
        let child = &self.children()[index];
        let live = surface.live_list();
        let result = reconcile::reconcile(self.children(), &live, child.id(), surface.span(), |c| {
            c.create(env)
        })?;

        let target_content = result.list[result.target].clone();
        let delivery = consumed.then(|| Delivery::new(&target_content, step));

        let target_component = self.children()[result.target].clone();
        let commit = PendingCommit::new(
            surface.clone(),
            SurfaceUpdate {
                list: result.list,
                target: result.target,
                animated: step.animated,
                dropped: result.dropped,
            },
        );

        Some(Prepared {
            target: Some((target_component, target_content)),
            consumed,
            commit: Some(commit),
            delivery,
            created: result.created,
            reused: result.reused,
        })
    }

    /// Apply one step to `content` and commit it
    ///
    /// Returns the child that became active, or `None` for a leaf.
    pub async fn navigate(
        &self,
        step: &Step,
        content: &Content,
        env: &Environment,
    ) -> Result<Option<(Component, Content)>, NavigationError> {
        let prepared = self
            .prepare(step, content, env)
            .ok_or_else(|| NavigationError::unreachable(&step.id))?;
        if let Some(commit) = prepared.commit {
            commit.apply().await?;
        }
        if let Some(delivery) = prepared.delivery {
            delivery.deliver(env.host().as_ref());
        }
        Ok(prepared.target)
    }

    /// The child presently active inside `content`
    pub fn current_child(&self, content: &Content) -> Option<(Component, Content)> {
        let surface = content.surface()?;
        let index = surface.active_index()?;
        let live = surface.live_list().into_iter().nth(index)?;
        // Live lists follow declared order, so the index usually lines up.
        let component = match self.children().get(index) {
            Some(c) if c.id() == live.tag() => c.clone(),
            _ => self.child(live.tag())?.clone(),
        };
        Some((component, live))
    }

    /// Chain of active components from this one down to the deepest
    pub fn active_chain(&self, content: &Content) -> Vec<(Component, Content)> {
        let mut chain = vec![(self.clone(), content.clone())];
        while let Some(next) = chain
            .last()
            .and_then(|(component, content)| component.current_child(content))
        {
            chain.push(next);
        }
        chain
    }

    /// Path of the active descendants below this component
    pub fn location(&self, content: &Content) -> Path {
        self.active_chain(content)
            .into_iter()
            .skip(1)
            .map(|(component, _)| Step::new(component.id().clone()))
            .collect()
    }
}

impl Declared for Component {
    fn identity(&self) -> &Identity {
        self.id()
    }
}
