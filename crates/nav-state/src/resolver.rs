//! Path resolution against the live tree
//!
//! A request runs in three phases:
//!
//! 1. Pick the start node on the active chain and validate the whole path
//!    against the declarative tree. Nothing is mutated if any step is
//!    unreachable.
//! 2. Reconcile every hop top-down. New instances are created here.
//! 3. Commit the surfaces innermost-first, awaiting each platform transition.

use nav_core::{
    Component, ComponentKind, Content, Delivery, Environment, FinishedGesture, NavigationError, Path,
    PendingCommit, Step,
};

use crate::config::{NavigatorConfig, ResolutionOrder};
use crate::relative::{self, RelativeMove};

/// What a request asks for
#[derive(Debug, Clone)]
pub enum Target {
    /// An explicit path, absolute or relative to the current position
    Path(Path),
    /// A move relative to the current position
    Relative(RelativeMove),
    /// The commit of a finished interactive transition
    Gesture(FinishedGesture),
}

/// Where resolution may start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Anchor {
    /// Choose per [`ResolutionOrder`]
    Auto,
    /// Always the root
    Root,
}

/// Outcome of a successful request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationReport {
    /// Location after the request
    pub location: Path,
    /// Instances created
    pub created: usize,
    /// Instances reused
    pub reused: usize,
}

/// Owns the root instance and resolves requests against it
pub(crate) struct Resolver {
    root: Component,
    content: Content,
    env: Environment,
    config: NavigatorConfig,
}

impl Resolver {
    pub(crate) fn new(root: Component, env: Environment, config: NavigatorConfig) -> Self {
        let content = root.create(&env);
        Self {
            root,
            content,
            env,
            config,
        }
    }

    pub(crate) fn root_content(&self) -> &Content {
        &self.content
    }

    pub(crate) fn location(&self) -> Path {
        self.root.location(&self.content)
    }

    pub(crate) async fn execute(&self, target: &Target) -> Result<NavigationReport, NavigationError> {
        match target {
            Target::Path(path) => self.resolve(path, Anchor::Auto).await,
            Target::Relative(mv) => {
                let chain = self.root.active_chain(&self.content);
                let path = relative::translate(&chain, *mv)?;
                tracing::debug!(?mv, path = %path, "translated relative move");
                self.resolve(&path, Anchor::Root).await
            }
            Target::Gesture(gesture) => {
                gesture.clone().apply().await?;
                Ok(NavigationReport {
                    location: self.location(),
                    created: 0,
                    reused: 0,
                })
            }
        }
    }

    async fn resolve(&self, path: &Path, anchor: Anchor) -> Result<NavigationReport, NavigationError> {
        let Some(head) = path.head() else {
            return Ok(NavigationReport {
                location: self.location(),
                created: 0,
                reused: 0,
            });
        };

        let start = self.start(head, path, anchor)?;
        tracing::debug!(start = %start.0.id(), path = %path, "resolving");

        // Reconcile every hop before anything is committed.
        let mut node = start;
        let mut remaining = path.clone();
        let mut commits: Vec<PendingCommit> = Vec::new();
        let mut deliveries: Vec<Delivery> = Vec::new();
        let mut created = 0;
        let mut reused = 0;

        while let Some((step, rest)) = remaining.head_and_rest() {
            let step = self.effective(step);
            let prepared = node
                .0
                .prepare(&step, &node.1, &self.env)
                .ok_or_else(|| NavigationError::unreachable(&step.id))?;

            created += prepared.created;
            reused += prepared.reused;
            commits.extend(prepared.commit);
            deliveries.extend(prepared.delivery);
            if prepared.consumed {
                remaining = rest;
            }

            match prepared.target {
                Some(next) => node = next,
                None if remaining.is_empty() => break,
                None => {
                    let step = remaining.head().map(|s| s.id.clone()).unwrap_or(step.id);
                    return Err(NavigationError::Unreachable { step });
                }
            }
        }

        for commit in commits.into_iter().rev() {
            commit.apply().await?;
        }
        for delivery in deliveries {
            delivery.deliver(self.env.host().as_ref());
        }

        Ok(NavigationReport {
            location: self.location(),
            created,
            reused,
        })
    }

    /// Choose the node where resolution of `path` starts
    ///
    /// Candidates on the active chain are tried in resolution order; the
    /// first one that can take the whole path wins.
    fn start(&self, head: &Step, path: &Path, anchor: Anchor) -> Result<(Component, Content), NavigationError> {
        let chain = self.root.active_chain(&self.content);
        let order = match anchor {
            Anchor::Root => ResolutionOrder::RootFirst,
            Anchor::Auto => self.config.resolution,
        };
        let candidates: Vec<(Component, Content)> = match order {
            ResolutionOrder::CurrentFirst => chain.into_iter().rev().collect(),
            ResolutionOrder::RootFirst => chain,
        };

        let mut failure = None;
        for (component, content) in candidates {
            if !component.reaches(head) {
                continue;
            }
            match validate(&component, path) {
                Ok(()) => return Ok((component, content)),
                Err(e) => {
                    tracing::debug!(start = %component.id(), error = %e, "start cannot take path");
                    failure.get_or_insert(e);
                }
            }
        }
        Err(failure.unwrap_or_else(|| NavigationError::unreachable(&head.id)))
    }

    fn effective(&self, step: Step) -> Step {
        if self.config.animations {
            step
        } else {
            step.animated(false)
        }
    }
}

/// Walk the declarative tree along `path` without touching live state
fn validate(start: &Component, path: &Path) -> Result<(), NavigationError> {
    let mut node = start.clone();
    let mut steps = path.iter().peekable();

    while let Some(step) = steps.peek() {
        if let Some((index, consumed)) = node.route(step) {
            if consumed {
                steps.next();
            }
            node = node.children()[index].clone();
        } else if node.kind() == ComponentKind::Leaf && step.matches(node.id()) {
            steps.next();
        } else {
            return Err(NavigationError::unreachable(&step.id));
        }
    }
    Ok(())
}
