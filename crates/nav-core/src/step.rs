//! Step and path addressing
//!
//! A [`Step`] names one destination inside a container. A [`Path`] is the
//! ordered list of steps from the outermost container down to the leaf,
//! consumed one step per nesting level.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

// =============================================================================
// Identity
// =============================================================================

/// Stable identity of a destination
///
/// Compared by value only. Cloning is a reference-count bump.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(Arc<str>);

impl Identity {
    /// Create an identity from a string tag
    pub fn new(tag: impl AsRef<str>) -> Self {
        Self(Arc::from(tag.as_ref()))
    }

    /// Create an identity from a type tag
    pub fn of<T: ?Sized>() -> Self {
        Self::new(std::any::type_name::<T>())
    }

    /// Get the identity as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identity {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

impl From<String> for Identity {
    fn from(tag: String) -> Self {
        Self(Arc::from(tag))
    }
}

impl From<&Identity> for Identity {
    fn from(id: &Identity) -> Self {
        id.clone()
    }
}

// =============================================================================
// Step
// =============================================================================

fn default_animated() -> bool {
    true
}

/// A named destination with an optional payload
///
/// Equality and hashing look at `id` only; the payload rides along.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    /// Destination identity
    pub id: Identity,
    /// Data handed to the destination's screen on arrival
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    /// Whether the transition to this step should animate
    #[serde(default = "default_animated")]
    pub animated: bool,
}

impl Step {
    /// Create an animated step without payload
    pub fn new(id: impl Into<Identity>) -> Self {
        Self {
            id: id.into(),
            payload: None,
            animated: true,
        }
    }

    /// Attach a payload
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Set the animated flag
    pub fn animated(mut self, animated: bool) -> Self {
        self.animated = animated;
        self
    }

    /// Check whether this step addresses the given identity
    pub fn matches(&self, identity: &Identity) -> bool {
        &self.id == identity
    }
}

impl PartialEq for Step {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Step {}

impl Hash for Step {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl From<&str> for Step {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<Identity> for Step {
    fn from(id: Identity) -> Self {
        Self::new(id)
    }
}

// =============================================================================
// Path
// =============================================================================

/// Ordered sequence of steps, outermost container first
///
/// An empty path is already satisfied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path {
    steps: Vec<Step>,
}

impl Path {
    /// Create an empty path
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a path of plain steps from identities
    pub fn from_ids<I, T>(ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Identity>,
    {
        ids.into_iter().map(Step::new).collect()
    }

    /// Check if the path is empty
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Number of steps
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// All steps, outermost first
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Iterate over the steps
    pub fn iter(&self) -> std::slice::Iter<'_, Step> {
        self.steps.iter()
    }

    /// First step
    pub fn head(&self) -> Option<&Step> {
        self.steps.first()
    }

    /// Split into the first step and the remaining path
    pub fn head_and_rest(&self) -> Option<(Step, Path)> {
        let (head, rest) = self.steps.split_first()?;
        Some((
            head.clone(),
            Path {
                steps: rest.to_vec(),
            },
        ))
    }

    /// New path with `steps` placed in front of this one
    pub fn prepend<I>(&self, steps: I) -> Path
    where
        I: IntoIterator<Item = Step>,
    {
        let mut joined: Vec<Step> = steps.into_iter().collect();
        joined.extend(self.steps.iter().cloned());
        Path { steps: joined }
    }

    /// Append a step at the innermost end
    pub fn push(&mut self, step: Step) {
        self.steps.push(step);
    }

    /// Identities of every step, outermost first
    pub fn ids(&self) -> Vec<&Identity> {
        self.steps.iter().map(|s| &s.id).collect()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("/")?;
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{}", step.id)?;
        }
        Ok(())
    }
}

impl From<Vec<Step>> for Path {
    fn from(steps: Vec<Step>) -> Self {
        Self { steps }
    }
}

impl From<Step> for Path {
    fn from(step: Step) -> Self {
        Self { steps: vec![step] }
    }
}

impl<const N: usize> From<[&str; N]> for Path {
    fn from(ids: [&str; N]) -> Self {
        Path::from_ids(ids)
    }
}

impl FromIterator<Step> for Path {
    fn from_iter<I: IntoIterator<Item = Step>>(iter: I) -> Self {
        Self {
            steps: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Path {
    type Item = Step;
    type IntoIter = std::vec::IntoIter<Step>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.into_iter()
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a Step;
    type IntoIter = std::slice::Iter<'a, Step>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

// =============================================================================
// Tests
// =============================================================================
