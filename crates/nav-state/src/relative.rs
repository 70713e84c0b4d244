//! Relative moves
//!
//! "Forward"/"back" by N are translated into an absolute path against the
//! nearest stack or tab container on the active chain, then resolved like any
//! other path.

use serde::{Deserialize, Serialize};

use nav_core::{Component, ComponentKind, Content, NavigationError, Path, Step};

/// A move relative to the current position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelativeMove {
    /// Move N children forward in declared order
    Forward(usize),
    /// Move N children back in declared order
    Back(usize),
}

/// Translate a relative move into an absolute path from the root
///
/// `chain` is the active chain starting at the root.
pub fn translate(chain: &[(Component, Content)], mv: RelativeMove) -> Result<Path, NavigationError> {
    let position = chain
        .iter()
        .rposition(|(component, _)| {
            matches!(
                component.kind(),
                ComponentKind::Sequential | ComponentKind::Exclusive
            )
        })
        .ok_or_else(|| NavigationError::NoRelativeTarget("no stack or tab container is active".to_string()))?;

    let (container, content) = &chain[position];
    let current = content
        .surface()
        .and_then(|surface| surface.active_index())
        .ok_or_else(|| NavigationError::NoRelativeTarget(format!("{} has no active child", container.id())))?;

    let target = match mv {
        RelativeMove::Forward(n) => current.checked_add(n),
        RelativeMove::Back(n) => current.checked_sub(n),
    }
    .and_then(|index| container.children().get(index))
    .ok_or_else(|| {
        NavigationError::NoRelativeTarget(format!(
            "{:?} from index {} is outside {}",
            mv,
            current,
            container.id()
        ))
    })?;

    let mut path: Path = chain[1..=position]
        .iter()
        .map(|(component, _)| Step::new(component.id().clone()))
        .collect();
    path.push(Step::new(target.id().clone()));
    Ok(path)
}
