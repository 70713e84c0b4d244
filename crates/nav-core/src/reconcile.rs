//! Container reconciliation
//!
//! Diffs a container's declared children against its live instances by
//! stable identity. Matched instances are reused as-is, missing ones are
//! created, and unreferenced ones are handed back as `dropped` so the
//! surface adapter decides their fate.
//!
//! Identity matching is by value equality only. When two declared entries
//! share an identity the first one claims the live instance and later
//! duplicates always get a fresh one.

use std::collections::HashSet;

use crate::step::Identity;

/// A declared entry with a stable identity
pub trait Declared {
    /// Identity of the declared entry
    fn identity(&self) -> &Identity;
}

/// A live instance tagged with the identity it was created for
pub trait Tagged {
    /// Identity tag of the instance
    fn tag(&self) -> &Identity;
}

/// Which part of the declared list a container keeps materialized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Span {
    /// Every declared entry
    Full,
    /// Declared entries up to and including the target
    UpToTarget,
}

/// Output of one reconciliation pass
#[derive(Debug, Clone)]
pub struct Reconciliation<L> {
    /// New live list, in declared order
    pub list: Vec<L>,
    /// Index of the target within `list`
    pub target: usize,
    /// Number of freshly created instances
    pub created: usize,
    /// Number of reused instances
    pub reused: usize,
    /// Live instances no longer referenced
    pub dropped: Vec<L>,
}

/// Reconcile `declared` against `live`, aiming at `target`
///
/// Returns `None` when `target` is not declared; nothing is created in that
/// case.
pub fn reconcile<D, L, F>(
    declared: &[D],
    live: &[L],
    target: &Identity,
    span: Span,
    mut create: F,
) -> Option<Reconciliation<L>>
where
    D: Declared,
    L: Tagged + Clone,
    F: FnMut(&D) -> L,
{
    let target_index = declared.iter().position(|d| d.identity() == target)?;
    let end = match span {
        Span::Full => declared.len(),
        Span::UpToTarget => target_index + 1,
    };

    let mut claimed: HashSet<&Identity> = HashSet::new();
    let mut used = vec![false; live.len()];
    let mut list = Vec::with_capacity(end);
    let mut created = 0;
    let mut reused = 0;

    for entry in &declared[..end] {
        let id = entry.identity();
        let existing = if claimed.insert(id) {
            live.iter().position(|instance| instance.tag() == id)
        } else {
            None
        };

        match existing {
            Some(index) => {
                used[index] = true;
                reused += 1;
                list.push(live[index].clone());
            }
            None => {
                created += 1;
                list.push(create(entry));
            }
        }
    }

    let dropped: Vec<L> = live
        .iter()
        .zip(&used)
        .filter(|(_, used)| !**used)
        .map(|(instance, _)| instance.clone())
        .collect();

    tracing::debug!(
        step = %target,
        target_index,
        created,
        reused,
        dropped = dropped.len(),
        "reconciled container"
    );

    Some(Reconciliation {
        list,
        target: target_index,
        created,
        reused,
        dropped,
    })
}
