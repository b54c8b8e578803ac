use std::cmp::Ordering;
use std::fmt::Display;
use std::fmt::Formatter;

use crate::containers::StorageKey;
use crate::engine::AndConstraintId;
use crate::engine::VariableId;

/// Identifies a [`Term`] in the [`TermRegistry`](super::TermRegistry).
///
/// Ids are never reused, a deleted term keeps its slot.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct TermId(pub(crate) u32);

impl Display for TermId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "t{}", self.0)
    }
}

impl StorageKey for TermId {
    fn index(&self) -> usize {
        self.0 as usize
    }

    fn create_from_index(index: usize) -> Self {
        TermId(index as u32)
    }
}

/// A reference to a [`Term`] held by a pseudo-boolean constraint.
///
/// A handle can only be obtained from [`TermRegistry::find_or_create`] or
/// [`TermRegistry::share`], which increment the use count, and can only be given back through
/// [`TermRegistry::release`], which decrements it.
///
/// [`TermRegistry::find_or_create`]: super::TermRegistry::find_or_create
/// [`TermRegistry::share`]: super::TermRegistry::share
/// [`TermRegistry::release`]: super::TermRegistry::release
#[allow(
    missing_copy_implementations,
    reason = "every handle stands for one unit of the use count"
)]
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a term handle has to be released"]
pub struct TermHandle {
    id: TermId,
}

impl TermHandle {
    pub(crate) fn new(id: TermId) -> TermHandle {
        TermHandle { id }
    }

    pub fn id(&self) -> TermId {
        self.id
    }
}

/// A distinct AND-term `x_1 * ... * x_n`, shared by every pseudo-boolean constraint which
/// contains it.
#[derive(Clone, Debug)]
pub struct Term {
    pub(crate) carrier: AndConstraintId,
    pub(crate) resultant: VariableId,
    /// Sorted and duplicate-free; these are the variables the locks have been installed on
    pub(crate) committed: Vec<VariableId>,
    /// The variables read from the carrier when they differ from `committed`
    pub(crate) pending: Option<Vec<VariableId>>,
    pub(crate) use_count: u32,
    /// The key of the hash-consing bucket the term is stored in
    pub(crate) key: u64,
    pub(crate) deleted: bool,
}

impl Term {
    pub fn carrier(&self) -> AndConstraintId {
        self.carrier
    }

    pub fn resultant(&self) -> VariableId {
        self.resultant
    }

    pub fn variables(&self) -> &[VariableId] {
        &self.committed
    }

    pub fn pending_variables(&self) -> Option<&[VariableId]> {
        self.pending.as_deref()
    }

    /// The variables the term currently consists of: the pending ones if a change was captured,
    /// the committed ones otherwise.
    pub fn current_variables(&self) -> &[VariableId] {
        self.pending.as_deref().unwrap_or(&self.committed)
    }

    pub fn use_count(&self) -> u32 {
        self.use_count
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Whether all variables of the term disappeared, or its carrier was deleted.
    pub fn has_vanished(&self) -> bool {
        matches!(&self.pending, Some(pending) if pending.is_empty())
    }

    pub fn diff(&self) -> TermDiff {
        match &self.pending {
            Some(pending) => TermDiff::between(&self.committed, pending),
            None => TermDiff {
                removed: vec![],
                kept: self.committed.clone(),
                added: vec![],
            },
        }
    }

    /// Whether two terms represent the same product.
    pub(crate) fn is_structurally_equal(&self, other: &Term) -> bool {
        self.committed.len() == other.committed.len()
            && (self.carrier == other.carrier || self.committed == other.committed)
    }
}

/// Computes the key of the hash-consing bucket of a sorted variable list.
pub(crate) fn structural_hash(variables: &[VariableId]) -> u64 {
    let count = variables.len() as u64;
    let index = |position: usize| {
        variables
            .get(position)
            .map_or(0, |variable| variable.index() as u64)
    };
    let first = index(0);
    let middle = index(variables.len() / 2);
    let last = index(variables.len().saturating_sub(1));

    (count << 29)
        .wrapping_add(first << 22)
        .wrapping_add(middle << 11)
        .wrapping_add(last)
}

/// The difference between the committed and the pending variables of a [`Term`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TermDiff {
    pub removed: Vec<VariableId>,
    pub kept: Vec<VariableId>,
    pub added: Vec<VariableId>,
}

impl TermDiff {
    /// Merge-joins two sorted variable lists.
    pub fn between(old: &[VariableId], new: &[VariableId]) -> TermDiff {
        let mut diff = TermDiff::default();
        let mut old_index = 0;
        let mut new_index = 0;

        while old_index < old.len() && new_index < new.len() {
            match old[old_index].cmp(&new[new_index]) {
                Ordering::Less => {
                    diff.removed.push(old[old_index]);
                    old_index += 1;
                }
                Ordering::Greater => {
                    diff.added.push(new[new_index]);
                    new_index += 1;
                }
                Ordering::Equal => {
                    diff.kept.push(old[old_index]);
                    old_index += 1;
                    new_index += 1;
                }
            }
        }
        diff.removed.extend_from_slice(&old[old_index..]);
        diff.added.extend_from_slice(&new[new_index..]);

        diff
    }

    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variables(indices: &[u32]) -> Vec<VariableId> {
        indices.iter().map(|&index| VariableId(index)).collect()
    }

    #[test]
    fn diff_splits_removed_kept_and_added() {
        let diff = TermDiff::between(&variables(&[1, 3, 5, 7]), &variables(&[2, 3, 7, 8]));

        assert_eq!(diff.removed, variables(&[1, 5]));
        assert_eq!(diff.kept, variables(&[3, 7]));
        assert_eq!(diff.added, variables(&[2, 8]));
        assert!(!diff.is_empty());
    }

    #[test]
    fn diff_of_identical_lists_is_empty() {
        let diff = TermDiff::between(&variables(&[1, 2]), &variables(&[1, 2]));

        assert!(diff.is_empty());
        assert_eq!(diff.kept, variables(&[1, 2]));
    }

    #[test]
    fn diff_against_nothing_removes_everything() {
        let diff = TermDiff::between(&variables(&[4, 6]), &[]);

        assert_eq!(diff.removed, variables(&[4, 6]));
        assert!(diff.kept.is_empty());
        assert!(diff.added.is_empty());
    }

    #[test]
    fn structural_hash_uses_count_and_extremes() {
        let hash = structural_hash(&variables(&[1, 2, 3]));

        assert_eq!(hash, (3 << 29) + (1 << 22) + (2 << 11) + 3);
        assert_ne!(hash, structural_hash(&variables(&[1, 3])));
    }
}
