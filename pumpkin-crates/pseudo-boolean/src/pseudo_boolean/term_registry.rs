use log::debug;
use log::trace;

use super::term::structural_hash;
use super::Term;
use super::TermHandle;
use super::TermId;
use crate::basic_types::PseudoBooleanError;
use crate::containers::HashMap;
use crate::containers::KeyedVec;
use crate::engine::AndConstraintFlags;
use crate::engine::Problem;
use crate::engine::VariableId;
use crate::pumpkin_assert_advanced;
use crate::pumpkin_assert_moderate;

/// The hash-consing table of the AND-terms of one [`PseudoBooleanHandler`].
///
/// Every distinct sorted variable set is represented by exactly one live [`Term`]; terms are
/// additionally indexed by their resultant.
///
/// [`PseudoBooleanHandler`]: crate::PseudoBooleanHandler
#[derive(Debug)]
pub struct TermRegistry {
    terms: KeyedVec<TermId, Term>,
    buckets: HashMap<u64, Vec<TermId>>,
    resultants: HashMap<VariableId, TermId>,
    and_constraint_flags: AndConstraintFlags,
}

impl TermRegistry {
    pub(crate) fn new(capacity: usize, and_constraint_flags: AndConstraintFlags) -> TermRegistry {
        let mut buckets = HashMap::default();
        buckets.reserve(capacity);

        TermRegistry {
            terms: KeyedVec::default(),
            buckets,
            resultants: HashMap::default(),
            and_constraint_flags,
        }
    }

    /// Returns a handle to the term over the given sorted, duplicate-free variables, creating the
    /// term (with a fresh resultant and AND-constraint) if it does not exist yet.
    ///
    /// The boolean is true if the term was created.
    pub(crate) fn find_or_create(
        &mut self,
        problem: &mut Problem,
        variables: &[VariableId],
    ) -> Result<(TermHandle, bool), PseudoBooleanError> {
        pumpkin_assert_moderate!(!variables.is_empty());
        pumpkin_assert_advanced!(variables.windows(2).all(|pair| pair[0] < pair[1]));

        let key = structural_hash(variables);
        let existing = self.buckets.get(&key).and_then(|bucket| {
            bucket
                .iter()
                .copied()
                .find(|&id| self.terms[id].committed == variables)
        });

        if let Some(id) = existing {
            self.terms[id].use_count += 1;
            return Ok((TermHandle::new(id), false));
        }

        let mut committed = Vec::new();
        committed.try_reserve_exact(variables.len())?;
        committed.extend_from_slice(variables);

        let number = problem.num_and_constraints();
        let resultant = problem.new_artificial_variable(format!("andresultant_{number}"), -1);
        let carrier = problem.create_and_constraint(
            format!("andcons_{number}"),
            resultant,
            committed.clone(),
            self.and_constraint_flags,
        );

        problem.capture_variable(resultant);
        for &variable in &committed {
            problem.capture_variable(variable);
        }

        let id = self.terms.push(Term {
            carrier,
            resultant,
            committed,
            pending: None,
            use_count: 1,
            key,
            deleted: false,
        });

        pumpkin_assert_moderate!(
            !self.resultants.contains_key(&resultant),
            "resultant is already mapped to a term"
        );
        let _ = self.resultants.insert(resultant, id);
        self.buckets.entry(key).or_default().push(id);

        trace!("created term {id} with resultant {resultant}");

        Ok((TermHandle::new(id), true))
    }

    /// Returns another handle to the term with the given resultant, if it exists.
    pub(crate) fn share(&mut self, resultant: VariableId) -> Option<TermHandle> {
        let id = self.lookup_resultant(resultant)?;
        self.terms[id].use_count += 1;
        Some(TermHandle::new(id))
    }

    /// Gives back a handle. When the last handle of a term is released, the term is deleted
    /// together with its AND-constraint.
    ///
    /// Returns whether the term was deleted.
    pub(crate) fn release(&mut self, problem: &mut Problem, handle: TermHandle) -> bool {
        let id = handle.id();
        let term = &mut self.terms[id];
        if term.deleted {
            // The registry was cleared while the handle was still held.
            return false;
        }

        pumpkin_assert_moderate!(term.use_count > 0);
        term.use_count -= 1;
        if term.use_count > 0 {
            return false;
        }

        self.delete(problem, id);
        true
    }

    fn delete(&mut self, problem: &mut Problem, id: TermId) {
        let term = &mut self.terms[id];
        term.deleted = true;
        term.use_count = 0;
        term.pending = None;
        let committed = std::mem::take(&mut term.committed);
        let (resultant, carrier, key) = (term.resultant, term.carrier, term.key);

        for variable in committed {
            problem.release_variable(variable);
        }
        problem.release_variable(resultant);
        problem.delete_and_constraint(carrier);

        let _ = self.resultants.remove(&resultant);
        self.remove_from_bucket(id, key);

        trace!("deleted term {id}");
    }

    fn remove_from_bucket(&mut self, id: TermId, key: u64) {
        if let Some(bucket) = self.buckets.get_mut(&key) {
            bucket.retain(|&other| other != id);
            if bucket.is_empty() {
                let _ = self.buckets.remove(&key);
            }
        }
    }

    /// Finds the live term with the given resultant.
    pub fn lookup_resultant(&self, resultant: VariableId) -> Option<TermId> {
        self.resultants.get(&resultant).copied()
    }

    pub fn term(&self, id: TermId) -> &Term {
        &self.terms[id]
    }

    pub(crate) fn term_of(&self, handle: &TermHandle) -> &Term {
        &self.terms[handle.id()]
    }

    /// Iterates over the live terms.
    pub fn terms(&self) -> impl Iterator<Item = (TermId, &Term)> {
        self.terms.iter_with_keys().filter(|(_, term)| !term.deleted)
    }

    pub fn num_live_terms(&self) -> usize {
        self.resultants.len()
    }

    /// Reads the current variables of the AND-constraint of every live term and stores them as
    /// pending when they differ from the committed ones.
    pub(crate) fn compute_changes(&mut self, problem: &mut Problem) -> usize {
        let mut changed_terms = 0;

        for id in self.terms.keys() {
            if self.terms[id].deleted {
                continue;
            }

            let carrier = self.terms[id].carrier;
            let pending = if problem.and_constraint(carrier).is_deleted() {
                Some(vec![])
            } else {
                problem.sort_and_constraint(carrier);
                let variables = problem.and_constraint(carrier).variables();
                (variables != self.terms[id].committed).then(|| variables.to_vec())
            };

            if pending.is_some() {
                changed_terms += 1;
            }
            self.terms[id].pending = pending;
        }

        if changed_terms > 0 {
            debug!("{changed_terms} AND-terms changed");
        }

        changed_terms
    }

    /// Makes the pending variables of every term the committed ones, moving the variable
    /// captures along and re-keying the hash-consing table.
    pub(crate) fn commit_changes(&mut self, problem: &mut Problem) {
        for id in self.terms.keys() {
            let term = &mut self.terms[id];
            if term.deleted {
                continue;
            }
            let Some(pending) = term.pending.take() else {
                continue;
            };

            pumpkin_assert_moderate!(
                !pending.is_empty(),
                "a vanished term is still referenced by a constraint"
            );

            let diff = super::TermDiff::between(&term.committed, &pending);
            for &variable in &diff.added {
                problem.capture_variable(variable);
            }
            for &variable in &diff.removed {
                problem.release_variable(variable);
            }

            let old_key = term.key;
            term.committed = pending;
            term.key = structural_hash(&term.committed);
            let new_key = term.key;

            if old_key != new_key {
                self.remove_from_bucket(id, old_key);
                self.buckets.entry(new_key).or_default().push(id);
            }
        }

        pumpkin_assert_moderate!(self.is_consistent());
    }

    /// Deletes every term regardless of its use count.
    pub(crate) fn clear(&mut self, problem: &mut Problem) {
        for id in self.terms.keys() {
            if !self.terms[id].deleted {
                self.delete(problem, id);
            }
        }
        pumpkin_assert_moderate!(self.resultants.is_empty() && self.buckets.is_empty());
    }

    fn is_consistent(&self) -> bool {
        self.terms().all(|(id, term)| {
            term.use_count > 0
                && term.pending.is_none()
                && self.resultants.get(&term.resultant) == Some(&id)
                && self
                    .buckets
                    .get(&term.key)
                    .is_some_and(|bucket| bucket.contains(&id))
        })
    }

    /// Returns the live terms which represent the same product as another live term.
    pub fn structural_duplicates(&self) -> Vec<(TermId, TermId)> {
        let mut duplicates = vec![];
        for bucket in self.buckets.values() {
            for (position, &first) in bucket.iter().enumerate() {
                for &second in &bucket[position + 1..] {
                    if self.terms[first].is_structurally_equal(&self.terms[second]) {
                        duplicates.push((first, second));
                    }
                }
            }
        }
        duplicates
    }
}
