//! Named worklists of exploration states.

use std::collections::BTreeMap;

/// States still being stepped along the trace.
pub const ACTIVE: &str = "active";
/// States that left the trace during the latest step.
pub const MISSED: &str = "missed";
/// States accepted as novel, satisfiable behavior.
pub const DIVERTED: &str = "diverted";
/// Missed states the filter rejected.
pub const PRUNED: &str = "pruned";

/// Named, ordered collections of states.
///
/// Engines may keep additional stashes under their own names.
#[derive(Debug, Clone)]
pub struct Stashes<S> {
    stashes: BTreeMap<String, Vec<S>>,
}

impl<S> Stashes<S> {
    /// Empty `active`, `missed`, `diverted` and `pruned` stashes.
    pub fn new() -> Self {
        let stashes = [ACTIVE, MISSED, DIVERTED, PRUNED]
            .into_iter()
            .map(|name| (name.to_string(), Vec::new()))
            .collect();
        Self { stashes }
    }

    /// Start with `states` in the active stash.
    pub fn with_active(states: Vec<S>) -> Self {
        let mut stashes = Self::new();
        stashes.stashes.insert(ACTIVE.to_string(), states);
        stashes
    }

    /// States in `name`; empty if the stash does not exist.
    pub fn get(&self, name: &str) -> &[S] {
        self.stashes.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Mutable access to `name`, creating it if needed.
    pub fn get_mut(&mut self, name: &str) -> &mut Vec<S> {
        self.stashes.entry(name.to_string()).or_default()
    }

    /// Remove and return every state in `name`, leaving it empty.
    pub fn take(&mut self, name: &str) -> Vec<S> {
        self.stashes
            .get_mut(name)
            .map(std::mem::take)
            .unwrap_or_default()
    }

    pub fn push(&mut self, name: &str, state: S) {
        self.get_mut(name).push(state);
    }

    /// Move every state from `from` to the end of `to`.
    pub fn move_all(&mut self, from: &str, to: &str) {
        let states = self.take(from);
        self.get_mut(to).extend(states);
    }

    pub fn len(&self, name: &str) -> usize {
        self.get(name).len()
    }

    pub fn is_empty(&self, name: &str) -> bool {
        self.get(name).is_empty()
    }

    pub fn active(&self) -> &[S] {
        self.get(ACTIVE)
    }

    pub fn missed(&self) -> &[S] {
        self.get(MISSED)
    }

    pub fn diverted(&self) -> &[S] {
        self.get(DIVERTED)
    }

    pub fn pruned(&self) -> &[S] {
        self.get(PRUNED)
    }

    /// Names of all stashes, in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.stashes.keys().map(String::as_str)
    }
}

impl<S> Default for Stashes<S> {
    fn default() -> Self {
        Self::new()
    }
}
