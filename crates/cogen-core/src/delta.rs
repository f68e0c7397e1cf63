//! Binding-time state: Δ, the set of identifier names classified as
//! static at the current program point (§3, §4.4).
//!
//! Backed by a `BTreeSet` rather than a hash set so that iteration —
//! used directly by the label-naming scheme — is always sorted
//! ascending without an extra sort step (§9: "use an ordered
//! container... so iteration for label construction is deterministic").

use std::collections::BTreeSet;
use std::fmt;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Delta(BTreeSet<String>);

impl Delta {
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    pub fn from_names<I: IntoIterator<Item = String>>(names: I) -> Self {
        Self(names.into_iter().collect())
    }

    pub fn insert(&mut self, name: impl Into<String>) {
        self.0.insert(name.into());
    }

    pub fn remove(&mut self, name: &str) {
        self.0.remove(name);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    /// Sorted (ascending) names, for label construction (§4.4).
    pub fn sorted_names(&self) -> Vec<String> {
        self.0.iter().cloned().collect()
    }

    /// True iff every name in `names` is in Δ (used by §4.6's `V ⊆ Δ`
    /// and `W ⊆ Δ` checks).
    pub fn is_superset_of(&self, names: &[String]) -> bool {
        names.iter().all(|n| self.0.contains(n))
    }

    /// A copy of the current Δ, to be restored after a branch (§3,
    /// §9's snapshot discipline).
    pub fn snapshot(&self) -> Delta {
        self.clone()
    }

    pub fn restore(&mut self, snapshot: Delta) {
        *self = snapshot;
    }
}

impl fmt::Display for Delta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.sorted_names().join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_then_remove_matches_never_present() {
        let mut grown = Delta::new();
        grown.insert("a");
        grown.remove("a");

        let empty = Delta::new();
        assert_eq!(grown.sorted_names(), empty.sorted_names());
    }

    #[test]
    fn sorted_names_are_ascending() {
        let mut d = Delta::new();
        d.insert("n");
        d.insert("m");
        assert_eq!(d.sorted_names(), vec!["m".to_string(), "n".to_string()]);
    }

    #[test]
    fn snapshot_restore_round_trip() {
        let mut d = Delta::new();
        d.insert("m");
        let snap = d.snapshot();
        d.insert("n");
        assert!(d.contains("n"));
        d.restore(snap);
        assert!(!d.contains("n"));
        assert!(d.contains("m"));
    }
}
