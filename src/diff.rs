//! Link set comparison.
//!
//! Pure set algebra over the current and previous link sets. No I/O, no
//! logging; the caller owns both sets and decides what the result means.

use std::collections::HashSet;

/// Partition of the current link set relative to the previous run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkDiff {
    /// Links present now but not in the previous run.
    pub new: HashSet<String>,
    /// Links present in both runs.
    pub retained: HashSet<String>,
}

/// Compares the current link set against the previous run's set.
///
/// `new` is `current - previous`, `retained` is `current ∩ previous`; the two
/// partition `current`. Links that vanished since the previous run are simply
/// absent (the snapshot is replaced wholesale, not appended to).
///
/// # Arguments
///
/// * `current` - Links discovered in this run
/// * `previous` - Links loaded from the snapshot
pub fn diff_links(current: &HashSet<String>, previous: &HashSet<String>) -> LinkDiff {
    let new = current.difference(previous).cloned().collect();
    let retained = current.intersection(previous).cloned().collect();
    LinkDiff { new, retained }
}
