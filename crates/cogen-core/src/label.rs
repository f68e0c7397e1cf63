//! The compile-time label-naming scheme (§4.4):
//!
//! ```text
//! newLabel(num, origLabel) := num "-" origLabel ("-" s)*   for s in sort(Δ)
//! ```
//!
//! and the handful of structural predicates over generated label
//! names that the transformer and its invariant checks (§8) rely on.

use cogen_par::Program;

use crate::delta::Delta;

pub const ENTRY: u8 = 0;
pub const TERMINAL: &str = "2";
pub const GUARD: u8 = 1;
pub const INIT: u8 = 3;
pub const BODY: u8 = 4;
pub const COPY: u8 = 5;

/// Build `num "-" orig "-" s1 "-" s2 ...` with `s_i` the sorted
/// members of Δ.
pub fn new_label(num: u8, orig: &str, delta: &Delta) -> String {
    let mut out = format!("{num}-{orig}");
    for s in delta.sorted_names() {
        out.push('-');
        out.push_str(&s);
    }
    out
}

/// Linear search of the extension program by label value (§4.4:
/// `existsLabel`).
pub fn exists_label(extension: &Program, label: &str) -> bool {
    extension.has_label(label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_scheme_matches_spec_example() {
        let mut delta = Delta::new();
        delta.insert("m");
        assert_eq!(new_label(GUARD, "ack", &delta), "1-ack-m");
        assert_eq!(new_label(INIT, "ack", &delta), "3-ack-m");
        assert_eq!(new_label(BODY, "ack", &delta), "4-ack-m");
    }

    #[test]
    fn label_scheme_is_insensitive_to_insertion_order() {
        let mut grown_then_shrunk = Delta::new();
        grown_then_shrunk.insert("a");
        grown_then_shrunk.remove("a");
        grown_then_shrunk.insert("m");

        let never_had_a = Delta::new();
        let mut never_had_a_with_m = never_had_a.clone();
        never_had_a_with_m.insert("m");

        assert_eq!(
            new_label(BODY, "ack", &grown_then_shrunk),
            new_label(BODY, "ack", &never_had_a_with_m)
        );
    }

    #[test]
    fn multiple_delta_members_sort_ascending_in_label() {
        let mut delta = Delta::new();
        delta.insert("n");
        delta.insert("m");
        assert_eq!(new_label(BODY, "l", &delta), "4-l-m-n");
    }
}
