//! Naming-policy heuristics inherited from the underlying IR convention.
//!
//! spec.md's Design Notes call these out as a smell and ask that they be
//! isolated behind a single module rather than scattered `str::find` calls
//! through the SL-CFG builder and dependence walker, as
//! `examples/original_source/DepAnalysis.cpp`/`PDG.cpp` do. Everything here
//! is a pure string-level convention, never IR-identity-based.

/// Strips a trailing `.addr` suffix some front-ends append to the alloca for
/// a by-reference parameter alias (`x.addr` for the storage backing `x`).
pub fn strip_addr_suffix(name: &str) -> &str {
    name.strip_suffix(".addr").unwrap_or(name)
}

/// Strips a trailing SSA version suffix (`.N` for a run of ASCII digits),
/// used to normalize two names that refer to the same source variable
/// across SSA renaming before comparing or emitting them (spec.md §6,
/// "Variable names ending in `.<digits>`... are normalized by stripping the
/// trailing `.N`").
pub fn strip_ssa_suffix(name: &str) -> &str {
    let Some(dot) = name.rfind('.') else {
        return name;
    };
    let suffix = &name[dot + 1..];
    if !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()) {
        &name[..dot]
    } else {
        name
    }
}

/// Normalizes a name for comparison/emission: first strips any `.addr`
/// suffix, then any `.N` SSA-version suffix.
pub fn normalize(name: &str) -> &str {
    strip_ssa_suffix(strip_addr_suffix(name))
}

/// Two names refer to the same source variable once SSA-version and
/// by-address-alias suffixes are stripped (spec.md invariant 2 in §8).
pub fn names_match(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}

/// Whether a basic block's name marks it as a loop-exit region, per
/// spec.md §4.4's `"for.end"` sink rule.
pub fn is_loop_exit_block(block_name: &str) -> bool {
    block_name.contains("for.end")
}

/// Whether a basic block's name marks it as a loop-condition block. Named
/// here only because spec.md §4.4 records it as part of the (superseded)
/// `for.cond`-promotion SL-CFG policy this crate does not implement — see
/// `DESIGN.md` Open Question 1. Kept so a future `SlcfgPolicy` variant can
/// be added without re-deriving the heuristic.
pub fn is_loop_cond_block(block_name: &str) -> bool {
    block_name.contains("for.cond")
}

/// Whether a basic block's name marks it as a loop-increment block. See
/// [`is_loop_cond_block`].
pub fn is_loop_inc_block(block_name: &str) -> bool {
    block_name.contains("for.inc")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_addr_suffix() {
        assert_eq!(strip_addr_suffix("x.addr"), "x");
        assert_eq!(strip_addr_suffix("x"), "x");
    }

    #[test]
    fn strips_ssa_suffix_only_when_all_digits() {
        assert_eq!(strip_ssa_suffix("s.3"), "s");
        assert_eq!(strip_ssa_suffix("s.addr"), "s.addr");
        assert_eq!(strip_ssa_suffix("s"), "s");
        assert_eq!(strip_ssa_suffix("arr.2.7"), "arr.2");
    }

    #[test]
    fn names_match_modulo_ssa_version() {
        assert!(names_match("s.1", "s.2"));
        assert!(!names_match("s.1", "t.1"));
    }

    #[test]
    fn loop_region_substring_checks() {
        assert!(is_loop_exit_block("for.end12"));
        assert!(!is_loop_exit_block("for.body"));
        assert!(is_loop_cond_block("for.cond"));
        assert!(is_loop_inc_block("for.inc"));
    }
}
