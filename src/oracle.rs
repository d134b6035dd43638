//! The Dependence Oracle Adapter (spec.md §4.5): a thin, consumed interface
//! to an external scalar dependence analyzer.
//!
//! Grounded on `examples/original_source/PDG.h`'s `DependenceInfo *DI` field
//! and `DepAnalysis.cpp::recursiveDepFinderHelper2`'s `DI->depends(C, I,
//! true)` call, whose `isOutput`/`isFlow`/`isAnti` checks become the
//! [`DepResult`] variants below. This crate never implements alias/scalar
//! dependence analysis itself (spec.md §1 Non-goals); it only consumes one.

use crate::ir::InstId;

/// The oracle's answer for a directed instruction pair `(src, dst)`.
/// Standard reading: `Flow` is RAW, `Anti` is WAR, `Output` is WAW, `Input`
/// is RAR (never turned into a PDG edge by this crate's walker).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DepResult {
    Output,
    Flow,
    Anti,
    Input,
    None,
}

/// An external, conservative, query-per-pair scalar dependence analyzer.
///
/// Contract (spec.md §4.5): queried with a *directed* pair, `src` earlier in
/// program order reaching `dst` via the SL-CFG's backward traversal; may be
/// pessimistic (report a dependence that does not exist) but must never be
/// optimistic (miss a real one). Assumed `O(1)` amortized and safe for
/// concurrent read-only access (spec.md §5) — hence `Send + Sync`.
pub trait DependenceOracle: Send + Sync {
    fn query(&self, src: InstId, dst: InstId) -> DepResult;
}

/// A test double that always reports no dependence. Useful for exercising
/// the walker's traversal/early-return shape in isolation from any real
/// scalar analysis.
#[derive(Debug, Default)]
pub struct NullOracle;

impl DependenceOracle for NullOracle {
    fn query(&self, _src: InstId, _dst: InstId) -> DepResult {
        DepResult::None
    }
}

/// A test double programmed with exact per-pair verdicts, defaulting to
/// `None` for any pair not explicitly registered. Named "conservative"
/// because an un-programmed pair answers `None` rather than guessing —
/// the opposite direction of pessimism from a real oracle, but the right
/// default for deterministic fixture-driven tests (spec.md §8).
#[derive(Debug, Default)]
pub struct ConservativeOracle {
    verdicts: std::collections::HashMap<(InstId, InstId), DepResult>,
}

impl ConservativeOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the verdict for the directed pair `(src, dst)`.
    pub fn set(&mut self, src: InstId, dst: InstId, result: DepResult) -> &mut Self {
        self.verdicts.insert((src, dst), result);
        self
    }
}

impl DependenceOracle for ConservativeOracle {
    fn query(&self, src: InstId, dst: InstId) -> DepResult {
        self.verdicts
            .get(&(src, dst))
            .copied()
            .unwrap_or(DepResult::None)
    }
}
