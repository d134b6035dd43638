//! The Program Dependence Graph: a [`Graph`] over [`PdgNode`] with
//! synthetic ENTRY/EXIT sentinels and typed dependence edges.
//!
//! Grounded on `examples/original_source/PDG.h`'s `EdgeDepType` taxonomy and
//! `(Instruction*)ENTRY = 1000000`/`(Instruction*)EXIT = 2000000` sentinel
//! pointers — spec.md's Design Notes explicitly ask that a reimplementation
//! model these as a tagged variant rather than pointer-casting integers,
//! which is exactly what [`PdgNode`] is.

use serde::{Deserialize, Serialize};

use crate::graph::Graph;
use crate::ir::InstId;

/// A PDG/SL-CFG node: either a sentinel or a real instruction. spec.md §3:
/// "Every PDG node is either ENTRY, EXIT, or a load/store/declaration with
/// a debug location."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PdgNode {
    Entry,
    Exit,
    Real(InstId),
}

impl PdgNode {
    pub fn as_inst(self) -> Option<InstId> {
        match self {
            PdgNode::Real(id) => Some(id),
            _ => None,
        }
    }

    pub fn is_sentinel(self) -> bool {
        matches!(self, PdgNode::Entry | PdgNode::Exit)
    }
}

/// Dependence edge classification. spec.md §3: "`DepKind ∈ { RAR, RAW,
/// RAW_loop_carried (RAW*), WAW, WAR, CTR, PARENT, SCA }`. The dependence
/// walker emits only RAW/WAR/WAW; the SL-CFG edges are all CTR. RAR and
/// PARENT/SCA kinds exist in the taxonomy for downstream consumers but are
/// not produced here."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DepKind {
    /// Read-after-read (input dependence). Never produced by this crate.
    Rar,
    /// Read-after-write (flow dependence).
    Raw,
    /// Read-after-write, loop-carried (`RAW*`). Distinguished from `Raw`
    /// only when the oracle itself reports the dependence as loop-carried;
    /// this crate's own walker does not infer loop-carriedness (spec.md
    /// §1 Non-goals), so it is produced only if `DependenceOracle::query`
    /// returns it directly (see `crate::oracle::DepResult`... the oracle
    /// contract in spec.md §4.5 has no loop-carried variant, so in
    /// practice this crate never emits it; kept in the taxonomy for
    /// downstream consumers per spec.md §3).
    RawLoopCarried,
    /// Write-after-write (output dependence).
    Waw,
    /// Write-after-read (anti dependence).
    War,
    /// Control-successor edge (SL-CFG edges are all this kind).
    Ctr,
    /// Structural parent edge. Never produced by this crate.
    Parent,
    /// Scalar-evolution-derived edge. Never produced by this crate.
    Sca,
}

impl DepKind {
    /// Short label matching `DepAnalysis.cpp`/`PDG.cpp`'s `edgeLabel`, used
    /// verbatim by the DOT and depmap emitters (spec.md §6 formats must be
    /// preserved bit-exactly).
    pub fn label(self) -> &'static str {
        match self {
            DepKind::Rar => "RAR",
            DepKind::RawLoopCarried => "RAW*",
            DepKind::Waw => "WAW",
            DepKind::Raw => "RAW",
            DepKind::War => "WAR",
            DepKind::Ctr => "CTR",
            DepKind::Parent => "PARENT",
            DepKind::Sca => "SCA",
        }
    }
}

/// `Graph<Instruction, DepKind>` augmented with ENTRY/EXIT, per spec.md §3.
pub type Pdg = Graph<PdgNode, DepKind>;

/// `Graph<Instruction, CTR>` restricted to debug-located memory accesses
/// and declarations (spec.md §4.4). Uses the same node/edge types as the
/// PDG so "SL-CFG and PDG share the same node identities where both
/// contain the same I" (spec.md §3 invariant) holds trivially — both are
/// keyed on the same `PdgNode`.
pub type SlCfg = Graph<PdgNode, DepKind>;

/// Convenience constructor: a fresh graph with ENTRY and EXIT already
/// present, matching `PDG::PDG(fName, F)` eagerly adding both sentinels.
pub fn new_sentineled_graph() -> Pdg {
    let mut g = Pdg::new();
    g.add_node(PdgNode::Entry);
    g.add_node(PdgNode::Exit);
    g
}
