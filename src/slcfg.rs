//! SL-CFG Builder (spec.md §4.4): the sparse, debug-located-memory-access-
//! only successor graph the dependence walker traverses.
//!
//! Grounded on `examples/original_source/DepAnalysis.cpp::runOnFunction`'s
//! `add_first_successor_store_load_instructions` closure and its
//! entry/exit-connection loop.

use std::collections::HashSet;

use crate::ir::{BlockId, Function, InstId};
use crate::naming::is_loop_exit_block;
use crate::pdg::{DepKind, PdgNode, SlCfg, new_sentineled_graph};

/// spec.md §9 names three historical SL-CFG sentinel-attachment policies
/// and asks implementers to pick one and document it (Open Question 1).
/// This crate implements only the recommended one; see DESIGN.md. Kept as
/// an enum (rather than a bare function) so a future variant can be added
/// without changing the builder's call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlcfgPolicy {
    /// "No out-edges → EXIT" plus the `"for.end"`-substring sink rule.
    /// The superseded `for.cond`/`for.inc` promotion policies are not
    /// implemented.
    #[default]
    Recommended,
}

fn is_slcfg_node(func: &Function, id: InstId) -> bool {
    func.inst(id).is_slcfg_node()
}

fn first_qualifying_in_block(func: &Function, block: BlockId) -> Option<InstId> {
    func.block(block)
        .insts
        .iter()
        .copied()
        .find(|&id| is_slcfg_node(func, id))
}

/// Finds, for every successor of `block`, the first qualifying instruction
/// reachable from it — either the successor's own first qualifying
/// instruction, or (if it has none) the result of recursing into *its*
/// successors. Guarded against revisiting `origin` (spec.md §4.4: "guarded
/// against revisiting B itself to avoid trivial back-edges") and, more
/// generally, against revisiting any block already on this search's path,
/// so a cycle among qualifying-free blocks cannot loop forever.
fn collect_first_successors(
    func: &Function,
    block: BlockId,
    origin: BlockId,
    path: &mut HashSet<BlockId>,
    out: &mut Vec<InstId>,
) {
    for &succ in &func.block(block).successors {
        if succ == origin {
            continue;
        }
        if let Some(first) = first_qualifying_in_block(func, succ) {
            out.push(first);
            continue;
        }
        if path.insert(succ) {
            collect_first_successors(func, succ, origin, path, out);
        }
    }
}

/// Builds the SL-CFG for `func` under `policy`.
pub fn build_slcfg(func: &Function, policy: SlcfgPolicy) -> SlCfg {
    let SlcfgPolicy::Recommended = policy;
    let mut g = new_sentineled_graph();

    // Ensure every qualifying instruction is a node even if it ends up with
    // no intra/inter-block edges at all (still eligible for ENTRY/EXIT
    // sentinel connection below).
    for id in func.instructions_in_order() {
        if is_slcfg_node(func, id) {
            g.add_node(PdgNode::Real(id));
        }
    }

    for block in func.blocks_in_order() {
        let mut prev: Option<InstId> = None;
        for &id in &func.block(block).insts {
            if !is_slcfg_node(func, id) {
                continue;
            }
            if let Some(p) = prev {
                g.add_edge(PdgNode::Real(p), PdgNode::Real(id), DepKind::Ctr);
            }
            prev = Some(id);
        }

        if let Some(p) = prev {
            let mut found = Vec::new();
            collect_first_successors(func, block, block, &mut HashSet::new(), &mut found);
            for j in found {
                g.add_edge(PdgNode::Real(p), PdgNode::Real(j), DepKind::Ctr);
            }

            if func.block(block).successors.is_empty() && is_loop_exit_block(func.block(block).name())
            {
                g.add_edge(PdgNode::Real(p), PdgNode::Exit, DepKind::Ctr);
            }
        }
    }

    // Sentinel connection: every qualifying instruction with no in-edges
    // hangs off ENTRY; every one with no out-edges feeds EXIT.
    let node_ids: Vec<_> = g.node_ids().collect();
    for id in node_ids {
        let item = *g.node_item(id);
        if item.is_sentinel() {
            continue;
        }
        if !g.has_in_edges(id) {
            g.add_edge(PdgNode::Entry, item, DepKind::Ctr);
        }
        if !g.has_out_edges(id) {
            g.add_edge(item, PdgNode::Exit, DepKind::Ctr);
        }
    }

    g
}
