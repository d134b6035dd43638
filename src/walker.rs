//! Recursive Dependence Walker (spec.md §4.6), implemented as an explicit
//! work-list rather than native recursion, per spec.md §9 Design Notes:
//! "For large functions... must either be converted to an explicit
//! work-list with an explicit visited set, or the host must provide
//! sufficient stack" — this crate takes the first option unconditionally.
//!
//! Grounded on `examples/original_source/DepAnalysis.cpp::
//! recursiveDepFinder`/`recursiveDepFinderHelper1`/`recursiveDepFinderHelper2`.

use std::collections::HashSet;

use crate::graph::GraphNodeId;
use crate::ir::{Function, InstId};
use crate::oracle::{DepResult, DependenceOracle};
use crate::pdg::{DepKind, Pdg, PdgNode, SlCfg, new_sentineled_graph};

/// Populates a fresh PDG's RAW/WAR/WAW edges by walking `slcfg` backwards
/// from EXIT.
pub fn walk_dependences(func: &Function, slcfg: &SlCfg, oracle: &dyn DependenceOracle) -> Pdg {
    let mut pdg = new_sentineled_graph();

    let Some(exit_id) = slcfg.node_index(PdgNode::Exit) else {
        return pdg;
    };

    // Outer walk: every SL-CFG node is the anchor of an inner walk at most
    // once (`already_outer_checked`), starting from EXIT's predecessors.
    let mut already_outer_checked: HashSet<GraphNodeId> = HashSet::new();
    let mut stack: Vec<GraphNodeId> = slcfg
        .in_edges(exit_id)
        .iter()
        .map(|&(src, _)| src)
        .collect();

    while let Some(node_id) = stack.pop() {
        if !already_outer_checked.insert(node_id) {
            continue;
        }
        if let PdgNode::Real(inst_id) = *slcfg.node_item(node_id) {
            if func.inst(inst_id).is_memory_access() {
                inner_walk(func, slcfg, oracle, inst_id, node_id, &mut pdg);
            }
        }
        for &(pred_id, _) in slcfg.in_edges(node_id) {
            if !already_outer_checked.contains(&pred_id) {
                stack.push(pred_id);
            }
        }
    }

    pdg
}

/// Inner walk for one anchor instruction: walks SL-CFG predecessors with a
/// fresh `already_inner_checked` set, cutting each branch at the nearest
/// dominating definition/use (an ENTRY boundary, a shadowing declaration, or
/// a positive oracle answer).
fn inner_walk(
    func: &Function,
    slcfg: &SlCfg,
    oracle: &dyn DependenceOracle,
    anchor_inst: InstId,
    anchor_node: GraphNodeId,
    pdg: &mut Pdg,
) {
    let anchor_addr = func.inst(anchor_inst).address_operand();
    let mut already_inner_checked: HashSet<GraphNodeId> = HashSet::new();
    let mut stack: Vec<GraphNodeId> = slcfg
        .in_edges(anchor_node)
        .iter()
        .map(|&(pred, _)| pred)
        .collect();

    while let Some(c_id) = stack.pop() {
        if !already_inner_checked.insert(c_id) {
            continue;
        }

        let c_item = *slcfg.node_item(c_id);
        let c_inst = match c_item {
            // No dependence across the function boundary.
            PdgNode::Entry => continue,
            PdgNode::Exit => continue,
            PdgNode::Real(id) => id,
        };

        let c = func.inst(c_inst);
        if c.is_declare() && c.address_operand() == anchor_addr {
            // The declaration shadows any earlier definition on this path.
            continue;
        }

        // Emitted edges point anchor -> predecessor ("depends-on"), per
        // spec.md §4.6's deliberately surprising orientation.
        match oracle.query(c_inst, anchor_inst) {
            DepResult::Output => {
                pdg.add_edge(PdgNode::Real(anchor_inst), PdgNode::Real(c_inst), DepKind::Waw);
            }
            DepResult::Flow => {
                pdg.add_edge(PdgNode::Real(anchor_inst), PdgNode::Real(c_inst), DepKind::Raw);
            }
            DepResult::Anti => {
                pdg.add_edge(PdgNode::Real(anchor_inst), PdgNode::Real(c_inst), DepKind::War);
            }
            DepResult::Input | DepResult::None => {
                for &(pred_id, _) in slcfg.in_edges(c_id) {
                    if !already_inner_checked.contains(&pred_id) {
                        stack.push(pred_id);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{DebugLoc, FunctionBuilder, Opcode};
    use crate::oracle::ConservativeOracle;
    use crate::slcfg::{SlcfgPolicy, build_slcfg};

    #[test]
    fn scalar_read_of_read_only_param_has_no_edges() {
        let mut fb = FunctionBuilder::new("f");
        let entry = fb.block("entry");
        let addr = fb.value(Some("x"), None);
        fb.inst(entry, Opcode::Declare, vec![addr], Some(DebugLoc::new(1, 1, 1)));
        let load = fb.inst(entry, Opcode::Load, vec![addr], Some(DebugLoc::new(1, 2, 1)));
        let func = fb.build();

        let slcfg = build_slcfg(&func, SlcfgPolicy::Recommended);
        let oracle = ConservativeOracle::new();
        let pdg = walk_dependences(&func, &slcfg, &oracle);

        let load_idx = pdg.node_index(PdgNode::Real(load)).unwrap();
        assert!(pdg.out_edges(load_idx).is_empty());
    }

    #[test]
    fn diamond_yields_two_raw_edges_no_waw() {
        // if (c) x = 1; else x = 2; use(x);
        let mut fb = FunctionBuilder::new("f");
        let entry = fb.block("entry");
        let then_blk = fb.block("then");
        let else_blk = fb.block("else");
        let join = fb.block("join");
        fb.add_successor(entry, then_blk);
        fb.add_successor(entry, else_blk);
        fb.add_successor(then_blk, join);
        fb.add_successor(else_blk, join);

        let x = fb.value(Some("x"), None);
        fb.inst(entry, Opcode::Declare, vec![x], Some(DebugLoc::new(1, 1, 1)));
        let one = fb.value(None, None);
        let two = fb.value(None, None);
        let store1 = fb.inst(
            then_blk,
            Opcode::Store,
            vec![one, x],
            Some(DebugLoc::new(1, 2, 5)),
        );
        let store2 = fb.inst(
            else_blk,
            Opcode::Store,
            vec![two, x],
            Some(DebugLoc::new(1, 3, 5)),
        );
        let load = fb.inst(join, Opcode::Load, vec![x], Some(DebugLoc::new(1, 4, 5)));
        let func = fb.build();

        let slcfg = build_slcfg(&func, SlcfgPolicy::Recommended);
        let mut oracle = ConservativeOracle::new();
        oracle.set(store1, load, DepResult::Flow);
        oracle.set(store2, load, DepResult::Flow);

        let pdg = walk_dependences(&func, &slcfg, &oracle);
        let load_idx = pdg.node_index(PdgNode::Real(load)).unwrap();
        let out = pdg.out_edges(load_idx);
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|&(_, k)| k == DepKind::Raw));

        let store1_idx = pdg.node_index(PdgNode::Real(store1)).unwrap();
        let store2_idx = pdg.node_index(PdgNode::Real(store2)).unwrap();
        assert!(pdg.out_edges(store1_idx).is_empty());
        assert!(pdg.out_edges(store2_idx).is_empty());
        assert!(
            !pdg.all_edges()
                .any(|(s, d, _)| (s == store1_idx && d == store2_idx)
                    || (s == store2_idx && d == store1_idx))
        );
    }

    #[test]
    fn loop_carried_waw_self_edge() {
        // for (i = ...) a[i] = a[i-1];
        let mut fb = FunctionBuilder::new("f");
        let entry = fb.block("entry");
        let body = fb.block("for.body");
        fb.add_successor(entry, body);
        fb.add_successor(body, body);

        let a = fb.value(Some("a"), None);
        let v = fb.value(None, None);
        let store = fb.inst(
            body,
            Opcode::Store,
            vec![v, a],
            Some(DebugLoc::new(1, 2, 5)),
        );
        let func = fb.build();

        let slcfg = build_slcfg(&func, SlcfgPolicy::Recommended);
        let mut oracle = ConservativeOracle::new();
        oracle.set(store, store, DepResult::Output);

        let pdg = walk_dependences(&func, &slcfg, &oracle);
        let store_idx = pdg.node_index(PdgNode::Real(store)).unwrap();
        let out = pdg.out_edges(store_idx);
        assert!(out.iter().any(|&(d, k)| d == store_idx && k == DepKind::Waw));
    }

    #[test]
    fn declaration_shadow_stops_recursion() {
        let mut fb = FunctionBuilder::new("f");
        let entry = fb.block("entry");
        let x = fb.value(Some("x"), None);
        fb.inst(entry, Opcode::Declare, vec![x], Some(DebugLoc::new(1, 1, 1)));
        let load = fb.inst(entry, Opcode::Load, vec![x], Some(DebugLoc::new(1, 2, 1)));
        let func = fb.build();

        let slcfg = build_slcfg(&func, SlcfgPolicy::Recommended);
        // An oracle that would (wrongly, if reached) report a dependence
        // between ENTRY-adjacent nodes; the declaration shadow must stop
        // the walk before any query involving it is even needed here since
        // there is nothing before the declare to query against.
        let oracle = ConservativeOracle::new();
        let pdg = walk_dependences(&func, &slcfg, &oracle);
        let load_idx = pdg.node_index(PdgNode::Real(load)).unwrap();
        assert!(pdg.out_edges(load_idx).is_empty());
    }
}
