//! Omissibility Classifier (spec.md §4.3, first pass) and the glue that
//! folds in the Post-Dominance Refiner's confirmed-omittable set (§4.7).
//!
//! Grounded on `examples/original_source/DepAnalysis.cpp`'s
//! `omittableInstructions.insert` loop (`!dl || (local && !written)`) for
//! the first pass, and its bottom loop over `DG->getNodes()` (the
//! `PDT.dominates`/intra-block-order checks feeding a second
//! `omittableInstructions.insert`) for the refinement pass.

use std::collections::{HashMap, HashSet};

use crate::ir::{BlockId, Function, InstId};
use crate::locality::LocalityState;
use crate::pdg::{Pdg, PdgNode};
use crate::postdom::PostDominance;

/// spec.md §9 Open Question 3 / DESIGN.md decision: which written-local
/// exclusion policy the first pass (and its interaction with the
/// post-dominance refiner) uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrictMode {
    /// The later, looser policy this crate implements by default: a
    /// written-but-never-escaped local is excluded from the *first* pass
    /// but remains eligible for promotion by [`refine_omissibility`].
    #[default]
    Loose,
    /// The earlier, stricter policy: once a local's address has been
    /// written through a debug-located store, it is permanently unsafe and
    /// can never become omittable, not even via post-dominance refinement.
    ByteExactLegacy,
}

/// The core's headline output: `omittable ⊆ { I : I is a load or store }`,
/// monotonically grown across the pipeline (spec.md §3).
#[derive(Debug, Default, Clone)]
pub struct OmittableSet {
    insts: HashSet<InstId>,
}

impl OmittableSet {
    /// Returns `true` if `id` was not already present.
    pub fn insert(&mut self, id: InstId) -> bool {
        self.insts.insert(id)
    }

    pub fn contains(&self, id: InstId) -> bool {
        self.insts.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.insts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.insts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = InstId> + '_ {
        self.insts.iter().copied()
    }
}

/// First-pass Omissibility Classifier (spec.md §4.3). For every load/store:
/// no debug location, or a non-written local address, makes it omittable.
pub fn classify_first_pass(func: &Function, locality: &LocalityState) -> OmittableSet {
    let mut omittable = OmittableSet::default();
    for id in func.instructions_in_order() {
        let inst = func.inst(id);
        if !inst.is_memory_access() {
            continue;
        }
        if inst.debug_loc.is_none() {
            omittable.insert(id);
            continue;
        }
        if let Some(addr) = inst.address_operand() {
            if locality.is_local(addr) && !locality.is_written(addr) {
                omittable.insert(id);
            }
        }
    }
    omittable
}

fn precedes_in_block(func: &Function, block: BlockId, a: InstId, b: InstId) -> bool {
    let insts = &func.block(block).insts;
    let pos_a = insts.iter().position(|&i| i == a);
    let pos_b = insts.iter().position(|&i| i == b);
    matches!((pos_a, pos_b), (Some(pa), Some(pb)) if pa < pb)
}

/// Post-Dominance Refiner (spec.md §4.7). For each memory access targeting
/// a non-escaped local, checks every PDG neighbor: same-block neighbors
/// must respect program order, cross-block neighbors must be post-dominated
/// appropriately. If every neighbor passes, `I` is promoted into
/// `omittable` and its neighbor edges are recorded (grouped by `I`'s basic
/// block) as a diagnostic conditional-dependence set — advisory output
/// only, mirroring `DepAnalysis.cpp`'s `conditionalDepMap`, never consumed
/// by the rest of the pipeline.
pub fn refine_omissibility(
    func: &Function,
    pdg: &Pdg,
    post_dom: &dyn PostDominance,
    locality: &LocalityState,
    strict_mode: StrictMode,
    omittable: &mut OmittableSet,
) -> HashMap<BlockId, Vec<String>> {
    let mut conditional_deps: HashMap<BlockId, Vec<String>> = HashMap::new();

    for (node_id, node) in pdg.nodes() {
        let PdgNode::Real(inst_id) = *node else {
            continue;
        };
        let inst = func.inst(inst_id);
        if !inst.is_memory_access() {
            continue;
        }
        let Some(addr) = inst.address_operand() else {
            continue;
        };
        if !locality.is_local(addr) {
            continue;
        }
        if strict_mode == StrictMode::ByteExactLegacy && locality.is_written(addr) {
            continue;
        }

        let i_block = inst.block;
        let i_line = inst.debug_loc.map(|d| d.line).unwrap_or(0);
        let mut ok = true;
        let mut notes = Vec::new();

        for &(dst_id, kind) in pdg.out_edges(node_id) {
            let PdgNode::Real(j_id) = *pdg.node_item(dst_id) else {
                continue;
            };
            let j = func.inst(j_id);
            if i_block == j.block {
                // Out-edge `I -> J`: per spec.md §4.6, PDG edges point
                // anchor -> predecessor, so J is the earlier
                // definition/use and must precede I in program order.
                if !precedes_in_block(func, i_block, j_id, inst_id) {
                    ok = false;
                    break;
                }
            } else if !post_dom.dominates(i_block, j.block) {
                ok = false;
                break;
            }
            let j_line = j.debug_loc.map(|d| d.line).unwrap_or(0);
            notes.push(format!(
                "{i_line} NOM  {} {j_line}|{}",
                kind.label(),
                func.var_name(inst_id)
            ));
        }

        if ok {
            for &(src_id, kind) in pdg.in_edges(node_id) {
                let PdgNode::Real(j_id) = *pdg.node_item(src_id) else {
                    continue;
                };
                let j = func.inst(j_id);
                if i_block == j.block {
                    // In-edge `J -> I`: J is the later use/anchor and I is
                    // its earlier predecessor, so I must precede J.
                    if !precedes_in_block(func, i_block, inst_id, j_id) {
                        ok = false;
                        break;
                    }
                } else if !post_dom.dominates(j.block, i_block) {
                    ok = false;
                    break;
                }
                let j_line = j.debug_loc.map(|d| d.line).unwrap_or(0);
                notes.push(format!(
                    "{j_line} NOM  {} {i_line}|{}",
                    kind.label(),
                    func.var_name(inst_id)
                ));
            }
        }

        if ok {
            omittable.insert(inst_id);
            conditional_deps.entry(i_block).or_default().extend(notes);
        }
    }

    conditional_deps
}
