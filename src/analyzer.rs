//! Per-function pipeline orchestration (spec.md §2, §5): runs §4.1 → §4.2 →
//! §4.3 → §4.4 → §4.6 → §4.7 in order, then folds the result into the
//! host-facing `AnalysisResult`.
//!
//! Also hosts the two External-Collaborator seams spec.md §6 names but
//! never elaborates: `CallGraph` (for the self-recursion check, §4.9) and
//! `LoopInfo` (for the "possible false-positive variables" flag, §4.10).
//! Grounded on `examples/original_source/DepAnalysis.cpp::runOnFunction`'s
//! top-level ordering and its `isRecursive`/`isRecursiveHelper`.

use std::collections::{HashMap, HashSet};

use crate::counters::Counters;
use crate::error::AnalysisDiagnostic;
use crate::ir::{BlockId, Function, InstId};
use crate::locality::LocalityState;
use crate::naming::names_match;
use crate::omit::{OmittableSet, StrictMode, classify_first_pass, refine_omissibility};
use crate::oracle::DependenceOracle;
use crate::pdg::{DepKind, Pdg, PdgNode, SlCfg};
use crate::postdom::PostDominance;
use crate::slcfg::{SlcfgPolicy, build_slcfg};

/// Host-supplied call graph, consumed only for the self-recursion check
/// (spec.md §6's "optional call-graph"). A minimal by-name adjacency view
/// so this crate need not model a full call-graph type.
pub trait CallGraph: Send + Sync {
    /// Functions directly called by `caller`.
    fn callees(&self, caller: &str) -> Vec<String>;
}

/// Host-supplied loop membership, consumed only to populate
/// [`InstructionReport::in_loop`] (spec.md §6's "possible false-positive
/// variables" flag, §4.10). Purely advisory: never affects omissibility or
/// PDG edges.
pub trait LoopInfo: Send + Sync {
    fn in_loop(&self, block: BlockId) -> bool;
}

/// Whether `function` is directly or transitively self-recursive, walking
/// `call_graph` from its own callees with an explicit visited set (the
/// original's unbounded recursion is non-terminating on a true cycle; this
/// port guards that).
pub fn is_recursive(call_graph: &dyn CallGraph, function: &str) -> bool {
    let mut visited: HashSet<String> = HashSet::new();
    let mut stack: Vec<String> = call_graph.callees(function);
    while let Some(callee) = stack.pop() {
        if callee == function {
            return true;
        }
        if visited.insert(callee.clone()) {
            stack.extend(call_graph.callees(&callee));
        }
    }
    false
}

/// spec.md §9's recorded Open Question decisions, threaded through one
/// function's analysis run.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalysisConfig {
    pub slcfg_policy: SlcfgPolicy,
    pub strict_mode: StrictMode,
}

/// One load/store's contribution to the per-instruction diagnostic dump
/// (spec.md §6(c)/(d)'s `w|name|line|col` / `r|name|line|col` format, plus
/// the §4.10 loop-info flag).
#[derive(Debug, Clone)]
pub struct InstructionReport {
    pub inst: InstId,
    pub is_write: bool,
    pub var_name: String,
    pub line: u32,
    pub col: u32,
    pub omittable: bool,
    /// "Possible false-positive variable" — this store/load occurs inside a
    /// loop, per the host-supplied `LoopInfo` (spec.md §4.10). Advisory only.
    pub in_loop: bool,
}

/// Everything one per-function analysis run produces.
pub struct AnalysisResult {
    pub function_name: String,
    pub slcfg: SlCfg,
    pub pdg: Pdg,
    pub omittable: OmittableSet,
    pub locality: LocalityState,
    /// §4.7's per-block conditional-dependence notes; advisory/diagnostic
    /// only (`DepAnalysis.cpp`'s `conditionalDepMap`), never consumed
    /// downstream in this crate.
    pub conditional_deps: HashMap<BlockId, Vec<String>>,
    pub is_recursive: bool,
    pub reports: Vec<InstructionReport>,
    pub diagnostics: Vec<AnalysisDiagnostic>,
}

/// Runs the full per-function pipeline (spec.md §2, phases 1–8).
pub fn analyze(
    func: &Function,
    oracle: &dyn DependenceOracle,
    post_dom: &dyn PostDominance,
    config: AnalysisConfig,
    call_graph: Option<&dyn CallGraph>,
    loop_info: Option<&dyn LoopInfo>,
    counters: &Counters,
) -> AnalysisResult {
    tracing::debug!(function = %func.name, "building locality sets");
    let locality = LocalityState::compute(func);

    tracing::debug!(function = %func.name, "classifying first-pass omissibility");
    let mut omittable = classify_first_pass(func, &locality);

    tracing::debug!(function = %func.name, "building SL-CFG");
    let slcfg = build_slcfg(func, config.slcfg_policy);

    tracing::debug!(function = %func.name, "walking dependences");
    let pdg = crate::walker::walk_dependences(func, &slcfg, oracle);

    tracing::debug!(function = %func.name, "refining omissibility via post-dominance");
    let conditional_deps = refine_omissibility(
        func,
        &pdg,
        post_dom,
        &locality,
        config.strict_mode,
        &mut omittable,
    );

    let mut diagnostics = Vec::new();
    validate_same_address_invariant(func, &pdg, &mut diagnostics);

    let mut total = 0u64;
    let mut omit_count = 0u64;
    let mut reports = Vec::new();
    for id in func.instructions_in_order() {
        let inst = func.inst(id);
        if !inst.is_memory_access() {
            continue;
        }
        total += 1;
        let is_omittable = omittable.contains(id);
        if is_omittable {
            omit_count += 1;
        }
        let (line, col) = inst
            .debug_loc
            .map(|d| (d.line, d.col))
            .unwrap_or((0, 0));
        reports.push(InstructionReport {
            inst: id,
            is_write: inst.is_store(),
            var_name: func.var_name(id),
            line,
            col,
            omittable: is_omittable,
            in_loop: loop_info.map(|li| li.in_loop(inst.block)).unwrap_or(false),
        });
    }
    counters.record_function(total, omit_count);

    let recursive = call_graph
        .map(|cg| is_recursive(cg, &func.name))
        .unwrap_or(false);

    AnalysisResult {
        function_name: func.name.clone(),
        slcfg,
        pdg,
        omittable,
        locality,
        conditional_deps,
        is_recursive: recursive,
        reports,
        diagnostics,
    }
}

/// spec.md §3: "RAW/WAR/WAW edges are never emitted between two
/// instructions whose target address operands are distinct IR values."
/// This crate's walker never constructs such an edge itself, but the oracle
/// is an external, consumed collaborator (spec.md §4.5) that could in
/// principle violate the contract; record a diagnostic rather than panic
/// (spec.md §7: advisory, never aborts the host).
fn validate_same_address_invariant(func: &Function, pdg: &Pdg, diagnostics: &mut Vec<AnalysisDiagnostic>) {
    for (src, dst, kind) in pdg.all_edges() {
        if !matches!(kind, DepKind::Raw | DepKind::RawLoopCarried | DepKind::War | DepKind::Waw) {
            continue;
        }
        let (PdgNode::Real(a), PdgNode::Real(b)) = (*pdg.node_item(src), *pdg.node_item(dst)) else {
            continue;
        };
        let addr_a = func.inst(a).address_operand();
        let addr_b = func.inst(b).address_operand();
        if addr_a == addr_b {
            continue;
        }
        if names_match(&func.var_name(a), &func.var_name(b)) {
            continue;
        }
        diagnostics.push(AnalysisDiagnostic::warning(
            a,
            format!(
                "oracle reported a {} dependence between distinct addresses ({} vs {})",
                kind.label(),
                func.var_name(a),
                func.var_name(b)
            ),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{DebugLoc, FunctionBuilder, Opcode};
    use crate::oracle::ConservativeOracle;
    use crate::postdom::PostDomTree;

    struct FixedCallGraph(HashMap<String, Vec<String>>);
    impl CallGraph for FixedCallGraph {
        fn callees(&self, caller: &str) -> Vec<String> {
            self.0.get(caller).cloned().unwrap_or_default()
        }
    }

    #[test]
    fn pure_scalar_read_is_fully_omittable_with_no_pdg_edges() {
        crate::test_support::init_tracing();
        let mut fb = FunctionBuilder::new("f");
        let entry = fb.block("entry");
        let x = fb.value(Some("x"), None);
        let three = fb.value(None, None);
        fb.inst(entry, Opcode::Declare, vec![x], Some(DebugLoc::new(1, 1, 9)));
        // init store carries no debug location (compiler-synthesized).
        fb.inst(entry, Opcode::Store, vec![three, x], None);
        let load = fb.inst(entry, Opcode::Load, vec![x], Some(DebugLoc::new(1, 2, 12)));
        fb.inst(entry, Opcode::Return, vec![load], Some(DebugLoc::new(1, 2, 5)));
        let func = fb.build();

        let post_dom = PostDomTree::compute(&func);
        let oracle = ConservativeOracle::new();
        let counters = Counters::new();
        let result = analyze(
            &func,
            &oracle,
            &post_dom,
            AnalysisConfig::default(),
            None,
            None,
            &counters,
        );

        assert_eq!(result.omittable.len(), 1);
        assert!(result.omittable.contains(load));
        assert!(result.pdg.all_edges().next().is_none());
        assert_eq!(counters.total_load_store(), 1);
        assert_eq!(counters.omittable_load_store(), 1);
    }

    #[test]
    fn self_recursive_function_is_flagged() {
        let mut fb = FunctionBuilder::new("fact");
        let entry = fb.block("entry");
        let v = fb.value(None, None);
        fb.inst(entry, Opcode::Return, vec![v], None);
        let func = fb.build();

        let post_dom = PostDomTree::compute(&func);
        let oracle = ConservativeOracle::new();
        let counters = Counters::new();
        let mut calls = HashMap::new();
        calls.insert("fact".to_string(), vec!["fact".to_string()]);
        let call_graph = FixedCallGraph(calls);

        let result = analyze(
            &func,
            &oracle,
            &post_dom,
            AnalysisConfig::default(),
            Some(&call_graph),
            None,
            &counters,
        );
        assert!(result.is_recursive);
    }

    #[test]
    fn non_recursive_function_is_not_flagged() {
        let mut fb = FunctionBuilder::new("f");
        let entry = fb.block("entry");
        let v = fb.value(None, None);
        fb.inst(entry, Opcode::Return, vec![v], None);
        let func = fb.build();

        let post_dom = PostDomTree::compute(&func);
        let oracle = ConservativeOracle::new();
        let counters = Counters::new();
        let mut calls = HashMap::new();
        calls.insert("f".to_string(), vec!["g".to_string()]);
        calls.insert("g".to_string(), vec![]);
        let call_graph = FixedCallGraph(calls);

        let result = analyze(
            &func,
            &oracle,
            &post_dom,
            AnalysisConfig::default(),
            Some(&call_graph),
            None,
            &counters,
        );
        assert!(!result.is_recursive);
    }

    /// spec.md §8 round-trip property: re-running the analyzer on the same
    /// function yields an identical omittable set and an identical PDG edge
    /// multiset (as `(src, dst, kind)` label triples, since node indices are
    /// only stable within one `Pdg` instance, not across two separately
    /// built ones).
    #[test]
    fn analyzing_the_same_function_twice_is_idempotent() {
        let mut fb = FunctionBuilder::new("f");
        let entry = fb.block("entry");
        let join = fb.block("join");
        fb.add_successor(entry, join);
        let x = fb.value(Some("x"), None);
        fb.inst(entry, Opcode::Declare, vec![x], Some(DebugLoc::new(1, 1, 1)));
        let one = fb.value(None, None);
        let store = fb.inst(entry, Opcode::Store, vec![one, x], Some(DebugLoc::new(1, 2, 5)));
        let load = fb.inst(join, Opcode::Load, vec![x], Some(DebugLoc::new(1, 4, 5)));
        let func = fb.build();

        let post_dom = PostDomTree::compute(&func);
        let mut oracle = ConservativeOracle::new();
        oracle.set(store, load, crate::oracle::DepResult::Flow);
        let counters = Counters::new();

        let run = |counters: &Counters| {
            analyze(
                &func,
                &oracle,
                &post_dom,
                AnalysisConfig::default(),
                None,
                None,
                counters,
            )
        };

        let r1 = run(&counters);
        let r2 = run(&counters);

        assert_eq!(r1.omittable.len(), r2.omittable.len());
        for id in func.instructions_in_order() {
            assert_eq!(r1.omittable.contains(id), r2.omittable.contains(id));
        }

        let edges = |r: &AnalysisResult| {
            let mut v: Vec<(String, String, &'static str)> = r
                .pdg
                .all_edges()
                .filter_map(|(s, d, k)| {
                    let (PdgNode::Real(s), PdgNode::Real(d)) = (*r.pdg.node_item(s), *r.pdg.node_item(d))
                    else {
                        return None;
                    };
                    Some((func.var_name(s), func.var_name(d), k.label()))
                })
                .collect();
            v.sort();
            v
        };
        assert_eq!(edges(&r1), edges(&r2));
    }
}
