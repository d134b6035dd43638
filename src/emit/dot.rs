//! DOT emission for the SL-CFG and PDG (spec.md §6(a)/(b)).
//!
//! Grounded on `examples/original_source/PDG.cpp::dumpToDot` — including
//! its quirk of only drawing a RAW/WAR/WAW edge when the src/dst address
//! operands' *literal* names match (no SSA-suffix normalization at this
//! layer, unlike the depmap builder).

use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use itertools::Itertools;

use crate::analyzer::AnalysisResult;
use crate::error::EmitError;
use crate::graph::{Graph, GraphNodeId};
use crate::ir::Function;
use crate::omit::OmittableSet;
use crate::pdg::{DepKind, PdgNode};

fn open(path: &Path) -> Result<File, EmitError> {
    File::create(path).map_err(|source| EmitError::Open {
        path: path.to_path_buf(),
        source,
    })
}

fn write_all(file: &mut File, path: &Path, buf: &str) -> Result<(), EmitError> {
    file.write_all(buf.as_bytes()).map_err(|source| EmitError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn index_map(graph: &Graph<PdgNode, DepKind>) -> HashMap<GraphNodeId, usize> {
    graph.node_ids().enumerate().map(|(i, id)| (id, i)).collect()
}

fn node_label(func: &Function, node: PdgNode, idx: usize) -> Option<(String, bool)> {
    match node {
        PdgNode::Entry | PdgNode::Exit => None,
        PdgNode::Real(id) => {
            let inst = func.inst(id);
            let dl = inst.debug_loc?;
            if inst.is_memory_access() {
                let kind = if inst.is_store() { "write" } else { "read" };
                Some((
                    format!(
                        "{idx}\\n{kind}({}) {},{}",
                        func.var_name(id),
                        dl.line,
                        dl.col
                    ),
                    true,
                ))
            } else if inst.is_declare() {
                let addr_name = func
                    .inst(id)
                    .address_operand()
                    .and_then(|a| func.value(a).name.clone())
                    .unwrap_or_default();
                Some((
                    format!("{idx}\\ndeclare({addr_name}): {},{}", dl.line, dl.col),
                    false,
                ))
            } else {
                None
            }
        }
    }
}

fn render(
    func: &Function,
    graph: &Graph<PdgNode, DepKind>,
    omittable: &OmittableSet,
) -> String {
    let idx = index_map(graph);
    let mut buf = String::from("digraph g {\n");

    for (id, item) in graph.nodes() {
        let i = idx[&id];
        match *item {
            PdgNode::Entry => buf.push_str(&format!("\t\"{i}\" [label=entry];\n")),
            PdgNode::Exit => buf.push_str(&format!("\t\"{i}\" [label=exit];\n")),
            PdgNode::Real(inst_id) => {
                let Some((label, is_access)) = node_label(func, *item, i) else {
                    continue;
                };
                if is_access {
                    let highlighted = omittable.contains(inst_id);
                    buf.push_str(&format!(
                        "\t\"{i}\" [label=\"{label}\"{}];\n",
                        if highlighted { ",style=filled,fillcolor=red" } else { "" }
                    ));
                } else {
                    buf.push_str(&format!(
                        "\t\"{i}\" [label=\"{label}\",shape=rectangle,fillcolor=wheat,style=filled];\n"
                    ));
                }
            }
        }
    }

    buf.push_str("\n\n");

    // `Graph::all_edges` iterates a `HashMap`, whose order varies run to run;
    // sort by endpoint index first so the emitted DOT text is reproducible
    // (spec.md §6's formats are a byte-exact legacy compatibility contract).
    for (src, dst, kind) in graph
        .all_edges()
        .sorted_by_key(|&(s, d, _)| (idx[&s], idx[&d]))
    {
        let si = idx[&src];
        let di = idx[&dst];
        match kind {
            DepKind::Raw | DepKind::RawLoopCarried | DepKind::War | DepKind::Waw => {
                let (PdgNode::Real(s), PdgNode::Real(d)) = (*graph.node_item(src), *graph.node_item(dst)) else {
                    continue;
                };
                if func.raw_address_name(s) == func.raw_address_name(d) {
                    buf.push_str(&format!("\t\"{si}\" -> \"{di}\" [label=\"\"];\n"));
                }
            }
            DepKind::Ctr => {
                buf.push_str(&format!("\t\"{si}\" -> \"{di}\" [style=dotted];\n"));
            }
            other => {
                buf.push_str(&format!(
                    "\t\"{si}\" -> \"{di}\" [label=\"{}\"];\n",
                    other.label()
                ));
            }
        }
    }

    buf.push('}');
    buf
}

/// Writes the SL-CFG in DOT form to `path` (spec.md §6(a)).
pub fn write_slcfg(func: &Function, result: &AnalysisResult, path: &Path) -> Result<(), EmitError> {
    let buf = render(func, &result.slcfg, &result.omittable);
    let mut file = open(path)?;
    write_all(&mut file, path, &buf)
}

/// Writes the PDG in DOT form to `path` (spec.md §6(b)).
pub fn write_pdg(func: &Function, result: &AnalysisResult, path: &Path) -> Result<(), EmitError> {
    let buf = render(func, &result.pdg, &result.omittable);
    let mut file = open(path)?;
    write_all(&mut file, path, &buf)
}
