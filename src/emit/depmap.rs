//! The `map<string, set<string>>` depmap (spec.md §6(e)).
//!
//! Grounded on `examples/original_source/PDG.cpp::getDPDepMap`. Keys are
//! `"<fileId>:<srcLine>"`; values are `"<DepKind> <fileId>:<dstLine>|
//! <varName>"`. `SCA`/`RAR` edges are excluded (never produced by this
//! crate's walker in any case). Variable names ending in `.<digits>` are
//! normalized by stripping the suffix before comparison/emission.
//!
//! This crate's IR already carries a compact numeric [`FileId`] directly on
//! every [`DebugLoc`] (unlike the original, whose `DebugLoc` only carries a
//! source file *path* that `getDPDepMap` translates via an `fmap` file), so
//! [`build`] uses `debug_loc.file` as the fileId with no extra translation
//! step needed. [`load_file_map`] is kept for a host that wants to
//! reproduce the original's path-to-id translation at its own IR-population
//! boundary, and for the `cli` feature's `--fmap` flag.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use crate::error::EmitError;
use crate::ir::Function;
use crate::naming::strip_ssa_suffix;
use crate::pdg::{DepKind, Pdg, PdgNode};

/// Parses an `fmap` file (`"<id>\t<path>\n"` per line) into `path -> id`.
pub fn load_file_map(path: &Path) -> Result<HashMap<String, String>, EmitError> {
    let text = fs::read_to_string(path).map_err(|source| EmitError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let mut map = HashMap::new();
    for line in text.lines() {
        if let Some((id, file)) = line.split_once('\t') {
            map.insert(file.to_string(), id.to_string());
        }
    }
    Ok(map)
}

/// Builds the depmap for one function's PDG.
pub fn build(func: &Function, pdg: &Pdg) -> HashMap<String, HashSet<String>> {
    let mut map: HashMap<String, HashSet<String>> = HashMap::new();

    for (src, dst, kind) in pdg.all_edges() {
        if matches!(kind, DepKind::Sca | DepKind::Rar) {
            continue;
        }
        let (PdgNode::Real(src_id), PdgNode::Real(dst_id)) =
            (*pdg.node_item(src), *pdg.node_item(dst))
        else {
            continue;
        };
        let src_inst = func.inst(src_id);
        let dst_inst = func.inst(dst_id);
        let (Some(src_dl), Some(dst_dl)) = (src_inst.debug_loc, dst_inst.debug_loc) else {
            continue;
        };

        let name_src = func.raw_address_name(src_id);
        let name_dst = func.raw_address_name(dst_id);
        if name_src != name_dst {
            continue;
        }
        let var_name = strip_ssa_suffix(&name_src).to_string();

        let file_id = src_dl.file;
        let key = format!("{file_id}:{}", src_dl.line);
        let value = format!("{} {file_id}:{}|{var_name}", kind.label(), dst_dl.line);
        map.entry(key).or_default().insert(value);
    }

    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{DebugLoc, FunctionBuilder, Opcode};
    use crate::pdg::new_sentineled_graph;

    #[test]
    fn builds_one_entry_per_matching_address_edge() {
        let mut fb = FunctionBuilder::new("f");
        let entry = fb.block("entry");
        let a = fb.value(Some("a.3"), None);
        let v = fb.value(None, None);
        let store = fb.inst(
            entry,
            Opcode::Store,
            vec![v, a],
            Some(DebugLoc::new(7, 10, 1)),
        );
        let load = fb.inst(entry, Opcode::Load, vec![a], Some(DebugLoc::new(7, 12, 1)));
        let func = fb.build();

        let mut pdg = new_sentineled_graph();
        pdg.add_edge(PdgNode::Real(load), PdgNode::Real(store), DepKind::Raw);

        let map = build(&func, &pdg);
        let key = "7:12".to_string();
        let entries = map.get(&key).expect("key present");
        assert_eq!(entries.len(), 1);
        assert!(entries.iter().next().unwrap().contains("|a"));
        assert!(!entries.iter().next().unwrap().contains("a.3"));
    }

    #[test]
    fn mismatched_names_are_skipped() {
        let mut fb = FunctionBuilder::new("f");
        let entry = fb.block("entry");
        let a = fb.value(Some("a"), None);
        let b = fb.value(Some("b"), None);
        let dummy = fb.value(None, None);
        let store = fb.inst(
            entry,
            Opcode::Store,
            vec![dummy, a],
            Some(DebugLoc::new(1, 1, 1)),
        );
        let load = fb.inst(entry, Opcode::Load, vec![b], Some(DebugLoc::new(1, 2, 1)));
        let func = fb.build();

        let mut pdg = new_sentineled_graph();
        pdg.add_edge(PdgNode::Real(load), PdgNode::Real(store), DepKind::Raw);

        let map = build(&func, &pdg);
        assert!(map.is_empty());
    }
}
