//! The isolated-node instructions-info dump (spec.md §6(c)).
//!
//! Grounded on `examples/original_source/PDG.cpp::dumpInstructionInfo`: one
//! line per PDG node with neither in- nor out-edges (a load/store the
//! dependence walker found no RAW/WAR/WAW partner for at all), formatted
//! `w|<name>|<line>|<col>` for a store or `r|<name>|<line>|<col>` for a
//! load. Uses the raw (non-chasing) address name, matching the original's
//! direct `getOperand(...)->getName()` call.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::EmitError;
use crate::ir::Function;
use crate::pdg::{Pdg, PdgNode};

pub fn write(func: &Function, pdg: &Pdg, path: &Path) -> Result<(), EmitError> {
    let mut buf = String::new();
    for (id, item) in pdg.nodes() {
        let PdgNode::Real(inst_id) = *item else {
            continue;
        };
        if pdg.has_in_edges(id) || pdg.has_out_edges(id) {
            continue;
        }
        let inst = func.inst(inst_id);
        if !inst.is_memory_access() {
            continue;
        }
        let Some(dl) = inst.debug_loc else {
            continue;
        };
        let kind = if inst.is_store() { "w" } else { "r" };
        buf.push_str(&format!(
            "{kind}|{}|{}|{}\n",
            func.raw_address_name(inst_id),
            dl.line,
            dl.col
        ));
    }

    let mut file = File::create(path).map_err(|source| EmitError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    file.write_all(buf.as_bytes()).map_err(|source| EmitError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Reparses an instructions-info file into `(kind, name, line, col)` tuples
/// (spec.md §8's round-trip property: "Emission → reparse of the
/// instructions-info file yields the same tuples as a direct dump").
pub fn parse(text: &str) -> Vec<(char, String, u32, u32)> {
    text.lines()
        .filter_map(|line| {
            let mut parts = line.splitn(4, '|');
            let kind = parts.next()?.chars().next()?;
            let name = parts.next()?.to_string();
            let line_no: u32 = parts.next()?.parse().ok()?;
            let col: u32 = parts.next()?.parse().ok()?;
            Some((kind, name, line_no, col))
        })
        .collect()
}
