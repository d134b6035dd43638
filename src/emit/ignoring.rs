//! The append-only confirmed-omittable dump (spec.md §6(d)).
//!
//! Kept misspelled (`ignoring_intructions.txt`) to match spec.md §6(d)
//! bit-for-bit — the spec calls out this exact filename.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use crate::error::EmitError;
use crate::ir::Function;
use crate::omit::OmittableSet;

pub const FILE_NAME: &str = "ignoring_intructions.txt";

/// Appends one `w|name|line|col` / `r|name|line|col` line per
/// confirmed-omittable load/store, in instruction order.
pub fn append(func: &Function, omittable: &OmittableSet, path: &Path) -> Result<(), EmitError> {
    let mut buf = String::new();
    for id in func.instructions_in_order() {
        if !omittable.contains(id) {
            continue;
        }
        let inst = func.inst(id);
        if !inst.is_memory_access() {
            continue;
        }
        let Some(dl) = inst.debug_loc else {
            continue;
        };
        let kind = if inst.is_store() { "w" } else { "r" };
        buf.push_str(&format!(
            "{kind}|{}|{}|{}\n",
            func.raw_address_name(id),
            dl.line,
            dl.col
        ));
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| EmitError::Open {
            path: path.to_path_buf(),
            source,
        })?;
    file.write_all(buf.as_bytes()).map_err(|source| EmitError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{DebugLoc, FunctionBuilder, Opcode};
    use crate::omit::classify_first_pass;
    use crate::locality::LocalityState;
    use tempfile::tempdir;

    #[test]
    fn append_is_cumulative_across_calls() {
        let mut fb = FunctionBuilder::new("f");
        let entry = fb.block("entry");
        let x = fb.value(Some("x"), None);
        fb.inst(entry, Opcode::Declare, vec![x], Some(DebugLoc::new(1, 1, 1)));
        // never written, so the load below is a debug-located, non-escaped
        // read-only local: omittable in the first pass *and* dumped.
        fb.inst(entry, Opcode::Load, vec![x], Some(DebugLoc::new(1, 2, 5)));
        let func = fb.build();
        let locality = LocalityState::compute(&func);
        let omittable = classify_first_pass(&func, &locality);

        let dir = tempdir().unwrap();
        let path = dir.path().join(FILE_NAME);
        append(&func, &omittable, &path).unwrap();
        append(&func, &omittable, &path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
    }

    #[test]
    fn no_debug_loc_store_is_omittable_but_not_dumped() {
        let mut fb = FunctionBuilder::new("f");
        let entry = fb.block("entry");
        let v = fb.value(None, None);
        let x = fb.value(Some("p"), None);
        fb.inst(entry, Opcode::Store, vec![v, x], None);
        let func = fb.build();
        let locality = LocalityState::compute(&func);
        let omittable = classify_first_pass(&func, &locality);

        let dir = tempdir().unwrap();
        let path = dir.path().join(FILE_NAME);
        append(&func, &omittable, &path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        // No debug_loc => filtered out by `inst.debug_loc?` guard, so the
        // (omittable but location-less) store contributes nothing.
        assert!(contents.is_empty());
    }
}
