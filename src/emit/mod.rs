//! Emission outputs (spec.md §6). Peripheral per spec.md §1 ("DOT emission,
//! file-id mapping, statistics counters, and the textual dump of omittable
//! instructions... is peripheral"), but the formats must be preserved
//! bit-exactly, so each sub-module is grounded directly on the matching
//! `examples/original_source/PDG.cpp` function.

pub mod depmap;
pub mod dot;
pub mod ignoring;
pub mod instructions_info;
