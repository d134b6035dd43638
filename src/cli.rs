//! Thin command-line surface for exercising the analyzer outside its
//! in-process host (spec.md §6), gated behind the `cli` feature so a library
//! consumer never pays for `clap`.
//!
//! Grounded on `examples/original_source/DepAnalysis.cpp`'s pass-registration
//! `cl::opt<bool>` flags (`-remove-transitive-edges`, `-fmap`); this crate
//! has no pass-manager command line to hook into, so they become ordinary
//! `clap` arguments instead.

use std::path::PathBuf;

use clap::Parser;

use crate::graph::{Graph, GraphNodeId};
use crate::pdg::DepKind;

/// Command-line arguments for a standalone driver binary built on top of
/// this crate.
#[derive(Debug, Parser)]
#[command(
    name = "dep-analysis",
    about = "Static dependence and omissibility analysis over a function IR"
)]
pub struct Cli {
    /// Collapse transitive dependency edges before DOT emission. The core
    /// analysis never calls this; it exists purely as a presentation option
    /// for whoever renders the graphs.
    #[arg(long = "remove-transitive-edges")]
    pub remove_transitive_edges: bool,

    /// Path to a `DP-FileMapping`-style file (`"<id>\t<path>"` per line)
    /// used to translate source paths to the numeric file ids this crate's
    /// `DebugLoc` already carries natively.
    #[arg(long = "fmap", value_name = "FILE")]
    pub fmap: Option<PathBuf>,
}

/// Drops every dependence edge `u -> v` for which an alternate `u -> v` path
/// of length > 1 also exists, i.e. edges implied by a longer chain. Applied
/// only when [`Cli::remove_transitive_edges`] is set; the analyzer's own
/// omissibility classification never depends on this simplification.
pub fn remove_transitive_edges(graph: &mut Graph<crate::pdg::PdgNode, DepKind>) {
    let direct: Vec<(GraphNodeId, GraphNodeId, DepKind)> = graph
        .all_edges()
        .map(|(src, dst, kind)| (src, dst, *kind))
        .collect();

    for (src, dst, kind) in direct {
        let has_indirect_path = graph
            .all_paths(src, dst)
            .iter()
            .any(|path| path.len() > 2);
        if has_indirect_path {
            graph.remove_edge(src, dst, kind);
        }
    }
}
