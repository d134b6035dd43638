//! A generic directed multigraph with stable, insertion-order node indices.
//!
//! Shared by the SL-CFG (`CTR`-only edges) and the PDG (`DepKind`-typed
//! edges); see spec.md §3 (`Graph<N,E>`) and §4.8. Grounded on
//! `examples/original_source/Graph.hpp`'s `Node<T>`/`Edge<N,E>`/`Graph<N,E>`
//! (`addNode`/`addEdge`/`getInEdges`/`getOutEdges`/`DFSUtil`), reimplemented
//! with `slotmap`-keyed node identities in place of the C++ version's
//! `map<NodeT, pair<int, Node<NodeT>*>>` table — the same role `slotmap`
//! plays for `GraphNodeId`/`GraphSubgraphId`/`GraphLoopId` in the teacher
//! crate this repository is adapted from.

use std::collections::HashMap;
use std::hash::Hash;

use slotmap::{SlotMap, new_key_type};

new_key_type! {
    /// Stable integer-backed node index, assigned in insertion order.
    pub struct GraphNodeId;
}

struct NodeEntry<N> {
    item: N,
    highlighted: bool,
}

/// Generic directed multigraph. `N` is the node payload (identity-keyed:
/// adding the same `N` twice returns the existing node); `E` classifies
/// edges and participates in edge deduplication, so `(src, dst, E)` triples
/// are unique.
pub struct Graph<N, E> {
    nodes: SlotMap<GraphNodeId, NodeEntry<N>>,
    index: HashMap<N, GraphNodeId>,
    out_edges: HashMap<GraphNodeId, Vec<(GraphNodeId, E)>>,
    in_edges: HashMap<GraphNodeId, Vec<(GraphNodeId, E)>>,
}

impl<N, E> Default for Graph<N, E>
where
    N: Eq + Hash + Copy,
    E: Eq + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<N, E> Graph<N, E>
where
    N: Eq + Hash + Copy,
    E: Eq + Clone,
{
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            index: HashMap::new(),
            out_edges: HashMap::new(),
            in_edges: HashMap::new(),
        }
    }

    /// Idempotent: inserting an already-present item returns its existing
    /// index.
    pub fn add_node(&mut self, item: N) -> GraphNodeId {
        if let Some(&id) = self.index.get(&item) {
            return id;
        }
        let id = self.nodes.insert(NodeEntry {
            item,
            highlighted: false,
        });
        self.index.insert(item, id);
        id
    }

    pub fn node_index(&self, item: N) -> Option<GraphNodeId> {
        self.index.get(&item).copied()
    }

    pub fn node_item(&self, id: GraphNodeId) -> &N {
        &self.nodes[id].item
    }

    pub fn contains(&self, item: N) -> bool {
        self.index.contains_key(&item)
    }

    pub fn highlight(&mut self, id: GraphNodeId) {
        self.nodes[id].highlighted = true;
    }

    pub fn is_highlighted(&self, id: GraphNodeId) -> bool {
        self.nodes[id].highlighted
    }

    /// Adds an edge, creating both endpoints if absent. Deduplicated on
    /// `(src, dst, kind)`; re-adding an existing triple is a no-op.
    pub fn add_edge(&mut self, src: N, dst: N, kind: E) {
        let src_id = self.add_node(src);
        let dst_id = self.add_node(dst);
        self.add_edge_by_id(src_id, dst_id, kind);
    }

    pub fn add_edge_by_id(&mut self, src_id: GraphNodeId, dst_id: GraphNodeId, kind: E) {
        let out = self.out_edges.entry(src_id).or_default();
        if out.iter().any(|(d, k)| *d == dst_id && *k == kind) {
            return;
        }
        out.push((dst_id, kind.clone()));
        self.in_edges
            .entry(dst_id)
            .or_default()
            .push((src_id, kind));
    }

    /// Removes one `(src, dst, kind)` edge, if present. Not used by the core
    /// pipeline; exists for the `cli` feature's transitive-edge-removal flag
    /// (spec.md §4.8, §6), which is plumbed but never invoked by the
    /// analyzer itself.
    pub fn remove_edge(&mut self, src: GraphNodeId, dst: GraphNodeId, kind: E) {
        if let Some(v) = self.out_edges.get_mut(&src) {
            v.retain(|(d, k)| !(*d == dst && *k == kind));
        }
        if let Some(v) = self.in_edges.get_mut(&dst) {
            v.retain(|(s, k)| !(*s == src && *k == kind));
        }
    }

    pub fn out_edges(&self, id: GraphNodeId) -> &[(GraphNodeId, E)] {
        self.out_edges.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn in_edges(&self, id: GraphNodeId) -> &[(GraphNodeId, E)] {
        self.in_edges.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_in_edges(&self, id: GraphNodeId) -> bool {
        !self.in_edges(id).is_empty()
    }

    pub fn has_out_edges(&self, id: GraphNodeId) -> bool {
        !self.out_edges(id).is_empty()
    }

    /// All node indices, in insertion order.
    pub fn node_ids(&self) -> impl Iterator<Item = GraphNodeId> + '_ {
        self.nodes.keys()
    }

    pub fn nodes(&self) -> impl Iterator<Item = (GraphNodeId, &N)> + '_ {
        self.nodes.iter().map(|(id, e)| (id, &e.item))
    }

    pub fn all_edges(&self) -> impl Iterator<Item = (GraphNodeId, GraphNodeId, &E)> + '_ {
        self.out_edges
            .iter()
            .flat_map(|(&src, outs)| outs.iter().map(move |(dst, kind)| (src, *dst, kind)))
    }

    /// All simple paths from `src` to `dst`, via DFS with on-stack cycle
    /// avoidance. Used by the DOT emitter's transitive-edge-removal CLI flag
    /// (spec.md §4.8, §6) — never by the dependence walker, which uses its
    /// own bounded backward traversal (see `crate::walker`).
    pub fn all_paths(&self, src: GraphNodeId, dst: GraphNodeId) -> Vec<Vec<GraphNodeId>> {
        let mut paths = Vec::new();
        let mut current = vec![src];
        self.all_paths_dfs(src, dst, &mut current, &mut paths);
        paths
    }

    fn all_paths_dfs(
        &self,
        node: GraphNodeId,
        dst: GraphNodeId,
        current: &mut Vec<GraphNodeId>,
        paths: &mut Vec<Vec<GraphNodeId>>,
    ) {
        if node == dst {
            paths.push(current.clone());
            return;
        }
        for &(next, _) in self.out_edges(node) {
            if current.contains(&next) {
                continue;
            }
            current.push(next);
            self.all_paths_dfs(next, dst, current, paths);
            current.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum K {
        A,
        B,
    }

    #[test]
    fn add_node_is_idempotent() {
        let mut g: Graph<&str, K> = Graph::new();
        let a1 = g.add_node("a");
        let a2 = g.add_node("a");
        assert_eq!(a1, a2);
        assert_eq!(g.node_ids().count(), 1);
    }

    #[test]
    fn edges_dedup_on_src_dst_kind() {
        let mut g: Graph<&str, K> = Graph::new();
        g.add_edge("a", "b", K::A);
        g.add_edge("a", "b", K::A);
        g.add_edge("a", "b", K::B);
        let a = g.node_index("a").unwrap();
        assert_eq!(g.out_edges(a).len(), 2);
    }

    #[test]
    fn all_paths_avoids_cycles() {
        let mut g: Graph<&str, K> = Graph::new();
        g.add_edge("a", "b", K::A);
        g.add_edge("b", "c", K::A);
        g.add_edge("c", "a", K::A);
        g.add_edge("b", "d", K::A);
        let a = g.node_index("a").unwrap();
        let d = g.node_index("d").unwrap();
        let paths = g.all_paths(a, d);
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].len(), 3);
    }

    #[test]
    fn highlight_is_visualization_only() {
        let mut g: Graph<&str, K> = Graph::new();
        let a = g.add_node("a");
        assert!(!g.is_highlighted(a));
        g.highlight(a);
        assert!(g.is_highlighted(a));
    }
}
