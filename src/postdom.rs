//! Post-dominance: the External Collaborator named in spec.md §4.7/§6, plus
//! one concrete from-scratch implementation so this crate is self-testable
//! without a host-supplied dominator pass.
//!
//! `PostDomTree::compute` runs the standard iterative reverse-CFG dominator
//! fixpoint (Cooper/Harvey/Kennedy: "A Simple, Fast Dominance Algorithm"),
//! adapted to intersect idom chains as ancestor sets rather than finger
//! pointers over a postorder numbering — simpler to get right over a small
//! function-sized CFG, same fixpoint.

use std::collections::{HashMap, HashSet};

use crate::ir::{BlockId, Function};

/// Consumed interface: "does block `a` post-dominate block `b`?" — every
/// path from `b` to the function's exit passes through `a`. A host driver
/// supplies its own implementation backed by its compiler's dominator
/// analysis; this crate also ships [`PostDomTree`] so it can compute its
/// own. Read-only and shared across a per-function run (spec.md §5), hence
/// `Send + Sync`.
pub trait PostDominance: Send + Sync {
    fn dominates(&self, a: BlockId, b: BlockId) -> bool;
}

/// A computed post-dominator tree over one function's basic blocks.
///
/// Blocks with no successors are function exits; if a function has more
/// than one (multiple `return`s), they are unified under a virtual root
/// (`None` in the internal `idom` map) that trivially post-dominates
/// nothing queryable — `dominates` only ever answers for two real blocks.
pub struct PostDomTree {
    idom: HashMap<BlockId, Option<BlockId>>,
}

impl PostDomTree {
    pub fn compute(func: &Function) -> Self {
        let all: Vec<BlockId> = func.blocks_in_order().collect();
        let mut succs: HashMap<BlockId, Vec<BlockId>> = HashMap::with_capacity(all.len());
        let mut preds: HashMap<BlockId, Vec<BlockId>> = HashMap::with_capacity(all.len());
        for &b in &all {
            let s = func.block(b).successors.clone();
            for &succ in &s {
                preds.entry(succ).or_default().push(b);
            }
            succs.insert(b, s);
        }

        let exits: Vec<BlockId> = all
            .iter()
            .copied()
            .filter(|b| succs[b].is_empty())
            .collect();

        let mut idom: HashMap<BlockId, Option<BlockId>> = HashMap::with_capacity(all.len());
        for &e in &exits {
            idom.insert(e, None);
        }

        let order = reverse_postorder_from_exits(&all, &preds, &exits);

        let mut changed = true;
        while changed {
            changed = false;
            for &b in &order {
                if idom.contains_key(&b) && exits.contains(&b) {
                    continue;
                }
                let mut new_idom: Option<Option<BlockId>> = None;
                for &s in &succs[&b] {
                    if !idom.contains_key(&s) {
                        continue;
                    }
                    new_idom = Some(match new_idom {
                        None => Some(s),
                        Some(cur) => intersect(cur, Some(s), &idom),
                    });
                }
                if let Some(ni) = new_idom {
                    if idom.get(&b).copied() != Some(ni) {
                        idom.insert(b, ni);
                        changed = true;
                    }
                }
            }
        }

        Self { idom }
    }
}

impl PostDominance for PostDomTree {
    /// `a` post-dominates `b` iff `a` lies on `b`'s idom chain (or `a == b`).
    fn dominates(&self, a: BlockId, b: BlockId) -> bool {
        if a == b {
            return true;
        }
        let mut cur = self.idom.get(&b).copied().flatten();
        while let Some(c) = cur {
            if c == a {
                return true;
            }
            cur = self.idom.get(&c).copied().flatten();
        }
        false
    }
}

fn chain(mut cur: Option<BlockId>, idom: &HashMap<BlockId, Option<BlockId>>) -> Vec<Option<BlockId>> {
    let mut v = vec![cur];
    while let Some(b) = cur {
        cur = idom.get(&b).copied().flatten();
        v.push(cur);
    }
    v
}

fn intersect(
    x: Option<BlockId>,
    y: Option<BlockId>,
    idom: &HashMap<BlockId, Option<BlockId>>,
) -> Option<BlockId> {
    let ancestors_x: HashSet<Option<BlockId>> = chain(x, idom).into_iter().collect();
    for node in chain(y, idom) {
        if ancestors_x.contains(&node) {
            return node;
        }
    }
    None
}

fn reverse_postorder_from_exits(
    all: &[BlockId],
    preds: &HashMap<BlockId, Vec<BlockId>>,
    exits: &[BlockId],
) -> Vec<BlockId> {
    let mut visited = HashSet::new();
    let mut postorder = Vec::with_capacity(all.len());
    for &e in exits {
        dfs_preds(e, preds, &mut visited, &mut postorder);
    }
    // Blocks unreachable backward from any exit (e.g. a function whose only
    // path is an infinite loop) still need an idom entry; visit the rest in
    // program order so the fixpoint loop still reaches them.
    for &b in all {
        if !visited.contains(&b) {
            dfs_preds(b, preds, &mut visited, &mut postorder);
        }
    }
    postorder.reverse();
    postorder
}

fn dfs_preds(
    b: BlockId,
    preds: &HashMap<BlockId, Vec<BlockId>>,
    visited: &mut HashSet<BlockId>,
    postorder: &mut Vec<BlockId>,
) {
    if !visited.insert(b) {
        return;
    }
    if let Some(ps) = preds.get(&b) {
        for &p in ps {
            dfs_preds(p, preds, visited, postorder);
        }
    }
    postorder.push(b);
}
