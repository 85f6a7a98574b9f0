//! Structural interning of expression nodes.

use crate::expression::Expr;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

/// Content-addressed cache of expression nodes.
///
/// Interning a tree returns a handle whose nodes, at every level, are shared
/// with any structurally equal tree interned before. Lookup-or-insert runs
/// under the map's shard lock, so concurrent callers interning equal trees
/// always receive the same node.
#[derive(Debug, Default)]
pub struct ExprCache {
    nodes: DashMap<Expr, ()>,
}

impl ExprCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&self, expr: &Expr) -> Expr {
        // Operands first, so equal subtrees collapse onto one handle
        let operands: Vec<Expr> = expr.operands().iter().map(|op| self.intern(op)).collect();
        let unchanged = operands
            .iter()
            .zip(expr.operands())
            .all(|(a, b)| a.ptr_eq(b));
        let candidate = if unchanged {
            expr.clone()
        } else {
            expr.with_operands(operands)
        };

        match self.nodes.entry(candidate) {
            Entry::Occupied(entry) => {
                log::debug!("expression cache hit: {}", entry.key());
                entry.key().clone()
            }
            Entry::Vacant(entry) => entry.insert(()).key().clone(),
        }
    }

    pub fn contains(&self, expr: &Expr) -> bool {
        self.nodes.contains_key(expr)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn clear(&self) {
        self.nodes.clear();
    }
}
