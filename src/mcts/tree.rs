//! Arena-based MCTS tree.
//!
//! Uses a flat `Vec<MCTSNode>` with index-based references. Promoting a
//! child to root copies its subtree into a fresh arena.

use rustc_hash::FxHashMap;

use super::node::{MCTSNode, NodeId};
use crate::rules::Game;

/// Arena-based MCTS tree.
#[derive(Clone, Debug)]
pub struct MCTSTree<G: Game> {
    nodes: Vec<MCTSNode<G>>,

    /// The root node ID (always 0).
    root: NodeId,
}

impl<G: Game> MCTSTree<G> {
    /// Create a new tree whose root holds `state`.
    pub fn new(state: G) -> Self {
        let mut nodes = Vec::with_capacity(1024);
        nodes.push(MCTSNode::root(state));
        Self {
            nodes,
            root: NodeId::new(0),
        }
    }

    #[inline]
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[inline]
    #[must_use]
    pub fn get(&self, id: NodeId) -> &MCTSNode<G> {
        &self.nodes[id.0 as usize]
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut MCTSNode<G> {
        &mut self.nodes[id.0 as usize]
    }

    /// Allocate a new node, returning its ID.
    pub fn alloc(&mut self, node: MCTSNode<G>) -> NodeId {
        let id = NodeId::new(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Add a child under `parent` for `mv`, returning its ID.
    pub fn add_child(&mut self, parent: NodeId, mv: G::Move, state: G, prior: f32) -> NodeId {
        let depth = self.get(parent).depth + 1;
        let child = self.alloc(MCTSNode::new(state, parent, Some(mv), prior, depth));
        self.get_mut(parent).children.push(child);
        child
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn root_node(&self) -> &MCTSNode<G> {
        self.get(self.root)
    }

    pub fn root_node_mut(&mut self) -> &mut MCTSNode<G> {
        self.get_mut(self.root)
    }

    /// Clear the tree and reset with a new root.
    pub fn reset(&mut self, state: G) {
        self.nodes.clear();
        self.nodes.push(MCTSNode::root(state));
        self.root = NodeId::new(0);
    }

    /// Descendants of the root at most `max_depth` plies below it, breadth first.
    pub fn descendants(&self, max_depth: u16) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut frontier = vec![self.root];
        for _ in 0..max_depth {
            let next: Vec<NodeId> = frontier
                .iter()
                .flat_map(|&id| self.get(id).children.iter().copied())
                .collect();
            found.extend_from_slice(&next);
            frontier = next;
        }
        found
    }

    /// Make `new_root` the root, dropping everything outside its subtree.
    ///
    /// Node IDs are renumbered; depths are rebased so the new root is 0.
    pub fn promote(&mut self, new_root: NodeId) {
        if new_root == self.root {
            return;
        }

        // Breadth-first order guarantees parents are copied before children.
        let mut order = vec![new_root];
        let mut i = 0;
        while i < order.len() {
            let id = order[i];
            order.extend(self.get(id).children.iter().copied());
            i += 1;
        }

        let remap: FxHashMap<NodeId, NodeId> = order
            .iter()
            .enumerate()
            .map(|(new, &old)| (old, NodeId::new(new as u32)))
            .collect();
        let base_depth = self.get(new_root).depth;

        let mut old_nodes: Vec<Option<MCTSNode<G>>> = self.nodes.drain(..).map(Some).collect();
        let mut nodes = Vec::with_capacity(order.len());
        for old in order {
            let Some(mut node) = old_nodes[old.0 as usize].take() else {
                continue;
            };
            node.parent = remap.get(&node.parent).copied().unwrap_or(NodeId::NONE);
            node.children = node.children.iter().filter_map(|c| remap.get(c).copied()).collect();
            node.depth -= base_depth;
            nodes.push(node);
        }

        self.nodes = nodes;
        self.root = NodeId::new(0);
    }

    /// Iterate over all nodes.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &MCTSNode<G>)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (NodeId::new(i as u32), n))
    }

    #[must_use]
    pub fn stats(&self) -> TreeStats {
        let max_depth = self.nodes.iter().map(|n| n.depth).max().unwrap_or(0);
        let terminal_count = self.nodes.iter().filter(|n| n.terminal).count();
        let expanded_count = self.nodes.iter().filter(|n| n.expanded).count();
        let total_children: usize = self.nodes.iter().map(|n| n.children.len()).sum();

        TreeStats {
            node_count: self.nodes.len(),
            max_depth,
            terminal_count,
            expanded_count,
            total_children,
        }
    }
}

/// Statistics about the MCTS tree.
#[derive(Clone, Debug, Default)]
pub struct TreeStats {
    pub node_count: usize,

    pub max_depth: u16,

    pub terminal_count: usize,

    pub expanded_count: usize,

    /// Sum of child counts over all nodes.
    pub total_children: usize,
}

impl TreeStats {
    /// Average children per expanded node.
    #[must_use]
    pub fn branching_factor(&self) -> f64 {
        if self.expanded_count == 0 {
            0.0
        } else {
            self.total_children as f64 / self.expanded_count as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::ConnectFour;

    /// Root with every column expanded, and column 3 expanded again below.
    fn two_level_tree() -> MCTSTree<ConnectFour> {
        let mut tree = MCTSTree::new(ConnectFour::new());
        let root = tree.root();
        expand(&mut tree, root);
        let third = tree.get(root).children[3];
        expand(&mut tree, third);
        tree
    }

    fn expand(tree: &mut MCTSTree<ConnectFour>, id: NodeId) {
        let state = tree.get(id).state.clone();
        for mut mv in state.legal_moves() {
            let mut child = state.clone();
            child.apply(&mut mv);
            tree.add_child(id, mv, child, 1.0 / 7.0);
        }
        tree.get_mut(id).expanded = true;
    }

    #[test]
    fn test_tree_new() {
        let tree = MCTSTree::new(ConnectFour::new());
        assert_eq!(tree.len(), 1);
        assert!(!tree.is_empty());
        assert_eq!(tree.root(), NodeId::new(0));
        assert!(tree.root_node().is_root());
    }

    #[test]
    fn test_add_child() {
        let tree = two_level_tree();
        assert_eq!(tree.len(), 15);
        let root = tree.root_node();
        assert_eq!(root.children.len(), 7);

        let child = tree.get(root.children[2]);
        assert_eq!(child.parent, tree.root());
        assert_eq!(child.depth, 1);
        assert_eq!(child.mv.map(|m| m.column()), Some(2));
    }

    #[test]
    fn test_descendants() {
        let tree = two_level_tree();
        assert_eq!(tree.descendants(0).len(), 0);
        assert_eq!(tree.descendants(1).len(), 7);
        assert_eq!(tree.descendants(2).len(), 14);
    }

    #[test]
    fn test_promote() {
        let mut tree = two_level_tree();
        let third = tree.get(tree.root()).children[3];
        let expected_state = tree.get(third).state.clone();
        tree.get_mut(third).visits = 9;

        tree.promote(third);

        assert_eq!(tree.len(), 8);
        let root = tree.root_node();
        assert!(root.is_root());
        assert_eq!(root.depth, 0);
        assert_eq!(root.visits, 9);
        assert_eq!(root.state, expected_state);
        for &child in &root.children {
            assert_eq!(tree.get(child).parent, tree.root());
            assert_eq!(tree.get(child).depth, 1);
        }
    }

    #[test]
    fn test_tree_reset() {
        let mut tree = two_level_tree();
        tree.reset(ConnectFour::new());
        assert_eq!(tree.len(), 1);
        assert!(tree.root_node().children.is_empty());
    }

    #[test]
    fn test_tree_stats() {
        let tree = two_level_tree();
        let stats = tree.stats();
        assert_eq!(stats.node_count, 15);
        assert_eq!(stats.max_depth, 2);
        assert_eq!(stats.terminal_count, 0);
        assert_eq!(stats.expanded_count, 2);
        assert_eq!(stats.branching_factor(), 7.0);
    }

    #[test]
    fn test_tree_iter() {
        let tree = two_level_tree();
        let nodes: Vec<_> = tree.iter().collect();
        assert_eq!(nodes.len(), 15);
        assert_eq!(nodes[0].0, NodeId::new(0));
    }
}
