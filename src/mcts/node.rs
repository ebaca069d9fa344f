//! MCTS node structure.
//!
//! Uses arena-based allocation with index references (NodeId); a node owns a
//! snapshot of its position and knows its parent only by index.

use smallvec::SmallVec;

use crate::rules::Game;

/// Index into the MCTSTree node arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Sentinel value representing no node.
    pub const NONE: NodeId = NodeId(u32::MAX);

    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[inline]
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 == u32::MAX
    }

    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_none() {
            write!(f, "NodeId(NONE)")
        } else {
            write!(f, "NodeId({})", self.0)
        }
    }
}

/// A node in the MCTS tree.
///
/// `value_sum` is accumulated from the perspective of the player who made
/// the move into this node, so a parent maximizes over its children.
#[derive(Clone, Debug)]
pub struct MCTSNode<G: Game> {
    /// Position at this node (hashing disabled).
    pub state: G,

    /// Parent node (NONE for root).
    pub parent: NodeId,

    /// Move that led here from the parent.
    pub mv: Option<G::Move>,

    /// Children, one per legal move, created at expansion.
    pub children: SmallVec<[NodeId; 8]>,

    pub expanded: bool,

    pub terminal: bool,

    /// Real visits plus any pending virtual visits.
    pub visits: u32,

    pub value_sum: f32,

    /// Prior probability from the oracle.
    pub prior: f32,

    /// Depth in tree (root = 0).
    pub depth: u16,
}

impl<G: Game> MCTSNode<G> {
    pub fn new(state: G, parent: NodeId, mv: Option<G::Move>, prior: f32, depth: u16) -> Self {
        let terminal = state.is_over();
        Self {
            state,
            parent,
            mv,
            children: SmallVec::new(),
            expanded: false,
            terminal,
            visits: 0,
            value_sum: 0.0,
            prior,
            depth,
        }
    }

    pub fn root(state: G) -> Self {
        Self::new(state, NodeId::NONE, None, 0.0, 0)
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Exploitation term used by PUCT, `value_sum / (visits + 1)`.
    #[must_use]
    pub fn q(&self) -> f32 {
        self.value_sum / (self.visits as f32 + 1.0)
    }

    /// Mean backed-up value, 0 when unvisited.
    #[must_use]
    pub fn mean_value(&self) -> f32 {
        if self.visits == 0 {
            0.0
        } else {
            self.value_sum / self.visits as f32
        }
    }
}
