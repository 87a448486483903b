use serde::{Deserialize, Serialize};

/// One call-site occurrence in the reconstructed tree. Sibling
/// activations of the same frame under the same parent are merged into a
/// single node; weights accumulate across all of them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallTreeNode {
    /// Index into the profile's frame registry.
    pub frame: usize,
    /// Arena id of the enclosing node; `None` for roots.
    pub parent: Option<usize>,
    /// Arena ids of children, in first-encountered (append) order.
    pub children: Vec<usize>,
    /// Cumulative duration across all activations, callees included.
    pub total_weight: f64,
    /// Time spent in this frame exclusive of time spent in callees.
    pub self_weight: f64,
    recursive: bool,
}

impl CallTreeNode {
    fn new(frame: usize, parent: Option<usize>) -> Self {
        Self {
            frame,
            parent,
            children: Vec::new(),
            total_weight: 0.0,
            self_weight: 0.0,
            recursive: false,
        }
    }

    /// True if this node's frame already appeared among its ancestors on
    /// the active stack when the node was first activated.
    pub fn is_recursive(&self) -> bool {
        self.recursive
    }
}

/// Arena-backed call tree. Nodes are owned by the arena and addressed by
/// index; parent links are plain back-references, so there are no
/// ownership cycles. Nodes are never removed once created.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CallTree {
    nodes: Vec<CallTreeNode>,
    roots: Vec<usize>,
}

impl CallTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, id: usize) -> Option<&CallTreeNode> {
        self.nodes.get(id)
    }

    /// Root node ids in append order.
    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Return the existing child of `parent` for `frame`, or create one
    /// and append it. `parent == None` addresses the root forest.
    /// Identity is the (parent, frame index) pair, so the lookup is
    /// deterministic.
    pub(crate) fn get_or_create_child(&mut self, parent: Option<usize>, frame: usize) -> usize {
        let siblings = match parent {
            Some(p) => &self.nodes[p].children,
            None => &self.roots,
        };
        let existing = siblings
            .iter()
            .copied()
            .find(|&id| self.nodes[id].frame == frame);
        if let Some(id) = existing {
            return id;
        }

        let id = self.nodes.len();
        self.nodes.push(CallTreeNode::new(frame, parent));
        match parent {
            Some(p) => self.nodes[p].children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    pub(crate) fn mark_recursive(&mut self, id: usize) {
        self.nodes[id].recursive = true;
    }

    /// Account for one finished activation of `id` lasting `delta`.
    /// The elapsed time lands in the node's total and self weights, and
    /// the parent's self weight drops by the same amount, since that
    /// time was not spent in the parent directly. The parent's own close
    /// settles the balance, leaving every finished node with
    /// `0 <= self_weight <= total_weight`.
    pub(crate) fn record_close(&mut self, id: usize, delta: f64) {
        let node = &mut self.nodes[id];
        node.total_weight += delta;
        node.self_weight += delta;
        if let Some(parent) = node.parent {
            self.nodes[parent].self_weight -= delta;
        }
    }
}
