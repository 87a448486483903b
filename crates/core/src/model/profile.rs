use serde::{Deserialize, Serialize};

use crate::model::call_tree::{CallTree, CallTreeNode};
use crate::model::frame::{Frame, FrameRegistry};

/// A finished import: the append-order call tree forest plus the trace
/// bounds. Immutable after construction; traversal never mutates it, so
/// a profile can be shared freely across threads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    /// Time unit of the input timestamps ("milliseconds", ...).
    /// Informational only; weights stay in input units.
    pub unit: String,
    pub started_at: f64,
    pub ended_at: f64,
    /// Smallest strictly positive open-to-close interval observed, used
    /// downstream to cull sub-pixel frames. `None` when the trace had no
    /// positive-width activation.
    pub min_frame_duration: Option<f64>,
    frames: FrameRegistry,
    tree: CallTree,
}

impl Profile {
    pub(crate) fn new(
        name: String,
        unit: String,
        started_at: f64,
        ended_at: f64,
        min_frame_duration: Option<f64>,
        frames: FrameRegistry,
        tree: CallTree,
    ) -> Self {
        Self {
            name,
            unit,
            started_at,
            ended_at,
            min_frame_duration,
            frames,
            tree,
        }
    }

    pub fn duration(&self) -> f64 {
        self.ended_at - self.started_at
    }

    pub fn call_tree(&self) -> &CallTree {
        &self.tree
    }

    pub fn frames(&self) -> &FrameRegistry {
        &self.frames
    }

    /// Resolve a node's frame index against the registry.
    pub fn frame(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    /// Depth-first walk of the append-order forest: `on_open` fires
    /// pre-order, `on_close` post-order. Stateless over the finished
    /// tree, so repeated walks yield the identical callback sequence.
    pub fn for_each(
        &self,
        mut on_open: impl FnMut(&CallTreeNode),
        mut on_close: impl FnMut(&CallTreeNode),
    ) {
        enum Step {
            Open(usize),
            Close(usize),
        }

        let mut work: Vec<Step> = self
            .tree
            .roots()
            .iter()
            .rev()
            .map(|&id| Step::Open(id))
            .collect();
        while let Some(step) = work.pop() {
            match step {
                Step::Open(id) => {
                    let Some(node) = self.tree.node(id) else {
                        continue;
                    };
                    on_open(node);
                    work.push(Step::Close(id));
                    for &child in node.children.iter().rev() {
                        work.push(Step::Open(child));
                    }
                }
                Step::Close(id) => {
                    if let Some(node) = self.tree.node(id) {
                        on_close(node);
                    }
                }
            }
        }
    }
}
