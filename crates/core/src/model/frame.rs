use serde::{Deserialize, Serialize};

/// A call-site identity: one function/location shared by every
/// activation that references it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    pub name: String,
    /// Source file, when the producer recorded one.
    pub file: Option<String>,
    pub line: Option<u32>,
}

impl Frame {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            file: None,
            line: None,
        }
    }
}

/// Immutable frame table, indexed by the integer in each event's `frame`
/// field. Built once from the trace's shared frame table and passed
/// explicitly; lookups are bounds-checked.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameRegistry {
    frames: Vec<Frame>,
}

impl FrameRegistry {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self { frames }
    }

    pub fn get(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
