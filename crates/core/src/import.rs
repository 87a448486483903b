use thiserror::Error;
use tracing::debug;

use crate::format::{EventedTrace, TraceEvent};
use crate::model::call_tree::CallTree;
use crate::model::frame::{Frame, FrameRegistry};
use crate::model::profile::Profile;

#[derive(Debug, Error, PartialEq)]
pub enum ImportError {
    /// An event's timestamp precedes an earlier event in the stream.
    /// Timestamps must be non-decreasing across opens and closes alike.
    #[error("Sample delta cannot be negative, samples may be corrupt or out of order")]
    OutOfOrder,
    /// A close event does not match the innermost open frame, or open
    /// frames remain after the last event.
    #[error("Unbalanced append order stack")]
    UnbalancedStack,
    /// An event references a frame the shared table does not have.
    #[error("frame index {index} out of bounds for frame table of {len} frames")]
    FrameIndexOutOfBounds { index: usize, len: usize },
}

/// Replay state for one import: the call tree under construction plus
/// the stack of currently open activations. Local to a single call to
/// [`import_evented`], never shared.
struct Importer {
    tree: CallTree,
    frame_count: usize,
    /// Node ids of open activations, innermost last.
    stack: Vec<usize>,
    /// Open timestamp for each entry in `stack`.
    open_at: Vec<f64>,
    /// Timestamp of the most recent event, open or close.
    last_at: Option<f64>,
    min_frame_duration: Option<f64>,
}

impl Importer {
    fn new(frame_count: usize) -> Self {
        Self {
            tree: CallTree::new(),
            frame_count,
            stack: Vec::new(),
            open_at: Vec::new(),
            last_at: None,
            min_frame_duration: None,
        }
    }

    fn check_frame(&self, index: usize) -> Result<(), ImportError> {
        if index >= self.frame_count {
            return Err(ImportError::FrameIndexOutOfBounds {
                index,
                len: self.frame_count,
            });
        }
        Ok(())
    }

    /// Timestamps must be non-decreasing across the whole stream, so an
    /// event running backwards relative to the previous one is corrupt
    /// even when its matching open/close pair looks consistent.
    fn check_order(&mut self, at: f64) -> Result<(), ImportError> {
        if self.last_at.is_some_and(|last| at < last) {
            return Err(ImportError::OutOfOrder);
        }
        self.last_at = Some(at);
        Ok(())
    }

    fn open_frame(&mut self, frame: usize, at: f64) -> Result<(), ImportError> {
        self.check_frame(frame)?;
        self.check_order(at)?;

        let parent = self.stack.last().copied();
        let id = self.tree.get_or_create_child(parent, frame);

        // Direct or indirect recursion: the same frame is already open
        // somewhere on the active stack.
        let already_active = self
            .stack
            .iter()
            .any(|&open| self.tree.node(open).is_some_and(|n| n.frame == frame));
        if already_active {
            self.tree.mark_recursive(id);
        }

        self.stack.push(id);
        self.open_at.push(at);
        Ok(())
    }

    fn close_frame(&mut self, frame: usize, at: f64) -> Result<(), ImportError> {
        self.check_frame(frame)?;
        self.check_order(at)?;

        let (Some(id), Some(opened)) = (self.stack.pop(), self.open_at.pop()) else {
            return Err(ImportError::UnbalancedStack);
        };
        if self.tree.node(id).is_none_or(|n| n.frame != frame) {
            return Err(ImportError::UnbalancedStack);
        }

        let delta = at - opened;
        if delta < 0.0 {
            return Err(ImportError::OutOfOrder);
        }

        self.tree.record_close(id, delta);

        // Zero-width activations are legal but do not participate in the
        // culling threshold.
        if delta > 0.0 {
            self.min_frame_duration = Some(match self.min_frame_duration {
                Some(current) => current.min(delta),
                None => delta,
            });
        }
        Ok(())
    }
}

/// Reconstruct a call tree from an ordered open/close event stream.
///
/// Single pass over the events with an explicit stack; O(n) in event
/// count. Any malformed input aborts the whole import; no partial
/// profile is ever returned.
pub fn import_evented(trace: &EventedTrace) -> Result<Profile, ImportError> {
    let registry = FrameRegistry::new(trace.shared.frames.iter().map(Frame::from).collect());

    let mut importer = Importer::new(registry.len());
    for event in &trace.events {
        match *event {
            TraceEvent::Open { at, frame } => importer.open_frame(frame, at)?,
            TraceEvent::Close { at, frame } => importer.close_frame(frame, at)?,
        }
    }

    if !importer.stack.is_empty() {
        return Err(ImportError::UnbalancedStack);
    }

    debug!(
        name = %trace.name,
        events = trace.events.len(),
        nodes = importer.tree.len(),
        "imported evented profile"
    );

    Ok(Profile::new(
        trace.name.clone(),
        trace.unit.clone(),
        trace.start_value,
        trace.end_value,
        importer.min_frame_duration,
        registry,
        importer.tree,
    ))
}
