//! Reconstruction of call trees from evented profiling traces.
//!
//! An evented trace is a flat, timestamp-ordered stream of open/close
//! events referencing a shared frame table. [`import::import_evented`]
//! replays that stream against an explicit stack and produces a
//! [`model::Profile`]: an append-order forest of call tree nodes with
//! total/self weights and recursion flags, ready for downstream
//! rendering or analysis.

pub mod format;
pub mod import;
pub mod model;

pub use format::{EventedTrace, TraceEvent, TraceParseError, parse_trace};
pub use import::{ImportError, import_evented};
pub use model::{CallTree, CallTreeNode, Frame, FrameRegistry, Profile};
