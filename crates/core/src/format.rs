use serde::Deserialize;
use thiserror::Error;

use crate::model::Frame;

#[derive(Debug, Error)]
pub enum TraceParseError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported profile type {0:?}, only \"evented\" traces can be reconstructed")]
    NotEvented(String),
}

/// Evented trace wire format: a flat event stream over a shared frame
/// table. Schema follows the speedscope evented profile layout.
#[derive(Debug, Clone, Deserialize)]
pub struct EventedTrace {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub profile_type: Option<String>,
    #[serde(rename = "startValue")]
    pub start_value: f64,
    #[serde(rename = "endValue")]
    pub end_value: f64,
    pub unit: String,
    pub events: Vec<TraceEvent>,
    /// Required; an evented trace without a frame table is unusable.
    pub shared: SharedData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SharedData {
    pub frames: Vec<FrameDescriptor>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FrameDescriptor {
    pub name: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub line: Option<u32>,
    #[serde(default)]
    pub col: Option<u32>,
}

impl From<&FrameDescriptor> for Frame {
    fn from(descriptor: &FrameDescriptor) -> Self {
        Frame {
            name: descriptor.name.clone(),
            file: descriptor.file.clone(),
            line: descriptor.line,
        }
    }
}

/// One event in the stream: `{"type": "O"|"C", "at": ..., "frame": ...}`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum TraceEvent {
    #[serde(rename = "O")]
    Open { at: f64, frame: usize },
    #[serde(rename = "C")]
    Close { at: f64, frame: usize },
}

/// Parse an evented trace from JSON. Sampled profiles are rejected with
/// a typed error rather than misread as an empty event stream.
pub fn parse_trace(data: &[u8]) -> Result<EventedTrace, TraceParseError> {
    let trace: EventedTrace = serde_json::from_slice(data)?;
    if let Some(kind) = &trace.profile_type
        && kind != "evented"
    {
        return Err(TraceParseError::NotEvented(kind.clone()));
    }
    Ok(trace)
}
