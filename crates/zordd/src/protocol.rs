//! WebSocket message envelope.

use serde::Serialize;
use zord_core::decoder::DESCRIBE_MARKER;
use zord_core::TrackingPoint;

/// A classified inbound text frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inbound<'a> {
    /// Everything after the first `DESCRIBE:` marker.
    Describe(&'a str),
    /// Any other message, treated as a camera frame.
    Frame(&'a str),
}

impl<'a> Inbound<'a> {
    /// The marker is matched anywhere in the message, not only as a prefix.
    pub fn parse(text: &'a str) -> Self {
        match text.split_once(DESCRIBE_MARKER) {
            Some((_, payload)) => Inbound::Describe(payload),
            None => Inbound::Frame(text),
        }
    }
}

/// Replies sent to the client as JSON text frames.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Outbound {
    Description {
        text: String,
        recognized: Option<String>,
    },
    Tracking {
        x: f32,
        y: f32,
        detected: bool,
    },
}

impl Outbound {
    pub fn tracking(point: TrackingPoint) -> Self {
        Outbound::Tracking { x: point.x, y: point.y, detected: true }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
