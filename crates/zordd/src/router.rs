//! Per-message routing policy, independent of the transport.

use crate::describer::SceneDescriber;
use crate::engine::EngineHandle;
use crate::protocol::{Inbound, Outbound};
use zord_core::decoder;

/// Dispatches each inbound message to tracking or description.
#[derive(Clone)]
pub struct MessageRouter {
    engine: EngineHandle,
    describer: SceneDescriber,
}

impl MessageRouter {
    pub fn new(engine: EngineHandle, describer: SceneDescriber) -> Self {
        Self { engine, describer }
    }

    /// Handle one text message.
    ///
    /// Describe commands always produce a reply. Tracking frames reply only
    /// when a face is found; decode and detection failures are dropped.
    pub async fn handle(&self, text: &str) -> Option<Outbound> {
        match Inbound::parse(text) {
            Inbound::Describe(payload) => {
                tracing::info!(bytes = payload.len(), "describe command received");
                let result = self.describer.describe_payload(payload).await;
                Some(Outbound::Description { text: result.text, recognized: result.recognized })
            }
            Inbound::Frame(frame) => self.track(frame).await,
        }
    }

    async fn track(&self, frame: &str) -> Option<Outbound> {
        let image = match decoder::decode_frame(frame) {
            Ok(image) => image,
            Err(e) => {
                tracing::debug!(error = %e, "tracking frame dropped");
                return None;
            }
        };
        match self.engine.track(image).await {
            Ok(point) => point.map(Outbound::tracking),
            Err(e) => {
                tracing::warn!(error = %e, "tracking failed");
                None
            }
        }
    }
}
