use image::RgbImage;
use std::panic::{catch_unwind, AssertUnwindSafe};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use zord_core::pipeline::PipelineError;
use zord_core::{tracker, Embedding, FaceLocator, SignatureExtractor, TrackingPoint};

/// Requests queued ahead of the engine before senders start waiting.
const ENGINE_QUEUE_DEPTH: usize = 16;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),
    #[error("failed to spawn engine thread: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("engine thread exited")]
    ChannelClosed,
    #[error("pipeline panicked while processing the request")]
    Panicked,
}

/// Messages sent from sessions to the engine thread.
enum EngineRequest {
    Track {
        image: RgbImage,
        reply: oneshot::Sender<Option<TrackingPoint>>,
    },
    Encode {
        image: RgbImage,
        reply: oneshot::Sender<Result<Option<Embedding>, EngineError>>,
    },
}

/// Clone-safe handle to the engine thread.
#[derive(Clone)]
pub struct EngineHandle {
    tx: mpsc::Sender<EngineRequest>,
}

impl EngineHandle {
    /// Normalized centre of the primary face, `None` when nothing is detected.
    pub async fn track(&self, image: RgbImage) -> Result<Option<TrackingPoint>, EngineError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(EngineRequest::Track { image, reply: reply_tx })
            .await
            .map_err(|_| EngineError::ChannelClosed)?;
        reply_rx.await.map_err(|_| EngineError::ChannelClosed)
    }

    /// Signature of the primary face, `None` when the image has no face.
    pub async fn encode(&self, image: RgbImage) -> Result<Option<Embedding>, EngineError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(EngineRequest::Encode { image, reply: reply_tx })
            .await
            .map_err(|_| EngineError::ChannelClosed)?;
        reply_rx.await.map_err(|_| EngineError::ChannelClosed)?
    }
}

/// Spawn the engine on a dedicated OS thread.
///
/// The pipeline holds the ONNX sessions, which need exclusive access, so a
/// single instance is shared by every session through the request queue.
/// A panic inside the pipeline is contained to the request that caused it;
/// the thread keeps serving. It exits once every handle has been dropped.
pub fn spawn_engine<P>(mut pipeline: P) -> Result<EngineHandle, EngineError>
where
    P: FaceLocator + SignatureExtractor + Send + 'static,
{
    let (tx, mut rx) = mpsc::channel::<EngineRequest>(ENGINE_QUEUE_DEPTH);

    std::thread::Builder::new()
        .name("zord-engine".into())
        .spawn(move || {
            tracing::info!("engine thread started");
            while let Some(req) = rx.blocking_recv() {
                match req {
                    EngineRequest::Track { image, reply } => {
                        let point = catch_unwind(AssertUnwindSafe(|| tracker::track(&mut pipeline, &image)))
                            .unwrap_or_else(|_| {
                                tracing::error!("pipeline panicked during tracking; frame dropped");
                                None
                            });
                        let _ = reply.send(point);
                    }
                    EngineRequest::Encode { image, reply } => {
                        let result = match catch_unwind(AssertUnwindSafe(|| pipeline.extract_signature(&image))) {
                            Ok(result) => result.map_err(EngineError::from),
                            Err(_) => {
                                tracing::error!("pipeline panicked during signature extraction");
                                Err(EngineError::Panicked)
                            }
                        };
                        let _ = reply.send(result);
                    }
                }
            }
            tracing::info!("engine thread exiting");
        })
        .map_err(EngineError::Spawn)?;

    Ok(EngineHandle { tx })
}
