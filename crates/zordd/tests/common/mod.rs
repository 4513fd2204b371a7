#![allow(dead_code)]

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::{ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use zord_core::pipeline::PipelineError;
use zord_core::{BoundingBox, Embedding, FaceLocator, FaceSignature, IdentityGallery, SignatureExtractor};
use zordd::describer::DescribeError;
use zordd::{spawn_engine, AppState, DescriptionService, MessageRouter, SceneDescriber};

pub const KNOWN_NAME: &str = "Ada Lovelace";
pub const DESCRIPTION: &str = "One human. Indoors. Lighting nominal.";

/// Bright images hold one face covering the left half of the frame; dark ones are empty.
/// The signature is the average colour of the top-left pixel.
pub struct BrightnessPipeline;

fn is_bright(image: &RgbImage) -> bool {
    let p = image.get_pixel(0, 0).0;
    p.iter().map(|&v| v as u32).sum::<u32>() / 3 > 128
}

impl FaceLocator for BrightnessPipeline {
    fn locate(&mut self, image: &RgbImage) -> Result<Vec<BoundingBox>, PipelineError> {
        if !is_bright(image) {
            return Ok(vec![]);
        }
        Ok(vec![BoundingBox {
            x: 0.0,
            y: 0.0,
            width: image.width() as f32 / 2.0,
            height: image.height() as f32,
            confidence: 0.97,
            landmarks: None,
        }])
    }
}

impl SignatureExtractor for BrightnessPipeline {
    fn extract_signature(&mut self, image: &RgbImage) -> Result<Option<Embedding>, PipelineError> {
        if !is_bright(image) {
            return Ok(None);
        }
        let p = image.get_pixel(0, 0).0;
        Ok(Some(Embedding::new(p.iter().map(|&v| v as f32 / 255.0).collect())))
    }
}

/// Description service that either answers with [`DESCRIPTION`] or fails.
pub struct FakeService {
    pub fail: bool,
    pub calls: AtomicUsize,
}

impl FakeService {
    pub fn ok() -> Arc<Self> {
        Arc::new(Self { fail: false, calls: AtomicUsize::new(0) })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self { fail: true, calls: AtomicUsize::new(0) })
    }
}

#[async_trait]
impl DescriptionService for FakeService {
    async fn describe(&self, _image: &[u8]) -> Result<String, DescribeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(DescribeError::Status {
                status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
                body: "simulated outage".into(),
            });
        }
        Ok(DESCRIPTION.to_string())
    }
}

/// Gallery with one white-faced known person.
pub fn gallery() -> IdentityGallery {
    IdentityGallery::from_signatures(vec![FaceSignature {
        name: KNOWN_NAME.into(),
        embedding: Embedding::new(vec![1.0, 1.0, 1.0]),
    }])
}

pub fn router_with(service: Arc<FakeService>) -> MessageRouter {
    let engine = spawn_engine(BrightnessPipeline).expect("engine");
    let describer = SceneDescriber::new(service, engine.clone(), Arc::new(gallery()));
    MessageRouter::new(engine, describer)
}

pub fn state_with(service: Arc<FakeService>) -> AppState {
    AppState { router: router_with(service) }
}

pub fn encode(color: [u8; 3], format: ImageFormat) -> String {
    let mut out = Cursor::new(Vec::new());
    RgbImage::from_pixel(64, 48, Rgb(color))
        .write_to(&mut out, format)
        .expect("encode image");
    BASE64.encode(out.into_inner())
}

/// A bright frame in which the fake pipeline finds one face.
pub fn face_jpeg() -> String {
    encode([255, 255, 255], ImageFormat::Jpeg)
}

/// A dark frame with no face.
pub fn empty_jpeg() -> String {
    encode([0, 0, 0], ImageFormat::Jpeg)
}
