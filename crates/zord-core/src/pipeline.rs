//! Detection + recognition pipeline shared by tracking and identity lookup.

use crate::detector::{DetectorError, FaceDetector};
use crate::recognizer::{FaceRecognizer, RecognizerError};
use crate::types::{BoundingBox, Embedding};
use image::RgbImage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("detector error: {0}")]
    Detector(#[from] DetectorError),
    #[error("recognizer error: {0}")]
    Recognizer(#[from] RecognizerError),
}

/// Finds faces in a raster, most confident first.
pub trait FaceLocator {
    fn locate(&mut self, image: &RgbImage) -> Result<Vec<BoundingBox>, PipelineError>;
}

/// Produces the signature of the primary face in a raster, if any.
pub trait SignatureExtractor {
    fn extract_signature(&mut self, image: &RgbImage) -> Result<Option<Embedding>, PipelineError>;
}

/// SCRFD detector paired with the ArcFace recognizer.
pub struct FacePipeline {
    detector: FaceDetector,
    recognizer: FaceRecognizer,
}

impl FacePipeline {
    pub fn new(detector: FaceDetector, recognizer: FaceRecognizer) -> Self {
        Self { detector, recognizer }
    }

    /// Load both models from their ONNX files.
    pub fn load(scrfd_path: &str, arcface_path: &str) -> Result<Self, PipelineError> {
        let detector = FaceDetector::load(scrfd_path)?;
        let recognizer = FaceRecognizer::load(arcface_path)?;
        Ok(Self::new(detector, recognizer))
    }
}

impl FaceLocator for FacePipeline {
    fn locate(&mut self, image: &RgbImage) -> Result<Vec<BoundingBox>, PipelineError> {
        Ok(self.detector.detect(image)?)
    }
}

impl SignatureExtractor for FacePipeline {
    fn extract_signature(&mut self, image: &RgbImage) -> Result<Option<Embedding>, PipelineError> {
        let faces = self.detector.detect(image)?;
        let Some(face) = faces.first() else {
            return Ok(None);
        };
        tracing::debug!(confidence = face.confidence, faces = faces.len(), "encoding primary face");
        Ok(Some(self.recognizer.extract(image, face)?))
    }
}
