//! zord-core — Face tracking and identity recognition for the Zord vision backend.
//!
//! Uses SCRFD for face detection and ArcFace for face signatures, both
//! running via ONNX Runtime for CPU inference, plus the frame decoder and the
//! in-memory identity gallery.

pub mod alignment;
pub mod decoder;
pub mod detector;
pub mod gallery;
pub mod pipeline;
pub mod recognizer;
pub mod tracker;
pub mod types;

pub use detector::FaceDetector;
pub use gallery::IdentityGallery;
pub use pipeline::{FaceLocator, FacePipeline, SignatureExtractor};
pub use recognizer::FaceRecognizer;
pub use types::{BoundingBox, Embedding, EuclideanMatcher, FaceSignature, MatchResult, Matcher, TrackingPoint};

use std::path::PathBuf;

/// SCRFD model file name inside the model directory.
pub const SCRFD_MODEL_FILE: &str = "det_10g.onnx";
/// ArcFace model file name inside the model directory.
pub const ARCFACE_MODEL_FILE: &str = "w600k_r50.onnx";

/// Model directory used when `ZORD_MODEL_DIR` is not set.
pub fn default_model_dir() -> PathBuf {
    PathBuf::from("models")
}
