//! In-memory gallery of known faces, built once from a directory of reference images.

use crate::decoder;
use crate::pipeline::SignatureExtractor;
use crate::types::{Embedding, EuclideanMatcher, FaceSignature, MatchResult, Matcher};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Maximum Euclidean distance for a positive identity match.
///
/// Signatures are unit-length ArcFace embeddings, where `d = sqrt(2 - 2cos)`.
/// 1.1 accepts cosine similarity of about 0.40 and above.
pub const DEFAULT_MATCH_THRESHOLD: f32 = 1.1;

#[derive(Error, Debug)]
pub enum GalleryError {
    #[error("cannot read gallery directory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Immutable set of named face signatures.
#[derive(Debug, Clone)]
pub struct IdentityGallery {
    signatures: Vec<FaceSignature>,
    threshold: f32,
}

impl IdentityGallery {
    pub fn empty() -> Self {
        Self::from_signatures(Vec::new())
    }

    pub fn from_signatures(signatures: Vec<FaceSignature>) -> Self {
        Self { signatures, threshold: DEFAULT_MATCH_THRESHOLD }
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Scan `dir` once and keep one signature per image that contains a face.
    ///
    /// A missing directory gives an empty gallery. Unreadable files, non-images
    /// and images without a face are skipped.
    pub fn load<E: SignatureExtractor + ?Sized>(dir: &Path, extractor: &mut E) -> Result<Self, GalleryError> {
        if !dir.exists() {
            tracing::warn!(dir = %dir.display(), "known-faces directory not found; gallery is empty");
            return Ok(Self::empty());
        }

        let io_err = |source| GalleryError::Io { path: dir.to_path_buf(), source };
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();

        let mut signatures = Vec::with_capacity(paths.len());
        for path in &paths {
            if let Some(signature) = load_signature(path, extractor) {
                tracing::info!(name = %signature.name, file = %path.display(), "known face loaded");
                signatures.push(signature);
            }
        }

        tracing::info!(
            dir = %dir.display(),
            files = paths.len(),
            faces = signatures.len(),
            "identity gallery ready"
        );
        Ok(Self::from_signatures(signatures))
    }

    pub fn signatures(&self) -> &[FaceSignature] {
        &self.signatures
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }

    /// Nearest-neighbour comparison with the distance attached.
    pub fn compare(&self, query: &Embedding) -> MatchResult {
        EuclideanMatcher.compare(query, &self.signatures, self.threshold)
    }

    /// Name of the closest signature within the threshold.
    pub fn match_name(&self, query: &Embedding) -> Option<String> {
        if self.signatures.is_empty() {
            return None;
        }
        let result = self.compare(query);
        tracing::debug!(distance = result.distance, matched = result.matched, "gallery lookup");
        result.name
    }
}

/// Display name for a reference image: file stem with underscores as spaces.
pub fn name_from_path(path: &Path) -> Option<String> {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().replace('_', " "))
}

fn load_signature<E: SignatureExtractor + ?Sized>(path: &Path, extractor: &mut E) -> Option<FaceSignature> {
    let name = name_from_path(path)?;
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(file = %path.display(), error = %e, "skipping unreadable known face");
            return None;
        }
    };
    let image = match decoder::decode_raster(&bytes) {
        Ok(image) => image,
        Err(e) => {
            tracing::warn!(file = %path.display(), error = %e, "skipping known face that is not an image");
            return None;
        }
    };
    match extractor.extract_signature(&image) {
        Ok(Some(embedding)) => Some(FaceSignature { name, embedding }),
        Ok(None) => {
            tracing::debug!(file = %path.display(), "no face in reference image; skipped");
            None
        }
        Err(e) => {
            tracing::warn!(file = %path.display(), error = %e, "signature extraction failed; skipped");
            None
        }
    }
}
