use serde::{Deserialize, Serialize};

/// Bounding box for a detected face, in source-image pixels, with optional landmarks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub confidence: f32,
    /// Five-point facial landmarks: [left_eye, right_eye, nose, left_mouth, right_mouth].
    pub landmarks: Option<[(f32, f32); 5]>,
}

impl BoundingBox {
    /// Centre of the box in pixel coordinates.
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Face embedding vector (512-dimensional for ArcFace).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Embedding {
    pub values: Vec<f32>,
    /// Model version that produced this embedding (e.g., "w600k_r50").
    pub model_version: Option<String>,
}

impl Embedding {
    pub fn new(values: Vec<f32>) -> Self {
        Self { values, model_version: None }
    }

    /// Compute cosine similarity between two embeddings.
    ///
    /// Returns a value in [-1, 1]. Higher = more similar.
    pub fn similarity(&self, other: &Embedding) -> f32 {
        let mut dot = 0.0f32;
        let mut norm_a = 0.0f32;
        let mut norm_b = 0.0f32;

        for (a, b) in self.values.iter().zip(other.values.iter()) {
            dot += a * b;
            norm_a += a * a;
            norm_b += b * b;
        }

        let denom = norm_a.sqrt() * norm_b.sqrt();
        if denom > 0.0 { dot / denom } else { 0.0 }
    }

    /// Compute Euclidean distance between two embeddings.
    pub fn euclidean_distance(&self, other: &Embedding) -> f32 {
        self.values
            .iter()
            .zip(other.values.iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f32>()
            .sqrt()
    }
}

/// A named reference face loaded into the identity gallery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaceSignature {
    pub name: String,
    pub embedding: Embedding,
}

/// Result of matching a probe embedding against a gallery.
#[derive(Debug, Clone)]
pub struct MatchResult {
    pub matched: bool,
    /// Euclidean distance to the nearest signature (`f32::INFINITY` for an empty gallery).
    pub distance: f32,
    /// Name of the matched signature (if any).
    pub name: Option<String>,
}

impl MatchResult {
    fn no_match(distance: f32) -> Self {
        Self { matched: false, distance, name: None }
    }
}

/// Strategy for comparing a probe embedding against a set of signatures.
pub trait Matcher {
    fn compare(&self, probe: &Embedding, gallery: &[FaceSignature], threshold: f32) -> MatchResult;
}

/// Nearest-neighbour matcher over Euclidean distance.
///
/// The first minimum wins on ties, so results follow gallery order.
pub struct EuclideanMatcher;

impl Matcher for EuclideanMatcher {
    fn compare(&self, probe: &Embedding, gallery: &[FaceSignature], threshold: f32) -> MatchResult {
        let mut best_dist = f32::INFINITY;
        let mut best_idx: Option<usize> = None;

        for (i, signature) in gallery.iter().enumerate() {
            let dist = probe.euclidean_distance(&signature.embedding);
            // Strict comparison keeps the earliest entry among equal distances.
            if dist < best_dist {
                best_dist = dist;
                best_idx = Some(i);
            }
        }

        match best_idx {
            Some(idx) if best_dist <= threshold => MatchResult {
                matched: true,
                distance: best_dist,
                name: Some(gallery[idx].name.clone()),
            },
            _ => MatchResult::no_match(best_dist),
        }
    }
}

/// Normalized face centroid, both coordinates in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackingPoint {
    pub x: f32,
    pub y: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signature(name: &str, values: Vec<f32>) -> FaceSignature {
        FaceSignature { name: name.into(), embedding: Embedding::new(values) }
    }

    #[test]
    fn test_cosine_similarity_identical() {
        let a = Embedding::new(vec![1.0, 0.0, 0.0]);
        let b = Embedding::new(vec![1.0, 0.0, 0.0]);
        assert!((a.similarity(&b) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_zero_vector() {
        let a = Embedding::new(vec![0.0, 0.0]);
        let b = Embedding::new(vec![1.0, 0.0]);
        assert_eq!(a.similarity(&b), 0.0);
    }

    #[test]
    fn test_euclidean_distance() {
        let a = Embedding::new(vec![0.0, 0.0]);
        let b = Embedding::new(vec![3.0, 4.0]);
        assert!((a.euclidean_distance(&b) - 5.0).abs() < 1e-6);
        assert_eq!(b.euclidean_distance(&b), 0.0);
    }

    #[test]
    fn test_bbox_center() {
        let b = BoundingBox {
            x: 10.0, y: 20.0, width: 40.0, height: 60.0,
            confidence: 0.9, landmarks: None,
        };
        assert_eq!(b.center(), (30.0, 50.0));
    }

    #[test]
    fn test_euclidean_matcher_exact_match() {
        let gallery = vec![
            signature("decoy", vec![0.0, 1.0, 0.0]),
            signature("Ada Lovelace", vec![1.0, 0.0, 0.0]),
        ];
        let probe = Embedding::new(vec![1.0, 0.0, 0.0]);

        let result = EuclideanMatcher.compare(&probe, &gallery, 0.45);
        assert!(result.matched);
        assert_eq!(result.name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(result.distance, 0.0);
    }

    #[test]
    fn test_euclidean_matcher_over_threshold() {
        let gallery = vec![signature("other", vec![0.0, 1.0])];
        let probe = Embedding::new(vec![0.5, 1.0]);

        let result = EuclideanMatcher.compare(&probe, &gallery, 0.45);
        assert!(!result.matched);
        assert!(result.name.is_none());
        assert!((result.distance - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_euclidean_matcher_threshold_inclusive() {
        let gallery = vec![signature("edge", vec![0.0, 0.0])];
        let probe = Embedding::new(vec![0.25, 0.0]);

        let result = EuclideanMatcher.compare(&probe, &gallery, 0.25);
        assert!(result.matched);
    }

    #[test]
    fn test_euclidean_matcher_first_minimum_wins() {
        let gallery = vec![
            signature("first", vec![1.0, 0.0]),
            signature("second", vec![1.0, 0.0]),
        ];
        let probe = Embedding::new(vec![1.0, 0.1]);

        let result = EuclideanMatcher.compare(&probe, &gallery, 0.45);
        assert_eq!(result.name.as_deref(), Some("first"));
    }

    #[test]
    fn test_euclidean_matcher_empty_gallery() {
        let probe = Embedding::new(vec![1.0, 0.0]);
        let result = EuclideanMatcher.compare(&probe, &[], 0.45);
        assert!(!result.matched);
        assert!(result.distance.is_infinite());
    }

    #[test]
    fn test_tracking_point_serializes_flat() {
        let point = TrackingPoint { x: 0.25, y: 0.75 };
        let json = serde_json::to_value(point).unwrap();
        assert_eq!(json, serde_json::json!({ "x": 0.25, "y": 0.75 }));
    }
}
