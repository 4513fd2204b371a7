//! Face-position tracking for interactive per-frame use.

use crate::pipeline::FaceLocator;
use crate::types::{BoundingBox, TrackingPoint};
use image::RgbImage;

/// Locate the primary face and return its centre as fractions of the frame.
///
/// Detector failures are logged and reported as "none detected".
pub fn track<L: FaceLocator + ?Sized>(locator: &mut L, image: &RgbImage) -> Option<TrackingPoint> {
    let faces = match locator.locate(image) {
        Ok(faces) => faces,
        Err(e) => {
            tracing::debug!(error = %e, "face detection failed; treating frame as empty");
            return None;
        }
    };
    let face = faces.first()?;
    normalized_center(face, image.width(), image.height())
}

/// Bounding-box centre scaled to [0, 1] by the frame dimensions.
pub fn normalized_center(face: &BoundingBox, width: u32, height: u32) -> Option<TrackingPoint> {
    if width == 0 || height == 0 {
        return None;
    }
    let (cx, cy) = face.center();
    let x = (cx / width as f32).clamp(0.0, 1.0);
    let y = (cy / height as f32).clamp(0.0, 1.0);
    if x.is_nan() || y.is_nan() {
        return None;
    }
    Some(TrackingPoint { x, y })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::DetectorError;
    use crate::pipeline::PipelineError;

    enum Scripted {
        Faces(Vec<BoundingBox>),
        Fail,
    }

    impl FaceLocator for Scripted {
        fn locate(&mut self, _image: &RgbImage) -> Result<Vec<BoundingBox>, PipelineError> {
            match self {
                Scripted::Faces(faces) => Ok(faces.clone()),
                Scripted::Fail => Err(DetectorError::InferenceFailed("boom".into()).into()),
            }
        }
    }

    fn face(x: f32, y: f32, w: f32, h: f32, confidence: f32) -> BoundingBox {
        BoundingBox { x, y, width: w, height: h, confidence, landmarks: None }
    }

    #[test]
    fn test_track_uses_first_detection() {
        let image = RgbImage::new(160, 120);
        let mut locator = Scripted::Faces(vec![
            face(40.0, 30.0, 40.0, 60.0, 0.9),
            face(0.0, 0.0, 10.0, 10.0, 0.6),
        ]);
        let point = track(&mut locator, &image).unwrap();
        assert!((point.x - 0.375).abs() < 1e-6);
        assert!((point.y - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_track_no_faces() {
        let image = RgbImage::new(160, 120);
        assert!(track(&mut Scripted::Faces(vec![]), &image).is_none());
    }

    #[test]
    fn test_track_swallows_detector_error() {
        let image = RgbImage::new(160, 120);
        assert!(track(&mut Scripted::Fail, &image).is_none());
    }

    #[test]
    fn test_center_clamped_to_unit_range() {
        let point = normalized_center(&face(150.0, -40.0, 40.0, 20.0, 0.8), 160, 120).unwrap();
        assert_eq!(point.x, 1.0);
        assert_eq!(point.y, 0.0);
    }

    #[test]
    fn test_center_is_idempotent() {
        let image = RgbImage::new(320, 240);
        let mut locator = Scripted::Faces(vec![face(100.0, 50.0, 60.0, 80.0, 0.95)]);
        assert_eq!(track(&mut locator, &image), track(&mut locator, &image));
    }
}
