use crate::align::FaceBox;

/// Bounding box of a detected face, in the coordinate space of the buffer
/// that was handed to the detector.
#[derive(Debug, Clone)]
pub struct FaceBounds {
    /// X coordinate of the top-left corner (pixels).
    pub x: f64,
    /// Y coordinate of the top-left corner (pixels).
    pub y: f64,
    /// Width of the bounding box (pixels).
    pub width: f64,
    /// Height of the bounding box (pixels).
    pub height: f64,
    /// Detection confidence score.
    pub confidence: f64,
}

impl FaceBounds {
    /// Combined size + confidence score used to pick the best candidate when
    /// the detector returns several faces.
    fn quality(&self) -> f64 {
        self.width.max(self.height) + self.confidence * 100.0
    }

    /// Convert to a [`FaceBox`] in original-image coordinates, undoing the
    /// downscale the detector ran at. `scale_factor` is the ratio of
    /// detection-buffer size to original size (1.0 when not downscaled).
    pub fn to_face_box(&self, scale_factor: f64) -> FaceBox {
        FaceBox {
            center_x: (self.x + self.width / 2.0) / scale_factor,
            center_y: (self.y + self.height / 2.0) / scale_factor,
            size: self.width.max(self.height) / scale_factor,
            confidence: self.confidence,
        }
    }
}

/// Pluggable face detection backend.
///
/// Implement this trait to provide a custom face detector (ONNX, dlib, etc.)
/// and pass it to [`crate::SheetBuilder::face_detector`]. The detector may be
/// slow; it is the only blocking collaborator in the pipeline and callers are
/// expected to bound it themselves.
pub trait FaceDetector: Send + Sync {
    /// Detect faces in a row-major grayscale buffer of `width` × `height` bytes.
    fn detect(&self, gray: &[u8], width: u32, height: u32) -> Vec<FaceBounds>;
}

/// Pick the most usable candidate: largest and most confident.
pub fn select_best(faces: &[FaceBounds]) -> Option<&FaceBounds> {
    faces.iter().max_by(|a, b| {
        a.quality()
            .partial_cmp(&b.quality())
            .unwrap_or(std::cmp::Ordering::Equal)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(x: f64, y: f64, size: f64, confidence: f64) -> FaceBounds {
        FaceBounds {
            x,
            y,
            width: size,
            height: size,
            confidence,
        }
    }

    #[test]
    fn best_candidate_prefers_confidence_over_size() {
        let faces = vec![bounds(0.0, 0.0, 300.0, 1.0), bounds(0.0, 0.0, 150.0, 4.0)];
        let best = select_best(&faces).unwrap();
        assert_eq!(best.width, 150.0);
    }

    #[test]
    fn best_candidate_of_equal_confidence_is_largest() {
        let faces = vec![bounds(0.0, 0.0, 100.0, 2.0), bounds(0.0, 0.0, 220.0, 2.0)];
        assert_eq!(select_best(&faces).unwrap().width, 220.0);
    }

    #[test]
    fn no_candidates_yields_none() {
        assert!(select_best(&[]).is_none());
    }

    #[test]
    fn face_box_rescales_to_original_coordinates() {
        let face = bounds(100.0, 200.0, 80.0, 3.0).to_face_box(0.5);
        assert_eq!(face.center_x, 280.0); // (100 + 40) / 0.5
        assert_eq!(face.center_y, 480.0);
        assert_eq!(face.size, 160.0);
        assert_eq!(face.confidence, 3.0);
    }

    #[test]
    fn face_box_from_unscaled_detection() {
        let face = bounds(10.0, 20.0, 50.0, 1.0).to_face_box(1.0);
        assert_eq!(face.center_x, 35.0);
        assert_eq!(face.center_y, 45.0);
        assert_eq!(face.size, 50.0);
    }
}
