//! Alignment engine: turn a detected face box into a crop window that meets
//! a document standard's anthropometric ratios.
//!
//! The computation runs in three phases so each correction stays testable in
//! isolation: ideal placement from the eye line, then the headspace
//! correction (translation only, upward only), then an explicit oversize
//! fallback that is the single place where the crop is ever rescaled.

use serde::Serialize;

use crate::error::PassfotoError;
use crate::profile::DocumentRatioProfile;

/// A detected face as a square region in original-image pixel coordinates.
///
/// If the detector ran on a downsampled copy, coordinates must already be
/// rescaled back to the source image (see
/// [`FaceBounds::to_face_box`](crate::face_detector::FaceBounds::to_face_box)).
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FaceBox {
    /// Horizontal center of the face box.
    pub center_x: f64,
    /// Vertical center of the face box.
    pub center_y: f64,
    /// Side length of the (square) face box. Must be positive.
    pub size: f64,
    /// Detector confidence score.
    pub confidence: f64,
}

/// Crop window in source-image pixel coordinates.
///
/// Always fully contained in the image, with width/height matching the
/// profile's photo aspect within one pixel of rounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CropRect {
    /// Left edge in source pixels.
    pub x: u32,
    /// Top edge in source pixels.
    pub y: u32,
    /// Crop width in source pixels.
    pub width: u32,
    /// Crop height in source pixels.
    pub height: u32,
}

impl CropRect {
    /// Width/height aspect ratio.
    pub fn aspect(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

/// Measurements computed during alignment, for logging and display.
///
/// Advisory only: the fallbacks it reports have already been applied to the
/// returned crop, but they are surfaced here so the caller can show them.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct AlignmentReport {
    /// Scale factor from source pixels to final photo pixels.
    pub scale: f64,
    /// Head height (chin to skull) in final-photo pixels.
    pub head_height_px: u32,
    /// Eye line distance from the top edge in final-photo pixels.
    pub eye_from_top_px: u32,
    /// Required headspace above the skull in final-photo pixels.
    pub headspace_px: u32,
    /// The crop was moved up to satisfy the headspace minimum.
    pub headspace_adjusted: bool,
    /// The crop exceeded the source image and was shrunk as a last resort.
    pub downscaled: bool,
}

/// Translate `pos` so a span of `size` lies within `[0, limit]`, without
/// changing `size`. When `size > limit` the span cannot fit; the caller
/// handles that via the oversize fallback.
fn clamp_offset(pos: f64, size: f64, limit: f64) -> f64 {
    pos.clamp(0.0, (limit - size).max(0.0))
}

/// Compute the crop window that places the detected face according to the
/// profile's head-height, eye-line, and headspace ratios.
///
/// Fails with [`PassfotoError::DegenerateFace`] for a zero/negative face box
/// and [`PassfotoError::ImageTooSmall`] when even a maximally downscaled crop
/// cannot fit the source image.
pub fn align(
    image_width: u32,
    image_height: u32,
    face: &FaceBox,
    profile: &DocumentRatioProfile,
) -> Result<(CropRect, AlignmentReport), PassfotoError> {
    if face.size <= 0.0 {
        return Err(PassfotoError::DegenerateFace(face.size));
    }

    let photo_w = profile.photo_width_px as f64;
    let photo_h = profile.photo_height_px as f64;

    // A perfectly scaled head produces a detector box of target_face_size.
    let target_head_height = photo_h * profile.head_height_ratio;
    let target_face_size = target_head_height * profile.face_detection_to_head_ratio;
    let scale = target_face_size / face.size;

    // Crop dimensions that, once resized to the target photo size, place the
    // face at the correct relative size. Aspect preserved by construction.
    let mut crop_width = photo_w / scale;
    let mut crop_height = photo_h / scale;

    let face_top = face.center_y - face.size / 2.0;
    let eye_y = face_top + face.size * profile.eye_level_in_face_ratio;

    // Ideal placement: eyes on the profile's eye line, face centered.
    let mut crop_x = face.center_x - crop_width / 2.0;
    let mut crop_y = eye_y - crop_height * profile.eye_position_ratio;

    // Headspace is a minimum, not an exact value, so this correction only
    // ever moves the window upward.
    let estimated_skull_top = face_top - face.size * profile.forehead_extension_ratio;
    let min_crop_y = estimated_skull_top - crop_height * profile.headspace_ratio;
    let mut headspace_adjusted = false;
    if crop_y > min_crop_y {
        crop_y = min_crop_y;
        headspace_adjusted = true;
        log::debug!("adjusted crop upward to satisfy headspace minimum");
    }

    let img_w = image_width as f64;
    let img_h = image_height as f64;

    // Translate into bounds; no resize yet.
    crop_x = clamp_offset(crop_x, crop_width, img_w);
    crop_y = clamp_offset(crop_y, crop_height, img_h);

    // Oversize fallback: shrink with a 5% safety margin and re-place around
    // the original eye line and face center.
    let mut downscaled = false;
    if crop_width > img_w || crop_height > img_h {
        let downscale = (img_w / crop_width).min(img_h / crop_height) * 0.95;
        if downscale <= 0.0 {
            return Err(PassfotoError::ImageTooSmall {
                image_width,
                image_height,
            });
        }
        crop_width *= downscale;
        crop_height *= downscale;
        crop_x = clamp_offset(face.center_x - crop_width / 2.0, crop_width, img_w);
        crop_y = clamp_offset(
            eye_y - crop_height * profile.eye_position_ratio,
            crop_height,
            img_h,
        );
        downscaled = true;
        log::debug!(
            "crop exceeded source image, downscaled to {:.0}x{:.0}",
            crop_width,
            crop_height
        );
    }

    // Integer finalize. Rounding may push the far edge one pixel out, so the
    // origin is re-clamped against the rounded size.
    let width = (crop_width.round() as u32).min(image_width).max(1);
    let height = (crop_height.round() as u32).min(image_height).max(1);
    let x = (crop_x.round() as i64).clamp(0, image_width as i64 - width as i64) as u32;
    let y = (crop_y.round() as i64).clamp(0, image_height as i64 - height as i64) as u32;

    let crop = CropRect {
        x,
        y,
        width,
        height,
    };
    let report = AlignmentReport {
        scale,
        head_height_px: target_head_height.round() as u32,
        eye_from_top_px: (photo_h * profile.eye_position_ratio).round() as u32,
        headspace_px: (photo_h * profile.headspace_ratio).round() as u32,
        headspace_adjusted,
        downscaled,
    };
    Ok((crop, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile;

    fn eu() -> DocumentRatioProfile {
        profile::lookup("eu-35x45").unwrap()
    }

    fn face(cx: f64, cy: f64, size: f64) -> FaceBox {
        FaceBox {
            center_x: cx,
            center_y: cy,
            size,
            confidence: 10.0,
        }
    }

    fn assert_contained(crop: &CropRect, w: u32, h: u32) {
        assert!(crop.x + crop.width <= w, "x {} + w {} > {w}", crop.x, crop.width);
        assert!(crop.y + crop.height <= h, "y {} + h {} > {h}", crop.y, crop.height);
    }

    fn assert_aspect(crop: &CropRect, profile: &DocumentRatioProfile) {
        // Within one pixel of rounding on either axis.
        let expected_w = crop.height as f64 * profile.aspect();
        assert!(
            (crop.width as f64 - expected_w).abs() <= 1.0,
            "aspect off: {}x{} vs expected width {expected_w:.2}",
            crop.width,
            crop.height
        );
    }

    #[test]
    fn austrian_standard_alignment() {
        // 413x531 target, face (500,400) size 200: targetHeadHeight ≈ 398,
        // targetFaceSize ≈ 279, scale ≈ 1.394, crop ≈ 296x381.
        let (crop, report) = align(1000, 800, &face(500.0, 400.0, 200.0), &eu()).unwrap();

        assert_eq!(report.head_height_px, 398);
        assert!((report.scale - 1.394).abs() < 0.01);
        assert_eq!(crop.width, 296);
        assert_eq!(crop.height, 381);
        // Eyes at 48% of crop height below estimated eye line (y = 384).
        assert_eq!(crop.x, 352);
        assert_eq!(crop.y, 201);
        assert_aspect(&crop, &eu());
        assert_contained(&crop, 1000, 800);
        assert!(!report.headspace_adjusted);
        assert!(!report.downscaled);
    }

    #[test]
    fn doubling_face_size_halves_crop() {
        let (small, _) = align(4000, 4000, &face(2000.0, 2000.0, 200.0), &eu()).unwrap();
        let (large, _) = align(4000, 4000, &face(2000.0, 2000.0, 400.0), &eu()).unwrap();
        assert!((large.width as f64 - 2.0 * small.width as f64).abs() <= 2.0);
        assert!((large.height as f64 - 2.0 * small.height as f64).abs() <= 2.0);
    }

    #[test]
    fn degenerate_face_is_rejected() {
        let err = align(1000, 800, &face(500.0, 400.0, 0.0), &eu()).unwrap_err();
        assert!(matches!(err, PassfotoError::DegenerateFace(_)));

        let err = align(1000, 800, &face(500.0, 400.0, -5.0), &eu()).unwrap_err();
        assert!(matches!(err, PassfotoError::DegenerateFace(_)));
    }

    #[test]
    fn oversize_crop_triggers_downscale() {
        // Face size 250 in a 300x300 image wants a ~370x476 crop.
        let (crop, report) = align(300, 300, &face(150.0, 150.0, 250.0), &eu()).unwrap();
        assert!(report.downscaled);
        assert_contained(&crop, 300, 300);
        assert_aspect(&crop, &eu());
        // 5% safety margin keeps the crop strictly inside the short axis.
        assert!(crop.height < 300);
    }

    #[test]
    fn zero_size_image_is_too_small() {
        let err = align(0, 0, &face(0.0, 0.0, 100.0), &eu()).unwrap_err();
        assert!(matches!(err, PassfotoError::ImageTooSmall { .. }));
    }

    #[test]
    fn headspace_correction_moves_window_up() {
        // Eyes placed very near the top would leave no room above the skull.
        let mut profile = eu();
        profile.eye_position_ratio = 0.2;
        let (crop, report) = align(3000, 3000, &face(1500.0, 1500.0, 300.0), &profile).unwrap();
        assert!(report.headspace_adjusted);

        // Compare against the uncorrected eye-line placement.
        let crop_height = 531.0 / report.scale;
        let eye_y = (1500.0 - 150.0) + 300.0 * profile.eye_level_in_face_ratio;
        let uncorrected_y = eye_y - crop_height * profile.eye_position_ratio;
        assert!((crop.y as f64) < uncorrected_y);
        assert_aspect(&crop, &profile);
        assert_contained(&crop, 3000, 3000);
    }

    #[test]
    fn face_near_edge_is_translated_into_bounds() {
        // Face hugging the left edge: ideal crop_x is negative.
        let (crop, report) = align(1000, 800, &face(50.0, 400.0, 200.0), &eu()).unwrap();
        assert_eq!(crop.x, 0);
        assert!(!report.downscaled);
        assert_contained(&crop, 1000, 800);
        assert_aspect(&crop, &eu());
    }

    #[test]
    fn containment_holds_across_positions() {
        let profile = eu();
        for &(cx, cy) in &[
            (10.0, 10.0),
            (990.0, 10.0),
            (10.0, 790.0),
            (990.0, 790.0),
            (500.0, 400.0),
        ] {
            let (crop, _) = align(1000, 800, &face(cx, cy, 180.0), &profile).unwrap();
            assert_contained(&crop, 1000, 800);
            assert_aspect(&crop, &profile);
        }
    }
}
