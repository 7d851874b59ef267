//! Image-side collaborators around the two geometric engines: decode,
//! detection preprocessing, crop/resize, sheet composition, and encode.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageEncoder, Rgb, RgbImage};

use crate::align::{CropRect, FaceBox};
use crate::error::PassfotoError;
use crate::face_detector::{select_best, FaceDetector};
use crate::layout::LayoutPlan;
use crate::profile::DocumentRatioProfile;

/// Maximum dimension handed to the face detector; larger sources are
/// downscaled first to keep detection fast.
const DETECTION_MAX_DIMENSION: u32 = 1200;

/// Decode input bytes into a `DynamicImage`.
pub(crate) fn decode_image(input: &[u8]) -> Result<DynamicImage, PassfotoError> {
    image::load_from_memory(input).map_err(|e| PassfotoError::Decode(e.to_string()))
}

/// Run the detector and return the best face in original-image coordinates.
///
/// Downscales to [`DETECTION_MAX_DIMENSION`] when needed and rescales the
/// winning box back by the inverse factor. `None` when nothing is detected.
pub(crate) fn detect_best_face(
    image: &DynamicImage,
    detector: &dyn FaceDetector,
) -> Option<FaceBox> {
    let (orig_w, orig_h) = (image.width(), image.height());

    let (detection_image, scale_factor) = if orig_w.max(orig_h) > DETECTION_MAX_DIMENSION {
        let resized = image.resize(
            DETECTION_MAX_DIMENSION,
            DETECTION_MAX_DIMENSION,
            FilterType::Triangle,
        );
        let factor = resized.width() as f64 / orig_w as f64;
        (resized, factor)
    } else {
        (image.clone(), 1.0)
    };

    let gray = image::imageops::grayscale(&detection_image);
    let faces = detector.detect(gray.as_raw(), gray.width(), gray.height());
    if faces.is_empty() {
        log::info!("no faces detected");
        return None;
    }

    let best = select_best(&faces)?;
    let face = best.to_face_box(scale_factor);
    log::info!(
        "face detected at ({:.0},{:.0}) size {:.0} (score {:.1}, {} candidates)",
        face.center_x,
        face.center_y,
        face.size,
        face.confidence,
        faces.len()
    );
    Some(face)
}

/// Cut the crop window out of the source and resize it to the exact photo
/// dimensions with smoothing resampling.
pub(crate) fn extract_photo(
    image: &DynamicImage,
    crop: &CropRect,
    profile: &DocumentRatioProfile,
) -> RgbImage {
    image
        .crop_imm(crop.x, crop.y, crop.width, crop.height)
        .resize_exact(
            profile.photo_width_px,
            profile.photo_height_px,
            FilterType::Lanczos3,
        )
        .to_rgb8()
}

/// Composite the photo onto a white sheet at every cell of the plan.
///
/// Enforces the no-crop invariant: a cell whose bounding box would exceed
/// the paper is skipped and reported, never clipped. Returns the canvas and
/// the number of photos actually placed.
pub(crate) fn compose_sheet(photo: &RgbImage, plan: &LayoutPlan) -> (RgbImage, u32) {
    let mut canvas = RgbImage::from_pixel(
        plan.paper_width_px,
        plan.paper_height_px,
        Rgb([255, 255, 255]),
    );

    let mut placed = 0;
    for (x, y) in plan.cells() {
        if plan.cell_in_bounds(x, y) {
            image::imageops::replace(&mut canvas, photo, x as i64, y as i64);
            placed += 1;
        } else {
            log::warn!("photo at ({x},{y}) would be cropped by the paper edge, skipping");
        }
    }

    (canvas, placed)
}

/// Encode the sheet as JPEG at the given quality (1–100).
pub(crate) fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>, PassfotoError> {
    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, quality)
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| PassfotoError::Encode(e.to_string()))?;
    Ok(buffer)
}
