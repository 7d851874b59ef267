//! Passport photo alignment and print-sheet layout.
//!
//! Two pure geometric engines do the real work: [`align`] converts a
//! detected face box into a crop window that satisfies a document standard's
//! anthropometric ratios, and [`plan`] packs copies of the fixed-size photo
//! onto a paper sheet with minimum cutting margins. [`SheetBuilder`] wires
//! them together with the image collaborators (decode, EXIF orientation,
//! detection, crop/resize, composition, encode).
//!
//! # Example
//!
//! ```no_run
//! use passfoto::SheetBuilder;
//!
//! let raw_bytes = std::fs::read("portrait.jpg").unwrap();
//! let sheet = SheetBuilder::new(raw_bytes)
//!     .unwrap()
//!     .paper_mm(150, 100)
//!     .generate()
//!     .unwrap();
//! std::fs::write("sheet.jpg", &sheet.data).unwrap();
//! println!("placed {} photos", sheet.placed_count);
//! ```
#![warn(missing_docs)]

mod align;
mod crop;
mod error;
/// Face detection traits and data types.
pub mod face_detector;
mod layout;
mod orientation;
mod pipeline;
/// Document ratio profiles and the data-only registry keyed by document code.
pub mod profile;
#[cfg(feature = "rustface")]
/// SeetaFace-based face detector backend.
pub mod rustface_backend;

/// Alignment engine and its data types.
pub use align::{align, AlignmentReport, CropRect, FaceBox};
/// Error type returned by passfoto operations.
pub use error::PassfotoError;
/// Face detection trait and face bounding-box type.
pub use face_detector::{FaceBounds, FaceDetector};
/// Layout planner and its data types.
pub use layout::{paper_preset, plan, LayoutPlan, PrintFormatSpec, PAPER_PRESETS};
/// Ratio profile type.
pub use profile::DocumentRatioProfile;
#[cfg(feature = "rustface")]
pub use rustface_backend::RustfaceDetector;

/// Result of generating a print sheet.
#[derive(Debug, Clone)]
pub struct GeneratedSheet {
    /// JPEG-encoded sheet.
    pub data: Vec<u8>,

    /// Width of the sheet in pixels (post orientation choice).
    pub width: u32,

    /// Height of the sheet in pixels.
    pub height: u32,

    /// The grid plan the sheet was composed from.
    pub plan: LayoutPlan,

    /// Photos actually placed; may fall below the plan under rounding, since
    /// partially out-of-bounds cells are skipped rather than clipped.
    pub placed_count: u32,

    /// Alignment measurements, when a detected face drove the crop.
    pub alignment: Option<AlignmentReport>,

    /// The heuristic center crop was used instead of face alignment.
    pub used_fallback_crop: bool,
}

/// Default JPEG quality for the print sheet.
const SHEET_JPEG_QUALITY: u8 = 95;

/// Builder for turning one portrait photograph into a print sheet of
/// standards-compliant passport photos.
///
/// Validates the input on construction, then applies EXIF orientation, face
/// detection, alignment, and layout with configurable parameters.
pub struct SheetBuilder {
    input: Vec<u8>,
    profile: DocumentRatioProfile,
    paper_width_mm: u32,
    paper_height_mm: u32,
    requested_count: Option<u32>,
    jpeg_quality: u8,
    detector: Option<Box<dyn FaceDetector>>,
}

impl SheetBuilder {
    /// Create a new builder from raw image bytes (JPEG, PNG, or WebP).
    ///
    /// Defaults: EU 35×45 mm profile on 10×15 cm paper, full sheet, JPEG
    /// quality 95, no detector (heuristic center crop).
    pub fn new(input: Vec<u8>) -> Result<Self, PassfotoError> {
        // Validate that the input can be decoded
        image::guess_format(&input).map_err(|e| PassfotoError::Decode(e.to_string()))?;

        Ok(Self {
            input,
            profile: profile::lookup("eu-35x45")?,
            paper_width_mm: 150,
            paper_height_mm: 100,
            requested_count: None,
            jpeg_quality: SHEET_JPEG_QUALITY,
            detector: None,
        })
    }

    /// Set the document profile (default: `eu-35x45`). The profile is
    /// re-validated at generation time.
    pub fn profile(mut self, profile: DocumentRatioProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Set the paper size in millimeters (default: 150×100).
    pub fn paper_mm(mut self, width_mm: u32, height_mm: u32) -> Self {
        self.paper_width_mm = width_mm;
        self.paper_height_mm = height_mm;
        self
    }

    /// Cap the number of photos placed on the sheet (default: fill it).
    pub fn requested_count(mut self, count: u32) -> Self {
        self.requested_count = Some(count);
        self
    }

    /// Set the JPEG quality of the sheet, 1–100 (default: 95).
    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality;
        self
    }

    /// Provide a face detector implementation.
    ///
    /// Without one, the heuristic center crop is used. Pass
    /// [`RustfaceDetector`] (with the `rustface` feature) or any custom
    /// [`FaceDetector`]:
    ///
    /// ```no_run
    /// use passfoto::{SheetBuilder, FaceDetector, FaceBounds};
    ///
    /// struct MyDetector;
    /// impl FaceDetector for MyDetector {
    ///     fn detect(&self, gray: &[u8], width: u32, height: u32) -> Vec<FaceBounds> {
    ///         vec![]
    ///     }
    /// }
    ///
    /// let bytes = std::fs::read("portrait.jpg").unwrap();
    /// let sheet = SheetBuilder::new(bytes).unwrap()
    ///     .face_detector(Box::new(MyDetector))
    ///     .generate().unwrap();
    /// ```
    pub fn face_detector(mut self, detector: Box<dyn FaceDetector>) -> Self {
        self.detector = Some(detector);
        self
    }

    /// Generate the print sheet with the configured settings.
    pub fn generate(self) -> Result<GeneratedSheet, PassfotoError> {
        self.profile.validate()?;

        let decoded = pipeline::decode_image(&self.input)?;
        if decoded.width() == 0 || decoded.height() == 0 {
            return Err(PassfotoError::ZeroDimensions);
        }
        let upright = orientation::correct_orientation(decoded, &self.input);

        let face = self
            .detector
            .as_deref()
            .and_then(|detector| pipeline::detect_best_face(&upright, detector));

        // Face alignment when possible; a degenerate detector box demotes to
        // the heuristic center crop instead of failing the whole run.
        let (crop_rect, alignment) = match face {
            Some(face) => match align::align(upright.width(), upright.height(), &face, &self.profile)
            {
                Ok((crop, report)) => (crop, Some(report)),
                Err(PassfotoError::DegenerateFace(size)) => {
                    log::warn!("degenerate face box (size {size}), using center crop");
                    (
                        crop::center_crop(upright.width(), upright.height(), self.profile.aspect()),
                        None,
                    )
                }
                Err(e) => return Err(e),
            },
            None => (
                crop::center_crop(upright.width(), upright.height(), self.profile.aspect()),
                None,
            ),
        };
        let used_fallback_crop = alignment.is_none();

        let photo = pipeline::extract_photo(&upright, &crop_rect, &self.profile);

        let mut format =
            PrintFormatSpec::from_paper_mm(self.paper_width_mm, self.paper_height_mm, &self.profile);
        format.requested_count = self.requested_count;
        let layout_plan = layout::plan(&format)?;

        let (canvas, placed_count) = pipeline::compose_sheet(&photo, &layout_plan);
        let data = pipeline::encode_jpeg(&canvas, self.jpeg_quality)?;

        Ok(GeneratedSheet {
            data,
            width: canvas.width(),
            height: canvas.height(),
            plan: layout_plan,
            placed_count,
            alignment,
            used_fallback_crop,
        })
    }
}
