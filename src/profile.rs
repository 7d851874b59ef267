use serde::Serialize;

use crate::error::PassfotoError;

/// Print resolution used for all mm → px conversions.
pub const DPI: u32 = 300;

/// Convert a physical length in millimeters to pixels at [`DPI`].
pub fn mm_to_px(mm: f64) -> u32 {
    (mm * DPI as f64 / 25.4).round() as u32
}

/// Anthropometric ratio profile for one document standard.
///
/// All ratios are fractions of the final photo height except the last three,
/// which calibrate the face-detector box against true head geometry:
/// detectors capture only part of the head (chin to forehead), so the
/// alignment engine scales the detected box up to a full chin-to-skull head
/// via `face_detection_to_head_ratio` and estimates eye line and skull top
/// from `eye_level_in_face_ratio` and `forehead_extension_ratio`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentRatioProfile {
    /// Target photo width in pixels (derived from mm at [`DPI`]).
    pub photo_width_px: u32,
    /// Target photo height in pixels.
    pub photo_height_px: u32,
    /// Head height (chin to skull) as fraction of photo height.
    pub head_height_ratio: f64,
    /// Eye line as fraction of photo height, measured from the top.
    pub eye_position_ratio: f64,
    /// Minimum empty space above the skull as fraction of photo height.
    pub headspace_ratio: f64,
    /// Fraction of true head height the detector box typically captures.
    pub face_detection_to_head_ratio: f64,
    /// Eye line as fraction down from the top of the detector box.
    pub eye_level_in_face_ratio: f64,
    /// Estimated skull extension above the detector box, as fraction of box size.
    pub forehead_extension_ratio: f64,
}

impl DocumentRatioProfile {
    /// Width/height aspect ratio of the target photo.
    pub fn aspect(&self) -> f64 {
        self.photo_width_px as f64 / self.photo_height_px as f64
    }

    /// Validate the profile invariants.
    ///
    /// Every ratio must lie in (0,1), and head height plus headspace must
    /// leave room for the head inside the photo. Out-of-range profiles are
    /// rejected, never silently corrected.
    pub fn validate(&self) -> Result<(), PassfotoError> {
        if self.photo_width_px == 0 || self.photo_height_px == 0 {
            return Err(PassfotoError::InvalidRatioProfile(
                "photo dimensions must be positive".into(),
            ));
        }

        let ratios = [
            ("head_height_ratio", self.head_height_ratio),
            ("eye_position_ratio", self.eye_position_ratio),
            ("headspace_ratio", self.headspace_ratio),
            (
                "face_detection_to_head_ratio",
                self.face_detection_to_head_ratio,
            ),
            ("eye_level_in_face_ratio", self.eye_level_in_face_ratio),
            ("forehead_extension_ratio", self.forehead_extension_ratio),
        ];
        for (name, value) in ratios {
            if !(value > 0.0 && value < 1.0) {
                return Err(PassfotoError::InvalidRatioProfile(format!(
                    "{name} must be in (0,1), got {value}"
                )));
            }
        }

        if self.head_height_ratio + self.headspace_ratio > 1.0 {
            return Err(PassfotoError::InvalidRatioProfile(format!(
                "head_height_ratio ({}) + headspace_ratio ({}) exceeds 1.0",
                self.head_height_ratio, self.headspace_ratio
            )));
        }

        Ok(())
    }
}

/// Austrian/EU standard: 35×45 mm, head 75% of photo height, eyes at 48%
/// from the top, at least 10% headspace.
const EU_35X45: DocumentRatioProfile = DocumentRatioProfile {
    photo_width_px: 413,  // 35 mm at 300 DPI
    photo_height_px: 531, // 45 mm at 300 DPI
    head_height_ratio: 0.75,
    eye_position_ratio: 0.48,
    headspace_ratio: 0.10,
    face_detection_to_head_ratio: 0.70,
    eye_level_in_face_ratio: 0.42,
    forehead_extension_ratio: 0.15,
};

/// US standard: 51×51 mm (2×2 in), head 50–69% of photo height.
const US_51X51: DocumentRatioProfile = DocumentRatioProfile {
    photo_width_px: 602,
    photo_height_px: 602,
    head_height_ratio: 0.60,
    eye_position_ratio: 0.45,
    headspace_ratio: 0.12,
    face_detection_to_head_ratio: 0.70,
    eye_level_in_face_ratio: 0.42,
    forehead_extension_ratio: 0.15,
};

/// Data-only registry mapping document codes to ratio profiles.
///
/// Adding a country means adding a row here; the alignment engine never
/// branches on country identity.
const REGISTRY: &[(&str, DocumentRatioProfile)] =
    &[("eu-35x45", EU_35X45), ("us-51x51", US_51X51)];

/// Look up a profile by document code, validating it before returning.
pub fn lookup(code: &str) -> Result<DocumentRatioProfile, PassfotoError> {
    let profile = REGISTRY
        .iter()
        .find(|(key, _)| *key == code)
        .map(|(_, profile)| profile.clone())
        .ok_or_else(|| PassfotoError::UnknownProfile(code.to_string()))?;
    profile.validate()?;
    Ok(profile)
}

/// Codes of all registered document profiles.
pub fn registered_codes() -> Vec<&'static str> {
    REGISTRY.iter().map(|(key, _)| *key).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mm_conversion_matches_300_dpi() {
        assert_eq!(mm_to_px(35.0), 413);
        assert_eq!(mm_to_px(45.0), 531);
        assert_eq!(mm_to_px(2.0), 24);
        assert_eq!(mm_to_px(150.0), 1772);
        assert_eq!(mm_to_px(100.0), 1181);
    }

    #[test]
    fn registered_profiles_are_valid() {
        for code in registered_codes() {
            let profile = lookup(code).unwrap();
            assert!(profile.photo_width_px > 0);
        }
    }

    #[test]
    fn unknown_code_is_rejected() {
        assert!(matches!(
            lookup("atlantis-1x1"),
            Err(PassfotoError::UnknownProfile(_))
        ));
    }

    #[test]
    fn ratio_out_of_range_is_rejected() {
        let mut profile = EU_35X45.clone();
        profile.eye_position_ratio = 1.2;
        assert!(matches!(
            profile.validate(),
            Err(PassfotoError::InvalidRatioProfile(_))
        ));

        profile = EU_35X45.clone();
        profile.headspace_ratio = 0.0;
        assert!(profile.validate().is_err());
    }

    #[test]
    fn head_plus_headspace_over_one_is_rejected() {
        let mut profile = EU_35X45.clone();
        profile.head_height_ratio = 0.95;
        profile.headspace_ratio = 0.10;
        assert!(matches!(
            profile.validate(),
            Err(PassfotoError::InvalidRatioProfile(_))
        ));
    }

    #[test]
    fn eu_profile_aspect() {
        let profile = lookup("eu-35x45").unwrap();
        assert!((profile.aspect() - 413.0 / 531.0).abs() < 1e-9);
    }
}
