use crate::align::CropRect;

/// Vertical bias toward the top of the image (faces in upper portion).
/// 0.0 = top, 0.5 = center, 1.0 = bottom.
const VERTICAL_BIAS: f64 = 0.2;

/// Calculate a centered crop at the given width/height aspect ratio.
///
/// Centers horizontally and biases toward the top vertically (20% from top)
/// to capture faces in typical portrait photos. This is the fallback used
/// when face detection finds nothing usable.
pub fn center_crop(source_width: u32, source_height: u32, aspect: f64) -> CropRect {
    let (crop_width, crop_height) = if (source_width as f64 / source_height as f64) > aspect {
        // Source is wider than the target — constrain by height
        let h = source_height;
        let w = (h as f64 * aspect).round() as u32;
        (w, h)
    } else {
        // Source is taller than (or equal to) the target — constrain by width
        let w = source_width;
        let h = (w as f64 / aspect).round() as u32;
        (w, h)
    };

    // Center horizontally
    let x = (source_width.saturating_sub(crop_width)) / 2;

    // Bias toward top vertically
    let vertical_slack = source_height.saturating_sub(crop_height);
    let y = (vertical_slack as f64 * VERTICAL_BIAS).round() as u32;

    CropRect {
        x,
        y,
        width: crop_width,
        height: crop_height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PASSPORT_ASPECT: f64 = 413.0 / 531.0;

    #[test]
    fn square_source_constrains_by_height() {
        // 1:1 is wider than 413:531, so constrain by height
        let crop = center_crop(531, 531, PASSPORT_ASPECT);
        assert_eq!(crop.width, 413);
        assert_eq!(crop.height, 531);
        assert_eq!(crop.x, 59); // (531 - 413) / 2
        assert_eq!(crop.y, 0); // no vertical slack
    }

    #[test]
    fn tall_source_constrains_by_width() {
        let crop = center_crop(300, 800, PASSPORT_ASPECT);
        assert_eq!(crop.width, 300);
        assert_eq!(crop.height, 386); // 300 / (413/531)
        assert_eq!(crop.x, 0);
        // Vertical slack = 800 - 386 = 414, bias 20% → y = 83
        assert_eq!(crop.y, 83);
    }

    #[test]
    fn wide_source_constrains_by_height() {
        let crop = center_crop(800, 300, PASSPORT_ASPECT);
        assert_eq!(crop.height, 300);
        assert_eq!(crop.width, 233); // 300 * (413/531)
        assert_eq!(crop.x, 283); // (800 - 233) / 2
        assert_eq!(crop.y, 0);
    }

    #[test]
    fn exact_aspect_needs_no_crop() {
        let crop = center_crop(413, 531, PASSPORT_ASPECT);
        assert_eq!(crop.x, 0);
        assert_eq!(crop.y, 0);
        assert_eq!(crop.width, 413);
        assert_eq!(crop.height, 531);
    }

    #[test]
    fn square_aspect_for_square_documents() {
        // US 51x51mm profile crops square
        let crop = center_crop(600, 900, 1.0);
        assert_eq!(crop.width, 600);
        assert_eq!(crop.height, 600);
        assert_eq!(crop.x, 0);
        assert_eq!(crop.y, 60); // (900 - 600) * 0.2
    }

    #[test]
    fn crop_stays_within_source() {
        for &(w, h) in &[(3, 4), (100, 1000), (1000, 100), (777, 777)] {
            let crop = center_crop(w, h, PASSPORT_ASPECT);
            assert!(crop.x + crop.width <= w);
            assert!(crop.y + crop.height <= h);
        }
    }
}
