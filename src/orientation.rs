use exif::{In, Tag};
use image::DynamicImage;

/// Apply the EXIF Orientation tag so the image is upright before detection.
///
/// Cameras record portrait shots as rotated landscape plus an orientation
/// tag; face detection needs the pixels upright. Returns the image unchanged
/// when the bytes carry no readable EXIF data.
pub fn correct_orientation(img: DynamicImage, raw: &[u8]) -> DynamicImage {
    let mut cursor = std::io::Cursor::new(raw);
    let Ok(exif) = exif::Reader::new().read_from_container(&mut cursor) else {
        return img;
    };
    let Some(field) = exif.get_field(Tag::Orientation, In::PRIMARY) else {
        return img;
    };
    let Some(orientation) = field.value.get_uint(0) else {
        return img;
    };

    log::debug!("EXIF orientation: {orientation}");
    match orientation {
        2 => img.fliph(),
        3 => img.rotate180(),
        4 => img.flipv(),
        5 => img.fliph().rotate270(),
        6 => img.rotate90(),
        7 => img.fliph().rotate90(),
        8 => img.rotate270(),
        _ => img,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    #[test]
    fn bytes_without_exif_leave_image_untouched() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(30, 20));
        let out = correct_orientation(img, b"not an image at all");
        assert_eq!(out.width(), 30);
        assert_eq!(out.height(), 20);
    }

    #[test]
    fn png_without_exif_is_unchanged() {
        use image::codecs::png::PngEncoder;
        use image::ImageEncoder;

        let img = RgbImage::new(12, 8);
        let mut buffer = Vec::new();
        PngEncoder::new(&mut buffer)
            .write_image(img.as_raw(), 12, 8, image::ExtendedColorType::Rgb8)
            .unwrap();

        let out = correct_orientation(DynamicImage::ImageRgb8(img), &buffer);
        assert_eq!((out.width(), out.height()), (12, 8));
    }
}
