use thiserror::Error;

#[derive(Debug, Error)]
pub enum PassfotoError {
    #[error("failed to decode image: {0}")]
    Decode(String),

    #[error("failed to encode image: {0}")]
    Encode(String),

    #[error("image dimensions are zero")]
    ZeroDimensions,

    #[error("detector returned a degenerate face box (size {0})")]
    DegenerateFace(f64),

    #[error("source image ({image_width}x{image_height}) too small to host a crop")]
    ImageTooSmall { image_width: u32, image_height: u32 },

    #[error("invalid ratio profile: {0}")]
    InvalidRatioProfile(String),

    #[error("paper cannot host one photo with minimum margins in either orientation")]
    InvalidPrintFormat,

    #[error("unknown document profile: {0}")]
    UnknownProfile(String),

    #[error("unknown print format: {0}")]
    UnknownFormat(String),

    #[error("failed to load detector model: {0}")]
    Model(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
