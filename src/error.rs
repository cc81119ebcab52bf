//! Error types for the object-extractor crate.

/// Errors that can occur during object extraction and overlay compositing.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The external segmenter failed or rejected the input.
    #[error("segmentation failed: {0}")]
    Segmentation(String),

    /// The segmenter's output bytes could not be parsed as an image.
    #[error("failed to decode segmenter output: {0}")]
    Decode(#[source] image::ImageError),

    /// Two images participating in a blend (or the segmenter round-trip)
    /// do not share the same dimensions.
    #[error(
        "dimension mismatch: expected {}x{}, got {}x{}",
        expected.0, expected.1, actual.0, actual.1
    )]
    DimensionMismatch {
        /// Expected (width, height).
        expected: (u32, u32),
        /// Actual (width, height).
        actual: (u32, u32),
    },

    /// The requested overlay opacity lies outside `[0.0, 1.0]`.
    #[error("opacity {0} out of range [0.0, 1.0]")]
    OpacityOutOfRange(f32),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The image format is not supported.
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// An error occurred during image processing (load, save, encode).
    #[error("image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// An error occurred while writing the mask archive.
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let seg = Error::Segmentation("model exited with status 1".to_string());
        assert!(seg.to_string().contains("status 1"));

        let mismatch = Error::DimensionMismatch {
            expected: (640, 480),
            actual: (320, 240),
        };
        let msg = mismatch.to_string();
        assert!(msg.contains("640x480"));
        assert!(msg.contains("320x240"));

        let opacity = Error::OpacityOutOfRange(1.5);
        assert!(opacity.to_string().contains("1.5"));

        let unsupported = Error::UnsupportedFormat("tiff".to_string());
        assert!(unsupported.to_string().contains("tiff"));
    }
}
