//! Core object extraction engine.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{ImageFormat, RgbImage, RgbaImage};

use crate::error::{Error, Result};
use crate::masking;
use crate::segmenter::Segmenter;

/// Fixed label prepended to mask output filenames and archive entries.
pub const MASK_PREFIX: &str = "masked_";

/// Label prepended to overlay output filenames.
pub const OVERLAY_PREFIX: &str = "overlay_";

/// Options controlling batch processing behavior.
#[derive(Debug, Clone, Default)]
pub struct ProcessOptions {
    /// Produce an overlay artifact at this opacity (`[0.0, 1.0]`) alongside
    /// the mask. `None` skips overlay generation.
    pub opacity: Option<f32>,
    /// Enable verbose logging.
    pub verbose: bool,
    /// Suppress non-error output.
    pub quiet: bool,
}

/// Artifacts produced for one successfully extracted image.
#[derive(Debug)]
pub struct Artifacts {
    /// The flattened mask: black background, original foreground, opaque.
    pub mask: RgbaImage,
    /// Overlay at the requested opacity, when one was requested.
    pub overlay: Option<RgbImage>,
}

/// Result of processing a single image file.
///
/// Batch processing reports one of these per item; a failed item carries its
/// reason here instead of aborting sibling items.
#[derive(Debug)]
pub struct ProcessResult {
    /// Path of the input file.
    pub path: PathBuf,
    /// Where the mask was written, if extraction succeeded.
    pub mask_path: Option<PathBuf>,
    /// Whether processing succeeded.
    pub success: bool,
    /// Human-readable status message.
    pub message: String,
}

/// The extraction engine wrapping an injected [`Segmenter`].
///
/// Create once and reuse across images; the engine holds no per-image state
/// and every image is processed independently.
pub struct ExtractionEngine<S: Segmenter> {
    segmenter: S,
}

impl<S: Segmenter> ExtractionEngine<S> {
    /// Create an engine delegating segmentation to the given capability.
    pub fn new(segmenter: S) -> Self {
        Self { segmenter }
    }

    /// Run the segmenter on `original` and flatten the result into an
    /// opaque mask.
    ///
    /// The original is PNG-encoded, handed to the segmenter, and the
    /// returned bytes decoded to RGBA. Background pixels (alpha 0) are
    /// forced to black and the alpha channel set uniformly to 255. The
    /// output always matches the input's dimensions.
    ///
    /// # Errors
    ///
    /// [`Error::Segmentation`] if the external call fails,
    /// [`Error::Decode`] if its output is not a valid image, and
    /// [`Error::DimensionMismatch`] if the segmenter changed the image size.
    pub fn mask_object(&self, original: &RgbImage) -> Result<RgbaImage> {
        let encoded = encode_png(original)?;
        let segmented = self.segmenter.segment(&encoded)?;

        let mut mask = image::load_from_memory(&segmented)
            .map_err(Error::Decode)?
            .to_rgba8();

        if mask.dimensions() != original.dimensions() {
            return Err(Error::DimensionMismatch {
                expected: original.dimensions(),
                actual: mask.dimensions(),
            });
        }

        masking::flatten_mask(&mut mask);
        Ok(mask)
    }

    /// Blend a flattened mask over the original at the given opacity.
    ///
    /// # Errors
    ///
    /// [`Error::OpacityOutOfRange`] outside `[0.0, 1.0]`,
    /// [`Error::DimensionMismatch`] if sizes differ.
    pub fn overlay(&self, original: &RgbImage, mask: &RgbaImage, opacity: f32) -> Result<RgbImage> {
        masking::blend_overlay(original, &masking::mask_to_rgb(mask), opacity)
    }

    /// Produce all artifacts for one image: the mask, plus an overlay when
    /// [`ProcessOptions::opacity`] is set.
    ///
    /// # Errors
    ///
    /// Propagates any [`Self::mask_object`] or [`Self::overlay`] error.
    pub fn extract(&self, original: &RgbImage, opts: &ProcessOptions) -> Result<Artifacts> {
        let mask = self.mask_object(original)?;
        let overlay = match opts.opacity {
            Some(opacity) => Some(self.overlay(original, &mask, opacity)?),
            None => None,
        };
        Ok(Artifacts { mask, overlay })
    }

    /// Process a single image file: load, extract, save artifacts.
    ///
    /// Masks are written as `masked_<stem>.png` (PNG regardless of the input
    /// format, since the mask carries an alpha channel), overlays as
    /// `overlay_<stem>.png`. Never panics; failures land in the returned
    /// [`ProcessResult`].
    #[must_use]
    pub fn process_file(
        &self,
        input: &Path,
        output_dir: &Path,
        opts: &ProcessOptions,
    ) -> ProcessResult {
        let mut result = ProcessResult {
            path: input.to_path_buf(),
            mask_path: None,
            success: false,
            message: String::new(),
        };

        let original = match load_rgb(input) {
            Ok(img) => img,
            Err(e) => {
                result.message = format!("Failed to load: {e}");
                return result;
            }
        };

        let artifacts = match self.extract(&original, opts) {
            Ok(a) => a,
            Err(e) => {
                result.message = format!("Extraction failed: {e}");
                return result;
            }
        };

        if let Err(e) = std::fs::create_dir_all(output_dir) {
            result.message = format!("Failed to create output directory: {e}");
            return result;
        }

        let stem = input.file_stem().unwrap_or_default().to_string_lossy();
        let mask_path = output_dir.join(format!("{MASK_PREFIX}{stem}.png"));
        if let Err(e) = artifacts.mask.save(&mask_path) {
            result.message = format!("Failed to save mask: {e}");
            return result;
        }
        result.mask_path = Some(mask_path);

        if let Some(overlay) = &artifacts.overlay {
            let overlay_path = output_dir.join(format!("{OVERLAY_PREFIX}{stem}.png"));
            if let Err(e) = overlay.save(&overlay_path) {
                result.message = format!("Failed to save overlay: {e}");
                return result;
            }
        }

        result.success = true;
        result.message = match opts.opacity {
            Some(opacity) => format!("Mask and {:.0}% overlay written", opacity * 100.0),
            None => "Mask written".to_string(),
        };
        result
    }

    /// Process all supported images in a directory.
    ///
    /// Uses parallel iteration when the `cli` feature is enabled (via rayon);
    /// items share no state, so no coordination is needed. Returns a
    /// [`ProcessResult`] per image; one item's failure never aborts the rest.
    #[must_use]
    pub fn process_directory(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        opts: &ProcessOptions,
    ) -> Vec<ProcessResult> {
        let inputs: Vec<PathBuf> = match std::fs::read_dir(input_dir) {
            Ok(rd) => {
                let mut paths: Vec<PathBuf> = rd
                    .filter_map(std::result::Result::ok)
                    .filter(|e| e.file_type().map(|ft| ft.is_file()).unwrap_or(false))
                    .map(|e| e.path())
                    .filter(|p| is_supported_image(p))
                    .collect();
                paths.sort();
                paths
            }
            Err(e) => {
                return vec![ProcessResult {
                    path: input_dir.to_path_buf(),
                    mask_path: None,
                    success: false,
                    message: format!("Failed to read directory: {e}"),
                }];
            }
        };

        #[cfg(feature = "cli")]
        {
            use rayon::prelude::*;
            inputs
                .par_iter()
                .map(|input| self.process_file(input, output_dir, opts))
                .collect()
        }

        #[cfg(not(feature = "cli"))]
        {
            inputs
                .iter()
                .map(|input| self.process_file(input, output_dir, opts))
                .collect()
        }
    }
}

/// Check if a file has a supported image extension.
#[must_use]
pub fn is_supported_image(path: &Path) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => matches!(
            ext.to_lowercase().as_str(),
            "jpg" | "jpeg" | "png" | "webp" | "bmp"
        ),
        None => false,
    }
}

/// Load an image file as RGB, rejecting unsupported extensions up front.
///
/// # Errors
///
/// [`Error::UnsupportedFormat`] for extensions outside the supported set,
/// [`Error::Image`] if decoding fails.
pub fn load_rgb(path: &Path) -> Result<RgbImage> {
    if !is_supported_image(path) {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("(none)");
        return Err(Error::UnsupportedFormat(ext.to_string()));
    }
    Ok(image::open(path)?.to_rgb8())
}

/// Encode an RGB image as PNG bytes for the segmenter round-trip.
fn encode_png(img: &RgbImage) -> Result<Vec<u8>> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png)?;
    Ok(buf.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, Rgba, RgbaImage};

    /// Stub segmenter: decodes the input and marks the top `fg_rows` rows
    /// as foreground (alpha 255), the rest as background (alpha 0).
    fn top_rows_segmenter(fg_rows: u32) -> impl Segmenter {
        move |bytes: &[u8]| -> Result<Vec<u8>> {
            let img = image::load_from_memory(bytes)
                .map_err(Error::Decode)?
                .to_rgb8();
            let out = RgbaImage::from_fn(img.width(), img.height(), |x, y| {
                let px = img.get_pixel(x, y);
                let alpha = if y < fg_rows { 255 } else { 0 };
                Rgba([px[0], px[1], px[2], alpha])
            });
            let mut buf = Cursor::new(Vec::new());
            out.write_to(&mut buf, ImageFormat::Png)?;
            Ok(buf.into_inner())
        }
    }

    #[test]
    fn mask_object_flattens_segmenter_output() {
        let engine = ExtractionEngine::new(top_rows_segmenter(1));
        let original = RgbImage::from_pixel(2, 2, Rgb([255, 255, 255]));

        let mask = engine.mask_object(&original).unwrap();
        assert_eq!(mask.dimensions(), (2, 2));
        for x in 0..2 {
            assert_eq!(mask.get_pixel(x, 0).0, [255, 255, 255, 255]);
            assert_eq!(mask.get_pixel(x, 1).0, [0, 0, 0, 255]);
        }
    }

    #[test]
    fn mask_object_rejects_invalid_segmenter_output() {
        let engine =
            ExtractionEngine::new(|_: &[u8]| -> Result<Vec<u8>> { Ok(b"not an image".to_vec()) });
        let original = RgbImage::new(4, 4);

        assert!(matches!(
            engine.mask_object(&original),
            Err(Error::Decode(_))
        ));
    }

    #[test]
    fn mask_object_propagates_segmentation_failure() {
        let engine = ExtractionEngine::new(|_: &[u8]| -> Result<Vec<u8>> {
            Err(Error::Segmentation("model unavailable".to_string()))
        });
        let original = RgbImage::new(4, 4);

        assert!(matches!(
            engine.mask_object(&original),
            Err(Error::Segmentation(_))
        ));
    }

    #[test]
    fn mask_object_rejects_resized_segmenter_output() {
        let engine = ExtractionEngine::new(|_: &[u8]| -> Result<Vec<u8>> {
            let shrunk = RgbaImage::new(2, 2);
            let mut buf = Cursor::new(Vec::new());
            shrunk.write_to(&mut buf, ImageFormat::Png)?;
            Ok(buf.into_inner())
        });
        let original = RgbImage::new(4, 4);

        assert!(matches!(
            engine.mask_object(&original),
            Err(Error::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn extract_produces_overlay_only_when_requested() {
        let engine = ExtractionEngine::new(top_rows_segmenter(1));
        let original = RgbImage::from_pixel(2, 2, Rgb([255, 255, 255]));

        let plain = engine
            .extract(&original, &ProcessOptions::default())
            .unwrap();
        assert!(plain.overlay.is_none());

        let opts = ProcessOptions {
            opacity: Some(0.5),
            ..ProcessOptions::default()
        };
        let with_overlay = engine.extract(&original, &opts).unwrap();
        let overlay = with_overlay.overlay.unwrap();
        assert_eq!(overlay.get_pixel(0, 0).0, [255, 255, 255]);
        assert_eq!(overlay.get_pixel(0, 1).0, [128, 128, 128]);
    }

    #[test]
    fn is_supported_image_accepts_common_formats() {
        assert!(is_supported_image(Path::new("photo.jpg")));
        assert!(is_supported_image(Path::new("photo.JPEG")));
        assert!(is_supported_image(Path::new("photo.png")));
        assert!(is_supported_image(Path::new("photo.webp")));
        assert!(is_supported_image(Path::new("photo.bmp")));
    }

    #[test]
    fn is_supported_image_rejects_unsupported_formats() {
        assert!(!is_supported_image(Path::new("photo.gif")));
        assert!(!is_supported_image(Path::new("photo.txt")));
        assert!(!is_supported_image(Path::new("photo")));
    }

    #[test]
    fn load_rgb_rejects_unsupported_extension() {
        assert!(matches!(
            load_rgb(Path::new("document.txt")),
            Err(Error::UnsupportedFormat(_))
        ));
    }
}
