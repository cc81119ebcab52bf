//! Pixel math for mask flattening and overlay compositing.
//!
//! The segmenter marks background pixels via the alpha channel. This module
//! converts that transparency signal into an explicit black background
//! ([`flatten_mask`]) and blends the flattened mask back over the original
//! image at a caller-supplied opacity ([`blend_overlay`]).

use image::{Rgb, RgbImage, RgbaImage};

use crate::error::{Error, Result};

/// Flatten a segmented RGBA image into an opaque mask, in place.
///
/// Every pixel whose alpha is 0 has its color forced to pure black; every
/// other pixel keeps its color. The alpha channel is then set to 255
/// unconditionally, erasing the transparency signal now that it has been
/// converted into an explicit black background.
///
/// Any non-zero alpha counts as fully foreground. Partial alpha (soft edges)
/// from the segmenter is intentionally collapsed to a binary decision.
pub fn flatten_mask(mask: &mut RgbaImage) {
    for px in mask.pixels_mut() {
        if px[3] == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
        }
        px[3] = 255;
    }
}

/// Drop the alpha channel of a flattened mask, yielding an RGB image.
///
/// Intended for masks produced by [`flatten_mask`], whose alpha is uniformly
/// 255 and carries no information.
#[must_use]
pub fn mask_to_rgb(mask: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(mask.width(), mask.height(), |x, y| {
        let px = mask.get_pixel(x, y);
        Rgb([px[0], px[1], px[2]])
    })
}

/// Linearly blend a flattened mask over the original image.
///
/// Per channel: `round(original * (1 - opacity) + masked * opacity)`,
/// clamped to `[0, 255]`. Opacity 0.0 returns a pixel-identical copy of
/// `original`; opacity 1.0 a pixel-identical copy of `masked`.
///
/// # Errors
///
/// Returns [`Error::OpacityOutOfRange`] if `opacity` is outside `[0.0, 1.0]`
/// and [`Error::DimensionMismatch`] if the two images differ in size. The
/// blend never crops or resizes to reconcile mismatched inputs.
pub fn blend_overlay(original: &RgbImage, masked: &RgbImage, opacity: f32) -> Result<RgbImage> {
    if !(0.0..=1.0).contains(&opacity) {
        return Err(Error::OpacityOutOfRange(opacity));
    }
    if original.dimensions() != masked.dimensions() {
        return Err(Error::DimensionMismatch {
            expected: original.dimensions(),
            actual: masked.dimensions(),
        });
    }

    let inv = 1.0 - opacity;
    let mut out = RgbImage::new(original.width(), original.height());
    for (out_px, (orig_px, mask_px)) in out
        .pixels_mut()
        .zip(original.pixels().zip(masked.pixels()))
    {
        for ch in 0..3 {
            let blended = f32::from(orig_px[ch]) * inv + f32::from(mask_px[ch]) * opacity;
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            {
                out_px[ch] = blended.round().clamp(0.0, 255.0) as u8;
            }
        }
    }
    Ok(out)
}
