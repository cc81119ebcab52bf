//! Extract foreground objects from images via an external segmenter.
//!
//! The heavy lifting — deciding which pixels belong to the foreground — is
//! delegated to an injectable [`Segmenter`] (any tool or model that takes
//! encoded image bytes and returns bytes with a transparency mask, such as
//! `rembg`). This crate contributes the surrounding pipeline: flattening
//! the segmenter's alpha mask into an opaque black-background image,
//! compositing adjustable-opacity overlays, batch processing, and bulk ZIP
//! export of the masks.
//!
//! # Quick Start
//!
//! ```no_run
//! use object_extractor::{CommandSegmenter, ExtractionEngine, ProcessOptions};
//!
//! let segmenter = CommandSegmenter::from_command_line("rembg i").unwrap();
//! let engine = ExtractionEngine::new(segmenter);
//!
//! let original = image::open("photo.jpg").unwrap().to_rgb8();
//! let mask = engine.mask_object(&original).unwrap();
//! let overlay = engine.overlay(&original, &mask, 0.5).unwrap();
//! mask.save("masked_photo.png").unwrap();
//! overlay.save("overlay_photo.png").unwrap();
//! ```
//!
//! # Test doubles
//!
//! [`Segmenter`] is implemented for plain closures, so tests can inject a
//! fixed alpha pattern without any model:
//!
//! ```
//! use object_extractor::{ExtractionEngine, Result};
//!
//! let echo = |bytes: &[u8]| -> Result<Vec<u8>> { Ok(bytes.to_vec()) };
//! let engine = ExtractionEngine::new(echo);
//! ```

#![deny(missing_docs)]

pub mod archive;
mod engine;
pub mod error;
pub mod masking;
mod segmenter;

pub use engine::{
    is_supported_image, load_rgb, Artifacts, ExtractionEngine, ProcessOptions, ProcessResult,
    MASK_PREFIX, OVERLAY_PREFIX,
};
pub use error::{Error, Result};
pub use segmenter::{CommandSegmenter, Segmenter};
