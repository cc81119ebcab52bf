//! Bulk export of flattened masks as a ZIP archive.
//!
//! Entries are deflate-compressed PNGs named `masked_<original filename>`.
//! Name collisions are left to the caller; no deduplication happens beyond
//! the fixed prefix.

use std::io::{Cursor, Seek, Write};
use std::path::{Path, PathBuf};

use image::{ImageFormat, RgbaImage};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::engine::MASK_PREFIX;
use crate::error::{Error, Result};

/// Write in-memory masks to `writer` as a ZIP archive.
///
/// Each `(name, mask)` pair becomes a PNG entry named `masked_<name>`.
///
/// # Errors
///
/// Returns [`Error::Image`] if a mask fails to encode and
/// [`Error::Archive`] on ZIP write failures.
pub fn write_masks<W: Write + Seek>(writer: W, masks: &[(String, RgbaImage)]) -> Result<W> {
    let mut zip = ZipWriter::new(writer);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    for (name, mask) in masks {
        let mut buf = Cursor::new(Vec::new());
        mask.write_to(&mut buf, ImageFormat::Png)?;

        zip.start_file(format!("{MASK_PREFIX}{name}"), options)?;
        zip.write_all(&buf.into_inner())?;
    }

    Ok(zip.finish()?)
}

/// Bundle already-written mask files into a ZIP archive at `archive_path`.
///
/// Entries keep each file's name (batch output files already carry the
/// `masked_` prefix). Used by the CLI after a batch run to collect the
/// masks of all successful items.
///
/// # Errors
///
/// Returns [`Error::Io`] if a file cannot be read or has no filename and
/// [`Error::Archive`] on ZIP write failures.
pub fn bundle_files(mask_paths: &[PathBuf], archive_path: &Path) -> Result<()> {
    let file = std::fs::File::create(archive_path)?;
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    for path in mask_paths {
        let name = path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .ok_or_else(|| {
                Error::Io(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("mask path has no filename: {}", path.display()),
                ))
            })?;
        let data = std::fs::read(path)?;

        zip.start_file(name, options)?;
        zip.write_all(&data)?;
    }

    zip.finish()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn write_masks_produces_prefixed_png_entries() {
        let masks = vec![
            ("first.png".to_string(), RgbaImage::from_pixel(2, 2, Rgba([255, 0, 0, 255]))),
            ("second.jpg".to_string(), RgbaImage::from_pixel(3, 1, Rgba([0, 0, 0, 255]))),
        ];

        let cursor = write_masks(Cursor::new(Vec::new()), &masks).unwrap();
        let mut archive = zip::ZipArchive::new(cursor).unwrap();

        assert_eq!(archive.len(), 2);
        let names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        assert!(names.contains(&"masked_first.png".to_string()));
        assert!(names.contains(&"masked_second.jpg".to_string()));
    }

    #[test]
    fn write_masks_entries_decode_back_to_originals() {
        use std::io::Read;

        let mask = RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 255]));
        let masks = vec![("photo.png".to_string(), mask.clone())];

        let cursor = write_masks(Cursor::new(Vec::new()), &masks).unwrap();
        let mut archive = zip::ZipArchive::new(cursor).unwrap();

        let mut entry = archive.by_name("masked_photo.png").unwrap();
        let mut bytes = Vec::new();
        entry.read_to_end(&mut bytes).unwrap();

        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(decoded, mask);
    }

    #[test]
    fn write_masks_with_no_entries_yields_empty_archive() {
        let cursor = write_masks(Cursor::new(Vec::new()), &[]).unwrap();
        let archive = zip::ZipArchive::new(cursor).unwrap();
        assert_eq!(archive.len(), 0);
    }

    #[test]
    fn bundle_files_collects_existing_masks() {
        let dir = tempfile::tempdir().unwrap();
        let mask_path = dir.path().join("masked_photo.png");
        RgbaImage::from_pixel(2, 2, Rgba([5, 5, 5, 255]))
            .save(&mask_path)
            .unwrap();

        let archive_path = dir.path().join("masks.zip");
        bundle_files(&[mask_path], &archive_path).unwrap();

        let file = std::fs::File::open(&archive_path).unwrap();
        let mut archive = zip::ZipArchive::new(file).unwrap();
        assert_eq!(archive.len(), 1);
        assert_eq!(archive.by_index(0).unwrap().name(), "masked_photo.png");
    }
}
