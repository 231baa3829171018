//! Pure Rust resize backend built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP) | `image::ImageReader` with format sniffing |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder::new_with_quality` |
//! | Encode → PNG | `image::codecs::png::PngEncoder` |
//! | Scratch file | `tempfile::Builder::tempfile_in(work_dir)` |
//!
//! `resize_exact` fills the whole target box, so a source whose aspect ratio
//! differs from the target is stretched.
//!
//! Every resize gets its own scratch file named
//! `<stem>-<w>x<h>-<random>.<ext>`, so concurrent exports of same-named
//! sources never share one. The file is removed again by
//! [`discard`](ImageResizer::discard) once the store has copied it.

use super::backend::{ImageResizer, ResizeError};
use super::params::{OutputFormat, ResizeParams};
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tempfile::NamedTempFile;

const PHOTO_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    PHOTO_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Image file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// Resizes with the `image` crate and writes results into `work_dir`.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend {
    work_dir: PathBuf,
}

impl RustBackend {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
        }
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Create an empty, uniquely named scratch file in `work_dir`.
    fn scratch_file(&self, params: &ResizeParams) -> std::io::Result<NamedTempFile> {
        let stem = params
            .source
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("image");
        let prefix = format!("{}-{}x{}-", stem, params.width, params.height);
        let suffix = format!(".{}", params.format.extension());
        std::fs::create_dir_all(&self.work_dir)?;
        tempfile::Builder::new()
            .prefix(&prefix)
            .suffix(&suffix)
            .tempfile_in(&self.work_dir)
    }
}

fn load_image(path: &Path) -> Result<DynamicImage, ResizeError> {
    ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(|e| ResizeError::Decode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

fn save_image(
    img: &DynamicImage,
    writer: impl Write,
    path: &Path,
    format: OutputFormat,
    quality: u8,
) -> Result<(), ResizeError> {
    let encode_err = |e: image::ImageError| ResizeError::Encode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };

    match format {
        OutputFormat::Jpeg => {
            // JPEG has no alpha channel and the encoder rejects quality 0.
            let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
            let encoder =
                image::codecs::jpeg::JpegEncoder::new_with_quality(writer, quality.max(1));
            rgb.write_with_encoder(encoder).map_err(encode_err)
        }
        OutputFormat::Png => {
            let encoder = image::codecs::png::PngEncoder::new(writer);
            img.write_with_encoder(encoder).map_err(encode_err)
        }
    }
}

impl ImageResizer for RustBackend {
    fn resize(&self, params: &ResizeParams) -> Result<PathBuf, ResizeError> {
        if params.width == 0 || params.height == 0 {
            return Err(ResizeError::InvalidDimensions {
                width: params.width,
                height: params.height,
            });
        }

        let img = load_image(&params.source)?;
        log::debug!(
            "Resizing {} ({}x{}) -> {}x{}",
            params.source.display(),
            img.width(),
            img.height(),
            params.width,
            params.height
        );
        let resized = img.resize_exact(params.width, params.height, FilterType::Lanczos3);

        // Dropped (and deleted) on any error before `keep`.
        let scratch = self.scratch_file(params)?;
        let mut writer = BufWriter::new(scratch.as_file());
        save_image(
            &resized,
            &mut writer,
            scratch.path(),
            params.format,
            params.quality.value(),
        )?;
        writer.flush()?;
        drop(writer);
        let (_, output) = scratch.keep().map_err(|e| e.error)?;
        Ok(output)
    }

    fn discard(&self, output: &Path) {
        if let Err(e) = std::fs::remove_file(output) {
            log::debug!("Could not remove {}: {}", output.display(), e);
        }
    }
}
