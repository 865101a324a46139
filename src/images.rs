use std::fs;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};

use crate::errors::BackendError;
use crate::log::{debug, Logger};
use crate::normalization::{extension, sanitize};

/// Quality setting for the JPEG encoder.
const JPEG_QUALITY: u8 = 90;

/// Unsharp-mask parameters applied after a downscale.
const SHARPEN_SIGMA: f32 = 0.5;
const SHARPEN_THRESHOLD: i32 = 2;

/// An image extension accepted for upload and how to encode it.
#[derive(Clone, Copy, Debug)]
pub struct ImageFormat {
    pub extension: &'static str,
    pub format: image::ImageFormat,
    /// Whether the encoder takes a quality setting and cannot keep an
    /// alpha or palette channel.
    pub lossy: bool,
}

const FORMATS: [ImageFormat; 4] = [
    ImageFormat {
        extension: "gif",
        format: image::ImageFormat::Gif,
        lossy: false,
    },
    ImageFormat {
        extension: "jpeg",
        format: image::ImageFormat::Jpeg,
        lossy: true,
    },
    ImageFormat {
        extension: "jpg",
        format: image::ImageFormat::Jpeg,
        lossy: true,
    },
    ImageFormat {
        extension: "png",
        format: image::ImageFormat::Png,
        lossy: false,
    },
];

/// Looks up the encoding for an uploaded extension. `None` means the
/// extension is not accepted.
pub fn for_extension(extension: &str) -> Option<&'static ImageFormat> {
    FORMATS.iter().find(|f| f.extension == extension)
}

/// The accepted extensions as a human-readable list, for error
/// messages.
pub fn allowed_list() -> String {
    FORMATS
        .iter()
        .map(|f| f.extension)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Stores at most one optimized image per word, keyed by the
/// sanitized word text. Images are not versioned: a new upload
/// replaces whatever was there, across every accepted extension.
pub struct ImageStore {
    logger: Arc<Logger>,
    root: PathBuf,
    max_size: u64,
    target_size: u32,
}

impl ImageStore {
    pub fn new(
        logger: Arc<Logger>,
        root: impl Into<PathBuf>,
        max_size: u64,
        target_size: u32,
    ) -> Self {
        ImageStore {
            logger,
            root: root.into(),
            max_size,
            target_size,
        }
    }

    /// Optimizes and persists an upload, returning the stored
    /// filename.
    pub fn save(
        &self,
        raw: &[u8],
        original_filename: &str,
        word_text: &str,
    ) -> Result<String, BackendError> {
        if raw.is_empty() {
            return Err(BackendError::EmptyUpload);
        }

        let unsupported = || BackendError::UnsupportedType {
            allowed: allowed_list(),
        };

        let extension = extension(original_filename).ok_or_else(unsupported)?;
        let target = for_extension(&extension).ok_or_else(unsupported)?;

        if raw.len() as u64 > self.max_size {
            return Err(BackendError::FileTooLarge {
                limit: self.max_size,
            });
        }

        // One image per word, even across a format change.
        self.delete(word_text)?;

        let decoded = image::load_from_memory(raw)
            .map_err(|e| BackendError::MediaProcessing(e.to_string()))?;

        let prepared = self.prepare(decoded, target);

        fs::create_dir_all(&self.root)?;

        let filename = format!("{}.{}", sanitize(word_text), extension);
        encode(&prepared, &self.root.join(&filename), target)?;

        debug!(self.logger, "Saved image"; "word" => word_text, "filename" => %filename);

        Ok(filename)
    }

    /// Returns the path of a stored file, or `None` when it does not
    /// exist. Never creates anything.
    pub fn path(&self, filename: &str) -> Option<PathBuf> {
        let path = self.root.join(filename);

        if path.exists() {
            Some(path)
        } else {
            None
        }
    }

    /// Removes any stored image for the word, across every accepted
    /// extension. Returns whether anything was removed.
    pub fn delete(&self, word_text: &str) -> Result<bool, BackendError> {
        let safe = sanitize(word_text);
        let mut deleted = false;

        for format in FORMATS.iter() {
            let path = self.root.join(format!("{}.{}", safe, format.extension));

            if path.exists() {
                fs::remove_file(&path)?;
                deleted = true;
            }
        }

        if deleted {
            debug!(self.logger, "Deleted image"; "word" => word_text);
        }

        Ok(deleted)
    }

    /// Returns the stored filename for a word if an image exists,
    /// trying each accepted extension in order. Mutates nothing.
    pub fn filename(&self, word_text: &str) -> Option<String> {
        let safe = sanitize(word_text);

        FORMATS.iter().find_map(|format| {
            let filename = format!("{}.{}", safe, format.extension);

            if self.root.join(&filename).exists() {
                Some(filename)
            } else {
                None
            }
        })
    }

    /// Flattens color modes the target encoder cannot take, fits the
    /// image inside the target box with Lanczos resampling, and
    /// compensates for downscale softness with a mild unsharp mask.
    fn prepare(&self, image: DynamicImage, target: &ImageFormat) -> DynamicImage {
        let image = if target.lossy && !matches!(image, DynamicImage::ImageRgb8(_)) {
            DynamicImage::ImageRgb8(image.to_rgb8())
        } else {
            image
        };

        let image = if image.width().max(image.height()) > self.target_size {
            image.resize(self.target_size, self.target_size, FilterType::Lanczos3)
        } else {
            image
        };

        image.unsharpen(SHARPEN_SIGMA, SHARPEN_THRESHOLD)
    }
}

fn encode(image: &DynamicImage, path: &Path, target: &ImageFormat) -> Result<(), BackendError> {
    let processing = |e: image::ImageError| BackendError::MediaProcessing(e.to_string());

    if target.lossy {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        let mut encoder = JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY);

        match image {
            DynamicImage::ImageRgb8(buffer) => encoder.encode_image(buffer),
            other => encoder.encode_image(&other.to_rgb8()),
        }
        .map_err(processing)?;

        writer.flush()?;
    } else {
        image.save_with_format(path, target.format).map_err(processing)?;
    }

    Ok(())
}
