use std::ffi::OsString;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use lazy_static::lazy_static;
use serde::Deserialize;
use tempfile::{Builder, TempPath};

use crate::errors::BackendError;
use crate::log::{debug, Logger};
use crate::normalization::{extension, sanitize};
use crate::recording::RecordingDate;

pub mod format;

use format::AudioFormat;

lazy_static! {
    static ref FFPROBE_ARGS: Vec<OsString> = vec![
        OsString::from("-hide_banner"),
        OsString::from("-v"),
        OsString::from("error"),
        OsString::from("-of"),
        OsString::from("json"),
        OsString::from("-show_entries"),
        OsString::from("format=duration"),
    ];
}

#[derive(Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
}

#[derive(Deserialize)]
struct FfprobeFormat {
    duration: String,
}

/// Stores audio uploads under
/// `<root>/<child>/<word>/YYYY-MM-DD.<ext>`. Path segments are
/// sanitized; the filename returned to callers is the storage key,
/// never a full path.
pub struct AudioStore {
    logger: Arc<Logger>,
    root: PathBuf,
    max_size: u64,
    ffmpeg: Option<PathBuf>,
    ffprobe: Option<PathBuf>,
}

impl AudioStore {
    pub fn new(
        logger: Arc<Logger>,
        root: impl Into<PathBuf>,
        max_size: u64,
        ffmpeg: Option<PathBuf>,
        ffprobe: Option<PathBuf>,
    ) -> Self {
        AudioStore {
            logger,
            root: root.into(),
            max_size,
            ffmpeg,
            ffprobe,
        }
    }

    /// Persists an upload verbatim and returns the stored filename.
    pub fn save(
        &self,
        raw: &[u8],
        original_filename: &str,
        child_name: &str,
        word_text: &str,
        date: RecordingDate,
    ) -> Result<String, BackendError> {
        let (extension, _) = self.validate(raw, original_filename)?;

        let directory = self.word_directory(child_name, word_text);
        fs::create_dir_all(&directory)?;

        let filename = format!("{}.{}", date, extension);
        fs::write(directory.join(&filename), raw)?;

        debug!(self.logger, "Saved audio";
               "child" => child_name, "word" => word_text, "filename" => %filename);

        Ok(filename)
    }

    /// Persists an upload after cutting it down to
    /// `[start, end)` seconds. The waveform is decoded and re-encoded
    /// through ffmpeg with millisecond-precision bounds, using the
    /// encoding target looked up from the uploaded extension, so the
    /// returned filename may carry a different extension than the
    /// upload.
    ///
    /// A negative start is corrected to zero; the end is clamped to
    /// the probed duration. A window that is empty after clamping is
    /// a [`BackendError::InvalidTrimRange`].
    pub fn save_with_trim(
        &self,
        raw: &[u8],
        original_filename: &str,
        child_name: &str,
        word_text: &str,
        date: RecordingDate,
        start_seconds: f64,
        end_seconds: f64,
    ) -> Result<String, BackendError> {
        let (extension, target) = self.validate(raw, original_filename)?;

        let start = start_seconds.max(0.0);

        if end_seconds <= start {
            return Err(BackendError::InvalidTrimRange {
                start: start_seconds,
                end: end_seconds,
            });
        }

        let ffmpeg = self.ffmpeg.as_ref().ok_or_else(|| {
            BackendError::MediaProcessing("ffmpeg is not available".to_owned())
        })?;
        let ffprobe = self.ffprobe.as_ref().ok_or_else(|| {
            BackendError::MediaProcessing("ffprobe is not available".to_owned())
        })?;

        // Both tools want a real file with a recognizable extension.
        // TempPath removes the intermediates on every exit path.
        let input = spill(raw, &extension)?;
        let output = empty_temp(target.output_extension)?;

        let duration = probe_duration(ffprobe, &input)?;
        let end = end_seconds.min(duration);

        if end <= start {
            return Err(BackendError::InvalidTrimRange {
                start: start_seconds,
                end: end_seconds,
            });
        }

        debug!(self.logger, "Trimming audio";
               "container" => target.container, "codec" => target.codec,
               "start" => start, "end" => end, "duration" => duration);

        run_trim(ffmpeg, &input, &output, target, start, end)?;

        let directory = self.word_directory(child_name, word_text);
        fs::create_dir_all(&directory)?;

        let filename = format!("{}.{}", date, target.output_extension);
        fs::copy(&output, directory.join(&filename))?;

        debug!(self.logger, "Saved trimmed audio";
               "child" => child_name, "word" => word_text, "filename" => %filename);

        Ok(filename)
    }

    /// Returns the path of a stored file, or `None` when it does not
    /// exist. Never creates anything.
    pub fn path(&self, child_name: &str, word_text: &str, filename: &str) -> Option<PathBuf> {
        let path = self
            .word_directory(child_name, word_text)
            .join(filename);

        if path.exists() {
            Some(path)
        } else {
            None
        }
    }

    /// Removes a stored file, then any word and child directories
    /// left empty by the removal. Returns whether a file was deleted.
    pub fn delete(
        &self,
        child_name: &str,
        word_text: &str,
        filename: &str,
    ) -> Result<bool, BackendError> {
        let path = match self.path(child_name, word_text, filename) {
            Some(path) => path,
            None => return Ok(false),
        };

        fs::remove_file(&path)?;

        remove_if_empty(&self.word_directory(child_name, word_text))?;
        remove_if_empty(&self.root.join(sanitize(child_name)))?;

        debug!(self.logger, "Deleted audio";
               "child" => child_name, "word" => word_text, "filename" => filename);

        Ok(true)
    }

    /// Lists the stored audio filenames for a word, sorted. Files
    /// with unrecognized extensions are skipped.
    pub fn files(&self, child_name: &str, word_text: &str) -> Result<Vec<String>, BackendError> {
        let directory = self.word_directory(child_name, word_text);

        let entries = match fs::read_dir(&directory) {
            Ok(entries) => entries,
            Err(ref e) if e.kind() == ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(e.into()),
        };

        let mut files = vec![];

        for entry in entries {
            let filename = entry?.file_name().to_string_lossy().into_owned();

            let recognized = extension(&filename)
                .and_then(|e| format::for_extension(&e))
                .is_some();

            if recognized {
                files.push(filename);
            }
        }

        files.sort();

        Ok(files)
    }

    fn word_directory(&self, child_name: &str, word_text: &str) -> PathBuf {
        self.root.join(sanitize(child_name)).join(sanitize(word_text))
    }

    /// Checks the extension and size of an upload before any disk or
    /// decode work.
    fn validate(
        &self,
        raw: &[u8],
        original_filename: &str,
    ) -> Result<(String, &'static AudioFormat), BackendError> {
        let unsupported = || BackendError::UnsupportedType {
            allowed: format::allowed_list(),
        };

        let extension = extension(original_filename).ok_or_else(unsupported)?;
        let target = format::for_extension(&extension).ok_or_else(unsupported)?;

        if raw.len() as u64 > self.max_size {
            return Err(BackendError::FileTooLarge {
                limit: self.max_size,
            });
        }

        Ok((extension, target))
    }
}

fn spill(raw: &[u8], extension: &str) -> Result<TempPath, BackendError> {
    let mut file = Builder::new()
        .suffix(&format!(".{}", extension))
        .tempfile()
        .map_err(BackendError::TemporaryFileError)?;

    file.write_all(raw).map_err(BackendError::TemporaryFileError)?;

    Ok(file.into_temp_path())
}

fn empty_temp(extension: &str) -> Result<TempPath, BackendError> {
    let file = Builder::new()
        .suffix(&format!(".{}", extension))
        .tempfile()
        .map_err(BackendError::TemporaryFileError)?;

    Ok(file.into_temp_path())
}

fn probe_duration(ffprobe: &Path, input: &Path) -> Result<f64, BackendError> {
    let result = Command::new(ffprobe)
        .args(FFPROBE_ARGS.iter())
        .arg(input)
        .output()
        .map_err(|e| BackendError::MediaProcessing(format!("unable to run ffprobe: {}", e)))?;

    if !result.status.success() {
        return Err(BackendError::MediaProcessing(
            String::from_utf8_lossy(&result.stderr).trim().to_owned(),
        ));
    }

    let parsed: FfprobeOutput = serde_json::from_slice(&result.stdout)
        .map_err(|e| BackendError::MediaProcessing(format!("malformed ffprobe output: {}", e)))?;

    parsed
        .format
        .duration
        .parse()
        .map_err(|e| BackendError::MediaProcessing(format!("malformed ffprobe duration: {}", e)))
}

fn run_trim(
    ffmpeg: &Path,
    input: &Path,
    destination: &Path,
    target: &AudioFormat,
    start: f64,
    end: f64,
) -> Result<(), BackendError> {
    let result = Command::new(ffmpeg)
        .arg("-hide_banner")
        .args(&["-v", "error"])
        .arg("-i")
        .arg(input)
        .arg("-ss")
        .arg(format!("{:.3}", start))
        .arg("-to")
        .arg(format!("{:.3}", end))
        .args(&["-f", target.container])
        .args(&["-c:a", target.codec])
        .arg("-y")
        .arg(destination)
        .output()
        .map_err(|e| BackendError::MediaProcessing(format!("unable to run ffmpeg: {}", e)))?;

    if !result.status.success() {
        return Err(BackendError::MediaProcessing(
            String::from_utf8_lossy(&result.stderr).trim().to_owned(),
        ));
    }

    Ok(())
}

fn remove_if_empty(directory: &Path) -> Result<(), BackendError> {
    let mut entries = match fs::read_dir(directory) {
        Ok(entries) => entries,
        Err(_) => return Ok(()),
    };

    if entries.next().is_none() {
        fs::remove_dir(directory)?;
    }

    Ok(())
}
