use std::env;
use std::path::{Path, PathBuf};

/// Ceiling for uploaded audio files.
pub const MAX_AUDIO_SIZE: u64 = 10 * 1024 * 1024;

/// Ceiling for uploaded images.
pub const MAX_IMAGE_SIZE: u64 = 5 * 1024 * 1024;

/// Longest edge for stored word images, 3x the card display size so
/// they stay crisp on high-DPI screens.
pub const IMAGE_TARGET_SIZE: u32 = 240;

/// Returns the value of the named environment variable if it exists or panics.
pub fn get_variable(name: &str) -> String {
    env::var(name).unwrap_or_else(|_| panic!("must define {} environment variable", name))
}

pub fn get_ffmpeg(env: Option<String>) -> Option<PathBuf> {
    use which::which;

    which("ffmpeg").ok().or_else(move || env.map(PathBuf::from))
}

pub fn get_ffprobe(env: Option<String>) -> Option<PathBuf> {
    use which::which;

    which("ffprobe").ok().or_else(move || env.map(PathBuf::from))
}

/// Filesystem layout and media limits for one deployment.
#[derive(Clone, Debug)]
pub struct Config {
    pub data_dir: PathBuf,
    pub audio_dir: PathBuf,
    pub images_dir: PathBuf,
    pub data_file: PathBuf,
    pub max_audio_size: u64,
    pub max_image_size: u64,
    pub image_target_size: u32,
}

impl Config {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        let data_dir = data_dir.as_ref().to_owned();

        Config {
            audio_dir: data_dir.join("audio"),
            images_dir: data_dir.join("images"),
            data_file: data_dir.join("data.json"),
            data_dir,
            max_audio_size: MAX_AUDIO_SIZE,
            max_image_size: MAX_IMAGE_SIZE,
            image_target_size: IMAGE_TARGET_SIZE,
        }
    }

    pub fn from_env() -> Self {
        Config::new(get_variable("PARAULINS_DATA_DIR"))
    }
}
