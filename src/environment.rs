use std::env;
use std::fs;
use std::sync::Arc;

use crate::audio::AudioStore;
use crate::config::{get_ffmpeg, get_ffprobe, Config};
use crate::db::{Db, JsonDb};
use crate::errors::BackendError;
use crate::images::ImageStore;
use crate::log::Logger;

/// Everything a caller needs to serve requests.
#[derive(Clone)]
pub struct Environment {
    pub logger: Arc<Logger>,
    pub db: Arc<dyn Db>,
    pub audio: Arc<AudioStore>,
    pub images: Arc<ImageStore>,
    pub config: Config,
}

impl Environment {
    pub fn new(
        logger: Arc<Logger>,
        db: Arc<dyn Db>,
        audio: Arc<AudioStore>,
        images: Arc<ImageStore>,
        config: Config,
    ) -> Self {
        Environment {
            logger,
            db,
            audio,
            images,
            config,
        }
    }

    /// Builds the full tree from `PARAULINS_DATA_DIR`.
    pub fn from_env(logger: Arc<Logger>) -> Result<Self, BackendError> {
        Environment::with_config(logger, Config::from_env())
    }

    /// Builds the store tree for the given layout, creating the
    /// data, audio and images directories if needed. ffmpeg and
    /// ffprobe are resolved from the path, with
    /// `PARAULINS_FFMPEG_PATH`/`PARAULINS_FFPROBE_PATH` as
    /// fallbacks.
    pub fn with_config(logger: Arc<Logger>, config: Config) -> Result<Self, BackendError> {
        fs::create_dir_all(&config.data_dir)?;
        fs::create_dir_all(&config.audio_dir)?;
        fs::create_dir_all(&config.images_dir)?;

        let db = Arc::new(JsonDb::new(logger.clone(), config.data_file.clone()));

        let ffmpeg = get_ffmpeg(env::var("PARAULINS_FFMPEG_PATH").ok());
        let ffprobe = get_ffprobe(env::var("PARAULINS_FFPROBE_PATH").ok());

        let audio = Arc::new(AudioStore::new(
            logger.clone(),
            config.audio_dir.clone(),
            config.max_audio_size,
            ffmpeg,
            ffprobe,
        ));

        let images = Arc::new(ImageStore::new(
            logger.clone(),
            config.images_dir.clone(),
            config.max_image_size,
            config.image_target_size,
        ));

        Ok(Environment::new(logger, db, audio, images, config))
    }
}
