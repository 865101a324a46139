/// An audio extension accepted for upload and the encoding target a
/// trimmed upload is written back with: the ffmpeg muxer and encoder
/// to use, and the extension of the result.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AudioFormat {
    pub extension: &'static str,
    pub container: &'static str,
    pub codec: &'static str,
    pub output_extension: &'static str,
}

const FORMATS: [AudioFormat; 5] = [
    AudioFormat {
        extension: "m4a",
        container: "ipod",
        codec: "aac",
        output_extension: "m4a",
    },
    AudioFormat {
        extension: "mp3",
        container: "mp3",
        codec: "libmp3lame",
        output_extension: "mp3",
    },
    AudioFormat {
        extension: "ogg",
        container: "ogg",
        codec: "libvorbis",
        output_extension: "ogg",
    },
    AudioFormat {
        extension: "wav",
        container: "wav",
        codec: "pcm_s16le",
        output_extension: "wav",
    },
    // Browser recordings arrive as WebM, which is not an export
    // target; trimmed WebM is written out as lossless WAV.
    AudioFormat {
        extension: "webm",
        container: "wav",
        codec: "pcm_s16le",
        output_extension: "wav",
    },
];

/// Looks up the encoding target for an uploaded extension. `None`
/// means the extension is not accepted at all.
pub fn for_extension(extension: &str) -> Option<&'static AudioFormat> {
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
