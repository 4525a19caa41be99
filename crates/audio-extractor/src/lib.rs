//! Audio extraction module
//!
//! Pulls the audio track out of a video container as an uncompressed,
//! fixed-rate WAV suitable for speech models.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::info;
use video_analysis_common::{tools::run_tool, ProcessingError, Result};

/// Audio extraction configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioConfig {
    /// Target sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels (1 for mono, 2 for stereo)
    pub channels: u8,
    /// `FFmpeg` codec used for the output WAV
    pub codec: &'static str,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self::for_transcription()
    }
}

impl AudioConfig {
    /// 16 kHz mono signed 16-bit PCM, the input format speech models expect
    #[must_use]
    pub fn for_transcription() -> Self {
        Self {
            sample_rate: 16000,
            channels: 1,
            codec: "pcm_s16le",
        }
    }

    /// File extension of the produced audio
    #[must_use]
    pub fn extension(&self) -> &'static str {
        "wav"
    }
}

/// Capability: extract the audio track of a media file.
pub trait AudioExtractor: Send + Sync {
    /// Write the audio of `input_path` into `output_dir` and return the new file's path.
    fn extract(&self, input_path: &Path, output_dir: &Path, config: &AudioConfig)
        -> Result<PathBuf>;
}

/// Extractor backed by the `ffmpeg` command line tool
#[derive(Debug, Clone)]
pub struct FfmpegAudioExtractor {
    program: String,
}

impl Default for FfmpegAudioExtractor {
    fn default() -> Self {
        Self {
            program: "ffmpeg".to_string(),
        }
    }
}

impl FfmpegAudioExtractor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific ffmpeg binary.
    #[must_use]
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

/// Output path for the audio extracted from `input_path`.
#[must_use]
pub fn output_path_for(input_path: &Path, output_dir: &Path, config: &AudioConfig) -> PathBuf {
    let stem = input_path
        .file_stem()
        .map_or_else(|| "audio".into(), |s| s.to_string_lossy().into_owned());
    output_dir.join(format!("{stem}.{}", config.extension()))
}

fn ffmpeg_args(input_path: &Path, output_path: &Path, config: &AudioConfig) -> Vec<OsString> {
    vec![
        "-i".into(),
        input_path.as_os_str().to_owned(),
        "-vn".into(),
        "-acodec".into(),
        config.codec.into(),
        "-ar".into(),
        config.sample_rate.to_string().into(),
        "-ac".into(),
        config.channels.to_string().into(),
        "-y".into(),
        output_path.as_os_str().to_owned(),
    ]
}

impl AudioExtractor for FfmpegAudioExtractor {
    fn extract(
        &self,
        input_path: &Path,
        output_dir: &Path,
        config: &AudioConfig,
    ) -> Result<PathBuf> {
        let output_path = output_path_for(input_path, output_dir, config);
        info!(
            "Extracting audio from {} to {}",
            input_path.display(),
            output_path.display()
        );

        run_tool(&self.program, ffmpeg_args(input_path, &output_path, config))?;

        // ffmpeg can exit cleanly without writing anything for odd inputs
        if !output_path.exists() {
            return Err(ProcessingError::FFmpegError(
                "Output file was not created".to_string(),
            ));
        }

        Ok(output_path)
    }
}
