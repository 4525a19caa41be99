//! Video input/output
//!
//! Decoding and encoding run through `ffmpeg` subprocesses exchanging raw
//! `rgb24` frames over pipes.

use crate::{FrameError, Result};
use image::RgbImage;
use std::io::{Read, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use tracing::{debug, info, warn};
use video_analysis_ingestion::MediaProbe;

/// Geometry and rate of a video stream
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoProperties {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
}

impl VideoProperties {
    fn frame_len(&self) -> usize {
        self.width as usize * self.height as usize * 3
    }
}

/// A stream of decoded RGB frames
pub trait FrameSource: Send {
    fn properties(&self) -> VideoProperties;

    /// Next frame in presentation order, `None` at end of stream.
    fn next_frame(&mut self) -> Result<Option<RgbImage>>;
}

/// Destination for annotated frames
pub trait FrameSink: Send {
    fn write_frame(&mut self, frame: &RgbImage) -> Result<()>;

    /// Flush and close the output.
    fn finish(self: Box<Self>) -> Result<()>;
}

/// What a live display wants after seeing a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayControl {
    Continue,
    Stop,
}

/// Live preview of annotated frames, e.g. a window that can be closed.
pub trait FrameDisplay {
    fn show(&mut self, frame: &RgbImage, timestamp: f64) -> DisplayControl;
}

/// Opens readers and writers for the visual stage
pub trait VideoBackend: Send + Sync {
    fn open(&self, path: &Path) -> Result<Box<dyn FrameSource>>;

    fn create_writer(
        &self,
        path: &Path,
        properties: VideoProperties,
    ) -> Result<Box<dyn FrameSink>>;
}

/// Decoder reading raw frames from an `ffmpeg` child process
pub struct FfmpegFrameReader {
    child: Child,
    stdout: ChildStdout,
    properties: VideoProperties,
    finished: bool,
}

impl FfmpegFrameReader {
    /// Decoder arguments. Frames keep the coded geometry reported by the
    /// probe, so rotation metadata is not applied.
    fn decode_args(path: &Path) -> Vec<std::ffi::OsString> {
        let mut args: Vec<std::ffi::OsString> = ["-v", "error", "-noautorotate", "-i"]
            .into_iter()
            .map(std::ffi::OsString::from)
            .collect();
        args.push(path.as_os_str().to_os_string());
        args.extend(["-f", "rawvideo", "-pix_fmt", "rgb24", "-"].map(std::ffi::OsString::from));
        args
    }

    pub fn spawn(program: &str, path: &Path, properties: VideoProperties) -> Result<Self> {
        let mut command = Command::new(program);
        command
            .args(Self::decode_args(path))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        debug!("Spawning {:?}", command);

        let mut child = command.spawn().map_err(|e| FrameError::Open {
            path: path.display().to_string(),
            reason: format!("failed to start {program}: {e}"),
        })?;
        let stdout = child.stdout.take().ok_or_else(|| FrameError::Open {
            path: path.display().to_string(),
            reason: "decoder stdout unavailable".to_string(),
        })?;

        Ok(Self {
            child,
            stdout,
            properties,
            finished: false,
        })
    }

    fn wait_for_exit(&mut self) -> Result<()> {
        self.finished = true;
        let mut stderr = String::new();
        if let Some(mut pipe) = self.child.stderr.take() {
            // best effort, only used for the error message
            let _ = pipe.read_to_string(&mut stderr);
        }
        let status = self.child.wait()?;
        if !status.success() {
            return Err(FrameError::Decode(format!(
                "decoder exited with {status}: {}",
                stderr.trim()
            )));
        }
        Ok(())
    }
}

impl FrameSource for FfmpegFrameReader {
    fn properties(&self) -> VideoProperties {
        self.properties
    }

    fn next_frame(&mut self) -> Result<Option<RgbImage>> {
        if self.finished {
            return Ok(None);
        }

        let frame_len = self.properties.frame_len();
        let mut buf = vec![0u8; frame_len];
        let mut filled = 0;
        while filled < frame_len {
            match self.stdout.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        if filled == 0 {
            self.wait_for_exit()?;
            return Ok(None);
        }
        if filled < frame_len {
            self.wait_for_exit()?;
            return Err(FrameError::Decode(format!(
                "truncated frame: got {filled} of {frame_len} bytes"
            )));
        }

        RgbImage::from_raw(self.properties.width, self.properties.height, buf)
            .map(Some)
            .ok_or_else(|| FrameError::Decode("frame buffer size mismatch".to_string()))
    }
}

impl Drop for FfmpegFrameReader {
    fn drop(&mut self) {
        if !self.finished {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

/// Encoder feeding raw frames into an `ffmpeg` child process
pub struct FfmpegVideoWriter {
    child: Option<Child>,
    stdin: Option<ChildStdin>,
}

impl FfmpegVideoWriter {
    pub fn spawn(program: &str, path: &Path, properties: VideoProperties) -> Result<Self> {
        let mut command = Command::new(program);
        command
            .args(["-v", "error", "-y", "-f", "rawvideo", "-pix_fmt", "rgb24"])
            .arg("-s")
            .arg(format!("{}x{}", properties.width, properties.height))
            .arg("-r")
            .arg(format!("{:.3}", properties.fps))
            .args(["-i", "-"])
            // yuv420p needs even dimensions
            .args(["-vf", "pad=ceil(iw/2)*2:ceil(ih/2)*2"])
            .args(["-c:v", "mpeg4", "-q:v", "5", "-pix_fmt", "yuv420p"])
            .arg(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        debug!("Spawning {:?}", command);

        let mut child = command
            .spawn()
            .map_err(|e| FrameError::Encode(format!("failed to start {program}: {e}")))?;
        let stdin = child.stdin.take();
        info!("Writing annotated video to {}", path.display());

        Ok(Self {
            child: Some(child),
            stdin,
        })
    }
}

impl FrameSink for FfmpegVideoWriter {
    fn write_frame(&mut self, frame: &RgbImage) -> Result<()> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| FrameError::Encode("encoder input closed".to_string()))?;
        stdin
            .write_all(frame.as_raw())
            .map_err(|e| FrameError::Encode(format!("encoder pipe: {e}")))
    }

    fn finish(mut self: Box<Self>) -> Result<()> {
        // closing stdin signals end of stream
        drop(self.stdin.take());
        let Some(child) = self.child.take() else {
            return Ok(());
        };
        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(FrameError::Encode(format!(
                "encoder exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(())
    }
}

impl Drop for FfmpegVideoWriter {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            warn!("Video writer dropped without finish, killing encoder");
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

/// [`VideoBackend`] using `ffprobe` for stream geometry and `ffmpeg` pipes for frames
pub struct FfmpegVideoBackend {
    program: String,
    probe: Box<dyn MediaProbe>,
}

impl FfmpegVideoBackend {
    pub fn new(probe: Box<dyn MediaProbe>) -> Self {
        Self {
            program: "ffmpeg".to_string(),
            probe,
        }
    }
}

impl VideoBackend for FfmpegVideoBackend {
    fn open(&self, path: &Path) -> Result<Box<dyn FrameSource>> {
        let open_error = |reason: String| FrameError::Open {
            path: path.display().to_string(),
            reason,
        };

        if !path.exists() {
            return Err(open_error("file not found".to_string()));
        }
        let info = self.probe.probe(path).map_err(|e| open_error(e.to_string()))?;
        let stream = info
            .video_stream()
            .ok_or_else(|| open_error("no video stream".to_string()))?;

        let (width, height) = match (stream.width, stream.height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
            _ => return Err(open_error("unknown frame size".to_string())),
        };
        let fps = match stream.fps {
            Some(fps) if fps.is_finite() && fps > 0.0 => fps,
            _ => {
                warn!("No usable frame rate for {}, assuming 30", path.display());
                30.0
            }
        };

        let properties = VideoProperties { width, height, fps };
        info!(
            "Opened {} ({}x{} @ {:.2} fps)",
            path.display(),
            width,
            height,
            fps
        );
        Ok(Box::new(FfmpegFrameReader::spawn(
            &self.program,
            path,
            properties,
        )?))
    }

    fn create_writer(
        &self,
        path: &Path,
        properties: VideoProperties,
    ) -> Result<Box<dyn FrameSink>> {
        Ok(Box::new(FfmpegVideoWriter::spawn(
            &self.program,
            path,
            properties,
        )?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use video_analysis_common::MediaInfo;

    struct NoVideoProbe;

    impl MediaProbe for NoVideoProbe {
        fn probe(&self, _path: &Path) -> video_analysis_ingestion::Result<MediaInfo> {
            Ok(MediaInfo {
                format: "wav".to_string(),
                duration: 1.0,
                size_bytes: 4,
                streams: Vec::new(),
                metadata: Default::default(),
            })
        }
    }

    #[test]
    fn test_frame_len() {
        let props = VideoProperties {
            width: 4,
            height: 2,
            fps: 25.0,
        };
        assert_eq!(props.frame_len(), 24);
    }

    #[test]
    fn test_decoder_keeps_coded_geometry() {
        let args = FfmpegFrameReader::decode_args(Path::new("/videos/phone.mp4"));
        let args: Vec<&str> = args.iter().filter_map(|a| a.to_str()).collect();
        let input = args.iter().position(|a| *a == "-i").unwrap();
        let noautorotate = args.iter().position(|a| *a == "-noautorotate").unwrap();
        assert!(noautorotate < input);
        assert_eq!(args[input + 1], "/videos/phone.mp4");
        assert_eq!(&args[args.len() - 5..], ["-f", "rawvideo", "-pix_fmt", "rgb24", "-"]);
    }

    #[test]
    fn test_open_missing_file() {
        let backend = FfmpegVideoBackend::new(Box::new(NoVideoProbe));
        let err = backend.open(Path::new("/nonexistent/input.mp4")).err().unwrap();
        assert!(matches!(err, FrameError::Open { .. }));
    }

    #[test]
    fn test_open_requires_video_stream() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audio_only.mp4");
        std::fs::write(&path, b"data").unwrap();

        let backend = FfmpegVideoBackend::new(Box::new(NoVideoProbe));
        let err = backend.open(&path).err().unwrap();
        assert!(err.to_string().contains("no video stream"));
    }
}
