//! On-disk layout of uploads and job outputs

use std::path::{Path, PathBuf};

/// Directory scheme under one data root:
///
/// ```text
/// uploads/                      raw uploads, named <job id><ext>
/// outputs/api_results/<job>/    visual stage output (videos/, csv/, json/)
/// outputs/audio/                extracted audio
/// outputs/transcripts/          transcripts and linguistic reports
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLayout {
    root: PathBuf,
}

impl StorageLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn uploads_dir(&self) -> PathBuf {
        self.root.join("uploads")
    }

    #[must_use]
    pub fn results_root(&self) -> PathBuf {
        self.root.join("outputs").join("api_results")
    }

    #[must_use]
    pub fn results_dir(&self, job_id: &str) -> PathBuf {
        self.results_root().join(job_id)
    }

    #[must_use]
    pub fn audio_dir(&self) -> PathBuf {
        self.root.join("outputs").join("audio")
    }

    #[must_use]
    pub fn transcripts_dir(&self) -> PathBuf {
        self.root.join("outputs").join("transcripts")
    }

    /// Where an upload for `job_id` with the client's `original_filename` is stored
    #[must_use]
    pub fn upload_path(&self, job_id: &str, original_filename: &str) -> PathBuf {
        let extension = Path::new(original_filename)
            .extension()
            .map_or_else(String::new, |e| format!(".{}", e.to_string_lossy()));
        self.uploads_dir().join(format!("{job_id}{extension}"))
    }

    /// Create the shared directories.
    pub fn ensure(&self) -> std::io::Result<()> {
        for dir in [
            self.uploads_dir(),
            self.results_root(),
            self.audio_dir(),
            self.transcripts_dir(),
        ] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_paths() {
        let layout = StorageLayout::new("/data");
        assert_eq!(layout.uploads_dir(), PathBuf::from("/data/uploads"));
        assert_eq!(
            layout.results_dir("j1"),
            PathBuf::from("/data/outputs/api_results/j1")
        );
        assert_eq!(layout.audio_dir(), PathBuf::from("/data/outputs/audio"));
        assert_eq!(
            layout.transcripts_dir(),
            PathBuf::from("/data/outputs/transcripts")
        );
    }

    #[test]
    fn test_upload_path_keeps_extension() {
        let layout = StorageLayout::new("/data");
        assert_eq!(
            layout.upload_path("j1", "My Clip.MOV"),
            PathBuf::from("/data/uploads/j1.MOV")
        );
        assert_eq!(
            layout.upload_path("j2", "noext"),
            PathBuf::from("/data/uploads/j2")
        );
    }

    #[test]
    fn test_ensure_creates_directories() {
        let dir = TempDir::new().unwrap();
        let layout = StorageLayout::new(dir.path());
        layout.ensure().unwrap();
        assert!(layout.uploads_dir().is_dir());
        assert!(layout.audio_dir().is_dir());
        assert!(layout.transcripts_dir().is_dir());
        assert!(layout.results_root().is_dir());
    }
}
