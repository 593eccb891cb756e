//! Directory scanning for clips and music.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Settings;

/// Inputs could not be found.
#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("No videos found in {}", .0.display())]
    NoVideos(PathBuf),

    #[error("No music files found in {}", .0.display())]
    NoMusic(PathBuf),

    #[error("Cannot read directory {}: {source}", dir.display())]
    Unreadable {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result type for discovery.
pub type DiscoveryResult<T> = Result<T, DiscoveryError>;

/// Clips and music track found for a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveredInputs {
    /// Clips in file-name order.
    pub videos: Vec<PathBuf>,
    /// First music file by name.
    pub music: PathBuf,
}

/// Find the clips in the project root and the music track.
///
/// Only regular files are considered. Extensions match case-insensitively.
/// The configured excluded names and the output file itself are never
/// treated as clips.
pub fn discover_inputs(settings: &Settings) -> DiscoveryResult<DiscoveredInputs> {
    let project = settings.project_root();
    let output_name = settings
        .output_path()
        .file_name()
        .map(|n| n.to_string_lossy().to_string());

    let videos: Vec<PathBuf> = list_files(&project)?
        .into_iter()
        .filter(|p| has_extension(p, &settings.media.video_extensions))
        .filter(|p| {
            let name = p
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            !settings.media.excluded_names.contains(&name)
                && output_name.as_deref() != Some(name.as_str())
        })
        .collect();

    if videos.is_empty() {
        return Err(DiscoveryError::NoVideos(project));
    }

    let music_dir = settings.music_dir();
    let music = list_files(&music_dir)?
        .into_iter()
        .find(|p| has_extension(p, &settings.media.audio_extensions))
        .ok_or(DiscoveryError::NoMusic(music_dir))?;

    Ok(DiscoveredInputs { videos, music })
}

/// Whether `path` ends in one of `extensions` (with or without the dot).
pub fn has_extension(path: &Path, extensions: &[String]) -> bool {
    let Some(ext) = path.extension() else {
        return false;
    };
    let ext = ext.to_string_lossy().to_lowercase();
    extensions
        .iter()
        .any(|e| e.trim_start_matches('.').to_lowercase() == ext)
}

/// Regular files directly inside `dir`, sorted by name.
fn list_files(dir: &Path) -> DiscoveryResult<Vec<PathBuf>> {
    let unreadable = |source| DiscoveryError::Unreadable {
        dir: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(unreadable)? {
        let entry = entry.map_err(unreadable)?;
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}
