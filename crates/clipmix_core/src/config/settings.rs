//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! Each section can be updated independently for atomic section-level updates.

use std::fs;
use std::path::{self, Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Project layout.
    #[serde(default)]
    pub paths: PathSettings,

    /// Which files count as clips and music.
    #[serde(default)]
    pub media: MediaSettings,

    /// Fade durations applied to the final video.
    #[serde(default)]
    pub fades: FadeSettings,

    /// External tool and encoder selection.
    #[serde(default)]
    pub encoding: EncodingSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Settings {
    /// Project directory holding the clips.
    pub fn project_root(&self) -> PathBuf {
        PathBuf::from(&self.paths.project_root)
    }

    /// Rewrite `project_root` as an absolute path.
    ///
    /// Every derived path (clips, transcodes, manifest entries) inherits the
    /// root's form, and ffmpeg resolves relative manifest entries against the
    /// manifest's own directory. Existing roots are canonicalized; a missing
    /// root is joined onto the current directory so validation can still
    /// report it.
    pub fn absolutize_project_root(&mut self) {
        let root = self.project_root();
        let absolute = fs::canonicalize(&root).or_else(|_| path::absolute(&root));
        match absolute {
            Ok(absolute) => self.paths.project_root = absolute.to_string_lossy().to_string(),
            Err(e) => tracing::debug!("Cannot make {} absolute: {}", root.display(), e),
        }
    }

    /// Directory scanned for the music track.
    pub fn music_dir(&self) -> PathBuf {
        self.resolve(&self.paths.music_dir)
    }

    /// Working directory for manifests and transcoded intermediates.
    pub fn work_dir(&self) -> PathBuf {
        self.resolve(&self.paths.work_dir)
    }

    /// Final output file.
    pub fn output_path(&self) -> PathBuf {
        self.resolve(&self.paths.output_file)
    }

    /// Location of the concatenation manifest.
    pub fn manifest_path(&self) -> PathBuf {
        self.work_dir().join(&self.paths.manifest_name)
    }

    /// Logs folder (resolved against the working directory of the process,
    /// not the project).
    pub fn logs_folder(&self) -> PathBuf {
        PathBuf::from(&self.paths.logs_folder)
    }

    fn resolve(&self, value: &str) -> PathBuf {
        let path = Path::new(value);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root().join(path)
        }
    }
}

/// Path configuration for the project layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    /// Directory containing the video clips.
    #[serde(default = "default_project_root")]
    pub project_root: String,

    /// Music directory (relative to the project root unless absolute).
    #[serde(default = "default_music_dir")]
    pub music_dir: String,

    /// Working directory for manifests and transcodes.
    #[serde(default = "default_work_dir")]
    pub work_dir: String,

    /// Final output file name.
    #[serde(default = "default_output_file")]
    pub output_file: String,

    /// File name of the concat manifest inside the work dir.
    #[serde(default = "default_manifest_name")]
    pub manifest_name: String,

    /// Folder for log files.
    #[serde(default = "default_logs_folder")]
    pub logs_folder: String,
}

fn default_project_root() -> String {
    ".".to_string()
}

fn default_music_dir() -> String {
    "Music".to_string()
}

fn default_work_dir() -> String {
    "transcoded".to_string()
}

fn default_output_file() -> String {
    "final_video_fast.mp4".to_string()
}

fn default_manifest_name() -> String {
    "concat_list.txt".to_string()
}

fn default_logs_folder() -> String {
    ".logs".to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            project_root: default_project_root(),
            music_dir: default_music_dir(),
            work_dir: default_work_dir(),
            output_file: default_output_file(),
            manifest_name: default_manifest_name(),
            logs_folder: default_logs_folder(),
        }
    }
}

/// Recognized extensions and excluded file names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaSettings {
    /// Extensions treated as video clips (with leading dot).
    #[serde(default = "default_video_extensions")]
    pub video_extensions: Vec<String>,

    /// Extensions treated as music tracks.
    #[serde(default = "default_audio_extensions")]
    pub audio_extensions: Vec<String>,

    /// File names never picked up as clips.
    #[serde(default = "default_excluded_names")]
    pub excluded_names: Vec<String>,
}

fn default_video_extensions() -> Vec<String> {
    [".mp4", ".mov", ".mkv", ".avi", ".m4a", ".3gp", ".3g2"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_audio_extensions() -> Vec<String> {
    [".mp3", ".wav", ".m4a", ".aac"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_excluded_names() -> Vec<String> {
    ["music.mp3", "final_video_fast.mp4", "final_video.mp4"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for MediaSettings {
    fn default() -> Self {
        Self {
            video_extensions: default_video_extensions(),
            audio_extensions: default_audio_extensions(),
            excluded_names: default_excluded_names(),
        }
    }
}

/// Fade configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FadeSettings {
    /// Fade-in length at the start of the video.
    #[serde(default = "default_fade_in")]
    pub fade_in_secs: f64,

    /// Fade-out length, ending where the music ends.
    #[serde(default = "default_fade_out")]
    pub fade_out_secs: f64,
}

fn default_fade_in() -> f64 {
    0.5
}

fn default_fade_out() -> f64 {
    1.0
}

impl Default for FadeSettings {
    fn default() -> Self {
        Self {
            fade_in_secs: default_fade_in(),
            fade_out_secs: default_fade_out(),
        }
    }
}

/// External tools and encoder choices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncodingSettings {
    /// ffmpeg executable.
    #[serde(default = "default_ffmpeg")]
    pub ffmpeg_path: String,

    /// ffprobe executable.
    #[serde(default = "default_ffprobe")]
    pub ffprobe_path: String,

    /// Hardware H.264 encoder.
    #[serde(default = "default_hardware_encoder")]
    pub hardware_encoder: String,

    /// Preset passed with the hardware encoder.
    #[serde(default = "default_hardware_preset")]
    pub hardware_preset: String,

    /// Software encoder used when a filter forces a re-encode in copy mode.
    #[serde(default = "default_software_encoder")]
    pub software_encoder: String,

    /// Audio codec for transcodes and merges.
    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,

    /// Audio bitrate for transcodes.
    #[serde(default = "default_transcode_audio_bitrate")]
    pub transcode_audio_bitrate: String,

    /// Container extension of transcoded intermediates.
    #[serde(default = "default_transcode_extension")]
    pub transcode_extension: String,
}

fn default_ffmpeg() -> String {
    "ffmpeg".to_string()
}

fn default_ffprobe() -> String {
    "ffprobe".to_string()
}

fn default_hardware_encoder() -> String {
    "h264_nvenc".to_string()
}

fn default_hardware_preset() -> String {
    "p5".to_string()
}

fn default_software_encoder() -> String {
    "libx264".to_string()
}

fn default_audio_codec() -> String {
    "aac".to_string()
}

fn default_transcode_audio_bitrate() -> String {
    "128k".to_string()
}

fn default_transcode_extension() -> String {
    "mp4".to_string()
}

impl Default for EncodingSettings {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg(),
            ffprobe_path: default_ffprobe(),
            hardware_encoder: default_hardware_encoder(),
            hardware_preset: default_hardware_preset(),
            software_encoder: default_software_encoder(),
            audio_codec: default_audio_codec(),
            transcode_audio_bitrate: default_transcode_audio_bitrate(),
            transcode_extension: default_transcode_extension(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Use compact log format (hide raw tool output).
    #[serde(default = "default_true")]
    pub compact: bool,

    /// Number of tool output lines kept for error diagnosis.
    #[serde(default = "default_error_tail")]
    pub error_tail: u32,

    /// Progress update step percentage.
    #[serde(default = "default_progress_step")]
    pub progress_step: u32,

    /// Log the full ffmpeg command one option per line.
    #[serde(default)]
    pub show_command_pretty: bool,
}

fn default_true() -> bool {
    true
}

fn default_error_tail() -> u32 {
    20
}

fn default_progress_step() -> u32 {
    20
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            compact: true,
            error_tail: default_error_tail(),
            progress_step: default_progress_step(),
            show_command_pretty: false,
        }
    }
}

/// Config sections for atomic updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSection {
    Paths,
    Media,
    Fades,
    Encoding,
    Logging,
}

impl ConfigSection {
    /// All sections, in file order.
    pub const ALL: [ConfigSection; 5] = [
        ConfigSection::Paths,
        ConfigSection::Media,
        ConfigSection::Fades,
        ConfigSection::Encoding,
        ConfigSection::Logging,
    ];

    /// Get the TOML table name for this section.
    pub fn table_name(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "paths",
            ConfigSection::Media => "media",
            ConfigSection::Fades => "fades",
            ConfigSection::Encoding => "encoding",
            ConfigSection::Logging => "logging",
        }
    }

    /// Comment written above the table in generated files.
    pub fn comment(&self) -> &'static str {
        match self {
            ConfigSection::Paths => "# Project layout (relative paths resolve against project_root)",
            ConfigSection::Media => "# Recognized clip/music extensions and excluded names",
            ConfigSection::Fades => "# Fade in/out around the music track",
            ConfigSection::Encoding => "# External tools and encoders",
            ConfigSection::Logging => "# Logging configuration",
        }
    }
}
