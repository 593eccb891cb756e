//! File probing using `ffprobe -print_format json`.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde_json::Value;

use super::MediaProber;
use crate::models::{FrameRate, MediaInfo};

/// Prober backed by the ffprobe executable.
pub struct FfprobeProber {
    /// Path to ffprobe executable.
    ffprobe_path: PathBuf,
}

impl FfprobeProber {
    pub fn new(ffprobe_path: impl Into<PathBuf>) -> Self {
        Self {
            ffprobe_path: ffprobe_path.into(),
        }
    }

    fn run_ffprobe(&self, path: &Path) -> Option<Vec<u8>> {
        let output = Command::new(&self.ffprobe_path)
            .args(["-v", "quiet", "-print_format", "json", "-show_format", "-show_streams"])
            .arg(path)
            .stdin(Stdio::null())
            .output();

        let output = match output {
            Ok(output) => output,
            Err(e) => {
                tracing::debug!("Failed to run {}: {}", self.ffprobe_path.display(), e);
                return None;
            }
        };

        if !output.status.success() || output.stdout.is_empty() {
            tracing::debug!(
                "ffprobe gave no data for {} (exit {:?})",
                path.display(),
                output.status.code()
            );
            return None;
        }

        Some(output.stdout)
    }
}

impl Default for FfprobeProber {
    fn default() -> Self {
        Self::new("ffprobe")
    }
}

impl MediaProber for FfprobeProber {
    fn probe(&self, path: &Path) -> MediaInfo {
        tracing::debug!("Probing file: {}", path.display());

        let Some(stdout) = self.run_ffprobe(path) else {
            return MediaInfo::default();
        };

        match serde_json::from_slice::<Value>(&stdout) {
            Ok(json) => parse_ffprobe_json(&json),
            Err(e) => {
                tracing::debug!("Unparsable ffprobe output for {}: {}", path.display(), e);
                MediaInfo::default()
            }
        }
    }
}

/// Build a [`MediaInfo`] from ffprobe's JSON document.
///
/// The first video stream supplies codec, dimensions and frame rate; the
/// first audio stream supplies the audio codec. Missing fields stay empty.
pub fn parse_ffprobe_json(json: &Value) -> MediaInfo {
    let mut info = MediaInfo::default();

    if let Some(streams) = json.get("streams").and_then(|s| s.as_array()) {
        let mut seen_video = false;
        let mut seen_audio = false;

        for stream in streams {
            match stream.get("codec_type").and_then(|t| t.as_str()) {
                Some("video") if !seen_video => {
                    seen_video = true;
                    info.video_codec = string_field(stream, "codec_name");
                    info.width = stream
                        .get("width")
                        .and_then(|w| w.as_u64())
                        .map(|w| w as u32);
                    info.height = stream
                        .get("height")
                        .and_then(|h| h.as_u64())
                        .map(|h| h as u32);
                    info.frame_rate = stream
                        .get("r_frame_rate")
                        .and_then(|r| r.as_str())
                        .map(FrameRate::parse)
                        .unwrap_or(FrameRate::UNKNOWN);
                }
                Some("audio") if !seen_audio => {
                    seen_audio = true;
                    info.audio_codec = string_field(stream, "codec_name");
                }
                _ => {}
            }
        }
    }

    // ffprobe prints duration as a string; accept a number too
    info.duration_secs = json
        .get("format")
        .and_then(|f| f.get("duration"))
        .and_then(|d| match d {
            Value::String(s) => s.trim().parse::<f64>().ok(),
            Value::Number(n) => n.as_f64(),
            _ => None,
        })
        .filter(|d| d.is_finite() && *d >= 0.0)
        .unwrap_or(0.0);

    info
}

fn string_field(stream: &Value, key: &str) -> Option<String> {
    stream.get(key).and_then(|v| v.as_str()).map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_video_and_audio_streams() {
        let doc = json!({
            "streams": [
                {"codec_type": "video", "codec_name": "h264", "width": 1920,
                 "height": 1080, "r_frame_rate": "30000/1001"},
                {"codec_type": "audio", "codec_name": "aac"}
            ],
            "format": {"duration": "12.500000"}
        });

        let info = parse_ffprobe_json(&doc);
        assert_eq!(info.video_codec.as_deref(), Some("h264"));
        assert_eq!(info.width, Some(1920));
        assert_eq!(info.height, Some(1080));
        assert_eq!(info.frame_rate, FrameRate::new(30000, 1001));
        assert_eq!(info.audio_codec.as_deref(), Some("aac"));
        assert_eq!(info.duration_secs, 12.5);
    }

    #[test]
    fn first_video_stream_wins() {
        let doc = json!({
            "streams": [
                {"codec_type": "video", "codec_name": "hevc", "r_frame_rate": "60/1"},
                {"codec_type": "video", "codec_name": "mjpeg", "r_frame_rate": "90000/1"}
            ]
        });

        let info = parse_ffprobe_json(&doc);
        assert_eq!(info.video_codec.as_deref(), Some("hevc"));
        assert_eq!(info.frame_rate, FrameRate::new(60, 1));
    }

    #[test]
    fn tolerates_missing_duration_and_rate() {
        let doc = json!({
            "streams": [{"codec_type": "video", "codec_name": "h264"}],
            "format": {}
        });

        let info = parse_ffprobe_json(&doc);
        assert_eq!(info.duration_secs, 0.0);
        assert!(info.frame_rate.is_unknown());
    }

    #[test]
    fn audio_only_file() {
        let doc = json!({
            "streams": [{"codec_type": "audio", "codec_name": "mp3"}],
            "format": {"duration": "30.0"}
        });

        let info = parse_ffprobe_json(&doc);
        assert!(!info.has_video());
        assert_eq!(info.audio_codec.as_deref(), Some("mp3"));
        assert_eq!(info.duration_secs, 30.0);
    }

    #[test]
    fn bad_duration_is_zero() {
        let doc = json!({"format": {"duration": "N/A"}});
        assert_eq!(parse_ffprobe_json(&doc).duration_secs, 0.0);
    }

    #[test]
    fn missing_tool_gives_empty_record() {
        let prober = FfprobeProber::new("/nonexistent/ffprobe-binary");
        let info = prober.probe(Path::new("/nonexistent/clip.mp4"));
        assert!(info.is_empty());
    }
}
