//! ffmpeg merge command options builder.
//!
//! Builds the argument tokens for the single ffmpeg call that reads the
//! concat manifest, optionally overlays the music, and writes the output.

use std::path::Path;

use super::fade::FadeWindow;
use crate::config::EncodingSettings;
use crate::models::MergeMode;

/// Builder for the merge command line.
pub struct MergeCommandBuilder<'a> {
    encoding: &'a EncodingSettings,
    manifest: &'a Path,
    output: &'a Path,
    mode: MergeMode,
    music: Option<&'a Path>,
    fade: Option<FadeWindow>,
}

impl<'a> MergeCommandBuilder<'a> {
    pub fn new(
        encoding: &'a EncodingSettings,
        manifest: &'a Path,
        output: &'a Path,
        mode: MergeMode,
    ) -> Self {
        Self {
            encoding,
            manifest,
            output,
            mode,
            music: None,
            fade: None,
        }
    }

    /// Add a music track. With `Some(window)` the video is trimmed and
    /// faded to it; with `None` the shorter stream ends the output.
    pub fn with_music(mut self, music: &'a Path, fade: Option<FadeWindow>) -> Self {
        self.music = Some(music);
        self.fade = fade;
        self
    }

    /// Build the complete token list (without the program name).
    pub fn build(&self) -> Vec<String> {
        let mut tokens: Vec<String> = ["-y", "-f", "concat", "-safe", "0", "-i"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        tokens.push(self.manifest.to_string_lossy().to_string());

        match (self.music, self.fade) {
            (Some(music), Some(fade)) => {
                tokens.push("-i".to_string());
                tokens.push(music.to_string_lossy().to_string());
                self.add_fade_options(&mut tokens, &fade);
            }
            (Some(music), None) => {
                tokens.push("-i".to_string());
                tokens.push(music.to_string_lossy().to_string());
                push_all(&mut tokens, &["-map", "0:v", "-map", "1:a", "-shortest"]);
                self.add_codec_options(&mut tokens);
            }
            (None, _) => self.add_codec_options(&mut tokens),
        }

        tokens.push(self.output.to_string_lossy().to_string());
        tokens
    }

    /// Trim+fade graph; the video is always re-encoded here.
    fn add_fade_options(&self, tokens: &mut Vec<String>, fade: &FadeWindow) {
        tokens.push("-filter_complex".to_string());
        tokens.push(fade.filter_graph());
        push_all(tokens, &["-map", "[v]", "-map", "1:a"]);
        tokens.push("-t".to_string());
        tokens.push(fade.duration_secs.to_string());

        tokens.push("-c:v".to_string());
        if self.mode.uses_hardware() {
            tokens.push(self.encoding.hardware_encoder.clone());
        } else {
            tokens.push(self.encoding.software_encoder.clone());
        }
        tokens.push("-c:a".to_string());
        tokens.push(self.encoding.audio_codec.clone());
        self.add_preset(tokens);
    }

    /// Codec options when no filter is applied.
    fn add_codec_options(&self, tokens: &mut Vec<String>) {
        tokens.push("-c:v".to_string());
        if self.mode.uses_hardware() {
            tokens.push(self.encoding.hardware_encoder.clone());
        } else {
            tokens.push("copy".to_string());
        }
        tokens.push("-c:a".to_string());
        tokens.push(self.encoding.audio_codec.clone());
        self.add_preset(tokens);
    }

    fn add_preset(&self, tokens: &mut Vec<String>) {
        if self.mode.uses_hardware() {
            tokens.push("-preset".to_string());
            tokens.push(self.encoding.hardware_preset.clone());
        }
    }
}

fn push_all(tokens: &mut Vec<String>, values: &[&str]) {
    tokens.extend(values.iter().map(|v| v.to_string()));
}
