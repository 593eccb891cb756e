//! Core enums used throughout the application.

use serde::{Deserialize, Serialize};

/// How the final merge treats the video stream.
///
/// Chosen once per run, never per file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeMode {
    /// Pass video through untouched when no filter is applied; software
    /// encoder when a trim/fade forces a re-encode.
    StreamCopy,
    /// Always re-encode video with the hardware encoder.
    HardwareTranscode,
}

impl MergeMode {
    /// Whether the hardware encoder is selected.
    pub fn uses_hardware(&self) -> bool {
        matches!(self, MergeMode::HardwareTranscode)
    }
}

impl std::fmt::Display for MergeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MergeMode::StreamCopy => write!(f, "stream copy"),
            MergeMode::HardwareTranscode => write!(f, "hardware transcode"),
        }
    }
}
