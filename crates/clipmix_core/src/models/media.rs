//! Media-related data structures (frame rates, inspection records).

use serde::{Deserialize, Serialize};

/// An exact frame rate expressed as a reduced fraction.
///
/// ffprobe reports rates as fractions (`30000/1001`). Keeping them rational
/// means two clips probed separately compare equal when they really share a
/// rate, which a float comparison cannot promise. An undetermined rate is
/// `0/1` ([`FrameRate::UNKNOWN`]) and takes part in comparisons like any
/// other value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameRate {
    num: u64,
    den: u64,
}

impl FrameRate {
    /// Rate of a file that could not be probed.
    pub const UNKNOWN: FrameRate = FrameRate { num: 0, den: 1 };

    /// Create a frame rate from a fraction, reducing it.
    ///
    /// A zero numerator or denominator yields [`FrameRate::UNKNOWN`].
    pub fn new(num: u64, den: u64) -> Self {
        if num == 0 || den == 0 {
            return Self::UNKNOWN;
        }
        let divisor = gcd(num, den);
        Self {
            num: num / divisor,
            den: den / divisor,
        }
    }

    /// Parse an ffprobe rate string.
    ///
    /// Accepts `"30000/1001"`, `"30/1"`, `"25"` and decimals like `"29.97"`.
    /// Anything else (including `"0/0"` and negatives) is unknown.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();

        if let Some((num, den)) = value.split_once('/') {
            return match (num.trim().parse::<u64>(), den.trim().parse::<u64>()) {
                (Ok(n), Ok(d)) => Self::new(n, d),
                _ => Self::UNKNOWN,
            };
        }

        if let Some((whole, frac)) = value.split_once('.') {
            let digits = frac.len() as u32;
            if digits == 0 || digits > 9 || !frac.bytes().all(|b| b.is_ascii_digit()) {
                return Self::UNKNOWN;
            }
            let (Ok(whole), Ok(frac)) = (whole.parse::<u64>(), frac.parse::<u64>()) else {
                return Self::UNKNOWN;
            };
            let scale = 10u64.pow(digits);
            return Self::new(whole * scale + frac, scale);
        }

        value
            .parse::<u64>()
            .map(|n| Self::new(n, 1))
            .unwrap_or(Self::UNKNOWN)
    }

    /// Whether the rate could not be determined.
    pub fn is_unknown(&self) -> bool {
        self.num == 0
    }

    /// Numerator of the reduced fraction.
    pub fn numerator(&self) -> u64 {
        self.num
    }

    /// Denominator of the reduced fraction.
    pub fn denominator(&self) -> u64 {
        self.den
    }

    /// Frames per second as a float.
    pub fn as_f64(&self) -> f64 {
        self.num as f64 / self.den as f64
    }

    /// Value for ffmpeg's `-r` option (`30` or `30000/1001`).
    pub fn ffmpeg_arg(&self) -> String {
        if self.den == 1 {
            self.num.to_string()
        } else {
            format!("{}/{}", self.num, self.den)
        }
    }

    /// Short decimal label used in file names (`30`, `29.97`, `23.976`).
    pub fn label(&self) -> String {
        let text = format!("{:.3}", self.as_f64());
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

impl Default for FrameRate {
    fn default() -> Self {
        Self::UNKNOWN
    }
}

impl std::fmt::Display for FrameRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

/// Properties of one media file as reported by the inspection tool.
///
/// Built fresh for every probe; a failed probe yields `MediaInfo::default()`
/// (zero duration, unknown rate, no codecs).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaInfo {
    /// Container duration in seconds (0 when unknown).
    pub duration_secs: f64,
    /// Codec of the first video stream.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_codec: Option<String>,
    /// Width of the first video stream.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Height of the first video stream.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Frame rate of the first video stream.
    #[serde(default)]
    pub frame_rate: FrameRate,
    /// Codec of the first audio stream.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_codec: Option<String>,
}

impl MediaInfo {
    /// Whether the probe found nothing at all.
    pub fn is_empty(&self) -> bool {
        *self == MediaInfo::default()
    }

    /// Whether a video stream was found.
    pub fn has_video(&self) -> bool {
        self.video_codec.is_some()
    }

    /// Resolution as `WxH`, if known.
    pub fn resolution(&self) -> Option<String> {
        match (self.width, self.height) {
            (Some(w), Some(h)) => Some(format!("{}x{}", w, h)),
            _ => None,
        }
    }
}
