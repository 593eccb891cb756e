//! Majority frame-rate selection.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::models::FrameRate;
use crate::probe::MediaProber;

/// Count of clips per frame rate, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameRateHistogram {
    entries: Vec<(FrameRate, usize)>,
}

impl FrameRateHistogram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one more clip at `rate`.
    pub fn record(&mut self, rate: FrameRate) {
        match self.entries.iter_mut().find(|(r, _)| *r == rate) {
            Some((_, count)) => *count += 1,
            None => self.entries.push((rate, 1)),
        }
    }

    /// Number of distinct rates seen.
    pub fn distinct(&self) -> usize {
        self.entries.len()
    }

    /// Number of clips at `rate`.
    pub fn count(&self, rate: FrameRate) -> usize {
        self.entries
            .iter()
            .find(|(r, _)| *r == rate)
            .map(|(_, c)| *c)
            .unwrap_or(0)
    }

    /// Rate with the highest count.
    ///
    /// Ties go to the rate recorded first, so the result only depends on the
    /// order clips were fed in (discovery sorts them by name).
    pub fn majority(&self) -> Option<FrameRate> {
        let mut best: Option<(FrameRate, usize)> = None;
        for &(rate, count) in &self.entries {
            match best {
                Some((_, best_count)) if count <= best_count => {}
                _ => best = Some((rate, count)),
            }
        }
        best.map(|(rate, _)| rate)
    }

    /// Iterate `(rate, count)` pairs in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (FrameRate, usize)> + '_ {
        self.entries.iter().copied()
    }
}

impl FromIterator<FrameRate> for FrameRateHistogram {
    fn from_iter<I: IntoIterator<Item = FrameRate>>(iter: I) -> Self {
        let mut histogram = Self::new();
        for rate in iter {
            histogram.record(rate);
        }
        histogram
    }
}

impl std::fmt::Display for FrameRateHistogram {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, (rate, count)) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", rate, count)?;
        }
        write!(f, "}}")
    }
}

/// Outcome of checking a clip list for a shared frame rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompatibilityReport {
    /// True when every clip has the same rate (or there are fewer than 2).
    pub compatible: bool,
    /// Rate to normalize to; unknown for an empty clip list.
    pub majority: FrameRate,
    /// Per-rate counts (empty when fewer than 2 clips were given).
    pub histogram: FrameRateHistogram,
}

/// Decide whether `videos` can be stream-copied together.
///
/// - Fewer than 2 clips: compatible, majority is the single clip's rate
///   (unknown for an empty list).
/// - Otherwise every clip is probed; clips that fail to probe count as
///   rate 0 like any other value. Compatible iff one distinct rate was
///   seen. The majority is the most common rate, ties resolved in favour of
///   the rate that appeared first in `videos`.
pub fn analyze_compatibility(prober: &dyn MediaProber, videos: &[PathBuf]) -> CompatibilityReport {
    if videos.len() < 2 {
        let majority = videos
            .first()
            .map(|v| prober.probe(v).frame_rate)
            .unwrap_or(FrameRate::UNKNOWN);
        return CompatibilityReport {
            compatible: true,
            majority,
            histogram: FrameRateHistogram::new(),
        };
    }

    let histogram: FrameRateHistogram = videos
        .iter()
        .map(|video| {
            let info = prober.probe(video);
            if info.has_video() {
                tracing::debug!(
                    "{} -> {} fps, {}",
                    video.display(),
                    info.frame_rate,
                    info.resolution().unwrap_or_else(|| "size unknown".to_string())
                );
            } else {
                tracing::debug!("{} -> no video stream found", video.display());
            }
            info.frame_rate
        })
        .collect();

    CompatibilityReport {
        compatible: histogram.distinct() == 1,
        majority: histogram.majority().unwrap_or(FrameRate::UNKNOWN),
        histogram,
    }
}
