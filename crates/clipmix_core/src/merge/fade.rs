//! Fade timing for the music-length cut.

use serde::{Deserialize, Serialize};

/// Trim length and fade placement for a video cut to the music.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FadeWindow {
    /// Length the video is trimmed to (the music duration).
    pub duration_secs: f64,
    /// Fade-in length starting at 0.
    pub fade_in_secs: f64,
    /// Where the fade-out begins; never negative.
    pub fade_out_start_secs: f64,
    /// Fade-out length.
    pub fade_out_secs: f64,
}

impl FadeWindow {
    /// Window for music of `duration_secs`, with the fade-out ending at the
    /// end of the music.
    pub fn for_music(duration_secs: f64, fade_in_secs: f64, fade_out_secs: f64) -> Self {
        Self {
            duration_secs,
            fade_in_secs,
            fade_out_start_secs: (duration_secs - fade_out_secs).max(0.0),
            fade_out_secs,
        }
    }

    /// `-filter_complex` graph producing the `[v]` output pad.
    pub fn filter_graph(&self) -> String {
        format!(
            "[0:v]trim=duration={},fade=t=in:st=0:d={},fade=t=out:st={}:d={}[v]",
            self.duration_secs, self.fade_in_secs, self.fade_out_start_secs, self.fade_out_secs
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fade_out_ends_with_music() {
        let window = FadeWindow::for_music(30.0, 0.5, 1.0);
        assert_eq!(window.fade_out_start_secs, 29.0);
    }

    #[test]
    fn fade_out_start_never_negative() {
        let window = FadeWindow::for_music(0.5, 0.5, 1.0);
        assert_eq!(window.fade_out_start_secs, 0.0);
    }

    #[test]
    fn filter_graph_format() {
        let window = FadeWindow::for_music(95.5, 0.5, 1.0);
        assert_eq!(
            window.filter_graph(),
            "[0:v]trim=duration=95.5,fade=t=in:st=0:d=0.5,fade=t=out:st=94.5:d=1[v]"
        );
    }
}
