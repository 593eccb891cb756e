//! Progress reporting from ffmpeg's stats output.

/// Receives encode progress in seconds of media processed.
pub trait ProgressSink: Send + Sync {
    /// A run with a known duration is starting.
    fn start(&self, label: &str, total_secs: f64);

    /// Media time reached so far.
    fn advance_to(&self, secs: f64);

    /// The run ended (successfully or not).
    fn finish(&self);
}

/// Extract the elapsed time from a stats line like
/// `frame=  150 fps= 30 ... time=00:00:05.00 bitrate=...`.
///
/// Returns `None` for lines without a usable `time=` field (`N/A`,
/// negative start-up values, malformed text).
pub fn parse_time_marker(line: &str) -> Option<f64> {
    let start = line.find("time=")? + "time=".len();
    let rest = line[start..].trim_start();
    let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
    let value = &rest[..end];
    if value.starts_with('-') {
        return None;
    }

    let parts: Vec<&str> = value.split(':').collect();
    if parts.len() != 3 {
        return None;
    }

    let hours: f64 = parts[0].parse().ok()?;
    let minutes: f64 = parts[1].parse().ok()?;
    let seconds: f64 = parts[2].parse().ok()?;
    if hours < 0.0 || minutes < 0.0 || seconds < 0.0 {
        return None;
    }

    let total = hours * 3600.0 + minutes * 60.0 + seconds;
    total.is_finite().then_some(total)
}
