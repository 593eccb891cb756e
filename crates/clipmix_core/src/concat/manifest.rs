//! Manifest reading and writing.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::probe::{probe_duration, MediaProber};

/// Write `videos` to `path` as a concat manifest, replacing any previous one.
pub fn write_manifest(path: &Path, videos: &[PathBuf]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut content = String::new();
    for video in videos {
        content.push_str(&format!("file '{}'\n", quote_path(video)));
    }

    fs::write(path, content)?;
    tracing::debug!("Wrote manifest {} ({} entries)", path.display(), videos.len());
    Ok(())
}

/// Parse the entries of a manifest written by [`write_manifest`].
///
/// Lines that are not `file` directives are ignored.
pub fn read_manifest(path: &Path) -> io::Result<Vec<PathBuf>> {
    let content = fs::read_to_string(path)?;

    Ok(content
        .lines()
        .filter_map(|line| line.trim().strip_prefix("file "))
        .map(|entry| PathBuf::from(unquote(entry.trim())))
        .collect())
}

/// Sum of the probed durations of every manifest entry, in seconds.
///
/// Entries that cannot be probed contribute 0. An unreadable manifest
/// yields 0 as well since the total only drives progress display.
pub fn total_duration(prober: &dyn MediaProber, manifest: &Path) -> f64 {
    match read_manifest(manifest) {
        Ok(entries) => entries
            .iter()
            .map(|entry| probe_duration(prober, entry))
            .sum(),
        Err(e) => {
            tracing::warn!("Could not read manifest {}: {}", manifest.display(), e);
            0.0
        }
    }
}

fn quote_path(path: &Path) -> String {
    path.to_string_lossy()
        .replace('\\', "/")
        .replace('\'', r"'\''")
}

fn unquote(entry: &str) -> String {
    let inner = entry
        .strip_prefix('\'')
        .and_then(|e| e.strip_suffix('\''))
        .unwrap_or(entry);
    inner.replace(r"'\''", "'")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MediaInfo;
    use crate::testing::FakeProber;
    use tempfile::tempdir;

    #[test]
    fn writes_one_line_per_clip_in_order() {
        let dir = tempdir().unwrap();
        let manifest = dir.path().join("concat_list.txt");
        let videos: Vec<PathBuf> = ["a.mp4", "b.mp4", "c.mp4"].iter().map(PathBuf::from).collect();

        write_manifest(&manifest, &videos).unwrap();

        let content = fs::read_to_string(&manifest).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines, vec!["file 'a.mp4'", "file 'b.mp4'", "file 'c.mp4'"]);
    }

    #[test]
    fn overwrites_previous_manifest() {
        let dir = tempdir().unwrap();
        let manifest = dir.path().join("list.txt");

        write_manifest(&manifest, &[PathBuf::from("old1.mp4"), PathBuf::from("old2.mp4")])
            .unwrap();
        write_manifest(&manifest, &[PathBuf::from("new.mp4")]).unwrap();

        assert_eq!(read_manifest(&manifest).unwrap(), vec![PathBuf::from("new.mp4")]);
    }

    #[test]
    fn uses_forward_slashes() {
        assert_eq!(quote_path(Path::new(r"C:\clips\a.mp4")), "C:/clips/a.mp4");
    }

    #[test]
    fn escapes_single_quotes() {
        let dir = tempdir().unwrap();
        let manifest = dir.path().join("list.txt");
        let tricky = PathBuf::from("/clips/it's here.mp4");

        write_manifest(&manifest, std::slice::from_ref(&tricky)).unwrap();

        let content = fs::read_to_string(&manifest).unwrap();
        assert_eq!(content, "file '/clips/it'\\''s here.mp4'\n");
        assert_eq!(read_manifest(&manifest).unwrap(), vec![tricky]);
    }

    #[test]
    fn creates_work_dir() {
        let dir = tempdir().unwrap();
        let manifest = dir.path().join("transcoded").join("list.txt");

        write_manifest(&manifest, &[PathBuf::from("a.mp4")]).unwrap();
        assert!(manifest.exists());
    }

    #[test]
    fn total_duration_sums_entries() {
        let dir = tempdir().unwrap();
        let manifest = dir.path().join("list.txt");
        let prober = FakeProber::new();
        prober.insert(
            "a.mp4",
            MediaInfo {
                duration_secs: 10.5,
                ..Default::default()
            },
        );
        prober.insert(
            "b.mp4",
            MediaInfo {
                duration_secs: 4.5,
                ..Default::default()
            },
        );

        write_manifest(
            &manifest,
            &[PathBuf::from("a.mp4"), PathBuf::from("b.mp4"), PathBuf::from("unknown.mp4")],
        )
        .unwrap();

        assert_eq!(total_duration(&prober, &manifest), 15.0);
        assert_eq!(total_duration(&prober, &dir.path().join("missing.txt")), 0.0);
    }
}
