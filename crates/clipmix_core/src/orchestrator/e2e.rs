//! End-to-end runs of the standard pipeline against fake tools.

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use super::*;
use crate::concat::read_manifest;
use crate::config::{ConfigManager, Settings};
use crate::discovery::DiscoveryError;
use crate::logging::{JobLogger, LogConfig};
use crate::models::{FrameRate, MediaInfo, MergeMode};
use crate::testing::{FakeProber, RecordingRunner};

struct Project {
    _dir: TempDir,
    root: PathBuf,
    prober: Arc<FakeProber>,
}

impl Project {
    /// Project with `clips` (name, fps) and a 30 s music track.
    fn new(clips: &[(&str, u64)]) -> Self {
        crate::logging::init_test_tracing();
        let dir = tempfile::tempdir().unwrap();
        // The context canonicalizes the root; key the fakes the same way
        let root = fs::canonicalize(dir.path()).unwrap();
        let prober = Arc::new(FakeProber::new());

        for (name, fps) in clips {
            let path = root.join(name);
            fs::write(&path, b"").unwrap();
            prober.insert(
                path,
                MediaInfo {
                    duration_secs: 10.0,
                    video_codec: Some("h264".to_string()),
                    frame_rate: FrameRate::new(*fps, 1),
                    ..Default::default()
                },
            );
        }

        let music = root.join("Music").join("song.mp3");
        fs::create_dir_all(music.parent().unwrap()).unwrap();
        fs::write(&music, b"").unwrap();
        prober.insert(
            music,
            MediaInfo {
                duration_secs: 30.0,
                audio_codec: Some("mp3".to_string()),
                ..Default::default()
            },
        );

        Self {
            _dir: dir,
            root,
            prober,
        }
    }

    fn root(&self) -> &Path {
        &self.root
    }

    fn clip(&self, name: &str) -> PathBuf {
        self.root().join(name)
    }

    fn run(&self, runner: &Arc<RecordingRunner>) -> (PipelineResult<PipelineRunResult>, JobState) {
        self.run_from(&self.root().to_string_lossy(), runner)
    }

    /// Run with `project_root` set to `root` verbatim.
    fn run_from(
        &self,
        root: &str,
        runner: &Arc<RecordingRunner>,
    ) -> (PipelineResult<PipelineRunResult>, JobState) {
        let mut settings = Settings::default();
        settings.paths.project_root = root.to_string();

        let logger = Arc::new(
            JobLogger::new("e2e", self.root().join(".logs"), LogConfig::default(), None).unwrap(),
        );
        let runner: Arc<dyn crate::runner::ToolRunner> = runner.clone();
        let ctx = Context::new(settings, "e2e", logger, runner, self.prober.clone());

        let mut state = JobState::new("e2e");
        let result = create_standard_pipeline().run(&ctx, &mut state);
        (result, state)
    }
}

/// `target` spelled relative to the current directory.
fn relative_to_cwd(target: &Path) -> PathBuf {
    let cwd = fs::canonicalize(std::env::current_dir().unwrap()).unwrap();
    let mut relative = PathBuf::new();
    for component in cwd.components() {
        if matches!(component, Component::Normal(_)) {
            relative.push("..");
        }
    }
    for component in target.components() {
        if let Component::Normal(part) = component {
            relative.push(part);
        }
    }
    relative
}

fn merges(runner: &RecordingRunner) -> Vec<crate::runner::Invocation> {
    runner.calls_with("concat")
}

fn transcodes(runner: &RecordingRunner) -> Vec<crate::runner::Invocation> {
    runner.calls_with("-b:a")
}

#[test]
fn compatible_clips_take_fast_path() {
    let project = Project::new(&[("a.mp4", 30), ("b.mp4", 30), ("c.mp4", 30)]);
    let runner = Arc::new(RecordingRunner::new());

    let (result, state) = project.run(&runner);
    let result = result.unwrap();

    assert!(result.completed("FastPath"));
    assert!(result.skipped("TranscodePath"));
    assert!(transcodes(&runner).is_empty());
    assert_eq!(merges(&runner).len(), 1);
    assert_eq!(runner.calls().len(), 1);

    let merge = state.merge.unwrap();
    assert_eq!(merge.mode, MergeMode::StreamCopy);
    assert_eq!(merge.path, project.clip("final_video_fast.mp4"));
    assert!(merge.path.exists());
    assert_eq!(
        read_manifest(&project.root().join("transcoded/concat_list.txt")).unwrap(),
        vec![project.clip("a.mp4"), project.clip("b.mp4"), project.clip("c.mp4")]
    );
}

#[test]
fn incompatible_clips_take_transcode_path() {
    let project = Project::new(&[("a.mp4", 30), ("b.mp4", 25), ("c.mp4", 30)]);
    let runner = Arc::new(RecordingRunner::new());

    let (result, state) = project.run(&runner);
    let result = result.unwrap();

    assert!(result.skipped("FastPath"));
    assert!(result.completed("TranscodePath"));
    assert!(!state.fell_back());

    let encodes = transcodes(&runner);
    assert_eq!(encodes.len(), 3);
    // Only the 25 fps clip gets a rate conversion
    let with_rate: Vec<_> = encodes
        .iter()
        .filter(|inv| inv.args.contains(&"-r".to_string()))
        .collect();
    assert_eq!(with_rate.len(), 1);
    assert!(with_rate[0].args.contains(&project.clip("b.mp4").to_string_lossy().to_string()));

    let merged = merges(&runner);
    assert_eq!(merged.len(), 1);
    assert!(merged[0].args.contains(&"h264_nvenc".to_string()));
    assert_eq!(state.merge.unwrap().mode, MergeMode::HardwareTranscode);
}

#[test]
fn failed_transcodes_are_left_out_of_manifest() {
    let project = Project::new(&[("a.mp4", 30), ("b.mp4", 25), ("c.mp4", 30)]);
    let bad = project.clip("c.mp4").to_string_lossy().to_string();
    let runner = Arc::new(RecordingRunner::failing_when(move |inv| {
        inv.args.contains(&bad) && inv.args.contains(&"-b:a".to_string())
    }));

    let (result, state) = project.run(&runner);
    result.unwrap();

    let outcome = state.transcode.unwrap();
    assert_eq!(outcome.transcoded.len(), 2);
    assert_eq!(outcome.failed, vec![project.clip("c.mp4")]);

    let manifest = read_manifest(&project.root().join("transcoded/concat_list.txt")).unwrap();
    assert_eq!(manifest, outcome.transcoded);
    assert_eq!(merges(&runner).len(), 1);
}

#[test]
fn no_videos_halts_before_any_tool_runs() {
    let project = Project::new(&[]);
    let runner = Arc::new(RecordingRunner::new());

    let (result, state) = project.run(&runner);
    let err = result.unwrap_err();

    assert!(matches!(
        err.step_error(),
        Some(StepError::Discovery(DiscoveryError::NoVideos(_)))
    ));
    assert!(runner.calls().is_empty());
    assert!(state.merge.is_none());
}

#[test]
fn fast_path_failure_falls_back_once() {
    let project = Project::new(&[("a.mp4", 30), ("b.mp4", 30), ("c.mp4", 30)]);
    // The stream-copy merge re-encodes with the software encoder under the fade
    let runner = Arc::new(RecordingRunner::failing_when(|inv| {
        inv.args.contains(&"libx264".to_string())
    }));

    let (result, state) = project.run(&runner);
    let result = result.unwrap();

    assert!(result.skipped("FastPath"));
    assert!(result.completed("TranscodePath"));
    assert!(state.fell_back());
    assert_eq!(transcodes(&runner).len(), 3);

    let merged = merges(&runner);
    assert_eq!(merged.len(), 2);
    assert!(merged[0].args.contains(&"libx264".to_string()));
    assert!(merged[1].args.contains(&"h264_nvenc".to_string()));
    assert_eq!(state.merge.unwrap().mode, MergeMode::HardwareTranscode);
}

#[test]
fn fallback_failure_is_not_retried() {
    let project = Project::new(&[("a.mp4", 30), ("b.mp4", 30)]);
    let runner = Arc::new(RecordingRunner::failing_when(|inv| {
        inv.args.contains(&"concat".to_string())
    }));

    let (result, state) = project.run(&runner);
    let err = result.unwrap_err();

    assert!(matches!(err.step_error(), Some(StepError::Merge(_))));
    assert!(err.to_string().contains("TranscodePath"));
    assert_eq!(merges(&runner).len(), 2);
    assert!(state.fell_back());
    assert!(state.merge.is_none());
}

#[test]
fn all_transcodes_failing_is_fatal() {
    let project = Project::new(&[("a.mp4", 30), ("b.mp4", 25)]);
    let runner = Arc::new(RecordingRunner::failing_when(|inv| {
        inv.args.contains(&"-b:a".to_string())
    }));

    let (result, _state) = project.run(&runner);
    let err = result.unwrap_err();

    assert!(matches!(
        err.step_error(),
        Some(StepError::NothingToMerge { failed: 2 })
    ));
    assert!(merges(&runner).is_empty());
}

#[test]
fn rerun_reuses_transcoded_clips() {
    let project = Project::new(&[("a.mp4", 30), ("b.mp4", 25), ("c.mp4", 30)]);

    let first = Arc::new(RecordingRunner::new());
    project.run(&first).0.unwrap();
    assert_eq!(transcodes(&first).len(), 3);

    let second = Arc::new(RecordingRunner::new());
    project.run(&second).0.unwrap();
    assert!(transcodes(&second).is_empty());
    assert_eq!(merges(&second).len(), 1);
}

#[test]
fn run_state_serializes() {
    let project = Project::new(&[("a.mp4", 30), ("b.mp4", 25)]);
    let runner = Arc::new(RecordingRunner::new());

    let (result, state) = project.run(&runner);
    result.unwrap();

    let json = serde_json::to_value(&state).unwrap();
    assert_eq!(json["merge"]["mode"], "hardware_transcode");
    assert_eq!(json["transcode"]["transcoded"].as_array().unwrap().len(), 2);
    assert!(json["compatibility"]["compatible"] == false);
}

#[test]
fn relative_root_writes_resolvable_manifest() {
    let project = Project::new(&[("a.mp4", 30), ("b.mp4", 25)]);
    let runner = Arc::new(RecordingRunner::new());

    let relative = relative_to_cwd(project.root());
    assert!(relative.is_relative());
    let (result, state) = project.run_from(&relative.to_string_lossy(), &runner);
    result.unwrap();

    // The concat demuxer resolves entries against the list's directory
    let manifest = project.root().join("transcoded/concat_list.txt");
    let entries = read_manifest(&manifest).unwrap();
    assert_eq!(entries.len(), 2);
    for entry in &entries {
        assert!(entry.is_absolute(), "{} is relative", entry.display());
        assert!(manifest.parent().unwrap().join(entry).exists());
    }
    assert_eq!(state.merge.unwrap().path, project.clip("final_video_fast.mp4"));
}

#[test]
fn mistyped_project_is_rejected_and_not_created() {
    crate::logging::init_test_tracing();
    let dir = tempfile::tempdir().unwrap();
    let project = dir.path().join("trainng");

    let mut config = ConfigManager::new(dir.path().join("clipmix.toml"));
    config.load_or_create().unwrap();
    config.settings_mut().paths.project_root = project.to_string_lossy().to_string();
    config.settings_mut().paths.logs_folder =
        dir.path().join("logs").to_string_lossy().to_string();
    config.ensure_dirs_exist().unwrap();
    assert!(!project.exists());

    let logger = Arc::new(
        JobLogger::new("e2e", config.settings().logs_folder(), LogConfig::default(), None)
            .unwrap(),
    );
    let runner = Arc::new(RecordingRunner::new());
    let ctx = Context::new(
        config.settings().clone(),
        "e2e",
        logger,
        runner.clone(),
        Arc::new(FakeProber::new()),
    );

    let mut state = JobState::new("e2e");
    let err = create_standard_pipeline().run(&ctx, &mut state).unwrap_err();

    assert!(matches!(err, PipelineError::ValidationFailed { .. }));
    assert!(!project.exists());
    assert!(runner.calls().is_empty());
}

#[test]
fn clips_sharing_a_stem_are_reported() {
    let project = Project::new(&[("a.mov", 30), ("a.mp4", 30), ("b.mp4", 25)]);
    let runner = Arc::new(RecordingRunner::new());

    let (result, state) = project.run(&runner);
    result.unwrap();

    // Second clip hits the first clip's cache entry
    assert_eq!(transcodes(&runner).len(), 2);
    let outcome = state.transcode.unwrap();
    assert_eq!(outcome.transcoded[0], outcome.transcoded[1]);

    let log = fs::read_to_string(project.root().join(".logs/e2e.log")).unwrap();
    assert!(log.contains("[WARNING] a.mov and a.mp4 share the name stem"));
}
