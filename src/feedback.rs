use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::analysis::{Event, EventKind};

/// 動画ファイル名に付けるフィードバックログの接尾辞
pub const FEEDBACK_SUFFIX: &str = "_feedback.csv";

pub const HEADER: [&str; 3] = ["Time (s)", "Event", "Feedback"];

/// フィードバックログの1行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRow {
    #[serde(rename = "Time (s)")]
    pub time: f64,
    #[serde(rename = "Event")]
    pub kind: EventKind,
    #[serde(rename = "Feedback")]
    pub feedback: String,
}

/// `<dir>/<stem>.mp4` → `<dir>/<stem>_feedback.csv`
pub fn feedback_path_for(video: &Path) -> PathBuf {
    let stem = video
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    video.with_file_name(format!("{stem}{FEEDBACK_SUFFIX}"))
}

/// 前回の実行で残った動画とフィードバックログを両方消す。無いものは無視する
pub fn clear_previous_artifacts(video: &Path) -> Result<()> {
    for path in [video.to_path_buf(), feedback_path_for(video)] {
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e).with_context(|| format!("Failed to remove previous {}", path.display())),
        }
    }
    Ok(())
}

/// イベントを時系列順にCSVへ書き出す（既存ファイルは置き換え）
///
/// 一旦 `<path>.partial` に書いてからリネームするので、失敗しても中途半端なログは残らない。
pub fn write_feedback_log(path: &Path, events: &[Event]) -> Result<()> {
    let partial = partial_path(path);
    let written = write_rows(&partial, events)
        .and_then(|()| {
            fs::rename(&partial, path)
                .with_context(|| format!("Failed to move {} into place", partial.display()))
        });

    if written.is_err() && partial.exists() {
        let _ = fs::remove_file(&partial);
    }
    written
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".partial");
    PathBuf::from(name)
}

fn write_rows(path: &Path, events: &[Event]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    writer.write_record(HEADER)?;
    for event in events {
        writer.write_record([
            format!("{:.2}", event.timestamp),
            event.kind.to_string(),
            event.message.clone(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn read_feedback_log(path: &Path) -> Result<Vec<FeedbackRow>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let headers = reader.headers()?.clone();
    if headers.iter().ne(HEADER) {
        anyhow::bail!("{} is not a feedback log (header {:?})", path.display(), headers);
    }

    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row.with_context(|| format!("Malformed row in {}", path.display()))?);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn events() -> Vec<Event> {
        vec![
            Event::new(
                1.5,
                EventKind::Jump,
                "At 1.50s, you jumped 20px. Try jumping at least 10px higher.",
            ),
            Event::new(
                1.6,
                EventKind::Spike,
                "At 1.60s, during your spike, your left elbow angle was 172°. Try to keep it below 130°.",
            ),
        ]
    }

    #[test]
    fn test_feedback_path() {
        assert_eq!(
            feedback_path_for(Path::new("/videos/serve.mp4")),
            PathBuf::from("/videos/serve_feedback.csv")
        );
        assert_eq!(
            feedback_path_for(Path::new("clip.v2.mp4")),
            PathBuf::from("clip.v2_feedback.csv")
        );
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("serve_feedback.csv");

        write_feedback_log(&path, &events()).unwrap();
        let rows = read_feedback_log(&path).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].time, 1.5);
        assert_eq!(rows[0].kind, EventKind::Jump);
        assert_eq!(rows[0].feedback, events()[0].message);
        assert_eq!(rows[1].kind, EventKind::Spike);
        assert_eq!(rows[1].feedback, events()[1].message);
    }

    #[test]
    fn test_exact_file_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.csv");
        write_feedback_log(&path, &events()[..1]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        // メッセージはカンマを含むので引用符で囲まれる
        assert_eq!(
            content,
            "Time (s),Event,Feedback\n1.50,Jump,\"At 1.50s, you jumped 20px. Try jumping at least 10px higher.\"\n"
        );
    }

    #[test]
    fn test_empty_log_has_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        write_feedback_log(&path, &[]).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "Time (s),Event,Feedback\n");
        assert!(read_feedback_log(&path).unwrap().is_empty());
    }

    #[test]
    fn test_overwrites_existing_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.csv");
        write_feedback_log(&path, &events()).unwrap();
        write_feedback_log(&path, &events()[..1]).unwrap();

        assert_eq!(read_feedback_log(&path).unwrap().len(), 1);
        assert!(!partial_path(&path).exists());
    }

    #[test]
    fn test_unwritable_location_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("log.csv");
        assert!(write_feedback_log(&path, &events()).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_clear_previous_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("serve.mp4");
        let log = feedback_path_for(&video);
        fs::write(&video, b"old video").unwrap();
        write_feedback_log(&log, &events()).unwrap();
        let other = dir.path().join("other_feedback.csv");
        write_feedback_log(&other, &events()).unwrap();

        clear_previous_artifacts(&video).unwrap();

        assert!(!video.exists());
        assert!(!log.exists());
        assert!(other.exists());
    }

    #[test]
    fn test_clear_previous_artifacts_with_only_stale_log() {
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("serve.mp4");
        write_feedback_log(&feedback_path_for(&video), &events()).unwrap();

        clear_previous_artifacts(&video).unwrap();
        assert!(!feedback_path_for(&video).exists());

        // 何も無ければ何もしない
        clear_previous_artifacts(&video).unwrap();
    }

    #[test]
    fn test_clear_previous_artifacts_reports_unremovable() {
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("serve.mp4");
        // ディレクトリは remove_file で消せない
        fs::create_dir(feedback_path_for(&video)).unwrap();

        assert!(clear_previous_artifacts(&video).is_err());
    }

    #[test]
    fn test_rejects_foreign_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("other.csv");
        fs::write(&path, "a,b,c\n1,2,3\n").unwrap();
        assert!(read_feedback_log(&path).is_err());
    }
}
