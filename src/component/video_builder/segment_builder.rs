use super::collaborators::{DurationProbe, SegmentEncoder};
use crate::error::{PipelineError, PipelineResult};
use crate::tools::{MediaItem, MediaKind, format_seconds};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, warn};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// 一個可獨立播放、編碼參數一致的影片片段
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub index: usize,
    pub held_image: PathBuf,
    /// `None` 表示靜音（單純截圖）
    pub audio: Option<PathBuf>,
    pub duration: f64,
    pub output_path: PathBuf,
}

/// 預期影片總長度，只用於顯示
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DurationAccumulator {
    total: f64,
    image_segments: usize,
    audio_segments: usize,
}

impl DurationAccumulator {
    pub fn add_image(&mut self, frame_duration: f64) {
        self.total += frame_duration;
        self.image_segments += 1;
    }

    pub fn add_audio(&mut self, duration: f64) {
        self.total += duration;
        self.audio_segments += 1;
    }

    #[must_use]
    pub const fn total(&self) -> f64 {
        self.total
    }

    #[must_use]
    pub const fn image_segments(&self) -> usize {
        self.image_segments
    }

    #[must_use]
    pub const fn audio_segments(&self) -> usize {
        self.audio_segments
    }
}

#[derive(Debug, Clone, Default)]
pub struct BuiltSegments {
    pub segments: Vec<Segment>,
    /// 因為偵測不到長度而略過的音訊
    pub skipped: Vec<PathBuf>,
    pub durations: DurationAccumulator,
}

/// fold 狀態：目前畫面上的截圖與已完成的片段
#[derive(Debug, Default)]
struct FoldState {
    last_image: Option<PathBuf>,
    built: BuiltSegments,
}

pub struct SegmentBuilder<'a> {
    encoder: &'a dyn SegmentEncoder,
    probe: &'a dyn DurationProbe,
    segment_dir: &'a Path,
    frame_duration: f64,
}

impl<'a> SegmentBuilder<'a> {
    pub fn new(
        encoder: &'a dyn SegmentEncoder,
        probe: &'a dyn DurationProbe,
        segment_dir: &'a Path,
        frame_duration: f64,
    ) -> Self {
        Self {
            encoder,
            probe,
            segment_dir,
            frame_duration,
        }
    }

    /// 由左至右處理序列，每個項目產生一個片段（長度偵測失敗的音訊除外）
    pub fn build(&self, items: &[MediaItem]) -> PipelineResult<BuiltSegments> {
        let progress_bar = ProgressBar::new(items.len() as u64);
        progress_bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .expect("Invalid progress bar template")
                .progress_chars("#>-"),
        );

        let result = items.iter().try_fold(FoldState::default(), |state, item| -> PipelineResult<FoldState> {
            progress_bar.set_message(item.file_name());
            let state = self.step(state, item, &progress_bar)?;
            progress_bar.inc(1);
            Ok(state)
        });

        progress_bar.finish_and_clear();
        result.map(|state| state.built)
    }

    fn step(
        &self,
        mut state: FoldState,
        item: &MediaItem,
        progress_bar: &ProgressBar,
    ) -> PipelineResult<FoldState> {
        let index = state.built.segments.len();
        let output_path = self.segment_path(index);

        match item.kind {
            MediaKind::Image => {
                self.encoder
                    .build_image_segment(&item.path, self.frame_duration, &output_path)?;
                report_line(progress_bar, &mut io::stdout(), &format!(
                    "  [{}] 截圖, {}s ... {}",
                    item.file_name(),
                    format_seconds(self.frame_duration),
                    style("✓").green()
                ));

                state.last_image = Some(item.path.clone());
                state.built.durations.add_image(self.frame_duration);
                state.built.segments.push(Segment {
                    index,
                    held_image: item.path.clone(),
                    audio: None,
                    duration: self.frame_duration,
                    output_path,
                });
            }
            MediaKind::PrerenderedAudio => {
                let Some(image) = state.last_image.clone() else {
                    return Err(PipelineError::NoPrecedingImage(item.path.clone()));
                };

                let Some(duration) = self.probe.probe_duration(&item.path) else {
                    let err = PipelineError::DurationProbe(item.path.clone());
                    warn!("{err}，略過");
                    report_line(progress_bar, &mut io::stdout(), &format!(
                        "  [{}] {}",
                        item.file_name(),
                        style("無法偵測長度，略過").red()
                    ));
                    state.built.skipped.push(item.path.clone());
                    return Ok(state);
                };

                self.encoder
                    .build_audio_segment(&image, &item.path, &output_path)?;
                report_line(progress_bar, &mut io::stdout(), &format!(
                    "  [{}] 音訊, {duration:.1}s ... {}",
                    item.file_name(),
                    style("✓").green()
                ));

                state.built.durations.add_audio(duration);
                state.built.segments.push(Segment {
                    index,
                    held_image: image,
                    audio: Some(item.path.clone()),
                    duration,
                    output_path,
                });
            }
            MediaKind::Narration => {
                return Err(PipelineError::argument(format!(
                    "旁白尚未轉換為音訊: {}",
                    item.file_name()
                )));
            }
        }

        debug!("片段 {index} 完成: {}", item.path.display());
        Ok(state)
    }

    fn segment_path(&self, index: usize) -> PathBuf {
        self.segment_dir.join(format!("segment-{index:04}.mp4"))
    }
}

/// 暫停進度條後寫出一行；進度條隱藏（非終端機）時照樣輸出
fn report_line(progress_bar: &ProgressBar, out: &mut impl Write, line: &str) {
    progress_bar.suspend(|| {
        let _ = writeln!(out, "{line}");
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    #[derive(Default)]
    struct RecordingEncoder {
        calls: RefCell<Vec<String>>,
    }

    impl SegmentEncoder for RecordingEncoder {
        fn build_image_segment(&self, image: &Path, duration: f64, output: &Path) -> PipelineResult<()> {
            self.calls.borrow_mut().push(format!(
                "image {} {duration} {}",
                image.display(),
                output.display()
            ));
            Ok(())
        }

        fn build_audio_segment(&self, image: &Path, audio: &Path, output: &Path) -> PipelineResult<()> {
            self.calls.borrow_mut().push(format!(
                "audio {} {} {}",
                image.display(),
                audio.display(),
                output.display()
            ));
            Ok(())
        }
    }

    struct FixedProbe(HashMap<PathBuf, f64>);

    impl DurationProbe for FixedProbe {
        fn probe_duration(&self, audio_path: &Path) -> Option<f64> {
            self.0.get(audio_path).copied()
        }
    }

    fn image(name: &str) -> MediaItem {
        MediaItem::new(name, MediaKind::Image)
    }

    fn audio(name: &str) -> MediaItem {
        MediaItem::new(name, MediaKind::PrerenderedAudio)
    }

    #[test]
    fn test_end_to_end_example() {
        let encoder = RecordingEncoder::default();
        let probe = FixedProbe(HashMap::from([(PathBuf::from("002-b.mp3"), 3.5)]));
        let builder = SegmentBuilder::new(&encoder, &probe, Path::new("seg"), 2.0);

        let built = builder
            .build(&[image("001-a.png"), audio("002-b.mp3"), image("003-c.png")])
            .unwrap();

        assert_eq!(
            built.segments,
            vec![
                Segment {
                    index: 0,
                    held_image: "001-a.png".into(),
                    audio: None,
                    duration: 2.0,
                    output_path: "seg/segment-0000.mp4".into(),
                },
                Segment {
                    index: 1,
                    held_image: "001-a.png".into(),
                    audio: Some("002-b.mp3".into()),
                    duration: 3.5,
                    output_path: "seg/segment-0001.mp4".into(),
                },
                Segment {
                    index: 2,
                    held_image: "003-c.png".into(),
                    audio: None,
                    duration: 2.0,
                    output_path: "seg/segment-0002.mp4".into(),
                },
            ]
        );
        assert!((built.durations.total() - 7.5).abs() < 1e-9);
        assert_eq!(built.durations.image_segments(), 2);
        assert_eq!(built.durations.audio_segments(), 1);
        assert_eq!(
            encoder.calls.borrow()[1],
            "audio 001-a.png 002-b.mp3 seg/segment-0001.mp4"
        );
    }

    #[test]
    fn test_unprobeable_audio_is_skipped() {
        let encoder = RecordingEncoder::default();
        let probe = FixedProbe(HashMap::from([(PathBuf::from("004-d.wav"), 1.25)]));
        let builder = SegmentBuilder::new(&encoder, &probe, Path::new("seg"), 2.0);

        let built = builder
            .build(&[
                image("001-a.png"),
                audio("002-broken.mp3"),
                image("003-c.png"),
                audio("004-d.wav"),
            ])
            .unwrap();

        assert_eq!(built.skipped, vec![PathBuf::from("002-broken.mp3")]);
        assert_eq!(built.segments.len(), 3);
        let indices: Vec<usize> = built.segments.iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(built.segments[2].held_image, PathBuf::from("003-c.png"));
        assert!((built.durations.total() - 5.25).abs() < 1e-9);
        assert_eq!(encoder.calls.borrow().len(), 3);
    }

    #[test]
    fn test_audio_without_image_is_fatal() {
        let encoder = RecordingEncoder::default();
        let probe = FixedProbe(HashMap::from([(PathBuf::from("001-a.mp3"), 1.0)]));
        let builder = SegmentBuilder::new(&encoder, &probe, Path::new("seg"), 2.0);

        let err = builder
            .build(&[audio("001-a.mp3"), image("002-b.png")])
            .unwrap_err();

        assert!(matches!(err, PipelineError::NoPrecedingImage(p) if p == Path::new("001-a.mp3")));
        assert!(encoder.calls.borrow().is_empty());
    }

    #[test]
    fn test_unresolved_narration_is_rejected() {
        let encoder = RecordingEncoder::default();
        let probe = FixedProbe(HashMap::new());
        let builder = SegmentBuilder::new(&encoder, &probe, Path::new("seg"), 2.0);

        let result = builder.build(&[
            image("001-a.png"),
            MediaItem::new("002-b.txt", MediaKind::Narration),
        ]);
        assert!(matches!(result, Err(PipelineError::Argument(_))));
    }

    #[test]
    fn test_encoder_failure_stops_the_fold() {
        struct FailingEncoder;

        impl SegmentEncoder for FailingEncoder {
            fn build_image_segment(&self, image: &Path, _: f64, _: &Path) -> PipelineResult<()> {
                Err(PipelineError::encoding(image, "bad png"))
            }

            fn build_audio_segment(&self, _: &Path, _: &Path, _: &Path) -> PipelineResult<()> {
                unreachable!()
            }
        }

        let probe = FixedProbe(HashMap::new());
        let builder = SegmentBuilder::new(&FailingEncoder, &probe, Path::new("seg"), 2.0);
        let err = builder.build(&[image("001-a.png")]).unwrap_err();
        assert!(matches!(err, PipelineError::Encoding { .. }));
    }

    #[test]
    fn test_report_line_written_when_bar_hidden() {
        let progress_bar = ProgressBar::hidden();
        assert!(progress_bar.is_hidden());

        let mut out = Vec::new();
        report_line(&progress_bar, &mut out, "  [002-b.mp3] 無法偵測長度，略過");
        report_line(&progress_bar, &mut out, "  [003-c.png] 截圖, 2s ... ✓");

        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text.lines().collect::<Vec<_>>(),
            vec!["  [002-b.mp3] 無法偵測長度，略過", "  [003-c.png] 截圖, 2s ... ✓"]
        );
    }
}
