//! 整合測試 - 以假的協作者跑完整個組裝流程
//!
//! 不需要 ffmpeg 或 Kokoro，所有外部呼叫都被記錄下來驗證

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use demo_video_builder::component::video_builder::{
    Collaborators, Concatenator, DurationProbe, FrameSequence, GifEncoder, ProjectLayout,
    SegmentEncoder, Synthesizer, VideoBuilder, cache_path_for,
};
use demo_video_builder::config::Settings;
use demo_video_builder::error::{PipelineError, PipelineResult};
use filetime::{FileTime, set_file_mtime};
use tempfile::TempDir;

#[derive(Default)]
struct FakeStudio {
    /// 依檔名回傳的音訊長度，沒有登記的檔案視為無法偵測
    durations: HashMap<String, f64>,
    fail_gif: bool,
    synthesized: RefCell<Vec<PathBuf>>,
    encoded: RefCell<Vec<String>>,
    manifest: RefCell<Option<String>>,
    gif_frames: RefCell<Vec<usize>>,
}

impl FakeStudio {
    fn with_durations(durations: &[(&str, f64)]) -> Self {
        Self {
            durations: durations
                .iter()
                .map(|(name, secs)| ((*name).to_string(), *secs))
                .collect(),
            ..Self::default()
        }
    }

    fn collaborators(&self) -> Collaborators<'_> {
        Collaborators {
            synthesizer: self,
            probe: self,
            encoder: self,
            concatenator: self,
            gif_encoder: self,
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name().unwrap().to_string_lossy().to_string()
}

impl Synthesizer for FakeStudio {
    fn ensure_ready(&self) -> PipelineResult<()> {
        Ok(())
    }

    fn synthesize(&self, text_path: &Path, output_path: &Path, _voice: &str) -> PipelineResult<()> {
        self.synthesized.borrow_mut().push(text_path.to_path_buf());
        fs::create_dir_all(output_path.parent().unwrap()).unwrap();
        fs::write(output_path, b"RIFF").unwrap();
        Ok(())
    }
}

impl DurationProbe for FakeStudio {
    fn probe_duration(&self, audio_path: &Path) -> Option<f64> {
        self.durations.get(&file_name(audio_path)).copied()
    }
}

impl SegmentEncoder for FakeStudio {
    fn build_image_segment(&self, image: &Path, duration: f64, output: &Path) -> PipelineResult<()> {
        self.encoded
            .borrow_mut()
            .push(format!("{} silent {duration}", file_name(image)));
        fs::write(output, b"segment").unwrap();
        Ok(())
    }

    fn build_audio_segment(&self, image: &Path, audio: &Path, output: &Path) -> PipelineResult<()> {
        self.encoded
            .borrow_mut()
            .push(format!("{} holding {}", file_name(audio), file_name(image)));
        fs::write(output, b"segment").unwrap();
        Ok(())
    }
}

impl Concatenator for FakeStudio {
    fn concat(&self, manifest: &Path, output: &Path) -> PipelineResult<()> {
        *self.manifest.borrow_mut() = Some(fs::read_to_string(manifest).unwrap());
        fs::write(output, b"mp4").unwrap();
        Ok(())
    }
}

impl GifEncoder for FakeStudio {
    fn generate_palette(&self, frames: &FrameSequence, palette: &Path) -> PipelineResult<()> {
        let staged = fs::read_dir(frames.pattern.parent().unwrap()).unwrap().count();
        assert_eq!(staged, frames.count, "暫存影格數量應該等於截圖數量");
        self.gif_frames.borrow_mut().push(frames.count);
        fs::write(palette, b"palette").unwrap();
        Ok(())
    }

    fn render_gif(&self, _frames: &FrameSequence, _palette: &Path, output: &Path) -> PipelineResult<()> {
        if self.fail_gif {
            return Err(PipelineError::GifRender("fake failure".to_string()));
        }
        fs::write(output, b"GIF89a").unwrap();
        Ok(())
    }
}

/// 在暫存目錄建立 `<base>/screenshots/<sub>/` 與指定檔案
fn project(files: &[&str]) -> (TempDir, ProjectLayout) {
    let temp_dir = TempDir::new().unwrap();
    let layout = ProjectLayout::new(temp_dir.path(), "demo").unwrap();
    let dir = layout.screenshot_dir();
    fs::create_dir_all(&dir).unwrap();
    for name in files {
        fs::write(dir.join(name), b"content").unwrap();
    }
    (temp_dir, layout)
}

/// 測試 1: 三個檔案的完整範例
#[test]
fn test_end_to_end_example() {
    let (_temp_dir, layout) = project(&["001-a.png", "002-b.mp3", "003-c.png"]);
    let studio = FakeStudio::with_durations(&[("002-b.mp3", 3.5)]);
    let settings = Settings::default();

    let summary = VideoBuilder::new(&settings, studio.collaborators())
        .run(&layout)
        .unwrap();

    assert_eq!(summary.segment_count, 3);
    assert!((summary.total_duration - 7.5).abs() < 1e-9);
    assert_eq!(
        *studio.encoded.borrow(),
        vec![
            "001-a.png silent 2",
            "002-b.mp3 holding 001-a.png",
            "003-c.png silent 2",
        ]
    );

    let manifest = studio.manifest.borrow().clone().unwrap();
    let entries: Vec<&str> = manifest.lines().collect();
    assert_eq!(entries.len(), 3);
    assert!(entries[0].ends_with("segment-0000.mp4'"));
    assert!(entries[2].ends_with("segment-0002.mp4'"));

    assert!(layout.mp4_path().is_file());
    assert!(layout.gif_path().is_file());
    assert!(!layout.segment_dir().exists(), "暫存片段應該被移除");
    assert!(!layout.palette_path().exists(), "調色盤應該被移除");
    assert!(!layout.gif_frames_dir().exists());
}

/// 測試 2: 旁白第一次合成，第二次直接使用快取
#[test]
fn test_narration_round_trip() {
    let (_temp_dir, layout) = project(&["001-a.png", "002-hello.txt"]);
    let source = layout.screenshot_dir().join("002-hello.txt");
    set_file_mtime(&source, FileTime::from_unix_time(1_000_000, 0)).unwrap();
    let settings = Settings::default();

    let studio = FakeStudio::with_durations(&[("002-hello.wav", 1.5)]);
    let first = VideoBuilder::new(&settings, studio.collaborators())
        .run(&layout)
        .unwrap();

    assert_eq!(*studio.synthesized.borrow(), vec![source.clone()]);
    assert!(cache_path_for(&source).is_file());
    assert_eq!(first.synthesized, 1);
    assert_eq!(
        studio.encoded.borrow()[1],
        "002-hello.wav holding 001-a.png",
        "合成後的旁白與預錄音訊走同一條路"
    );

    let studio = FakeStudio::with_durations(&[("002-hello.wav", 1.5)]);
    let second = VideoBuilder::new(&settings, studio.collaborators())
        .run(&layout)
        .unwrap();

    assert!(studio.synthesized.borrow().is_empty(), "快取有效時不應重新合成");
    assert_eq!(second.cache_hits, 1);
    assert_eq!(second.segment_count, 2);
}

/// 測試 3: GIF 只使用主資料夾的截圖
#[test]
fn test_gif_uses_only_main_images() {
    let (_temp_dir, layout) = project(&[
        "001-a.png",
        "002-b.mp3",
        "003-c.txt",
        "004-d.png",
        "005-e.wav",
    ]);
    let intro_dir = layout.intro_dir();
    fs::create_dir_all(&intro_dir).unwrap();
    fs::write(intro_dir.join("001-logo.png"), b"logo").unwrap();

    let studio = FakeStudio::with_durations(&[
        ("002-b.mp3", 1.0),
        ("003-c.wav", 2.0),
        ("005-e.wav", 3.0),
    ]);
    let settings = Settings::default();

    let summary = VideoBuilder::new(&settings, studio.collaborators())
        .run(&layout)
        .unwrap();

    assert_eq!(*studio.gif_frames.borrow(), vec![2]);
    assert_eq!(summary.segment_count, 6, "片頭截圖只出現在 MP4");
    assert_eq!(studio.encoded.borrow()[0], "001-logo.png silent 2");
}

/// 測試 4: 第一個檔案不是截圖時，不建立任何片段
#[test]
fn test_first_item_must_be_image() {
    let (_temp_dir, layout) = project(&["001-intro.mp3", "002-a.png"]);
    let studio = FakeStudio::with_durations(&[("001-intro.mp3", 1.0)]);
    let settings = Settings::default();

    let err = VideoBuilder::new(&settings, studio.collaborators())
        .run(&layout)
        .unwrap_err();

    assert!(matches!(err, PipelineError::FirstItemNotImage(name) if name == "001-intro.mp3"));
    assert!(studio.encoded.borrow().is_empty());
    assert!(!layout.mp4_path().exists());
}

/// 測試 5: 偵測不到長度的音訊被略過，流程繼續
#[test]
fn test_unprobeable_audio_is_skipped() {
    let (_temp_dir, layout) = project(&["001-a.png", "002-broken.mp3", "003-c.png"]);
    let studio = FakeStudio::default();
    let settings = Settings::default();

    let summary = VideoBuilder::new(&settings, studio.collaborators())
        .run(&layout)
        .unwrap();

    assert_eq!(summary.segment_count, 2);
    assert_eq!(summary.skipped_audio.len(), 1);
    assert!((summary.total_duration - 4.0).abs() < 1e-9);
    assert_eq!(studio.manifest.borrow().as_ref().unwrap().lines().count(), 2);
}

/// 測試 6: GIF 失敗時不留下任何輸出
#[test]
fn test_failed_run_leaves_no_output() {
    let (_temp_dir, layout) = project(&["001-a.png"]);
    fs::create_dir_all(layout.output_dir()).unwrap();
    fs::write(layout.gif_path(), b"old gif").unwrap();

    let studio = FakeStudio {
        fail_gif: true,
        ..FakeStudio::default()
    };
    let settings = Settings::default();

    let err = VideoBuilder::new(&settings, studio.collaborators())
        .run(&layout)
        .unwrap_err();

    assert!(matches!(err, PipelineError::GifRender(_)));
    assert!(err.is_fatal());
    assert!(!layout.mp4_path().exists());
    assert!(!layout.gif_path().exists());
    assert!(!layout.segment_dir().exists());
    assert!(!layout.palette_path().exists());
}

/// 測試 7: 資料夾不存在
#[test]
fn test_missing_screenshot_directory() {
    let temp_dir = TempDir::new().unwrap();
    let layout = ProjectLayout::new(temp_dir.path(), "nope").unwrap();
    let studio = FakeStudio::default();
    let settings = Settings::default();

    let err = VideoBuilder::new(&settings, studio.collaborators())
        .run(&layout)
        .unwrap_err();

    assert!(matches!(err, PipelineError::DirectoryNotFound(p) if p == layout.screenshot_dir()));
}

/// 測試 8: 開啟順序檢查時，數字前綴倒退視為參數錯誤
#[test]
fn test_strict_order_rejects_unordered_prefixes() {
    let (_temp_dir, layout) = project(&["10-a.png", "9-b.png"]);
    let studio = FakeStudio::default();
    let settings = Settings {
        strict_order: true,
        ..Settings::default()
    };

    let err = VideoBuilder::new(&settings, studio.collaborators())
        .run(&layout)
        .unwrap_err();

    assert!(matches!(err, PipelineError::Argument(_)));
    assert!(studio.encoded.borrow().is_empty());

    let relaxed = Settings::default();
    assert!(VideoBuilder::new(&relaxed, studio.collaborators()).run(&layout).is_ok());
}
