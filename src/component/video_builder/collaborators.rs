//! 外部協作者介面
//!
//! 核心流程只依賴這些窄介面；實際實作（ffmpeg、Kokoro）與測試用的假實作
//! 都透過它們接上。所有呼叫都是同步阻塞的。

use crate::error::PipelineResult;
use std::path::{Path, PathBuf};

/// 文字轉語音
pub trait Synthesizer {
    /// 確認合成引擎的執行環境存在，否則回傳 `ToolUnavailable`
    fn ensure_ready(&self) -> PipelineResult<()>;

    /// 把 `text_path` 的內容合成為 `output_path`（覆寫既有檔案）
    fn synthesize(&self, text_path: &Path, output_path: &Path, voice: &str) -> PipelineResult<()>;
}

/// 音訊長度偵測，無法取得時回傳 `None`
pub trait DurationProbe {
    fn probe_duration(&self, audio_path: &Path) -> Option<f64>;
}

/// 片段編碼；兩種片段必須使用完全相同的編碼參數
pub trait SegmentEncoder {
    fn build_image_segment(&self, image: &Path, duration: f64, output: &Path) -> PipelineResult<()>;

    fn build_audio_segment(&self, image: &Path, audio: &Path, output: &Path) -> PipelineResult<()>;
}

/// 以 stream copy 串接片段清單
pub trait Concatenator {
    fn concat(&self, manifest: &Path, output: &Path) -> PipelineResult<()>;
}

/// 依序編號的 GIF 影格（`frame-00001.png` 起算）
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSequence {
    /// printf 風格的檔名樣式，例如 `/tmp/x/frame-%05d.png`
    pub pattern: PathBuf,
    pub count: usize,
    /// 每一格顯示的秒數
    pub frame_duration: f64,
}

/// 調色盤與 GIF 產生
pub trait GifEncoder {
    fn generate_palette(&self, frames: &FrameSequence, palette: &Path) -> PipelineResult<()>;

    fn render_gif(&self, frames: &FrameSequence, palette: &Path, output: &Path) -> PipelineResult<()>;
}
