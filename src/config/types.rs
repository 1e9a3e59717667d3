use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 截圖根目錄名稱（位於 base folder 之下）
pub const SCREENSHOTS_DIR: &str = "screenshots";
/// 輸出目錄名稱（位於 base folder 之下）
pub const OUTPUT_DIR: &str = "test-videos";
/// 與主資料夾同層的片頭資料夾
pub const INTRO_DIR: &str = "intro";
/// 旁白語音快取資料夾，掃描輸入時一律排除
pub const NARRATION_CACHE_DIR: &str = "generated-wav";

pub const DEFAULT_FRAME_DURATION: f64 = 2.0;
pub const DEFAULT_VOICE: &str = "bm_daniel";
pub const DEFAULT_MAX_THREADS: usize = 4;
pub const DEFAULT_KOKORO_SCRIPT: &str = "kokoro-generate.py";

/// 使用者設定
///
/// 每個欄位都可省略，缺少的欄位使用預設值。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// 沒有音訊的截圖顯示秒數
    pub frame_duration: f64,
    /// Kokoro 語音名稱
    pub voice: String,
    pub speech_speed: f64,
    /// Kokoro 專案位置（含 `.venv` 與產生腳本）
    pub kokoro_dir: PathBuf,
    pub kokoro_script: String,
    /// 非高效能模式下 ffmpeg 與語音合成可使用的最大執行緒數
    pub max_threads: usize,
    /// 開啟後不限制執行緒數量（風扇會比較吵）
    pub high_performance: bool,
    /// 要求檔名帶有遞增的數字前綴
    pub strict_order: bool,
    /// 是否把 intro/ 資料夾的檔案加在 MP4 前面
    pub use_intro: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            frame_duration: DEFAULT_FRAME_DURATION,
            voice: DEFAULT_VOICE.to_string(),
            speech_speed: 1.0,
            kokoro_dir: PathBuf::from("kokoro"),
            kokoro_script: DEFAULT_KOKORO_SCRIPT.to_string(),
            max_threads: DEFAULT_MAX_THREADS,
            high_performance: false,
            strict_order: false,
            use_intro: true,
        }
    }
}
