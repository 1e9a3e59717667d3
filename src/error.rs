use std::path::PathBuf;

pub type PipelineResult<T> = Result<T, PipelineError>;

/// 影片組裝流程的錯誤分類
///
/// 除了 `DurationProbe` 之外都是致命錯誤：流程立即中止並以結束碼 1 離開。
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("參數錯誤: {0}")]
    Argument(String),

    #[error("找不到資料夾: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("在 {} 中找不到任何 .png、.mp3、.wav 或 .txt 檔案", .0.display())]
    NoMediaFiles(PathBuf),

    #[error("在 {} 中找不到任何 .png 截圖，至少需要一張", .0.display())]
    NoImages(PathBuf),

    #[error("第一個檔案必須是 .png 截圖，目前是: {0}（音訊需要前一張截圖才能顯示）")]
    FirstItemNotImage(String),

    #[error("找不到必要工具 {tool}: {hint}")]
    ToolUnavailable { tool: String, hint: String },

    #[error("語音合成失敗 {}: {message}", .source_file.display())]
    Synthesis {
        source_file: PathBuf,
        message: String,
    },

    #[error("音訊 {} 之前沒有任何截圖可顯示", .0.display())]
    NoPrecedingImage(PathBuf),

    #[error("無法偵測音訊長度: {}", .0.display())]
    DurationProbe(PathBuf),

    #[error("合併 MP4 失敗: {0}")]
    Concatenation(String),

    #[error("建立影片片段失敗 {}: {message}", .path.display())]
    Encoding { path: PathBuf, message: String },

    #[error("產生 GIF 調色盤失敗: {0}")]
    PaletteGeneration(String),

    #[error("建立 GIF 失敗: {0}")]
    GifRender(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    pub fn argument(msg: impl Into<String>) -> Self {
        Self::Argument(msg.into())
    }

    pub fn tool_unavailable(tool: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::ToolUnavailable {
            tool: tool.into(),
            hint: hint.into(),
        }
    }

    pub fn synthesis(source_file: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Synthesis {
            source_file: source_file.into(),
            message: message.into(),
        }
    }

    pub fn encoding(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Encoding {
            path: path.into(),
            message: message.into(),
        }
    }

    /// 工具函式的 `anyhow` 錯誤（檔案系統操作）轉為 `Io`，保留完整脈絡
    pub fn io(err: anyhow::Error) -> Self {
        Self::Io(std::io::Error::other(format!("{err:#}")))
    }

    /// 只有音訊長度偵測失敗可以在本地復原（跳過該項目）
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !matches!(self, Self::DurationProbe(_))
    }
}
