use crate::config::{INTRO_DIR, OUTPUT_DIR, SCREENSHOTS_DIR};
use crate::error::{PipelineError, PipelineResult};
use std::path::PathBuf;

/// 一次執行用到的所有路徑
///
/// ```text
/// <base>/screenshots/<sub>/            輸入
/// <base>/screenshots/intro/            片頭（可選）
/// <base>/test-videos/<sub>.mp4|.gif    輸出
/// <base>/test-videos/<sub>-segments/   暫存片段
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    base: PathBuf,
    subfolder: String,
}

impl ProjectLayout {
    pub fn new(base: impl Into<PathBuf>, subfolder: &str) -> PipelineResult<Self> {
        let base = base.into();
        if base.as_os_str().is_empty() {
            return Err(PipelineError::argument("未指定基礎資料夾"));
        }

        let subfolder = subfolder.trim();
        if subfolder.is_empty() {
            return Err(PipelineError::argument("未指定子資料夾名稱"));
        }
        if subfolder.contains(['/', '\\']) {
            return Err(PipelineError::argument(format!(
                "子資料夾名稱不可包含路徑分隔符: {subfolder}"
            )));
        }

        Ok(Self {
            base,
            subfolder: subfolder.to_string(),
        })
    }

    #[must_use]
    pub fn subfolder(&self) -> &str {
        &self.subfolder
    }

    #[must_use]
    pub fn screenshot_dir(&self) -> PathBuf {
        self.base.join(SCREENSHOTS_DIR).join(&self.subfolder)
    }

    #[must_use]
    pub fn intro_dir(&self) -> PathBuf {
        self.base.join(SCREENSHOTS_DIR).join(INTRO_DIR)
    }

    #[must_use]
    pub fn output_dir(&self) -> PathBuf {
        self.base.join(OUTPUT_DIR)
    }

    #[must_use]
    pub fn mp4_path(&self) -> PathBuf {
        self.output_file(&format!("{}.mp4", self.subfolder))
    }

    #[must_use]
    pub fn gif_path(&self) -> PathBuf {
        self.output_file(&format!("{}.gif", self.subfolder))
    }

    #[must_use]
    pub fn palette_path(&self) -> PathBuf {
        self.output_file(&format!("{}-palette.png", self.subfolder))
    }

    #[must_use]
    pub fn segment_dir(&self) -> PathBuf {
        self.output_file(&format!("{}-segments", self.subfolder))
    }

    #[must_use]
    pub fn gif_frames_dir(&self) -> PathBuf {
        self.output_file(&format!("{}-gif-frames", self.subfolder))
    }

    fn output_file(&self, name: &str) -> PathBuf {
        self.output_dir().join(name)
    }
}
