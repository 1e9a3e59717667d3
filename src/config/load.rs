use crate::config::types::Settings;
use crate::error::{PipelineError, PipelineResult};
use anyhow::{Context, Result};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// 目前工作目錄下的設定檔
pub const SETTINGS_FILE: &str = "settings.json";

pub const ENV_KOKORO_DIR: &str = "DEMO_VIDEO_KOKORO_DIR";
pub const ENV_VOICE: &str = "DEMO_VIDEO_VOICE";
pub const ENV_FRAME_DURATION: &str = "DEMO_VIDEO_FRAME_DURATION";
pub const ENV_MAX_THREADS: &str = "DEMO_VIDEO_MAX_THREADS";

impl Settings {
    /// 載入設定：預設值 → settings.json → 環境變數
    pub fn load() -> PipelineResult<Self> {
        let mut settings = Self::load_settings_file(Path::new(SETTINGS_FILE)).unwrap_or_else(|e| {
            warn!("設定檔讀取失敗，改用預設值: {e:#}");
            Self::default()
        });
        settings.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(settings)
    }

    fn load_settings_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;

        debug!("載入設定檔: {}", path.display());
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings from {}", path.display()))
    }

    /// 以環境變數覆寫設定，`lookup` 通常是 `std::env::var`
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> PipelineResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(dir) = get(ENV_KOKORO_DIR) {
            self.kokoro_dir = PathBuf::from(dir);
        }
        if let Some(voice) = get(ENV_VOICE) {
            self.voice = voice.trim().to_string();
        }
        if let Some(raw) = get(ENV_FRAME_DURATION) {
            self.frame_duration = raw.trim().parse().map_err(|_| {
                PipelineError::argument(format!("{ENV_FRAME_DURATION} 不是有效的秒數: {raw}"))
            })?;
        }
        if let Some(raw) = get(ENV_MAX_THREADS) {
            self.max_threads = raw.trim().parse().map_err(|_| {
                PipelineError::argument(format!("{ENV_MAX_THREADS} 不是有效的整數: {raw}"))
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> PipelineResult<()> {
        if !self.frame_duration.is_finite() || self.frame_duration <= 0.0 {
            return Err(PipelineError::argument(format!(
                "截圖顯示秒數必須大於 0: {}",
                self.frame_duration
            )));
        }
        if !self.speech_speed.is_finite() || self.speech_speed <= 0.0 {
            return Err(PipelineError::argument(format!(
                "語速必須大於 0: {}",
                self.speech_speed
            )));
        }
        if self.max_threads == 0 {
            return Err(PipelineError::argument("執行緒數量至少為 1"));
        }
        if self.voice.trim().is_empty() {
            return Err(PipelineError::argument("語音名稱不可為空"));
        }
        Ok(())
    }
}
