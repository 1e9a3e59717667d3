use super::collaborators::Synthesizer;
use crate::config::Settings;
use crate::error::{PipelineError, PipelineResult};
use crate::tools::{ThreadBudget, ensure_directory_exists, locate_tool};
use log::{debug, info};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

const KOKORO_INSTALL_HINT: &str = "旁白 .txt 需要 Kokoro TTS，請先執行安裝腳本建立 Kokoro 環境";

/// 限制數值運算函式庫的執行緒，必須在引擎載入前設定
const THREAD_ENV_VARS: [&str; 3] = ["OMP_NUM_THREADS", "MKL_NUM_THREADS", "OPENBLAS_NUM_THREADS"];

/// Kokoro TTS 語音合成
///
/// 以子程序執行 `<kokoro_dir>/<script> input.txt output.wav --voice V --speed S`，
/// 優先使用專案內的 `.venv`，否則退回 PATH 上的 `python3`。
#[derive(Debug, Clone)]
pub struct KokoroSynthesizer {
    project_dir: PathBuf,
    script: PathBuf,
    speed: f64,
    threads: ThreadBudget,
}

impl KokoroSynthesizer {
    #[must_use]
    pub fn new(settings: &Settings, threads: ThreadBudget) -> Self {
        Self {
            project_dir: settings.kokoro_dir.clone(),
            script: settings.kokoro_dir.join(&settings.kokoro_script),
            speed: settings.speech_speed,
            threads,
        }
    }

    fn interpreter(&self) -> PipelineResult<PathBuf> {
        let venv_python = self.project_dir.join(".venv").join("bin").join("python");
        if venv_python.is_file() {
            return Ok(venv_python);
        }
        locate_tool("python3", KOKORO_INSTALL_HINT)
    }

    fn build_command(&self, interpreter: &Path, text_path: &Path, output_path: &Path, voice: &str) -> Command {
        let mut cmd = Command::new(interpreter);
        cmd.arg(&self.script)
            .arg(text_path)
            .arg(output_path)
            .arg("--voice")
            .arg(voice)
            .arg("--speed")
            .arg(self.speed.to_string())
            .env("HF_HUB_OFFLINE", "1");

        for (key, value) in self.thread_env(|key| std::env::var_os(key)) {
            cmd.env(key, value);
        }
        cmd
    }

    /// 呼叫端已經設定的執行緒變數保持不變
    fn thread_env<F>(&self, existing: F) -> Vec<(&'static str, String)>
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let Some(threads) = self.threads.cap() else {
            return Vec::new();
        };
        THREAD_ENV_VARS
            .into_iter()
            .filter(|key| existing(*key).is_none())
            .map(|key| (key, threads.to_string()))
            .collect()
    }
}

impl Synthesizer for KokoroSynthesizer {
    fn ensure_ready(&self) -> PipelineResult<()> {
        if !self.project_dir.is_dir() {
            return Err(PipelineError::tool_unavailable(
                format!("Kokoro ({})", self.project_dir.display()),
                KOKORO_INSTALL_HINT,
            ));
        }
        if !self.script.is_file() {
            return Err(PipelineError::tool_unavailable(
                self.script.display().to_string(),
                KOKORO_INSTALL_HINT,
            ));
        }
        let interpreter = self.interpreter()?;
        debug!("Kokoro 執行環境: {}", interpreter.display());
        Ok(())
    }

    fn synthesize(&self, text_path: &Path, output_path: &Path, voice: &str) -> PipelineResult<()> {
        let text = fs::read_to_string(text_path)
            .map_err(|e| PipelineError::synthesis(text_path, format!("無法讀取旁白: {e}")))?;
        if text.trim().is_empty() {
            return Err(PipelineError::synthesis(text_path, "旁白檔案是空的"));
        }

        if let Some(parent) = output_path.parent() {
            ensure_directory_exists(parent)
                .map_err(|e| PipelineError::synthesis(text_path, format!("{e:#}")))?;
        }

        let interpreter = self.interpreter()?;
        info!("Kokoro 合成 {} -> {}", text_path.display(), output_path.display());

        let output = self
            .build_command(&interpreter, text_path, output_path, voice)
            .output()
            .map_err(|e| PipelineError::synthesis(text_path, format!("無法執行 Kokoro: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PipelineError::synthesis(text_path, stderr.trim().to_string()));
        }

        if !output_path.is_file() {
            return Err(PipelineError::synthesis(text_path, "沒有產生任何音訊"));
        }

        Ok(())
    }
}
