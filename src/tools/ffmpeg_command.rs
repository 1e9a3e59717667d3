use anyhow::{Context, Result, bail};
use log::debug;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

/// 影像統一縮放為偶數寬高並轉為 yuv420p，確保所有片段可以無損串接
pub const VIDEO_FILTER: &str = "scale=trunc(iw/2)*2:trunc(ih/2)*2,format=yuv420p";
pub const AUDIO_SAMPLE_RATE: u32 = 44_100;
const SILENT_AUDIO_SOURCE: &str = "anullsrc=r=44100:cl=stereo";

/// stderr 只保留最後幾行放進錯誤訊息
const STDERR_TAIL_LINES: usize = 8;

/// ffmpeg 命令建構器
///
/// 所有片段共用相同的編碼參數（libx264 / yuv420p / AAC 44.1kHz 立體聲），
/// 這是最後以 `-c copy` 串接的前提。
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    program: PathBuf,
    thread_cap: Option<usize>,
    args: Vec<OsString>,
    output_path: PathBuf,
}

impl FfmpegCommand {
    fn new(program: &Path, output_path: &Path) -> Self {
        Self {
            program: program.to_path_buf(),
            thread_cap: None,
            args: Vec::new(),
            output_path: output_path.to_path_buf(),
        }
    }

    fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    fn video_encoding(self) -> Self {
        self.args([
            "-c:v", "libx264",
            "-preset", "slow",
            "-crf", "18",
            "-vf", VIDEO_FILTER,
        ])
    }

    fn audio_encoding(self) -> Self {
        self.arg("-ar")
            .arg(AUDIO_SAMPLE_RATE.to_string())
            .args([
                "-ac", "2",
                "-c:a", "aac",
                "-b:a", "128k",
            ])
    }

    /// 靜態截圖 + 靜音音軌，長度固定為 `duration` 秒
    #[must_use]
    pub fn image_segment(program: &Path, image: &Path, duration: f64, output: &Path) -> Self {
        Self::new(program, output)
            .args(["-loop", "1", "-i"])
            .arg(image)
            .args(["-f", "lavfi", "-i", SILENT_AUDIO_SOURCE])
            .arg("-t")
            .arg(format_seconds(duration))
            .video_encoding()
            .audio_encoding()
            .arg("-shortest")
            .arg(output)
    }

    /// 在音訊播放期間持續顯示 `image`，長度由音訊決定
    #[must_use]
    pub fn audio_segment(program: &Path, image: &Path, audio: &Path, output: &Path) -> Self {
        Self::new(program, output)
            .args(["-loop", "1", "-i"])
            .arg(image)
            .arg("-i")
            .arg(audio)
            .video_encoding()
            .audio_encoding()
            .arg("-shortest")
            .arg(output)
    }

    /// 以 concat demuxer 串接片段，不重新編碼
    #[must_use]
    pub fn concat(program: &Path, manifest: &Path, output: &Path) -> Self {
        Self::new(program, output)
            .args(["-f", "concat", "-safe", "0", "-i"])
            .arg(manifest)
            .args(["-c", "copy", "-movflags", "+faststart"])
            .arg(output)
    }

    /// 由整組截圖產生共用調色盤
    #[must_use]
    pub fn palette(program: &Path, frame_pattern: &Path, frame_duration: f64, palette: &Path) -> Self {
        Self::new(program, palette)
            .arg("-framerate")
            .arg(frame_rate(frame_duration))
            .args(["-start_number", "1", "-i"])
            .arg(frame_pattern)
            .args(["-vf", "palettegen", "-update", "1"])
            .arg(palette)
    }

    /// 使用調色盤把截圖序列轉為 GIF
    #[must_use]
    pub fn gif(
        program: &Path,
        frame_pattern: &Path,
        frame_duration: f64,
        palette: &Path,
        output: &Path,
    ) -> Self {
        Self::new(program, output)
            .arg("-framerate")
            .arg(frame_rate(frame_duration))
            .args(["-start_number", "1", "-i"])
            .arg(frame_pattern)
            .arg("-i")
            .arg(palette)
            .args(["-lavfi", "paletteuse"])
            .arg(output)
    }

    /// 限制 ffmpeg 使用的執行緒數量，`None` 表示不限制
    #[must_use]
    pub fn with_thread_cap(mut self, thread_cap: Option<usize>) -> Self {
        self.thread_cap = thread_cap;
        self
    }

    /// 完整參數列表（`-threads` 必須在所有輸入之前才會全域生效）
    #[must_use]
    pub fn full_args(&self) -> Vec<OsString> {
        let mut full: Vec<OsString> = ["-hide_banner", "-nostdin", "-loglevel", "error", "-y"]
            .into_iter()
            .map(OsString::from)
            .collect();
        if let Some(threads) = self.thread_cap {
            full.push("-threads".into());
            full.push(threads.to_string().into());
        }
        full.extend(self.args.iter().cloned());
        full
    }

    #[must_use]
    pub fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.full_args());
        cmd
    }

    /// 同步執行並確認輸出檔案存在
    pub fn execute(&self) -> Result<()> {
        debug!("執行 ffmpeg -> {}", self.output_path.display());

        let output = self
            .build_command()
            .output()
            .with_context(|| format!("無法執行 ffmpeg: {}", self.program.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("ffmpeg 執行失敗 ({}): {}", output.status, stderr_tail(&stderr));
        }

        if !self.output_path.exists() {
            bail!("ffmpeg 未產生輸出檔案: {}", self.output_path.display());
        }

        Ok(())
    }
}

/// 秒數轉字串（`2.0` → `2`，`3.5` → `3.5`）
#[must_use]
pub fn format_seconds(seconds: f64) -> String {
    format!("{seconds}")
}

/// 每 `frame_duration` 秒一格的輸入幀率
fn frame_rate(frame_duration: f64) -> String {
    format!("1/{}", format_seconds(frame_duration))
}

fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.trim().lines().collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join("\n")
}
