use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::Path;
use std::process::Command;

#[derive(Deserialize)]
struct FfprobeOutput {
    format: Option<FormatInfo>,
}

#[derive(Deserialize)]
struct FormatInfo {
    duration: Option<String>,
}

/// 使用 ffprobe 取得音訊長度（秒）
///
/// ffprobe 無法回報長度（空值、`N/A`）時回傳 `Ok(None)`，
/// 只有 ffprobe 本身無法執行或失敗時才回傳錯誤。
pub fn get_audio_duration(ffprobe: &Path, path: &Path) -> Result<Option<f64>> {
    let output = Command::new(ffprobe)
        .args(["-v", "error", "-print_format", "json", "-show_format"])
        .arg(path)
        .output()
        .with_context(|| format!("無法執行 ffprobe: {}", path.display()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("ffprobe 執行失敗: {}", stderr.trim());
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_probe_output(&stdout)
}

fn parse_probe_output(stdout: &str) -> Result<Option<f64>> {
    let probe: FfprobeOutput =
        serde_json::from_str(stdout).with_context(|| "無法解析 ffprobe 輸出")?;

    Ok(probe
        .format
        .and_then(|f| f.duration)
        .as_deref()
        .and_then(parse_duration))
}

/// 解析長度字串，`N/A`、非數字、非正值都視為無法取得
fn parse_duration(raw: &str) -> Option<f64> {
    let value: f64 = raw.trim().parse().ok()?;
    (value.is_finite() && value > 0.0).then_some(value)
}
