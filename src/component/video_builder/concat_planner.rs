use super::collaborators::Concatenator;
use super::segment_builder::Segment;
use crate::error::{PipelineError, PipelineResult};
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

pub const MANIFEST_FILE: &str = "concat-list.txt";

/// 寫出 concat 清單並以 stream copy 合併成最終 MP4
pub struct ConcatPlanner<'a> {
    concatenator: &'a dyn Concatenator,
}

impl<'a> ConcatPlanner<'a> {
    pub fn new(concatenator: &'a dyn Concatenator) -> Self {
        Self { concatenator }
    }

    pub fn concat(&self, segments: &[Segment], segment_dir: &Path, output: &Path) -> PipelineResult<()> {
        if segments.is_empty() {
            return Err(PipelineError::Concatenation("沒有任何可合併的片段".to_string()));
        }

        let manifest = write_manifest(segments, segment_dir)?;
        debug!("concat 清單: {} ({} 個片段)", manifest.display(), segments.len());

        self.concatenator.concat(&manifest, output)?;

        if !output.is_file() {
            return Err(PipelineError::Concatenation(format!(
                "沒有產生輸出檔案: {}",
                output.display()
            )));
        }

        info!("已合併 {} 個片段 -> {}", segments.len(), output.display());
        Ok(())
    }
}

/// 依片段順序寫出 `file '<絕對路徑>'` 清單
pub fn write_manifest(segments: &[Segment], segment_dir: &Path) -> PipelineResult<PathBuf> {
    let mut content = String::new();
    for segment in segments {
        let path = std::path::absolute(&segment.output_path)?;
        content.push_str(&manifest_line(&path));
        content.push('\n');
    }

    let manifest = segment_dir.join(MANIFEST_FILE);
    fs::write(&manifest, content)?;
    Ok(manifest)
}

/// concat demuxer 的單引號字串無法跳脫，只能先結束引號再補一個 `\'`
fn manifest_line(path: &Path) -> String {
    let escaped = path.to_string_lossy().replace('\'', r"'\''");
    format!("file '{escaped}'")
}
