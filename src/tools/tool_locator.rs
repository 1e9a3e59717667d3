use crate::error::{PipelineError, PipelineResult};
use log::debug;
use std::path::PathBuf;

const FFMPEG_INSTALL_HINT: &str = "請先安裝 ffmpeg，例如: sudo apt install ffmpeg";

/// 影片流程需要的外部工具位置
#[derive(Debug, Clone)]
pub struct ToolPaths {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

impl ToolPaths {
    /// 在 PATH 中尋找 ffmpeg 與 ffprobe
    pub fn locate() -> PipelineResult<Self> {
        let ffmpeg = locate_tool("ffmpeg", FFMPEG_INSTALL_HINT)?;
        let ffprobe = locate_tool("ffprobe", "ffprobe 通常隨 ffmpeg 一起安裝")?;
        Ok(Self { ffmpeg, ffprobe })
    }
}

pub fn locate_tool(name: &str, hint: &str) -> PipelineResult<PathBuf> {
    let path = which::which(name).map_err(|_| PipelineError::tool_unavailable(name, hint))?;
    debug!("找到 {name}: {}", path.display());
    Ok(path)
}
