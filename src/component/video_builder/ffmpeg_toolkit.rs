use super::collaborators::{Concatenator, DurationProbe, FrameSequence, GifEncoder, SegmentEncoder};
use crate::error::{PipelineError, PipelineResult};
use crate::tools::{FfmpegCommand, ThreadBudget, ToolPaths, get_audio_duration};
use log::warn;
use std::path::Path;

/// 以 ffmpeg / ffprobe 實作所有影音協作者
#[derive(Debug, Clone)]
pub struct FfmpegToolkit {
    tools: ToolPaths,
    threads: ThreadBudget,
}

impl FfmpegToolkit {
    #[must_use]
    pub const fn new(tools: ToolPaths, threads: ThreadBudget) -> Self {
        Self { tools, threads }
    }

    fn capped(&self, command: FfmpegCommand) -> FfmpegCommand {
        command.with_thread_cap(self.threads.cap())
    }
}

impl DurationProbe for FfmpegToolkit {
    fn probe_duration(&self, audio_path: &Path) -> Option<f64> {
        match get_audio_duration(&self.tools.ffprobe, audio_path) {
            Ok(duration) => duration,
            Err(e) => {
                warn!("ffprobe 失敗 {}: {e:#}", audio_path.display());
                None
            }
        }
    }
}

impl SegmentEncoder for FfmpegToolkit {
    fn build_image_segment(&self, image: &Path, duration: f64, output: &Path) -> PipelineResult<()> {
        self.capped(FfmpegCommand::image_segment(
            &self.tools.ffmpeg,
            image,
            duration,
            output,
        ))
        .execute()
        .map_err(|e| PipelineError::encoding(image, format!("{e:#}")))
    }

    fn build_audio_segment(&self, image: &Path, audio: &Path, output: &Path) -> PipelineResult<()> {
        self.capped(FfmpegCommand::audio_segment(
            &self.tools.ffmpeg,
            image,
            audio,
            output,
        ))
        .execute()
        .map_err(|e| PipelineError::encoding(audio, format!("{e:#}")))
    }
}

impl Concatenator for FfmpegToolkit {
    fn concat(&self, manifest: &Path, output: &Path) -> PipelineResult<()> {
        self.capped(FfmpegCommand::concat(&self.tools.ffmpeg, manifest, output))
            .execute()
            .map_err(|e| PipelineError::Concatenation(format!("{e:#}")))
    }
}

impl GifEncoder for FfmpegToolkit {
    fn generate_palette(&self, frames: &FrameSequence, palette: &Path) -> PipelineResult<()> {
        self.capped(FfmpegCommand::palette(
            &self.tools.ffmpeg,
            &frames.pattern,
            frames.frame_duration,
            palette,
        ))
        .execute()
        .map_err(|e| PipelineError::PaletteGeneration(format!("{e:#}")))
    }

    fn render_gif(&self, frames: &FrameSequence, palette: &Path, output: &Path) -> PipelineResult<()> {
        self.capped(FfmpegCommand::gif(
            &self.tools.ffmpeg,
            &frames.pattern,
            frames.frame_duration,
            palette,
            output,
        ))
        .execute()
        .map_err(|e| PipelineError::GifRender(format!("{e:#}")))
    }
}
