use super::collaborators::{FrameSequence, GifEncoder};
use crate::error::{PipelineError, PipelineResult};
use crate::tools::{ScopedDirectory, remove_file_if_exists};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

const FRAME_PATTERN: &str = "frame-%05d.png";

/// 只用截圖產生無聲 GIF，與 MP4 流程互不相干
pub struct GifRenderer<'a> {
    encoder: &'a dyn GifEncoder,
    frame_duration: f64,
}

impl<'a> GifRenderer<'a> {
    pub fn new(encoder: &'a dyn GifEncoder, frame_duration: f64) -> Self {
        Self {
            encoder,
            frame_duration,
        }
    }

    /// 先產生共用調色盤再輸出 GIF；調色盤與影格暫存在任何情況下都會移除
    pub fn render(
        &self,
        images: &[PathBuf],
        frames_dir: &Path,
        palette: &Path,
        output: &Path,
    ) -> PipelineResult<()> {
        if images.is_empty() {
            return Err(PipelineError::GifRender("沒有任何截圖".to_string()));
        }

        let frames = ScopedDirectory::create(frames_dir)
            .map_err(|e| PipelineError::GifRender(format!("{e:#}")))?;
        let _palette = ScopedFile(palette);

        let sequence = stage_frames(images, frames.path(), self.frame_duration)?;
        debug!("GIF 影格: {} 張", sequence.count);

        self.encoder.generate_palette(&sequence, palette)?;
        if !palette.is_file() {
            return Err(PipelineError::PaletteGeneration(format!(
                "沒有產生調色盤: {}",
                palette.display()
            )));
        }

        self.encoder.render_gif(&sequence, palette, output)?;
        if !output.is_file() {
            return Err(PipelineError::GifRender(format!(
                "沒有產生輸出檔案: {}",
                output.display()
            )));
        }

        info!("GIF 完成: {} ({} 格)", output.display(), sequence.count);
        Ok(())
    }
}

/// 把截圖依序放成 `frame-00001.png`…，讓影格數量恰好等於截圖數量
fn stage_frames(images: &[PathBuf], frames_dir: &Path, frame_duration: f64) -> PipelineResult<FrameSequence> {
    for (i, image) in images.iter().enumerate() {
        let frame = frames_dir.join(format!("frame-{:05}.png", i + 1));
        if fs::hard_link(image, &frame).is_err() {
            fs::copy(image, &frame)?;
        }
    }

    Ok(FrameSequence {
        pattern: frames_dir.join(FRAME_PATTERN),
        count: images.len(),
        frame_duration,
    })
}

struct ScopedFile<'a>(&'a Path);

impl Drop for ScopedFile<'_> {
    fn drop(&mut self) {
        if let Err(e) = remove_file_if_exists(self.0) {
            warn!("{e:#}");
        }
    }
}
