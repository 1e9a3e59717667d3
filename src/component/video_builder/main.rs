use super::collaborators::{Concatenator, DurationProbe, GifEncoder, SegmentEncoder, Synthesizer};
use super::concat_planner::ConcatPlanner;
use super::gif_renderer::GifRenderer;
use super::layout::ProjectLayout;
use super::narration_resolver::NarrationResolver;
use super::segment_builder::{BuiltSegments, SegmentBuilder};
use crate::config::Settings;
use crate::error::{PipelineError, PipelineResult};
use crate::tools::{
    CollectedMedia, MediaItem, MediaKind, ScopedDirectory, collect_media_files,
    ensure_directory_exists, format_seconds, human_readable_size, remove_file_if_exists,
    validate_directory_exists, validate_numeric_order,
};
use console::style;
use log::{info, warn};
use std::path::PathBuf;

/// 流程使用的外部協作者
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub synthesizer: &'a dyn Synthesizer,
    pub probe: &'a dyn DurationProbe,
    pub encoder: &'a dyn SegmentEncoder,
    pub concatenator: &'a dyn Concatenator,
    pub gif_encoder: &'a dyn GifEncoder,
}

/// 一次成功執行的結果
#[derive(Debug, Clone)]
pub struct BuildSummary {
    pub mp4_path: PathBuf,
    pub gif_path: PathBuf,
    pub segment_count: usize,
    pub total_duration: f64,
    pub skipped_audio: Vec<PathBuf>,
    pub cache_hits: usize,
    pub synthesized: usize,
}

pub struct VideoBuilder<'a> {
    settings: &'a Settings,
    collaborators: Collaborators<'a>,
}

impl<'a> VideoBuilder<'a> {
    pub const fn new(settings: &'a Settings, collaborators: Collaborators<'a>) -> Self {
        Self {
            settings,
            collaborators,
        }
    }

    pub fn run(&self, layout: &ProjectLayout) -> PipelineResult<BuildSummary> {
        println!(
            "{}",
            style(format!("=== 建立示範影片: {} ===", layout.subfolder()))
                .cyan()
                .bold()
        );

        let screenshot_dir = layout.screenshot_dir();
        validate_directory_exists(&screenshot_dir)?;

        let intro_dir = layout.intro_dir();
        let intro = self.settings.use_intro.then_some(intro_dir.as_path());
        let collected = collect_media_files(&screenshot_dir, intro)?;

        if self.settings.strict_order {
            validate_numeric_order(&collected.intro)?;
            validate_numeric_order(&collected.main)?;
        }

        self.print_inventory(&collected);

        println!("{}", style("處理旁白...").dim());
        let resolved = NarrationResolver::new(self.collaborators.synthesizer, &self.settings.voice)
            .resolve(collected.sequence())?;

        let built = match self.produce(layout, &collected, &resolved.items) {
            Ok(built) => built,
            Err(e) => {
                // 失敗的執行不留下任何最終輸出
                for path in [layout.mp4_path(), layout.gif_path()] {
                    if let Err(remove_err) = remove_file_if_exists(&path) {
                        warn!("{remove_err:#}");
                    }
                }
                return Err(e);
            }
        };

        let summary = BuildSummary {
            mp4_path: layout.mp4_path(),
            gif_path: layout.gif_path(),
            segment_count: built.segments.len(),
            total_duration: built.durations.total(),
            skipped_audio: built.skipped,
            cache_hits: resolved.cache_hits,
            synthesized: resolved.synthesized,
        };
        self.print_summary(&summary);
        Ok(summary)
    }

    /// 建立片段、合併 MP4、輸出 GIF
    fn produce(
        &self,
        layout: &ProjectLayout,
        collected: &CollectedMedia,
        items: &[MediaItem],
    ) -> PipelineResult<BuiltSegments> {
        let mp4_path = layout.mp4_path();
        let gif_path = layout.gif_path();

        ensure_directory_exists(&layout.output_dir()).map_err(PipelineError::io)?;
        for path in [&mp4_path, &gif_path] {
            remove_file_if_exists(path).map_err(PipelineError::io)?;
        }

        let built = {
            let segment_dir =
                ScopedDirectory::create(layout.segment_dir()).map_err(PipelineError::io)?;

            println!("{}", style("建立影片片段...").cyan());
            let built = SegmentBuilder::new(
                self.collaborators.encoder,
                self.collaborators.probe,
                segment_dir.path(),
                self.settings.frame_duration,
            )
            .build(items)?;

            println!(
                "{}",
                style(format!("合併 {} 個片段...", built.segments.len())).cyan()
            );
            ConcatPlanner::new(self.collaborators.concatenator).concat(
                &built.segments,
                segment_dir.path(),
                &mp4_path,
            )?;
            built
        };

        println!("{}", style("建立 GIF...").cyan());
        GifRenderer::new(self.collaborators.gif_encoder, self.settings.frame_duration).render(
            &collected.gif_images(),
            &layout.gif_frames_dir(),
            &layout.palette_path(),
            &gif_path,
        )?;

        info!("示範影片完成: {}", mp4_path.display());
        Ok(built)
    }

    fn print_inventory(&self, collected: &CollectedMedia) {
        let count_in = |items: &[MediaItem], kind: MediaKind| {
            items.iter().filter(|item| item.kind == kind).count()
        };

        println!(
            "  截圖: {} 張，預錄音訊: {} 個，旁白: {} 個",
            collected.count(MediaKind::Image),
            collected.count(MediaKind::PrerenderedAudio),
            collected.count(MediaKind::Narration),
        );
        if !collected.intro.is_empty() {
            println!(
                "  {}",
                style(format!(
                    "片頭 {} 個檔案（截圖 {}），主資料夾 {} 個檔案",
                    collected.intro.len(),
                    count_in(&collected.intro, MediaKind::Image),
                    collected.main.len(),
                ))
                .dim()
            );
        }
        println!(
            "  每張截圖顯示 {} 秒",
            format_seconds(self.settings.frame_duration)
        );
    }

    fn print_summary(&self, summary: &BuildSummary) {
        println!();
        println!("{}", style("=== 完成 ===").green().bold());
        println!(
            "  片段: {} 個，總長度約 {:.1} 秒",
            summary.segment_count, summary.total_duration
        );
        if summary.cache_hits + summary.synthesized > 0 {
            println!(
                "  旁白: 快取 {} 個，新產生 {} 個",
                summary.cache_hits, summary.synthesized
            );
        }
        if !summary.skipped_audio.is_empty() {
            println!(
                "  {}",
                style(format!(
                    "略過 {} 個無法偵測長度的音訊",
                    summary.skipped_audio.len()
                ))
                .yellow()
            );
        }
        println!(
            "  MP4: {} ({})",
            summary.mp4_path.display(),
            human_readable_size(&summary.mp4_path)
        );
        println!(
            "  GIF: {} ({})",
            summary.gif_path.display(),
            human_readable_size(&summary.gif_path)
        );
        println!(
            "{}",
            style("MP4 含語音可直接播放；GIF 無聲，適合嵌入文件或 README").dim()
        );
    }
}
