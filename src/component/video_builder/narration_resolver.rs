use super::collaborators::Synthesizer;
use crate::config::NARRATION_CACHE_DIR;
use crate::error::PipelineResult;
use crate::tools::{MediaItem, MediaKind};
use console::style;
use log::{debug, info};
use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};

/// 旁白解析結果：序列中的 `Narration` 已全部換成 `PrerenderedAudio`
#[derive(Debug, Clone, Default)]
pub struct ResolvedMedia {
    pub items: Vec<MediaItem>,
    pub cache_hits: usize,
    pub synthesized: usize,
}

/// 把 `.txt` 旁白轉成 `.wav`，並以修改時間判斷快取是否仍然有效
pub struct NarrationResolver<'a> {
    synthesizer: &'a dyn Synthesizer,
    voice: &'a str,
    ready: Cell<bool>,
}

impl<'a> NarrationResolver<'a> {
    pub fn new(synthesizer: &'a dyn Synthesizer, voice: &'a str) -> Self {
        Self {
            synthesizer,
            voice,
            ready: Cell::new(false),
        }
    }

    /// 逐項解析，保持原本順序
    pub fn resolve(&self, items: Vec<MediaItem>) -> PipelineResult<ResolvedMedia> {
        let mut resolved = ResolvedMedia {
            items: Vec::with_capacity(items.len()),
            ..ResolvedMedia::default()
        };

        for item in items {
            if item.kind != MediaKind::Narration {
                resolved.items.push(item);
                continue;
            }

            let cache_path = cache_path_for(&item.path);
            if is_cache_fresh(&item.path, &cache_path) {
                println!(
                    "  [{}] {}",
                    item.file_name(),
                    style("使用快取的語音").yellow()
                );
                debug!("旁白快取命中: {}", cache_path.display());
                resolved.cache_hits += 1;
            } else {
                self.synthesize(&item, &cache_path)?;
                resolved.synthesized += 1;
            }

            resolved
                .items
                .push(MediaItem::new(cache_path, MediaKind::PrerenderedAudio));
        }

        Ok(resolved)
    }

    fn synthesize(&self, item: &MediaItem, cache_path: &Path) -> PipelineResult<()> {
        // 只有真的需要合成時才檢查引擎
        if !self.ready.get() {
            self.synthesizer.ensure_ready()?;
            self.ready.set(true);
        }

        println!(
            "  [{}] {}",
            item.file_name(),
            style(format!("產生語音 ({})...", self.voice)).cyan()
        );
        self.synthesizer
            .synthesize(&item.path, cache_path, self.voice)?;
        info!("已產生旁白語音: {}", cache_path.display());
        Ok(())
    }
}

/// `<dir>/script.txt` → `<dir>/generated-wav/script.wav`
#[must_use]
pub fn cache_path_for(source: &Path) -> PathBuf {
    let stem = source.file_stem().unwrap_or(source.as_os_str());
    let mut file_name = stem.to_os_string();
    file_name.push(".wav");

    source
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join(NARRATION_CACHE_DIR)
        .join(file_name)
}

/// 快取存在且修改時間嚴格晚於原始文字檔才算有效；任一方讀不到時間都視為過期
#[must_use]
pub fn is_cache_fresh(source: &Path, cache: &Path) -> bool {
    let modified = |path: &Path| fs::metadata(path).and_then(|m| m.modified()).ok();

    match (modified(source), modified(cache)) {
        (Some(source_time), Some(cache_time)) => cache_time > source_time,
        _ => false,
    }
}
