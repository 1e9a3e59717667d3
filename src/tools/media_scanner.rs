use crate::config::NARRATION_CACHE_DIR;
use crate::error::{PipelineError, PipelineResult};
use log::debug;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use walkdir::WalkDir;

static REGEX_NUMERIC_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)").expect("Invalid regex"));

/// 媒體檔案種類（依副檔名判斷）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    /// `.png` 截圖
    Image,
    /// `.mp3` / `.wav` 預錄音訊
    PrerenderedAudio,
    /// `.txt` 旁白文字，需先經過語音合成
    Narration,
}

impl MediaKind {
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "png" => Some(Self::Image),
            "mp3" | "wav" => Some(Self::PrerenderedAudio),
            "txt" => Some(Self::Narration),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaItem {
    pub path: PathBuf,
    pub kind: MediaKind,
}

impl MediaItem {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, kind: MediaKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    #[must_use]
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map_or_else(|| self.path.display().to_string(), |n| n.to_string_lossy().to_string())
    }

    #[must_use]
    pub fn is_image(&self) -> bool {
        self.kind == MediaKind::Image
    }
}

/// 收集結果：片頭檔案在前，主資料夾檔案在後
#[derive(Debug, Clone, Default)]
pub struct CollectedMedia {
    pub intro: Vec<MediaItem>,
    pub main: Vec<MediaItem>,
}

impl CollectedMedia {
    /// MP4 使用的完整序列
    #[must_use]
    pub fn sequence(&self) -> Vec<MediaItem> {
        self.intro.iter().chain(&self.main).cloned().collect()
    }

    /// GIF 使用的截圖（只取主資料夾，不含片頭）
    #[must_use]
    pub fn gif_images(&self) -> Vec<PathBuf> {
        self.main
            .iter()
            .filter(|item| item.is_image())
            .map(|item| item.path.clone())
            .collect()
    }

    #[must_use]
    pub fn count(&self, kind: MediaKind) -> usize {
        self.intro
            .iter()
            .chain(&self.main)
            .filter(|item| item.kind == kind)
            .count()
    }
}

/// 掃描資料夾第一層的媒體檔案，依檔名排序
///
/// 旁白快取資料夾一律排除，不認得的副檔名直接忽略。
pub fn scan_media_files(directory: &Path) -> PipelineResult<Vec<MediaItem>> {
    let mut items = Vec::new();

    for entry in WalkDir::new(directory)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.file_name() != NARRATION_CACHE_DIR)
    {
        let entry = entry.map_err(|e| {
            e.into_io_error()
                .map_or_else(|| PipelineError::DirectoryNotFound(directory.to_path_buf()), Into::into)
        })?;

        // 符號連結指向的檔案也算；斷掉的連結直接略過
        if !entry.path().is_file() {
            continue;
        }

        if let Some(kind) = MediaKind::from_path(entry.path()) {
            items.push(MediaItem::new(entry.into_path(), kind));
        }
    }

    debug!("{} 掃描到 {} 個媒體檔案", directory.display(), items.len());
    Ok(items)
}

/// 收集主資料夾（與可選的片頭資料夾）並驗證序列
pub fn collect_media_files(
    main_dir: &Path,
    intro_dir: Option<&Path>,
) -> PipelineResult<CollectedMedia> {
    let main = scan_media_files(main_dir)?;
    if main.is_empty() {
        return Err(PipelineError::NoMediaFiles(main_dir.to_path_buf()));
    }

    let intro = match intro_dir {
        Some(dir) if dir.is_dir() => scan_media_files(dir)?,
        _ => Vec::new(),
    };

    let collected = CollectedMedia { intro, main };
    validate_media_sequence(&collected.sequence(), main_dir)?;
    Ok(collected)
}

/// 序列必須至少有一張截圖，而且第一個檔案必須是截圖
pub fn validate_media_sequence(items: &[MediaItem], directory: &Path) -> PipelineResult<()> {
    let Some(first) = items.first() else {
        return Err(PipelineError::NoMediaFiles(directory.to_path_buf()));
    };

    if !items.iter().any(MediaItem::is_image) {
        return Err(PipelineError::NoImages(directory.to_path_buf()));
    }

    if !first.is_image() {
        return Err(PipelineError::FirstItemNotImage(first.file_name()));
    }

    Ok(())
}

/// 檢查檔名的數字前綴是否存在且不遞減
///
/// 例如 `9-a.png` 排在 `10-b.png` 之後時，字典序與數字順序不一致。
pub fn validate_numeric_order(items: &[MediaItem]) -> PipelineResult<()> {
    let mut previous: Option<(u64, String)> = None;

    for item in items {
        let name = item.file_name();
        let number: u64 = REGEX_NUMERIC_PREFIX
            .captures(&name)
            .and_then(|caps| caps[1].parse().ok())
            .ok_or_else(|| PipelineError::argument(format!("檔名缺少數字前綴: {name}")))?;

        if let Some((prev_number, prev_name)) = &previous {
            if number < *prev_number {
                return Err(PipelineError::argument(format!(
                    "檔名數字前綴順序錯誤: {prev_name} 之後出現 {name}"
                )));
            }
        }
        previous = Some((number, name));
    }

    Ok(())
}
