//! 示範影片組裝元件
//!
//! 依檔名順序把截圖、預錄音訊與旁白文字組成 MP4，另外只用截圖產生無聲 GIF。
//! 流程：收集 → 旁白轉語音（快取）→ 逐項建立片段 → stream copy 合併。

mod collaborators;
mod concat_planner;
mod ffmpeg_toolkit;
mod gif_renderer;
mod kokoro;
mod layout;
mod main;
mod narration_resolver;
mod segment_builder;

pub use collaborators::{
    Concatenator, DurationProbe, FrameSequence, GifEncoder, SegmentEncoder, Synthesizer,
};
pub use concat_planner::{ConcatPlanner, MANIFEST_FILE, write_manifest};
pub use ffmpeg_toolkit::FfmpegToolkit;
pub use gif_renderer::GifRenderer;
pub use kokoro::KokoroSynthesizer;
pub use layout::ProjectLayout;
pub use main::{BuildSummary, Collaborators, VideoBuilder};
pub use narration_resolver::{NarrationResolver, ResolvedMedia, cache_path_for, is_cache_fresh};
pub use segment_builder::{BuiltSegments, DurationAccumulator, Segment, SegmentBuilder};
