mod ffmpeg_command;
mod ffprobe_info;
mod file_size;
mod media_scanner;
mod path_validator;
mod thread_budget;
mod tool_locator;

pub use ffmpeg_command::{AUDIO_SAMPLE_RATE, FfmpegCommand, VIDEO_FILTER, format_seconds};
pub use ffprobe_info::get_audio_duration;
pub use file_size::{format_size, human_readable_size};
pub use media_scanner::{
    CollectedMedia, MediaItem, MediaKind, collect_media_files, scan_media_files,
    validate_media_sequence, validate_numeric_order,
};
pub use path_validator::{
    ScopedDirectory, ensure_directory_exists, remove_file_if_exists, reset_directory,
    validate_directory_exists,
};
pub use thread_budget::ThreadBudget;
pub use tool_locator::{ToolPaths, locate_tool};
