pub mod load;
pub mod types;

pub use load::SETTINGS_FILE;
pub use types::{
    DEFAULT_FRAME_DURATION, DEFAULT_KOKORO_SCRIPT, DEFAULT_MAX_THREADS, DEFAULT_VOICE, INTRO_DIR,
    NARRATION_CACHE_DIR, OUTPUT_DIR, SCREENSHOTS_DIR, Settings,
};
