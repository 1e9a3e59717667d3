use std::fs;
use std::path::Path;

/// 以人類易讀的格式顯示檔案大小（例如 `1.2M`、`340K`）
#[must_use]
pub fn human_readable_size(path: &Path) -> String {
    fs::metadata(path).map_or_else(|_| "?".to_string(), |m| format_size(m.len()))
}

#[must_use]
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["K", "M", "G", "T", "P"];

    if bytes < 1024 {
        return format!("{bytes}B");
    }

    let mut size = bytes as f64 / 1024.0;
    for unit in &UNITS[..UNITS.len() - 1] {
        if size < 1024.0 {
            return format!("{size:.1}{unit}");
        }
        size /= 1024.0;
    }
    format!("{size:.1}{}", UNITS[UNITS.len() - 1])
}
