use log::{debug, warn};
use sysinfo::System;

/// 外部程序可使用的執行緒上限
///
/// 非高效能模式下把 ffmpeg 與語音合成限制在固定執行緒數，
/// 降低 CPU 負載與風扇噪音。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadBudget {
    cap: Option<usize>,
}

impl ThreadBudget {
    #[must_use]
    pub fn new(max_threads: usize, high_performance: bool) -> Self {
        if high_performance {
            return Self::unlimited();
        }
        Self::capped(max_threads, logical_cpu_count())
    }

    #[must_use]
    pub const fn unlimited() -> Self {
        Self { cap: None }
    }

    /// `cpu_count` 為 0 表示無法取得 CPU 數量，此時不做裁切
    #[must_use]
    pub fn capped(max_threads: usize, cpu_count: usize) -> Self {
        let mut threads = max_threads.max(1);
        if cpu_count > 0 && threads > cpu_count {
            warn!("執行緒上限 {threads} 超過 CPU 數量 {cpu_count}，改用 {cpu_count}");
            threads = cpu_count;
        }
        Self {
            cap: Some(threads),
        }
    }

    #[must_use]
    pub const fn cap(&self) -> Option<usize> {
        self.cap
    }
}

fn logical_cpu_count() -> usize {
    let mut system = System::new();
    system.refresh_cpu_all();
    let count = system.cpus().len();
    debug!("偵測到 {count} 個邏輯 CPU");
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_high_performance_is_unlimited() {
        assert_eq!(ThreadBudget::new(4, true).cap(), None);
    }

    #[test]
    fn test_cap_clamped_to_cpu_count() {
        assert_eq!(ThreadBudget::capped(16, 8).cap(), Some(8));
        assert_eq!(ThreadBudget::capped(4, 8).cap(), Some(4));
    }

    #[test]
    fn test_unknown_cpu_count_keeps_cap() {
        assert_eq!(ThreadBudget::capped(6, 0).cap(), Some(6));
        assert_eq!(ThreadBudget::capped(0, 0).cap(), Some(1));
    }

    #[test]
    fn test_detected_cap_is_positive() {
        let cap = ThreadBudget::new(4, false).cap().unwrap();
        assert!((1..=4).contains(&cap));
    }
}
