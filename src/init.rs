use env_logger::Env;

/// 初始化日誌系統
///
/// 預設只輸出 warn 以上，避免干擾終端機上的進度報告；
/// `RUST_LOG` 可覆寫，`verbose` 則把本 crate 提升到 debug。
pub fn init(verbose: bool) {
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("warn"));
    if verbose {
        builder.filter_module("demo_video_builder", log::LevelFilter::Debug);
    }
    // 測試中可能重複初始化，忽略錯誤即可
    let _ = builder.format_timestamp(None).try_init();
}
