use clap::Parser;
use console::style;
use demo_video_builder::component::video_builder::{
    BuildSummary, Collaborators, FfmpegToolkit, KokoroSynthesizer, ProjectLayout, VideoBuilder,
};
use demo_video_builder::config::Settings;
use demo_video_builder::error::PipelineResult;
use demo_video_builder::init;
use demo_video_builder::tools::{ThreadBudget, ToolPaths};
use log::{error, info};
use std::path::PathBuf;
use std::process::ExitCode;

/// 由截圖、音訊與旁白文字組成示範影片（MP4）與無聲 GIF
#[derive(Parser, Debug)]
#[command(name = "demo-video", version)]
struct Cli {
    /// 專案根目錄（包含 screenshots/ 的資料夾）
    base_folder: PathBuf,

    /// screenshots/ 底下的子資料夾名稱
    subfolder_name: String,

    /// 每張截圖顯示的秒數
    #[arg(long)]
    frame_duration: Option<f64>,

    /// Kokoro 語音
    #[arg(long)]
    voice: Option<String>,

    /// Kokoro 專案目錄
    #[arg(long)]
    kokoro_dir: Option<PathBuf>,

    /// ffmpeg 與語音合成的執行緒上限
    #[arg(long)]
    threads: Option<usize>,

    /// 不限制執行緒數量
    #[arg(long)]
    high_performance: bool,

    /// 不加入 screenshots/intro 片頭
    #[arg(long)]
    no_intro: bool,

    /// 檢查檔名數字前綴順序
    #[arg(long)]
    strict_order: bool,

    /// 顯示除錯日誌
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// 預設值 → settings.json → 環境變數 → 命令列參數
    fn settings(&self) -> PipelineResult<Settings> {
        let mut settings = Settings::load()?;

        if let Some(frame_duration) = self.frame_duration {
            settings.frame_duration = frame_duration;
        }
        if let Some(voice) = &self.voice {
            settings.voice = voice.trim().to_string();
        }
        if let Some(kokoro_dir) = &self.kokoro_dir {
            settings.kokoro_dir = kokoro_dir.clone();
        }
        if let Some(threads) = self.threads {
            settings.max_threads = threads;
        }
        settings.high_performance |= self.high_performance;
        settings.strict_order |= self.strict_order;
        if self.no_intro {
            settings.use_intro = false;
        }

        settings.validate()?;
        Ok(settings)
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            // --help / --version 也走這裡
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    init::init(cli.verbose);

    match run(&cli) {
        Ok(summary) => {
            info!(
                "完成 {} 個片段，約 {:.1} 秒",
                summary.segment_count, summary.total_duration
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            eprintln!("{} {e}", style("錯誤:").red().bold());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> PipelineResult<BuildSummary> {
    let layout = ProjectLayout::new(&cli.base_folder, &cli.subfolder_name)?;
    let settings = cli.settings()?;

    let tools = ToolPaths::locate()?;
    let threads = ThreadBudget::new(settings.max_threads, settings.high_performance);
    if let Some(cap) = threads.cap() {
        info!("執行緒上限: {cap}");
    }

    let toolkit = FfmpegToolkit::new(tools, threads);
    let synthesizer = KokoroSynthesizer::new(&settings, threads);
    let collaborators = Collaborators {
        synthesizer: &synthesizer,
        probe: &toolkit,
        encoder: &toolkit,
        concatenator: &toolkit,
        gif_encoder: &toolkit,
    };

    VideoBuilder::new(&settings, collaborators).run(&layout)
}
