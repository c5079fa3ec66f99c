//! Anim Host - headless 动画模拟器
//!
//! ```bash
//! cargo run -p anim-host -- --config demos/config.json
//! cargo run -p anim-host -- --config demos/config.json --ticks 120 --play hero:walk
//! ```

use std::fs;
use std::path::PathBuf;

use anim_host::{ConfigOverrides, HostConfig, PlayRequest, Simulation, load_resources};
use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "anim-host")]
#[command(about = "headless 动画模拟器 - 按固定步长运行动画脚本并输出最终场景")]
#[command(version)]
struct Cli {
    /// 配置文件
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// 动画资源文件（覆盖配置文件）
    #[arg(short, long)]
    resources: Option<PathBuf>,

    /// 每个 tick 的时长（毫秒）
    #[arg(long)]
    tick_ms: Option<u32>,

    /// 模拟的 tick 数
    #[arg(short, long)]
    ticks: Option<u32>,

    /// 日志级别
    #[arg(long)]
    log_level: Option<String>,

    /// 追加播放请求，格式 node:script，可重复
    #[arg(short, long = "play")]
    plays: Vec<PlayRequest>,

    /// 结果输出文件（默认输出到标准输出）
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let file_config = HostConfig::load(&cli.config)?;
    let missing_config = file_config.is_none();
    let mut config = file_config.unwrap_or_default();
    config.apply_overrides(ConfigOverrides {
        resources: cli.resources,
        tick_ms: cli.tick_ms,
        ticks: cli.ticks,
        log_level: cli.log_level,
        plays: cli.plays,
    });
    config.validate()?;

    tracing_subscriber::fmt()
        .with_max_level(config.level()?)
        .with_writer(std::io::stderr)
        .init();

    if missing_config {
        warn!(path = ?cli.config, "配置文件不存在，使用默认配置");
    }

    let library = load_resources(&config.resources)?;
    let mut simulation = Simulation::new(&config, library);
    let report = simulation
        .run()
        .with_context(|| format!("模拟在第 {} 个 tick 中止", simulation.current_tick()))?;
    info!(
        ticks = report.ticks,
        events = report.events.len(),
        running = report.running_scripts,
        "模拟完成"
    );

    let json = serde_json::to_string_pretty(&report)?;
    match cli.output {
        Some(path) => {
            fs::write(&path, json).with_context(|| format!("写入结果失败: {path:?}"))?;
            info!(path = ?path, "结果已写入");
        }
        None => println!("{json}"),
    }
    Ok(())
}
