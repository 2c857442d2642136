mod active;
mod pipeline;
mod sink;
mod unpack;
mod watch;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use infofinder_core::load_config;
use tracing::info;

/// 命令行入口（基于 clap）
#[derive(Parser, Debug)]
#[command(name = "infofinder", version, about = "反编译小程序源码敏感信息扫描")]
struct Cli {
    /// 配置文件路径
    #[arg(long, global = true, default_value = "./config/config.yaml")]
    config_file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 扫描已反编译的代码目录
    Scan {
        /// 目标代码目录
        #[arg(long)]
        folder_path: PathBuf,
    },
    /// 先解包 / 反编译指定的小程序包，再扫描解包产物
    Unpack {
        /// 待解包的 wxapkg 包或目录
        #[arg(long)]
        folder_path: PathBuf,
    },
    /// 监控小程序包目录，新包出现后自动解包并扫描
    Monitor,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    // 配置 / 规则类错误都在扫描开始前返回，进程以非零码退出
    let config_path = ensure_exists(&cli.config_file, "config file")?;
    let config = load_config(&config_path)?;

    match cli.command {
        Commands::Scan { folder_path } => {
            let target = ensure_exists(&folder_path, "target folder")?;
            info!(target = %target.display(), "scanning existing folder");
            pipeline::run(&target, &config)?;
        }
        Commands::Unpack { folder_path } => {
            let packet = ensure_exists(&folder_path, "applet packet")?;
            let unpacked = unpack::unpack_packet(&packet, &config.file_config)?;
            pipeline::run(&unpacked, &config)?;
        }
        Commands::Monitor => watch::monitor_folder(&config)?,
    }

    Ok(())
}

/// 路径存在性检查并归一化为绝对路径
fn ensure_exists(path: &Path, hint: &str) -> Result<PathBuf> {
    if !path.exists() {
        bail!("{hint} path does not exist: {}", path.display());
    }
    path.canonicalize()
        .with_context(|| format!("failed to resolve {hint} path {}", path.display()))
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};
    // 通过环境变量 RUST_LOG 控制日志等级，例如 RUST_LOG=debug
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(env_filter).finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}
