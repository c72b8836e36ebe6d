// hexbuf - 大文件二进制编辑缓冲区
//
// Copyright (c) 2025 zedit team
//
// Licensed under MIT License

use std::path::PathBuf;

use anyhow::{bail, Context};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

use hexbuf::{Config, HexDocument};

fn main() -> anyhow::Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(Level::INFO.into())
        )
        .with_writer(std::io::stderr)
        .init();

    let Some(path) = std::env::args_os().nth(1).map(PathBuf::from) else {
        bail!("用法: hexbuf <文件>");
    };

    info!("hexbuf v{} starting...", env!("CARGO_PKG_VERSION"));

    let document = HexDocument::open(&path, Config::default())
        .with_context(|| format!("无法打开文件: {}", path.display()))?;

    // 输出可读文本
    let text = document
        .to_readable_string()
        .context("读取文件内容失败")?;
    print!("{}", text);

    Ok(())
}
