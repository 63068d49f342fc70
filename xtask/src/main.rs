use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process::Command;
use xshell::{Shell, cmd};

#[derive(Parser)]
#[command(name = "xtask", about = "Spellbook 开发任务自动化")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 构建 TUI (release)
    Build,
    /// 运行 TUI，日志写入文件
    Tui {
        /// RUST_LOG 级别 (trace, debug, info, warn, error)
        #[arg(short, long, default_value = "info")]
        log_level: String,
        /// 日志输出文件 (默认 target/spellbook.log)
        #[arg(short = 'o', long)]
        log_file: Option<PathBuf>,
    },
    /// 运行测试
    Test {
        /// 只测试某个包，例如 spellbook-core
        #[arg(short, long)]
        package: Option<String>,
    },
    /// 运行 clippy
    Lint,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let sh = Shell::new()?;

    let root = project_root()?;
    sh.change_dir(&root);

    match cli.command {
        Commands::Build => {
            cmd!(sh, "cargo build --release -p spellbook-tui").run()?;
            println!("✅ target/release/spellbook-tui");
        }
        Commands::Tui {
            log_level,
            log_file,
        } => {
            let log_file = log_file.unwrap_or_else(|| root.join("target/spellbook.log"));
            tui(&root, &log_level, &log_file)?;
        }
        Commands::Test { package } => match package {
            Some(package) => cmd!(sh, "cargo test -p {package}").run()?,
            None => cmd!(sh, "cargo test --workspace").run()?,
        },
        Commands::Lint => cmd!(sh, "cargo clippy --workspace --all-targets").run()?,
    }

    Ok(())
}

/// xtask 位于工作区根目录下一层
fn project_root() -> Result<PathBuf> {
    let manifest_dir = std::env::var_os("CARGO_MANIFEST_DIR").map(PathBuf::from);
    match manifest_dir.as_deref().and_then(Path::parent) {
        Some(root) => Ok(root.to_path_buf()),
        None => Ok(std::env::current_dir()?),
    }
}

fn tui(root: &Path, log_level: &str, log_file: &Path) -> Result<()> {
    if let Some(parent) = log_file.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let log = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("cannot open log file {}", log_file.display()))?;

    println!("🖥️  日志级别 {}，日志文件 {}", log_level, log_file.display());
    println!("💡 另开一个终端: tail -f {}", log_file.display());

    // 界面占用 stdout，stderr 的 fmt 输出重定向到日志文件
    let status = Command::new("cargo")
        .args(["run", "-p", "spellbook-tui"])
        .current_dir(root)
        .env(
            "RUST_LOG",
            format!("{level},spellbook_core={level},reqwest=info,hyper=info", level = log_level),
        )
        .stderr(log)
        .status()?;

    if !status.success() {
        bail!("spellbook-tui exited with {}", status);
    }
    Ok(())
}
