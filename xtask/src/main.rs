//! Build tasks for the iso4 workspace.
//!
//! ```text
//! cargo xtask man [--out-dir DIR]
//! cargo xtask completions [--out-dir DIR] [--shell SHELL]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser)]
#[command(name = "xtask", about = "Workspace automation for iso4")]
struct Xtask {
    #[command(subcommand)]
    task: Task,
}

#[derive(Subcommand)]
enum Task {
    /// Generate man pages for iso4 and its subcommands
    Man {
        /// Output directory
        #[arg(long, default_value = "target/dist/man")]
        out_dir: PathBuf,
    },
    /// Generate shell completion scripts
    Completions {
        /// Output directory
        #[arg(long, default_value = "target/dist/completions")]
        out_dir: PathBuf,
        /// Only generate for this shell
        #[arg(long, value_enum)]
        shell: Option<Shell>,
    },
}

fn main() -> anyhow::Result<()> {
    match Xtask::parse().task {
        Task::Man { out_dir } => man(&out_dir),
        Task::Completions { out_dir, shell } => completions(&out_dir, shell),
    }
}

fn man(out_dir: &Path) -> anyhow::Result<()> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;
    clap_mangen::generate_to(iso4::command(), out_dir)
        .with_context(|| format!("failed to write man pages to {}", out_dir.display()))?;
    println!("man pages written to {}", out_dir.display());
    Ok(())
}

fn completions(out_dir: &Path, shell: Option<Shell>) -> anyhow::Result<()> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;
    let shells = match shell {
        Some(shell) => vec![shell],
        None => vec![Shell::Bash, Shell::Elvish, Shell::Fish, Shell::PowerShell, Shell::Zsh],
    };
    let mut command = iso4::command();
    for shell in shells {
        let path = clap_complete::generate_to(shell, &mut command, "iso4", out_dir)
            .with_context(|| format!("failed to write {shell} completions"))?;
        println!("{}", path.display());
    }
    Ok(())
}
