use std::path::PathBuf;

use clap::{Parser, Subcommand};
use git_staging::{FileChange, FileDiff, StagingEngine, SystemProcessRunner};

#[derive(Parser)]
#[command(name = "git-staging")]
#[command(about = "Hunk-level git staging tool")]
struct Cli {
    /// Repository path
    #[arg(short = 'C', long = "repo", default_value = ".")]
    repo: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show staged and unstaged changes
    Status,
    /// Show the diff for one file, with old/new line numbers
    Diff {
        path: String,
        /// Show the staged (index) side instead of the working tree
        #[arg(long)]
        staged: bool,
    },
    /// Stage whole files
    Stage { paths: Vec<String> },
    /// Unstage whole files
    Unstage { paths: Vec<String> },
    /// Stage one hunk of a file (zero-based index from `diff`)
    StageHunk { path: String, hunk: usize },
    /// Unstage one hunk of a file
    UnstageHunk { path: String, hunk: usize },
    /// Discard one hunk from the working tree
    DiscardHunk { path: String, hunk: usize },
    /// Discard all working-tree changes to a file
    Discard { path: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let engine = StagingEngine::open(cli.repo);

    match cli.command {
        Commands::Status => {
            let status = engine.status().await?;
            print_listing("Staged", &status.staged);
            print_listing("Unstaged", &status.unstaged);
        }
        Commands::Diff { path, staged } => {
            let change = find_change(&engine, &path, staged).await?;
            let diff = engine.diff(&change, staged).await?;
            print_diff(&diff);
        }
        Commands::Stage { paths } => {
            let refs: Vec<&str> = paths.iter().map(String::as_str).collect();
            engine.stage_files(&refs).await?;
        }
        Commands::Unstage { paths } => {
            let refs: Vec<&str> = paths.iter().map(String::as_str).collect();
            engine.unstage_files(&refs).await?;
        }
        Commands::StageHunk { path, hunk } => {
            let change = find_change(&engine, &path, false).await?;
            let diff = engine.diff(&change, false).await?;
            let hunk = select_hunk(&diff, hunk)?;
            engine.stage_hunk(&change, hunk).await?;
        }
        Commands::UnstageHunk { path, hunk } => {
            let change = find_change(&engine, &path, true).await?;
            let diff = engine.diff(&change, true).await?;
            let hunk = select_hunk(&diff, hunk)?;
            engine.unstage_hunk(&change, hunk).await?;
        }
        Commands::DiscardHunk { path, hunk } => {
            let change = find_change(&engine, &path, false).await?;
            let diff = engine.diff(&change, false).await?;
            let hunk = select_hunk(&diff, hunk)?;
            engine.discard_hunk(&change, hunk).await?;
        }
        Commands::Discard { path } => {
            let change = find_change(&engine, &path, false).await?;
            engine.discard_file(&change).await?;
        }
    }

    Ok(())
}

/// Look a path up in the staged or unstaged listing.
async fn find_change(
    engine: &StagingEngine<SystemProcessRunner>,
    path: &str,
    staged: bool,
) -> Result<FileChange, Box<dyn std::error::Error>> {
    let changes = if staged {
        engine.staged_changes().await?
    } else {
        engine.unstaged_changes().await?
    };
    changes
        .into_iter()
        .find(|c| c.path == path)
        .ok_or_else(|| format!("no changes found for {path}").into())
}

fn select_hunk(diff: &FileDiff, index: usize) -> Result<&git_staging::DiffHunk, String> {
    diff.hunks.get(index).ok_or_else(|| {
        format!(
            "hunk index {index} out of range ({} hunks)",
            diff.hunks.len()
        )
    })
}

fn print_listing(label: &str, changes: &[FileChange]) {
    println!("{label}:");
    if changes.is_empty() {
        println!("  (none)");
    }
    for change in changes {
        match &change.old_path {
            Some(old) => println!("  {} {} <- {}", change.status, change.path, old),
            None => println!("  {} {}", change.status, change.path),
        }
    }
}

fn print_diff(diff: &FileDiff) {
    if diff.is_binary {
        println!("{}: binary file", diff.file_change.path);
        return;
    }
    if diff.is_empty() {
        println!("{}: no changes to display", diff.file_change.path);
        return;
    }

    println!("{}:", diff.file_change.path);
    for (index, hunk) in diff.hunks.iter().enumerate() {
        println!("[{index}] {}", hunk.header);
        for (line_index, line) in hunk.lines.iter().enumerate() {
            let numbers = hunk
                .line_numbers_at(line_index)
                .unwrap_or(git_staging::LineNumbers {
                    old: None,
                    new: None,
                });
            let old = numbers
                .old
                .map_or_else(|| "    ".to_string(), |n| format!("{n:4}"));
            let new = numbers
                .new
                .map_or_else(|| "    ".to_string(), |n| format!("{n:4}"));
            println!("  {old} {new} {}", line.raw());
        }
    }
}
