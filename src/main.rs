//! snaptree CLI - content-addressed tar snapshots of directory trees

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use snaptree::{repo_id_from_dir, Config, LocalRepo, RepoSource};

#[derive(Parser)]
#[command(name = "snaptree")]
#[command(about = "content-addressed tar snapshots of local directory trees")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// snapshot a directory and print its storage key
    Snapshot {
        /// directory to snapshot
        dir: PathBuf,

        /// archive output path (default: <repo_id>.tar)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// repository identifier (default: derived from the path)
        #[arg(long)]
        repo_id: Option<String>,

        /// extra exclusion glob, may be repeated
        #[arg(short = 'x', long = "exclude")]
        exclude: Vec<String>,

        /// TOML config file with excludes and repo id
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// print the identifier derived for a directory
    Id {
        /// directory to identify
        dir: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("error: {}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn run(cli: Cli) -> snaptree::Result<()> {
    match cli.command {
        Commands::Snapshot {
            dir,
            output,
            repo_id,
            mut exclude,
            config,
        } => {
            let config = match config {
                Some(path) => Config::load(&path)?,
                None => Config::default(),
            };
            exclude.extend(config.exclude);

            let repo = LocalRepo::new(repo_id.or(config.repo_id), RepoSource::Dir(dir));
            let output = output.unwrap_or_else(|| PathBuf::from(format!("{}.tar", repo.repo_id())));

            let mut file = OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .truncate(true)
                .open(&output)
                .map_err(|source| snaptree::Error::Io {
                    path: output.clone(),
                    source,
                })?;

            let key = repo.snapshot_with_excludes(&mut file, &exclude)?;
            println!("{}", key);
        }

        Commands::Id { dir } => {
            println!("{}", repo_id_from_dir(&dir));
        }
    }

    Ok(())
}
