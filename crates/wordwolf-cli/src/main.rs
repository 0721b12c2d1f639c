//! CLI frontend for the word wolf session engine.

mod commands;
mod console;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "wordwolf",
    about = "Word wolf: find the one player whose word is different",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter topic file
    Init {
        /// Path of the file to create
        #[arg(default_value = "topics.txt")]
        path: PathBuf,
    },

    /// Validate a topic file
    Check {
        /// Topic file (`topic|word,word,...` per line)
        #[arg(short, long, default_value = "topics.txt")]
        file: PathBuf,
    },

    /// List the topics in a topic file
    Topics {
        /// Topic file
        #[arg(short, long, default_value = "topics.txt")]
        file: PathBuf,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Play a hot-seat round in the terminal
    Play {
        /// Topic file
        #[arg(short, long, default_value = "topics.txt")]
        file: PathBuf,

        /// RNG seed for reproducible rounds
        #[arg(short, long)]
        seed: Option<u64>,

        /// Seconds of discussion required before `results`
        #[arg(long, default_value = "60")]
        window: u64,

        /// Only the organizer may open voting
        #[arg(long)]
        organizer_opens_vote: bool,

        /// Player who receives the role sheet (repeatable)
        #[arg(long = "moderator")]
        moderators: Vec<String>,

        /// Player whose private messages cannot be delivered (repeatable)
        #[arg(long = "unreachable")]
        unreachable: Vec<String>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { path } => commands::init::run(&path),
        Commands::Check { file } => commands::check::run(&file),
        Commands::Topics { file, json } => commands::topics::run(&file, json),
        Commands::Play {
            file,
            seed,
            window,
            organizer_opens_vote,
            moderators,
            unreachable,
        } => commands::play::run(
            &file,
            commands::play::PlayOptions {
                seed,
                window,
                organizer_opens_vote,
                moderators,
                unreachable,
            },
        ),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
