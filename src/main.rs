use anyhow::Result;
use argh::FromArgs;
use ringsh::Shell;
use ringsh::command::MAX_ARGS;
use ringsh::history::{HISTORY_CAPACITY, HistoryRing};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// An interactive command shell with a bounded, persistent history ring.
#[derive(FromArgs)]
struct ShellArgs {
    /// how many history entries to keep
    #[argh(option, default = "HISTORY_CAPACITY")]
    history_size: usize,

    /// file the command history is persisted to
    #[argh(option, default = "PathBuf::from(\"history.txt\")")]
    history_file: PathBuf,

    /// do not load or save the history file
    #[argh(switch)]
    no_history_file: bool,

    /// most arguments a single command may carry
    #[argh(option, default = "MAX_ARGS")]
    max_args: usize,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: ShellArgs = argh::from_env();

    let mut history = if args.no_history_file {
        HistoryRing::new(args.history_size)
    } else {
        HistoryRing::with_file(args.history_size, args.history_file.clone())
    };
    if !args.no_history_file {
        let loaded = history.load(&args.history_file, args.max_args);
        info!(loaded, file = %args.history_file.display(), "history loaded");
    }

    Shell::new(history, args.max_args).repl()
}
