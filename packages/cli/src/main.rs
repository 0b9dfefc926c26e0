use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use mirrorstore::{JsonFileBackend, Mirror};

mod commands;

use commands::{CliError, Command, CommandResult};

/// mirrorstore - Read and write keys in a persisted JSON document
#[derive(Parser, Debug)]
#[command(name = "mirrorstore")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Document to operate on [default: <data dir>/mirrorstore/store.json]
    #[arg(long, env = "MIRRORSTORE_FILE", global = true)]
    file: Option<PathBuf>,

    /// Log more (repeat for trace output). RUST_LOG overrides this.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn default_file() -> Result<PathBuf, CliError> {
    let dir = dirs::data_dir().ok_or(CliError::NoDataDir)?.join("mirrorstore");
    std::fs::create_dir_all(&dir).map_err(|source| CliError::CreateDir {
        path: dir.clone(),
        source,
    })?;
    Ok(dir.join("store.json"))
}

fn run(args: Args) -> Result<CommandResult, CliError> {
    let file = match args.file {
        Some(file) => file,
        None => default_file()?,
    };
    tracing::debug!(path = %file.display(), "opening document");

    let backend = JsonFileBackend::new(file)?;
    let mut mirror = Mirror::open(backend)?;
    commands::execute(args.command, &mut mirror)
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(args) {
        Ok(CommandResult::Ok(display)) => {
            if let Some(display) = display {
                println!("{}", display);
            }
        }
        Ok(CommandResult::Missing) => std::process::exit(2),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_subcommands() {
        let args = Args::try_parse_from(["mirrorstore", "set", "test", "123"]).unwrap();
        assert_eq!(
            args.command,
            Command::Set {
                key: "test".to_string(),
                value: "123".to_string()
            }
        );
        assert_eq!(args.verbose, 0);
    }

    #[test]
    fn file_flag_after_subcommand() {
        let args =
            Args::try_parse_from(["mirrorstore", "-vv", "has", "k", "--file", "/tmp/x.json"])
                .unwrap();
        assert_eq!(args.file, Some(PathBuf::from("/tmp/x.json")));
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn aliases_work() {
        let args = Args::try_parse_from(["mirrorstore", "rm", "k"]).unwrap();
        assert_eq!(args.command, Command::Remove { key: "k".into() });
        let args = Args::try_parse_from(["mirrorstore", "ls"]).unwrap();
        assert_eq!(args.command, Command::List);
    }

    #[test]
    fn run_persists_between_invocations() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("store.json");

        let args = |command| Args {
            file: Some(file.clone()),
            verbose: 0,
            command,
        };

        run(args(Command::Set {
            key: "test".into(),
            value: "123".into(),
        }))
        .unwrap();

        let result = run(args(Command::Get { key: "test".into() })).unwrap();
        assert_eq!(result, CommandResult::Ok(Some("123".to_string())));
    }

    #[test]
    fn run_reports_bad_location() {
        let dir = tempfile::tempdir().unwrap();
        let args = Args {
            file: Some(dir.path().join("missing").join("store.json")),
            verbose: 0,
            command: Command::List,
        };

        assert!(matches!(run(args), Err(CliError::Backend(_))));
    }
}
