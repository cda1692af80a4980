use std::fmt;
use std::net::SocketAddr;

use services::config::{ENV_PAIRS_PATH, ENV_PORT, ENV_STORE_URL};
use services::{Clock, StateCodec, StoreTarget, SurveyConfig, SurveyServices};
use survey_core::model::IdSource;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt as tracing_fmt};

mod error;
mod server;

use server::AppState;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidPort { raw: String },
    InvalidStoreUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidPort { raw } => write!(f, "invalid --port value: {raw}"),
            ArgsError::InvalidStoreUrl { raw } => write!(f, "invalid store url: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  survey serve  [--port <port>] [--pairs <path>] [--store <url>]");
    eprintln!("  survey keygen");
    eprintln!();
    eprintln!("Defaults for serve:");
    eprintln!("  --port 8501");
    eprintln!("  --pairs ./pairs_list.json");
    eprintln!();
    eprintln!("Store urls:");
    eprintln!("  sqlite://<path> | sqlite::memory: | sheets://<spreadsheet-id>");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  SURVEY_ENCRYPTION_KEY (required), SURVEY_STORE_URL (required),");
    eprintln!("  SURVEY_STORE_CREDENTIALS, SURVEY_SHEETS_RANGE, SURVEY_PAIRS_PATH,");
    eprintln!("  SURVEY_TOTAL_QUESTIONS, SURVEY_IMAGE_URL_TEMPLATE, SURVEY_PORT, SURVEY_BIND,");
    eprintln!("  RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Serve,
    Keygen,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "serve" => Some(Self::Serve),
            "keygen" => Some(Self::Keygen),
            _ => None,
        }
    }
}

/// Flag values for `serve`; each one overrides its environment variable.
#[derive(Debug, Default, PartialEq, Eq)]
struct ServeArgs {
    port: Option<String>,
    pairs: Option<String>,
    store: Option<String>,
}

impl ServeArgs {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut parsed = Self::default();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--port" => {
                    let value = require_value(args, "--port")?;
                    if value.parse::<u16>().is_err() {
                        return Err(ArgsError::InvalidPort { raw: value });
                    }
                    parsed.port = Some(value);
                }
                "--pairs" => parsed.pairs = Some(require_value(args, "--pairs")?),
                "--store" => {
                    let value = require_value(args, "--store")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidStoreUrl { raw: value });
                    }
                    parsed.store = Some(value);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(parsed)
    }

    fn lookup(&self, key: &str) -> Option<String> {
        let flag = match key {
            ENV_PORT => self.port.as_ref(),
            ENV_PAIRS_PATH => self.pairs.as_ref(),
            ENV_STORE_URL => self.store.as_ref(),
            _ => None,
        };
        flag.cloned().or_else(|| std::env::var(key).ok())
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_fmt().with_env_filter(filter).init();
}

/// Resolves a `sqlite:` url against the working directory and creates the
/// database file with its parent directories. `sqlite::memory:` passes through.
fn prepare_sqlite_store(raw: &str) -> Result<String, Box<dyn std::error::Error>> {
    let raw = raw.trim();
    if raw == "sqlite::memory:" {
        return Ok(raw.to_string());
    }

    let rest = raw
        .strip_prefix("sqlite://")
        .or_else(|| raw.strip_prefix("sqlite:"))
        .ok_or_else(|| ArgsError::InvalidStoreUrl {
            raw: raw.to_string(),
        })?;
    let (path, options) = match rest.split_once('?') {
        Some((path, options)) => (path, Some(options)),
        None => (rest, None),
    };
    if path.is_empty() {
        return Err(ArgsError::InvalidStoreUrl {
            raw: raw.to_string(),
        }
        .into());
    }

    let path = std::env::current_dir()?.join(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)?;

    let url = format!("sqlite://{}", path.display());
    Ok(match options {
        Some(options) => format!("{url}?{options}"),
        None => url,
    })
}

async fn serve(args: &ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = SurveyConfig::from_lookup(|key| args.lookup(key))?;
    if let StoreTarget::Sqlite(url) = &mut config.store {
        *url = prepare_sqlite_store(url)?;
    }

    let services =
        SurveyServices::build(&config, Clock::default_clock(), IdSource::random()).await?;

    let addr = SocketAddr::new(config.bind, config.port);
    info!(
        total_questions = config.total_questions,
        pairs = %config.pairs_path.display(),
        "survey configured"
    );
    server::serve(addr, AppState::new(services.flow())).await?;
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // No subcommand means serve.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Serve,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Serve,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    match cmd {
        Command::Keygen => {
            if let Some(extra) = argv.into_iter().next() {
                print_usage();
                return Err(ArgsError::UnknownArg(extra).into());
            }
            println!("{}", StateCodec::generate_key());
            Ok(())
        }
        Command::Serve => {
            let mut iter = argv.into_iter();
            let parsed = ServeArgs::parse(&mut iter).map_err(|e| {
                eprintln!("{e}");
                print_usage();
                e
            })?;
            init_tracing();
            serve(&parsed).await
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Result<ServeArgs, ArgsError> {
        let mut iter = raw.iter().map(|s| (*s).to_string());
        ServeArgs::parse(&mut iter)
    }

    #[test]
    fn serve_flags_override_lookup() {
        let parsed = args(&["--port", "9000", "--store", "sheets://abc"]).unwrap();
        assert_eq!(parsed.lookup(ENV_PORT).as_deref(), Some("9000"));
        assert_eq!(parsed.lookup(ENV_STORE_URL).as_deref(), Some("sheets://abc"));
    }

    #[test]
    fn bad_flags_are_reported() {
        assert!(matches!(
            args(&["--port", "eighty"]),
            Err(ArgsError::InvalidPort { .. })
        ));
        assert!(matches!(
            args(&["--pairs"]),
            Err(ArgsError::MissingValue { flag: "--pairs" })
        ));
        assert!(matches!(args(&["--verbose"]), Err(ArgsError::UnknownArg(_))));
    }

    #[test]
    fn sqlite_store_file_is_created_under_its_directory() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("nested").join("survey.db");
        let url = prepare_sqlite_store(&format!("sqlite://{}?mode=rwc", db.display())).unwrap();
        assert_eq!(url, format!("sqlite://{}?mode=rwc", db.display()));
        assert!(db.exists());

        let again = prepare_sqlite_store(&format!("sqlite:{}", db.display())).unwrap();
        assert_eq!(again, format!("sqlite://{}", db.display()));
    }

    #[test]
    fn in_memory_and_blank_sqlite_urls() {
        assert_eq!(
            prepare_sqlite_store("sqlite::memory:").unwrap(),
            "sqlite::memory:"
        );
        assert!(prepare_sqlite_store("sqlite://").is_err());
    }
}
