use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use log::info;
use services::{
    AppServices, CatalogConfig, Clock, QuizObserver, SessionConfig, StatisticsService,
};
use storage::repository::Storage;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDelay { raw: String },
    InvalidDbUrl { raw: String },
    MissingApiKey,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDelay { raw } => write!(f, "invalid --delay-ms value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::MissingApiKey => {
                write!(f, "no movie API key: pass --api-key or set QUIZ_API_KEY")
            }
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
    eprintln!("  cargo run -p app -- play  [--db <sqlite_url>] [--api-key <key>] [--catalog-url <url>] [--delay-ms <ms>]");
    eprintln!("  cargo run -p app -- stats [--db <sqlite_url>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite:quiz.sqlite3");
    eprintln!("  --delay-ms 1000");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_DB_URL, QUIZ_API_KEY, QUIZ_CATALOG_URL, QUIZ_HTTP_TIMEOUT_SECS, RUST_LOG");
    eprintln!();
    eprintln!("While playing: y = yes, n = no, r = restart, q = quit");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Play,
    Stats,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "play" => Some(Self::Play),
            "stats" => Some(Self::Stats),
            _ => None,
        }
    }
}

struct Args {
    db_url: String,
    api_key: Option<String>,
    catalog_url: Option<String>,
    answer_delay: Option<Duration>,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut parsed = Self {
            db_url: normalize_sqlite_url(
                std::env::var("QUIZ_DB_URL").unwrap_or_else(|_| "sqlite:quiz.sqlite3".into()),
            ),
            api_key: None,
            catalog_url: None,
            answer_delay: None,
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    parsed.db_url = normalize_sqlite_url(value);
                }
                "--api-key" => parsed.api_key = Some(require_value(args, "--api-key")?),
                "--catalog-url" => {
                    parsed.catalog_url = Some(require_value(args, "--catalog-url")?);
                }
                "--delay-ms" => {
                    let value = require_value(args, "--delay-ms")?;
                    let ms: u64 = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidDelay { raw: value.clone() })?;
                    parsed.answer_delay = Some(Duration::from_millis(ms));
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

    /// Flags win over `QUIZ_*` environment variables.
    fn catalog_config(&self) -> Result<CatalogConfig, ArgsError> {
        let mut config = match (&self.api_key, CatalogConfig::from_env()) {
            (Some(key), Some(mut env)) => {
                env.api_key.clone_from(key);
                env
            }
            (Some(key), None) => CatalogConfig::new(key.clone()),
            (None, Some(env)) => env,
            (None, None) => return Err(ArgsError::MissingApiKey),
        };
        if let Some(url) = &self.catalog_url {
            config.base_url.clone_from(url);
        }
        Ok(config)
    }

    fn session_config(&self) -> SessionConfig {
        let config = SessionConfig::default();
        match self.answer_delay {
            Some(delay) => config.with_answer_delay(delay),
            None => config,
        }
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

/// Text-only presentation: prints every session event to stdout.
struct ConsoleObserver;

impl QuizObserver for ConsoleObserver {
    fn on_loading_started(&self) {
        println!("Loading movies...");
    }

    fn on_loading_finished(&self) {}

    fn on_network_error(&self, message: &str) {
        println!("Could not load movies: {message}");
        println!("Type r to try again.");
    }

    fn on_question_ready(&self, image: &[u8], prompt: &str, progress: &str) {
        println!();
        if image.is_empty() {
            println!("[{progress}] (no poster)");
        } else {
            println!("[{progress}] (poster, {} bytes)", image.len());
        }
        println!("{prompt} [y/n]");
    }

    fn on_answer_outcome(&self, is_correct: bool) {
        println!("{}", if is_correct { "Correct!" } else { "Wrong." });
    }

    fn on_input_enabled(&self, _enabled: bool) {}

    fn on_round_summary(&self, title: &str, body: &str, action_label: &str) {
        println!();
        println!("{title}");
        println!("{body}");
        println!("{action_label}? Type r.");
    }
}

async fn play(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let services = AppServices::new_sqlite(
        &args.db_url,
        Clock::system(),
        args.catalog_config()?,
        args.session_config(),
    )
    .await?;
    let controller = services.spawn_session(Arc::new(ConsoleObserver));
    controller.start();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" => controller.submit_answer(true),
            "n" | "no" => controller.submit_answer(false),
            "r" | "restart" => controller.request_restart(),
            "q" | "quit" => break,
            "" => {}
            other => println!("unknown input `{other}`: y, n, r or q"),
        }
    }

    info!("leaving quiz");
    Ok(())
}

async fn stats(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let storage = Storage::sqlite(&args.db_url).await?;
    let statistics = StatisticsService::new(Clock::system(), storage.kv);
    println!("{}", statistics.summary_text().await?);
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // No subcommand means play.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Play,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Play,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let parsed = Args::parse(&mut argv.into_iter()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    prepare_sqlite_file(&parsed.db_url)?;

    match cmd {
        Command::Play => play(&parsed).await,
        Command::Stats => stats(&parsed).await,
    }
}

#[tokio::main]
async fn main() {
    pretty_env_logger::init();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
