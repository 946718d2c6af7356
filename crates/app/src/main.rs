use std::fmt;
use std::path::Path;
use std::sync::Arc;

use interview_core::model::ProfileDraft;
use interview_core::timing::{format_countdown, is_running_low};
use services::{
    ApiConfig, Countdown, FlowError, FlowPhase, HttpInterviewApi, InterviewApi, InterviewFlow,
    InterviewScreen, QuestionPrompt, SubmissionStatus, TimerEvent,
};
use storage::Storage;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
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
    eprintln!("  cargo run -p app -- [--db <sqlite_url>] [--api-url <url>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite://interview.sqlite3");
    eprintln!("  --api-url {}", ApiConfig::DEFAULT_BASE_URL);
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  INTERVIEW_DB_URL, INTERVIEW_API_BASE_URL, INTERVIEW_API_TIMEOUT_SECS, RUST_LOG");
    eprintln!();
    eprintln!("During the interview:");
    eprintln!("  <text>         submit the answer");
    eprintln!("  :next [text]   move on, keeping any text");
    eprintln!("  :pause         save progress and quit");
}

struct Args {
    db_url: String,
    api_url: Option<String>,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("INTERVIEW_DB_URL")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map_or_else(|| "sqlite://interview.sqlite3".into(), normalize_sqlite_url);
        let mut api_url = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--api-url" => {
                    api_url = Some(require_value(args, "--api-url")?);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self { db_url, api_url })
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
    let path = Path::new(&path_str);
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

    let path = Path::new(path);
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

//
// ─── CONSOLE ──────────────────────────────────────────────────────────────────
//

struct Console {
    lines: Lines<BufReader<Stdin>>,
}

impl Console {
    fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// Next input line, `None` on end of input.
    async fn read_line(&mut self) -> std::io::Result<Option<String>> {
        self.lines.next_line().await
    }

    async fn ask(&mut self, label: &str) -> std::io::Result<Option<String>> {
        println!("{label}");
        self.read_line().await
    }
}

enum Step {
    Input(Option<String>),
    Timer(Option<TimerEvent>),
}

//
// ─── SCREENS ──────────────────────────────────────────────────────────────────
//

/// Returns `false` when the candidate closed the input.
async fn decide_resume(
    flow: &mut InterviewFlow,
    console: &mut Console,
) -> Result<bool, Box<dyn std::error::Error>> {
    let Some(prompt) = flow.resume_prompt().cloned() else {
        return Ok(true);
    };
    println!(
        "Welcome back, {}! You have answered {} question(s).",
        prompt.candidate_name, prompt.answered
    );

    loop {
        let Some(choice) = console.ask("[r] resume  [n] start new").await? else {
            return Ok(false);
        };
        match choice.trim() {
            "r" | "R" => {
                flow.resume_interview().await?;
                return Ok(true);
            }
            "n" | "N" => {
                flow.start_new_interview().await;
                return Ok(true);
            }
            _ => println!("Please type r or n."),
        }
    }
}

async fn upload(
    flow: &mut InterviewFlow,
    console: &mut Console,
) -> Result<bool, Box<dyn std::error::Error>> {
    while flow.phase() == FlowPhase::Upload {
        let Some(raw) = console.ask("Path to your resume (.pdf or .docx):").await? else {
            return Ok(false);
        };
        let raw = raw.trim();
        if raw.is_empty() {
            println!("Please select a file.");
            continue;
        }
        let path = Path::new(raw);
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(err) => {
                println!("Cannot read {raw}: {err}");
                continue;
            }
        };

        println!("Uploading...");
        match flow.upload_resume(&filename, bytes).await {
            Ok(_) => println!("Resume uploaded."),
            Err(err) => println!("{err}"),
        }
    }
    Ok(true)
}

async fn ask_field(
    console: &mut Console,
    label: &str,
    current: &str,
) -> std::io::Result<Option<String>> {
    let line = if current.is_empty() {
        console.ask(&format!("{label}:")).await?
    } else {
        console.ask(&format!("{label} [{current}]:")).await?
    };
    Ok(line.map(|value| {
        if value.trim().is_empty() {
            current.to_string()
        } else {
            value
        }
    }))
}

async fn confirm_profile(
    flow: &mut InterviewFlow,
    console: &mut Console,
) -> Result<bool, Box<dyn std::error::Error>> {
    while flow.phase() == FlowPhase::Profile {
        let draft = flow.profile_draft().clone();
        let missing = draft.missing_fields();
        if !missing.is_empty() {
            let names: Vec<String> = missing.iter().map(ToString::to_string).collect();
            println!("Please fill in: {}", names.join(", "));
        }

        let Some(name) = ask_field(console, "Name", &draft.name).await? else {
            return Ok(false);
        };
        let Some(email) = ask_field(console, "Email", &draft.email).await? else {
            return Ok(false);
        };
        let Some(phone) = ask_field(console, "Phone", &draft.phone).await? else {
            return Ok(false);
        };

        match flow.confirm_profile(ProfileDraft::new(name, email, phone)).await {
            Ok(()) => {}
            Err(FlowError::Invalid(err)) => println!("{err}"),
            Err(err) => return Err(err.into()),
        }
    }
    Ok(true)
}

async fn pause(flow: &mut InterviewFlow) -> Result<(), Box<dyn std::error::Error>> {
    flow.leave_interview().await?;
    println!("Progress saved. Run again to resume.");
    Ok(())
}

/// Ask one question while racing the countdown. Returns `false` when the
/// candidate paused.
async fn ask_question(
    flow: &mut InterviewFlow,
    console: &mut Console,
    countdown: &mut Countdown,
    prompt: &QuestionPrompt,
) -> Result<bool, Box<dyn std::error::Error>> {
    println!();
    println!(
        "Question {}/{} [{}]",
        prompt.number, prompt.total, prompt.difficulty
    );
    println!("{}", prompt.text);

    let start = flow.begin_question().await?;
    countdown.start(start);
    println!("{} left", format_countdown(start));

    loop {
        let step = tokio::select! {
            line = console.read_line() => Step::Input(line?),
            event = countdown.next_event(), if countdown.is_running() => Step::Timer(event),
        };

        match step {
            Step::Input(None) => {
                countdown.cancel();
                pause(flow).await?;
                return Ok(false);
            }
            Step::Input(Some(line)) => {
                let trimmed = line.trim();
                if trimmed == ":pause" {
                    countdown.cancel();
                    pause(flow).await?;
                    return Ok(false);
                }
                let result = match trimmed.strip_prefix(":next") {
                    Some(rest) => flow.next_question(rest).await,
                    None => flow.submit_answer(trimmed).await,
                };
                match result {
                    Ok(()) => break,
                    Err(FlowError::EmptyAnswer) => {
                        println!("Type an answer, or :next to skip.");
                    }
                    Err(err) => return Err(err.into()),
                }
            }
            Step::Timer(Some(TimerEvent::Tick { remaining_secs })) => {
                flow.record_tick(remaining_secs).await;
                if remaining_secs > 0
                    && (remaining_secs % 10 == 0
                        || is_running_low(remaining_secs, prompt.budget_secs))
                {
                    println!("{} left", format_countdown(remaining_secs));
                }
            }
            Step::Timer(Some(TimerEvent::Expired) | None) => {
                println!("Time's up.");
                flow.time_up("").await?;
                break;
            }
        }
    }

    countdown.cancel();
    Ok(true)
}

async fn interview(
    flow: &mut InterviewFlow,
    console: &mut Console,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut countdown = Countdown::new();

    loop {
        match flow.screen() {
            InterviewScreen::AwaitingAnswer(prompt) => {
                if !ask_question(flow, console, &mut countdown, &prompt).await? {
                    return Ok(());
                }
            }
            InterviewScreen::Loading => {
                println!("Loading questions...");
                flow.retry().await?;
            }
            InterviewScreen::Error { message } => {
                println!("Could not load questions: {message}");
                let Some(line) = console.ask("Press enter to retry, or :pause to quit.").await?
                else {
                    return pause(flow).await;
                };
                if line.trim() == ":pause" {
                    return pause(flow).await;
                }
                flow.retry().await?;
            }
            InterviewScreen::Completed(summary) => {
                println!();
                println!(
                    "Interview complete: {} of {} questions answered, {} skipped or timed out.",
                    summary.answered, summary.total, summary.unattended
                );
                match summary.submission {
                    SubmissionStatus::Submitted(result) => {
                        println!("Score: {:.0}", result.score);
                        println!("{}", result.summary);
                        return Ok(());
                    }
                    SubmissionStatus::Failed { message } => {
                        println!("Submitting your answers failed: {message}");
                        if console.ask("Press enter to retry.").await?.is_none() {
                            return Ok(());
                        }
                        flow.retry().await?;
                    }
                    SubmissionStatus::Pending => {
                        flow.retry().await?;
                    }
                }
            }
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let parsed = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let mut config = ApiConfig::from_env()?;
    if let Some(api_url) = parsed.api_url.as_deref() {
        config = ApiConfig::new(api_url)?.with_timeout(config.timeout());
    }

    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    prepare_sqlite_file(&parsed.db_url)?;
    let storage = Storage::sqlite(&parsed.db_url).await?;
    tracing::info!(db = %parsed.db_url, api = config.base_url(), "starting interview client");

    let api: Arc<dyn InterviewApi> = Arc::new(HttpInterviewApi::new(config)?);
    let mut flow = InterviewFlow::start(&storage, api).await;
    let mut console = Console::new();

    if !decide_resume(&mut flow, &mut console).await? {
        return Ok(());
    }
    if !upload(&mut flow, &mut console).await? {
        return Ok(());
    }
    if !confirm_profile(&mut flow, &mut console).await? {
        return Ok(());
    }
    interview(&mut flow, &mut console).await
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
