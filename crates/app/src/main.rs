use std::fmt;
use std::io::{BufRead, Write};
use std::sync::Arc;

use math_core::model::{Grade, InputMode, LevelId, Problem, User, UserId};
use math_core::session::PracticeSession;
use services::{
    Clock, CompleteLevel, CompletionOutcome, OverviewService, PracticeService, ProblemGenerator,
    SeedService, SubmitAnswer,
};
use storage::repository::Storage;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidUserId { raw: String },
    InvalidLevelId { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidUserId { raw } => write!(f, "invalid --user value: {raw}"),
            ArgsError::InvalidLevelId { raw } => write!(f, "invalid --level value: {raw}"),
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
    eprintln!("  cargo run -p app -- seed [--db <sqlite_url>]");
    eprintln!("  cargo run -p app -- play [--db <sqlite_url>] [--user <uuid>] [--level <uuid>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite:dev.sqlite3");
    eprintln!("  --user  first profile in the database");
    eprintln!("  --level next uncompleted level for the profile's grade");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  MATH_DB_URL");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Seed,
    Play,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "seed" => Some(Self::Seed),
            "play" => Some(Self::Play),
            _ => None,
        }
    }
}

struct Args {
    db_url: String,
    user_id: Option<UserId>,
    level_id: Option<LevelId>,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("MATH_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://dev.sqlite3".into(), normalize_sqlite_url);
        let mut user_id = None;
        let mut level_id = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--user" => {
                    let value = require_value(args, "--user")?;
                    let parsed = value
                        .parse::<UserId>()
                        .map_err(|_| ArgsError::InvalidUserId { raw: value.clone() })?;
                    user_id = Some(parsed);
                }
                "--level" => {
                    let value = require_value(args, "--level")?;
                    let parsed = value
                        .parse::<LevelId>()
                        .map_err(|_| ArgsError::InvalidLevelId { raw: value.clone() })?;
                    level_id = Some(parsed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            user_id,
            level_id,
        })
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

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    let cmd = match argv.first().map(String::as_str) {
        None | Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };
    argv.remove(0);

    let mut iter = argv.into_iter();
    let parsed = Args::parse(&mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    // Open + migrate SQLite at startup. Keep this in the binary glue so
    // core/services stay pure.
    prepare_sqlite_file(&parsed.db_url)?;
    let storage = Storage::sqlite(&parsed.db_url).await?;

    match cmd {
        Command::Seed => seed(&storage).await,
        Command::Play => play(&storage, parsed.user_id, parsed.level_id).await,
    }
}

async fn seed(storage: &Storage) -> Result<(), Box<dyn std::error::Error>> {
    let clock = Clock::default_clock();
    let seeder = SeedService::new(Arc::clone(&storage.levels));
    let mut generator = ProblemGenerator::new();

    let report = seeder.seed_all_grades(&mut generator).await?;
    println!(
        "seed: {} levels, {} problems created.",
        report.levels_created, report.problems_created
    );

    // A demo profile so `play` works out of the box.
    if storage.users.list_users(1).await?.is_empty() {
        let user = User::new(UserId::generate(), "Demo", "\u{1f98a}", Grade::First, clock.now())?;
        storage.users.insert_user(&user).await?;
        println!("seed: demo profile {} ({}).", user.name(), user.id());
    }

    Ok(())
}

async fn resolve_user(
    storage: &Storage,
    user_id: Option<UserId>,
) -> Result<User, Box<dyn std::error::Error>> {
    if let Some(id) = user_id {
        return Ok(storage.users.get_user(id).await?);
    }
    let users = storage.users.list_users(1).await?;
    users
        .into_iter()
        .next()
        .ok_or_else(|| "no profiles in the database; run `seed` first".into())
}

async fn play(
    storage: &Storage,
    user_id: Option<UserId>,
    level_id: Option<LevelId>,
) -> Result<(), Box<dyn std::error::Error>> {
    let clock = Clock::default_clock();
    let user = resolve_user(storage, user_id).await?;

    let overview = OverviewService::new(
        Arc::clone(&storage.users),
        Arc::clone(&storage.levels),
        Arc::clone(&storage.progress),
    )
    .load(user.id())
    .await?;

    let level_id = match level_id.or_else(|| overview.next_level()) {
        Some(id) => id,
        None => {
            println!(
                "{} has completed every {} level. \u{1f389}",
                user.name(),
                user.grade().display_name()
            );
            return Ok(());
        }
    };
    let level = storage.levels.get_level(level_id).await?;
    let problems = storage.levels.problems_for_level(level_id).await?;
    if problems.is_empty() {
        return Err("level has no problems; run `seed` first".into());
    }

    let service = PracticeService::new(
        clock,
        Arc::clone(&storage.users),
        Arc::clone(&storage.levels),
        Arc::clone(&storage.attempts),
        Arc::clone(&storage.progress),
    );

    println!(
        "{} {}: {} ({} problems, {})",
        user.avatar(),
        user.name(),
        level.name(),
        level.problem_count(),
        user.grade().display_name()
    );
    println!();

    let mut session = PracticeSession::new(user.grade(), problems.len())?;
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        let problem = &problems[session.current_index()];
        loop {
            prompt_problem(&session, problem, session.current_index() + 1)?;

            let Some(answer) = read_answer(&mut lines)? else {
                println!("bye!");
                return Ok(());
            };

            let outcome = service
                .submit_answer(SubmitAnswer {
                    user_id: user.id(),
                    level_id,
                    problem_id: problem.id(),
                    answer,
                    is_second_attempt: session.is_showing_second_chance(),
                })
                .await?;
            session.apply(outcome.graded());

            if outcome.is_correct {
                println!("  Correct!");
                break;
            }
            if outcome.offers_second_chance {
                session.try_again()?;
                println!("  Not quite. Try once more.");
                continue;
            }
            println!("  The answer was {}.", outcome.correct_answer);
            break;
        }

        if session.is_last_problem() {
            break;
        }
        session.advance()?;
        println!();
    }

    println!();
    println!(
        "Done: {}/{} correct ({}%).",
        session.score(),
        session.total_answered(),
        session.accuracy_percent()
    );

    let completion = service
        .complete_level(CompleteLevel {
            user_id: user.id(),
            level_id,
        })
        .await?;
    match completion {
        CompletionOutcome::Completed { completed_at } => {
            println!("Level complete! ({completed_at})");
        }
        CompletionOutcome::NeedsMorePractice => {
            println!("Below 80% for this level. Play it again to pass.");
        }
    }

    Ok(())
}

fn prompt_problem(
    session: &PracticeSession,
    problem: &Problem,
    number: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Problem {number}: {}", problem.question());
    if session.shows_hints() {
        println!("  Hint: count it out on your fingers, one number at a time.");
    }
    match session.input_mode() {
        InputMode::MultipleChoice => {
            let choices: Vec<String> = problem.options().iter().map(i64::to_string).collect();
            println!("  Choices: {}", choices.join("  "));
        }
        InputMode::Keyboard => {}
    }
    print!("> ");
    std::io::stdout().flush()?;
    Ok(())
}

/// Reads one answer line; `None` means end of input or a quit request.
fn read_answer(
    lines: &mut impl Iterator<Item = std::io::Result<String>>,
) -> Result<Option<i64>, Box<dyn std::error::Error>> {
    loop {
        let Some(line) = lines.next() else {
            return Ok(None);
        };
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.eq_ignore_ascii_case("q") || trimmed.eq_ignore_ascii_case("quit") {
            return Ok(None);
        }
        match trimmed.parse::<i64>() {
            Ok(answer) => return Ok(Some(answer)),
            Err(_) => {
                print!("  numbers only > ");
                std::io::stdout().flush()?;
            }
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
