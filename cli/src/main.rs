use clap::{ArgAction, Parser, Subcommand};
use std::io::Write;
use wellness_cli::CliContext;
use wellness_cli::commands;
use wellness_cli::date::{local_today, parse_date};
use wellness_cli::logging;
use wellness_cli::readline;

#[derive(Parser)]
#[command(version, about = "Guided daily workout sessions")]
struct Args {
    /// Day to load: today, yesterday or YYYY-MM-DD
    #[arg(short, long, default_value = "today")]
    date: String,

    /// Workout directory, overriding the saved configuration for this run
    #[arg(long)]
    dir: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), String> {
    let _log_guard = logging::init();

    let args = Args::parse();
    let date = parse_date(&args.date, local_today())?;
    let ctx = CliContext::new(date, args.dir);

    println!("Wellness: workout for {date}. Type `help` for commands.");

    loop {
        let line = readline()?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match respond(line, &ctx).await {
            Ok(quit) => {
                if quit {
                    break;
                }
            }
            Err(err) => {
                writeln!(std::io::stdout(), "{err}").map_err(|e| e.to_string())?;
                std::io::stdout().flush().map_err(|e| e.to_string())?;
            }
        }
    }

    ctx.tasks.lock().await.abort_all().await;
    Ok(())
}

#[derive(Parser)]
#[command(about = "wellness")]
struct Repl {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the day's exercises grouped by category
    List,
    /// Completed vs. total exercises for the day
    Summary,
    /// Days with a workout file
    Days,
    /// Switch to another day (today, yesterday, YYYY-MM-DD)
    Day { date: String },
    /// Start a session over the day's exercises
    Start,
    Status,
    /// Finish the current set
    Done,
    Next,
    Prev,
    /// Play/pause the timer
    Pause,
    /// Skip the rest period
    Skip,
    /// Pause as if the app went to the background
    Suspend,
    /// Enter the rep count for the current set
    Reps { count: String },
    /// One more rep
    Plus,
    /// One rep fewer
    Minus,
    Yes,
    No,
    /// Leave the running session (asks for confirmation)
    Stop,
    Config,
    SetDirectory {
        #[arg(short, long)]
        path: String,
    },
    SetAutoStart {
        #[arg(action = ArgAction::Set)]
        enabled: bool,
    },
    Quit,
}

async fn respond(line: &str, ctx: &CliContext) -> Result<bool, String> {
    let mut args = shlex::split(line).ok_or("error: Invalid quoting")?;
    args.insert(0, "wellness".to_string());
    let repl = Repl::try_parse_from(args).map_err(|e| e.to_string())?;

    match &repl.command {
        Some(Commands::List) => commands::list(ctx).await?,
        Some(Commands::Summary) => commands::summary(ctx).await?,
        Some(Commands::Days) => commands::days(ctx).await?,
        Some(Commands::Day { date }) => commands::set_day(date, ctx).await?,
        Some(Commands::Start) => commands::start(ctx).await?,
        Some(Commands::Status) => commands::status(ctx).await?,
        Some(Commands::Done) => commands::done(ctx).await?,
        Some(Commands::Next) => commands::next(ctx).await?,
        Some(Commands::Prev) => commands::prev(ctx).await?,
        Some(Commands::Pause) => commands::pause(ctx).await?,
        Some(Commands::Skip) => commands::skip(ctx).await?,
        Some(Commands::Suspend) => commands::suspend(ctx).await?,
        Some(Commands::Reps { count }) => commands::reps(count, ctx).await?,
        Some(Commands::Plus) => commands::plus(ctx).await?,
        Some(Commands::Minus) => commands::minus(ctx).await?,
        Some(Commands::Yes) => commands::answer(true, ctx).await?,
        Some(Commands::No) => commands::answer(false, ctx).await?,
        Some(Commands::Stop) => commands::stop(ctx).await?,
        Some(Commands::Config) => commands::show_settings(ctx).await?,
        Some(Commands::SetDirectory { path }) => commands::set_directory(path, ctx).await?,
        Some(Commands::SetAutoStart { enabled }) => commands::set_auto_start(*enabled, ctx).await?,
        Some(Commands::Quit) => {
            commands::exit()?;
            return Ok(true);
        }
        None => {}
    }
    Ok(false)
}
