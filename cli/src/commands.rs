use std::io::Write;
use std::sync::Arc;

use tokio::sync::mpsc;
use wellness_core::context::{AppConfigExt, config_path};
use wellness_core::exercise::{WorkoutItem, group_by_category};
use wellness_core::session::{SessionHandle, SessionOptions, SessionService};
use wellness_core::store::{TomlStore, load_day, spawn_completion_writer};

use crate::context::CliContext;
use crate::date::{local_today, parse_date};
use crate::display::{describe_target, render, spawn_display};

// ─────────────────────────────────────────────────────────────────────────────
// Workout Data
// ─────────────────────────────────────────────────────────────────────────────

pub async fn list(ctx: &CliContext) -> Result<(), String> {
    let date = ctx.date().await;
    let exercises = load_day(ctx.store().await.as_ref(), date).map_err(|e| e.to_string())?;

    if exercises.is_empty() {
        println!("No exercises scheduled for {date}");
        return Ok(());
    }

    println!("Workout for {date}");
    for item in group_by_category(exercises) {
        match item {
            WorkoutItem::Header(category) => println!("\n{}", category.label()),
            WorkoutItem::Exercise(exercise) => {
                let done = if exercise.is_completed { "x" } else { " " };
                println!(
                    "  [{}] {:<30} {}",
                    done,
                    exercise.name,
                    describe_target(&exercise)
                );
            }
        }
    }
    Ok(())
}

pub async fn summary(ctx: &CliContext) -> Result<(), String> {
    let date = ctx.date().await;
    let summary = ctx
        .store()
        .await
        .completion_summary(date)
        .map_err(|e| e.to_string())?;

    let marker = if summary.is_all_done() { " - all done!" } else { "" };
    println!(
        "{}: {} of {} exercises complete{}",
        date, summary.completed, summary.total, marker
    );
    Ok(())
}

/// Days that have a workout file in the configured directory
pub async fn days(ctx: &CliContext) -> Result<(), String> {
    let dir = ctx.config.read().await.workout_directory.clone();
    let days = TomlStore::new(&dir).days().map_err(|e| e.to_string())?;

    if days.is_empty() {
        println!("No workout files in {dir}");
        return Ok(());
    }
    let current = ctx.date().await;
    for day in days {
        let marker = if day == current { " *" } else { "" };
        println!("{day}{marker}");
    }
    Ok(())
}

pub async fn set_day(day: &str, ctx: &CliContext) -> Result<(), String> {
    if ctx.session().await.is_some() {
        return Err("Finish or stop the running session before changing day".to_string());
    }
    let date = parse_date(day, local_today())?;
    ctx.set_date(date).await;
    println!("Day set to {date}");
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Session Lifecycle
// ─────────────────────────────────────────────────────────────────────────────

pub async fn start(ctx: &CliContext) -> Result<(), String> {
    if ctx.session().await.is_some() {
        return Err("A session is already running (use `stop` to leave it)".to_string());
    }

    let date = ctx.date().await;
    let store = ctx.store().await;
    let exercises = load_day(store.as_ref(), date).map_err(|e| e.to_string())?;
    let options = SessionOptions::from(&*ctx.config.read().await);

    tracing::info!(%date, exercises = exercises.len(), "Starting workout session");

    let (completion_tx, completion_rx) = mpsc::unbounded_channel();
    let writer = spawn_completion_writer(Arc::clone(&store), date, completion_rx);
    let (service, handle) = SessionService::new(exercises, options, completion_tx);
    let display = spawn_display(handle.subscribe());
    let session = tokio::spawn(service.run());

    {
        let mut tasks = ctx.tasks.lock().await;
        tasks.session = Some(session);
        tasks.completion_writer = Some(writer);
        tasks.display = Some(display);
    }
    ctx.set_session(handle).await;
    Ok(())
}

pub async fn status(ctx: &CliContext) -> Result<(), String> {
    let handle = require_session(ctx).await?;
    println!("{}", render(&handle.snapshot()));
    Ok(())
}

pub async fn stop(ctx: &CliContext) -> Result<(), String> {
    let handle = require_session(ctx).await?;
    handle.request_exit().await.map_err(|e| e.to_string())
}

/// Answer the pending prompt, then flush the session if that ended it
pub async fn answer(yes: bool, ctx: &CliContext) -> Result<(), String> {
    let handle = require_session(ctx).await?;
    if handle.snapshot().pending_prompt.is_none() {
        return Err("Nothing to answer".to_string());
    }

    let mut snapshots = handle.subscribe();
    snapshots.borrow_and_update();
    handle.answer(yes).await.map_err(|e| e.to_string())?;
    drop(handle);

    // Closed channel means the service already returned
    let ended = match snapshots.changed().await {
        Ok(()) => snapshots.borrow().finished,
        Err(_) => true,
    };
    if ended {
        ctx.clear_session().await;
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Session Controls
// ─────────────────────────────────────────────────────────────────────────────

pub async fn done(ctx: &CliContext) -> Result<(), String> {
    let handle = require_session(ctx).await?;
    handle.complete_set().await.map_err(|e| e.to_string())
}

pub async fn next(ctx: &CliContext) -> Result<(), String> {
    let handle = require_session(ctx).await?;
    handle.next_set().await.map_err(|e| e.to_string())
}

pub async fn prev(ctx: &CliContext) -> Result<(), String> {
    let handle = require_session(ctx).await?;
    handle.previous_set().await.map_err(|e| e.to_string())
}

pub async fn pause(ctx: &CliContext) -> Result<(), String> {
    let handle = require_session(ctx).await?;
    handle.toggle_pause().await.map_err(|e| e.to_string())
}

pub async fn skip(ctx: &CliContext) -> Result<(), String> {
    let handle = require_session(ctx).await?;
    handle.skip_rest().await.map_err(|e| e.to_string())
}

pub async fn suspend(ctx: &CliContext) -> Result<(), String> {
    let handle = require_session(ctx).await?;
    handle.suspend().await.map_err(|e| e.to_string())
}

pub async fn reps(count: &str, ctx: &CliContext) -> Result<(), String> {
    let handle = require_session(ctx).await?;
    handle.set_reps(count).await.map_err(|e| e.to_string())
}

pub async fn plus(ctx: &CliContext) -> Result<(), String> {
    let handle = require_session(ctx).await?;
    handle.increment_reps().await.map_err(|e| e.to_string())
}

pub async fn minus(ctx: &CliContext) -> Result<(), String> {
    let handle = require_session(ctx).await?;
    handle.decrement_reps().await.map_err(|e| e.to_string())
}

async fn require_session(ctx: &CliContext) -> Result<SessionHandle, String> {
    ctx.session()
        .await
        .ok_or_else(|| "No session running (use `start`)".to_string())
}

// ─────────────────────────────────────────────────────────────────────────────
// Settings
// ─────────────────────────────────────────────────────────────────────────────

pub async fn show_settings(ctx: &CliContext) -> Result<(), String> {
    let config = ctx.config.read().await;
    let path = config_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|e| format!("unavailable ({e})"));

    println!("Config file:       {path}");
    println!("Workout directory: {}", config.workout_directory);
    println!("Tick interval:     {}ms", config.tick_interval_ms());
    println!("Auto-start timers: {}", config.auto_start_timers);
    println!("Day:               {}", ctx.date().await);
    Ok(())
}

pub async fn set_directory(path: &str, ctx: &CliContext) -> Result<(), String> {
    let mut config = ctx.config.write().await;
    config.workout_directory = path.to_string();
    config.save().map_err(|e| e.to_string())?;
    println!("Workout directory set to {path}");
    Ok(())
}

pub async fn set_auto_start(enabled: bool, ctx: &CliContext) -> Result<(), String> {
    let mut config = ctx.config.write().await;
    config.auto_start_timers = enabled;
    config.save().map_err(|e| e.to_string())?;
    println!("Auto-start timers: {enabled} (applies to the next session)");
    Ok(())
}

pub fn exit() -> Result<(), String> {
    writeln!(std::io::stdout(), "quitting...").map_err(|e| e.to_string())?;
    std::io::stdout().flush().map_err(|e| e.to_string())
}
