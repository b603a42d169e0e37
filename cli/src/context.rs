use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::{Mutex, RwLock};
use wellness_core::context::{AppConfig, AppConfigExt, BackgroundTasks};
use wellness_core::session::SessionHandle;
use wellness_core::store::{ExerciseStore, TomlStore};

/// Holds all shared state for the CLI application.
/// This is a lightweight container - logic lives in the commands.
#[derive(Clone)]
pub struct CliContext {
    pub config: Arc<RwLock<AppConfig>>,
    /// Day whose workout `list`, `start` and `summary` operate on
    date: Arc<RwLock<NaiveDate>>,
    /// The running session. None until `start`, and again once it ends.
    session: Arc<RwLock<Option<SessionHandle>>>,
    pub tasks: Arc<Mutex<BackgroundTasks>>,
}

impl CliContext {
    pub fn new(date: NaiveDate, workout_directory: Option<String>) -> Self {
        let mut config = AppConfig::load();
        if let Some(dir) = workout_directory {
            config.workout_directory = dir;
        }
        Self::with_config(config, date)
    }

    pub fn with_config(config: AppConfig, date: NaiveDate) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
            date: Arc::new(RwLock::new(date)),
            session: Arc::new(RwLock::new(None)),
            tasks: Arc::new(Mutex::new(BackgroundTasks::default())),
        }
    }

    pub async fn date(&self) -> NaiveDate {
        *self.date.read().await
    }

    pub async fn set_date(&self, date: NaiveDate) {
        *self.date.write().await = date;
    }

    /// Store over the configured workout directory
    pub async fn store(&self) -> Arc<dyn ExerciseStore> {
        let dir = self.config.read().await.workout_directory.clone();
        Arc::new(TomlStore::new(dir))
    }

    pub async fn set_session(&self, handle: SessionHandle) {
        *self.session.write().await = Some(handle);
    }

    /// The running session, if any. A session whose task has stopped is
    /// cleared here and its background tasks are joined.
    pub async fn session(&self) -> Option<SessionHandle> {
        let current = self.session.read().await.clone();
        match current {
            Some(handle) if !handle.is_closed() => Some(handle),
            Some(_) => {
                self.clear_session().await;
                None
            }
            None => None,
        }
    }

    /// Drop the session handle and wait for its tasks to wind down
    pub async fn clear_session(&self) {
        *self.session.write().await = None;
        self.tasks.lock().await.join_all().await;
    }
}
