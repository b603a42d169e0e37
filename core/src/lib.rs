pub mod context;
pub mod exercise;
pub mod session;
pub mod store;
pub mod timers;

// Re-exports for convenience
pub use context::{AppConfig, AppConfigExt, BackgroundTasks, ConfigError};
pub use exercise::{
    Category, Exercise, ExerciseError, ExerciseTarget, WorkoutItem, group_by_category,
    sort_for_session,
};
pub use session::{
    Prompt, SessionCommand, SessionController, SessionError, SessionHandle, SessionMode,
    SessionOptions, SessionService, SessionSnapshot, SetPosition,
};
pub use store::{
    CompletionRequest, CompletionSummary, ExerciseStore, MemoryStore, StoreError, TomlStore,
    load_day, spawn_completion_writer,
};
pub use timers::{Countdown, TimerEvent, format_clock};
