use tokio::task::JoinHandle;

use crate::session::SessionSnapshot;

/// Tasks spawned for the active session
#[derive(Default)]
pub struct BackgroundTasks {
    pub session: Option<JoinHandle<SessionSnapshot>>,
    pub completion_writer: Option<JoinHandle<()>>,
    pub display: Option<JoinHandle<()>>,
}

impl BackgroundTasks {
    /// Wait for the session and its writer to wind down on their own.
    ///
    /// The writer exits once the session drops its completion sender, so
    /// pending completion writes are flushed before this returns.
    pub async fn join_all(&mut self) -> Option<SessionSnapshot> {
        let last = match self.session.take() {
            Some(handle) => handle.await.ok(),
            None => None,
        };
        if let Some(handle) = self.completion_writer.take() {
            let _ = handle.await;
        }
        if let Some(handle) = self.display.take() {
            handle.abort();
        }
        last
    }

    pub async fn abort_all(&mut self) {
        if let Some(handle) = self.display.take() {
            handle.abort();
        }
        if let Some(handle) = self.session.take() {
            handle.abort();
        }
        // Let queued completion writes land before dropping the writer
        if let Some(handle) = self.completion_writer.take() {
            let _ = handle.await;
        }
    }
}
