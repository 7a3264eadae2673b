use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use tokio::task;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::session::SessionRunner;

/// Process-wide cooperative stop signal: written once, read by every session
/// loop at its next check. No in-flight browser call is interrupted.
#[derive(Debug, Default)]
pub struct ShutdownFlag {
    requested: AtomicBool,
}

impl ShutdownFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    /// Sleep for `duration`, waking early once shutdown is requested.
    /// Returns whether the pause was interrupted.
    pub fn pause(&self, duration: Duration) -> bool {
        const SLICE: Duration = Duration::from_millis(100);
        let mut remaining = duration;
        while !remaining.is_zero() {
            if self.is_requested() {
                return true;
            }
            let step = remaining.min(SLICE);
            thread::sleep(step);
            remaining = remaining.saturating_sub(step);
        }
        self.is_requested()
    }
}

/// Owns the fleet of simulated user sessions: parallel launch, concurrent
/// loops, and teardown of every session once all loops have exited.
pub struct BrowserPool {
    config: Arc<Config>,
    shutdown: Arc<ShutdownFlag>,
}

impl BrowserPool {
    pub fn new(config: Arc<Config>) -> Self {
        Self {
            config,
            shutdown: Arc::new(ShutdownFlag::new()),
        }
    }

    /// Handle for signal handlers to request a graceful stop.
    pub fn shutdown_flag(&self) -> Arc<ShutdownFlag> {
        Arc::clone(&self.shutdown)
    }

    /// Launch every session, run their loops to completion, then close every
    /// session. Resolves only once all loops have exited, whether naturally
    /// or through a shutdown request. A launch failure closes whatever did
    /// launch and is fatal.
    pub async fn run(&self) -> Result<()> {
        let count = self.config.session_count;
        info!(sessions = count, "Starting browser pool");

        let launches: Vec<_> = (1..=count)
            .map(|id| {
                let config = Arc::clone(&self.config);
                let shutdown = Arc::clone(&self.shutdown);
                task::spawn_blocking(move || SessionRunner::launch(id, config, shutdown))
            })
            .collect();

        let mut sessions = Vec::with_capacity(launches.len());
        let mut launch_error = None;
        for launch in launches {
            match launch.await {
                Ok(Ok(session)) => sessions.push(session),
                Ok(Err(err)) => launch_error = Some(err),
                Err(err) => launch_error = Some(anyhow!("session launch task panicked: {err}")),
            }
        }
        if let Some(err) = launch_error {
            error!(error = %err, "Session launch failed, shutting down pool");
            self.shutdown.request();
            Self::close_all(sessions).await;
            return Err(err).context("browser pool failed to start");
        }

        let loops: Vec<_> = sessions
            .into_iter()
            .map(|mut session| {
                task::spawn_blocking(move || {
                    let result = session.run_loop();
                    (session, result)
                })
            })
            .collect();

        let mut failure = None;
        let mut finished = Vec::with_capacity(loops.len());
        for handle in loops {
            match handle.await {
                Ok((session, Ok(()))) => finished.push(session),
                Ok((session, Err(err))) => {
                    error!(session = session.id(), error = %err, "Session loop aborted");
                    self.shutdown.request();
                    failure = Some(err);
                    finished.push(session);
                }
                Err(err) => {
                    self.shutdown.request();
                    failure = Some(anyhow!("session loop task panicked: {err}"));
                }
            }
        }

        Self::close_all(finished).await;

        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Flush and close each session in turn. `close` contains its own
    /// errors, so one stubborn session never blocks the rest.
    async fn close_all(sessions: Vec<SessionRunner>) {
        for session in sessions {
            let id = session.id();
            if let Err(err) = task::spawn_blocking(move || session.close()).await {
                warn!(session = id, error = %err, "Session close task panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn pause_completes_when_shutdown_is_not_requested() {
        let flag = ShutdownFlag::new();
        let started = Instant::now();
        assert!(!flag.pause(Duration::from_millis(150)));
        assert!(started.elapsed() >= Duration::from_millis(150));
    }

    #[test]
    fn pause_returns_early_once_requested() {
        let flag = Arc::new(ShutdownFlag::new());
        let waiter = Arc::clone(&flag);
        let handle = thread::spawn(move || {
            let started = Instant::now();
            let interrupted = waiter.pause(Duration::from_secs(30));
            (interrupted, started.elapsed())
        });

        thread::sleep(Duration::from_millis(300));
        flag.request();

        let (interrupted, elapsed) = handle.join().expect("pause thread");
        assert!(interrupted);
        assert!(elapsed < Duration::from_secs(5), "pause took {elapsed:?}");
    }

    #[test]
    fn requested_flag_is_visible_to_all_readers() {
        let flag = Arc::new(ShutdownFlag::new());
        assert!(!flag.is_requested());
        flag.request();
        assert!(flag.is_requested());
        assert!(Arc::clone(&flag).is_requested());
        // A paused caller observes the request immediately.
        assert!(flag.pause(Duration::from_secs(1)));
    }
}
