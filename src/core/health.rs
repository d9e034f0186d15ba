//! Fixed-interval liveness polling.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::api::ChatBackend;

pub const DEFAULT_HEALTH_INTERVAL: Duration = Duration::from_secs(30);

/// Background task that probes the backend immediately and then once per
/// interval, publishing the latest result. A single failed probe flips the
/// flag to offline; there is no retry or backoff.
pub struct HealthMonitor {
    online: watch::Receiver<bool>,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl HealthMonitor {
    /// Spawn the poller. Must be called from within a tokio runtime.
    pub fn spawn(backend: Arc<dyn ChatBackend>, interval: Duration) -> Self {
        let (tx, online) = watch::channel(false);
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(poll(backend, interval, tx, cancel.clone()));
        Self {
            online,
            cancel,
            handle,
        }
    }

    pub fn is_online(&self) -> bool {
        *self.online.borrow()
    }

    /// A receiver that observes every change of the online flag.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.online.clone()
    }

    pub fn stop(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for HealthMonitor {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn poll(
    backend: Arc<dyn ChatBackend>,
    interval: Duration,
    tx: watch::Sender<bool>,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let online = tokio::select! {
            _ = cancel.cancelled() => break,
            online = backend.health_check() => online,
        };

        let changed = tx.send_if_modified(|current| {
            let changed = *current != online;
            *current = online;
            changed
        });
        if changed {
            info!(online, "backend liveness changed");
        } else {
            debug!(online, "health probe");
        }
    }
    debug!("health monitor stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, Chat, Message};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;

    /// Answers probes from a script, repeating the last answer once exhausted.
    struct ScriptedHealth {
        answers: StdMutex<VecDeque<bool>>,
        last: StdMutex<bool>,
        probes: AtomicUsize,
    }

    impl ScriptedHealth {
        fn new(answers: &[bool]) -> Arc<Self> {
            Arc::new(Self {
                answers: StdMutex::new(answers.iter().copied().collect()),
                last: StdMutex::new(false),
                probes: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl ChatBackend for ScriptedHealth {
        async fn list_chats(&self) -> Result<Vec<Chat>, ApiError> {
            unreachable!("health tests only probe")
        }

        async fn create_chat(&self, _title: &str) -> Result<Chat, ApiError> {
            unreachable!("health tests only probe")
        }

        async fn get_history(&self, _session_id: &str) -> Result<Vec<Message>, ApiError> {
            unreachable!("health tests only probe")
        }

        async fn send_message(&self, _session_id: &str, _content: &str) -> Result<Message, ApiError> {
            unreachable!("health tests only probe")
        }

        async fn health_check(&self) -> bool {
            self.probes.fetch_add(1, Ordering::SeqCst);
            let mut last = self.last.lock().unwrap();
            if let Some(next) = self.answers.lock().unwrap().pop_front() {
                *last = next;
            }
            *last
        }
    }

    async fn wait_for(rx: &mut watch::Receiver<bool>, expected: bool) {
        tokio::time::timeout(Duration::from_secs(2), rx.wait_for(|online| *online == expected))
            .await
            .expect("flag should change in time")
            .expect("monitor should still be running");
    }

    #[tokio::test]
    async fn first_probe_runs_immediately() {
        let backend = ScriptedHealth::new(&[true]);
        let monitor = HealthMonitor::spawn(backend.clone(), Duration::from_secs(3600));
        let mut rx = monitor.subscribe();

        wait_for(&mut rx, true).await;
        assert!(monitor.is_online());
        assert_eq!(backend.probes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn one_failed_probe_flips_offline() {
        let backend = ScriptedHealth::new(&[true, false, true]);
        let monitor = HealthMonitor::spawn(backend, Duration::from_millis(20));
        let mut rx = monitor.subscribe();

        wait_for(&mut rx, true).await;
        wait_for(&mut rx, false).await;
        wait_for(&mut rx, true).await;
    }

    #[tokio::test]
    async fn stop_ends_the_task() {
        let backend = ScriptedHealth::new(&[true]);
        let monitor = HealthMonitor::spawn(backend.clone(), Duration::from_millis(10));
        let mut rx = monitor.subscribe();
        wait_for(&mut rx, true).await;

        monitor.stop();
        tokio::time::timeout(Duration::from_secs(2), async {
            while !monitor.is_finished() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("monitor should stop");

        let probes = backend.probes.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(backend.probes.load(Ordering::SeqCst), probes);
    }
}
