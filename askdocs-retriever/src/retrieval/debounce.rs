//! Per-file debouncing of filesystem events.
//!
//! A single coordinator task owns the deadline map, so "replace the timer
//! for this file" is a plain map insert with no locking. File names arrive
//! on the events channel; once a name has been quiet for the whole window it
//! is emitted on the settled channel. When the event source closes, pending
//! deadlines are still allowed to fire before the task exits.

use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::trace;

/// Spawn the debounce coordinator.
pub fn spawn(
    window: Duration,
    events: mpsc::Receiver<String>,
    settled: mpsc::Sender<String>,
) -> JoinHandle<()> {
    tokio::spawn(run(window, events, settled))
}

async fn run(window: Duration, mut events: mpsc::Receiver<String>, settled: mpsc::Sender<String>) {
    let mut deadlines: HashMap<String, Instant> = HashMap::new();
    let mut closed = false;

    while !(closed && deadlines.is_empty()) {
        let next = deadlines.values().min().copied();

        tokio::select! {
            event = events.recv(), if !closed => match event {
                Some(name) => {
                    trace!("debounce reset for {name}");
                    deadlines.insert(name, Instant::now() + window);
                }
                None => closed = true,
            },
            _ = async {
                if let Some(at) = next {
                    tokio::time::sleep_until(at).await;
                }
            }, if next.is_some() => {
                let now = Instant::now();
                let due: Vec<String> = deadlines
                    .iter()
                    .filter(|&(_, at)| *at <= now)
                    .map(|(name, _)| name.clone())
                    .collect();

                for name in due {
                    deadlines.remove(&name);
                    trace!("debounce settled for {name}");
                    if settled.send(name).await.is_err() {
                        return;
                    }
                }
            }
        }
    }
}
