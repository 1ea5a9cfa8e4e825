//! Keeps the vector store consistent with the watched directory.
//!
//! Event flow, one stage per task:
//!
//! ```text
//! notify watcher thread → events channel → debounce coordinator
//!                                               ↓ settled names
//!                          listener (bounded concurrency) → IndexWriter
//!                                               ↓
//!                                 suggested-question regeneration
//! ```
//!
//! The watcher callback only filters and forwards file names; every decision
//! (debounce, exists-on-disk routing, regeneration) happens inside the
//! runtime where it can be tested with plain channels.

use anyhow::Result;
use futures::stream::StreamExt;
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::debounce;
use super::index_writer::IndexWriter;
use super::is_ignored_file;
use super::questions::QuestionExtractor;

/// How many settled files may be processed at once.
const MAX_CONCURRENT_SETTLES: usize = 16;

/// Settings for the synchronizer.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Directory to watch. Created if missing.
    pub docs_dir: PathBuf,
    /// Quiet period a file must observe before its last event settles.
    pub debounce: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            docs_dir: PathBuf::from("./docs"),
            debounce: Duration::from_millis(500),
        }
    }
}

/// Watches a directory and routes settled changes into the index writer.
pub struct DirectorySynchronizer {
    config: SyncConfig,
    writer: Arc<IndexWriter>,
    extractor: Arc<QuestionExtractor>,
}

/// Running synchronizer. Dropping it stops the watcher; [`SyncHandle::shutdown`]
/// additionally drains the in-flight stages.
pub struct SyncHandle {
    watcher: RecommendedWatcher,
    events_tx: mpsc::Sender<String>,
    debouncer: JoinHandle<()>,
    listener: JoinHandle<()>,
}

impl DirectorySynchronizer {
    pub fn new(
        config: SyncConfig,
        writer: Arc<IndexWriter>,
        extractor: Arc<QuestionExtractor>,
    ) -> Self {
        Self {
            config,
            writer,
            extractor,
        }
    }

    /// Start watching. With `full_rescan`, every file already present is fed
    /// through the same debounced pipeline before live events, so a cold
    /// start converges the store to the current directory state.
    pub async fn start(self, full_rescan: bool) -> Result<SyncHandle> {
        tokio::fs::create_dir_all(&self.config.docs_dir).await?;

        let (events_tx, events_rx) = mpsc::channel(128);
        let (settled_tx, settled_rx) = mpsc::channel(128);

        let debouncer = debounce::spawn(self.config.debounce, events_rx, settled_tx);
        let listener = tokio::spawn(Self::listen(
            settled_rx,
            self.writer,
            self.extractor,
            self.config.docs_dir.clone(),
        ));

        if full_rescan {
            Self::rescan(&self.config.docs_dir, &events_tx).await?;
        }

        let watcher = Self::start_watcher(&self.config.docs_dir, events_tx.clone())?;
        info!("watching {} for changes", self.config.docs_dir.display());

        Ok(SyncHandle {
            watcher,
            events_tx,
            debouncer,
            listener,
        })
    }

    /// Feed every current file through the event pipeline.
    async fn rescan(dir: &Path, events_tx: &mpsc::Sender<String>) -> Result<()> {
        let mut entries = tokio::fs::read_dir(dir).await?;
        let mut scheduled = 0usize;

        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if is_ignored_file(&name) {
                continue;
            }
            if entry.file_type().await.map(|t| t.is_file()).unwrap_or(false) {
                events_tx.send(name).await?;
                scheduled += 1;
            }
        }

        info!("rescan scheduled {scheduled} files");
        Ok(())
    }

    /// Bridge filesystem notifications into the events channel. Runs on the
    /// watcher's own thread, so `blocking_send` is the right call here.
    fn start_watcher(dir: &Path, events_tx: mpsc::Sender<String>) -> Result<RecommendedWatcher> {
        let mut watcher =
            notify::recommended_watcher(move |result: notify::Result<notify::Event>| {
                let event = match result {
                    Ok(event) => event,
                    Err(err) => {
                        warn!("watch error: {err}");
                        return;
                    }
                };
                if matches!(event.kind, notify::EventKind::Access(_)) {
                    return;
                }

                for path in event.paths {
                    let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
                        continue;
                    };
                    if is_ignored_file(name) {
                        continue;
                    }
                    if events_tx.blocking_send(name.to_string()).is_err() {
                        warn!("event pipeline closed, dropping {name}");
                        return;
                    }
                }
            })?;

        watcher.watch(dir, RecursiveMode::NonRecursive)?;
        Ok(watcher)
    }

    /// Consume settled file names with bounded concurrency.
    async fn listen(
        settled_rx: mpsc::Receiver<String>,
        writer: Arc<IndexWriter>,
        extractor: Arc<QuestionExtractor>,
        docs_dir: PathBuf,
    ) {
        let writer = &writer;
        let extractor = &extractor;
        let docs_dir = &docs_dir;

        tokio_stream::wrappers::ReceiverStream::new(settled_rx)
            .for_each_concurrent(MAX_CONCURRENT_SETTLES, |name| async move {
                Self::settle(docs_dir, &name, writer, extractor).await;
            })
            .await;
    }

    /// Route one settled event: present on disk means (re)index, absent
    /// means delete. Either way the suggested questions are rebuilt from the
    /// directory's new state.
    async fn settle(docs_dir: &Path, name: &str, writer: &IndexWriter, extractor: &QuestionExtractor) {
        let path = docs_dir.join(name);
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            debug!("settled change: {name}");
            writer.index_file(&path).await;
        } else {
            debug!("settled removal: {name}");
            writer.delete_all_for_file(name).await;
        }

        extractor.regenerate().await;
    }
}

impl SyncHandle {
    /// Stop watching and wait for in-flight work to drain.
    pub async fn shutdown(self) {
        drop(self.watcher);
        drop(self.events_tx);
        let _ = self.debouncer.await;
        let _ = self.listener.await;
        info!("synchronizer stopped");
    }
}
