use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, RecvTimeoutError, channel};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::models::Stamp;
use crate::store::ReminderStore;
use crate::sync::{SyncReporter, SyncSession};

#[derive(Debug, Default)]
struct CoalescerState {
    running: bool,
    pending: bool,
}

/// Lets at most one pass run at a time.
///
/// A trigger that arrives while a pass is running is folded into a single
/// rerun, executed by the caller already running passes once it finishes.
#[derive(Debug, Default)]
pub struct Coalescer {
    state: Mutex<CoalescerState>,
}

impl Coalescer {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, CoalescerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_running(&self) -> bool {
        self.lock().running
    }

    /// Run `pass`, plus one rerun per batch of triggers that arrived while
    /// it ran. Returns how many passes this call ran, 0 if another caller
    /// was already running and will do the rerun instead.
    pub fn trigger(&self, mut pass: impl FnMut()) -> usize {
        {
            let mut state = self.lock();
            if state.running {
                state.pending = true;
                return 0;
            }
            state.running = true;
        }

        let mut runs = 0;
        loop {
            pass();
            runs += 1;

            let mut state = self.lock();
            if !state.pending {
                state.running = false;
                return runs;
            }
            state.pending = false;
        }
    }

    /// Ask the running pass for one more run. Returns `false` if nothing is
    /// running.
    pub fn request(&self) -> bool {
        let mut state = self.lock();
        if state.running {
            state.pending = true;
        }
        state.running
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    #[error("Failed to watch: {0}")]
    Notify(#[from] notify::Error),
    #[error("Not a file path: {0}")]
    NotAFile(PathBuf),
    #[error("File watcher stopped")]
    Closed,
}

/// Why the watch loop woke up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
    Changed,
    Poll,
}

/// Watches the directory of one file and reports changes to that file.
///
/// The directory is watched rather than the file, so editors that save by
/// replacing the file are still seen.
pub struct OrgFileWatcher {
    _watcher: RecommendedWatcher,
    receiver: Receiver<notify::Result<Event>>,
    file_name: OsString,
}

impl OrgFileWatcher {
    pub fn new(path: &Path) -> Result<Self, WatchError> {
        let file_name = path
            .file_name()
            .ok_or_else(|| WatchError::NotAFile(path.to_path_buf()))?
            .to_os_string();
        let dir = path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or(Path::new("."));

        let (tx, rx) = channel();
        let mut watcher = RecommendedWatcher::new(
            move |res| {
                let _ = tx.send(res);
            },
            Config::default(),
        )?;
        watcher.watch(dir, RecursiveMode::NonRecursive)?;

        Ok(Self {
            _watcher: watcher,
            receiver: rx,
            file_name,
        })
    }

    /// Wait up to `timeout`. `None` means an event arrived that does not
    /// concern the file.
    pub fn wait(&self, timeout: Duration) -> Result<Option<Wake>, WatchError> {
        match self.receiver.recv_timeout(timeout) {
            Ok(Ok(event)) => Ok(touches(&event, &self.file_name).then_some(Wake::Changed)),
            Ok(Err(e)) => {
                log::warn!("File watch error: {e}");
                Ok(None)
            }
            Err(RecvTimeoutError::Timeout) => Ok(Some(Wake::Poll)),
            Err(RecvTimeoutError::Disconnected) => Err(WatchError::Closed),
        }
    }

    /// Consume queued events. Returns whether any concerned the file.
    pub fn drain(&self) -> bool {
        let mut changed = false;
        while let Ok(res) = self.receiver.try_recv() {
            if let Ok(event) = res {
                changed |= touches(&event, &self.file_name);
            }
        }
        changed
    }
}

/// Whether `event` changes a file called `file_name`.
pub fn touches(event: &Event, file_name: &OsStr) -> bool {
    !matches!(event.kind, EventKind::Access(_))
        && event.paths.iter().any(|p| p.file_name() == Some(file_name))
}

/// Sync on every change to the session's file and every `interval`.
///
/// Runs until the watcher stops. Pass failures are logged and the next
/// trigger starts afresh.
pub fn watch<S: ReminderStore, R: SyncReporter>(
    session: &mut SyncSession<S, R>,
    interval: Duration,
) -> Result<(), WatchError> {
    let watcher = OrgFileWatcher::new(session.path())?;
    let coalescer = Coalescer::new();
    log::info!(
        "Watching {} (polling every {}s)",
        session.path().display(),
        interval.as_secs()
    );

    loop {
        let Some(wake) = watcher.wait(interval)? else {
            continue;
        };
        log::debug!("Sync triggered: {wake:?}");

        coalescer.trigger(|| {
            match session.run_pass(Stamp::now()) {
                Ok(summary) if summary.actions > 0 || summary.written => {
                    log::info!("Synced: {summary:?}")
                }
                Ok(_) => {}
                Err(e) => log::error!("{e}"),
            }
            // Our own write shows up here too; rerunning once settles it.
            if watcher.drain() {
                coalescer.request();
            }
        });
    }
}
