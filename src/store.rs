//! The localization store handle and its background load.
//!
//! A store is owned by the session that opened it and passed by reference to
//! whoever needs translations. Loading runs on a Tokio blocking thread; the
//! result is committed on the caller's side, either when [`LocalizationStore::status`]
//! notices the finished load or when [`LocalizationStore::wait_for_load`] resolves.
//!
//! ```text
//! NotStarted ─initialize─▶ InitializationInProgress ─▶ Initialized | Empty
//!                                   │
//!                         cancel_initialization
//!                                   ▼
//!                       CancellationInProgress ─▶ CancellationComplete
//! ```

use crate::config::StoreConfig;
use crate::dictionary::Translations;
use crate::error::{Result, StoreError};
use crate::grid::{CsvSource, Grid, GridSource};
use crate::i18n::{get_translation, Culture};
use crate::key::KeyCodec;
use crate::reader::read_translations;
use crate::writer::{MergeEngine, MergeReport};
use serde::Serialize;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::runtime::Handle;
use tokio::sync::oneshot::{self, error::TryRecvError};
use tokio::sync::Notify;
use tracing::{debug, info, warn};

/// Load status shared with callers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum StoreStatus {
    #[default]
    NotStarted,
    InitializationInProgress,
    Initialized,
    Empty,
    CancellationInProgress,
    CancellationComplete,
}

impl StoreStatus {
    /// Whether a load is still running or waiting to be committed.
    pub fn is_in_progress(&self) -> bool {
        matches!(
            self,
            StoreStatus::InitializationInProgress | StoreStatus::CancellationInProgress
        )
    }
}

/// What the background worker hands back.
enum LoadOutcome {
    Cancelled,
    Loaded {
        grid: Box<dyn Grid>,
        translations: Translations,
    },
    Failed(StoreError),
}

/// Worker side of a load. Dropping it, even while unwinding from a panic,
/// releases the sender before waking waiters so they always see a result
/// or a closed channel.
struct LoadCompletion {
    sender: Option<oneshot::Sender<LoadOutcome>>,
    done: Arc<Notify>,
}

impl LoadCompletion {
    fn send(mut self, outcome: LoadOutcome) {
        if let Some(sender) = self.sender.take() {
            let _ = sender.send(outcome);
        }
    }
}

impl Drop for LoadCompletion {
    fn drop(&mut self) {
        self.sender.take();
        self.done.notify_waiters();
    }
}

#[derive(Default)]
struct Inner {
    status: StoreStatus,
    grid: Option<Box<dyn Grid>>,
    translations: Option<Arc<Translations>>,
    pending: Option<oneshot::Receiver<LoadOutcome>>,
    load_error: Option<StoreError>,
    backup_taken: bool,
}

pub struct LocalizationStore {
    config: StoreConfig,
    source: Arc<dyn GridSource>,
    codec: KeyCodec,
    input_culture: Culture,
    loading: Arc<AtomicBool>,
    cancel: Arc<AtomicBool>,
    load_done: Arc<Notify>,
    inner: Mutex<Inner>,
}

impl LocalizationStore {
    /// Open a store backed by the CSV file named in `config`.
    ///
    /// # Errors
    /// `StoreError::InvalidCultureTag` when the configured input culture is not
    /// a known culture.
    pub fn open(config: StoreConfig) -> Result<Self> {
        let source = Arc::new(CsvSource::new(config.grid_path.clone()));
        Self::with_source(config, source)
    }

    /// Open a store backed by any grid engine.
    pub fn with_source(config: StoreConfig, source: Arc<dyn GridSource>) -> Result<Self> {
        let input_culture = Culture::resolve(&config.input_culture, false)?;
        let codec = KeyCodec::new(config.key_separator, config.glossary_tag.clone());
        Ok(Self {
            config,
            source,
            codec,
            input_culture,
            loading: Arc::new(AtomicBool::new(false)),
            cancel: Arc::new(AtomicBool::new(false)),
            load_done: Arc::new(Notify::new()),
            inner: Mutex::new(Inner::default()),
        })
    }

    pub fn input_culture(&self) -> &Culture {
        &self.input_culture
    }

    pub fn codec(&self) -> &KeyCodec {
        &self.codec
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ==================== Load State Machine ====================

    /// Start loading the grid.
    ///
    /// If the grid does not exist yet, an empty grid is created synchronously
    /// and the status becomes `Empty`. Otherwise the read is scheduled on a
    /// blocking thread. Only one load may be in flight; a second call while one
    /// is running does nothing.
    ///
    /// # Errors
    /// `StoreError::NoRuntime` outside a Tokio runtime, or the error raised
    /// while taking the backup or creating the grid.
    pub fn initialize(&self) -> Result<()> {
        if self.loading.swap(true, Ordering::AcqRel) {
            debug!("Initialization already in progress, ignoring");
            return Ok(());
        }

        let mut inner = self.lock();
        let previous = inner.status;
        inner.status = StoreStatus::InitializationInProgress;

        if let Err(e) = self.start_load(&mut inner) {
            inner.status = previous;
            self.loading.store(false, Ordering::Release);
            return Err(e);
        }
        Ok(())
    }

    fn start_load(&self, inner: &mut Inner) -> Result<()> {
        self.take_backup(inner)?;

        if !self.source.exists() {
            inner.grid = Some(self.source.create()?);
            inner.translations = Some(Arc::default());
            inner.status = StoreStatus::Empty;
            self.loading.store(false, Ordering::Release);
            info!(
                "No grid at {}, starting with an empty one",
                self.source.location().display()
            );
            return Ok(());
        }

        let runtime = Handle::try_current().map_err(|_| StoreError::NoRuntime)?;
        self.cancel.store(false, Ordering::Release);

        let (tx, rx) = oneshot::channel();
        inner.pending = Some(rx);
        inner.load_error = None;

        let source = Arc::clone(&self.source);
        let cancel = Arc::clone(&self.cancel);
        let codec = self.codec.clone();
        let completion = LoadCompletion {
            sender: Some(tx),
            done: Arc::clone(&self.load_done),
        };
        runtime.spawn_blocking(move || {
            completion.send(load(&*source, &codec, &cancel));
        });

        info!("Loading grid from {}", self.source.location().display());
        Ok(())
    }

    fn take_backup(&self, inner: &mut Inner) -> Result<()> {
        let Some(backup_path) = &self.config.backup_path else {
            return Ok(());
        };
        if inner.backup_taken || backup_path.exists() {
            return Ok(());
        }
        if self.source.exists() {
            self.source.copy_to(backup_path)?;
            info!("Backed up grid to {}", backup_path.display());
        }
        inner.backup_taken = true;
        Ok(())
    }

    /// Ask a running load to stop. Does nothing when no load is running.
    ///
    /// Cancellation is cooperative: a read that has already started runs to
    /// completion and its result is discarded.
    pub fn cancel_initialization(&self) {
        if !self.loading.load(Ordering::Acquire) {
            debug!("No load in flight, nothing to cancel");
            return;
        }
        self.cancel.store(true, Ordering::Release);

        let mut inner = self.lock();
        if inner.status == StoreStatus::InitializationInProgress {
            inner.status = StoreStatus::CancellationInProgress;
            info!("Cancelling grid load");
        }
    }

    /// Current status. Commits a finished background load without blocking.
    pub fn status(&self) -> StoreStatus {
        let mut inner = self.lock();
        self.poll_pending(&mut inner);
        inner.status
    }

    /// Wait for the running load (if any) and commit it.
    ///
    /// The pending result stays with the store, so dropping this future (for
    /// example under `tokio::time::timeout`) loses nothing; any later call to
    /// `status` or `wait_for_load` commits it. Several callers may wait at once.
    ///
    /// # Errors
    /// The error that ended the load, e.g. `StoreError::GridFormat`, unless it
    /// was already taken. The status is `Empty` in that case.
    pub async fn wait_for_load(&self) -> Result<StoreStatus> {
        loop {
            let notified = self.load_done.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut inner = self.lock();
                self.poll_pending(&mut inner);
                if inner.pending.is_none() {
                    return match inner.load_error.take() {
                        Some(e) => Err(e),
                        None => Ok(inner.status),
                    };
                }
            }

            notified.await;
        }
    }

    /// Error that ended the last load, if it has not been taken yet.
    pub fn take_load_error(&self) -> Option<StoreError> {
        self.lock().load_error.take()
    }

    fn poll_pending(&self, inner: &mut Inner) {
        let Some(receiver) = inner.pending.as_mut() else {
            return;
        };
        let outcome = match receiver.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Closed) => None,
        };
        inner.pending = None;
        self.complete(inner, outcome);
    }

    fn complete(&self, inner: &mut Inner, outcome: Option<LoadOutcome>) {
        let status = if self.cancel.load(Ordering::Acquire) {
            StoreStatus::CancellationComplete
        } else {
            match outcome {
                Some(LoadOutcome::Loaded { grid, translations }) => {
                    let status = if translations.is_empty() {
                        StoreStatus::Empty
                    } else {
                        StoreStatus::Initialized
                    };
                    inner.grid = Some(grid);
                    inner.translations = Some(Arc::new(translations));
                    status
                }
                Some(LoadOutcome::Failed(e)) => {
                    warn!("Failed to load grid: {}", e);
                    inner.load_error = Some(e);
                    StoreStatus::Empty
                }
                Some(LoadOutcome::Cancelled) => StoreStatus::CancellationComplete,
                None => {
                    warn!("Grid load worker stopped without a result");
                    StoreStatus::Empty
                }
            }
        };

        inner.status = status;
        self.loading.store(false, Ordering::Release);
        info!("Grid load finished with status {:?}", status);
    }

    // ==================== Dictionary Access ====================

    /// Run `f` against a snapshot of the loaded dictionary.
    ///
    /// The store is not locked while `f` runs, so `f` may call back into it.
    /// Updates made in the meantime do not show up in the snapshot.
    ///
    /// # Errors
    /// `StoreError::NotInitialized` unless the status is `Initialized`.
    pub fn with_translations<R>(&self, f: impl FnOnce(&Translations) -> R) -> Result<R> {
        let snapshot = {
            let mut inner = self.lock();
            self.poll_pending(&mut inner);
            match (inner.status, inner.translations.as_ref()) {
                (StoreStatus::Initialized, Some(translations)) => Arc::clone(translations),
                (status, _) => return Err(StoreError::NotInitialized(status)),
            }
        };
        Ok(f(&snapshot))
    }

    /// Best available text for `key` in `target`, walking the fallback chain
    /// down to the input culture unless `exact` is set.
    pub fn get_translation(
        &self,
        target: &Culture,
        key: &str,
        exact: bool,
    ) -> Result<Option<String>> {
        self.with_translations(|translations| {
            get_translation(translations, target, key, &self.input_culture, exact)
                .map(str::to_string)
        })
    }

    pub fn cultures(&self) -> Result<Vec<Culture>> {
        self.with_translations(|translations| {
            translations.cultures().into_iter().cloned().collect()
        })
    }

    /// Apply translations for one key to the in-memory dictionary.
    ///
    /// On a store whose load ended `Empty`, the first update creates the grid if
    /// there is none yet.
    ///
    /// # Errors
    /// `StoreError::KeyRequired` for a blank key, a blank first part or an empty
    /// last part; `StoreError::EmptyText` when any text is empty, since an empty
    /// cell reads back as no translation. Nothing is applied on error.
    /// `StoreError::NotInitialized` while a load is running or after it was
    /// cancelled.
    pub fn update<I, T>(&self, key: &str, translations: I) -> Result<()>
    where
        I: IntoIterator<Item = (Culture, T)>,
        T: Into<String>,
    {
        let parts = self.codec.decompose(key);
        let first_part_blank = parts.first().map_or(true, |part| part.trim().is_empty());
        let last_part_empty = parts.last().map_or(true, String::is_empty);
        if key.trim().is_empty() || first_part_blank || last_part_empty {
            return Err(StoreError::KeyRequired);
        }

        let entries: Vec<(Culture, String)> = translations
            .into_iter()
            .map(|(culture, text)| (culture, text.into()))
            .collect();
        if let Some((culture, _)) = entries.iter().find(|(_, text)| text.is_empty()) {
            return Err(StoreError::EmptyText {
                key: key.to_string(),
                culture: culture.tag().to_string(),
            });
        }

        let mut inner = self.lock();
        self.poll_pending(&mut inner);
        match inner.status {
            StoreStatus::Initialized => {}
            StoreStatus::Empty => {
                if inner.grid.is_none() {
                    inner.grid = Some(self.source.create()?);
                    info!(
                        "Created new grid for {}",
                        self.source.location().display()
                    );
                }
            }
            status => return Err(StoreError::NotInitialized(status)),
        }

        let dictionary = Arc::make_mut(inner.translations.get_or_insert_with(Arc::default));
        for (culture, text) in entries {
            dictionary.insert(culture, key, text);
        }
        if !dictionary.is_empty() {
            inner.status = StoreStatus::Initialized;
        }
        debug!("Updated key {}", key);
        Ok(())
    }

    /// Drop a key from every culture in memory.
    ///
    /// The grid row stays: merging never deletes rows.
    pub fn remove(&self, key: &str) -> Result<bool> {
        let mut inner = self.lock();
        self.poll_pending(&mut inner);
        match (inner.status, inner.translations.as_mut()) {
            (StoreStatus::Initialized, Some(translations)) => {
                Ok(Arc::make_mut(translations).remove_key(key))
            }
            (status, _) => Err(StoreError::NotInitialized(status)),
        }
    }

    // ==================== Persistence ====================

    /// Merge the in-memory dictionary into the grid and save it.
    pub fn save(&self) -> Result<MergeReport> {
        self.flush(None)
    }

    /// Merge and save to another location, which becomes the grid's location.
    pub fn save_as(&self, path: &Path) -> Result<MergeReport> {
        self.flush(Some(path))
    }

    fn flush(&self, path: Option<&Path>) -> Result<MergeReport> {
        let mut inner = self.lock();
        self.poll_pending(&mut inner);
        let status = inner.status;
        if !matches!(status, StoreStatus::Initialized | StoreStatus::Empty) {
            return Err(StoreError::NotInitialized(status));
        }

        let Inner {
            grid, translations, ..
        } = &mut *inner;
        let (Some(grid), Some(translations)) = (grid.as_mut(), translations.as_ref()) else {
            return Err(StoreError::NotInitialized(status));
        };

        let report = MergeEngine::new(&mut **grid, &self.codec)
            .with_decorated_headers(self.config.decorate_headers)
            .merge(translations);
        match path {
            Some(path) => grid.save_as(path)?,
            None => grid.save()?,
        }
        Ok(report)
    }

    /// Release the grid. Any running load is cancelled.
    pub fn close(self) -> Result<()> {
        self.cancel_initialization();
        let mut inner = self.lock();
        if let Some(mut grid) = inner.grid.take() {
            grid.close()?;
        }
        inner.translations = None;
        Ok(())
    }
}

/// Background half of a load: check for cancellation, then read the grid.
fn load(source: &dyn GridSource, codec: &KeyCodec, cancel: &AtomicBool) -> LoadOutcome {
    if cancel.load(Ordering::Acquire) {
        debug!("Load cancelled before reading");
        return LoadOutcome::Cancelled;
    }
    match source.open() {
        Ok(grid) => {
            let translations = read_translations(&*grid, codec);
            LoadOutcome::Loaded { grid, translations }
        }
        Err(e) => LoadOutcome::Failed(e),
    }
}
