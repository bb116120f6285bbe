//! The resumable, rate-limited batch driver.
//!
//! A run walks `Idle → Loading → Enumerating → Processing(i)… → Saving → Done`.
//! Items whose key is already in the result mapping are skipped without a
//! call or a delay. Every attempted pin is followed by the configured delay
//! before the next item. Successful pins are persisted incrementally, and
//! the final save is always attempted, also after an interrupted run.

use std::{fmt, time::Duration};

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::{DictionaryStore, PinOutcome, Pinner, ResultMapping, Result, Source, Sourced};

/// Delay between two pin requests unless configured otherwise.
pub const DEFAULT_PIN_DELAY: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Idle,
    Loading,
    Enumerating,
    Processing(usize),
    Saving,
    Done,
}

impl fmt::Display for DriverState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Loading => f.write_str("loading"),
            Self::Enumerating => f.write_str("enumerating"),
            Self::Processing(i) => write!(f, "processing({i})"),
            Self::Saving => f.write_str("saving"),
            Self::Done => f.write_str("done"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverConfig {
    /// Pause after every attempted pin, respecting the service's rate limit.
    /// There is no pause after the last item of a batch.
    pub delay: Duration,
    /// Save the mapping after this many successful pins. `0` only saves
    /// once the batch is over.
    pub save_every: usize,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            delay: DEFAULT_PIN_DELAY,
            save_every: 1,
        }
    }
}

/// Counters for one finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub discovered: usize,
    pub pinned: usize,
    pub already_pinned: usize,
    pub failed: usize,
    pub lookup_failures: usize,
    /// The run was cancelled before every item was processed.
    pub interrupted: bool,
    /// Number of entries in the saved mapping.
    pub mapping_len: usize,
}

enum Step {
    Skipped,
    Attempted { pinned: bool },
    Interrupted,
}

/// Owns the result mapping for the duration of a run.
#[derive(Debug)]
pub struct BatchDriver<P> {
    pinner: P,
    store: DictionaryStore,
    config: DriverConfig,
    cancel: CancellationToken,
    state: DriverState,
}

impl<P: Pinner> BatchDriver<P> {
    pub fn new(pinner: P, store: DictionaryStore) -> Self {
        Self {
            pinner,
            store,
            config: DriverConfig::default(),
            cancel: CancellationToken::new(),
            state: DriverState::Idle,
        }
    }

    pub fn with_config(mut self, config: DriverConfig) -> Self {
        self.config = config;
        self
    }

    /// Stops the run between items (or during a pin or delay) once
    /// `cancel` fires. The mapping is still saved.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn pinner(&self) -> &P {
        &self.pinner
    }

    pub fn store(&self) -> &DictionaryStore {
        &self.store
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Runs one batch over `source`.
    ///
    /// Only failures to load the mapping, to enumerate the source, or to
    /// write the final mapping are returned as errors.
    pub async fn run<S: Source + ?Sized>(&mut self, source: &S) -> Result<BatchReport> {
        self.transition(DriverState::Loading);
        info!("Loading dictionary...");
        let mut mapping = self.store.load()?;

        self.transition(DriverState::Enumerating);
        let items = source.enumerate()?;
        info!("Discovered {} items.", items.len());

        let mut report = BatchReport {
            discovered: items.len(),
            ..Default::default()
        };
        let total = items.len();
        let mut unsaved = 0usize;

        for (index, entry) in items.into_iter().enumerate() {
            if self.cancel.is_cancelled() {
                report.interrupted = true;
                break;
            }
            self.transition(DriverState::Processing(index));

            match self.process(entry, &mut mapping, &mut report).await {
                Step::Skipped => continue,
                Step::Interrupted => {
                    report.interrupted = true;
                    break;
                }
                Step::Attempted { pinned } => {
                    if pinned {
                        unsaved += 1;
                        if self.config.save_every > 0 && unsaved >= self.config.save_every {
                            // the final save retries anything that fails here
                            match self.store.save(&mapping) {
                                Ok(()) => unsaved = 0,
                                Err(err) => error!("Cannot save dictionary: {err}"),
                            }
                        }
                    }
                    if index + 1 < total && !self.pause().await {
                        report.interrupted = true;
                        break;
                    }
                }
            }
        }

        if report.interrupted {
            info!("Interrupted, keeping progress.");
        }

        self.transition(DriverState::Saving);
        info!("Saving dictionary...");
        self.store.save(&mapping)?;
        report.mapping_len = mapping.len();

        self.transition(DriverState::Done);
        Ok(report)
    }

    async fn process(
        &self,
        entry: Sourced,
        mapping: &mut ResultMapping,
        report: &mut BatchReport,
    ) -> Step {
        let key = match &entry {
            Ok(item) => item.key.clone(),
            Err(missing) => missing.key.clone(),
        };
        info!("Processing: {key}");

        if mapping.contains(&key) {
            info!(" - already pinned");
            report.already_pinned += 1;
            return Step::Skipped;
        }

        let item = match entry {
            Ok(item) => item,
            Err(missing) => {
                error!(" - pin failed: {missing}");
                report.lookup_failures += 1;
                return Step::Skipped;
            }
        };

        info!(" - pinning...");
        let outcome = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Step::Interrupted,
            outcome = self.pinner.pin(&item) => outcome,
        };

        match outcome {
            PinOutcome::Pinned(uri) => {
                info!(" - pinned: {uri}");
                mapping.insert(item.key, uri);
                report.pinned += 1;
                Step::Attempted { pinned: true }
            }
            PinOutcome::Failed(message) => {
                error!(" - pin failed: {message}");
                report.failed += 1;
                Step::Attempted { pinned: false }
            }
        }
    }

    /// Waits for the configured delay; false if cancelled meanwhile.
    async fn pause(&self) -> bool {
        if self.config.delay.is_zero() {
            return true;
        }
        tokio::select! {
            _ = self.cancel.cancelled() => false,
            _ = tokio::time::sleep(self.config.delay) => true,
        }
    }

    fn transition(&mut self, next: DriverState) {
        debug!("driver: {} -> {}", self.state, next);
        self.state = next;
    }
}
