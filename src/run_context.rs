/*!
 * Per-run context shared by every worker.
 *
 * A `RunContext` is created once at the start of a run and handed down to
 * every document pipeline. It carries the configuration, the generator and
 * the run-wide cancellation flag raised by fatal generator errors.
 */

use log::error;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::app_config::Config;
use crate::errors::TranslationError;
use crate::providers::Provider;

/// Configuration, generator and cancellation flag of one run
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Validated configuration
    pub config: Arc<Config>,
    /// Text generator
    pub provider: Arc<dyn Provider>,
    cancelled: Arc<AtomicBool>,
}

impl RunContext {
    pub fn new(config: Config, provider: Arc<dyn Provider>) -> Self {
        Self {
            config: Arc::new(config),
            provider,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Stop all outstanding and future work of the run
    pub fn cancel(&self, reason: &str) {
        if !self.cancelled.swap(true, Ordering::SeqCst) {
            error!("!Stop! Cancelling run: {}", reason);
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Fail with `Cancelled` once the run was cancelled
    pub fn check_cancelled(&self) -> Result<(), TranslationError> {
        if self.is_cancelled() {
            Err(TranslationError::Cancelled)
        } else {
            Ok(())
        }
    }
}
