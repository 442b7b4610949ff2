//! Non-fatal warnings raised while setting up a run.
//!
//! Warnings go through a single process-wide [Logger] configured by the `diagnostics` section
//! of the [global configuration](GlobalConfig). In a distributed run every process executes the
//! same setup code, so warnings are only emitted by the rank-zero process unless the
//! configuration asks for all ranks.

use crate::config::{DiagnosticsLogLevel, GlobalConfig, Logger};
use core::cell::RefCell;
use core::fmt::Display;
use core::sync::atomic::{AtomicU64, Ordering};
use gantry_common::rank;
use std::sync::Arc;

static LOGGER: spin::Mutex<Option<Arc<Logger>>> = spin::Mutex::new(None);
static WARNINGS: AtomicU64 = AtomicU64::new(0);

thread_local! {
    static CAPTURES: RefCell<Vec<Vec<String>>> = const { RefCell::new(Vec::new()) };
}

/// Emit a warning on the diagnostic channel.
///
/// Never fails and never panics on sink errors. On processes other than rank zero the warning
/// is dropped, unless the diagnostics level is `all-ranks`.
pub fn rank_zero_warn<S: Display>(message: S) {
    let level = GlobalConfig::get().diagnostics.logger.level;
    let rank = rank::rank();

    match level {
        DiagnosticsLogLevel::Disabled => return,
        DiagnosticsLogLevel::Warn if rank != 0 => return,
        DiagnosticsLogLevel::Warn | DiagnosticsLogLevel::AllRanks => {}
    }

    WARNINGS.fetch_add(1, Ordering::Relaxed);

    let message = message.to_string();
    let message = match CAPTURES.with_borrow_mut(|captures| match captures.last_mut() {
        Some(captured) => {
            captured.push(message);
            None
        }
        None => Some(message),
    }) {
        Some(message) => message,
        None => return,
    };

    let logger = logger();

    match level {
        DiagnosticsLogLevel::AllRanks => {
            logger.log_warning(&format_args!("[rank: {rank}] {message}"))
        }
        _ => logger.log_warning(&message),
    }
}

/// Emit an accelerator selection message on the rank-zero process.
pub(crate) fn rank_zero_selection<S: Display>(message: S) {
    if !rank::is_rank_zero() {
        return;
    }

    logger().log_selection(&message);
}

// The lock is released before any sink runs, a `log` backend may emit warnings itself.
fn logger() -> Arc<Logger> {
    if let Some(logger) = LOGGER.lock().as_ref() {
        return logger.clone();
    }

    let logger = Arc::new(Logger::new());
    LOGGER.lock().get_or_insert(logger).clone()
}

/// Run `func` and return the warnings it emitted on the current thread.
///
/// Captured warnings are not forwarded to the configured sinks. Captures nest, the innermost
/// one receives the warnings.
///
/// # Example
///
/// ```
/// use gantry_runtime::diagnostics;
///
/// let ((), warnings) = diagnostics::capture(|| diagnostics::rank_zero_warn("careful"));
///
/// assert_eq!(warnings, ["careful"]);
/// ```
pub fn capture<R, F: FnOnce() -> R>(func: F) -> (R, Vec<String>) {
    let scope = CaptureScope::enter();
    let result = func();

    (result, scope.exit())
}

/// The number of warnings emitted by the process so far, captured ones included.
pub fn warning_count() -> u64 {
    WARNINGS.load(Ordering::Relaxed)
}

/// Drop the diagnostic logger so that it is rebuilt from the global configuration on the next
/// message.
pub fn reload() {
    *LOGGER.lock() = None;
}

struct CaptureScope;

impl CaptureScope {
    fn enter() -> Self {
        CAPTURES.with_borrow_mut(|captures| captures.push(Vec::new()));
        Self
    }

    fn exit(self) -> Vec<String> {
        let captured = CAPTURES.with_borrow_mut(|captures| captures.pop());
        core::mem::forget(self);
        captured.unwrap_or_default()
    }
}

impl Drop for CaptureScope {
    // Only reached when the captured closure panics.
    fn drop(&mut self) {
        CAPTURES.with_borrow_mut(|captures| {
            captures.pop();
        });
    }
}
