//! Fault containment for patch callbacks.
//!
//! Every interceptor and rewrite runs through a [`FaultGuard`]. The guard turns both
//! `Err` returns and panics into the fail-open default: "run the original operation" for
//! prefixes, "keep the original instruction sequence" for rewrites. Nothing raised inside
//! patch logic ever reaches the host.
//!
//! Failures are reported once per callback identity. A prefix that fails on every call of a
//! hot host operation would otherwise flood the log; the first report carries the error and
//! later ones are dropped. [`FaultLog`] keeps the reported events for inspection.
//!
//! The default panic hook would still print every contained panic to stderr. The first
//! guarded call therefore wraps the process panic hook once: while a thread is inside a
//! guard the wrapper stays silent, and everywhere else it defers to the previous hook.
//!
//! # Example
//!
//! ```rust
//! use cilpatch::patch::{FaultGuard, PrefixOutcome};
//! use cilpatch::Error;
//!
//! let guard = FaultGuard::new();
//! let mut result = true;
//!
//! let outcome = guard.run_prefix("demo", &mut result, |_slot| {
//!     Err(Error::Error("host entity vanished".into()))
//! });
//!
//! assert_eq!(outcome, PrefixOutcome::RunOriginal);
//! assert!(result);
//! assert_eq!(guard.faults().len(), 1);
//! ```

use std::{
    any::Any,
    cell::Cell,
    fmt,
    panic::{self, AssertUnwindSafe, PanicHookInfo},
    sync::Once,
};

use dashmap::DashSet;

use crate::{assembly::InstructionSequence, patch::descriptor::PrefixOutcome, Error, Result};

type PanicHook = Box<dyn Fn(&PanicHookInfo<'_>) + Sync + Send + 'static>;

thread_local! {
    static CONTAINING: Cell<bool> = const { Cell::new(false) };
}

static QUIET_HOOK: Once = Once::new();

fn install_quiet_hook() {
    QUIET_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(quiet_hook(previous));
    });
}

/// Wraps `previous` so it only runs for panics outside a guard.
fn quiet_hook(previous: PanicHook) -> PanicHook {
    Box::new(move |info| {
        if !CONTAINING.with(Cell::get) {
            previous(info);
        }
    })
}

/// Marks the current thread as inside a guard until dropped.
struct Containing {
    outer: bool,
}

impl Containing {
    fn enter() -> Self {
        Containing {
            outer: CONTAINING.with(|flag| flag.replace(true)),
        }
    }
}

impl Drop for Containing {
    fn drop(&mut self) {
        CONTAINING.with(|flag| flag.set(self.outer));
    }
}

/// A contained callback failure.
#[derive(Debug, Clone)]
pub struct FaultEvent {
    /// Identity of the callback that failed
    pub identity: &'static str,
    /// Rendered error
    pub message: String,
}

impl fmt::Display for FaultEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.identity, self.message)
    }
}

/// Append-only record of contained failures, at most one per callback identity.
///
/// Events can be appended through a shared reference, so the log can be shared with the
/// interceptors that report into it.
#[derive(Debug)]
pub struct FaultLog {
    events: boxcar::Vec<FaultEvent>,
    reported: DashSet<&'static str>,
}

impl Default for FaultLog {
    fn default() -> Self {
        Self {
            events: boxcar::Vec::new(),
            reported: DashSet::new(),
        }
    }
}

impl FaultLog {
    /// Creates an empty fault log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a failure of `identity`, unless one was already recorded.
    ///
    /// Returns `true` if this call produced a new log entry.
    pub fn record(&self, identity: &'static str, error: &Error) -> bool {
        if !self.reported.insert(identity) {
            return false;
        }

        log::error!(
            "Patch \"{identity}\" has encountered an error and will not be applied:\n{error}"
        );
        self.events.push(FaultEvent {
            identity,
            message: error.to_string(),
        });
        true
    }

    /// Returns `true` if `identity` has failed at least once.
    #[must_use]
    pub fn has_faulted(&self, identity: &str) -> bool {
        self.reported.contains(identity)
    }

    /// Number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.count()
    }

    /// Returns `true` if nothing has failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.count() == 0
    }

    /// Iterates recorded events in the order they were first reported.
    pub fn iter(&self) -> impl Iterator<Item = &FaultEvent> {
        self.events.iter().map(|(_, event)| event)
    }

    /// One-line summary for diagnostics.
    #[must_use]
    pub fn summary(&self) -> String {
        if self.is_empty() {
            return "no faults".to_string();
        }
        let mut names: Vec<_> = self.iter().map(|e| e.identity).collect();
        names.sort_unstable();
        format!("{} faulted: {}", names.len(), names.join(", "))
    }
}

/// Runs patch callbacks with fail-open fallbacks.
#[derive(Debug, Default)]
pub struct FaultGuard {
    faults: FaultLog,
}

impl FaultGuard {
    /// Creates a guard with an empty fault log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The contained failures so far.
    #[must_use]
    pub fn faults(&self) -> &FaultLog {
        &self.faults
    }

    /// Runs a prefix callback against the output `slot`.
    ///
    /// The callback works on a scratch copy of the slot. The copy is written back only when
    /// the callback succeeds with [`PrefixOutcome::SkipOriginal`], so a failing or deferring
    /// prefix leaves the host's output exactly as it was.
    pub fn run_prefix<T, F>(&self, identity: &'static str, slot: &mut T, callback: F) -> PrefixOutcome
    where
        T: Clone,
        F: FnOnce(&mut T) -> Result<PrefixOutcome>,
    {
        let mut scratch = slot.clone();
        match self.contain(identity, || callback(&mut scratch)) {
            Some(PrefixOutcome::SkipOriginal) => {
                *slot = scratch;
                PrefixOutcome::SkipOriginal
            }
            Some(PrefixOutcome::RunOriginal) | None => PrefixOutcome::RunOriginal,
        }
    }

    /// Runs a rewrite callback on `original`.
    ///
    /// Returns the callback's sequence on success and a copy of `original` on any failure.
    pub fn run_rewrite<F>(
        &self,
        identity: &'static str,
        original: &InstructionSequence,
        callback: F,
    ) -> InstructionSequence
    where
        F: FnOnce(&InstructionSequence) -> Result<InstructionSequence>,
    {
        self.contain(identity, || callback(original))
            .unwrap_or_else(|| original.clone())
    }

    fn contain<R>(&self, identity: &'static str, callback: impl FnOnce() -> Result<R>) -> Option<R> {
        install_quiet_hook();
        let outcome = {
            let _containing = Containing::enter();
            panic::catch_unwind(AssertUnwindSafe(callback))
        };

        let error = match outcome {
            Ok(Ok(value)) => return Some(value),
            Ok(Err(error)) => error,
            Err(payload) => Error::CallbackPanicked(panic_message(payload.as_ref())),
        };
        self.faults.record(identity, &error);
        None
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly::{Instruction, SequenceBuilder};

    #[test]
    fn test_prefix_success_commits_slot() {
        let guard = FaultGuard::new();
        let mut result = true;

        let outcome = guard.run_prefix("ok", &mut result, |slot| {
            *slot = false;
            Ok(PrefixOutcome::SkipOriginal)
        });

        assert_eq!(outcome, PrefixOutcome::SkipOriginal);
        assert!(!result);
        assert!(guard.faults().is_empty());
    }

    #[test]
    fn test_prefix_run_original_discards_writes() {
        let guard = FaultGuard::new();
        let mut result = 7;

        let outcome = guard.run_prefix("defer", &mut result, |slot| {
            *slot = 99;
            Ok(PrefixOutcome::RunOriginal)
        });

        assert_eq!(outcome, PrefixOutcome::RunOriginal);
        assert_eq!(result, 7);
    }

    #[test]
    fn test_prefix_error_is_contained_once() {
        let guard = FaultGuard::new();
        let mut result = true;

        for _ in 0..2 {
            let outcome = guard.run_prefix("failing", &mut result, |slot| {
                *slot = false;
                Err(Error::Error("lookup failed".into()))
            });
            assert_eq!(outcome, PrefixOutcome::RunOriginal);
            assert!(result);
        }

        assert_eq!(guard.faults().len(), 1);
        assert!(guard.faults().has_faulted("failing"));
        let event = guard.faults().iter().next().unwrap();
        assert_eq!(event.message, "lookup failed");
    }

    #[test]
    fn test_prefix_panic_is_contained() {
        let guard = FaultGuard::new();
        let mut result = String::from("untouched");

        let outcome = guard.run_prefix("panicking", &mut result, |slot| {
            slot.push_str(" and modified");
            panic!("interceptor blew up");
        });

        assert_eq!(outcome, PrefixOutcome::RunOriginal);
        assert_eq!(result, "untouched");
        let event = guard.faults().iter().next().unwrap();
        assert!(event.message.contains("interceptor blew up"));
    }

    #[test]
    fn test_distinct_identities_each_logged() {
        let guard = FaultGuard::new();
        let mut slot = 0u8;
        let fail = |_: &mut u8| -> Result<PrefixOutcome> { Err(Error::Error("x".into())) };

        guard.run_prefix("a", &mut slot, fail);
        guard.run_prefix("b", &mut slot, fail);
        guard.run_prefix("a", &mut slot, fail);

        assert_eq!(guard.faults().len(), 2);
        assert_eq!(guard.faults().summary(), "2 faulted: a, b");
    }

    #[test]
    fn test_rewrite_failure_returns_original() {
        let guard = FaultGuard::new();
        let original = SequenceBuilder::new().ldarg(0).ret().build();

        let result = guard.run_rewrite("rewrite", &original, |_| {
            Err(rewrite_error!("unexpected stream"))
        });
        assert_eq!(result, original);

        let replaced = guard.run_rewrite("rewrite", &original, |seq| {
            let mut out = seq.clone();
            out.push(Instruction::nop());
            Ok(out)
        });
        assert_eq!(replaced.len(), 3);
        assert_eq!(guard.faults().len(), 1);
    }

    #[test]
    fn test_contained_panics_are_not_reported_by_panic_hook() {
        use std::sync::{
            atomic::{AtomicUsize, Ordering},
            Arc,
        };

        install_quiet_hook();

        let reported = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&reported);
        let this_thread = std::thread::current().id();
        let original = panic::take_hook();
        panic::set_hook(quiet_hook(Box::new(move |_| {
            if std::thread::current().id() == this_thread {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        })));

        let guard = FaultGuard::new();
        let mut result = true;
        for _ in 0..3 {
            guard.run_prefix("noisy", &mut result, |_| panic!("every frame"));
        }
        let contained = reported.load(Ordering::SeqCst);

        let uncontained = panic::catch_unwind(|| panic!("outside any guard"));
        let after_uncontained = reported.load(Ordering::SeqCst);
        panic::set_hook(original);

        assert_eq!(contained, 0);
        assert!(uncontained.is_err());
        assert_eq!(after_uncontained, 1);
        assert_eq!(guard.faults().len(), 1);
    }

    #[test]
    fn test_containing_flag_restored() {
        assert!(!CONTAINING.with(Cell::get));
        {
            let _outer = Containing::enter();
            {
                let _inner = Containing::enter();
                assert!(CONTAINING.with(Cell::get));
            }
            assert!(CONTAINING.with(Cell::get));
        }
        assert!(!CONTAINING.with(Cell::get));

        let guard = FaultGuard::new();
        let mut slot = 0u8;
        guard.run_prefix("flag", &mut slot, |_| {
            assert!(CONTAINING.with(Cell::get));
            Ok(PrefixOutcome::RunOriginal)
        });
        assert!(!CONTAINING.with(Cell::get));
    }

    #[test]
    fn test_empty_summary() {
        assert_eq!(FaultLog::new().summary(), "no faults");
    }
}
