//! stderr diagnostics.
//!
//! Messages go straight to stderr unless the TUI owns the terminal, in which
//! case they are held until [`drain`] is called after the terminal is
//! restored. Verbose-only messages are dropped unless `--verbose` was given.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

static BUFFER: Mutex<Option<Vec<String>>> = Mutex::new(None);
static VERBOSE: AtomicBool = AtomicBool::new(false);

fn buffer() -> MutexGuard<'static, Option<Vec<String>>> {
    BUFFER.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub fn set_verbose(verbose: bool) {
    VERBOSE.store(verbose, Ordering::Relaxed);
}

pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::Relaxed)
}

/// Start holding messages instead of printing them.
pub fn activate() {
    *buffer() = Some(Vec::new());
}

/// Stop holding messages and return everything collected.
pub fn drain() -> Vec<String> {
    buffer().take().unwrap_or_default()
}

/// Print or hold a message.
pub fn emit(msg: String) {
    let mut guard = buffer();
    if let Some(buf) = guard.as_mut() {
        buf.push(msg);
    } else {
        drop(guard);
        eprintln!("{}", msg);
    }
}

/// Like `eprintln!`, routed through the diagnostics buffer.
#[macro_export]
macro_rules! diag_warn {
    ($($arg:tt)*) => {
        $crate::diag::emit(format!($($arg)*))
    };
}

/// Emitted only when verbose output is enabled.
#[macro_export]
macro_rules! diag_verbose {
    ($($arg:tt)*) => {
        if $crate::diag::is_verbose() {
            $crate::diag::emit(format!($($arg)*))
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    // One test so the process-wide buffer isn't shared across parallel tests
    #[test]
    fn test_buffering_and_verbose_gate() {
        activate();
        set_verbose(false);
        crate::diag_warn!("kept {}", 1);
        crate::diag_verbose!("dropped");
        set_verbose(true);
        crate::diag_verbose!("kept {}", 2);
        set_verbose(false);

        let messages = drain();
        assert!(messages.contains(&"kept 1".to_string()));
        assert!(messages.contains(&"kept 2".to_string()));
        assert!(!messages.contains(&"dropped".to_string()));

        // Buffer is gone after draining
        assert!(drain().is_empty());
    }
}
