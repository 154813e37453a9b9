//! Process-wide "input enabled" flag.
//!
//! The coordinator holds an [`InputLock`] for the whole of a request; the
//! flag is restored when the lock is dropped, on every exit path.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone)]
pub struct InputGate {
    enabled: Arc<AtomicBool>,
}

impl Default for InputGate {
    fn default() -> Self {
        Self {
            enabled: Arc::new(AtomicBool::new(true)),
        }
    }
}

impl InputGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Disable input until the returned lock is dropped.
    ///
    /// Returns `None` when input is already disabled.
    pub fn try_lock(&self) -> Option<InputLock> {
        self.enabled
            .compare_exchange(true, false, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| InputLock {
                enabled: Arc::clone(&self.enabled),
            })
    }
}

/// Re-enables input on drop.
#[derive(Debug)]
pub struct InputLock {
    enabled: Arc<AtomicBool>,
}

impl Drop for InputLock {
    fn drop(&mut self) {
        self.enabled.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_disables_until_dropped() {
        let gate = InputGate::new();
        let lock = gate.try_lock().unwrap();
        assert!(!gate.is_enabled());
        assert!(gate.try_lock().is_none());
        drop(lock);
        assert!(gate.is_enabled());
    }

    #[test]
    fn test_lock_released_on_panic() {
        let gate = InputGate::new();
        let inner = gate.clone();
        let result = std::panic::catch_unwind(move || {
            let _lock = inner.try_lock();
            panic!("turn loop blew up");
        });
        assert!(result.is_err());
        assert!(gate.is_enabled());
    }
}
