use std::sync::atomic::{AtomicBool, Ordering};

/// RAII guard over the session's `busy` flag.
///
/// Acquisition fails instead of waiting; the flag is cleared on drop, so every
/// exit path of an intent releases it.
pub(crate) struct BusyGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> BusyGuard<'a> {
    /// Claim the flag, or `None` if another operation holds it.
    pub(crate) fn try_acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
