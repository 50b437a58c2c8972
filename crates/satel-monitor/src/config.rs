use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;

/// What the change-monitor task polls for, mutable while the monitor is
/// running. `poll_interval` of zero disables the `READ_SYSTEM_CHANGES` poll
/// entirely; a zero entry in `zone_intervals`/`output_intervals` means "not
/// monitored" (the entry is removed on set, not kept as a zero).
#[derive(Debug, Clone, Default)]
pub struct MonitorConfig {
    pub poll_interval: Duration,
    pub zone_intervals: HashMap<u16, Duration>,
    pub output_intervals: HashMap<u16, Duration>,
}

struct ReconfigInner {
    open_scopes: AtomicUsize,
    dirty: AtomicBool,
    wakeup: Notify,
}

/// Coalesces batch reconfiguration (setting many zone/output intervals at
/// once) into a single wakeup of the monitor task: the wakeup fires when the
/// last outstanding `ReconfigScope` is dropped, not on every individual
/// field write, and only if something was actually marked dirty while a
/// scope was open.
#[derive(Clone)]
pub struct Reconfigurer {
    inner: Arc<ReconfigInner>,
}

impl Reconfigurer {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ReconfigInner {
                open_scopes: AtomicUsize::new(0),
                dirty: AtomicBool::new(false),
                wakeup: Notify::new(),
            }),
        }
    }

    /// Opens a reconfiguration scope. Mutate the shared `MonitorConfig` (via
    /// whatever lock guards it) while the scope is alive, then call
    /// `mark_dirty` before dropping it.
    pub fn scope(&self) -> ReconfigScope {
        self.inner.open_scopes.fetch_add(1, Ordering::AcqRel);
        ReconfigScope { inner: self.inner.clone() }
    }

    pub(crate) async fn wait_for_wakeup(&self) {
        self.inner.wakeup.notified().await;
    }
}

impl Default for Reconfigurer {
    fn default() -> Self {
        Self::new()
    }
}

/// A single in-flight reconfiguration. Dropping the last live scope signals
/// the monitor's wakeup event if any scope marked it dirty.
pub struct ReconfigScope {
    inner: Arc<ReconfigInner>,
}

impl ReconfigScope {
    pub fn mark_dirty(&self) {
        self.inner.dirty.store(true, Ordering::Release);
    }
}

impl Drop for ReconfigScope {
    fn drop(&mut self) {
        if self.inner.open_scopes.fetch_sub(1, Ordering::AcqRel) == 1 && self.inner.dirty.swap(false, Ordering::AcqRel) {
            self.inner.wakeup.notify_one();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn wakeup_fires_only_after_the_last_scope_drops() {
        let reconfig = Reconfigurer::new();
        let outer = reconfig.scope();
        let inner = reconfig.scope();
        inner.mark_dirty();
        drop(inner);

        let woke = tokio::time::timeout(Duration::from_millis(20), reconfig.wait_for_wakeup()).await;
        assert!(woke.is_err(), "wakeup must not fire while the outer scope is still open");

        drop(outer);
        let woke = tokio::time::timeout(Duration::from_millis(50), reconfig.wait_for_wakeup()).await;
        assert!(woke.is_ok(), "dropping the last scope must fire the wakeup it inherited as dirty");
    }

    #[tokio::test]
    async fn wakeup_fires_immediately_when_the_only_scope_is_dirty() {
        let reconfig = Reconfigurer::new();
        let scope = reconfig.scope();
        scope.mark_dirty();
        drop(scope);

        let woke = tokio::time::timeout(Duration::from_millis(50), reconfig.wait_for_wakeup()).await;
        assert!(woke.is_ok());
    }

    #[tokio::test]
    async fn a_clean_scope_never_wakes_the_monitor() {
        let reconfig = Reconfigurer::new();
        drop(reconfig.scope());
        let woke = tokio::time::timeout(Duration::from_millis(20), reconfig.wait_for_wakeup()).await;
        assert!(woke.is_err());
    }
}
