//! Injected time and the cancelable debounce timer

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Source of the current instant
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    base: Instant,
    elapsed_ms: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            elapsed_ms: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.elapsed_ms
            .fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + Duration::from_millis(self.elapsed_ms.load(Ordering::SeqCst))
    }
}

/// A single pending deadline carrying a key (the page it was armed for).
///
/// Arming again replaces the deadline instead of stacking a second timer.
#[derive(Debug, Clone)]
pub struct DebounceTimer<K> {
    delay: Duration,
    pending: Option<(K, Instant)>,
}

impl<K: Clone + PartialEq> DebounceTimer<K> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// (Re)start the countdown for `key`.
    ///
    /// Returns the key of a pending timer for a *different* key that was
    /// displaced, so the caller can flush it.
    pub fn arm(&mut self, key: K, now: Instant) -> Option<K> {
        let displaced = match self.pending.take() {
            Some((old, _)) if old != key => Some(old),
            _ => None,
        };
        self.pending = Some((key, now + self.delay));
        displaced
    }

    pub fn cancel(&mut self) -> Option<K> {
        self.pending.take().map(|(key, _)| key)
    }

    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, at)| *at)
    }

    /// Disarm and return the key if the deadline has passed
    pub fn take_expired(&mut self, now: Instant) -> Option<K> {
        match &self.pending {
            Some((_, at)) if *at <= now => self.cancel(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rearm_resets_deadline() {
        let clock = ManualClock::new();
        let mut timer = DebounceTimer::new(Duration::from_millis(500));

        timer.arm("p", clock.now());
        clock.advance(Duration::from_millis(400));
        timer.arm("p", clock.now());
        clock.advance(Duration::from_millis(400));

        assert_eq!(timer.take_expired(clock.now()), None);
        clock.advance(Duration::from_millis(100));
        assert_eq!(timer.take_expired(clock.now()), Some("p"));
        assert!(!timer.is_armed());
    }

    #[test]
    fn test_arm_for_other_key_reports_displaced() {
        let now = Instant::now();
        let mut timer = DebounceTimer::new(Duration::from_millis(10));
        assert_eq!(timer.arm("a", now), None);
        assert_eq!(timer.arm("a", now), None);
        assert_eq!(timer.arm("b", now), Some("a"));
        assert_eq!(timer.take_expired(now + Duration::from_millis(10)), Some("b"));
    }

    #[test]
    fn test_cancel() {
        let mut timer = DebounceTimer::new(Duration::from_millis(10));
        timer.arm(1, Instant::now());
        assert_eq!(timer.cancel(), Some(1));
        assert_eq!(timer.cancel(), None);
        assert_eq!(timer.deadline(), None);
    }

    #[test]
    fn test_manual_clock_clones_share_time() {
        let clock = ManualClock::new();
        let other = clock.clone();
        let start = clock.now();
        other.advance(Duration::from_millis(250));
        assert_eq!(clock.now() - start, Duration::from_millis(250));
    }
}
