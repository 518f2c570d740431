use std::time::{Duration, Instant};

/// Holds back a value until no newer one has arrived for `delay`.
///
/// Time is passed in explicitly, which keeps the debouncer deterministic:
/// the caller decides what "now" is and when to poll.
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<T>,
    deadline: Option<Instant>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Debouncer<T> {
        Debouncer {
            delay: delay,
            pending: None,
            deadline: None,
        }
    }

    /// Replaces any pending value with `value` and restarts the wait. The
    /// replaced value is dropped, never delivered.
    pub fn schedule(&mut self, value: T, now: Instant) {
        self.pending = Some(value);
        self.deadline = Some(now + self.delay);
    }

    /// Drops the pending value, if any.
    pub fn cancel(&mut self) {
        self.pending = None;
        self.deadline = None;
    }

    /// When the pending value becomes due.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Takes the pending value if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                self.pending.take()
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_after_delay() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(100));
        debouncer.schedule(1, start);
        assert_eq!(debouncer.poll(start + Duration::from_millis(99)), None);
        assert_eq!(debouncer.poll(start + Duration::from_millis(100)), Some(1));
        assert_eq!(debouncer.poll(start + Duration::from_millis(500)), None);
        assert_eq!(debouncer.deadline(), None);
    }

    #[test]
    fn test_newer_value_replaces_and_restarts() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(100));
        debouncer.schedule("first", start);
        debouncer.schedule("second", start + Duration::from_millis(80));
        assert_eq!(debouncer.poll(start + Duration::from_millis(120)), None);
        assert_eq!(
            debouncer.deadline(),
            Some(start + Duration::from_millis(180))
        );
        assert_eq!(
            debouncer.poll(start + Duration::from_millis(180)),
            Some("second")
        );
    }

    #[test]
    fn test_cancel() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(10));
        debouncer.schedule((), start);
        debouncer.cancel();
        assert_eq!(debouncer.poll(start + Duration::from_secs(1)), None);
        assert_eq!(debouncer.deadline(), None);
    }
}
