use std::time::{Duration, Instant};

/// A scheduled search that fires once its quiet period elapses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledSearch {
    pub ticket: u64,
    pub text: String,
    pub due: Instant,
}

/// Debounced search input.
///
/// `schedule` cancels whatever is pending and starts a new quiet period;
/// `poll` hands out the pending text once it is due. At most one search is
/// ever pending.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    next_ticket: u64,
    pending: Option<ScheduledSearch>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(Duration::from_millis(350))
    }
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            next_ticket: 0,
            pending: None,
        }
    }

    /// Schedule `text`, superseding any pending search. Returns the ticket of
    /// the cancelled search, if there was one.
    pub fn schedule(&mut self, text: impl Into<String>, now: Instant) -> Option<u64> {
        self.next_ticket += 1;
        let superseded = self.pending.take().map(|p| p.ticket);
        self.pending = Some(ScheduledSearch {
            ticket: self.next_ticket,
            text: text.into(),
            due: now + self.delay,
        });
        superseded
    }

    pub fn cancel(&mut self) -> Option<ScheduledSearch> {
        self.pending.take()
    }

    pub fn pending(&self) -> Option<&ScheduledSearch> {
        self.pending.as_ref()
    }

    /// Take the pending search if its quiet period has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<ScheduledSearch> {
        match &self.pending {
            Some(p) if now >= p.due => self.pending.take(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_only_after_quiet_period() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(Duration::from_millis(350));
        assert!(d.schedule("ab", t0).is_none());
        assert!(d.poll(t0 + Duration::from_millis(100)).is_none());
        let fired = d.poll(t0 + Duration::from_millis(350)).unwrap();
        assert_eq!(fired.text, "ab");
        assert!(d.pending().is_none());
    }

    #[test]
    fn newer_input_cancels_pending_search() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(Duration::from_millis(350));
        d.schedule("a", t0);
        let first = d.pending().unwrap().ticket;
        let t1 = t0 + Duration::from_millis(300);
        assert_eq!(d.schedule("ab", t1), Some(first));
        // The first search would have been due here; it must not fire.
        assert!(d.poll(t0 + Duration::from_millis(400)).is_none());
        let fired = d.poll(t1 + Duration::from_millis(350)).unwrap();
        assert_eq!(fired.text, "ab");
        assert_ne!(fired.ticket, first);
    }

    #[test]
    fn cancel_drops_pending_search() {
        let t0 = Instant::now();
        let mut d = Debouncer::default();
        d.schedule("x", t0);
        assert_eq!(d.cancel().map(|s| s.text), Some("x".to_string()));
        assert!(d.poll(t0 + Duration::from_secs(5)).is_none());
    }
}
