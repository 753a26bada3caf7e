/// Monotonic request generation counter.
///
/// Every request that may overwrite view state takes a fresh generation; a
/// response is applied only if it carries the latest one. Bumping without
/// issuing a request (`invalidate`) orphans everything in flight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Generation {
    latest: u64,
}

impl Generation {
    pub fn issue(&mut self) -> u64 {
        self.latest += 1;
        self.latest
    }

    pub fn invalidate(&mut self) {
        self.latest += 1;
    }

    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.latest
    }

    #[cfg(test)]
    pub fn latest(&self) -> u64 {
        self.latest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_latest_issued_generation_is_current() {
        let mut g = Generation::default();
        let a = g.issue();
        let b = g.issue();
        assert!(!g.is_current(a));
        assert!(g.is_current(b));
        g.invalidate();
        assert!(!g.is_current(b));
        assert!(g.latest() > b);
    }
}
