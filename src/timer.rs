use std::time::Duration;

/// Fixed-period tick source owned by the session.
///
/// Starting an already running ticker keeps its accumulator, so repeated
/// start requests never double the tick rate. Stopping drops any partial
/// period, so a stopped ticker yields nothing until started again.
#[derive(Clone, Debug)]
pub(crate) struct Ticker {
    period: Duration,
    accum: Duration,
    running: bool,
}

impl Ticker {
    pub(crate) fn new(period: Duration) -> Self {
        Self {
            period: period.max(Duration::from_millis(1)),
            accum: Duration::ZERO,
            running: false,
        }
    }

    pub(crate) fn period(&self) -> Duration {
        self.period
    }

    pub(crate) fn is_running(&self) -> bool {
        self.running
    }

    pub(crate) fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        self.accum = Duration::ZERO;
        log::debug!("ticker started ({:?})", self.period);
    }

    pub(crate) fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.accum = Duration::ZERO;
        log::debug!("ticker stopped");
    }

    /// Feeds wall time in and returns how many whole ticks are due.
    pub(crate) fn advance(&mut self, dt: Duration) -> u32 {
        if !self.running {
            return 0;
        }
        self.accum = self.accum.saturating_add(dt);
        let mut due = 0;
        while self.accum >= self.period {
            self.accum = self.accum.saturating_sub(self.period);
            due += 1;
        }
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stopped_ticker_yields_nothing() {
        let mut t = Ticker::new(Duration::from_millis(200));
        assert_eq!(t.advance(Duration::from_secs(5)), 0);
    }

    #[test]
    fn partial_periods_carry_over() {
        let mut t = Ticker::new(Duration::from_millis(200));
        t.start();
        assert_eq!(t.advance(Duration::from_millis(150)), 0);
        assert_eq!(t.advance(Duration::from_millis(150)), 1);
        assert_eq!(t.advance(Duration::from_millis(100)), 1);
    }

    #[test]
    fn double_start_does_not_reset_or_duplicate() {
        let mut t = Ticker::new(Duration::from_millis(100));
        t.start();
        assert_eq!(t.advance(Duration::from_millis(50)), 0);
        t.start();
        assert_eq!(t.advance(Duration::from_millis(950)), 10);
    }

    #[test]
    fn stop_is_idempotent_and_drops_partial() {
        let mut t = Ticker::new(Duration::from_millis(100));
        t.start();
        t.advance(Duration::from_millis(90));
        t.stop();
        t.stop();
        assert!(!t.is_running());
        t.start();
        assert_eq!(t.advance(Duration::from_millis(90)), 0);
    }
}
