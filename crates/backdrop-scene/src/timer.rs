//! Polled fixed-period timers.

/// A repeating timer polled from the frame loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    period_ms: u64,
    next_due_ms: Option<u64>,
}

impl Interval {
    /// A stopped timer firing every `period_ms` (at least 1 ms) once started.
    pub fn new(period_ms: u64) -> Self {
        Self {
            period_ms: period_ms.max(1),
            next_due_ms: None,
        }
    }

    pub fn start(&mut self, now_ms: u64) {
        self.next_due_ms = Some(now_ms.saturating_add(self.period_ms));
    }

    pub fn stop(&mut self) {
        self.next_due_ms = None;
    }

    pub fn is_running(&self) -> bool {
        self.next_due_ms.is_some()
    }

    pub fn period_ms(&self) -> u64 {
        self.period_ms
    }

    /// True if the timer is due. Missed periods collapse into one firing.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        match self.next_due_ms {
            Some(due) if now_ms >= due => {
                self.next_due_ms = Some(now_ms.saturating_add(self.period_ms));
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stopped_timer_never_fires() {
        let mut timer = Interval::new(1000);
        assert!(!timer.poll(5_000));
    }

    #[test]
    fn test_fires_once_per_period() {
        let mut timer = Interval::new(1000);
        timer.start(0);
        assert!(!timer.poll(999));
        assert!(timer.poll(1000));
        assert!(!timer.poll(1500));
        assert!(timer.poll(2000));
    }

    #[test]
    fn test_missed_periods_collapse() {
        let mut timer = Interval::new(1000);
        timer.start(0);
        assert!(timer.poll(10_000));
        assert!(!timer.poll(10_500));
        timer.stop();
        assert!(!timer.is_running());
        assert!(!timer.poll(50_000));
    }
}
