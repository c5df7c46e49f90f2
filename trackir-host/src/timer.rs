use std::time::{Duration, Instant};

/// Paces a loop to a fixed rate without accumulating drift.
pub struct Timer {
    start: Instant,
    target: Duration,
}

impl Default for Timer {
    fn default() -> Self {
        Self {
            start: Instant::now(),
            target: Default::default(),
        }
    }
}

impl Timer {
    /// Sleep until the current target is reached.
    pub fn sleep(&self) {
        if let Some(duration) = self.target.checked_sub(self.start.elapsed()) {
            std::thread::sleep(duration);
        }
    }

    pub fn add(&mut self, duration: Duration) {
        self.target += duration;
    }

    /// Wait for the next tick and schedule the one after it.
    pub fn tick(&mut self, period: Duration) {
        self.sleep();
        self.add(period);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paces_ticks() {
        let mut timer = Timer::default();
        let period = Duration::from_millis(5);

        for _ in 0..5 {
            timer.tick(period);
        }
        timer.sleep();

        assert!(timer.start.elapsed() >= period * 5);
    }

    #[test]
    fn late_tick_does_not_sleep() {
        let mut timer = Timer::default();
        std::thread::sleep(Duration::from_millis(20));

        let before = Instant::now();
        timer.tick(Duration::from_millis(1));
        assert!(before.elapsed() < Duration::from_millis(20));
    }
}
