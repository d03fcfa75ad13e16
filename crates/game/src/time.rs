use std::cell::Cell;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

pub trait Clock {
    fn now_ms(&self) -> u64;

    fn now_secs(&self) -> f64 {
        self.now_ms() as f64 / 1000.0
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default()
    }
}

/// Hand-driven clock. Clones share the same time source.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now_ms: Rc<Cell<u64>>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now_ms: Rc::new(Cell::new(start_ms)),
        }
    }

    pub fn set(&self, now_ms: u64) {
        self.now_ms.set(now_ms);
    }

    pub fn advance(&self, delta_ms: u64) {
        self.now_ms.set(self.now_ms.get() + delta_ms);
    }

    pub fn advance_secs(&self, delta: f32) {
        self.advance((delta * 1000.0).round() as u64);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.get()
    }
}

pub struct FixedInterval {
    interval: f32,
    accumulator: f32,
}

impl FixedInterval {
    pub fn new(interval: f32) -> Self {
        Self {
            interval,
            accumulator: 0.0,
        }
    }

    pub fn from_millis(interval_ms: u64) -> Self {
        Self::new(interval_ms as f32 / 1000.0)
    }

    pub fn interval(&self) -> f32 {
        self.interval
    }

    pub fn accumulate(&mut self, delta: f32) {
        self.accumulator += delta.clamp(0.0, 0.25);
    }

    pub fn consume_tick(&mut self) -> bool {
        if self.accumulator >= self.interval {
            self.accumulator -= self.interval;
            true
        } else {
            false
        }
    }

    /// Consumes every elapsed tick and reports whether at least one fired.
    pub fn consume_all(&mut self) -> bool {
        let mut fired = false;
        while self.consume_tick() {
            fired = true;
        }
        fired
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::new(1_000);
        let other = clock.clone();

        clock.advance(250);
        assert_eq!(other.now_ms(), 1_250);
        assert!((other.now_secs() - 1.25).abs() < 1e-9);
    }

    #[test]
    fn fixed_interval_accumulation() {
        let mut interval = FixedInterval::from_millis(100);

        interval.accumulate(0.05);
        assert!(!interval.consume_tick());

        interval.accumulate(0.06);
        assert!(interval.consume_tick());
        assert!(!interval.consume_tick());
    }

    #[test]
    fn consume_all_collapses_backlog() {
        let mut interval = FixedInterval::from_millis(100);

        interval.accumulate(0.25);
        assert!(interval.consume_all());
        assert!(!interval.consume_all());
    }
}
