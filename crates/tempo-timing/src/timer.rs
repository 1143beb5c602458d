//! Accumulating timers.

use tempo_core::Result;

use crate::clock::{ClockSource, ClockSpec};

/// One named timer: a clock source plus a running total.
///
/// The accumulator exists for timers that are paused and resumed several
/// times within one frame: each start/stop pair measures one interval, and
/// `accumulate` folds that interval into the total that is sampled at the
/// end of the frame.
pub struct Timer {
    clock: Box<dyn ClockSource>,
    total: f64,
}

impl Timer {
    /// Create a timer over an already-built clock source.
    #[must_use]
    pub fn new(clock: Box<dyn ClockSource>) -> Self {
        Self { clock, total: 0.0 }
    }

    /// Create a timer with a clock built from `spec`.
    pub fn with_spec(spec: ClockSpec) -> Result<Self> {
        Ok(Self::new(spec.build()?))
    }

    /// Begin an interval.
    #[inline]
    pub fn start(&mut self) {
        self.clock.start();
    }

    /// End the current interval.
    #[inline]
    pub fn stop(&mut self) {
        self.clock.stop();
    }

    /// Duration of the last completed interval, in seconds.
    #[inline]
    #[must_use]
    pub fn elapsed_seconds(&self) -> f64 {
        self.clock.elapsed_seconds()
    }

    /// Add the last completed interval into the running total.
    #[inline]
    pub fn accumulate(&mut self) {
        self.total += self.clock.elapsed_seconds();
    }

    /// Zero the running total.
    #[inline]
    pub fn reset(&mut self) {
        self.total = 0.0;
    }

    /// The accumulated total, in seconds.
    #[inline]
    #[must_use]
    pub fn total_seconds(&self) -> f64 {
        self.total
    }

    /// Start an interval that stops and accumulates when the guard drops.
    ///
    /// ```
    /// # use tempo_timing::Timer;
    /// # let mut timer = Timer::with_spec(Default::default()).unwrap();
    /// {
    ///     let _scope = timer.scoped();
    ///     // ... work being measured ...
    /// } // interval accumulated here
    /// ```
    #[must_use]
    pub fn scoped(&mut self) -> TimerScope<'_> {
        self.start();
        TimerScope { timer: self }
    }
}

impl std::fmt::Debug for Timer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Timer").field("total", &self.total).finish()
    }
}

/// RAII guard that stops and accumulates its timer on drop.
pub struct TimerScope<'a> {
    timer: &'a mut Timer,
}

impl Drop for TimerScope<'_> {
    #[inline]
    fn drop(&mut self) {
        self.timer.stop();
        self.timer.accumulate();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use approx::assert_relative_eq;

    use super::*;
    use crate::clock::WallClock;

    #[test]
    fn accumulates_across_intervals() {
        let mut timer = Timer::new(Box::new(WallClock::new()));

        for _ in 0..3 {
            timer.start();
            std::thread::sleep(Duration::from_millis(2));
            timer.stop();
            timer.accumulate();
        }

        assert!(timer.total_seconds() >= 0.006);
    }

    #[test]
    fn reset_zeroes_the_total() {
        let mut timer = Timer::new(Box::new(WallClock::new()));
        timer.start();
        timer.stop();
        timer.accumulate();
        timer.reset();
        assert_relative_eq!(timer.total_seconds(), 0.0);
    }

    #[test]
    fn fresh_timer_reads_zero() {
        let timer = Timer::new(Box::new(WallClock::new()));
        assert_eq!(timer.elapsed_seconds(), 0.0);
        assert_eq!(timer.total_seconds(), 0.0);
    }

    #[test]
    fn scope_guard_accumulates_on_drop() {
        let mut timer = Timer::new(Box::new(WallClock::new()));
        {
            let _scope = timer.scoped();
            std::thread::sleep(Duration::from_millis(2));
        }
        assert!(timer.total_seconds() >= 0.002);
    }
}
