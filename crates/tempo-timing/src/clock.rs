//! Elapsed-time clock sources.
//!
//! Two interchangeable backends measure one start/stop interval:
//!
//! - [`CycleClock`] reads the hardware cycle counter (`rdtsc` on x86_64,
//!   `cntvct_el0` on aarch64) and converts ticks to seconds using the
//!   counter's tick rate. Construction fails on architectures without a
//!   usable counter.
//! - [`WallClock`] reads the OS monotonic clock via [`Instant`]. It is
//!   immune to calendar-clock adjustments and always available.
//!
//! The backend is chosen at construction time through [`ClockSpec`];
//! [`ClockSpec::Auto`] prefers the cycle counter and falls back to the
//! wall clock when it is unavailable.

use std::time::{Duration, Instant};

use tempo_core::Result;

/// A source of elapsed-time intervals.
///
/// `start` begins an interval and `stop` ends it; `elapsed_seconds` is the
/// duration of the most recent completed interval. Before the first
/// start/stop pair it reads `0.0`. Repeated pairs overwrite the interval.
pub trait ClockSource: Send {
    /// Begin an interval.
    fn start(&mut self);
    /// End the interval begun by the last `start`.
    fn stop(&mut self);
    /// Duration of the last completed interval, in seconds.
    fn elapsed_seconds(&self) -> f64;
}

/// Clock backend selection, resolved when a timer is constructed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ClockSpec {
    /// Prefer the hardware cycle counter, fall back to the wall clock.
    #[default]
    Auto,
    /// Require the hardware cycle counter.
    Cycle,
    /// Use the OS monotonic clock.
    Wall,
}

impl ClockSpec {
    /// Build a clock source for this spec.
    ///
    /// Only [`ClockSpec::Cycle`] can fail; `Auto` downgrades to the wall
    /// clock when no cycle counter is available.
    pub fn build(self) -> Result<Box<dyn ClockSource>> {
        match self {
            Self::Auto => match CycleClock::new() {
                Ok(clock) => Ok(Box::new(clock)),
                Err(err) => {
                    tracing::debug!("cycle counter unavailable, using wall clock: {err}");
                    Ok(Box::new(WallClock::new()))
                }
            },
            Self::Cycle => Ok(Box::new(CycleClock::new()?)),
            Self::Wall => Ok(Box::new(WallClock::new())),
        }
    }
}

/// Monotonic wall-clock backend.
#[derive(Debug, Default)]
pub struct WallClock {
    begin: Option<Instant>,
    last: Duration,
}

impl WallClock {
    /// Create a wall clock with no completed interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClockSource for WallClock {
    #[inline]
    fn start(&mut self) {
        self.begin = Some(Instant::now());
    }

    #[inline]
    fn stop(&mut self) {
        if let Some(begin) = self.begin {
            self.last = begin.elapsed();
        }
    }

    #[inline]
    fn elapsed_seconds(&self) -> f64 {
        self.last.as_secs_f64()
    }
}

/// Hardware cycle-counter backend.
///
/// Tick rate comes from `cntfrq_el0` on aarch64 and from a one-time
/// calibration against the monotonic clock on x86_64 (the TSC rate is not
/// architecturally reported).
#[derive(Debug)]
pub struct CycleClock {
    ticks_per_second: f64,
    begin: u64,
    last_ticks: u64,
}

impl CycleClock {
    /// Create a cycle clock, failing with
    /// [`tempo_core::Error::ClockUnavailable`] on architectures without a
    /// readable counter.
    pub fn new() -> Result<Self> {
        let ticks_per_second = Self::counter_rate()?;
        Ok(Self {
            ticks_per_second,
            begin: 0,
            last_ticks: 0,
        })
    }

    /// Counter ticks per second.
    #[must_use]
    pub fn ticks_per_second(&self) -> f64 {
        self.ticks_per_second
    }

    #[cfg(target_arch = "x86_64")]
    fn counter_rate() -> Result<f64> {
        use std::sync::OnceLock;

        // Calibrated once per process; the invariant TSC rate does not drift.
        static RATE: OnceLock<f64> = OnceLock::new();

        const CALIBRATION_WINDOW: Duration = Duration::from_millis(10);

        Ok(*RATE.get_or_init(|| {
            let wall = Instant::now();
            let first = Self::read_ticks();
            while wall.elapsed() < CALIBRATION_WINDOW {
                std::hint::spin_loop();
            }
            let ticks = Self::read_ticks().wrapping_sub(first);
            ticks as f64 / wall.elapsed().as_secs_f64()
        }))
    }

    #[cfg(target_arch = "aarch64")]
    fn counter_rate() -> Result<f64> {
        let freq: u64;
        // SAFETY: cntfrq_el0 is readable from EL0 on all aarch64 targets
        // Rust supports.
        unsafe {
            std::arch::asm!("mrs {}, cntfrq_el0", out(reg) freq);
        }
        if freq == 0 {
            return Err(tempo_core::Error::ClockUnavailable(
                "cntfrq_el0 reports a zero counter frequency".into(),
            ));
        }
        Ok(freq as f64)
    }

    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    fn counter_rate() -> Result<f64> {
        Err(tempo_core::Error::ClockUnavailable(
            "no hardware cycle counter on this architecture".into(),
        ))
    }

    #[cfg(target_arch = "x86_64")]
    #[inline]
    fn read_ticks() -> u64 {
        // SAFETY: _rdtsc has no preconditions.
        unsafe { std::arch::x86_64::_rdtsc() }
    }

    #[cfg(target_arch = "aarch64")]
    #[inline]
    fn read_ticks() -> u64 {
        let ticks: u64;
        // SAFETY: cntvct_el0 is readable from EL0.
        unsafe {
            std::arch::asm!("mrs {}, cntvct_el0", out(reg) ticks);
        }
        ticks
    }

    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    #[inline]
    fn read_ticks() -> u64 {
        0
    }
}

impl ClockSource for CycleClock {
    #[inline]
    fn start(&mut self) {
        self.begin = Self::read_ticks();
    }

    #[inline]
    fn stop(&mut self) {
        self.last_ticks = Self::read_ticks().wrapping_sub(self.begin);
    }

    #[inline]
    fn elapsed_seconds(&self) -> f64 {
        self.last_ticks as f64 / self.ticks_per_second
    }
}
