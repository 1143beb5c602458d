//! Clock backends and the named-timer registry for the Tempo pipeline.
//!
//! This crate provides the measurement half of the pipeline:
//! - [`ClockSource`] and its two backends: the hardware cycle counter and
//!   the OS monotonic clock, selected at construction time via [`ClockSpec`]
//! - [`Timer`], a clock plus an accumulator for timers that are paused and
//!   resumed several times within one frame
//! - [`TimerRegistry`], which binds names to dense ids and owns the timers
//!   polled once per simulation frame
//!
//! # Usage
//!
//! ```
//! use tempo_timing::TimerRegistry;
//!
//! let mut registry = TimerRegistry::new();
//! let timer = registry.timer("cull");
//! timer.start();
//! // ... work being measured ...
//! timer.stop();
//! timer.accumulate();
//! ```

mod clock;
mod registry;
mod timer;

pub use clock::{ClockSource, ClockSpec, CycleClock, WallClock};
pub use registry::{SharedRegistry, TimerRegistry};
pub use timer::{Timer, TimerScope};
