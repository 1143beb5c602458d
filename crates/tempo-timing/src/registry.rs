//! Name → id → timer registry.

use std::sync::Arc;

use hashbrown::HashMap;
use parking_lot::{Mutex, MutexGuard};

use tempo_core::constants::REGISTRY_PREALLOC;
use tempo_core::{Result, TimerId};

use crate::clock::{ClockSpec, WallClock};
use crate::timer::Timer;

struct Entry {
    name: String,
    timer: Timer,
}

/// Owns the timers polled once per simulation frame and the stable mapping
/// from timer name to dense id.
///
/// Ids are assigned in first-use order starting at 1 and are never reused;
/// registering an existing name returns the id it already holds. The
/// registry is an explicitly owned object with no process-wide state: one
/// per host, passed to the sampling call sites and the log writer.
pub struct TimerRegistry {
    spec: ClockSpec,
    index: HashMap<String, TimerId>,
    entries: Vec<Entry>,
}

impl Default for TimerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerRegistry {
    /// Create a registry whose timers use [`ClockSpec::Auto`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            spec: ClockSpec::Auto,
            index: HashMap::with_capacity(REGISTRY_PREALLOC),
            entries: Vec::with_capacity(REGISTRY_PREALLOC),
        }
    }

    /// Create a registry whose timers use the given clock backend.
    ///
    /// Fails early if the backend cannot be built at all, so a host asking
    /// for [`ClockSpec::Cycle`] on an unsupported machine finds out at
    /// startup rather than at the first registration.
    pub fn with_clock_spec(spec: ClockSpec) -> Result<Self> {
        drop(spec.build()?);
        Ok(Self {
            spec,
            index: HashMap::with_capacity(REGISTRY_PREALLOC),
            entries: Vec::with_capacity(REGISTRY_PREALLOC),
        })
    }

    /// Get the id for `name`, registering it on first use.
    pub fn register(&mut self, name: &str) -> TimerId {
        if let Some(&id) = self.index.get(name) {
            return id;
        }

        let id = TimerId(self.entries.len() as u32 + 1);
        let clock = self.spec.build().unwrap_or_else(|err| {
            // The spec was probed at construction, so this only fires if
            // the backend degrades mid-run.
            tracing::warn!("clock backend unavailable for `{name}`, using wall clock: {err}");
            Box::new(WallClock::new())
        });
        self.entries.push(Entry {
            name: name.to_owned(),
            timer: Timer::new(clock),
        });
        self.index.insert(name.to_owned(), id);
        id
    }

    /// Get the timer for `name`, registering it on first use.
    pub fn timer(&mut self, name: &str) -> &mut Timer {
        let id = self.register(name);
        &mut self.entries[id.index() - 1].timer
    }

    /// Get the timer for an already-assigned id.
    pub fn timer_mut(&mut self, id: TimerId) -> Option<&mut Timer> {
        let slot = id.index().checked_sub(1)?;
        self.entries.get_mut(slot).map(|e| &mut e.timer)
    }

    /// The id assigned to `name`, if any.
    #[must_use]
    pub fn id(&self, name: &str) -> Option<TimerId> {
        self.index.get(name).copied()
    }

    /// The name bound to `id`, if any.
    #[must_use]
    pub fn name(&self, id: TimerId) -> Option<&str> {
        let slot = id.index().checked_sub(1)?;
        self.entries.get(slot).map(|e| e.name.as_str())
    }

    /// Number of registered timers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no timers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Per-timer `(id, name, accumulated seconds)` in id order.
    pub fn entries(&self) -> impl Iterator<Item = (TimerId, &str, f64)> + '_ {
        self.entries.iter().enumerate().map(|(slot, e)| {
            (
                TimerId(slot as u32 + 1),
                e.name.as_str(),
                e.timer.total_seconds(),
            )
        })
    }

    /// Zero every timer's accumulator for the next frame.
    pub fn reset_all(&mut self) {
        for entry in &mut self.entries {
            entry.timer.reset();
        }
    }
}

/// A registry shared between producer threads.
///
/// Each timer's start/stop/accumulate sequence still belongs to a single
/// logical owner per name; the lock makes name registration (an id
/// assignment) safe from any thread.
#[derive(Clone)]
pub struct SharedRegistry {
    inner: Arc<Mutex<TimerRegistry>>,
}

impl SharedRegistry {
    /// Wrap a registry for cross-thread use.
    #[must_use]
    pub fn new(registry: TimerRegistry) -> Self {
        Self {
            inner: Arc::new(Mutex::new(registry)),
        }
    }

    /// Get the id for `name`, registering it on first use.
    pub fn register(&self, name: &str) -> TimerId {
        self.inner.lock().register(name)
    }

    /// Lock the registry for sampling or timer access.
    pub fn lock(&self) -> MutexGuard<'_, TimerRegistry> {
        self.inner.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_dense_and_stable() {
        let mut registry = TimerRegistry::new();
        let a = registry.register("A");
        let b = registry.register("B");
        let a_again = registry.register("A");
        let c = registry.register("C");

        assert_eq!(a, TimerId(1));
        assert_eq!(b, TimerId(2));
        assert_eq!(a_again, TimerId(1));
        assert_eq!(c, TimerId(3));
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn timer_lookup_is_idempotent() {
        let mut registry = TimerRegistry::new();
        registry.timer("frame").start();
        registry.timer("frame").stop();
        registry.timer("frame").accumulate();

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.name(TimerId(1)), Some("frame"));
        assert_eq!(registry.id("frame"), Some(TimerId(1)));
    }

    #[test]
    fn sentinel_and_unknown_ids_resolve_to_nothing() {
        let mut registry = TimerRegistry::new();
        registry.register("frame");

        assert_eq!(registry.name(TimerId::SENTINEL), None);
        assert!(registry.timer_mut(TimerId::SENTINEL).is_none());
        assert_eq!(registry.name(TimerId(7)), None);
    }

    #[test]
    fn holds_many_names_in_registration_order() {
        let mut registry = TimerRegistry::new();
        for i in 0..100 {
            let id = registry.register(&format!("timer-{i}"));
            assert_eq!(id, TimerId(i + 1));
        }

        let names: Vec<_> = registry.entries().map(|(_, name, _)| name.to_owned()).collect();
        assert_eq!(names.len(), 100);
        assert_eq!(names[0], "timer-0");
        assert_eq!(names[99], "timer-99");
    }

    #[test]
    fn reset_all_zeroes_accumulators() {
        let mut registry = TimerRegistry::new();
        let timer = registry.timer("frame");
        timer.start();
        timer.stop();
        timer.accumulate();

        registry.reset_all();

        let (_, _, seconds) = registry.entries().next().unwrap();
        assert_eq!(seconds, 0.0);
    }

    #[test]
    fn shared_registry_assigns_ids_across_threads() {
        let shared = SharedRegistry::new(TimerRegistry::new());

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let shared = shared.clone();
                std::thread::spawn(move || {
                    for i in 0..16 {
                        shared.register(&format!("worker-{i}"));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        // Same 16 names from every thread: one id each, all dense.
        let registry = shared.lock();
        assert_eq!(registry.len(), 16);
        for i in 0..16u32 {
            assert!(registry.id(&format!("worker-{i}")).is_some());
        }
    }
}
