//! Opt-in phase timing.
//!
//! Enabled programmatically or by setting `SG_TIMING`. When disabled the
//! timers cost one relaxed atomic load.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Instant;

static ENABLED: AtomicBool = AtomicBool::new(false);

pub fn enable_timing() {
    ENABLED.store(true, Ordering::Relaxed);
}

pub fn disable_timing() {
    ENABLED.store(false, Ordering::Relaxed);
}

pub fn is_enabled() -> bool {
    ENABLED.load(Ordering::Relaxed) || std::env::var_os("SG_TIMING").is_some()
}

/// Wall-clock timer for a single section.
pub struct Timer {
    start: Instant,
    enabled: bool,
}

impl Timer {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
            enabled: is_enabled(),
        }
    }

    /// Elapsed seconds, or `None` if timing is disabled.
    pub fn stop(self) -> Option<f64> {
        self.enabled.then(|| self.start.elapsed().as_secs_f64())
    }

    /// Stop and add the elapsed time to an accumulator.
    pub fn stop_into(self, acc: &AccumulatingTimer) {
        if let Some(elapsed) = self.stop() {
            acc.record(elapsed);
        }
    }
}

/// Accumulates total time and call count across many sections.
pub struct AccumulatingTimer {
    total_ns: AtomicU64,
    count: AtomicU64,
}

impl Default for AccumulatingTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl AccumulatingTimer {
    pub const fn new() -> Self {
        Self {
            total_ns: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    pub fn record(&self, duration_s: f64) {
        let nanos = (duration_s * 1e9) as u64;
        self.total_ns.fetch_add(nanos, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn total_seconds(&self) -> f64 {
        self.total_ns.load(Ordering::Relaxed) as f64 / 1e9
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn average_seconds(&self) -> f64 {
        let count = self.count();
        if count > 0 {
            self.total_seconds() / count as f64
        } else {
            0.0
        }
    }

    pub fn reset(&self) {
        self.total_ns.store(0, Ordering::Relaxed);
        self.count.store(0, Ordering::Relaxed);
    }
}

/// Per-phase timers for one closure correction.
pub mod closure_timing {
    use super::AccumulatingTimer;

    /// Dissipation coefficient Ce (cD is timed with the eddy-viscosity update)
    pub static COEFFICIENTS: AccumulatingTimer = AccumulatingTimer::new();
    /// Eddy-viscosity update including cD
    pub static NUT_UPDATE: AccumulatingTimer = AccumulatingTimer::new();
    /// k-equation assembly
    pub static K_ASSEMBLY: AccumulatingTimer = AccumulatingTimer::new();
    /// Linear solve for k
    pub static K_SOLVE: AccumulatingTimer = AccumulatingTimer::new();

    pub fn reset_all() {
        COEFFICIENTS.reset();
        NUT_UPDATE.reset();
        K_ASSEMBLY.reset();
        K_SOLVE.reset();
    }

    /// Log the accumulated phase times at `info` level.
    pub fn log_summary() {
        if !super::is_enabled() {
            return;
        }
        for (label, timer) in [
            ("coefficients", &COEFFICIENTS),
            ("nut update", &NUT_UPDATE),
            ("k assembly", &K_ASSEMBLY),
            ("k solve", &K_SOLVE),
        ] {
            if timer.count() > 0 {
                tracing::info!(
                    phase = label,
                    calls = timer.count(),
                    total_s = timer.total_seconds(),
                    avg_ms = timer.average_seconds() * 1000.0,
                    "closure timing"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulating_timer_averages() {
        let acc = AccumulatingTimer::new();
        acc.record(0.5);
        acc.record(1.5);
        assert_eq!(acc.count(), 2);
        assert!((acc.total_seconds() - 2.0).abs() < 1e-6);
        assert!((acc.average_seconds() - 1.0).abs() < 1e-6);
        acc.reset();
        assert_eq!(acc.count(), 0);
        assert_eq!(acc.average_seconds(), 0.0);
    }

    #[test]
    fn reset_all_clears_every_phase() {
        use closure_timing::*;
        for timer in [&COEFFICIENTS, &NUT_UPDATE, &K_ASSEMBLY, &K_SOLVE] {
            timer.record(0.25);
        }
        reset_all();
        for timer in [&COEFFICIENTS, &NUT_UPDATE, &K_ASSEMBLY, &K_SOLVE] {
            assert_eq!(timer.count(), 0);
        }
    }
}
