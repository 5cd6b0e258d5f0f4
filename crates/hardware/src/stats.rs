//! Simulation statistics collection and reporting.
//!
//! This module tracks what the engine did during a program's life. It provides:
//! 1. **Cycles:** Committed, undone and rolled-back cycles.
//! 2. **Exceptions:** Software exceptions and hardware interrupts dispatched.
//! 3. **Instruction Cache:** Hits, misses, bypasses and invalidations.
//! 4. **Reporting:** A printable summary including the cycle rate of the last run.

use std::fmt;
use std::time::Duration;

use crate::core::icache::CacheCounters;

/// Counters accumulated since construction or the last reset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SimStats {
    /// Cycles committed.
    pub cycles: u64,
    /// Cycles reverted by undo.
    pub cycles_undone: u64,
    /// Cycles rolled back while waiting for input or on cancellation.
    pub cycles_rolled_back: u64,
    /// Exceptions raised by instructions and dispatched.
    pub exceptions_taken: u64,
    /// Hardware interrupts dispatched.
    pub interrupts_taken: u64,
    /// Instruction cache counters.
    pub icache: CacheCounters,
    /// Wall-clock time spent executing cycles.
    pub execution_time: Duration,
}

impl SimStats {
    /// Cycles per second over the accumulated execution time.
    pub fn cycles_per_second(&self) -> f64 {
        let secs = self.execution_time.as_secs_f64();
        if secs > 0.0 {
            self.cycles as f64 / secs
        } else {
            0.0
        }
    }

    /// Fraction of cached fetches served without decoding.
    pub fn icache_hit_rate(&self) -> f64 {
        let lookups = self.icache.hits + self.icache.misses;
        if lookups == 0 {
            0.0
        } else {
            self.icache.hits as f64 / lookups as f64
        }
    }
}

impl fmt::Display for SimStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "==========================================================")?;
        writeln!(f, "MIPS32 SIMULATION STATISTICS")?;
        writeln!(f, "==========================================================")?;
        writeln!(f, "sim_cycles               {}", self.cycles)?;
        writeln!(f, "sim_cycles_undone        {}", self.cycles_undone)?;
        writeln!(f, "sim_cycles_rolled_back   {}", self.cycles_rolled_back)?;
        writeln!(
            f,
            "sim_seconds              {:.4}",
            self.execution_time.as_secs_f64()
        )?;
        writeln!(f, "sim_freq                 {:.0} cycles/s", self.cycles_per_second())?;
        writeln!(f, "----------------------------------------------------------")?;
        writeln!(f, "exceptions_taken         {}", self.exceptions_taken)?;
        writeln!(f, "interrupts_taken         {}", self.interrupts_taken)?;
        writeln!(f, "----------------------------------------------------------")?;
        writeln!(
            f,
            "icache.hits              {} ({:.2}%)",
            self.icache.hits,
            self.icache_hit_rate() * 100.0
        )?;
        writeln!(f, "icache.misses            {}", self.icache.misses)?;
        writeln!(f, "icache.bypasses          {}", self.icache.bypasses)?;
        write!(f, "icache.invalidations     {}", self.icache.invalidations)
    }
}
