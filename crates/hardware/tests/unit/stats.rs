//! Statistics Tests.

use std::time::Duration;

use mipsim_core::core::icache::CacheCounters;
use mipsim_core::stats::SimStats;

#[test]
fn rates_are_zero_without_activity() {
    let stats = SimStats::default();
    assert!(stats.cycles_per_second().abs() < f64::EPSILON);
    assert!(stats.icache_hit_rate().abs() < f64::EPSILON);
}

#[test]
fn rates_from_counters() {
    let stats = SimStats {
        cycles: 500,
        execution_time: Duration::from_millis(250),
        icache: CacheCounters {
            hits: 3,
            misses: 1,
            ..CacheCounters::default()
        },
        ..SimStats::default()
    };
    assert!((stats.cycles_per_second() - 2000.0).abs() < 1e-9);
    assert!((stats.icache_hit_rate() - 0.75).abs() < 1e-9);
}

#[test]
fn report_lists_counters() {
    let stats = SimStats {
        cycles: 42,
        exceptions_taken: 2,
        ..SimStats::default()
    };
    let report = stats.to_string();
    assert!(report.contains("MIPS32 SIMULATION STATISTICS"));
    assert!(report.contains("sim_cycles               42"));
    assert!(report.contains("exceptions_taken         2"));
    assert!(report.contains("icache.hits              0 (0.00%)"));
}
