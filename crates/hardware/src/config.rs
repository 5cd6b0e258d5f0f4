//! Configuration system for the MIPS32 simulation engine.
//!
//! This module defines the knobs a host sets when building a simulation. It provides:
//! 1. **Defaults:** Baseline values for notifications, undo, throttling and caching.
//! 2. **Structure:** A flat `SimulationConfig` deserialized from JSON.
//! 3. **Derived Policy:** Whether undo is effectively active.
//!
//! Configuration is supplied as JSON by the host, or use `SimulationConfig::default()`.

use serde::Deserialize;

use crate::core::arch::Architecture;

/// Default configuration constants for the engine.
mod defaults {
    /// Publish cycle and mutation notifications.
    pub const CALL_EVENTS: bool = true;

    /// Record committed cycles for undo.
    pub const UNDO_ENABLED: bool = true;

    /// Maximum number of committed cycles kept for undo.
    pub const MAX_UNDO_STEPS: usize = crate::common::constants::MAX_UNDO_STEPS;

    /// Delay between cycles of a run, in milliseconds. Zero runs unthrottled.
    pub const CYCLE_DELAY_MS: u64 = 0;

    /// Cache decoded executions for the text section.
    pub const INSTRUCTION_CACHE: bool = true;
}

/// Root configuration of a simulation.
///
/// Every field is optional in JSON; missing fields take their defaults.
///
/// # Example JSON
///
/// ```
/// use mipsim_core::config::SimulationConfig;
///
/// let json = r#"{
///     "call_events": true,
///     "undo_enabled": false,
///     "cycle_delay_ms": 5,
///     "architecture": "SingleCycle"
/// }"#;
///
/// let config = SimulationConfig::from_json(json).unwrap();
/// assert!(!config.undo_enabled);
/// assert_eq!(config.cycle_delay_ms, 5);
/// assert_eq!(config.max_undo_steps, 10_000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulationConfig {
    /// Publish cycle, register and memory notifications. Undo requires this.
    #[serde(default = "SimulationConfig::default_call_events")]
    pub call_events: bool,

    /// Record committed cycles so they can be undone.
    #[serde(default = "SimulationConfig::default_undo_enabled")]
    pub undo_enabled: bool,

    /// Capacity of the undo history; the oldest cycle is dropped when full.
    #[serde(default = "SimulationConfig::default_max_undo_steps")]
    pub max_undo_steps: usize,

    /// Throttle between cycles of a run, adjustable while running.
    #[serde(default = "SimulationConfig::default_cycle_delay_ms")]
    pub cycle_delay_ms: u64,

    /// Keep decoded executions for the text section.
    #[serde(default = "SimulationConfig::default_instruction_cache")]
    pub instruction_cache: bool,

    /// Processor organisation used to build executions.
    #[serde(default)]
    pub architecture: Architecture,
}

impl SimulationConfig {
    fn default_call_events() -> bool {
        defaults::CALL_EVENTS
    }

    fn default_undo_enabled() -> bool {
        defaults::UNDO_ENABLED
    }

    fn default_max_undo_steps() -> usize {
        defaults::MAX_UNDO_STEPS
    }

    fn default_cycle_delay_ms() -> u64 {
        defaults::CYCLE_DELAY_MS
    }

    fn default_instruction_cache() -> bool {
        defaults::INSTRUCTION_CACHE
    }

    /// Parses a configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns the parser error for malformed JSON, unknown fields or mistyped values.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Whether committed cycles are recorded for undo.
    ///
    /// Undo is forced off when notifications are disabled.
    pub const fn undo_active(&self) -> bool {
        self.undo_enabled && self.call_events
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            call_events: defaults::CALL_EVENTS,
            undo_enabled: defaults::UNDO_ENABLED,
            max_undo_steps: defaults::MAX_UNDO_STEPS,
            cycle_delay_ms: defaults::CYCLE_DELAY_MS,
            instruction_cache: defaults::INSTRUCTION_CACHE,
            architecture: Architecture::default(),
        }
    }
}
