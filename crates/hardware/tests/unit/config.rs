//! Configuration Tests.

use mipsim_core::config::SimulationConfig;
use mipsim_core::core::Architecture;
use pretty_assertions::assert_eq;

#[test]
fn test_defaults() {
    let config = SimulationConfig::default();
    assert!(config.call_events);
    assert!(config.undo_enabled);
    assert_eq!(config.max_undo_steps, 10_000);
    assert_eq!(config.cycle_delay_ms, 0);
    assert!(config.instruction_cache);
    assert_eq!(config.architecture, Architecture::SingleCycle);
}

#[test]
fn test_empty_json_is_default() {
    assert_eq!(SimulationConfig::from_json("{}").unwrap(), SimulationConfig::default());
}

#[test]
fn test_json_overrides() {
    let config = SimulationConfig::from_json(
        r#"{ "call_events": false, "max_undo_steps": 3, "instruction_cache": false }"#,
    )
    .unwrap();
    assert!(!config.call_events);
    assert_eq!(config.max_undo_steps, 3);
    assert!(!config.instruction_cache);
    assert!(config.undo_enabled);
}

#[test]
fn test_unknown_field_is_rejected() {
    let err = SimulationConfig::from_json(r#"{ "pipeline": true }"#).unwrap_err();
    assert!(err.to_string().contains("unknown field"));
}

#[test]
fn test_mistyped_field_is_rejected() {
    assert!(SimulationConfig::from_json(r#"{ "cycle_delay_ms": "fast" }"#).is_err());
}

#[test]
fn test_undo_needs_events() {
    let mut config = SimulationConfig::default();
    assert!(config.undo_active());
    config.call_events = false;
    assert!(!config.undo_active());
    config.call_events = true;
    config.undo_enabled = false;
    assert!(!config.undo_active());
}
