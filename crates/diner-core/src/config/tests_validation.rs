use super::SimulationConfig;

#[test]
fn test_defaults_are_valid() {
    assert!(SimulationConfig::default().validate().is_ok());
}

#[test]
fn test_defaults_match_documented_values() {
    let config = SimulationConfig::default();
    assert_eq!(config.table_count, 5);
    assert_eq!(config.seats_per_table, 5);
    assert_eq!(config.think_max, 10);
    assert_eq!(config.eat_max, 5);
    assert_eq!(config.settle_delay, 4);
    assert_eq!(config.poll_interval, 2);
    assert_eq!(config.overflow_index(), 5);
    assert_eq!(config.agent_count(), 25);
}

#[test]
fn test_zero_tables_rejected() {
    let config = SimulationConfig {
        table_count: 0,
        ..SimulationConfig::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_single_seat_ring_rejected() {
    let config = SimulationConfig {
        seats_per_table: 1,
        ..SimulationConfig::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_zero_poll_interval_rejected() {
    let config = SimulationConfig {
        poll_interval: 0,
        ..SimulationConfig::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_zero_time_unit_rejected() {
    let config = SimulationConfig {
        time_unit_ms: 0,
        ..SimulationConfig::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_zero_think_and_eat_allowed() {
    let config = SimulationConfig {
        think_max: 0,
        eat_max: 0,
        settle_delay: 0,
        ..SimulationConfig::default()
    };
    assert!(config.validate().is_ok());
}

#[test]
fn test_huge_think_bound_rejected() {
    let config = SimulationConfig {
        think_max: 100_000,
        ..SimulationConfig::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_unit_conversions() {
    let config = SimulationConfig {
        time_unit_ms: 10,
        max_runtime: Some(7),
        ..SimulationConfig::default()
    };
    assert_eq!(config.settle().as_millis(), 40);
    assert_eq!(config.poll().as_millis(), 20);
    assert_eq!(config.think_bound().as_millis(), 100);
    assert_eq!(config.eat_bound().as_millis(), 50);
    assert_eq!(config.max_runtime_duration().map(|d| d.as_millis()), Some(70));
}
