//! Integration tests for sensors and the registry through the public API

use sensor_hub::{
    Outcome, ReadingHistory, Sensor, SensorError, SensorKind, SensorRegistry, Value, ValuePolicy,
};

#[test]
fn test_history_average_and_drop_lowest() {
    let mut history: ReadingHistory<f32> = [10.0, 20.0, 30.0].into_iter().collect();
    assert_eq!(history.drop_lowest(), Some(10.0));
    assert_eq!(history.values(), &[20.0, 30.0]);
    assert_eq!(history.average(), 25.0);

    let pressures: ReadingHistory<i32> = [1000, 1010].into_iter().collect();
    assert_eq!(pressures.average(), 1005);

    let empty: ReadingHistory<i32> = ReadingHistory::new();
    assert_eq!(empty.average(), 0);
}

#[test]
fn test_repeated_processing_keeps_dropping() {
    let mut registry: SensorRegistry = SensorRegistry::new();
    let sensor = registry
        .find_or_create(SensorKind::Temperature, "T-001")
        .unwrap();
    for raw in ["10", "20", "30", "40"] {
        sensor.ingest_from_text(raw);
    }

    let averages: Vec<Option<Value>> = (0..4)
        .map(|_| registry.process_all()[0].average())
        .collect();
    assert_eq!(
        averages,
        vec![
            Some(Value::Temperature(30.0)),
            Some(Value::Temperature(35.0)),
            Some(Value::Temperature(40.0)),
            Some(Value::Temperature(40.0)),
        ]
    );
}

#[test]
fn test_empty_sensor_reports_no_readings() {
    let mut registry = SensorRegistry::new();
    registry.insert(Sensor::pressure("P-1")).unwrap();

    let summaries = registry.process_all();
    assert_eq!(summaries[0].outcome, Outcome::NoReadings);
    assert_eq!(summaries[0].to_string(), "P-1 (pressure): no readings available");
}

#[test]
fn test_mismatch_leaves_existing_sensor_alone() {
    let mut registry: SensorRegistry = SensorRegistry::new();
    registry
        .find_or_create(SensorKind::Pressure, "S-1")
        .unwrap()
        .ingest_from_text("1000");

    let err = registry
        .find_or_create(SensorKind::Temperature, "S-1")
        .unwrap_err();
    assert_eq!(
        err,
        SensorError::KindMismatch {
            id: "S-1".to_string(),
            existing: SensorKind::Pressure,
            requested: SensorKind::Temperature,
        }
    );

    let sensor = registry.find_by_name("S-1").unwrap();
    assert_eq!(sensor.kind(), SensorKind::Pressure);
    assert_eq!(sensor.pressure_history().unwrap().values(), &[1000]);
}

#[test]
fn test_strict_policy_through_sensor() {
    let mut sensor = Sensor::temperature("T-1");
    assert_eq!(
        sensor.ingest_text("21.5", ValuePolicy::Strict),
        Ok(Value::Temperature(21.5))
    );
    assert!(sensor.ingest_text("warm", ValuePolicy::Strict).is_err());
    assert_eq!(
        sensor.ingest_text("warm", ValuePolicy::Lenient),
        Ok(Value::Temperature(0.0))
    );
    assert_eq!(sensor.reading_count(), 2);
}

#[test]
fn test_listing_and_json_shape() {
    let mut registry = SensorRegistry::new();
    registry.insert(Sensor::temperature("T-001")).unwrap();
    registry.insert(Sensor::pressure("P-105")).unwrap();

    let listing: Vec<String> = registry.list_all().iter().map(ToString::to_string).collect();
    assert_eq!(listing, vec!["[temperature] T-001", "[pressure] P-105"]);

    let json = serde_json::to_value(registry.list_all()).unwrap();
    assert_eq!(json[1]["kind"], "pressure");
    assert_eq!(json[1]["id"], "P-105");
}
