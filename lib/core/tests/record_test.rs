// Record access and codec behaviour seen from outside the crate
use featurex_core::{codec, resolve_member, Record, Value, ValueType};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

enum Probe {}

#[test]
fn test_member_cache_under_contention() {
    let lookups = AtomicUsize::new(0);
    std::thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                for _ in 0..100 {
                    let slot = resolve_member::<Probe>("width", || {
                        lookups.fetch_add(1, Ordering::SeqCst);
                        Some(3)
                    });
                    assert_eq!(slot, Some(3));
                }
            });
        }
    });
    assert_eq!(lookups.load(Ordering::SeqCst), 1);
}

#[test]
fn test_decoded_values_written_to_json() {
    let mut row = json!({"age": 23});
    let nice = codec::double_to_scalar(0.3, &ValueType::Bool).unwrap();
    let age = codec::double_to_scalar(40.4, &ValueType::I32).unwrap();
    row.set("nice", nice).unwrap();
    row.set("age", age).unwrap();
    assert_eq!(row, json!({"age": 40, "nice": true}));

    let mut scalar = json!(5);
    assert!(scalar.set("age", Value::Int(1)).is_err());
}

#[test]
fn test_maps_share_one_surface() {
    let mut sorted: BTreeMap<String, Value> = BTreeMap::new();
    sorted.set("height", Value::Float(6.21)).unwrap();
    let json_row = json!({"height": 6.21});

    let a = codec::scalar_to_double(&Record::get(&sorted, "height").unwrap()).unwrap();
    let b = codec::scalar_to_double(&Record::get(&json_row, "height").unwrap()).unwrap();
    assert_eq!(a, b);
    assert_eq!(codec::double_to_scalar(f64::NAN, &ValueType::F64).unwrap(), Value::Null);
}
