// Pipeline invariants across whole descriptors
use featurex_descriptor::{
    CategoricalProperty, DateTimeFlags, Descriptor, DescriptorBuilder, Feature, TextOptions,
};
use featurex_core::{Error, ValueType};
use proptest::prelude::*;
use serde_json::json;

fn descriptor(sequence_length: usize) -> Descriptor {
    DescriptorBuilder::new()
        .with("score").as_number()
        .with("notes").as_text(TextOptions::default())
        .with("readings").as_fixed_sequence(ValueType::F64, sequence_length)
        .with("at").as_date_time(DateTimeFlags::YEAR | DateTimeFlags::HOUR | DateTimeFlags::MINUTE)
        .learn("ok").as_bool()
        .build()
        .unwrap()
}

fn record(score: f64, words: &[String], readings: &[f64], ok: bool) -> serde_json::Value {
    json!({
        "score": score,
        "notes": words.join(" "),
        "readings": readings,
        "at": "2023-08-17T14:45:00",
        "ok": ok,
    })
}

fn arb_record() -> impl Strategy<Value = serde_json::Value> {
    (
        -1000.0f64..1000.0,
        prop::collection::vec("[a-z]{1,5}", 1..6),
        prop::collection::vec(-10.0f64..10.0, 0..8),
        any::<bool>(),
    )
        .prop_map(|(score, words, readings, ok)| record(score, &words, &readings, ok))
}

proptest! {
    #[test]
    fn test_layout_invariants(items in prop::collection::vec(arb_record(), 1..20), length in 1usize..6) {
        let mut d = descriptor(length);
        let rows = d.convert_dataset(&items, true).unwrap();

        let mut next = 0;
        for feature in d.features() {
            prop_assert_eq!(feature.start(), Some(next));
            next += feature.length();
        }
        prop_assert_eq!(next, d.vector_length());
        prop_assert_eq!(d.label().unwrap().start(), Some(d.vector_length()));

        for row in &rows {
            prop_assert_eq!(row.len(), d.vector_length() + 1);
        }
        for column in 0..d.vector_length() {
            let owner = d.feature_at(column).unwrap();
            let start = owner.start().unwrap();
            prop_assert!(start <= column && column < start + owner.length());
        }
    }

    #[test]
    fn test_pinned_conversion_is_pure(items in prop::collection::vec(arb_record(), 1..20)) {
        let mut d = descriptor(3);
        let first = d.convert_dataset(&items, true).unwrap();
        let columns = d.columns();

        prop_assert_eq!(d.transform(&items, true).unwrap(), first.clone());

        let restored = Descriptor::from_json(&d.to_json().unwrap()).unwrap();
        prop_assert_eq!(restored.columns(), columns);
        prop_assert_eq!(restored.transform(&items, true).unwrap(), first);
    }
}

#[test]
fn test_histogram_counts_repeats() {
    let mut d = descriptor(2);
    let items = vec![
        record(1.0, &["fox".into(), "fox".into(), "dog".into()], &[1.0], true),
        record(2.0, &["cat".into()], &[2.0, 3.0, 4.0], false),
    ];
    let rows = d.convert_dataset(&items, false).unwrap();
    assert_eq!(d.columns()[1..4], ["FOX", "DOG", "CAT"]);
    assert_eq!(rows[0], vec![1.0, 2.0, 1.0, 0.0, 1.0, 0.0, 2023.0, 14.0, 45.0]);
    assert_eq!(rows[1], vec![2.0, 0.0, 0.0, 1.0, 2.0, 3.0, 2023.0, 14.0, 45.0]);
}

#[test]
fn test_second_dataset_cannot_widen_layout() {
    let mut d = descriptor(2);
    d.convert_dataset(&[record(1.0, &["fox".into()], &[], true)], false).unwrap();

    let wider = [record(1.0, &["fox".into(), "owl".into()], &[], true)];
    assert!(matches!(d.convert_dataset(&wider, false), Err(Error::LengthMismatch { .. })));
}

#[test]
fn test_categories_learned_from_dataset() {
    let mut d = Descriptor::new();
    d.add_property(CategoricalProperty::new("owner"), false).unwrap();

    let items = vec![
        json!({"owner": "alpha"}),
        json!({"owner": 42}),
        json!({"owner": "alpha"}),
    ];
    let rows = d.convert_dataset(&items, false).unwrap();
    assert_eq!(rows, vec![vec![0.0], vec![1.0], vec![0.0]]);

    let owner = d.feature("owner").unwrap();
    assert!(owner.is_discrete());
    assert!(matches!(
        d.convert(&json!({"owner": "beta"}), false),
        Err(Error::UnknownCategory { ref value, .. }) if value == "beta"
    ));
}
