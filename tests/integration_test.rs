// Integration tests for featurex
use chrono::NaiveDate;
use featurex::prelude::*;
use featurex::{
    field_enum, select, shape, CategoricalProperty, DateTimeProperty, ScalarProperty, SequenceProperty, TextProperty,
};
use serde_json::json;
use std::collections::HashMap;
use uuid::Uuid;

fn people() -> Vec<serde_json::Value> {
    vec![
        json!({"Age": 23, "Height": 6.21, "Weight": 220, "Good": false, "Nice": true,
               "Notes": "the quick brown fox 12", "Seen": "2020-03-14T09:30:00Z"}),
        json!({"Age": 31, "Height": 5.5, "Weight": 160, "Good": true, "Nice": false,
               "Notes": "super brown bear", "Seen": "2019-11-02T17:05:00Z"}),
        json!({"Age": 45, "Height": 5.9, "Weight": 180, "Good": true, "Nice": true,
               "Notes": "1829 ugly fox", "Seen": "2021-01-20T00:00:00Z"}),
        json!({"Age": 52, "Height": 6.0, "Weight": 200, "Good": false, "Nice": false,
               "Notes": "the quick bear", "Seen": "2018-07-04T12:00:00Z"}),
    ]
}

fn people_descriptor() -> Descriptor {
    DescriptorBuilder::new()
        .declared_type("Person")
        .with("Age").as_type(ValueType::I32)
        .with("Height").as_number()
        .with("Weight").as_number()
        .with("Good").as_bool()
        .with("Notes").as_text(TextOptions::default())
        .with("Seen").as_date_time(DateTimeFlags::YEAR | DateTimeFlags::DAY)
        .learn("Nice").as_bool()
        .build()
        .unwrap()
}

#[test]
fn test_full_pipeline() {
    let mut descriptor = people_descriptor();
    let rows = descriptor.convert_dataset(&people(), true).unwrap();

    assert_eq!(descriptor.vector_length(), 4 + 8 + 2);
    assert_eq!(descriptor.columns().len(), descriptor.vector_length());
    assert_eq!(rows.len(), 4);
    assert!(rows.iter().all(|r| r.len() == descriptor.vector_length() + 1));

    assert_eq!(
        rows[0],
        vec![
            23.0, 6.21, 220.0, -1.0, // scalars
            1.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0, // THE QUICK BROWN FOX #NUM# SUPER BEAR UGLY
            2020.0, 14.0, // year, day
            1.0,  // label
        ]
    );
    assert_eq!(descriptor.column_name_at(12).unwrap(), "Seen_year");
    assert_eq!(descriptor.feature_at(11).unwrap().name(), "Notes");
}

#[test]
fn test_offsets_contiguous() {
    let mut descriptor = people_descriptor();
    descriptor.fit(&people()).unwrap();

    let mut expected = 0;
    for feature in descriptor.features() {
        assert_eq!(feature.start(), Some(expected));
        expected += feature.length();
    }
    assert_eq!(expected, descriptor.vector_length());

    for column in 0..descriptor.vector_length() {
        let owner = descriptor.feature_at(column).unwrap();
        let start = owner.start().unwrap();
        assert!(start <= column && column < start + owner.length());
    }
    assert!(matches!(
        descriptor.feature_at(descriptor.vector_length()),
        Err(Error::ColumnOutOfRange { .. })
    ));
}

#[test]
fn test_fitted_descriptor_survives_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fitted.json");

    let mut descriptor = people_descriptor();
    descriptor.fit(&people()).unwrap();
    descriptor.save(&path).unwrap();

    let restored = Descriptor::load(&path).unwrap();
    assert!(restored.is_laid_out());
    assert_eq!(restored.columns(), descriptor.columns());

    let probe = json!({"Age": 60, "Height": 5.0, "Weight": 150, "Good": true,
                       "Notes": "the brown 432", "Seen": "2022-05-09"});
    let row = restored.convert(&probe, false).unwrap();
    assert_eq!(&row[4..12], &[1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 0.0, 0.0]);
    assert_eq!(&row[12..], &[2022.0, 9.0]);
}

#[test]
fn test_persisted_format_is_tagged() {
    let mut descriptor = people_descriptor();
    descriptor.fit(&people()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&descriptor.to_json().unwrap()).unwrap();

    assert_eq!(json["version"], 1);
    assert_eq!(json["declared_type"], "Person");
    assert_eq!(json["features"][0]["kind"], "scalar");
    assert_eq!(json["features"][0]["declared_type"], "i32");
    assert_eq!(json["features"][4]["kind"], "text");
    assert_eq!(json["features"][4]["split_mode"], "word");
    assert_eq!(json["features"][4]["dictionary"][4], "#NUM#");
    assert_eq!(json["features"][4]["start"], 4);
    assert_eq!(json["features"][5]["flags"], 9);
    assert_eq!(json["label"]["name"], "Nice");
    assert_eq!(json["label"]["discrete"], true);
}

#[test]
fn test_descriptor_from_definition_file() {
    let definition = r#"{
        "features": [
            {"kind": "scalar", "name": "Age", "declared_type": "i32"},
            {"kind": "text", "name": "Notes", "declared_type": "string", "exclude": ["the"]},
            {"kind": "categorical_id", "name": "Owner", "declared_type": "uuid"}
        ],
        "label": {"kind": "scalar", "name": "Nice", "declared_type": "bool"}
    }"#;
    let mut descriptor = Descriptor::from_json(definition).unwrap();
    assert_eq!(descriptor.version, 1);
    assert!(!descriptor.is_laid_out());

    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    let items = vec![
        json!({"Age": 1, "Notes": "the cat", "Owner": a.to_string(), "Nice": true}),
        json!({"Age": 2, "Notes": "a dog", "Owner": b.to_string(), "Nice": false}),
    ];
    let (x, y) = descriptor.to_examples(&items).unwrap();
    assert_eq!(descriptor.columns(), vec!["Age", "CAT", "A", "DOG", "Owner"]);
    assert_eq!(x.row(1), &[2.0, 0.0, 1.0, 1.0, 1.0]);
    assert_eq!(y.as_slice(), &[1.0, -1.0]);
}

#[test]
fn test_maps_and_prediction_write_back() {
    let mut descriptor = DescriptorBuilder::new()
        .with("x").as_number()
        .learn("class").as_string_enum()
        .build()
        .unwrap();

    let mut rows: Vec<HashMap<String, Value>> = Vec::new();
    for (x, class) in [(0.5, "low"), (9.0, "high"), (0.2, "low")] {
        let mut row = HashMap::new();
        row.insert("x".to_string(), Value::Float(x));
        row.insert("class".to_string(), Value::from(class));
        rows.push(row);
    }
    descriptor.fit(&rows).unwrap();

    let mut unseen: HashMap<String, Value> = HashMap::new();
    unseen.insert("x".to_string(), Value::Float(7.5));
    assert_eq!(descriptor.to_vector(&unseen).unwrap().as_slice(), &[7.5]);

    descriptor.apply_prediction(&mut unseen, 1.0).unwrap();
    assert_eq!(unseen["class"], Value::from("HIGH"));
    assert!(matches!(descriptor.label_value(5.0), Err(Error::IndexOutOfRange { .. })));
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Plan {
    Basic,
    Plus,
    Premium,
}
field_enum!(Plan { Basic, Plus, Premium });

struct Subscriber {
    account: Uuid,
    plan: Plan,
    signed_up: chrono::NaiveDateTime,
    monthly_spend: Vec<f64>,
    bio: String,
    churned: bool,
}

shape!(Subscriber {
    account: Uuid => Marker::categorical(),
    plan: Plan => Marker::feature(),
    signed_up: chrono::NaiveDateTime => Marker::date_time(DateTimeFlags::YEAR | DateTimeFlags::MONTH),
    monthly_spend: Vec<f64> => Marker::fixed_sequence(3),
    bio: String => Marker::text(TextOptions::default().exclude(["and"])),
    churned: bool => Marker::label(),
});

fn subscribers() -> Vec<Subscriber> {
    let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(0, 0, 0).unwrap();
    vec![
        Subscriber {
            account: Uuid::new_v4(),
            plan: Plan::Plus,
            signed_up: date(2021, 4, 2),
            monthly_spend: vec![10.0, 12.5],
            bio: "runner and baker".to_string(),
            churned: false,
        },
        Subscriber {
            account: Uuid::new_v4(),
            plan: Plan::Premium,
            signed_up: date(2022, 9, 30),
            monthly_spend: vec![30.0, 31.0, 29.0, 40.0],
            bio: "baker".to_string(),
            churned: true,
        },
    ]
}

#[test]
fn test_front_ends_agree() {
    let declarative = Descriptor::of::<Subscriber>().unwrap();

    let typed = TypedBuilder::<Subscriber>::new()
        .with(select!(Subscriber, account)).as_categorical()
        .with(select!(Subscriber, plan)).as_scalar()
        .with(select!(Subscriber, signed_up)).as_date_time(DateTimeFlags::YEAR | DateTimeFlags::MONTH)
        .with(select!(Subscriber, monthly_spend)).as_fixed_sequence(3)
        .with(select!(Subscriber, bio)).as_text(TextOptions::default().exclude(["and"]))
        .learn(select!(Subscriber, churned)).as_scalar()
        .build()
        .unwrap();

    let mut by_name = Descriptor::new().with_declared_type("Subscriber");
    by_name.add_property(CategoricalProperty::new("account"), false).unwrap();
    by_name
        .add_property(ScalarProperty::new("plan", <Plan as FieldValue>::value_type()), false)
        .unwrap();
    by_name
        .add_property(DateTimeProperty::new("signed_up", DateTimeFlags::YEAR | DateTimeFlags::MONTH), false)
        .unwrap();
    by_name
        .add_property(SequenceProperty::new("monthly_spend", ValueType::F64, 3), false)
        .unwrap();
    by_name
        .add_property(TextProperty::new("bio", TextOptions::default().exclude(["and"])), false)
        .unwrap();
    by_name
        .add_property(ScalarProperty::new("churned", ValueType::Bool), true)
        .unwrap();

    assert_eq!(declarative, typed);
    assert_eq!(declarative, by_name);
}

#[test]
fn test_declarative_records() {
    let mut descriptor = Descriptor::of::<Subscriber>().unwrap();
    let items = subscribers();
    let (x, y) = descriptor.to_examples(&items).unwrap();

    assert_eq!(
        descriptor.columns(),
        vec![
            "account",
            "plan",
            "signed_up_year",
            "signed_up_month",
            "monthly_spend_0",
            "monthly_spend_1",
            "monthly_spend_2",
            "RUNNER",
            "BAKER",
        ]
    );
    assert_eq!(x.row(0), &[0.0, 1.0, 2021.0, 4.0, 10.0, 12.5, 0.0, 1.0, 1.0]);
    assert_eq!(x.row(1), &[1.0, 2.0, 2022.0, 9.0, 30.0, 31.0, 29.0, 0.0, 1.0]);
    assert_eq!(y.as_slice(), &[-1.0, 1.0]);

    let mut probe = subscribers().remove(0);
    descriptor.apply_prediction(&mut probe, 0.9).unwrap();
    assert!(probe.churned);
}

#[test]
fn test_unknown_category_is_fatal() {
    let mut descriptor = Descriptor::of::<Subscriber>().unwrap();
    descriptor.fit(&subscribers()).unwrap();
    let stranger = subscribers().remove(0);
    let err = descriptor.convert(&stranger, false).unwrap_err();
    assert!(matches!(err, Error::UnknownCategory { ref feature, .. } if feature == "account"));
}
