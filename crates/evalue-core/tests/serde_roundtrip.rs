use evalue_core::provenance::{PlanProvenance, SchemaVersion};

#[test]
fn provenance_round_trip_json() {
    let provenance = PlanProvenance {
        schema_version: SchemaVersion::new(1, 0, 0),
        seed: 99,
        num_samples: 1000,
        ratio: 1.0,
        tool_version: "0.1.0".into(),
    };

    let json = serde_json::to_string_pretty(&provenance).expect("serialize");
    let decoded: PlanProvenance = serde_json::from_str(&json).expect("deserialize");

    assert_eq!(decoded, provenance);
    assert_eq!(SchemaVersion::default(), SchemaVersion::new(1, 0, 0));
}
