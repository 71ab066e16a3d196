use fes_core::provenance::{RunProvenance, SchemaVersion};

#[test]
fn provenance_round_trip_json() {
    let provenance = RunProvenance {
        config_hash: "config".into(),
        input_hashes: [("smd1/colvar".into(), "abc".into())].into_iter().collect(),
        split_seed: 9531,
        network_seed: 57451,
        created_at: "2024-01-01T00:00:00Z".into(),
        tool_versions: [("fes-fit".into(), "0.1.0".into())].into_iter().collect(),
    };

    let json = serde_json::to_string_pretty(&provenance).expect("serialize");
    let decoded: RunProvenance = serde_json::from_str(&json).expect("deserialize");

    assert_eq!(decoded, provenance);
}

#[test]
fn schema_versions_order_by_major_first() {
    assert!(SchemaVersion::new(2, 0, 0) > SchemaVersion::new(1, 9, 9));
    assert!(SchemaVersion::new(1, 1, 0) > SchemaVersion::new(1, 0, 5));
}
