mod common;

use common::synthetic_layers::{patch_collection, text_collection};
use map_text_contrast::io::geojson::{AnchorFields, TextFields};
use map_text_contrast::io::{load_anchor_layer, load_text_layer, write_json_file};
use map_text_contrast::{
    build_tables, partition, rank_difference, Anchor, AnalysisError, ContrastAnalyzer,
    ContrastParams, Crs, ProbabilityTable, TextDetection,
};
use std::fs;

#[test]
fn building_scenario_partitions_near_text_only() {
    let anchors = vec![Anchor::at("m", "building", 0.0, 0.0)];
    let texts = vec![
        TextDetection::at("m", "Shop", 50.0, 0.0),
        TextDetection::at("m", "Farm", 200.0, 0.0),
    ];
    let out = partition(&anchors, &texts, "building", 100.0);
    assert_eq!(out.adjacent, vec!["Shop"]);
    assert!(out.other.is_empty());
}

#[test]
fn frequency_scenario_merges_case() {
    let (freq, prob) = build_tables(["Street", "street", "LANE"]).unwrap();
    assert_eq!(freq.iter().collect::<Vec<_>>(), vec![("street", 2), ("lane", 1)]);
    assert!((prob.get("street").unwrap() - 0.666_666_666_666).abs() < 1e-9);
    assert!((prob.get("lane").unwrap() - 0.333_333_333_333).abs() < 1e-9);
}

#[test]
fn ranking_scenario_is_asymmetric() {
    let a: ProbabilityTable = [("street", 0.5)].into_iter().collect();
    let b: ProbabilityTable = [("street", 0.2), ("lane", 0.1)].into_iter().collect();
    let ranking = rank_difference(&a, &b);
    let terms = ranking.terms();
    assert_eq!(terms.len(), 2);
    assert_eq!(terms[0].text, "street");
    assert!((terms[0].difference - 0.3).abs() < 1e-12);
    assert_eq!(terms[1].text, "lane");
    assert!((terms[1].difference + 0.1).abs() < 1e-12);
}

#[test]
fn empty_labels_raise_empty_input() {
    let err = build_tables(Vec::<&str>::new()).unwrap_err();
    assert!(matches!(err, AnalysisError::EmptyInput { .. }), "{err:?}");
}

#[test]
fn geographic_layers_are_reprojected_and_ranked() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir().expect("tempdir");

    let patches = patch_collection(
        &[
            ("building", "s1", 0.0, 0.0),
            ("no_building", "s1", 0.01, 0.0),
            ("building", "s2", 0.02, 0.0),
        ],
        0.0001,
        None,
    );
    let texts = text_collection(
        &[
            ("Street", "s1", 0.0004, 0.0),
            ("INN", "s1", 0.0, 0.0005),
            ("Farm", "s1", 0.0104, 0.0),
            ("street", "s1", 0.0096, 0.0),
            ("Church", "s2", 0.0203, 0.0),
            ("Mill", "s2", 0.05, 0.0),
        ],
        Some("EPSG:4326"),
    );
    let patch_path = dir.path().join("patches.geojson");
    let text_path = dir.path().join("texts.geojson");
    fs::write(&patch_path, patches).unwrap();
    fs::write(&text_path, texts).unwrap();

    let anchors = load_anchor_layer(&patch_path, &AnchorFields::default(), Crs::Wgs84).unwrap();
    let texts = load_text_layer(&text_path, &TextFields::default(), Crs::WebMercator).unwrap();
    assert_eq!(anchors.crs, Crs::Wgs84);
    assert_eq!(texts.crs, Crs::Wgs84, "declared CRS should win over the default");

    let analyzer = ContrastAnalyzer::new(ContrastParams::default()).unwrap();
    let report = analyzer.run_layers(&anchors, &texts).unwrap();
    assert_eq!(report.adjacent_occurrences, 3);
    assert_eq!(report.other_occurrences, 2);
    assert_eq!(report.adjacent_frequency.get("inn"), Some(1));
    assert!(report.adjacent_frequency.get("mill").is_none());

    let keys: Vec<&str> = report.ranking.iter().map(|(k, _)| k).collect();
    assert_eq!(keys, vec!["street", "farm"]);

    let out = dir.path().join("out").join("report.json");
    write_json_file(&out, &report).unwrap();
    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(json["ranking"][0]["text"], "street");
    assert_eq!(json["adjacentFrequency"]["street"], 1);
    assert_eq!(json["otherOccurrences"], 2);
}

#[test]
fn mixed_crs_layers_need_reprojection() {
    let dir = tempfile::tempdir().expect("tempdir");
    let patches = patch_collection(
        &[("building", "s1", 0.0, 0.0), ("no_building", "s1", 0.01, 0.0)],
        0.0001,
        Some("EPSG:4326"),
    );
    // Same spots as the patches, already in Web Mercator metres.
    let texts = text_collection(
        &[("Inn", "s1", 30.0, 0.0), ("Farm", "s1", 1_113.0, 0.0)],
        Some("EPSG:3857"),
    );
    let patch_path = dir.path().join("patches.geojson");
    let text_path = dir.path().join("texts.geojson");
    fs::write(&patch_path, patches).unwrap();
    fs::write(&text_path, texts).unwrap();
    let anchors = load_anchor_layer(&patch_path, &AnchorFields::default(), Crs::Wgs84).unwrap();
    let texts = load_text_layer(&text_path, &TextFields::default(), Crs::Wgs84).unwrap();
    assert_eq!(texts.crs, Crs::WebMercator);

    let raw = ContrastAnalyzer::new(ContrastParams {
        reproject: false,
        ..ContrastParams::default()
    })
    .unwrap();
    let err = raw.run_layers(&anchors, &texts).unwrap_err();
    assert_eq!(
        err,
        AnalysisError::CrsMismatch {
            anchors: "EPSG:4326".to_string(),
            texts: "EPSG:3857".to_string(),
        }
    );

    let report = ContrastAnalyzer::new(ContrastParams::default())
        .unwrap()
        .run_layers(&anchors, &texts)
        .unwrap();
    assert_eq!(report.adjacent_frequency.get("inn"), Some(1));
    assert_eq!(report.other_frequency.get("farm"), Some(1));
}

#[test]
fn partition_does_not_reproject_degrees() {
    // Degrees passed straight in: a 100-unit radius swallows every text.
    let anchors = vec![Anchor::at("s1", "building", 0.0, 0.0)];
    let texts = vec![
        TextDetection::at("s1", "Near", 0.0004, 0.0),
        TextDetection::at("s1", "Far", 0.05, 0.0),
    ];
    let out = partition(&anchors, &texts, "building", 100.0);
    assert_eq!(out.adjacent, vec!["Near", "Far"]);
}

#[test]
fn missing_text_field_fails_the_load() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("texts.geojson");
    fs::write(
        &path,
        r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{"map_id":"s1"},
             "geometry":{"type":"Point","coordinates":[0,0]}}]}"#,
    )
    .unwrap();
    let err = load_text_layer(&path, &TextFields::default(), Crs::Wgs84).unwrap_err();
    assert!(err.contains("missing required field `text`"), "{err}");
}
