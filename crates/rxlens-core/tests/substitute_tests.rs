//! End-to-end substitute search: refined files → snapshot → ranked results.

use std::fs;
use std::path::Path;

use rxlens_core::catalog::{CatalogHandle, CatalogSnapshot};
use rxlens_core::matcher::PrescriptionOutcome;
use rxlens_core::source::{load_snapshot, COMPOSITION_FILE, INGREDIENTS_FILE, MEDICINES_FILE};
use rxlens_core::{
    build_catalog, find_substitutes, CompositionRow, CsvSource, MatchConfig, MedicineRow,
    SubstituteRecord,
};

fn write_refined(dir: &Path) {
    fs::write(
        dir.join(INGREDIENTS_FILE),
        "drug_id,drug_name\n1,Paracetamol\n2,Caffeine\n3,Amoxycillin\n4,Clavulanic Acid\n",
    )
    .unwrap();
    fs::write(
        dir.join(MEDICINES_FILE),
        "medicine_id,medicine_name,unit_size,mrp,group_name,category\n\
         1,Paracetamol Tablets IP 500 mg,10's,20,Analgesic,tablet\n\
         2,Paracetamol Tablets IP 500 mg (Strip),15's,10,Analgesic,tablet\n\
         3,Paracetamol Tablets IP 520 mg,10's,30,Analgesic,tablet\n\
         4,Paracetamol Tablets IP 530 mg,10's,5,Analgesic,tablet\n\
         5,Paracetamol and Caffeine Tablets,10's,8,Analgesic,tablet\n\
         6,Amoxycillin and Potassium Clavulanate Tablets IP,6's,60,Antibiotic,tablet\n\
         7,Amoxycillin Capsules IP 500 mg,10's,40,Antibiotic,capsule\n\
         8,Herbal Cough Syrup,100 ml,45,Cough,syrup\n",
    )
    .unwrap();
    fs::write(
        dir.join(COMPOSITION_FILE),
        "medicine_id,drug_id,amount,unit\n\
         1,1,500,mg\n\
         2,1,0.5,g\n\
         3,1,520,mg\n\
         4,1,530,mg\n\
         5,1,500,mg\n\
         5,2,30,mg\n\
         6,3,500,mg\n\
         6,4,125,mg\n\
         7,3,500,mg\n\
         8,9,abc,ml\n",
    )
    .unwrap();
}

fn snapshot() -> (tempfile::TempDir, CatalogSnapshot) {
    let dir = tempfile::tempdir().unwrap();
    write_refined(dir.path());
    let snapshot = load_snapshot(&CsvSource::from_dir(dir.path())).unwrap();
    (dir, snapshot)
}

#[test]
fn test_paracetamol_substitutes() {
    let (_dir, snapshot) = snapshot();
    let finder = snapshot.finder(MatchConfig::default());

    let results = finder.find(1);
    let ids: Vec<i64> = results.iter().map(|c| c.medicine.medicine_id).collect();

    // 2: same dose after g→mg, half price   → 0.7 + 0.15
    // 3: 4% off, pricier                     → 0.7
    // 5: half the composition, cheaper       → 0.35 + 0.18
    // 4: 6% off, cheaper                     → 0.225
    assert_eq!(ids, vec![2, 3, 5, 4]);

    assert_eq!(results[0].comp_similarity, 1.0);
    assert_eq!(results[0].price_score, 0.5);
    assert_eq!(results[1].comp_similarity, 1.0);
    assert_eq!(results[1].price_score, 0.0);
    assert_eq!(results[2].comp_similarity, 0.5);
    assert_eq!(results[3].comp_similarity, 0.0);
}

#[test]
fn test_malformed_row_leaves_medicine_without_substitutes() {
    let (_dir, snapshot) = snapshot();

    let herbal = snapshot.catalog.get(8).unwrap();
    assert!(!herbal.has_composition());
    assert_eq!(snapshot.catalog.stats().dropped_rows, 1);

    assert!(find_substitutes(8, &snapshot.catalog, &snapshot.index, 10).is_empty());
    assert!(find_substitutes(404, &snapshot.catalog, &snapshot.index, 10).is_empty());
}

#[test]
fn test_result_json_shape_round_trips() {
    let (_dir, snapshot) = snapshot();
    let results = find_substitutes(7, &snapshot.catalog, &snapshot.index, 10);
    assert_eq!(results.len(), 1);

    let json = serde_json::to_value(&results).unwrap();
    let first = &json[0];
    assert_eq!(first["medicine"]["medicine_id"], 6);
    assert_eq!(first["medicine"]["name"], "Amoxycillin and Potassium Clavulanate Tablets IP");
    assert_eq!(first["medicine"]["composition"].as_array().unwrap().len(), 2);
    assert_eq!(first["comp_similarity"], 0.5);

    let records: Vec<SubstituteRecord> = serde_json::from_value(json.clone()).unwrap();
    assert_eq!(serde_json::to_value(&records).unwrap(), json);
}

#[test]
fn test_weights_from_config() {
    let (_dir, snapshot) = snapshot();
    let config = MatchConfig::from_json_str(r#"{"weights": {"composition": 0.0, "price": 1.0}}"#)
        .unwrap();

    let results = snapshot.finder(config).find(1);
    // Cheapest first: 4 (5), 5 (8), 2 (10), then 3 (30) at zero
    let ids: Vec<i64> = results.iter().map(|c| c.medicine.medicine_id).collect();
    assert_eq!(ids, vec![4, 5, 2, 3]);
}

#[test]
fn test_prescription_report() {
    let (_dir, snapshot) = snapshot();
    let finder = snapshot.finder(MatchConfig::default());

    let report = finder.analyze_prescription(&["Amoxycillin Capsules", "Zzyzx"], 5);

    assert_eq!(report.summary.total_medicines, 2);
    assert_eq!(report.summary.found_count, 1);
    assert_eq!(report.summary.not_found_count, 1);
    assert_eq!(report.summary.total_alternatives, 1);

    match &report.results[0].outcome {
        PrescriptionOutcome::Found { original_medicine, substitutes, .. } => {
            assert_eq!(original_medicine.medicine_id, 7);
            assert_eq!(substitutes[0].medicine.medicine_id, 6);
        }
        other => panic!("expected found, got {:?}", other),
    }

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["results"][0]["status"], "found");
    assert_eq!(json["results"][1]["status"], "not_found");
    assert_eq!(json["summary"]["total_alternatives"], 1);
}

#[test]
fn test_rebuild_with_copy_and_swap() {
    let (_dir, first) = snapshot();
    let handle = CatalogHandle::new(first);
    let in_flight = handle.current();

    let (catalog, index) = build_catalog(
        vec![MedicineRow::new(1, "Paracetamol Tablets"), MedicineRow::new(2, "Paracetamol DT")],
        vec![CompositionRow::new(1, 1, "500", "mg"), CompositionRow::new(2, 1, "500", "mg")],
    );
    handle.publish(CatalogSnapshot::new(catalog, index));

    // A query that started before the swap still sees the old catalog
    assert_eq!(in_flight.catalog.len(), 8);
    assert_eq!(handle.current().catalog.len(), 2);

    let current = handle.current();
    let results = find_substitutes(1, &current.catalog, &current.index, 10);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].medicine.medicine_id, 2);
}
