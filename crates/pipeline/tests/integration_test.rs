//! Integration tests for the pipeline.
//!
//! These tests verify that the filters, the engine and the loader work
//! together on realistic fee tables.

use fee_data::{ColumnNames, FeeDataset, FeeRecord, GradeVocabulary, RawTable, Tier};
use pipeline::filters::*;
use pipeline::{Filter, FilterEngine, FilterPipeline, project};
use selection::{FilterSpec, Selections, build_filter_spec};
use std::collections::BTreeSet;
use std::sync::Arc;

fn vocabulary() -> Arc<GradeVocabulary> {
    Arc::new(GradeVocabulary::default())
}

fn create_test_records() -> Vec<FeeRecord> {
    vec![
        // Tier A only
        FeeRecord::new("A01", "진찰료", "초진").with_grades("의원")
            .with_departments(&["공통", "", "", "", "", ""]),
        FeeRecord::new("A02", "진찰료", "재진").with_grades("병원/종합병원")
            .with_departments(&["내과", "", "", "", "", ""]),
        // Tier B, one and two tags
        FeeRecord::new("B01", "응급관리료", "권역").with_grades("권역응급의료센터")
            .with_departments(&["공통", "", "", "", "", ""]),
        FeeRecord::new("B02", "응급관리료", "혼합").with_grades("권역응급의료센터/지역응급의료센터")
            .with_departments(&["공통", "", "", "", "", ""]),
        // Tier C plus A
        FeeRecord::new("C01", "분만료", "취약지").with_grades("공통/분만취약지")
            .with_departments(&["산부인과", "공통", "", "", "", ""]),
        // Unclassified only
        FeeRecord::new("U01", "검체검사", "일반").with_grades("기타등급")
            .with_departments(&["공통", "", "", "", "", ""])
            .with_testrooms(&["진단검사", "", ""]),
        // No grades at all, flags set
        FeeRecord::new("F01", "항암주사", "주사").with_cancer_flag("O")
            .with_departments(&["종양내과", "공통", "", "", "", ""]),
        FeeRecord::new("F02", "이식수술", "수술").with_transplant_flag("O")
            .with_departments(&["외과", "", "", "", "", ""]),
        // Excluded tag and test room
        FeeRecord::new("X01", "야간가산", "가산").with_exclude_tag("야간")
            .with_departments(&["공통", "", "", "", "", ""]),
        FeeRecord::new("T01", "조직검사", "병리").with_testrooms(&["병리", "", ""])
            .with_departments(&["공통", "", "", "", "", ""]),
    ]
}

fn create_test_spec() -> FilterSpec {
    FilterSpec::default()
        .with_allowed(Tier::A, &["의원", "공통"])
        .with_allowed(Tier::B, &["권역응급의료센터"])
        .with_allowed(Tier::C, &["분만취약지"])
        .with_excluded_tags(&["야간"])
        .with_departments(&["공통", "외과"])
        .excluding_cancer(true)
        .with_excluded_testrooms(&["병리"])
}

fn codes(records: &[FeeRecord]) -> Vec<&str> {
    records.iter().map(|r| r.code.as_str()).collect()
}

/// The seven standard filters, built fresh by index
fn make_filter(idx: usize, vocab: &Arc<GradeVocabulary>) -> Box<dyn Filter> {
    match idx {
        0 => Box::new(GradeTierFilter::tier_a(vocab.clone())),
        1 => Box::new(GradeTierFilter::tier_b(vocab.clone())),
        2 => Box::new(GradeTierFilter::tier_c(vocab.clone())),
        3 => Box::new(ExcludeTagFilter),
        4 => Box::new(DepartmentFilter),
        5 => Box::new(CancerTransplantFilter),
        _ => Box::new(TestroomFilter),
    }
}

/// All permutations of 0..n (Heap's algorithm)
fn permutations(n: usize) -> Vec<Vec<usize>> {
    fn heap(k: usize, current: &mut Vec<usize>, out: &mut Vec<Vec<usize>>) {
        if k <= 1 {
            out.push(current.clone());
            return;
        }
        for i in 0..k {
            heap(k - 1, current, out);
            if k % 2 == 0 {
                current.swap(i, k - 1);
            } else {
                current.swap(0, k - 1);
            }
        }
    }
    let mut out = Vec::new();
    heap(n, &mut (0..n).collect(), &mut out);
    out
}

#[test]
fn test_full_pipeline_filters_correctly() {
    let engine = FilterEngine::new(vocabulary());
    let filtered = engine.filter(&create_test_records(), &create_test_spec());

    // A02: tier A tags not allowed
    // B02: not every tier B tag allowed
    // F01: cancer excluded
    // F02: passes (transplant not excluded, 외과 selected)
    // X01: excluded tag
    // T01: excluded test room
    assert_eq!(codes(&filtered), vec!["A01", "B01", "C01", "U01", "F02"]);
}

#[test]
fn test_evaluate_is_idempotent() {
    let engine = FilterEngine::new(vocabulary());
    let spec = create_test_spec();

    let once = engine.filter(&create_test_records(), &spec);
    let twice = engine.filter(&once, &spec);
    assert_eq!(once, twice);

    // Projection of an already filtered set matches a full evaluation,
    // duplicates included
    let mut records = create_test_records();
    records.push(records[0].clone());
    let dataset = FeeDataset {
        source: "test".to_string(),
        records,
        has_note: true,
        ..FeeDataset::default()
    };
    let evaluated = engine.evaluate(&dataset, &spec);
    let refiltered = engine.filter(&engine.filter(&dataset.records, &spec), &spec);
    assert_eq!(project(&refiltered, true), evaluated);
    assert_eq!(evaluated.len(), 5);
}

#[test]
fn test_filter_order_does_not_change_result() {
    let vocab = vocabulary();
    let records = create_test_records();
    let spec = create_test_spec();
    let expected = FilterEngine::new(vocab.clone()).filter(&records, &spec);

    let orders = permutations(7);
    assert_eq!(orders.len(), 5040);
    for order in orders {
        let pipeline = order
            .iter()
            .fold(FilterPipeline::new(), |p, &idx| p.add_boxed(make_filter(idx, &vocab)));
        let filtered = pipeline.apply(records.clone(), &spec);
        assert_eq!(filtered, expected, "order {:?} changed the result", order);
    }
}

#[test]
fn test_parallel_evaluation_matches_sequential() {
    let engine = FilterEngine::new(vocabulary());
    let records = create_test_records();
    let spec = create_test_spec();
    assert_eq!(engine.filter_parallel(&records, &spec), engine.filter(&records, &spec));
}

#[test]
fn test_tier_b_strictness() {
    let engine = FilterEngine::new(vocabulary());
    let record = FeeRecord::new("B", "n", "n").with_grades("권역응급의료센터/권역외상센터");
    let spec = FilterSpec::default().with_allowed(Tier::B, &["권역응급의료센터"]);

    assert!(engine.filter(&[record], &spec).is_empty());
}

#[test]
fn test_untiered_rows_pass_any_tier_selection() {
    let engine = FilterEngine::new(vocabulary());
    let record = FeeRecord::new("U", "n", "n").with_grades("기타등급/미분류");

    let specs = [
        FilterSpec::default(),
        FilterSpec::default().with_strict_when_empty(Tier::A, true),
        FilterSpec::default()
            .with_allowed(Tier::A, &["병원"])
            .with_allowed(Tier::B, &["권역외상센터"])
            .with_allowed(Tier::C, &["의료취약지역"]),
    ];
    for spec in &specs {
        assert_eq!(engine.filter(&[record.clone()], spec).len(), 1);
    }
}

#[test]
fn test_exclude_tag_containment() {
    let engine = FilterEngine::new(vocabulary());
    let tagged = FeeRecord::new("T", "n", "n").with_exclude_tag("X");
    let untagged = FeeRecord::new("U", "n", "n");
    let records = vec![tagged, untagged];

    let with_x = FilterSpec::default().with_excluded_tags(&["X"]);
    let with_y = FilterSpec::default().with_excluded_tags(&["Y"]);

    assert_eq!(codes(&engine.filter(&records, &with_x)), vec!["U"]);
    assert_eq!(codes(&engine.filter(&records, &with_y)), vec!["T", "U"]);
}

#[test]
fn test_tier_a_scenarios() {
    let vocab = Arc::new(GradeVocabulary::new(&["의원", "병원", "공통"], &[], &[]).unwrap());
    let engine = FilterEngine::new(vocab);
    let record = FeeRecord::new("A", "n", "n").with_grades("의원");

    let hospital_only = FilterSpec::default().with_allowed(Tier::A, &["병원"]);
    let clinic_or_common = FilterSpec::default().with_allowed(Tier::A, &["의원", "공통"]);

    assert!(engine.filter(&[record.clone()], &hospital_only).is_empty());
    assert_eq!(engine.filter(&[record], &clinic_or_common).len(), 1);
}

#[test]
fn test_tier_b_scenarios() {
    let vocab = Arc::new(
        GradeVocabulary::new(&[], &["권역응급의료센터", "지역응급의료센터"], &[]).unwrap(),
    );
    let engine = FilterEngine::new(vocab);
    let record = FeeRecord::new("B", "n", "n").with_grades("권역응급의료센터/지역응급의료센터");

    let one = FilterSpec::default().with_allowed(Tier::B, &["권역응급의료센터"]);
    let both = FilterSpec::default().with_allowed(Tier::B, &["권역응급의료센터", "지역응급의료센터"]);

    assert!(engine.filter(&[record.clone()], &one).is_empty());
    assert_eq!(engine.filter(&[record], &both).len(), 1);
}

#[test]
fn test_cancer_scenario_overrides_other_fields() {
    let engine = FilterEngine::new(vocabulary());
    let record = FeeRecord::new("F", "n", "n")
        .with_grades("공통")
        .with_departments(&["공통"])
        .with_cancer_flag("O");
    let permissive = FilterSpec::default()
        .with_allowed(Tier::A, &["공통"])
        .with_departments(&["공통"]);

    assert!(engine.filter(&[record.clone()], &permissive.clone().excluding_cancer(true)).is_empty());
    assert_eq!(engine.filter(&[record], &permissive.excluding_cancer(false)).len(), 1);
}

#[test]
fn test_dedup_on_projection() {
    let headers: Vec<String> = ["EDI코드", "명칭", "산정명칭", "특이사항", "병원등급", "진료과1"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let table = RawTable::new("test", headers)
        .with_row(&["A1", "검사", "검사", "비고", "의원", "공통"])
        .with_row(&["A1", "검사", "검사", "비고", "공통", "공통"])
        .with_row(&["A2", "처치", "처치", "", "", "공통"]);
    let dataset = FeeDataset::from_table(&table, &ColumnNames::default()).unwrap();

    let engine = FilterEngine::new(vocabulary());
    let spec = FilterSpec::default().with_allowed(Tier::A, &["의원", "공통"]);
    let result = engine.evaluate(&dataset, &spec);

    assert!(result.include_note);
    assert_eq!(result.len(), 2);
    assert_eq!(result.rows[0].code, "A1");
    assert_eq!(result.rows[0].note.as_deref(), Some("비고"));
    assert_eq!(result.rows[1].code, "A2");
}

#[test]
fn test_complete_pipeline_realistic() {
    // Load, resolve selections with UI defaults, evaluate, export
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("fees.tsv");
    std::fs::write(
        &input,
        "EDI코드\t명칭\t산정명칭\t병원등급\t제외\t진료과1\t진료과2\t종양여부\t이식\t검사실1\n\
         AA100\t진찰료\t초진\t공통\t\t공통\t\t\t\t\n\
         AA200\t진찰료\t재진\t의원\t\t공통\t\t\t\t\n\
         BB100\t응급\t권역\t권역응급의료센터\t\t공통\t\t\t\t\n\
         CC100\t항암\t주사\t공통\t\t종양내과\t공통\tO\t\t\n\
         DD100\t야간\t가산\t공통\t야간\t공통\t\t\t\t\n\
         EE100\t검사\t병리\t공통\t\t공통\t\t\t\t병리\n\
         FF100\t수술\t외과\t공통\t\t외과\t\t\t\t\n",
    )
    .unwrap();

    let columns = ColumnNames::default();
    let dataset = FeeDataset::load(&input, &columns).unwrap();
    assert_eq!(dataset.len(), 7);

    let vocab = vocabulary();
    let selections = Selections {
        exclude_tags: Some(vec!["야간".to_string()]),
        exclude_cancer: Some(true),
        exclude_testrooms: Some(vec!["병리".to_string()]),
        ..Selections::default()
    };
    let spec = build_filter_spec(&dataset, &vocab, &selections).unwrap();
    // Untouched department control defaults to 공통
    assert_eq!(spec.allowed_departments, BTreeSet::from(["공통".to_string()]));

    let engine = FilterEngine::new(vocab);
    let mut steps = 0;
    let result = engine.evaluate_with_progress(&dataset, &spec, |_| steps += 1);
    assert_eq!(steps, 7);

    let kept: Vec<&str> = result.rows.iter().map(|r| r.code.as_str()).collect();
    // AA200: tier A default is 공통 only
    // CC100: cancer excluded; DD100: exclude tag; EE100: test room; FF100: department
    assert_eq!(kept, vec!["AA100", "BB100"]);
    assert!(!result.include_note);

    let output = dir.path().join("result.json");
    fee_data::write_result(&result, &columns, &output).unwrap();
    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(written["rows"].as_array().unwrap().len(), 2);
}
