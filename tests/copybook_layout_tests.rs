use cobmap::analyzers::copybook::{analyze_copybook, picture_length};
use cobmap::config::AnalysisConfig;
use cobmap::{DataType, EntityType, KeyType};
use indoc::indoc;
use pretty_assertions::assert_eq;
use std::path::Path;

const CUSTOMER_MASTER: &str = indoc! {"
    01  CUSTOMER-MASTER-REC.
        05  CUST-KEY.
            10  CUST-ID          PIC 9(6).
            10  CUST-REGION-CD   PIC XX.
        05  CUST-NAME            PIC X(30).
        05  FILLER               PIC X(5).
        05  CUST-BALANCES        OCCURS 12.
            10  CUST-BAL-AMT     PIC S9(7)V99 COMP-3.
        05  CUST-STATUS          PIC X.
            88  CUST-ACTIVE      VALUE 'A'.
"};

fn analyze(src: &str) -> cobmap::CopybookAnalysisResult {
    analyze_copybook(Path::new("custmast.cpy"), src, &AnalysisConfig::default())
}

#[test]
fn picture_length_properties() {
    assert_eq!(picture_length("9(5)V99"), 7);
    assert_eq!(picture_length("X(10)"), 10);
}

#[test]
fn total_length_is_recursive_sum_with_occurs() {
    let result = analyze(CUSTOMER_MASTER);
    assert_eq!(result.records.len(), 1);
    let record = &result.records[0];

    // CUST-KEY 8 + CUST-NAME 30 + CUST-BALANCES 10*12 + CUST-STATUS 1.
    // FILLER advances offsets but is not part of the tree.
    assert_eq!(record.total_length, 159);
}

#[test]
fn offsets_accumulate_including_filler() {
    let result = analyze(CUSTOMER_MASTER);
    let record = &result.records[0];

    let root = &record.fields[0];
    assert_eq!(root.name, "CUSTOMER-MASTER-REC");
    let children: Vec<&str> = root.children.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(
        children,
        vec!["CUST-KEY", "CUST-NAME", "CUST-BALANCES", "CUST-STATUS"]
    );

    let cust_key = &root.children[0];
    assert_eq!(cust_key.offset, 0);
    assert_eq!(cust_key.children[0].offset, 0);
    assert_eq!(cust_key.children[1].offset, 6);

    let cust_name = &root.children[1];
    assert_eq!(cust_name.offset, 8);

    // FILLER pushed the running offset from 38 to 43
    let balances = &root.children[2];
    assert_eq!(balances.offset, 43);
}

#[test]
fn group_items_have_zero_direct_length() {
    let result = analyze(CUSTOMER_MASTER);
    let root = &result.records[0].fields[0];
    let cust_key = &root.children[0];
    assert_eq!(cust_key.length, 0);
    assert_eq!(cust_key.data_type, DataType::Group);
    assert_eq!(cust_key.effective_length(), 8);
}

#[test]
fn condition_names_join_tree_but_keep_parent_elementary() {
    let result = analyze(CUSTOMER_MASTER);
    let root = &result.records[0].fields[0];
    let status = root.children.last().unwrap();
    assert_eq!(status.name, "CUST-STATUS");
    assert_eq!(status.children.len(), 1);
    assert_eq!(status.children[0].level, 88);
    assert_eq!(status.effective_length(), 1);
    assert_eq!(result.metrics.elementary_items, 5);
}

#[test]
fn packed_decimal_usage_classifies_field() {
    let result = analyze(CUSTOMER_MASTER);
    let root = &result.records[0].fields[0];
    let bal = &root.children[2].children[0];
    assert_eq!(bal.data_type, DataType::Packed);
    assert_eq!(bal.length, 10);
}

#[test]
fn cust_id_is_a_primary_key_unless_alt() {
    let result = analyze(CUSTOMER_MASTER);
    let keys = &result.records[0].keys;
    let cust_id = keys.iter().find(|k| k.name == "CUST-ID").unwrap();
    assert_eq!(cust_id.key_type, KeyType::Primary);
    assert!(cust_id.unique);

    let alt = analyze("01 REC.\n   05 ALT-CUST-ID PIC 9(6).\n");
    let key = &alt.records[0].keys[0];
    assert_eq!(key.key_type, KeyType::Alternate);
    assert!(!key.unique);
}

#[test]
fn redefines_recorded_and_counted() {
    let src = indoc! {"
        01  WORK-REC.
            05  RAW-DATE         PIC 9(8).
            05  DATE-PARTS       REDEFINES RAW-DATE.
                10  DATE-YYYY    PIC 9(4).
                10  DATE-MM      PIC 99.
                10  DATE-DD      PIC 99.
    "};
    let result = analyze(src);
    let record = &result.records[0];
    let root = &record.fields[0];
    assert_eq!(root.children[1].redefines.as_deref(), Some("RAW-DATE"));
    assert_eq!(result.metrics.redefines_count, 1);
    // The layout sums both views; storage sharing is not collapsed
    assert_eq!(record.total_length, 16);
}

#[test]
fn level_01_starts_a_new_record() {
    let src = indoc! {"
        01  ORDER-HDR-REC.
            05  ORDER-ID   PIC 9(8).
        01  ORDER-DTL-REC.
            05  LINE-NO    PIC 9(3).
    "};
    let result = analyze(src);
    assert_eq!(result.records.len(), 2);
    assert_eq!(result.records[0].entity_type, EntityType::Header);
    assert_eq!(result.records[1].entity_type, EntityType::Detail);
    // Offsets restart per record
    assert_eq!(result.records[1].fields[0].children[0].offset, 0);
}

#[test]
fn master_then_transaction_pattern_ends_transaction() {
    let src = indoc! {"
        01  ACCT-MAST-TXN-REC.
            05  WS-AMOUNT  PIC 9(5)V99.
    "};
    let result = analyze(src);
    // The record tag takes the first table match, MAST
    assert_eq!(result.records[0].entity_type, EntityType::Master);
    // File-level inference checks transaction after master, so a name
    // matching both ends up Transaction
    assert_eq!(result.entity.entity_type, EntityType::Transaction);
    assert!((result.entity.confidence - 0.9).abs() < 1e-9);
}

#[test]
fn entity_confidence_accumulates_and_clamps() {
    let result = analyze(CUSTOMER_MASTER);
    let entity = &result.entity;
    // 0.5 + 0.2 master name + 0.15 primary key + 0.15 canonical CUST-ID
    assert!((entity.confidence - 1.0).abs() < 1e-9);
    assert_eq!(entity.name, "Customer");
    assert_eq!(entity.entity_type, EntityType::Master);
    assert_eq!(entity.evidence.len(), 3);
}

#[test]
fn referenced_copybooks_first_seen_order() {
    let src = indoc! {"
        01  WRAPPER-REC.
            05  AREA-ONE  PIC X(10).
        COPY CUSTADDR.
        copy custrate.
        COPY CUSTADDR.
    "};
    let result = analyze(src);
    assert_eq!(
        result.referenced_copybooks,
        vec!["CUSTADDR".to_string(), "CUSTRATE".to_string()]
    );
}

#[test]
fn metrics_count_groups_and_elementary_items() {
    let result = analyze(CUSTOMER_MASTER);
    // Groups: root, CUST-KEY, CUST-BALANCES
    assert_eq!(result.metrics.group_items, 3);
    assert_eq!(result.metrics.occurs_count, 1);
}

#[test]
fn malformed_lines_are_skipped_not_fatal() {
    let src = indoc! {"
        this is not a field
        05 ORPHAN-FIELD PIC X.
        01 GOOD-REC.
           05 GOOD-FIELD PIC X(4).
    "};
    let result = analyze(src);
    assert_eq!(result.records.len(), 1);
    assert_eq!(result.records[0].total_length, 4);
}

#[test]
fn analysis_is_idempotent() {
    let first = analyze(CUSTOMER_MASTER);
    let second = analyze(CUSTOMER_MASTER);
    assert_eq!(first, second);
}
